use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::ws::manager::WsManager;

const PING_EVERY: Duration = Duration::from_secs(30);

/// Spawn the keep-alive loop for chat sockets.
///
/// Every tick pings each socket and drops the ones whose writer task has
/// exited, so presence does not outlive a dead connection. Aborted on
/// shutdown.
pub fn start_heartbeat(ws_manager: Arc<WsManager>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = tokio::time::interval(PING_EVERY);
        ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticks.tick().await;
            let pruned = ws_manager.ping_and_prune().await;
            if pruned > 0 {
                tracing::info!(pruned, "Dropped stale chat sockets");
            }
            let open = ws_manager.connection_count().await;
            tracing::trace!(open, "Chat heartbeat");
        }
    })
}
