use anyhow::Context;
use careers_core::reconnect::ReconnectPolicy;
use careers_dashboard::chat::{ChatSocket, ServerFrame};
use careers_dashboard::client::ApiClient;
use careers_dashboard::config::{DashboardConfig, ViewKind};
use careers_dashboard::debounce::{Debouncer, SEARCH_DEBOUNCE};
use careers_dashboard::filters::TrendPeriod;
use careers_dashboard::models::Notice;
use careers_dashboard::render;
use careers_dashboard::session::supervise;
use careers_dashboard::stream::NotificationStream;
use careers_dashboard::views::{
    AdmissionsTracker, ApplicationReview, CourseManager, StudentConnections, StudentDashboard,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// The loaded page selected by `DASHBOARD_VIEW`.
enum Page {
    Student(StudentDashboard),
    Courses(CourseManager),
    Applications(ApplicationReview),
    Admissions(AdmissionsTracker),
    Connections(StudentConnections),
}

impl Page {
    async fn load(kind: ViewKind, client: &ApiClient, config: &DashboardConfig) -> Self {
        match kind {
            ViewKind::StudentDashboard => Page::Student(StudentDashboard::load(client).await),
            ViewKind::ManageCourses => {
                Page::Courses(CourseManager::load(client, Default::default()).await)
            }
            ViewKind::ReviewApplications => {
                Page::Applications(ApplicationReview::load(client, Default::default()).await)
            }
            ViewKind::TrackAdmissions => Page::Admissions(
                AdmissionsTracker::load(client, TrendPeriod::Monthly, Default::default()).await,
            ),
            ViewKind::StudentConnections => {
                let mut view = StudentConnections::load(client, Default::default()).await;
                if let Some(student_id) = &config.chat_student {
                    if let Err(e) = view.start_chat(client, student_id).await {
                        tracing::warn!(error = %e, student_id = %student_id, "Failed to load chat history");
                        view.errors.push("Failed to load chat history".into());
                    }
                }
                Page::Connections(view)
            }
        }
    }

    fn render(&self) -> String {
        match self {
            Page::Student(view) => render::render_student_dashboard(view),
            Page::Courses(view) => render::render_course_manager(view),
            Page::Applications(view) => render::render_application_review(view),
            Page::Admissions(view) => render::render_admissions_tracker(view),
            Page::Connections(view) => render::render_student_connections(view),
        }
    }

    /// Apply a live notification. Views without a notice area reload.
    async fn on_notice(
        &mut self,
        notice: Notice,
        kind: ViewKind,
        client: &ApiClient,
        config: &DashboardConfig,
    ) {
        match self {
            Page::Student(view) => view.push_notice(notice),
            Page::Connections(view) => {
                view.receive(ServerFrame::Notification {
                    title: notice.title,
                    message: notice.message,
                });
            }
            _ => *self = Page::load(kind, client, config).await,
        }
    }

    fn on_frame(&mut self, frame: ServerFrame) -> bool {
        match self {
            Page::Connections(view) => view.receive(frame),
            _ => false,
        }
    }
}

async fn write_output(config: &DashboardConfig, html: &str) -> anyhow::Result<()> {
    match &config.output {
        Some(path) => tokio::fs::write(path, html)
            .await
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{html}");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "careers_dashboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = DashboardConfig::from_env().context("Invalid dashboard configuration")?;
    let kind = config.view;
    tracing::info!(api = %config.api_url, view = ?kind, "Loading dashboard");

    let client = ApiClient::from_config(&config).context("Failed to build HTTP client")?;
    let mut page = Page::load(kind, &client, &config).await;
    write_output(&config, &page.render()).await?;

    if !config.follow {
        return Ok(());
    }

    // --- Live updates ---
    let cancel = CancellationToken::new();
    let policy = ReconnectPolicy::default();

    let (stream, mut notices) = NotificationStream::new(&client, kind.role(), config.request_timeout)
        .context("Failed to build notification stream client")?;
    let stream_task = {
        let cancel = cancel.clone();
        let policy = policy.clone();
        tokio::spawn(async move { supervise(&stream, &policy, &cancel).await })
    };

    let chat_enabled = kind == ViewKind::StudentConnections;
    let (socket, _chat, mut frames) = ChatSocket::new(&config.ws_url, &config.token);
    let chat_task = chat_enabled.then(|| {
        let cancel = cancel.clone();
        let policy = policy.clone();
        tokio::spawn(async move { supervise(&socket, &policy, &cancel).await })
    });

    // Bursts of events re-render once the page has been quiet for a moment.
    let (redraw, mut settled) = Debouncer::spawn(SEARCH_DEBOUNCE);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Interrupted, closing live connections");
                break;
            }
            Some(notice) = notices.recv() => {
                page.on_notice(notice, kind, &client, &config).await;
                redraw.push(()).await;
            }
            Some(frame) = frames.recv(), if chat_enabled => {
                if page.on_frame(frame) {
                    redraw.push(()).await;
                }
            }
            Some(()) = settled.recv() => {
                write_output(&config, &page.render()).await?;
            }
        }
    }

    redraw.finish().await;
    if settled.recv().await.is_some() {
        write_output(&config, &page.render()).await?;
    }
    cancel.cancel();
    let attempts = stream_task.await.context("Notification stream task failed")?;
    tracing::debug!(attempts, "Notification stream stopped");
    if let Some(task) = chat_task {
        let attempts = task.await.context("Chat task failed")?;
        tracing::debug!(attempts, "Chat socket stopped");
    }
    Ok(())
}
