//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose `role`
//! claim is not the one the endpoint allows. A rejected request never
//! reaches the handler, so no mutation can happen.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use careers_core::error::CoreError;
use careers_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// A guard admitting exactly one role.
///
/// Lets generic handlers (the notification stream, the notification list)
/// be mounted once per role.
pub trait RoleGuard: FromRequestParts<AppState, Rejection = AppError> + Send {
    const ROLE: Role;

    fn user(&self) -> &AuthUser;
}

async fn require(parts: &mut Parts, state: &AppState, role: Role) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if user.role != Some(role) {
        tracing::debug!(uid = %user.uid, required = %role.as_str(), "Role check failed");
        return Err(AppError::Core(CoreError::Forbidden(
            "Unauthorized role".into(),
        )));
    }
    Ok(user)
}

macro_rules! role_guard {
    ($(#[$meta:meta])* $name:ident => $role:expr) => {
        $(#[$meta])*
        pub struct $name(pub AuthUser);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                require(parts, state, $role).await.map($name)
            }
        }

        impl RoleGuard for $name {
            const ROLE: Role = $role;

            fn user(&self) -> &AuthUser {
                &self.0
            }
        }
    };
}

role_guard!(
    /// Requires the `student` role. Rejects with 403 otherwise.
    ///
    /// ```ignore
    /// async fn profile(RequireStudent(user): RequireStudent) -> AppResult<Json<()>> {
    ///     Ok(Json(()))
    /// }
    /// ```
    RequireStudent => Role::Student
);

role_guard!(
    /// Requires the `institution` role. Rejects with 403 otherwise.
    RequireInstitution => Role::Institution
);

role_guard!(
    /// Requires the `company` role. Rejects with 403 otherwise.
    RequireCompany => Role::Company
);
