//! Handlers for registration, login, token issuance and email verification.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use careers_core::error::CoreError;
use careers_core::roles::Role;
use careers_core::types::DocId;
use careers_core::validation::is_blank;
use careers_db::models::user::ProfileData;
use careers_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::identity::{IdentityError, UserRecord};
use crate::error::{AppError, AppResult};
use crate::response::Envelope;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /register`. Fields are optional so that absent
/// values produce the envelope error instead of a deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisteredPayload {
    pub uid: DocId,
}

/// Request body for `POST /login`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub id_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginPayload {
    pub uid: DocId,
    pub role: Option<Role>,
    pub profile: ProfileData,
}

/// Request body for `POST /auth/token`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    pub id_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailParams {
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifiedPayload {
    pub user: UserRecord,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /register
///
/// Create an identity account, tag it with its role, write the user
/// document and issue an email verification link.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<Envelope<RegisteredPayload>>)> {
    let present = |v: &Option<String>| v.as_deref().filter(|s| !is_blank(s)).map(str::to_string);
    let (Some(email), Some(password), Some(role)) = (
        present(&input.email),
        input.password.clone().filter(|p| !p.is_empty()),
        present(&input.role),
    ) else {
        return Err(AppError::bad_request("Missing required fields"));
    };
    let role: Role = role
        .parse()
        .map_err(|_| AppError::bad_request("Invalid role"))?;

    let record = state
        .identity
        .create_user(&email, &password)
        .await
        .map_err(|e| AppError::provider("Registration failed", e))?;

    if let Err(e) = finish_registration(&state, &record, role).await {
        // Roll the account back so the same email can register again.
        if let Err(cleanup) = state.identity.delete_user(&record.uid).await {
            tracing::error!(uid = %record.uid, error = %cleanup, "Failed to roll back account");
        }
        return Err(AppError::provider("Registration failed", e));
    }

    tracing::info!(uid = %record.uid, role = %role, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "User registered successfully. Please verify your email.",
            RegisteredPayload { uid: record.uid },
        )),
    ))
}

/// Steps after the account exists. Any failure aborts the registration.
async fn finish_registration(
    state: &AppState,
    record: &UserRecord,
    role: Role,
) -> Result<(), IdentityError> {
    state
        .identity
        .set_custom_claims(&record.uid, role.as_str())
        .await?;

    UserRepo::create(&state.pool, &record.uid, &record.email, role)
        .await
        .map_err(|e| {
            tracing::error!(uid = %record.uid, error = %e, "Failed to write user document");
            IdentityError::Internal("Failed to create user profile".into())
        })?;

    let link = state
        .identity
        .generate_email_verification_link(&record.email)
        .await?;
    tracing::info!(uid = %record.uid, link = %link, "Email verification link generated");
    Ok(())
}

/// POST /login
///
/// Exchange a verified ID token for the user's role and profile.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<Envelope<LoginPayload>>> {
    let Some(id_token) = input.id_token.filter(|t| !is_blank(t)) else {
        return Err(AppError::bad_request("Missing idToken"));
    };

    let decoded = state
        .identity
        .verify_id_token(&id_token)
        .await
        .map_err(|e| AppError::provider("Login failed", e))?;

    if !decoded.email_verified {
        return Err(AppError::Core(CoreError::Forbidden(
            "Email not verified".into(),
        )));
    }

    let user = UserRepo::find_by_id(&state.pool, &decoded.uid).await?;
    let role = user
        .as_ref()
        .map(|u| u.role)
        .or_else(|| decoded.role.as_deref().and_then(|r| r.parse().ok()));
    let profile = user.map(|u| u.profile_data).unwrap_or_default();

    tracing::info!(uid = %decoded.uid, "User logged in");
    Ok(Json(Envelope::ok(LoginPayload {
        uid: decoded.uid,
        role,
        profile,
    })))
}

/// POST /auth/token
///
/// Sign in with email and password and receive an ID token.
pub async fn issue_token(
    State(state): State<AppState>,
    Json(input): Json<TokenRequest>,
) -> AppResult<Json<Envelope<TokenPayload>>> {
    let issued = state
        .identity
        .sign_in(&input.email, &input.password)
        .await
        .map_err(|e| match e {
            IdentityError::InvalidCredentials => AppError::Core(CoreError::Unauthorized(
                "Invalid email or password".into(),
            )),
            other => AppError::provider("Sign-in failed", other),
        })?;

    Ok(Json(Envelope::ok(TokenPayload {
        id_token: issued.id_token,
        expires_in: issued.expires_in,
    })))
}

/// GET /auth/verify-email?code=
pub async fn verify_email(
    State(state): State<AppState>,
    Query(params): Query<VerifyEmailParams>,
) -> AppResult<Json<Envelope<VerifiedPayload>>> {
    let Some(code) = params.code.filter(|c| !is_blank(c)) else {
        return Err(AppError::bad_request("Missing verification code"));
    };

    let user = state
        .identity
        .verify_email(&code)
        .await
        .map_err(|e| AppError::provider("Email verification failed", e))?;

    Ok(Json(Envelope::with_message(
        "Email verified",
        VerifiedPayload { user },
    )))
}
