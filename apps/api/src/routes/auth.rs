//! Login handler: email + password → JWT.

use axum::extract::State;
use axum::Json;
use tracing::{info, warn};

use meridian_db::repository::user::verify_password;

use crate::dto::{LoginBody, LoginResponse, UserInfo};
use crate::error::ApiError;
use crate::AppState;

/// Exchanges credentials for a bearer token.
///
/// A wrong email and a wrong password produce the same 401 so the endpoint
/// doesn't leak which accounts exist.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state.db.users().get_by_email(body.email.trim()).await?;

    let user = match user {
        Some(u) if verify_password(&body.password, &u.password_hash) => u,
        _ => {
            warn!(email = %body.email, "Failed login attempt");
            return Err(ApiError::unauthorized("Invalid email or password"));
        }
    };

    let token = state.jwt.generate_token(&user)?;

    info!(user_id = %user.id, role = ?user.role, "User logged in");

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt.lifetime_secs(),
        user: UserInfo {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        },
    }))
}
