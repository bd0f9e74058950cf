//! Login handler.
//!
//! ```text
//! POST /api/auth/login {"email":"admin@example.lv","password":"secret"}
//! ```

use actix_web::{post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, LoginCredentials, LoginValidationError, User, UserStats};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserStatsSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::AdventureState;
use crate::inbound::http::validation::field_error;

/// Login request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin@example.lv")]
    pub email: String,
    #[schema(example = "secret")]
    pub password: String,
}

/// Profile returned after a successful login.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub location: Option<String>,
    pub country: Option<String>,
    pub bio: Option<String>,
    pub interests: Option<String>,
    /// Avatar image URL.
    pub avatar: Option<String>,
    /// When the account was created.
    pub join_date: DateTime<Utc>,
    #[schema(value_type = UserStatsSchema)]
    pub stats: UserStats,
    pub is_admin: bool,
}

impl From<User> for LoginProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            email: user.email.as_str().to_owned(),
            location: user.location,
            country: user.country,
            bio: user.bio,
            interests: user.interests,
            avatar: user.avatar_url,
            join_date: user.created_at,
            stats: user.stats,
            is_admin: user.is_admin,
        }
    }
}

/// Login response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: LoginProfile,
}

fn map_login_validation_error(err: &LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::InvalidEmail => "email",
        LoginValidationError::EmptyPassword => "password",
    };
    field_error(field, err)
}

/// Authenticate and start a session.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Missing email or password", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login"
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<AdventureState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(|err| map_login_validation_error(&err))?;
    let user_id = state.login.authenticate(&credentials).await?;
    let user = state.users.get(&user_id).await?;
    session.sign_in(&user_id)?;
    state.presence.touch(&user_id);
    Ok(web::Json(LoginResponse { user: user.into() }))
}
