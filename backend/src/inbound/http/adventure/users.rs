//! User profile handlers.
//!
//! ```text
//! GET /api/users
//! GET /api/users/{id}
//! PUT /api/users/{id} {"bio":"Hiking every weekend"}
//! ```

use actix_web::{HttpResponse, get, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Error, ProfileUpdate, ProfileUpdateInput, User, UserId, UserStats, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserStatsSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::AdventureState;
use crate::inbound::http::validation::{FieldName, field_error, parse_record_id};

/// Public view of a user.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "user-1")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub location: Option<String>,
    pub country: Option<String>,
    pub bio: Option<String>,
    pub interests: Option<String>,
    pub avatar_url: Option<String>,
    pub is_admin: bool,
    #[schema(value_type = UserStatsSchema)]
    pub stats: UserStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            email: user.email.as_str().to_owned(),
            location: user.location,
            country: user.country,
            bio: user.bio,
            interests: user.interests,
            avatar_url: user.avatar_url,
            is_admin: user.is_admin,
            stats: user.stats,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Profile fields accepted by `PUT /api/users/{id}`; absent fields are kept.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub bio: Option<String>,
    pub interests: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<UpdateUserRequest> for ProfileUpdateInput {
    fn from(value: UpdateUserRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            location: value.location,
            country: value.country,
            bio: value.bio,
            interests: value.interests,
            avatar_url: value.avatar_url,
        }
    }
}

fn map_user_validation_error(err: &UserValidationError) -> Error {
    field_error(err.field(), err)
}

/// Body of a successful profile update.
#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateUserResponse {
    #[schema(example = "User updated successfully")]
    pub message: &'static str,
    pub user: UserResponse,
}

fn user_id_from_path(raw: String) -> ApiResult<UserId> {
    parse_record_id(raw, FieldName::new("id"))
}

/// List users, newest first.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<AdventureState>) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let users = state.users.list().await?;
    Ok(web::Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<AdventureState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = user_id_from_path(path.into_inner())?;
    let user = state.users.get(&id).await?;
    Ok(web::Json(user.into()))
}

/// Update a profile. Only the owner or an administrator may do so.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = UpdateUserResponse),
        (status = 400, description = "Invalid profile field", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 409, description = "Email already in use", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser",
    security(("SessionCookie" = []))
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<AdventureState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user()?;
    let target = user_id_from_path(path.into_inner())?;
    let update = ProfileUpdate::try_from_input(payload.into_inner().into())
        .map_err(|err| map_user_validation_error(&err))?;
    state.presence.touch(&actor);
    let user = state.users.update(&actor, &target, update).await?;
    Ok(HttpResponse::Ok().json(UpdateUserResponse {
        message: "User updated successfully",
        user: user.into(),
    }))
}
