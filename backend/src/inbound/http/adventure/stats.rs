//! Platform counters.

use actix_web::{get, web};

use crate::domain::PlatformStats;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, PlatformStatsSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::AdventureState;

/// Users, trails, posts and users online in the last five minutes.
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Platform counters", body = PlatformStatsSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["stats"],
    operation_id = "platformStats"
)]
#[get("/stats")]
pub async fn platform_stats(
    state: web::Data<AdventureState>,
    session: SessionContext,
) -> ApiResult<web::Json<PlatformStats>> {
    let caller = session.current_user()?;
    Ok(web::Json(state.platform.stats(caller.as_ref()).await?))
}
