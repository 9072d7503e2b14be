//! Sponsor roster handler
//!
//! The one real endpoint: the role-grouped sponsor roster for a guild,
//! consumed by the dashboard and the in-world display.

use axum::{
    extract::{Path, State},
    Json,
};
use roster_core::Snowflake;
use roster_service::{AggregationService, RosterResponse};

use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/vrchat/sponsors/{guild_id}
///
/// 400 for a malformed ID, 404 for an unknown guild, 403 when the guild has
/// switched the API off. Responses are cached per guild for a short fixed
/// interval.
pub async fn get_guild_sponsors(
    State(state): State<AppState>,
    Path(guild_id): Path<String>,
) -> ApiResult<Json<RosterResponse>> {
    let guild_id: Snowflake = guild_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid guild_id format"))?;

    let service = AggregationService::new(state.service_context());
    let roster = service.roster(guild_id).await?;

    Ok(Json(roster.as_ref().clone()))
}
