//! Read-only group endpoints. Provisioning happens through the seeding
//! binary, not the API.

use axum::extract::{Path, State};
use axum::Json;

use crate::api::serializers::GroupOut;
use crate::error::ApiError;
use crate::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<GroupOut>>, ApiError> {
    let groups = state.groups.list().await?;
    Ok(Json(groups.iter().map(GroupOut::from).collect()))
}

pub async fn retrieve(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<GroupOut>, ApiError> {
    let group = state.groups.find(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(GroupOut::from(&group)))
}
