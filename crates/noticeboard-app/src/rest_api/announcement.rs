use axum::{
    extract::{FromRequestParts, Path},
    response::IntoResponse,
    routing::{patch, post},
    Json,
};
use http::{request::Parts, StatusCode};
use noticeboard_dal::{
    announcement::AnnouncementRepository,
    schema::{CreateAnnouncement, UpdateAnnouncement},
};
use serde_json::json;
use tracing::debug;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    validate::ValidJson,
};

const ENTITY: &str = "Announcement";

/// Announcement id from the path; anything, which is not an integer, cannot
/// name an announcement, so it is reported as not found.
pub struct AnnouncementId(pub i64);

impl<S> FromRequestParts<S> for AnnouncementId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                debug!("Invalid announcement id: {e}");
                ApiError::NotFound(ENTITY.to_string())
            })?;
        Ok(AnnouncementId(id))
    }
}

pub async fn create(
    mut repository: AnnouncementRepository,
    ValidJson(payload): ValidJson<CreateAnnouncement>,
) -> ApiResult<impl IntoResponse> {
    let id = repository.create(payload).await?;

    Ok((StatusCode::OK, Json(json!({ "id": id }))))
}

pub async fn get(
    AnnouncementId(id): AnnouncementId,
    mut repository: AnnouncementRepository,
) -> ApiResult<impl IntoResponse> {
    let record = repository.get(id).await?;

    Ok((StatusCode::OK, Json(record.to_public())))
}

pub async fn update(
    AnnouncementId(id): AnnouncementId,
    mut repository: AnnouncementRepository,
    ValidJson(payload): ValidJson<UpdateAnnouncement>,
) -> ApiResult<impl IntoResponse> {
    let record = repository.update(id, payload).await?;

    Ok((StatusCode::OK, Json(record.to_public())))
}

pub async fn delete(
    AnnouncementId(id): AnnouncementId,
    mut repository: AnnouncementRepository,
) -> ApiResult<impl IntoResponse> {
    repository.delete(id).await?;

    Ok((StatusCode::OK, Json(json!({ "status": "deleted" }))))
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/announcement/", post(create))
        .route(
            "/announcement/{id}/",
            patch(update).get(get).delete(delete),
        )
}
