//! Request scoped storage session.
//!
//! Each request, which needs the database, takes its own connection from the
//! pool through [`FromRequestParts`]. The connection lives inside the
//! repository and goes back to the pool when the handler finishes, whatever
//! the outcome was.

use axum::extract::FromRequestParts;
use http::request::Parts;
use noticeboard_dal::announcement::AnnouncementRepository;
use tracing::debug;

use crate::{error::ApiError, state::AppState};

impl FromRequestParts<AppState> for AnnouncementRepository {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let conn = state
            .pool()
            .acquire()
            .await
            .map_err(noticeboard_dal::Error::from)?;
        debug!("Acquired database session");
        Ok(AnnouncementRepository::new(conn))
    }
}
