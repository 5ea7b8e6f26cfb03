use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Response;

use crate::models::image::ImageSearchQuery;
use crate::services::images;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::ok;

pub async fn search_images(
    State(state): State<AppState>,
    params: Result<Query<ImageSearchQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(params) = params?;
    let search = state.images()?;

    let found = images::search_images(search, &params.query, params.per_page).await;

    Ok(ok(found))
}
