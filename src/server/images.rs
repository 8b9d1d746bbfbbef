use axum::extract::{Path, Query, State};
use axum::http::header::{HeaderName, CACHE_CONTROL};
use axum::response::{IntoResponse, Json, Response};
use sea_orm::{EntityTrait, PaginatorTrait, QueryOrder, QuerySelect};

use crate::database::connection;
use crate::database::entities::generated_image;

use super::error::ApiError;
use super::pagination::PageParams;
use super::AppState;

const LIST_CACHE_CONTROL: &str = "public, max-age=300";
const DETAIL_CACHE_CONTROL: &str = "public, max-age=3600";

const X_TOTAL_COUNT: &str = "x-total-count";
const X_TOTAL_PAGES: &str = "x-total-pages";

/// GET /api/images
pub async fn list_images(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let conn = state.conn()?;
    let request = PageParams::from_pairs(pairs).to_request();

    let rows = generated_image::Entity::find()
        .order_by_desc(generated_image::Column::GenerationTimestamp)
        .order_by_desc(generated_image::Column::Id)
        .offset(request.offset())
        .limit(request.per_page() as u64)
        .all(conn)
        .await
        .map_err(|e| state.internal_error("Failed to fetch images", &e))?;

    let total = generated_image::Entity::find()
        .count(conn)
        .await
        .map_err(|e| state.internal_error("Failed to fetch images", &e))?;
    let total_pages = request.total_pages(total);

    tracing::debug!(
        page = request.page(),
        per_page = request.per_page(),
        returned = rows.len(),
        total,
        "Listed images"
    );

    let headers = [
        (CACHE_CONTROL, LIST_CACHE_CONTROL.to_string()),
        (HeaderName::from_static(X_TOTAL_COUNT), total.to_string()),
        (HeaderName::from_static(X_TOTAL_PAGES), total_pages.to_string()),
    ];
    Ok((headers, Json(rows)).into_response())
}

/// GET /api/images/:id
pub async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let conn = state.conn()?;

    // 非数字 id 不可能命中
    let Ok(id) = id.trim().parse::<i64>() else {
        return Err(ApiError::NotFound("Image not found"));
    };

    let image = generated_image::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(|e| state.internal_error("Failed to fetch image", &e))?
        .ok_or(ApiError::NotFound("Image not found"))?;

    Ok(([(CACHE_CONTROL, DETAIL_CACHE_CONTROL)], Json(image)).into_response())
}

/// GET /api/test-db
pub async fn test_db(State(state): State<AppState>) -> Result<Response, ApiError> {
    let conn = state.conn()?;

    connection::ping(conn)
        .await
        .map_err(|e| state.internal_error("Failed to connect to the database", &e))?;

    Ok(Json(serde_json::json!({
        "message": "Database connection successful",
        "rows": [{ "1": 1 }],
    }))
    .into_response())
}
