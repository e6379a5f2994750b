// Public catalog: GET /api/courses, /api/courses/tags, /api/courses/:courseId
// and /api/courses/:courseId/related. A valid bearer token personalises the
// response; anything else is served as a guest.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::models::RelatedCourse;
use crate::error::ApiError;
use crate::middleware::{lenient_f64, lenient_i64, ApiPath, ApiQuery, OptionalAuthUser};
use crate::services::catalog::{CatalogPage, CatalogParams, CourseDetail};
use crate::services::CatalogService;

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub limit: Option<i64>,
    pub q: Option<String>,
    pub keyword: Option<String>,
    pub price_range: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub min_rating: Option<f64>,
    pub tag: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl From<CatalogQuery> for CatalogParams {
    fn from(query: CatalogQuery) -> Self {
        Self {
            page: query.page,
            limit: query.limit,
            keyword: query.q.or(query.keyword),
            price_range: query.price_range,
            min_rating: query.min_rating,
            tag: query.tag,
            sort_by: query.sort_by,
            sort_order: query.sort_order,
        }
    }
}

pub async fn catalog_list(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    ApiQuery(query): ApiQuery<CatalogQuery>,
) -> Result<Json<CatalogPage>, ApiError> {
    let page = CatalogService::new(state.pool())
        .list(&CatalogParams::from(query), viewer)
        .await?;
    Ok(Json(page))
}

pub async fn catalog_tags(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let tags = CatalogService::new(state.pool()).tags().await?;
    Ok(Json(json!({ "tags": tags })))
}

pub async fn course_detail(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    ApiPath(course_id): ApiPath<i64>,
) -> Result<Json<CourseDetail>, ApiError> {
    let detail = CatalogService::new(state.pool()).detail(course_id, viewer).await?;
    Ok(Json(detail))
}

pub async fn course_related(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    ApiPath(course_id): ApiPath<i64>,
) -> Result<Json<Vec<RelatedCourse>>, ApiError> {
    let courses = CatalogService::new(state.pool()).related(course_id, viewer).await?;
    Ok(Json(courses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;

    fn params(uri: &'static str) -> CatalogParams {
        let uri: Uri = uri.parse().unwrap();
        Query::<CatalogQuery>::try_from_uri(&uri).unwrap().0.into()
    }

    #[test]
    fn q_takes_precedence_over_keyword() {
        assert_eq!(params("/api/courses?q=rust&keyword=go").keyword.as_deref(), Some("rust"));
        assert_eq!(params("/api/courses?keyword=go").keyword.as_deref(), Some("go"));
    }

    #[test]
    fn malformed_numbers_fall_back_to_defaults() {
        let params = params("/api/courses?page=two&limit=&min_rating=x&price_range=free");
        assert_eq!(params.page, None);
        assert_eq!(params.limit, None);
        assert_eq!(params.min_rating, None);
        assert_eq!(params.price_range.as_deref(), Some("free"));
    }
}
