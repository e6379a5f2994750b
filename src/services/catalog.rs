//! Public course catalog: listing with search and filters, course detail,
//! related courses and tags.
//!
//! Students never see courses they hid through recommendation feedback in
//! listings. Guests and other roles see the full published catalog.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::debug;

use crate::database::models::{CatalogCourse, CourseDetailRow, CourseStats, ModuleRow, PublicReview, RelatedCourse, TagSummary};
use crate::database::repositories::catalog::{CatalogFilter, CatalogOrder};
use crate::database::repositories::{CatalogRepository, CourseRepository, FeedbackRepository, ReviewRepository};
use crate::middleware::AuthUser;
use crate::types::Role;

use super::review::{RatingSummary, LATEST_REVIEWS};
use super::{ServiceError, ServiceResult};

pub const DEFAULT_PAGE_SIZE: i64 = 12;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const RELATED_LIMIT: i64 = 8;

/// Price buckets offered by the catalog filter, in the course currency's
/// smallest unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceRange {
    Free,
    Under100k,
    From100kTo500k,
    From500kTo1m,
    Over1m,
}

impl PriceRange {
    /// Unknown values are ignored rather than rejected
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "free" => Some(PriceRange::Free),
            "under_100k" => Some(PriceRange::Under100k),
            "100k_500k" => Some(PriceRange::From100kTo500k),
            "500k_1m" => Some(PriceRange::From500kTo1m),
            "over_1m" => Some(PriceRange::Over1m),
            _ => None,
        }
    }

    /// Inclusive lower bound, exclusive upper bound
    pub fn bounds(&self) -> (i64, Option<i64>) {
        match self {
            PriceRange::Free => (0, Some(1)),
            PriceRange::Under100k => (1, Some(100_000)),
            PriceRange::From100kTo500k => (100_000, Some(500_000)),
            PriceRange::From500kTo1m => (500_000, Some(1_000_000)),
            PriceRange::Over1m => (1_000_000, None),
        }
    }
}

/// `sort_by` / `sort_order` to an order; without a known `sort_by` the
/// listing is newest first (or by relevance when searching)
pub fn parse_order(sort_by: Option<&str>, sort_order: Option<&str>) -> CatalogOrder {
    let ascending = sort_order.is_some_and(|o| o.eq_ignore_ascii_case("asc"));
    match sort_by.map(str::trim) {
        Some("price") => CatalogOrder::Price(ascending),
        Some("rating") => CatalogOrder::Rating(ascending),
        Some("date") => CatalogOrder::Date(ascending),
        _ => CatalogOrder::Relevance,
    }
}

/// `%keyword%` with LIKE wildcards in the keyword matched literally
pub fn like_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    /// Page numbers start at 1; the page size is clamped to `1..=MAX_PAGE_SIZE`
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        Self {
            page,
            limit,
            total: 0,
            total_pages: 0,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn with_total(self, total: i64) -> Self {
        Self {
            total,
            total_pages: (total + self.limit - 1) / self.limit,
            ..self
        }
    }
}

/// Raw listing parameters as they arrive on the query string
#[derive(Debug, Clone, Default)]
pub struct CatalogParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub keyword: Option<String>,
    pub price_range: Option<String>,
    pub min_rating: Option<f64>,
    pub tag: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl CatalogParams {
    fn filter(&self, exclude: Vec<i64>) -> CatalogFilter {
        CatalogFilter {
            pattern: self
                .keyword
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(like_pattern),
            price: self.price_range.as_deref().and_then(PriceRange::parse).map(|r| r.bounds()),
            min_rating: self.min_rating.filter(|r| *r > 0.0),
            tag: self
                .tag
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            exclude,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogPage {
    pub courses: Vec<CatalogCourse>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetailView {
    #[serde(flatten)]
    pub course: CourseDetailRow,
    #[serde(flatten)]
    pub stats: CourseStats,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerEnrollment {
    pub enrolled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrolled_at: Option<DateTime<Utc>>,
}

impl ViewerEnrollment {
    fn none() -> Self {
        Self {
            enrolled: false,
            status: None,
            enrolled_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseDetail {
    pub course: CourseDetailView,
    pub modules: Vec<ModuleRow>,
    pub rating: RatingSummary,
    pub reviews: Vec<PublicReview>,
    pub enrollment: ViewerEnrollment,
}

pub struct CatalogService {
    catalog: CatalogRepository,
    courses: CourseRepository,
    reviews: ReviewRepository,
    feedback: FeedbackRepository,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            catalog: CatalogRepository::new(pool.clone()),
            courses: CourseRepository::new(pool.clone()),
            reviews: ReviewRepository::new(pool.clone()),
            feedback: FeedbackRepository::new(pool),
        }
    }

    /// Course ids hidden from this viewer's listings
    async fn hidden_for(&self, viewer: Option<AuthUser>) -> ServiceResult<Vec<i64>> {
        match viewer {
            Some(user) if user.role == Role::Student => Ok(self.feedback.hidden_course_ids(user.user_id).await?),
            _ => Ok(Vec::new()),
        }
    }

    pub async fn list(&self, params: &CatalogParams, viewer: Option<AuthUser>) -> ServiceResult<CatalogPage> {
        let hidden = self.hidden_for(viewer).await?;
        let filter = params.filter(hidden);
        let order = parse_order(params.sort_by.as_deref(), params.sort_order.as_deref());
        let pagination = Pagination::new(params.page, params.limit);

        let courses = self
            .catalog
            .list(&filter, order, pagination.limit, pagination.offset())
            .await?;
        let total = self.catalog.count(&filter).await?;

        debug!(
            "Catalog page {} ({} of {} courses, {} hidden)",
            pagination.page,
            courses.len(),
            total,
            filter.exclude.len()
        );

        Ok(CatalogPage {
            courses,
            pagination: pagination.with_total(total),
        })
    }

    pub async fn detail(&self, course_id: i64, viewer: Option<AuthUser>) -> ServiceResult<CourseDetail> {
        let course = self
            .catalog
            .find_detail(course_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Course not found"))?;

        let stats = self.catalog.stats(course_id).await?;
        let modules = self.courses.modules(course_id).await?;
        let rating = self.reviews.rating_stats(course_id).await?.into();
        let reviews = self.reviews.latest(course_id, LATEST_REVIEWS).await?;

        let enrollment = match viewer {
            Some(user) => match self.catalog.enrollment_state(course_id, user.user_id).await? {
                Some(state) => ViewerEnrollment {
                    enrolled: true,
                    status: Some(state.status),
                    enrolled_at: Some(state.enrolled_at),
                },
                None => ViewerEnrollment::none(),
            },
            None => ViewerEnrollment::none(),
        };

        Ok(CourseDetail {
            course: CourseDetailView { course, stats },
            modules,
            rating,
            reviews,
            enrollment,
        })
    }

    pub async fn related(&self, course_id: i64, viewer: Option<AuthUser>) -> ServiceResult<Vec<RelatedCourse>> {
        if self.catalog.find_detail(course_id).await?.is_none() {
            return Err(ServiceError::not_found("Course not found"));
        }
        let hidden = self.hidden_for(viewer).await?;
        Ok(self.catalog.related(course_id, RELATED_LIMIT, &hidden).await?)
    }

    pub async fn tags(&self) -> ServiceResult<Vec<TagSummary>> {
        Ok(self.catalog.tags().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_ranges_map_to_half_open_bounds() {
        assert_eq!(PriceRange::parse("free").map(|r| r.bounds()), Some((0, Some(1))));
        assert_eq!(PriceRange::parse("under_100k").map(|r| r.bounds()), Some((1, Some(100_000))));
        assert_eq!(PriceRange::parse("100k_500k").map(|r| r.bounds()), Some((100_000, Some(500_000))));
        assert_eq!(PriceRange::parse("over_1m").map(|r| r.bounds()), Some((1_000_000, None)));
        assert_eq!(PriceRange::parse("cheap"), None);
    }

    #[test]
    fn sort_defaults_to_relevance_and_descending() {
        assert_eq!(parse_order(None, None), CatalogOrder::Relevance);
        assert_eq!(parse_order(Some("price"), None), CatalogOrder::Price(false));
        assert_eq!(parse_order(Some("price"), Some("ASC")), CatalogOrder::Price(true));
        assert_eq!(parse_order(Some("rating"), Some("desc")), CatalogOrder::Rating(false));
        assert_eq!(parse_order(Some("date"), Some("asc")), CatalogOrder::Date(true));
        assert_eq!(parse_order(Some("popularity"), Some("asc")), CatalogOrder::Relevance);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
    }

    #[test]
    fn pagination_defaults_and_clamps() {
        let page = Pagination::new(None, None);
        assert_eq!((page.page, page.limit, page.offset()), (1, DEFAULT_PAGE_SIZE, 0));

        let page = Pagination::new(Some(3), Some(10));
        assert_eq!(page.offset(), 20);

        let page = Pagination::new(Some(0), Some(5_000));
        assert_eq!((page.page, page.limit), (1, MAX_PAGE_SIZE));

        assert_eq!(Pagination::new(None, Some(10)).with_total(21).total_pages, 3);
        assert_eq!(Pagination::new(None, Some(10)).with_total(0).total_pages, 0);
    }

    #[test]
    fn blank_keyword_and_unknown_price_do_not_filter() {
        let params = CatalogParams {
            keyword: Some("   ".to_string()),
            price_range: Some("bargain".to_string()),
            min_rating: Some(0.0),
            ..CatalogParams::default()
        };
        let filter = params.filter(vec![4]);
        assert!(filter.pattern.is_none());
        assert!(filter.price.is_none());
        assert!(filter.min_rating.is_none());
        assert_eq!(filter.exclude, vec![4]);
    }
}
