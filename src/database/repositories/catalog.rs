//! Public catalog queries over published courses.
//!
//! Listing and counting share one source subquery so filters on the
//! review average apply to both.

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::database::manager::DatabaseError;
use crate::database::models::{CatalogCourse, CourseDetailRow, CourseStats, EnrollmentState, RelatedCourse, TagSummary};

const CATALOG_SOURCE: &str = r#"
    (
        SELECT
            c.id, c.title, c.slug, c.description, c.thumbnail_url,
            c.price_cents, c.currency, c.lang, c.created_at, c.published_at,
            u.id AS instructor_id,
            u.full_name AS instructor_name,
            u.avatar_url AS instructor_avatar,
            COALESCE(r.avg_rating, 0)::FLOAT8 AS avg_rating,
            COALESCE(r.review_count, 0) AS review_count,
            COALESCE(e.enrollment_count, 0) AS enrollment_count
        FROM courses c
        JOIN users u ON c.instructor_id = u.id
        LEFT JOIN (
            SELECT course_id, AVG(rating) AS avg_rating, COUNT(*) AS review_count
            FROM course_reviews
            GROUP BY course_id
        ) r ON r.course_id = c.id
        LEFT JOIN (
            SELECT course_id, COUNT(*) AS enrollment_count
            FROM enrollments
            WHERE status = 'ACTIVE'
            GROUP BY course_id
        ) e ON e.course_id = c.id
        WHERE c.is_published = TRUE
    ) catalog
"#;

/// Listing order. The flag is `true` for ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrder {
    /// Title matches before description matches, newest first within each
    Relevance,
    Price(bool),
    Rating(bool),
    Date(bool),
}

#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    /// Already wrapped as an ILIKE pattern
    pub pattern: Option<String>,
    /// Inclusive lower and exclusive upper bound on `price_cents`
    pub price: Option<(i64, Option<i64>)>,
    pub min_rating: Option<f64>,
    pub tag: Option<String>,
    pub exclude: Vec<i64>,
}

fn direction(ascending: bool) -> &'static str {
    if ascending {
        "ASC"
    } else {
        "DESC"
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &CatalogFilter) {
    if let Some(pattern) = &filter.pattern {
        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR instructor_name ILIKE ")
            .push_bind(pattern.clone())
            .push(")");
    }
    if let Some((min, max)) = filter.price {
        builder.push(" AND price_cents >= ").push_bind(min);
        if let Some(max) = max {
            builder.push(" AND price_cents < ").push_bind(max);
        }
    }
    if let Some(min_rating) = filter.min_rating {
        builder.push(" AND avg_rating >= ").push_bind(min_rating);
    }
    if let Some(tag) = &filter.tag {
        builder
            .push(" AND id IN (SELECT ct.course_id FROM course_tags ct JOIN tags t ON t.id = ct.tag_id WHERE t.slug = ")
            .push_bind(tag.clone())
            .push(")");
    }
    if !filter.exclude.is_empty() {
        builder.push(" AND id <> ALL(").push_bind(filter.exclude.clone()).push(")");
    }
}

fn push_order(builder: &mut QueryBuilder<'_, Postgres>, filter: &CatalogFilter, order: CatalogOrder) {
    builder.push(" ORDER BY ");
    match (order, &filter.pattern) {
        (CatalogOrder::Relevance, Some(pattern)) => {
            builder
                .push("CASE WHEN title ILIKE ")
                .push_bind(pattern.clone())
                .push(" THEN 1 WHEN description ILIKE ")
                .push_bind(pattern.clone())
                .push(" THEN 2 ELSE 3 END, published_at DESC NULLS LAST, created_at DESC");
        }
        (CatalogOrder::Relevance, None) => {
            builder.push("published_at DESC NULLS LAST, created_at DESC");
        }
        (CatalogOrder::Price(asc), _) => {
            builder.push(format!("price_cents {}", direction(asc)));
        }
        (CatalogOrder::Rating(asc), _) => {
            builder.push(format!("avg_rating {}", direction(asc)));
        }
        (CatalogOrder::Date(asc), _) => {
            let dir = direction(asc);
            builder.push(format!("published_at {} NULLS LAST, created_at {}", dir, dir));
        }
    }
    // Stable pages when the sort key ties
    builder.push(", id DESC");
}

pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        filter: &CatalogFilter,
        order: CatalogOrder,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CatalogCourse>, DatabaseError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM ");
        builder.push(CATALOG_SOURCE).push(" WHERE TRUE");
        push_filters(&mut builder, filter);
        push_order(&mut builder, filter, order);
        builder.push(" LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);

        let courses = builder
            .build_query_as::<CatalogCourse>()
            .fetch_all(&self.pool)
            .await?;

        Ok(courses)
    }

    pub async fn count(&self, filter: &CatalogFilter) -> Result<i64, DatabaseError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM ");
        builder.push(CATALOG_SOURCE).push(" WHERE TRUE");
        push_filters(&mut builder, filter);

        let total: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(total)
    }

    pub async fn find_detail(&self, course_id: i64) -> Result<Option<CourseDetailRow>, DatabaseError> {
        let course = sqlx::query_as::<_, CourseDetailRow>(
            r#"
            SELECT c.id, c.title, c.slug, c.description, c.thumbnail_url, c.price_cents,
                   c.currency, c.lang, c.created_at, c.updated_at, c.published_at,
                   u.id AS instructor_id, u.full_name AS instructor_name,
                   u.avatar_url AS instructor_avatar
            FROM courses c
            JOIN users u ON c.instructor_id = u.id
            WHERE c.id = $1 AND c.is_published = TRUE
            "#,
        )
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course)
    }

    pub async fn stats(&self, course_id: i64) -> Result<CourseStats, DatabaseError> {
        let stats = sqlx::query_as::<_, CourseStats>(
            r#"
            SELECT
                (SELECT COUNT(DISTINCT student_id) FROM enrollments
                    WHERE course_id = $1 AND status = 'ACTIVE') AS total_students,
                COUNT(l.id) AS total_lessons,
                COALESCE(SUM(l.duration_s), 0)::BIGINT AS total_duration_s,
                (SELECT COUNT(*) FROM modules WHERE course_id = $1) AS total_modules
            FROM modules m
            JOIN lessons l ON l.module_id = m.id
            WHERE m.course_id = $1
            "#,
        )
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    pub async fn enrollment_state(&self, course_id: i64, student_id: i64) -> Result<Option<EnrollmentState>, DatabaseError> {
        let state = sqlx::query_as::<_, EnrollmentState>(
            "SELECT status, enrolled_at FROM enrollments WHERE course_id = $1 AND student_id = $2",
        )
        .bind(course_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(state)
    }

    pub async fn related(&self, course_id: i64, limit: i64, exclude: &[i64]) -> Result<Vec<RelatedCourse>, DatabaseError> {
        let courses = sqlx::query_as::<_, RelatedCourse>(
            r#"
            WITH current_course AS (
                SELECT instructor_id FROM courses WHERE id = $1
            ),
            candidates AS (
                SELECT
                    c.id, c.title, c.slug, c.description, c.price_cents, c.thumbnail_url,
                    c.instructor_id,
                    u.full_name AS instructor_name,
                    COALESCE(e.total_students, 0) AS total_students,
                    COALESCE(r.avg_rating, 0)::FLOAT8 AS avg_rating
                FROM courses c
                JOIN users u ON c.instructor_id = u.id
                LEFT JOIN (
                    SELECT course_id, COUNT(DISTINCT student_id) AS total_students
                    FROM enrollments
                    WHERE status = 'ACTIVE'
                    GROUP BY course_id
                ) e ON e.course_id = c.id
                LEFT JOIN (
                    SELECT course_id, AVG(rating) AS avg_rating
                    FROM course_reviews
                    GROUP BY course_id
                ) r ON r.course_id = c.id
                WHERE c.is_published = TRUE
                  AND c.id <> $1
                  AND c.id <> ALL($3)
            )
            SELECT id, title, slug, description, price_cents, thumbnail_url, instructor_name,
                   total_students, avg_rating,
                   CASE WHEN instructor_id = (SELECT instructor_id FROM current_course)
                        THEN 1 ELSE 2 END AS priority
            FROM candidates
            ORDER BY priority, total_students DESC, avg_rating DESC, id
            LIMIT $2
            "#,
        )
        .bind(course_id)
        .bind(limit)
        .bind(exclude)
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    pub async fn tags(&self) -> Result<Vec<TagSummary>, DatabaseError> {
        let tags = sqlx::query_as::<_, TagSummary>(
            r#"
            SELECT t.id, t.name, t.slug, COUNT(c.id) AS course_count
            FROM tags t
            LEFT JOIN course_tags ct ON ct.tag_id = t.id
            LEFT JOIN courses c ON c.id = ct.course_id AND c.is_published = TRUE
            GROUP BY t.id, t.name, t.slug
            ORDER BY t.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }
}
