use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{CourseReview, PublicReview, RatingStats};

const REVIEW_COLUMNS: &str = "id, course_id, student_id, rating, comment, created_at, updated_at";

pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, review_id: i64) -> Result<Option<CourseReview>, DatabaseError> {
        let review = sqlx::query_as::<_, CourseReview>(&format!(
            "SELECT {} FROM course_reviews WHERE id = $1",
            REVIEW_COLUMNS
        ))
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    pub async fn find_for_student(&self, course_id: i64, student_id: i64) -> Result<Option<CourseReview>, DatabaseError> {
        let review = sqlx::query_as::<_, CourseReview>(&format!(
            "SELECT {} FROM course_reviews WHERE course_id = $1 AND student_id = $2",
            REVIEW_COLUMNS
        ))
        .bind(course_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    pub async fn create(
        &self,
        course_id: i64,
        student_id: i64,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<CourseReview, DatabaseError> {
        let review = sqlx::query_as::<_, CourseReview>(&format!(
            r#"
            INSERT INTO course_reviews (course_id, student_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(course_id)
        .bind(student_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await?;

        Ok(review)
    }

    /// Absent fields keep their stored value
    pub async fn update(
        &self,
        review_id: i64,
        rating: Option<i32>,
        comment: Option<&str>,
    ) -> Result<Option<CourseReview>, DatabaseError> {
        let review = sqlx::query_as::<_, CourseReview>(&format!(
            r#"
            UPDATE course_reviews
            SET rating = COALESCE($2, rating),
                comment = COALESCE($3, comment),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(review_id)
        .bind(rating)
        .bind(comment)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    pub async fn delete(&self, review_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM course_reviews WHERE id = $1")
            .bind(review_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Newest first
    pub async fn latest(&self, course_id: i64, limit: i64) -> Result<Vec<PublicReview>, DatabaseError> {
        let reviews = sqlx::query_as::<_, PublicReview>(
            r#"
            SELECT r.id, r.rating, r.comment, r.created_at,
                   u.full_name AS student_name, u.avatar_url AS student_avatar
            FROM course_reviews r
            JOIN users u ON r.student_id = u.id
            WHERE r.course_id = $1
            ORDER BY r.created_at DESC, r.id DESC
            LIMIT $2
            "#,
        )
        .bind(course_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    pub async fn rating_stats(&self, course_id: i64) -> Result<RatingStats, DatabaseError> {
        let stats = sqlx::query_as::<_, RatingStats>(
            r#"
            SELECT
                COALESCE(AVG(rating), 0)::FLOAT8 AS average_rating,
                COUNT(*) AS total_reviews,
                COUNT(*) FILTER (WHERE rating = 5) AS rating_5,
                COUNT(*) FILTER (WHERE rating = 4) AS rating_4,
                COUNT(*) FILTER (WHERE rating = 3) AS rating_3,
                COUNT(*) FILTER (WHERE rating = 2) AS rating_2,
                COUNT(*) FILTER (WHERE rating = 1) AS rating_1
            FROM course_reviews
            WHERE course_id = $1
            "#,
        )
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }
}
