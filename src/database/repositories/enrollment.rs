use sqlx::{PgConnection, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::{CourseAvailability, EnrolledCourseRow, Enrollment};
use crate::types::EnrollmentStatus;

pub struct EnrollmentRepository {
    pool: PgPool,
}

impl EnrollmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn is_active(&self, course_id: i64, student_id: i64) -> Result<bool, DatabaseError> {
        let found: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM enrollments
            WHERE course_id = $1 AND student_id = $2 AND status = $3
            "#,
        )
        .bind(course_id)
        .bind(student_id)
        .bind(EnrollmentStatus::Active.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    pub async fn list_active(&self, student_id: i64) -> Result<Vec<EnrolledCourseRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, EnrolledCourseRow>(
            r#"
            SELECT
                e.id AS enrollment_id,
                e.status AS enrollment_status,
                e.enrolled_at,
                e.expires_at,
                c.id AS course_id,
                c.title,
                c.slug,
                c.description,
                c.thumbnail_url,
                c.price_cents,
                c.currency,
                u.id AS instructor_id,
                u.full_name AS instructor_name,
                u.avatar_url AS instructor_avatar,
                COALESCE(scp.percent, 0) AS progress_percent,
                COALESCE(r.avg_rating, 0)::FLOAT8 AS avg_rating,
                COALESCE(r.review_count, 0) AS review_count
            FROM enrollments e
            JOIN courses c ON e.course_id = c.id
            JOIN users u ON c.instructor_id = u.id
            LEFT JOIN student_course_progress scp
                ON c.id = scp.course_id AND scp.student_id = e.student_id
            LEFT JOIN (
                SELECT course_id, AVG(rating) AS avg_rating, COUNT(*) AS review_count
                FROM course_reviews
                GROUP BY course_id
            ) r ON r.course_id = c.id
            WHERE e.student_id = $1 AND e.status = $2
            ORDER BY e.enrolled_at DESC
            "#,
        )
        .bind(student_id)
        .bind(EnrollmentStatus::Active.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn course_availability(&self, course_id: i64) -> Result<Option<CourseAvailability>, DatabaseError> {
        let course = sqlx::query_as::<_, CourseAvailability>(
            "SELECT id, is_published FROM courses WHERE id = $1",
        )
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course)
    }
}

/// Create the enrollment, or reactivate a lapsed one. `None` when the
/// student already holds an active enrollment.
pub async fn activate(
    conn: &mut PgConnection,
    course_id: i64,
    student_id: i64,
) -> Result<Option<Enrollment>, DatabaseError> {
    let enrollment = sqlx::query_as::<_, Enrollment>(
        r#"
        INSERT INTO enrollments (course_id, student_id, status)
        VALUES ($1, $2, $3)
        ON CONFLICT (course_id, student_id)
        DO UPDATE SET status = EXCLUDED.status, enrolled_at = NOW()
        WHERE enrollments.status <> EXCLUDED.status
        RETURNING id, course_id, student_id, status, enrolled_at, expires_at
        "#,
    )
    .bind(course_id)
    .bind(student_id)
    .bind(EnrollmentStatus::Active.as_str())
    .fetch_optional(conn)
    .await?;

    Ok(enrollment)
}
