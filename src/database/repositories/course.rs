use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{CourseSummary, LessonAsset, LessonRow, ModuleRow, Quiz};

/// Read-side queries for a course's module → lesson tree
pub struct CourseRepository {
    pool: PgPool,
}

impl CourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_published(&self, course_id: i64) -> Result<Option<CourseSummary>, DatabaseError> {
        let course = sqlx::query_as::<_, CourseSummary>(
            r#"
            SELECT c.id, c.title, c.description, c.thumbnail_url,
                   u.full_name AS instructor_name
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

    pub async fn modules(&self, course_id: i64) -> Result<Vec<ModuleRow>, DatabaseError> {
        let modules = sqlx::query_as::<_, ModuleRow>(
            r#"
            SELECT id, title, position
            FROM modules
            WHERE course_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(modules)
    }

    /// Every lesson of the course joined with the student's progress
    pub async fn lessons_with_progress(
        &self,
        course_id: i64,
        student_id: i64,
    ) -> Result<Vec<LessonRow>, DatabaseError> {
        let lessons = sqlx::query_as::<_, LessonRow>(
            r#"
            SELECT
                l.id, l.module_id, l.title, l.position, l.duration_s, l.requires_quiz_pass,
                COALESCE(slp.watched_s, 0) AS watched_s,
                COALESCE(slp.is_completed, FALSE) AS is_completed
            FROM lessons l
            JOIN modules m ON l.module_id = m.id
            LEFT JOIN student_lesson_progress slp
                ON l.id = slp.lesson_id AND slp.student_id = $2
            WHERE m.course_id = $1
            ORDER BY l.position, l.id
            "#,
        )
        .bind(course_id)
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lessons)
    }

    pub async fn assets(&self, course_id: i64) -> Result<Vec<LessonAsset>, DatabaseError> {
        let assets = sqlx::query_as::<_, LessonAsset>(
            r#"
            SELECT la.id, la.lesson_id, la.asset_kind, la.url, la.meta, la.position
            FROM lesson_assets la
            JOIN lessons l ON la.lesson_id = l.id
            JOIN modules m ON l.module_id = m.id
            WHERE m.course_id = $1
            ORDER BY la.position, la.id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assets)
    }

    /// Quizzes attached to lessons of the course
    pub async fn lesson_quizzes(&self, course_id: i64) -> Result<Vec<Quiz>, DatabaseError> {
        let quizzes = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT q.id, q.course_id, q.lesson_id, q.title, q.time_limit_s,
                   q.attempts_allowed, q.pass_score
            FROM quizzes q
            JOIN lessons l ON q.lesson_id = l.id
            JOIN modules m ON l.module_id = m.id
            WHERE m.course_id = $1
            ORDER BY q.id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(quizzes)
    }
}
