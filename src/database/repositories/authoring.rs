//! Instructor-side writes on courses and their content tree.
//!
//! Every lookup is scoped by `instructor_id` so a row owned by someone else
//! reads the same as a missing row. Lesson-set changes run as free functions
//! on a `&mut PgConnection` so the caller can re-derive course progress in
//! the same transaction.

use serde_json::Value;
use sqlx::{PgConnection, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    CourseStudent, InstructorCourse, InstructorStudent, LessonAsset, LessonRecord, ModuleRecord, OwnedCourse, Quiz,
};

const OWNED_COURSE_COLUMNS: &str = "c.id, c.title, c.slug, c.description, c.thumbnail_url, c.price_cents, \
     c.currency, c.lang, c.is_published, c.created_at, c.updated_at, c.published_at";

/// Course fields written on create
pub struct NewCourse<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub description: Option<&'a str>,
    pub thumbnail_url: Option<&'a str>,
    pub price_cents: i64,
    pub currency: &'a str,
    pub lang: &'a str,
    pub is_published: bool,
}

/// Course fields written on update; `None` keeps the stored value
#[derive(Default)]
pub struct CourseChanges<'a> {
    pub title: Option<&'a str>,
    pub slug: Option<&'a str>,
    pub description: Option<&'a str>,
    pub thumbnail_url: Option<&'a str>,
    pub price_cents: Option<i64>,
    pub currency: Option<&'a str>,
    pub lang: Option<&'a str>,
    pub is_published: Option<bool>,
}

pub struct NewLesson<'a> {
    pub title: &'a str,
    pub position: Option<i32>,
    pub duration_s: Option<i32>,
    pub requires_quiz_pass: bool,
}

pub struct NewQuestion<'a> {
    pub question: &'a str,
    pub qtype: &'a str,
    pub position: i32,
    pub points: i32,
}

pub struct AuthoringRepository {
    pool: PgPool,
}

impl AuthoringRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_courses(&self, instructor_id: i64) -> Result<Vec<InstructorCourse>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {OWNED_COURSE_COLUMNS},
                   (SELECT COUNT(*) FROM enrollments e
                     WHERE e.course_id = c.id AND e.status = 'ACTIVE') AS total_students,
                   (SELECT COUNT(*) FROM modules m WHERE m.course_id = c.id) AS total_modules,
                   (SELECT COUNT(*) FROM lessons l JOIN modules m ON l.module_id = m.id
                     WHERE m.course_id = c.id) AS total_lessons
            FROM courses c
            WHERE c.instructor_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#
        );
        let courses = sqlx::query_as::<_, InstructorCourse>(&sql)
            .bind(instructor_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(courses)
    }

    pub async fn find_course(&self, course_id: i64, instructor_id: i64) -> Result<Option<OwnedCourse>, DatabaseError> {
        let sql = format!("SELECT {OWNED_COURSE_COLUMNS} FROM courses c WHERE c.id = $1 AND c.instructor_id = $2");
        let course = sqlx::query_as::<_, OwnedCourse>(&sql)
            .bind(course_id)
            .bind(instructor_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(course)
    }

    pub async fn create_course(&self, instructor_id: i64, course: &NewCourse<'_>) -> Result<OwnedCourse, DatabaseError> {
        let sql = format!(
            r#"
            INSERT INTO courses AS c
                (instructor_id, title, slug, description, thumbnail_url, price_cents,
                 currency, lang, is_published, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, CASE WHEN $9 THEN NOW() END)
            RETURNING {OWNED_COURSE_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, OwnedCourse>(&sql)
            .bind(instructor_id)
            .bind(course.title)
            .bind(course.slug)
            .bind(course.description)
            .bind(course.thumbnail_url)
            .bind(course.price_cents)
            .bind(course.currency)
            .bind(course.lang)
            .bind(course.is_published)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    /// First publish stamps `published_at`; later toggles keep it
    pub async fn update_course(
        &self,
        course_id: i64,
        instructor_id: i64,
        changes: &CourseChanges<'_>,
    ) -> Result<Option<OwnedCourse>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE courses AS c SET
                title = COALESCE($3, c.title),
                slug = COALESCE($4, c.slug),
                description = COALESCE($5, c.description),
                thumbnail_url = COALESCE($6, c.thumbnail_url),
                price_cents = COALESCE($7, c.price_cents),
                currency = COALESCE($8, c.currency),
                lang = COALESCE($9, c.lang),
                is_published = COALESCE($10, c.is_published),
                published_at = CASE WHEN $10 IS TRUE AND c.published_at IS NULL
                                    THEN NOW() ELSE c.published_at END,
                updated_at = NOW()
            WHERE c.id = $1 AND c.instructor_id = $2
            RETURNING {OWNED_COURSE_COLUMNS}
            "#
        );
        let course = sqlx::query_as::<_, OwnedCourse>(&sql)
            .bind(course_id)
            .bind(instructor_id)
            .bind(changes.title)
            .bind(changes.slug)
            .bind(changes.description)
            .bind(changes.thumbnail_url)
            .bind(changes.price_cents)
            .bind(changes.currency)
            .bind(changes.lang)
            .bind(changes.is_published)
            .fetch_optional(&self.pool)
            .await?;

        Ok(course)
    }

    /// Content, quizzes, enrollments and progress go with the course
    pub async fn delete_course(&self, course_id: i64, instructor_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1 AND instructor_id = $2")
            .bind(course_id)
            .bind(instructor_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Owning course of a module, when the instructor owns it
    pub async fn module_course(&self, module_id: i64, instructor_id: i64) -> Result<Option<i64>, DatabaseError> {
        let course_id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT m.course_id
            FROM modules m
            JOIN courses c ON m.course_id = c.id
            WHERE m.id = $1 AND c.instructor_id = $2
            "#,
        )
        .bind(module_id)
        .bind(instructor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course_id)
    }

    pub async fn lesson_course(&self, lesson_id: i64, instructor_id: i64) -> Result<Option<i64>, DatabaseError> {
        let course_id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT m.course_id
            FROM lessons l
            JOIN modules m ON l.module_id = m.id
            JOIN courses c ON m.course_id = c.id
            WHERE l.id = $1 AND c.instructor_id = $2
            "#,
        )
        .bind(lesson_id)
        .bind(instructor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course_id)
    }

    pub async fn asset_owned(&self, asset_id: i64, instructor_id: i64) -> Result<bool, DatabaseError> {
        let owned = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM lesson_assets a
                JOIN lessons l ON a.lesson_id = l.id
                JOIN modules m ON l.module_id = m.id
                JOIN courses c ON m.course_id = c.id
                WHERE a.id = $1 AND c.instructor_id = $2
            )
            "#,
        )
        .bind(asset_id)
        .bind(instructor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(owned)
    }

    pub async fn quiz_owned(&self, quiz_id: i64, instructor_id: i64) -> Result<bool, DatabaseError> {
        let owned = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM quizzes q
                JOIN courses c ON q.course_id = c.id
                WHERE q.id = $1 AND c.instructor_id = $2
            )
            "#,
        )
        .bind(quiz_id)
        .bind(instructor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(owned)
    }

    pub async fn modules(&self, course_id: i64) -> Result<Vec<ModuleRecord>, DatabaseError> {
        let modules = sqlx::query_as::<_, ModuleRecord>(
            "SELECT id, course_id, title, position FROM modules WHERE course_id = $1 ORDER BY position, id",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(modules)
    }

    /// Without a position the module goes after the existing ones
    pub async fn create_module(
        &self,
        course_id: i64,
        title: &str,
        position: Option<i32>,
    ) -> Result<ModuleRecord, DatabaseError> {
        let module = sqlx::query_as::<_, ModuleRecord>(
            r#"
            INSERT INTO modules (course_id, title, position)
            VALUES ($1, $2, COALESCE($3,
                (SELECT COALESCE(MAX(position), 0) + 1 FROM modules WHERE course_id = $1)))
            RETURNING id, course_id, title, position
            "#,
        )
        .bind(course_id)
        .bind(title)
        .bind(position)
        .fetch_one(&self.pool)
        .await?;

        Ok(module)
    }

    pub async fn update_module(
        &self,
        module_id: i64,
        title: Option<&str>,
        position: Option<i32>,
    ) -> Result<Option<ModuleRecord>, DatabaseError> {
        let module = sqlx::query_as::<_, ModuleRecord>(
            r#"
            UPDATE modules
            SET title = COALESCE($2, title), position = COALESCE($3, position)
            WHERE id = $1
            RETURNING id, course_id, title, position
            "#,
        )
        .bind(module_id)
        .bind(title)
        .bind(position)
        .fetch_optional(&self.pool)
        .await?;

        Ok(module)
    }

    pub async fn lessons(&self, module_id: i64) -> Result<Vec<LessonRecord>, DatabaseError> {
        let lessons = sqlx::query_as::<_, LessonRecord>(
            r#"
            SELECT id, module_id, title, position, duration_s, requires_quiz_pass
            FROM lessons
            WHERE module_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(module_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lessons)
    }

    pub async fn update_lesson(
        &self,
        lesson_id: i64,
        title: Option<&str>,
        position: Option<i32>,
        duration_s: Option<i32>,
        requires_quiz_pass: Option<bool>,
    ) -> Result<Option<LessonRecord>, DatabaseError> {
        let lesson = sqlx::query_as::<_, LessonRecord>(
            r#"
            UPDATE lessons SET
                title = COALESCE($2, title),
                position = COALESCE($3, position),
                duration_s = COALESCE($4, duration_s),
                requires_quiz_pass = COALESCE($5, requires_quiz_pass)
            WHERE id = $1
            RETURNING id, module_id, title, position, duration_s, requires_quiz_pass
            "#,
        )
        .bind(lesson_id)
        .bind(title)
        .bind(position)
        .bind(duration_s)
        .bind(requires_quiz_pass)
        .fetch_optional(&self.pool)
        .await?;

        Ok(lesson)
    }

    pub async fn assets(&self, lesson_id: i64) -> Result<Vec<LessonAsset>, DatabaseError> {
        let assets = sqlx::query_as::<_, LessonAsset>(
            r#"
            SELECT id, lesson_id, asset_kind, url, meta, position
            FROM lesson_assets
            WHERE lesson_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(lesson_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assets)
    }

    pub async fn create_asset(
        &self,
        lesson_id: i64,
        asset_kind: &str,
        url: &str,
        meta: Option<&Value>,
        position: Option<i32>,
    ) -> Result<LessonAsset, DatabaseError> {
        let asset = sqlx::query_as::<_, LessonAsset>(
            r#"
            INSERT INTO lesson_assets (lesson_id, asset_kind, url, meta, position)
            VALUES ($1, $2, $3, $4, COALESCE($5,
                (SELECT COALESCE(MAX(position), 0) + 1 FROM lesson_assets WHERE lesson_id = $1)))
            RETURNING id, lesson_id, asset_kind, url, meta, position
            "#,
        )
        .bind(lesson_id)
        .bind(asset_kind)
        .bind(url)
        .bind(meta)
        .bind(position)
        .fetch_one(&self.pool)
        .await?;

        Ok(asset)
    }

    pub async fn update_asset(
        &self,
        asset_id: i64,
        asset_kind: Option<&str>,
        url: Option<&str>,
        meta: Option<&Value>,
        position: Option<i32>,
    ) -> Result<Option<LessonAsset>, DatabaseError> {
        let asset = sqlx::query_as::<_, LessonAsset>(
            r#"
            UPDATE lesson_assets SET
                asset_kind = COALESCE($2, asset_kind),
                url = COALESCE($3, url),
                meta = COALESCE($4, meta),
                position = COALESCE($5, position)
            WHERE id = $1
            RETURNING id, lesson_id, asset_kind, url, meta, position
            "#,
        )
        .bind(asset_id)
        .bind(asset_kind)
        .bind(url)
        .bind(meta)
        .bind(position)
        .fetch_optional(&self.pool)
        .await?;

        Ok(asset)
    }

    pub async fn delete_asset(&self, asset_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM lesson_assets WHERE id = $1")
            .bind(asset_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn update_quiz(
        &self,
        quiz_id: i64,
        title: Option<&str>,
        time_limit_s: Option<i32>,
        attempts_allowed: Option<i32>,
        pass_score: Option<i32>,
    ) -> Result<Option<Quiz>, DatabaseError> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            UPDATE quizzes SET
                title = COALESCE($2, title),
                time_limit_s = COALESCE($3, time_limit_s),
                attempts_allowed = COALESCE($4, attempts_allowed),
                pass_score = COALESCE($5, pass_score)
            WHERE id = $1
            RETURNING id, course_id, lesson_id, title, time_limit_s, attempts_allowed, pass_score
            "#,
        )
        .bind(quiz_id)
        .bind(title)
        .bind(time_limit_s)
        .bind(attempts_allowed)
        .bind(pass_score)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quiz)
    }

    /// Questions, options and attempts cascade
    pub async fn delete_quiz(&self, quiz_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(quiz_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn course_students(&self, course_id: i64) -> Result<Vec<CourseStudent>, DatabaseError> {
        let students = sqlx::query_as::<_, CourseStudent>(
            r#"
            SELECT u.id, u.full_name, u.email, u.avatar_url,
                   e.id AS enrollment_id, e.status, e.enrolled_at,
                   COALESCE(scp.percent, 0) AS progress_percent
            FROM enrollments e
            JOIN users u ON e.student_id = u.id
            LEFT JOIN student_course_progress scp
                ON scp.student_id = e.student_id AND scp.course_id = e.course_id
            WHERE e.course_id = $1
            ORDER BY e.enrolled_at DESC, e.id DESC
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    /// Distinct students across all of an instructor's courses
    pub async fn instructor_students(&self, instructor_id: i64) -> Result<Vec<InstructorStudent>, DatabaseError> {
        let students = sqlx::query_as::<_, InstructorStudent>(
            r#"
            SELECT u.id, u.full_name, u.email, u.avatar_url,
                   COUNT(DISTINCT e.course_id) AS enrolled_courses_count
            FROM enrollments e
            JOIN courses c ON e.course_id = c.id
            JOIN users u ON e.student_id = u.id
            WHERE c.instructor_id = $1
            GROUP BY u.id, u.full_name, u.email, u.avatar_url
            ORDER BY u.full_name, u.id
            "#,
        )
        .bind(instructor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }
}

/// Without a position the lesson goes after the module's existing ones
pub async fn insert_lesson(
    conn: &mut PgConnection,
    module_id: i64,
    lesson: &NewLesson<'_>,
) -> Result<LessonRecord, DatabaseError> {
    let created = sqlx::query_as::<_, LessonRecord>(
        r#"
        INSERT INTO lessons (module_id, title, position, duration_s, requires_quiz_pass)
        VALUES ($1, $2, COALESCE($3,
            (SELECT COALESCE(MAX(position), 0) + 1 FROM lessons WHERE module_id = $1)), $4, $5)
        RETURNING id, module_id, title, position, duration_s, requires_quiz_pass
        "#,
    )
    .bind(module_id)
    .bind(lesson.title)
    .bind(lesson.position)
    .bind(lesson.duration_s)
    .bind(lesson.requires_quiz_pass)
    .fetch_one(conn)
    .await?;

    Ok(created)
}

pub async fn delete_lesson(conn: &mut PgConnection, lesson_id: i64) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM lessons WHERE id = $1")
        .bind(lesson_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Lessons and their progress rows cascade with the module
pub async fn delete_module(conn: &mut PgConnection, module_id: i64) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM modules WHERE id = $1")
        .bind(module_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn insert_quiz(
    conn: &mut PgConnection,
    course_id: i64,
    lesson_id: i64,
    title: &str,
    time_limit_s: Option<i32>,
    attempts_allowed: Option<i32>,
    pass_score: i32,
) -> Result<Quiz, DatabaseError> {
    let quiz = sqlx::query_as::<_, Quiz>(
        r#"
        INSERT INTO quizzes (course_id, lesson_id, title, time_limit_s, attempts_allowed, pass_score)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, course_id, lesson_id, title, time_limit_s, attempts_allowed, pass_score
        "#,
    )
    .bind(course_id)
    .bind(lesson_id)
    .bind(title)
    .bind(time_limit_s)
    .bind(attempts_allowed)
    .bind(pass_score)
    .fetch_one(conn)
    .await?;

    Ok(quiz)
}

pub async fn insert_question(
    conn: &mut PgConnection,
    quiz_id: i64,
    question: &NewQuestion<'_>,
) -> Result<i64, DatabaseError> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO quiz_questions (quiz_id, question, qtype, position, points)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(quiz_id)
    .bind(question.question)
    .bind(question.qtype)
    .bind(question.position)
    .bind(question.points)
    .fetch_one(conn)
    .await?;

    Ok(id)
}

pub async fn insert_option(
    conn: &mut PgConnection,
    question_id: i64,
    option_text: &str,
    is_correct: bool,
    position: i32,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO quiz_options (question_id, option_text, is_correct, position)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(question_id)
    .bind(option_text)
    .bind(is_correct)
    .bind(position)
    .execute(conn)
    .await?;

    Ok(())
}
