//! `student_lesson_progress` / `student_course_progress` queries.
//!
//! Writes take a `&mut PgConnection` so callers can run the lesson upsert
//! and the course recompute inside one transaction.

use sqlx::{PgConnection, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::{CourseProgress, LessonProgress, LessonTiming};

/// Duration and owning course of a lesson
pub async fn lesson_timing(
    conn: &mut PgConnection,
    lesson_id: i64,
) -> Result<Option<LessonTiming>, DatabaseError> {
    let timing = sqlx::query_as::<_, LessonTiming>(
        r#"
        SELECT l.id AS lesson_id, m.course_id, l.duration_s
        FROM lessons l
        JOIN modules m ON l.module_id = m.id
        WHERE l.id = $1
        "#,
    )
    .bind(lesson_id)
    .fetch_optional(conn)
    .await?;

    Ok(timing)
}

/// Serialize progress writes for one (student, course) until the
/// surrounding transaction ends, so recomputed percents never interleave.
pub async fn lock_course_progress(
    conn: &mut PgConnection,
    student_id: i64,
    course_id: i64,
) -> Result<(), DatabaseError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(format!("course-progress:{}:{}", student_id, course_id))
        .execute(conn)
        .await?;
    Ok(())
}

/// Insert or raise the watch high-water mark. Completion is OR-ed with the
/// stored flag so it can never be revoked.
pub async fn upsert_lesson_watch(
    conn: &mut PgConnection,
    student_id: i64,
    lesson_id: i64,
    watched_s: i32,
    completed: bool,
) -> Result<LessonProgress, DatabaseError> {
    let progress = sqlx::query_as::<_, LessonProgress>(
        r#"
        INSERT INTO student_lesson_progress
            (student_id, lesson_id, watched_s, is_completed, last_seen_at)
        VALUES ($1, $2, $3, $4, NOW())
        ON CONFLICT (student_id, lesson_id) DO UPDATE SET
            watched_s = GREATEST(student_lesson_progress.watched_s, EXCLUDED.watched_s),
            is_completed = student_lesson_progress.is_completed OR EXCLUDED.is_completed,
            last_seen_at = NOW()
        RETURNING student_id, lesson_id, watched_s, is_completed, last_seen_at
        "#,
    )
    .bind(student_id)
    .bind(lesson_id)
    .bind(watched_s)
    .bind(completed)
    .fetch_one(conn)
    .await?;

    Ok(progress)
}

pub async fn mark_lesson_completed(
    conn: &mut PgConnection,
    student_id: i64,
    lesson_id: i64,
) -> Result<LessonProgress, DatabaseError> {
    let progress = sqlx::query_as::<_, LessonProgress>(
        r#"
        INSERT INTO student_lesson_progress
            (student_id, lesson_id, is_completed, last_seen_at)
        VALUES ($1, $2, TRUE, NOW())
        ON CONFLICT (student_id, lesson_id) DO UPDATE SET
            is_completed = TRUE,
            last_seen_at = NOW()
        RETURNING student_id, lesson_id, watched_s, is_completed, last_seen_at
        "#,
    )
    .bind(student_id)
    .bind(lesson_id)
    .fetch_one(conn)
    .await?;

    Ok(progress)
}

/// (total lessons, completed lessons) for a student's course
pub async fn count_course_lessons(
    conn: &mut PgConnection,
    student_id: i64,
    course_id: i64,
) -> Result<(i64, i64), DatabaseError> {
    let counts: (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(l.id) AS total_lessons,
            COUNT(CASE WHEN slp.is_completed THEN 1 END) AS completed_lessons
        FROM lessons l
        JOIN modules m ON l.module_id = m.id
        LEFT JOIN student_lesson_progress slp
            ON l.id = slp.lesson_id AND slp.student_id = $1
        WHERE m.course_id = $2
        "#,
    )
    .bind(student_id)
    .bind(course_id)
    .fetch_one(conn)
    .await?;

    Ok(counts)
}

pub async fn upsert_course_progress(
    conn: &mut PgConnection,
    student_id: i64,
    course_id: i64,
    percent: i32,
) -> Result<CourseProgress, DatabaseError> {
    let progress = sqlx::query_as::<_, CourseProgress>(
        r#"
        INSERT INTO student_course_progress (student_id, course_id, percent, updated_at)
        VALUES ($1, $2, $3, NOW())
        ON CONFLICT (student_id, course_id) DO UPDATE SET
            percent = EXCLUDED.percent,
            updated_at = NOW()
        RETURNING student_id, course_id, percent, updated_at
        "#,
    )
    .bind(student_id)
    .bind(course_id)
    .bind(percent)
    .fetch_one(conn)
    .await?;

    Ok(progress)
}

pub async fn find_course_progress(
    pool: &PgPool,
    student_id: i64,
    course_id: i64,
) -> Result<Option<CourseProgress>, DatabaseError> {
    let progress = sqlx::query_as::<_, CourseProgress>(
        r#"
        SELECT student_id, course_id, percent, updated_at
        FROM student_course_progress
        WHERE student_id = $1 AND course_id = $2
        "#,
    )
    .bind(student_id)
    .bind(course_id)
    .fetch_optional(pool)
    .await?;

    Ok(progress)
}

/// Students holding a progress row for the course, in lock order
pub async fn students_with_course_progress(
    conn: &mut PgConnection,
    course_id: i64,
) -> Result<Vec<i64>, DatabaseError> {
    let students = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT student_id
        FROM student_course_progress
        WHERE course_id = $1
        ORDER BY student_id
        "#,
    )
    .bind(course_id)
    .fetch_all(conn)
    .await?;

    Ok(students)
}
