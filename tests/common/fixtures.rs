//! Row builders for integration tests. Every call creates fresh rows with
//! unique emails and slugs so test files can share one database.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use sqlx::PgPool;

static COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn unique(prefix: &str) -> String {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{}-{}-{}-{}", prefix, std::process::id(), nanos, n)
}

pub async fn user(pool: &PgPool, role: &str) -> Result<i64> {
    let tag = unique(&role.to_lowercase());
    let id = sqlx::query_scalar(
        "INSERT INTO users (email, full_name, role) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(format!("{}@example.test", tag))
    .bind(format!("User {}", tag))
    .bind(role)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub struct SeededCourse {
    pub course_id: i64,
    pub title: String,
    pub module_id: i64,
    pub lesson_ids: Vec<i64>,
}

/// One module holding one lesson per entry of `durations`
pub async fn course(pool: &PgPool, instructor_id: i64, published: bool, durations: &[Option<i32>]) -> Result<SeededCourse> {
    let slug = unique("course");
    let title = format!("Course {}", slug);
    let course_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO courses (instructor_id, title, slug, description, is_published)
        VALUES ($1, $2, $3, 'Seeded course', $4)
        RETURNING id
        "#,
    )
    .bind(instructor_id)
    .bind(&title)
    .bind(&slug)
    .bind(published)
    .fetch_one(pool)
    .await?;

    let module_id: i64 = sqlx::query_scalar(
        "INSERT INTO modules (course_id, title, position) VALUES ($1, 'Module 1', 1) RETURNING id",
    )
    .bind(course_id)
    .fetch_one(pool)
    .await?;

    let mut lesson_ids = Vec::new();
    for (i, duration) in durations.iter().enumerate() {
        let lesson_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO lessons (module_id, title, position, duration_s)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(module_id)
        .bind(format!("Lesson {}", i + 1))
        .bind(i as i32 + 1)
        .bind(*duration)
        .fetch_one(pool)
        .await?;
        lesson_ids.push(lesson_id);
    }

    Ok(SeededCourse {
        course_id,
        title,
        module_id,
        lesson_ids,
    })
}

pub async fn asset(pool: &PgPool, lesson_id: i64, kind: &str, position: i32) -> Result<i64> {
    let id = sqlx::query_scalar(
        r#"
        INSERT INTO lesson_assets (lesson_id, asset_kind, url, position)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(lesson_id)
    .bind(kind)
    .bind(format!("https://cdn.example.test/{}", unique("asset")))
    .bind(position)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn enroll(pool: &PgPool, course_id: i64, student_id: i64) -> Result<()> {
    sqlx::query("INSERT INTO enrollments (course_id, student_id, status) VALUES ($1, $2, 'ACTIVE')")
        .bind(course_id)
        .bind(student_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub struct SeededQuiz {
    pub quiz_id: i64,
    /// (question id, correct option ids, wrong option id)
    pub questions: Vec<(i64, Vec<i64>, i64)>,
}

/// Two questions: a 1-point single choice and a 2-point multi choice
pub async fn quiz(pool: &PgPool, course_id: i64, lesson_id: Option<i64>, attempts_allowed: Option<i32>) -> Result<SeededQuiz> {
    let quiz_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO quizzes (course_id, lesson_id, title, attempts_allowed, pass_score)
        VALUES ($1, $2, 'Checkpoint', $3, 70)
        RETURNING id
        "#,
    )
    .bind(course_id)
    .bind(lesson_id)
    .bind(attempts_allowed)
    .fetch_one(pool)
    .await?;

    let mut questions = Vec::new();
    for (position, (qtype, points, correct_count)) in [("SINGLE", 1, 1), ("MULTI", 2, 2)].into_iter().enumerate() {
        let question_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO quiz_questions (quiz_id, question, qtype, position, points)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(quiz_id)
        .bind(format!("Question {}", position + 1))
        .bind(qtype)
        .bind(position as i32 + 1)
        .bind(points)
        .fetch_one(pool)
        .await?;

        let mut correct = Vec::new();
        for i in 0..correct_count {
            correct.push(option(pool, question_id, true, i + 1).await?);
        }
        let wrong = option(pool, question_id, false, correct_count + 1).await?;
        questions.push((question_id, correct, wrong));
    }

    Ok(SeededQuiz { quiz_id, questions })
}

async fn option(pool: &PgPool, question_id: i64, is_correct: bool, position: i32) -> Result<i64> {
    let id = sqlx::query_scalar(
        r#"
        INSERT INTO quiz_options (question_id, option_text, is_correct, position)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(question_id)
    .bind(format!("Option {}", position))
    .bind(is_correct)
    .bind(position)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn set_price(pool: &PgPool, course_id: i64, price_cents: i64) -> Result<()> {
    sqlx::query("UPDATE courses SET price_cents = $2 WHERE id = $1")
        .bind(course_id)
        .bind(price_cents)
        .execute(pool)
        .await?;
    Ok(())
}

/// Tag with a unique slug attached to every given course; returns the slug
pub async fn tag(pool: &PgPool, course_ids: &[i64]) -> Result<(i64, String)> {
    let slug = unique("tag");
    let tag_id: i64 = sqlx::query_scalar("INSERT INTO tags (name, slug) VALUES ($1, $1) RETURNING id")
        .bind(&slug)
        .fetch_one(pool)
        .await?;
    for course_id in course_ids {
        sqlx::query("INSERT INTO course_tags (course_id, tag_id) VALUES ($1, $2)")
            .bind(course_id)
            .bind(tag_id)
            .execute(pool)
            .await?;
    }
    Ok((tag_id, slug))
}

pub async fn review(pool: &PgPool, course_id: i64, student_id: i64, rating: i32) -> Result<i64> {
    let id = sqlx::query_scalar(
        "INSERT INTO course_reviews (course_id, student_id, rating) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(course_id)
    .bind(student_id)
    .bind(rating)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Order over `items` (course id, price) with one payment in `status`
pub async fn paid_order(pool: &PgPool, user_id: i64, items: &[(i64, i64)], status: &str) -> Result<i64> {
    let total: i64 = items.iter().map(|(_, price)| price).sum();
    let order_id: i64 = sqlx::query_scalar(
        "INSERT INTO orders (user_id, total_cents, status) VALUES ($1, $2, 'PAID') RETURNING id",
    )
    .bind(user_id)
    .bind(total)
    .fetch_one(pool)
    .await?;
    for (course_id, price) in items {
        sqlx::query("INSERT INTO order_items (order_id, course_id, price_cents) VALUES ($1, $2, $3)")
            .bind(order_id)
            .bind(course_id)
            .bind(price)
            .execute(pool)
            .await?;
    }
    sqlx::query("INSERT INTO payments (user_id, order_id, amount_cents, status) VALUES ($1, $2, $3, $4)")
        .bind(user_id)
        .bind(order_id)
        .bind(total)
        .bind(status)
        .execute(pool)
        .await?;
    Ok(order_id)
}
