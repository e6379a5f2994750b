use sqlx::{PgConnection, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::{AttemptAnswer, Quiz, QuizAttempt, QuizOption, QuizQuestion, QuizSummary};

const ATTEMPT_COLUMNS: &str =
    "id, quiz_id, student_id, attempt_no, started_at, submitted_at, score, passed";

pub struct QuizRepository {
    pool: PgPool,
}

impl QuizRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find(&self, quiz_id: i64) -> Result<Option<Quiz>, DatabaseError> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT id, course_id, lesson_id, title, time_limit_s, attempts_allowed, pass_score
            FROM quizzes
            WHERE id = $1
            "#,
        )
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quiz)
    }

    pub async fn questions(&self, quiz_id: i64) -> Result<Vec<QuizQuestion>, DatabaseError> {
        let questions = sqlx::query_as::<_, QuizQuestion>(
            r#"
            SELECT id, quiz_id, question, qtype, position, points
            FROM quiz_questions
            WHERE quiz_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    /// Options for every question of the quiz in one round trip
    pub async fn options(&self, quiz_id: i64) -> Result<Vec<QuizOption>, DatabaseError> {
        let options = sqlx::query_as::<_, QuizOption>(
            r#"
            SELECT o.id, o.question_id, o.option_text, o.is_correct, o.position
            FROM quiz_options o
            JOIN quiz_questions qq ON o.question_id = qq.id
            WHERE qq.quiz_id = $1
            ORDER BY o.position, o.id
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(options)
    }

    /// Every attempt the student has started, submitted or not
    pub async fn count_attempts(&self, quiz_id: i64, student_id: i64) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM quiz_attempts WHERE quiz_id = $1 AND student_id = $2",
        )
        .bind(quiz_id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn create_attempt(
        &self,
        quiz_id: i64,
        student_id: i64,
        attempt_no: i32,
    ) -> Result<QuizAttempt, DatabaseError> {
        let attempt = sqlx::query_as::<_, QuizAttempt>(&format!(
            r#"
            INSERT INTO quiz_attempts (quiz_id, student_id, attempt_no, started_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING {}
            "#,
            ATTEMPT_COLUMNS
        ))
        .bind(quiz_id)
        .bind(student_id)
        .bind(attempt_no)
        .fetch_one(&self.pool)
        .await?;

        Ok(attempt)
    }

    pub async fn find_attempt(&self, attempt_id: i64) -> Result<Option<QuizAttempt>, DatabaseError> {
        let attempt = sqlx::query_as::<_, QuizAttempt>(&format!(
            "SELECT {} FROM quiz_attempts WHERE id = $1",
            ATTEMPT_COLUMNS
        ))
        .bind(attempt_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    pub async fn list_attempts(&self, quiz_id: i64, student_id: i64) -> Result<Vec<QuizAttempt>, DatabaseError> {
        let attempts = sqlx::query_as::<_, QuizAttempt>(&format!(
            r#"
            SELECT {}
            FROM quiz_attempts
            WHERE quiz_id = $1 AND student_id = $2
            ORDER BY attempt_no DESC
            "#,
            ATTEMPT_COLUMNS
        ))
        .bind(quiz_id)
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }

    pub async fn attempt_answers(&self, attempt_id: i64) -> Result<Vec<AttemptAnswer>, DatabaseError> {
        let answers = sqlx::query_as::<_, AttemptAnswer>(
            r#"
            SELECT a.question_id, a.selected_option_ids, a.is_correct
            FROM quiz_attempt_answers a
            JOIN quiz_questions qq ON a.question_id = qq.id
            WHERE a.attempt_id = $1
            ORDER BY qq.position, qq.id
            "#,
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(answers)
    }

    pub async fn list_for_course(&self, course_id: i64) -> Result<Vec<QuizSummary>, DatabaseError> {
        let quizzes = sqlx::query_as::<_, QuizSummary>(
            r#"
            SELECT q.id, q.lesson_id, q.title, q.time_limit_s, q.attempts_allowed, q.pass_score,
                   l.title AS lesson_title
            FROM quizzes q
            LEFT JOIN lessons l ON q.lesson_id = l.id
            WHERE q.course_id = $1
            ORDER BY q.id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(quizzes)
    }
}

/// Close an open attempt. Returns false when it was already submitted.
pub async fn finish_attempt(
    conn: &mut PgConnection,
    attempt_id: i64,
    score: i32,
    passed: bool,
) -> Result<bool, DatabaseError> {
    let result = sqlx::query(
        r#"
        UPDATE quiz_attempts
        SET submitted_at = NOW(), score = $2, passed = $3
        WHERE id = $1 AND submitted_at IS NULL
        "#,
    )
    .bind(attempt_id)
    .bind(score)
    .bind(passed)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn save_answer(
    conn: &mut PgConnection,
    attempt_id: i64,
    question_id: i64,
    selected_option_ids: &[i64],
    is_correct: bool,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO quiz_attempt_answers (attempt_id, question_id, selected_option_ids, is_correct)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (attempt_id, question_id)
        DO UPDATE SET selected_option_ids = EXCLUDED.selected_option_ids,
                      is_correct = EXCLUDED.is_correct
        "#,
    )
    .bind(attempt_id)
    .bind(question_id)
    .bind(selected_option_ids)
    .bind(is_correct)
    .execute(conn)
    .await?;

    Ok(())
}
