use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::RecFeedback;

const FEEDBACK_COLUMNS: &str = "id, user_id, course_id, feedback_type, created_at, updated_at";

pub struct FeedbackRepository {
    pool: PgPool,
}

impl FeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One feedback row per (user, course); the latest action wins
    pub async fn upsert(&self, user_id: i64, course_id: i64, action: &str) -> Result<RecFeedback, DatabaseError> {
        let feedback = sqlx::query_as::<_, RecFeedback>(&format!(
            r#"
            INSERT INTO rec_feedback (user_id, course_id, feedback_type)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, course_id)
            DO UPDATE SET feedback_type = EXCLUDED.feedback_type, updated_at = NOW()
            RETURNING {}
            "#,
            FEEDBACK_COLUMNS
        ))
        .bind(user_id)
        .bind(course_id)
        .bind(action)
        .fetch_one(&self.pool)
        .await?;

        Ok(feedback)
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<RecFeedback>, DatabaseError> {
        let feedback = sqlx::query_as::<_, RecFeedback>(&format!(
            "SELECT {} FROM rec_feedback WHERE user_id = $1 ORDER BY updated_at DESC, id DESC",
            FEEDBACK_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(feedback)
    }

    /// Courses the user asked not to be recommended again
    pub async fn hidden_course_ids(&self, user_id: i64) -> Result<Vec<i64>, DatabaseError> {
        let ids = sqlx::query_scalar(
            r#"
            SELECT course_id
            FROM rec_feedback
            WHERE user_id = $1
              AND feedback_type IN ('NOT_INTERESTED', 'HIDE')
            ORDER BY course_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
