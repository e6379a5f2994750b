use std::fmt;
use std::str::FromStr;

use sqlx::PgPool;
use tracing::debug;

use crate::database::models::RecFeedback;
use crate::database::repositories::FeedbackRepository;

use super::{ServiceError, ServiceResult};

/// What a student told us about a recommended course
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackAction {
    NotInterested,
    Priority,
    Hide,
}

impl FeedbackAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackAction::NotInterested => "NOT_INTERESTED",
            FeedbackAction::Priority => "PRIORITY",
            FeedbackAction::Hide => "HIDE",
        }
    }

    /// Actions that remove the course from future recommendations
    pub fn hides_course(&self) -> bool {
        matches!(self, FeedbackAction::NotInterested | FeedbackAction::Hide)
    }
}

impl FromStr for FeedbackAction {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_INTERESTED" => Ok(FeedbackAction::NotInterested),
            "PRIORITY" => Ok(FeedbackAction::Priority),
            "HIDE" => Ok(FeedbackAction::Hide),
            _ => Err(ServiceError::BadRequest("Invalid action".to_string())),
        }
    }
}

impl fmt::Display for FeedbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct RecommendationService {
    feedback: FeedbackRepository,
}

impl RecommendationService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            feedback: FeedbackRepository::new(pool),
        }
    }

    pub async fn submit_feedback(
        &self,
        user_id: i64,
        course_id: i64,
        action: FeedbackAction,
    ) -> ServiceResult<RecFeedback> {
        let saved = self.feedback.upsert(user_id, course_id, action.as_str()).await?;
        debug!(
            "User {} marked course {} as {} (hidden={})",
            user_id,
            course_id,
            action,
            action.hides_course()
        );
        Ok(saved)
    }

    pub async fn my_feedback(&self, user_id: i64) -> ServiceResult<Vec<RecFeedback>> {
        Ok(self.feedback.list_for_user(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_actions_parse() {
        assert_eq!("NOT_INTERESTED".parse::<FeedbackAction>().unwrap(), FeedbackAction::NotInterested);
        assert_eq!("PRIORITY".parse::<FeedbackAction>().unwrap(), FeedbackAction::Priority);
        assert_eq!("HIDE".parse::<FeedbackAction>().unwrap(), FeedbackAction::Hide);
    }

    #[test]
    fn unknown_or_lowercase_action_is_bad_request() {
        for raw in ["LIKE", "hide", ""] {
            assert!(matches!(raw.parse::<FeedbackAction>(), Err(ServiceError::BadRequest(_))));
        }
    }

    #[test]
    fn only_negative_feedback_hides() {
        assert!(FeedbackAction::Hide.hides_course());
        assert!(FeedbackAction::NotInterested.hides_course());
        assert!(!FeedbackAction::Priority.hides_course());
    }
}
