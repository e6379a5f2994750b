//! Course reviews: one per enrolled student and course, editable only by
//! its author.

use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

use crate::database::models::{CourseReview, RatingStats};
use crate::database::repositories::{EnrollmentRepository, ReviewRepository};

use super::{is_unique_violation, ServiceError, ServiceResult};

/// Reviews shown on the public course page
pub const LATEST_REVIEWS: i64 = 3;

/// Average rounded to one decimal for display
pub fn round_rating(average: f64) -> f64 {
    (average * 10.0).round() / 10.0
}

/// Ratings are whole stars from 1 to 5
pub fn validate_rating(rating: i64) -> ServiceResult<i32> {
    match rating {
        1..=5 => Ok(rating as i32),
        _ => Err(ServiceError::validation("rating", "Rating must be between 1 and 5")),
    }
}

/// Blank comments are stored as no comment
fn normalize_comment(comment: Option<&str>) -> Option<&str> {
    comment.map(str::trim).filter(|c| !c.is_empty())
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RatingDistribution {
    #[serde(rename = "5")]
    pub five: i64,
    #[serde(rename = "4")]
    pub four: i64,
    #[serde(rename = "3")]
    pub three: i64,
    #[serde(rename = "2")]
    pub two: i64,
    #[serde(rename = "1")]
    pub one: i64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average: f64,
    pub total_reviews: i64,
    pub rating_distribution: RatingDistribution,
}

impl From<RatingStats> for RatingSummary {
    fn from(stats: RatingStats) -> Self {
        Self {
            average: round_rating(stats.average_rating),
            total_reviews: stats.total_reviews,
            rating_distribution: RatingDistribution {
                five: stats.rating_5,
                four: stats.rating_4,
                three: stats.rating_3,
                two: stats.rating_2,
                one: stats.rating_1,
            },
        }
    }
}

pub struct ReviewService {
    reviews: ReviewRepository,
    enrollments: EnrollmentRepository,
}

impl ReviewService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            reviews: ReviewRepository::new(pool.clone()),
            enrollments: EnrollmentRepository::new(pool),
        }
    }

    pub async fn submit(
        &self,
        course_id: i64,
        student_id: i64,
        rating: i64,
        comment: Option<&str>,
    ) -> ServiceResult<CourseReview> {
        let rating = validate_rating(rating)?;

        if !self.enrollments.is_active(course_id, student_id).await? {
            return Err(ServiceError::forbidden("You must be enrolled in this course to review it"));
        }

        let already_reviewed =
            || ServiceError::BadRequest("You have already reviewed this course; update your review instead".to_string());

        if self.reviews.find_for_student(course_id, student_id).await?.is_some() {
            return Err(already_reviewed());
        }

        let review = match self
            .reviews
            .create(course_id, student_id, rating, normalize_comment(comment))
            .await
        {
            Ok(review) => review,
            // Concurrent submit from the same student
            Err(e) if is_unique_violation(&e) => return Err(already_reviewed()),
            Err(e) => return Err(e.into()),
        };

        info!("Student {} rated course {} with {}", student_id, course_id, rating);
        Ok(review)
    }

    async fn require_own_review(&self, review_id: i64, student_id: i64, verb: &str) -> ServiceResult<CourseReview> {
        let review = self
            .reviews
            .find(review_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Review not found"))?;

        if review.student_id != student_id {
            return Err(ServiceError::forbidden(format!("You cannot {} this review", verb)));
        }
        Ok(review)
    }

    pub async fn update(
        &self,
        review_id: i64,
        student_id: i64,
        rating: Option<i64>,
        comment: Option<&str>,
    ) -> ServiceResult<CourseReview> {
        let rating = rating.map(validate_rating).transpose()?;
        self.require_own_review(review_id, student_id, "edit").await?;

        self.reviews
            .update(review_id, rating, normalize_comment(comment))
            .await?
            .ok_or_else(|| ServiceError::not_found("Review not found"))
    }

    pub async fn delete(&self, review_id: i64, student_id: i64) -> ServiceResult<()> {
        self.require_own_review(review_id, student_id, "delete").await?;
        if !self.reviews.delete(review_id).await? {
            return Err(ServiceError::not_found("Review not found"));
        }
        info!("Student {} deleted review {}", student_id, review_id);
        Ok(())
    }

    pub async fn my_review(&self, course_id: i64, student_id: i64) -> ServiceResult<Option<CourseReview>> {
        Ok(self.reviews.find_for_student(course_id, student_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ratings_outside_one_to_five_are_rejected() {
        assert_eq!(validate_rating(1).unwrap(), 1);
        assert_eq!(validate_rating(5).unwrap(), 5);
        for bad in [0, 6, -1] {
            assert!(matches!(validate_rating(bad), Err(ServiceError::Validation { field: "rating", .. })));
        }
    }

    #[test]
    fn average_is_rounded_to_one_decimal() {
        assert_eq!(round_rating(4.333), 4.3);
        assert_eq!(round_rating(4.25), 4.3);
        assert_eq!(round_rating(0.0), 0.0);
    }

    #[test]
    fn blank_comment_is_dropped() {
        assert_eq!(normalize_comment(Some("  ")), None);
        assert_eq!(normalize_comment(Some(" Great course ")), Some("Great course"));
        assert_eq!(normalize_comment(None), None);
    }

    #[test]
    fn distribution_serializes_by_star() {
        let stats = RatingStats {
            average_rating: 4.5,
            total_reviews: 2,
            rating_5: 1,
            rating_4: 1,
            ..RatingStats::default()
        };
        let json = serde_json::to_value(RatingSummary::from(stats)).unwrap();
        assert_eq!(json["average"], 4.5);
        assert_eq!(json["totalReviews"], 2);
        assert_eq!(json["ratingDistribution"], json!({ "5": 1, "4": 1, "3": 0, "2": 0, "1": 0 }));
    }
}
