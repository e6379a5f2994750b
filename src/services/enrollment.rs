use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::info;

use crate::database::models::{EnrolledCourseRow, Enrollment};
use crate::database::repositories::audit_log::{self, AuditEvent};
use crate::database::repositories::enrollment::{self as repo, EnrollmentRepository};

use super::review::round_rating;
use super::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorView {
    pub id: i64,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledCourseView {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price_cents: i64,
    pub currency: String,
    pub avg_rating: f64,
    pub review_count: i64,
    pub instructor: InstructorView,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentProgress {
    pub percent: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentView {
    pub enrollment_id: i64,
    pub enrollment_status: String,
    pub enrolled_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub course: EnrolledCourseView,
    pub progress: EnrollmentProgress,
}

impl From<EnrolledCourseRow> for EnrollmentView {
    fn from(row: EnrolledCourseRow) -> Self {
        Self {
            enrollment_id: row.enrollment_id,
            enrollment_status: row.enrollment_status,
            enrolled_at: row.enrolled_at,
            expires_at: row.expires_at,
            course: EnrolledCourseView {
                id: row.course_id,
                title: row.title,
                slug: row.slug,
                description: row.description,
                thumbnail_url: row.thumbnail_url,
                price_cents: row.price_cents,
                currency: row.currency,
                avg_rating: round_rating(row.avg_rating),
                review_count: row.review_count,
                instructor: InstructorView {
                    id: row.instructor_id,
                    name: row.instructor_name,
                    avatar_url: row.instructor_avatar,
                },
            },
            progress: EnrollmentProgress {
                percent: row.progress_percent,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MyCourses {
    pub enrollments: Vec<EnrollmentView>,
    pub total: usize,
}

pub struct EnrollmentService {
    pool: PgPool,
    enrollments: EnrollmentRepository,
}

impl EnrollmentService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            enrollments: EnrollmentRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn my_courses(&self, student_id: i64) -> ServiceResult<MyCourses> {
        let enrollments: Vec<EnrollmentView> = self
            .enrollments
            .list_active(student_id)
            .await?
            .into_iter()
            .map(EnrollmentView::from)
            .collect();

        Ok(MyCourses {
            total: enrollments.len(),
            enrollments,
        })
    }

    pub async fn enroll(&self, student_id: i64, course_id: i64) -> ServiceResult<Enrollment> {
        let course = self
            .enrollments
            .course_availability(course_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Course not found"))?;

        if !course.is_published {
            return Err(ServiceError::BadRequest("Course is not available for enrollment".to_string()));
        }

        // Enrollment row and its audit entry commit together
        let mut tx = self.pool.begin().await?;
        let Some(enrollment) = repo::activate(&mut tx, course_id, student_id).await? else {
            return Err(ServiceError::Conflict("Already enrolled in this course".to_string()));
        };

        audit_log::record(
            &mut tx,
            AuditEvent {
                actor_id: Some(student_id),
                action: "ENROLL",
                target_type: "course",
                target_id: Some(course_id),
                meta: Some(json!({ "enrollmentId": enrollment.id })),
            },
        )
        .await?;
        tx.commit().await?;

        info!("Student {} enrolled in course {}", student_id, course_id);
        Ok(enrollment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enrolled_row_nests_course_and_instructor() {
        let row = EnrolledCourseRow {
            enrollment_id: 5,
            enrollment_status: "ACTIVE".to_string(),
            enrolled_at: Utc::now(),
            expires_at: None,
            course_id: 9,
            title: "Rust for Web".to_string(),
            slug: "rust-for-web".to_string(),
            description: None,
            thumbnail_url: None,
            price_cents: 0,
            currency: "VND".to_string(),
            instructor_id: 2,
            instructor_name: "Linh Tran".to_string(),
            instructor_avatar: None,
            progress_percent: 25,
            avg_rating: 4.333,
            review_count: 3,
        };

        let json = serde_json::to_value(EnrollmentView::from(row)).unwrap();
        assert_eq!(json["enrollmentId"], 5);
        assert_eq!(json["course"]["id"], 9);
        assert_eq!(json["course"]["instructor"]["name"], "Linh Tran");
        assert_eq!(json["progress"]["percent"], 25);
        assert_eq!(json["course"]["avgRating"], 4.3);
        assert_eq!(json["course"]["reviewCount"], 3);
    }
}
