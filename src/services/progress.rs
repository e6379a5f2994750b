//! Lesson watch progress and derived course completion.
//!
//! A lesson counts as completed once the reported watch position reaches
//! 90% of its declared duration, or when the student marks it complete.
//! Completion is sticky and `watched_s` only ever grows. Every lesson write
//! recomputes the owning course's percent in the same transaction.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use tracing::debug;

use crate::database::manager::DatabaseError;
use crate::database::models::{CourseProgress, LessonProgress, LessonTiming};
use crate::database::repositories::progress as repo;

use super::{ServiceError, ServiceResult};

/// Watched share of the duration that completes a lesson, as a fraction of ten
const COMPLETION_TENTHS: i64 = 9;

/// `watched >= duration * 0.9`, evaluated in integers. Lessons without a
/// positive duration never complete by watch time.
pub fn is_watch_complete(duration_s: Option<i32>, watched_seconds: i32) -> bool {
    match duration_s {
        Some(duration) if duration > 0 => {
            i64::from(watched_seconds) * 10 >= i64::from(duration) * COMPLETION_TENTHS
        }
        _ => false,
    }
}

/// `round(100 * completed / total)` with halves rounded up; 0 for an empty course
pub fn course_percent(completed: i64, total: i64) -> i32 {
    if total <= 0 {
        return 0;
    }
    let completed = completed.clamp(0, total);
    ((200 * completed + total) / (2 * total)) as i32
}

/// Result of one lesson write plus the recomputed course row
#[derive(Debug, Clone)]
pub struct ProgressWrite {
    pub lesson: LessonProgress,
    pub course: CourseProgress,
}

/// Persistence seam for the progress rules
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn lesson_timing(&self, lesson_id: i64) -> Result<Option<LessonTiming>, DatabaseError>;

    /// Upsert the lesson row (high-water `watched_s`, sticky completion)
    /// and recompute the course percent atomically
    async fn record_watch(
        &self,
        student_id: i64,
        timing: &LessonTiming,
        watched_s: i32,
        completed: bool,
    ) -> Result<ProgressWrite, DatabaseError>;

    async fn record_completion(&self, student_id: i64, timing: &LessonTiming) -> Result<ProgressWrite, DatabaseError>;

    async fn course_progress(&self, student_id: i64, course_id: i64) -> Result<Option<CourseProgress>, DatabaseError>;
}

/// Postgres-backed store; each write is one transaction
#[derive(Clone)]
pub struct PgProgressStore {
    pool: PgPool,
}

impl PgProgressStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

}

async fn recompute_course(
    conn: &mut PgConnection,
    student_id: i64,
    course_id: i64,
) -> Result<CourseProgress, DatabaseError> {
    let (total, completed) = repo::count_course_lessons(&mut *conn, student_id, course_id).await?;
    let percent = course_percent(completed, total);
    debug!(
        "Course {} progress for student {}: {}/{} lessons -> {}%",
        course_id, student_id, completed, total, percent
    );
    repo::upsert_course_progress(conn, student_id, course_id, percent).await
}

/// Lock every progress row of a course before its lesson set changes.
/// Returns the students to pass to [`rederive_course_percents`] once the
/// change is written, inside the same transaction.
pub async fn lock_course_students(conn: &mut PgConnection, course_id: i64) -> Result<Vec<i64>, DatabaseError> {
    let students = repo::students_with_course_progress(&mut *conn, course_id).await?;
    for student_id in &students {
        repo::lock_course_progress(&mut *conn, *student_id, course_id).await?;
    }
    Ok(students)
}

/// Recompute stored percents after lessons were added or removed
pub async fn rederive_course_percents(
    conn: &mut PgConnection,
    course_id: i64,
    students: &[i64],
) -> Result<(), DatabaseError> {
    for student_id in students {
        recompute_course(&mut *conn, *student_id, course_id).await?;
    }
    if !students.is_empty() {
        debug!("Re-derived course {} progress for {} students", course_id, students.len());
    }
    Ok(())
}

#[async_trait]
impl ProgressStore for PgProgressStore {
    async fn lesson_timing(&self, lesson_id: i64) -> Result<Option<LessonTiming>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        repo::lesson_timing(&mut conn, lesson_id).await
    }

    async fn record_watch(
        &self,
        student_id: i64,
        timing: &LessonTiming,
        watched_s: i32,
        completed: bool,
    ) -> Result<ProgressWrite, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        repo::lock_course_progress(&mut tx, student_id, timing.course_id).await?;
        let lesson = repo::upsert_lesson_watch(&mut tx, student_id, timing.lesson_id, watched_s, completed).await?;
        let course = recompute_course(&mut tx, student_id, timing.course_id).await?;
        tx.commit().await?;

        Ok(ProgressWrite { lesson, course })
    }

    async fn record_completion(&self, student_id: i64, timing: &LessonTiming) -> Result<ProgressWrite, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        repo::lock_course_progress(&mut tx, student_id, timing.course_id).await?;
        let lesson = repo::mark_lesson_completed(&mut tx, student_id, timing.lesson_id).await?;
        let course = recompute_course(&mut tx, student_id, timing.course_id).await?;
        tx.commit().await?;

        Ok(ProgressWrite { lesson, course })
    }

    async fn course_progress(&self, student_id: i64, course_id: i64) -> Result<Option<CourseProgress>, DatabaseError> {
        repo::find_course_progress(&self.pool, student_id, course_id).await
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub success: bool,
    pub watched_seconds: i32,
    pub is_completed: bool,
    pub percent: i32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CompletionReport {
    pub success: bool,
    pub percent: i32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgressView {
    pub percent: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct ProgressService {
    store: Arc<dyn ProgressStore>,
}

impl ProgressService {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }

    pub async fn update_lesson_progress(
        &self,
        student_id: i64,
        lesson_id: i64,
        watched_seconds: i64,
    ) -> ServiceResult<ProgressReport> {
        if watched_seconds < 0 {
            return Err(ServiceError::validation("watchedSeconds", "must be a non-negative integer"));
        }
        let watched_seconds = i32::try_from(watched_seconds)
            .map_err(|_| ServiceError::validation("watchedSeconds", "is out of range"))?;

        let timing = self.require_lesson(lesson_id).await?;
        let completed = is_watch_complete(timing.duration_s, watched_seconds);

        let write = self
            .store
            .record_watch(student_id, &timing, watched_seconds, completed)
            .await?;

        debug!(
            "Lesson {} progress for student {}: reported {}s, stored {}s, completed={}",
            lesson_id, student_id, watched_seconds, write.lesson.watched_s, write.lesson.is_completed
        );

        Ok(ProgressReport {
            success: true,
            watched_seconds: write.lesson.watched_s,
            is_completed: write.lesson.is_completed,
            percent: write.course.percent,
        })
    }

    pub async fn mark_lesson_complete(&self, student_id: i64, lesson_id: i64) -> ServiceResult<CompletionReport> {
        let timing = self.require_lesson(lesson_id).await?;
        let write = self.store.record_completion(student_id, &timing).await?;

        Ok(CompletionReport {
            success: true,
            percent: write.course.percent,
        })
    }

    /// Stored course percent; 0 when the student has no progress yet
    pub async fn course_progress(&self, student_id: i64, course_id: i64) -> ServiceResult<CourseProgressView> {
        let view = match self.store.course_progress(student_id, course_id).await? {
            Some(progress) => CourseProgressView {
                percent: progress.percent,
                updated_at: Some(progress.updated_at),
            },
            None => CourseProgressView {
                percent: 0,
                updated_at: None,
            },
        };
        Ok(view)
    }

    async fn require_lesson(&self, lesson_id: i64) -> ServiceResult<LessonTiming> {
        self.store
            .lesson_timing(lesson_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Lesson not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryProgressStore;

    fn service_with(store: MemoryProgressStore) -> (ProgressService, MemoryProgressStore) {
        (ProgressService::new(Arc::new(store.clone())), store)
    }

    #[test]
    fn ninety_percent_threshold_is_inclusive() {
        assert!(is_watch_complete(Some(600), 540));
        assert!(!is_watch_complete(Some(600), 539));
        assert!(is_watch_complete(Some(600), 10_000));
        // 0.9 * 7 = 6.3, so 6 is short and 7 is enough
        assert!(!is_watch_complete(Some(7), 6));
        assert!(is_watch_complete(Some(7), 7));
    }

    #[test]
    fn lessons_without_duration_never_complete_by_watching() {
        assert!(!is_watch_complete(None, 0));
        assert!(!is_watch_complete(None, i32::MAX));
        assert!(!is_watch_complete(Some(0), 100));
        assert!(!is_watch_complete(Some(-5), 100));
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(course_percent(1, 4), 25);
        assert_eq!(course_percent(1, 3), 33);
        assert_eq!(course_percent(2, 3), 67);
        assert_eq!(course_percent(1, 8), 13);
        assert_eq!(course_percent(4, 4), 100);
        assert_eq!(course_percent(0, 0), 0);
        assert_eq!(course_percent(0, 5), 0);
    }

    #[test]
    fn percent_matches_float_formula() {
        for total in 1..=40i64 {
            for completed in 0..=total {
                let expected = (100.0 * completed as f64 / total as f64).round() as i32;
                assert_eq!(course_percent(completed, total), expected, "{}/{}", completed, total);
            }
        }
    }

    #[tokio::test]
    async fn report_at_threshold_completes_lesson() {
        let (service, _) = service_with(MemoryProgressStore::with_course(1, &[(10, Some(600))]));

        let report = service.update_lesson_progress(7, 10, 540).await.unwrap();
        assert!(report.is_completed);
        assert_eq!(report.watched_seconds, 540);
        assert_eq!(report.percent, 100);
    }

    #[tokio::test]
    async fn report_below_threshold_does_not_complete() {
        let (service, _) = service_with(MemoryProgressStore::with_course(1, &[(10, Some(600))]));

        let report = service.update_lesson_progress(7, 10, 539).await.unwrap();
        assert!(!report.is_completed);
        assert_eq!(report.percent, 0);
    }

    #[tokio::test]
    async fn completion_is_sticky_and_watch_time_never_decreases() {
        let (service, store) = service_with(MemoryProgressStore::with_course(1, &[(10, Some(600)), (11, Some(600))]));

        service.update_lesson_progress(7, 10, 590).await.unwrap();
        let report = service.update_lesson_progress(7, 10, 30).await.unwrap();

        assert!(report.is_completed);
        assert_eq!(report.watched_seconds, 590);
        assert_eq!(report.percent, 50);
        assert_eq!(store.lesson_row_count().await, 1);
    }

    #[tokio::test]
    async fn repeated_report_is_idempotent() {
        let (service, store) = service_with(MemoryProgressStore::with_course(1, &[(10, Some(600)), (11, Some(300))]));

        let first = service.update_lesson_progress(7, 11, 280).await.unwrap();
        let second = service.update_lesson_progress(7, 11, 280).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.lesson_row_count().await, 1);
    }

    #[tokio::test]
    async fn one_of_four_lessons_is_twenty_five_percent() {
        let lessons = [(1, Some(100)), (2, Some(100)), (3, Some(100)), (4, Some(100))];
        let (service, _) = service_with(MemoryProgressStore::with_course(9, &lessons));

        service.update_lesson_progress(5, 1, 100).await.unwrap();
        let view = service.course_progress(5, 9).await.unwrap();
        assert_eq!(view.percent, 25);
        assert!(view.updated_at.is_some());
    }

    #[tokio::test]
    async fn durationless_lesson_completes_only_when_marked() {
        let (service, _) = service_with(MemoryProgressStore::with_course(1, &[(10, None), (11, Some(60))]));

        let report = service.update_lesson_progress(7, 10, 99_999).await.unwrap();
        assert!(!report.is_completed);

        let completion = service.mark_lesson_complete(7, 10).await.unwrap();
        assert!(completion.success);
        assert_eq!(completion.percent, 50);
    }

    #[tokio::test]
    async fn unknown_lesson_is_not_found() {
        let (service, _) = service_with(MemoryProgressStore::with_course(1, &[(10, Some(60))]));

        let err = service.update_lesson_progress(7, 404, 10).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = service.mark_lesson_complete(7, 404).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn negative_watch_time_is_rejected() {
        let (service, store) = service_with(MemoryProgressStore::with_course(1, &[(10, Some(60))]));

        let err = service.update_lesson_progress(7, 10, -1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: "watchedSeconds", .. }));
        assert_eq!(store.lesson_row_count().await, 0);
    }

    #[tokio::test]
    async fn missing_course_row_reads_as_zero() {
        let (service, _) = service_with(MemoryProgressStore::with_course(1, &[(10, Some(60))]));

        let view = service.course_progress(7, 1).await.unwrap();
        assert_eq!(view, CourseProgressView { percent: 0, updated_at: None });
        assert_eq!(serde_json::to_value(&view).unwrap(), serde_json::json!({ "percent": 0 }));
    }
}
