//! Course content tree for an enrolled student.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::PgPool;

use crate::database::models::{CourseSummary, LessonAsset, LessonRow, ModuleRow, Quiz};
use crate::database::repositories::{CourseRepository, EnrollmentRepository};

use super::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonQuizView {
    pub id: i64,
    pub title: String,
    pub time_limit_s: Option<i32>,
    pub attempts_allowed: Option<i32>,
    pub pass_score: i32,
}

impl From<Quiz> for LessonQuizView {
    fn from(quiz: Quiz) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title,
            time_limit_s: quiz.time_limit_s,
            attempts_allowed: quiz.attempts_allowed,
            pass_score: quiz.pass_score,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonView {
    pub id: i64,
    pub title: String,
    pub position: i32,
    pub duration_s: Option<i32>,
    pub requires_quiz_pass: bool,
    pub watched_s: i32,
    pub is_completed: bool,
    pub assets: Vec<LessonAsset>,
    pub quiz: Option<LessonQuizView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleView {
    pub id: i64,
    pub title: String,
    pub position: i32,
    pub lessons: Vec<LessonView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseContent {
    pub course: CourseSummary,
    pub modules: Vec<ModuleView>,
}

/// Nest flat rows into modules → lessons → assets/quiz.
///
/// Modules and lessons are re-sorted by `(position, id)`; assets keep their
/// relative order from `assets` after the same sort. Lessons pointing at an
/// unknown module are dropped. A lesson keeps the first quiz attached to it.
pub fn assemble_modules(
    modules: Vec<ModuleRow>,
    lessons: Vec<LessonRow>,
    assets: Vec<LessonAsset>,
    quizzes: Vec<Quiz>,
) -> Vec<ModuleView> {
    let mut assets_by_lesson: HashMap<i64, Vec<LessonAsset>> = HashMap::new();
    for asset in assets {
        assets_by_lesson.entry(asset.lesson_id).or_default().push(asset);
    }
    for bucket in assets_by_lesson.values_mut() {
        bucket.sort_by_key(|a| (a.position, a.id));
    }

    let mut quiz_by_lesson: HashMap<i64, Quiz> = HashMap::new();
    for quiz in quizzes {
        if let Some(lesson_id) = quiz.lesson_id {
            quiz_by_lesson.entry(lesson_id).or_insert(quiz);
        }
    }

    let mut lessons_by_module: HashMap<i64, Vec<LessonView>> = HashMap::new();
    let mut lessons = lessons;
    lessons.sort_by_key(|l| (l.position, l.id));
    for lesson in lessons {
        let view = LessonView {
            id: lesson.id,
            title: lesson.title,
            position: lesson.position,
            duration_s: lesson.duration_s,
            requires_quiz_pass: lesson.requires_quiz_pass,
            watched_s: lesson.watched_s,
            is_completed: lesson.is_completed,
            assets: assets_by_lesson.remove(&lesson.id).unwrap_or_default(),
            quiz: quiz_by_lesson.remove(&lesson.id).map(LessonQuizView::from),
        };
        lessons_by_module.entry(lesson.module_id).or_default().push(view);
    }

    let mut modules = modules;
    modules.sort_by_key(|m| (m.position, m.id));
    modules
        .into_iter()
        .map(|module| ModuleView {
            lessons: lessons_by_module.remove(&module.id).unwrap_or_default(),
            id: module.id,
            title: module.title,
            position: module.position,
        })
        .collect()
}

pub struct ContentService {
    courses: CourseRepository,
    enrollments: EnrollmentRepository,
}

impl ContentService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            courses: CourseRepository::new(pool.clone()),
            enrollments: EnrollmentRepository::new(pool),
        }
    }

    /// Enrollment is checked before the course itself, so a student without
    /// access learns nothing about whether the course exists.
    pub async fn course_content(&self, student_id: i64, course_id: i64) -> ServiceResult<CourseContent> {
        if !self.enrollments.is_active(course_id, student_id).await? {
            return Err(ServiceError::forbidden("Not enrolled in this course"));
        }

        let course = self
            .courses
            .find_published(course_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Course not found"))?;

        let modules = self.courses.modules(course_id).await?;
        let lessons = self.courses.lessons_with_progress(course_id, student_id).await?;
        let assets = self.courses.assets(course_id).await?;
        let quizzes = self.courses.lesson_quizzes(course_id).await?;

        Ok(CourseContent {
            course,
            modules: assemble_modules(modules, lessons, assets, quizzes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(id: i64, position: i32) -> ModuleRow {
        ModuleRow { id, title: format!("Module {}", id), position }
    }

    fn lesson(id: i64, module_id: i64, position: i32) -> LessonRow {
        LessonRow {
            id,
            module_id,
            title: format!("Lesson {}", id),
            position,
            duration_s: Some(600),
            requires_quiz_pass: false,
            watched_s: 0,
            is_completed: false,
        }
    }

    fn asset(id: i64, lesson_id: i64, position: i32) -> LessonAsset {
        LessonAsset {
            id,
            lesson_id,
            asset_kind: "VIDEO".to_string(),
            url: format!("https://cdn.example.com/{}.mp4", id),
            meta: None,
            position,
        }
    }

    fn quiz(id: i64, lesson_id: Option<i64>) -> Quiz {
        Quiz {
            id,
            course_id: 1,
            lesson_id,
            title: format!("Quiz {}", id),
            time_limit_s: None,
            attempts_allowed: Some(3),
            pass_score: 70,
        }
    }

    #[test]
    fn modules_and_lessons_are_ordered_by_position() {
        let tree = assemble_modules(
            vec![module(2, 2), module(1, 1)],
            vec![lesson(12, 1, 2), lesson(11, 1, 1), lesson(21, 2, 1)],
            vec![],
            vec![],
        );

        let module_ids: Vec<i64> = tree.iter().map(|m| m.id).collect();
        assert_eq!(module_ids, vec![1, 2]);
        let lesson_ids: Vec<i64> = tree[0].lessons.iter().map(|l| l.id).collect();
        assert_eq!(lesson_ids, vec![11, 12]);
        assert_eq!(tree[1].lessons.len(), 1);
    }

    #[test]
    fn assets_and_single_quiz_attach_to_their_lesson() {
        let tree = assemble_modules(
            vec![module(1, 1)],
            vec![lesson(11, 1, 1), lesson(12, 1, 2)],
            vec![asset(3, 11, 2), asset(4, 11, 1), asset(5, 12, 1)],
            vec![quiz(7, Some(11)), quiz(8, Some(11)), quiz(9, None)],
        );

        let first = &tree[0].lessons[0];
        let asset_ids: Vec<i64> = first.assets.iter().map(|a| a.id).collect();
        assert_eq!(asset_ids, vec![4, 3]);
        assert_eq!(first.quiz.as_ref().map(|q| q.id), Some(7));

        let second = &tree[0].lessons[1];
        assert_eq!(second.assets.len(), 1);
        assert!(second.quiz.is_none());
    }

    #[test]
    fn empty_module_keeps_empty_lesson_list() {
        let tree = assemble_modules(vec![module(1, 1)], vec![lesson(99, 42, 1)], vec![], vec![]);
        assert_eq!(tree.len(), 1);
        assert!(tree[0].lessons.is_empty());
    }

    #[test]
    fn lesson_serializes_progress_fields() {
        let tree = assemble_modules(vec![module(1, 1)], vec![lesson(11, 1, 1)], vec![], vec![]);
        let json = serde_json::to_value(&tree[0].lessons[0]).unwrap();
        assert_eq!(json["watchedS"], 0);
        assert_eq!(json["isCompleted"], false);
        assert_eq!(json["durationS"], 600);
        assert!(json["quiz"].is_null());
    }
}
