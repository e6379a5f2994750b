//! Instructor authoring: courses, modules, lessons, assets and quizzes.
//!
//! Rows are only reachable through a course the instructor owns; anything
//! else reads as not found. Adding or removing lessons changes every
//! enrolled student's denominator, so those writes re-derive the stored
//! course percents in the same transaction.

use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    CourseStudent, InstructorCourse, InstructorStudent, LessonAsset, LessonRecord, ModuleRecord, OwnedCourse, Quiz,
    QuizSummary,
};
use crate::database::repositories::authoring::{
    self as repo, AuthoringRepository, CourseChanges, NewCourse, NewLesson, NewQuestion,
};

use super::progress::{lock_course_students, rederive_course_percents};
use super::quiz::{QuizService, QuizView};
use super::{is_unique_violation, ServiceError, ServiceResult};

const DEFAULT_CURRENCY: &str = "VND";
const DEFAULT_LANG: &str = "vi";
const DEFAULT_PASS_SCORE: i32 = 60;
const ASSET_KINDS: [&str; 3] = ["VIDEO", "PDF", "LINK"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
    pub lang: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleInput {
    pub title: Option<String>,
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonInput {
    pub title: Option<String>,
    pub position: Option<i32>,
    pub duration_s: Option<i32>,
    pub requires_quiz_pass: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInput {
    pub asset_kind: Option<String>,
    pub url: Option<String>,
    pub meta: Option<Value>,
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionInput {
    #[serde(default)]
    pub option_text: String,
    #[serde(default)]
    pub is_correct: bool,
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    #[serde(default)]
    pub question: String,
    pub qtype: Option<String>,
    pub position: Option<i32>,
    pub points: Option<i32>,
    #[serde(default)]
    pub options: Vec<OptionInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizInput {
    pub title: Option<String>,
    pub time_limit_s: Option<i32>,
    pub attempts_allowed: Option<i32>,
    pub pass_score: Option<i32>,
    #[serde(default)]
    pub questions: Vec<QuestionInput>,
}

/// Lowercase words joined by `-`; letters outside ASCII are kept
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Caller slug when given, otherwise the title plus a millisecond suffix
fn course_slug(title: &str, slug: Option<&str>) -> ServiceResult<String> {
    match slug.map(slugify) {
        Some(slug) if !slug.is_empty() => Ok(slug),
        Some(_) => Err(ServiceError::validation("slug", "Slug must contain letters or digits")),
        None => {
            let base = match slugify(title) {
                base if base.is_empty() => "course".to_string(),
                base => base,
            };
            Ok(format!("{}-{}", base, chrono::Utc::now().timestamp_millis()))
        }
    }
}

fn required_title(title: Option<&str>) -> ServiceResult<&str> {
    match title.map(str::trim) {
        Some(title) if !title.is_empty() => Ok(title),
        _ => Err(ServiceError::validation("title", "Title is required")),
    }
}

/// A present title must not be blank
fn optional_title(title: Option<&str>) -> ServiceResult<Option<&str>> {
    match title {
        Some(_) => required_title(title).map(Some),
        None => Ok(None),
    }
}

fn non_negative(value: Option<i64>, field: &'static str) -> ServiceResult<()> {
    match value {
        Some(v) if v < 0 => Err(ServiceError::validation(field, "must not be negative")),
        _ => Ok(()),
    }
}

fn positive(value: Option<i32>, field: &'static str) -> ServiceResult<()> {
    match value {
        Some(v) if v <= 0 => Err(ServiceError::validation(field, "must be a positive integer")),
        _ => Ok(()),
    }
}

fn pass_score(value: Option<i32>) -> ServiceResult<Option<i32>> {
    match value {
        Some(score) if !(0..=100).contains(&score) => {
            Err(ServiceError::validation("passScore", "must be between 0 and 100"))
        }
        other => Ok(other),
    }
}

fn asset_kind(raw: &str) -> ServiceResult<&'static str> {
    let upper = raw.trim().to_uppercase();
    ASSET_KINDS
        .iter()
        .find(|kind| **kind == upper)
        .copied()
        .ok_or_else(|| ServiceError::validation("assetKind", "must be one of VIDEO, PDF, LINK"))
}

/// Stored question type; the `_CHOICE` spellings are accepted as aliases
pub fn question_kind(raw: Option<&str>) -> ServiceResult<&'static str> {
    match raw.map(|r| r.trim().to_uppercase()).as_deref() {
        None | Some("SINGLE") | Some("SINGLE_CHOICE") => Ok("SINGLE"),
        Some("MULTI") | Some("MULTI_CHOICE") | Some("MULTIPLE_CHOICE") => Ok("MULTI"),
        Some(_) => Err(ServiceError::validation("qtype", "must be SINGLE or MULTI")),
    }
}

/// Check a quiz draft and return the stored type of each question.
///
/// SINGLE questions need exactly one correct option and MULTI at least one.
pub fn validate_quiz(input: &QuizInput) -> ServiceResult<Vec<&'static str>> {
    required_title(input.title.as_deref())?;
    positive(input.time_limit_s, "timeLimitS")?;
    positive(input.attempts_allowed, "attemptsAllowed")?;
    pass_score(input.pass_score)?;

    let mut kinds = Vec::with_capacity(input.questions.len());
    for (index, question) in input.questions.iter().enumerate() {
        let number = index + 1;
        if question.question.trim().is_empty() {
            return Err(ServiceError::validation("questions", format!("Question {} has no text", number)));
        }
        positive(question.points, "points")?;
        if question.options.len() < 2 {
            return Err(ServiceError::validation(
                "questions",
                format!("Question {} needs at least two options", number),
            ));
        }
        if question.options.iter().any(|o| o.option_text.trim().is_empty()) {
            return Err(ServiceError::validation(
                "questions",
                format!("Question {} has an empty option", number),
            ));
        }

        let kind = question_kind(question.qtype.as_deref())?;
        let correct = question.options.iter().filter(|o| o.is_correct).count();
        match (kind, correct) {
            ("SINGLE", 1) => {}
            ("SINGLE", _) => {
                return Err(ServiceError::validation(
                    "questions",
                    format!("Question {} must have exactly one correct option", number),
                ))
            }
            (_, 0) => {
                return Err(ServiceError::validation(
                    "questions",
                    format!("Question {} must have at least one correct option", number),
                ))
            }
            _ => {}
        }
        kinds.push(kind);
    }
    Ok(kinds)
}

fn slug_taken(err: DatabaseError) -> ServiceError {
    if is_unique_violation(&err) {
        ServiceError::Conflict("Slug already exists".to_string())
    } else {
        err.into()
    }
}

pub struct AuthoringService {
    pool: PgPool,
    repo: AuthoringRepository,
    quizzes: QuizService,
}

impl AuthoringService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: AuthoringRepository::new(pool.clone()),
            quizzes: QuizService::new(pool.clone()),
            pool,
        }
    }

    async fn require_course(&self, course_id: i64, instructor_id: i64) -> ServiceResult<OwnedCourse> {
        self.repo
            .find_course(course_id, instructor_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Course not found or access denied"))
    }

    async fn require_module(&self, module_id: i64, instructor_id: i64) -> ServiceResult<i64> {
        self.repo
            .module_course(module_id, instructor_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Module not found or access denied"))
    }

    async fn require_lesson(&self, lesson_id: i64, instructor_id: i64) -> ServiceResult<i64> {
        self.repo
            .lesson_course(lesson_id, instructor_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Lesson not found or access denied"))
    }

    async fn require_asset(&self, asset_id: i64, instructor_id: i64) -> ServiceResult<()> {
        if !self.repo.asset_owned(asset_id, instructor_id).await? {
            return Err(ServiceError::not_found("Asset not found or access denied"));
        }
        Ok(())
    }

    async fn require_quiz(&self, quiz_id: i64, instructor_id: i64) -> ServiceResult<()> {
        if !self.repo.quiz_owned(quiz_id, instructor_id).await? {
            return Err(ServiceError::not_found("Quiz not found or access denied"));
        }
        Ok(())
    }

    // Courses

    pub async fn my_courses(&self, instructor_id: i64) -> ServiceResult<Vec<InstructorCourse>> {
        Ok(self.repo.list_courses(instructor_id).await?)
    }

    pub async fn course(&self, course_id: i64, instructor_id: i64) -> ServiceResult<OwnedCourse> {
        self.require_course(course_id, instructor_id).await
    }

    pub async fn create_course(&self, instructor_id: i64, input: &CourseInput) -> ServiceResult<OwnedCourse> {
        let title = required_title(input.title.as_deref())?;
        non_negative(input.price_cents, "priceCents")?;
        let slug = course_slug(title, input.slug.as_deref())?;
        let currency = input.currency.as_deref().map(str::trim).map(str::to_uppercase);

        let course = NewCourse {
            title,
            slug: &slug,
            description: input.description.as_deref(),
            thumbnail_url: input.thumbnail_url.as_deref(),
            price_cents: input.price_cents.unwrap_or(0),
            currency: currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
            lang: input.lang.as_deref().unwrap_or(DEFAULT_LANG),
            is_published: input.is_published.unwrap_or(false),
        };
        let created = self.repo.create_course(instructor_id, &course).await.map_err(slug_taken)?;

        info!("Instructor {} created course {} ({})", instructor_id, created.id, created.slug);
        Ok(created)
    }

    pub async fn update_course(
        &self,
        course_id: i64,
        instructor_id: i64,
        input: &CourseInput,
    ) -> ServiceResult<OwnedCourse> {
        let title = optional_title(input.title.as_deref())?;
        non_negative(input.price_cents, "priceCents")?;
        let slug = match input.slug.as_deref() {
            Some(raw) => Some(course_slug("", Some(raw))?),
            None => None,
        };
        let currency = input.currency.as_deref().map(str::trim).map(str::to_uppercase);

        let changes = CourseChanges {
            title,
            slug: slug.as_deref(),
            description: input.description.as_deref(),
            thumbnail_url: input.thumbnail_url.as_deref(),
            price_cents: input.price_cents,
            currency: currency.as_deref(),
            lang: input.lang.as_deref(),
            is_published: input.is_published,
        };
        self.repo
            .update_course(course_id, instructor_id, &changes)
            .await
            .map_err(slug_taken)?
            .ok_or_else(|| ServiceError::not_found("Course not found or access denied"))
    }

    pub async fn delete_course(&self, course_id: i64, instructor_id: i64) -> ServiceResult<()> {
        if !self.repo.delete_course(course_id, instructor_id).await? {
            return Err(ServiceError::not_found("Course not found or access denied"));
        }
        info!("Instructor {} deleted course {}", instructor_id, course_id);
        Ok(())
    }

    // Modules

    pub async fn modules(&self, course_id: i64, instructor_id: i64) -> ServiceResult<Vec<ModuleRecord>> {
        self.require_course(course_id, instructor_id).await?;
        Ok(self.repo.modules(course_id).await?)
    }

    pub async fn create_module(
        &self,
        course_id: i64,
        instructor_id: i64,
        input: &ModuleInput,
    ) -> ServiceResult<ModuleRecord> {
        let title = required_title(input.title.as_deref())?;
        self.require_course(course_id, instructor_id).await?;
        Ok(self.repo.create_module(course_id, title, input.position).await?)
    }

    pub async fn update_module(
        &self,
        module_id: i64,
        instructor_id: i64,
        input: &ModuleInput,
    ) -> ServiceResult<ModuleRecord> {
        let title = optional_title(input.title.as_deref())?;
        self.require_module(module_id, instructor_id).await?;
        self.repo
            .update_module(module_id, title, input.position)
            .await?
            .ok_or_else(|| ServiceError::not_found("Module not found or access denied"))
    }

    /// Removes the module's lessons too, so course percents are re-derived
    pub async fn delete_module(&self, module_id: i64, instructor_id: i64) -> ServiceResult<()> {
        let course_id = self.require_module(module_id, instructor_id).await?;

        let mut tx = self.pool.begin().await?;
        let students = lock_course_students(&mut tx, course_id).await?;
        if !repo::delete_module(&mut tx, module_id).await? {
            return Err(ServiceError::not_found("Module not found or access denied"));
        }
        rederive_course_percents(&mut tx, course_id, &students).await?;
        tx.commit().await?;

        info!("Instructor {} deleted module {} of course {}", instructor_id, module_id, course_id);
        Ok(())
    }

    // Lessons

    pub async fn lessons(&self, module_id: i64, instructor_id: i64) -> ServiceResult<Vec<LessonRecord>> {
        self.require_module(module_id, instructor_id).await?;
        Ok(self.repo.lessons(module_id).await?)
    }

    pub async fn create_lesson(
        &self,
        module_id: i64,
        instructor_id: i64,
        input: &LessonInput,
    ) -> ServiceResult<LessonRecord> {
        let title = required_title(input.title.as_deref())?;
        non_negative(input.duration_s.map(i64::from), "durationS")?;
        let course_id = self.require_module(module_id, instructor_id).await?;

        let lesson = NewLesson {
            title,
            position: input.position,
            duration_s: input.duration_s,
            requires_quiz_pass: input.requires_quiz_pass.unwrap_or(false),
        };

        let mut tx = self.pool.begin().await?;
        let students = lock_course_students(&mut tx, course_id).await?;
        let created = repo::insert_lesson(&mut tx, module_id, &lesson).await?;
        rederive_course_percents(&mut tx, course_id, &students).await?;
        tx.commit().await?;

        info!("Instructor {} added lesson {} to course {}", instructor_id, created.id, course_id);
        Ok(created)
    }

    pub async fn update_lesson(
        &self,
        lesson_id: i64,
        instructor_id: i64,
        input: &LessonInput,
    ) -> ServiceResult<LessonRecord> {
        let title = optional_title(input.title.as_deref())?;
        non_negative(input.duration_s.map(i64::from), "durationS")?;
        self.require_lesson(lesson_id, instructor_id).await?;
        self.repo
            .update_lesson(lesson_id, title, input.position, input.duration_s, input.requires_quiz_pass)
            .await?
            .ok_or_else(|| ServiceError::not_found("Lesson not found or access denied"))
    }

    pub async fn delete_lesson(&self, lesson_id: i64, instructor_id: i64) -> ServiceResult<()> {
        let course_id = self.require_lesson(lesson_id, instructor_id).await?;

        let mut tx = self.pool.begin().await?;
        let students = lock_course_students(&mut tx, course_id).await?;
        if !repo::delete_lesson(&mut tx, lesson_id).await? {
            return Err(ServiceError::not_found("Lesson not found or access denied"));
        }
        rederive_course_percents(&mut tx, course_id, &students).await?;
        tx.commit().await?;

        info!("Instructor {} deleted lesson {} of course {}", instructor_id, lesson_id, course_id);
        Ok(())
    }

    // Assets

    pub async fn assets(&self, lesson_id: i64, instructor_id: i64) -> ServiceResult<Vec<LessonAsset>> {
        self.require_lesson(lesson_id, instructor_id).await?;
        Ok(self.repo.assets(lesson_id).await?)
    }

    pub async fn create_asset(
        &self,
        lesson_id: i64,
        instructor_id: i64,
        input: &AssetInput,
    ) -> ServiceResult<LessonAsset> {
        let (kind, url) = match (input.asset_kind.as_deref(), input.url.as_deref().map(str::trim)) {
            (Some(kind), Some(url)) if !url.is_empty() => (asset_kind(kind)?, url),
            _ => return Err(ServiceError::BadRequest("assetKind and url are required".to_string())),
        };
        self.require_lesson(lesson_id, instructor_id).await?;
        Ok(self
            .repo
            .create_asset(lesson_id, kind, url, input.meta.as_ref(), input.position)
            .await?)
    }

    pub async fn update_asset(
        &self,
        asset_id: i64,
        instructor_id: i64,
        input: &AssetInput,
    ) -> ServiceResult<LessonAsset> {
        let kind = input.asset_kind.as_deref().map(asset_kind).transpose()?;
        self.require_asset(asset_id, instructor_id).await?;
        self.repo
            .update_asset(asset_id, kind, input.url.as_deref(), input.meta.as_ref(), input.position)
            .await?
            .ok_or_else(|| ServiceError::not_found("Asset not found or access denied"))
    }

    pub async fn delete_asset(&self, asset_id: i64, instructor_id: i64) -> ServiceResult<()> {
        self.require_asset(asset_id, instructor_id).await?;
        if !self.repo.delete_asset(asset_id).await? {
            return Err(ServiceError::not_found("Asset not found or access denied"));
        }
        Ok(())
    }

    // Quizzes

    pub async fn course_quizzes(&self, course_id: i64, instructor_id: i64) -> ServiceResult<Vec<QuizSummary>> {
        self.require_course(course_id, instructor_id).await?;
        self.quizzes.list_course_quizzes(course_id).await
    }

    /// Full quiz with the answer key
    pub async fn quiz(&self, quiz_id: i64, instructor_id: i64) -> ServiceResult<QuizView> {
        self.require_quiz(quiz_id, instructor_id).await?;
        self.quizzes.get_quiz(quiz_id, true).await
    }

    /// Quiz, questions and options are written together or not at all
    pub async fn create_quiz(&self, lesson_id: i64, instructor_id: i64, input: &QuizInput) -> ServiceResult<QuizView> {
        let kinds = validate_quiz(input)?;
        let title = required_title(input.title.as_deref())?;
        let course_id = self.require_lesson(lesson_id, instructor_id).await?;

        let mut tx = self.pool.begin().await?;
        let quiz = repo::insert_quiz(
            &mut tx,
            course_id,
            lesson_id,
            title,
            input.time_limit_s,
            input.attempts_allowed,
            input.pass_score.unwrap_or(DEFAULT_PASS_SCORE),
        )
        .await?;

        for ((index, question), kind) in input.questions.iter().enumerate().zip(kinds) {
            let new_question = NewQuestion {
                question: question.question.trim(),
                qtype: kind,
                position: question.position.unwrap_or(index as i32 + 1),
                points: question.points.unwrap_or(1),
            };
            let question_id = repo::insert_question(&mut tx, quiz.id, &new_question).await?;

            for (option_index, option) in question.options.iter().enumerate() {
                let position = option.position.unwrap_or(option_index as i32 + 1);
                repo::insert_option(&mut tx, question_id, option.option_text.trim(), option.is_correct, position)
                    .await?;
            }
        }
        tx.commit().await?;

        info!(
            "Instructor {} created quiz {} with {} questions on lesson {}",
            instructor_id,
            quiz.id,
            input.questions.len(),
            lesson_id
        );
        self.quizzes.get_quiz(quiz.id, true).await
    }

    /// Header fields only; questions are replaced by recreating the quiz
    pub async fn update_quiz(&self, quiz_id: i64, instructor_id: i64, input: &QuizInput) -> ServiceResult<Quiz> {
        let title = optional_title(input.title.as_deref())?;
        positive(input.time_limit_s, "timeLimitS")?;
        positive(input.attempts_allowed, "attemptsAllowed")?;
        let score = pass_score(input.pass_score)?;
        self.require_quiz(quiz_id, instructor_id).await?;

        self.repo
            .update_quiz(quiz_id, title, input.time_limit_s, input.attempts_allowed, score)
            .await?
            .ok_or_else(|| ServiceError::not_found("Quiz not found or access denied"))
    }

    pub async fn delete_quiz(&self, quiz_id: i64, instructor_id: i64) -> ServiceResult<()> {
        self.require_quiz(quiz_id, instructor_id).await?;
        if !self.repo.delete_quiz(quiz_id).await? {
            return Err(ServiceError::not_found("Quiz not found or access denied"));
        }
        info!("Instructor {} deleted quiz {}", instructor_id, quiz_id);
        Ok(())
    }

    // Students

    pub async fn course_students(&self, course_id: i64, instructor_id: i64) -> ServiceResult<Vec<CourseStudent>> {
        self.require_course(course_id, instructor_id).await?;
        Ok(self.repo.course_students(course_id).await?)
    }

    pub async fn students(&self, instructor_id: i64) -> ServiceResult<Vec<InstructorStudent>> {
        Ok(self.repo.instructor_students(instructor_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(text: &str, is_correct: bool) -> OptionInput {
        OptionInput {
            option_text: text.to_string(),
            is_correct,
            position: None,
        }
    }

    fn quiz_with(qtype: &str, options: Vec<OptionInput>) -> QuizInput {
        QuizInput {
            title: Some("Ownership check".to_string()),
            questions: vec![QuestionInput {
                question: "Which types are Copy?".to_string(),
                qtype: Some(qtype.to_string()),
                options,
                ..QuestionInput::default()
            }],
            ..QuizInput::default()
        }
    }

    #[test]
    fn slugify_joins_words_with_dashes() {
        assert_eq!(slugify("Intro to Rust!"), "intro-to-rust");
        assert_eq!(slugify("  --Async   & Await--  "), "async-await");
        assert_eq!(slugify("Lập trình Web"), "lập-trình-web");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn generated_slug_gets_a_unique_suffix() {
        let slug = course_slug("Intro to Rust", None).unwrap();
        let suffix = slug.strip_prefix("intro-to-rust-").unwrap();
        assert!(suffix.parse::<i64>().is_ok());

        assert_eq!(course_slug("ignored", Some("My Custom Slug")).unwrap(), "my-custom-slug");
        assert!(course_slug("x", Some("!!!")).is_err());
        assert!(course_slug("!!!", None).unwrap().starts_with("course-"));
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(matches!(required_title(Some("   ")), Err(ServiceError::Validation { field: "title", .. })));
        assert!(required_title(None).is_err());
        assert_eq!(optional_title(None).unwrap(), None);
        assert_eq!(optional_title(Some(" Intro ")).unwrap(), Some("Intro"));
    }

    #[test]
    fn asset_kinds_are_normalized() {
        assert_eq!(asset_kind("video").unwrap(), "VIDEO");
        assert_eq!(asset_kind(" PDF ").unwrap(), "PDF");
        assert!(asset_kind("AUDIO").is_err());
    }

    #[test]
    fn single_question_needs_exactly_one_correct_option() {
        let ok = quiz_with("SINGLE", vec![option("i32", true), option("String", false)]);
        assert_eq!(validate_quiz(&ok).unwrap(), vec!["SINGLE"]);

        let two = quiz_with("SINGLE", vec![option("i32", true), option("bool", true)]);
        assert!(validate_quiz(&two).is_err());

        let none = quiz_with("SINGLE_CHOICE", vec![option("i32", false), option("bool", false)]);
        assert!(validate_quiz(&none).is_err());
    }

    #[test]
    fn multi_question_needs_a_correct_option() {
        let ok = quiz_with("multi_choice", vec![option("i32", true), option("bool", true), option("Vec", false)]);
        assert_eq!(validate_quiz(&ok).unwrap(), vec!["MULTI"]);

        let none = quiz_with("MULTI", vec![option("Vec", false), option("String", false)]);
        assert!(validate_quiz(&none).is_err());
    }

    #[test]
    fn quiz_shape_is_checked() {
        let one_option = quiz_with("SINGLE", vec![option("i32", true)]);
        assert!(validate_quiz(&one_option).is_err());

        let blank_option = quiz_with("SINGLE", vec![option("i32", true), option(" ", false)]);
        assert!(validate_quiz(&blank_option).is_err());

        let unknown_type = quiz_with("ESSAY", vec![option("i32", true), option("bool", false)]);
        assert!(matches!(validate_quiz(&unknown_type), Err(ServiceError::Validation { field: "qtype", .. })));

        let mut bad_score = quiz_with("SINGLE", vec![option("i32", true), option("bool", false)]);
        bad_score.pass_score = Some(101);
        assert!(matches!(validate_quiz(&bad_score), Err(ServiceError::Validation { field: "passScore", .. })));

        let untitled = QuizInput::default();
        assert!(validate_quiz(&untitled).is_err());
    }
}
