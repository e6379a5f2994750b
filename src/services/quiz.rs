//! Quiz delivery, attempt bookkeeping and scoring.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::database::models::{AttemptAnswer, Quiz, QuizAttempt, QuizOption, QuizQuestion, QuizSummary};
use crate::database::repositories::quiz::{finish_attempt, save_answer};
use crate::database::repositories::QuizRepository;

use super::{is_unique_violation, ServiceError, ServiceResult};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionView {
    pub id: i64,
    pub option_text: String,
    pub position: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: i64,
    pub question: String,
    pub qtype: String,
    pub position: i32,
    pub points: i32,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizView {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<QuestionView>,
}

/// One submitted answer; unknown question ids are ignored
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: i64,
    #[serde(default)]
    pub selected_option_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAnswer {
    pub question_id: i64,
    pub selected_option_ids: Vec<i64>,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grade {
    pub earned: i32,
    pub total: i32,
    pub percent: i32,
    pub answers: Vec<GradedAnswer>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub score: i32,
    pub total_points: i32,
    pub score_percent: i32,
    pub passed: bool,
    pub pass_score: i32,
}

/// Grade answers against the answer key.
///
/// A question is correct when the set of selected option ids equals the set
/// of correct ones. Questions without an answer still count toward the
/// total. The percent is rounded half up, and is 0 when no points exist.
pub fn score_attempt(questions: &[QuizQuestion], options: &[QuizOption], answers: &[SubmittedAnswer]) -> Grade {
    let mut correct_by_question: HashMap<i64, BTreeSet<i64>> = HashMap::new();
    for option in options.iter().filter(|o| o.is_correct) {
        correct_by_question.entry(option.question_id).or_default().insert(option.id);
    }

    let mut earned = 0;
    let mut total = 0;
    let mut graded = Vec::new();

    for question in questions {
        total += question.points;

        // First answer for a question counts when the client repeats it
        let Some(answer) = answers.iter().find(|a| a.question_id == question.id) else {
            continue;
        };

        let selected: BTreeSet<i64> = answer.selected_option_ids.iter().copied().collect();
        let empty = BTreeSet::new();
        let correct = correct_by_question.get(&question.id).unwrap_or(&empty);
        let is_correct = selected == *correct;

        if is_correct {
            earned += question.points;
        }

        graded.push(GradedAnswer {
            question_id: question.id,
            selected_option_ids: selected.into_iter().collect(),
            is_correct,
        });
    }

    let percent = if total > 0 {
        ((200 * i64::from(earned) + i64::from(total)) / (2 * i64::from(total))) as i32
    } else {
        0
    };

    Grade {
        earned,
        total,
        percent,
        answers: graded,
    }
}

fn build_questions(questions: Vec<QuizQuestion>, options: Vec<QuizOption>, reveal: bool) -> Vec<QuestionView> {
    let mut options_by_question: HashMap<i64, Vec<OptionView>> = HashMap::new();
    for option in options {
        options_by_question.entry(option.question_id).or_default().push(OptionView {
            id: option.id,
            option_text: option.option_text,
            position: option.position,
            is_correct: reveal.then_some(option.is_correct),
        });
    }

    questions
        .into_iter()
        .map(|q| QuestionView {
            options: options_by_question.remove(&q.id).unwrap_or_default(),
            id: q.id,
            question: q.question,
            qtype: q.qtype,
            position: q.position,
            points: q.points,
        })
        .collect()
}

pub struct QuizService {
    repo: QuizRepository,
}

impl QuizService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: QuizRepository::new(pool),
        }
    }

    async fn require_quiz(&self, quiz_id: i64) -> ServiceResult<Quiz> {
        self.repo
            .find(quiz_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Quiz not found"))
    }

    async fn require_owned_attempt(&self, quiz_id: i64, attempt_id: i64, student_id: i64) -> ServiceResult<QuizAttempt> {
        match self.repo.find_attempt(attempt_id).await? {
            Some(attempt) if attempt.quiz_id == quiz_id && attempt.student_id == student_id => Ok(attempt),
            _ => Err(ServiceError::not_found("Attempt not found")),
        }
    }

    /// `reveal_answers` must already account for the caller's role
    pub async fn get_quiz(&self, quiz_id: i64, reveal_answers: bool) -> ServiceResult<QuizView> {
        let quiz = self.require_quiz(quiz_id).await?;
        let questions = self.repo.questions(quiz_id).await?;
        let options = self.repo.options(quiz_id).await?;

        Ok(QuizView {
            quiz,
            questions: build_questions(questions, options, reveal_answers),
        })
    }

    pub async fn create_attempt(&self, quiz_id: i64, student_id: i64) -> ServiceResult<QuizAttempt> {
        let quiz = self.require_quiz(quiz_id).await?;
        let used = self.repo.count_attempts(quiz_id, student_id).await?;

        if let Some(allowed) = quiz.attempts_allowed {
            if used >= i64::from(allowed) {
                warn!(
                    "Student {} hit the attempt limit ({}) on quiz {}",
                    student_id, allowed, quiz_id
                );
                return Err(ServiceError::forbidden("Attempt limit exceeded"));
            }
        }

        let attempt_no = i32::try_from(used + 1)
            .map_err(|_| ServiceError::forbidden("Attempt limit exceeded"))?;

        match self.repo.create_attempt(quiz_id, student_id, attempt_no).await {
            Ok(attempt) => Ok(attempt),
            // A concurrent start took the same attempt number
            Err(e) if is_unique_violation(&e) => Err(ServiceError::Conflict(
                "Another attempt was started at the same time".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn submit_attempt(
        &self,
        quiz_id: i64,
        attempt_id: i64,
        student_id: i64,
        answers: &[SubmittedAnswer],
    ) -> ServiceResult<SubmissionResult> {
        let quiz = self.require_quiz(quiz_id).await?;
        let attempt = self.require_owned_attempt(quiz_id, attempt_id, student_id).await?;
        if attempt.submitted_at.is_some() {
            return Err(ServiceError::Conflict("Attempt already submitted".to_string()));
        }

        let questions = self.repo.questions(quiz_id).await?;
        let options = self.repo.options(quiz_id).await?;
        let grade = score_attempt(&questions, &options, answers);
        let passed = grade.percent >= quiz.pass_score;

        let mut tx = self.repo.pool().begin().await?;
        for answer in &grade.answers {
            save_answer(&mut tx, attempt_id, answer.question_id, &answer.selected_option_ids, answer.is_correct).await?;
        }
        if !finish_attempt(&mut tx, attempt_id, grade.earned, passed).await? {
            // Lost the race against another submit of the same attempt
            return Err(ServiceError::Conflict("Attempt already submitted".to_string()));
        }
        tx.commit().await?;

        info!(
            "Student {} submitted attempt {} on quiz {}: {}/{} ({}%), passed={}",
            student_id, attempt_id, quiz_id, grade.earned, grade.total, grade.percent, passed
        );

        Ok(SubmissionResult {
            score: grade.earned,
            total_points: grade.total,
            score_percent: grade.percent,
            passed,
            pass_score: quiz.pass_score,
        })
    }

    pub async fn list_attempts(&self, quiz_id: i64, student_id: i64) -> ServiceResult<Vec<QuizAttempt>> {
        Ok(self.repo.list_attempts(quiz_id, student_id).await?)
    }

    pub async fn attempt_answers(&self, quiz_id: i64, attempt_id: i64, student_id: i64) -> ServiceResult<Vec<AttemptAnswer>> {
        self.require_owned_attempt(quiz_id, attempt_id, student_id).await?;
        Ok(self.repo.attempt_answers(attempt_id).await?)
    }

    pub async fn list_course_quizzes(&self, course_id: i64) -> ServiceResult<Vec<QuizSummary>> {
        Ok(self.repo.list_for_course(course_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: i64, points: i32) -> QuizQuestion {
        QuizQuestion {
            id,
            quiz_id: 1,
            question: format!("Question {}", id),
            qtype: "SINGLE".to_string(),
            position: id as i32,
            points,
        }
    }

    fn option(id: i64, question_id: i64, is_correct: bool) -> QuizOption {
        QuizOption {
            id,
            question_id,
            option_text: format!("Option {}", id),
            is_correct,
            position: id as i32,
        }
    }

    fn answer(question_id: i64, selected: &[i64]) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id,
            selected_option_ids: selected.to_vec(),
        }
    }

    fn fixture() -> (Vec<QuizQuestion>, Vec<QuizOption>) {
        let questions = vec![question(1, 1), question(2, 2)];
        let options = vec![
            option(10, 1, true),
            option(11, 1, false),
            option(20, 2, true),
            option(21, 2, true),
            option(22, 2, false),
        ];
        (questions, options)
    }

    #[test]
    fn all_correct_scores_full_marks() {
        let (questions, options) = fixture();
        let grade = score_attempt(&questions, &options, &[answer(1, &[10]), answer(2, &[21, 20])]);
        assert_eq!(grade.earned, 3);
        assert_eq!(grade.total, 3);
        assert_eq!(grade.percent, 100);
        assert!(grade.answers.iter().all(|a| a.is_correct));
    }

    #[test]
    fn partial_multi_select_is_wrong() {
        let (questions, options) = fixture();
        let grade = score_attempt(&questions, &options, &[answer(1, &[10]), answer(2, &[20])]);
        assert_eq!(grade.earned, 1);
        assert_eq!(grade.percent, 33);
        assert!(!grade.answers[1].is_correct);
    }

    #[test]
    fn extra_selection_is_wrong() {
        let (questions, options) = fixture();
        let grade = score_attempt(&questions, &options, &[answer(2, &[20, 21, 22])]);
        assert_eq!(grade.earned, 0);
    }

    #[test]
    fn unanswered_questions_count_toward_total_only() {
        let (questions, options) = fixture();
        let grade = score_attempt(&questions, &options, &[answer(2, &[20, 21])]);
        assert_eq!(grade.earned, 2);
        assert_eq!(grade.total, 3);
        assert_eq!(grade.percent, 67);
        assert_eq!(grade.answers.len(), 1);
    }

    #[test]
    fn no_points_means_zero_percent() {
        let grade = score_attempt(&[], &[], &[answer(1, &[1])]);
        assert_eq!(grade.total, 0);
        assert_eq!(grade.percent, 0);
    }

    #[test]
    fn scoring_ignores_selection_order_and_duplicates() {
        let (questions, options) = fixture();
        let first = score_attempt(&questions, &options, &[answer(2, &[21, 20, 21])]);
        let second = score_attempt(&questions, &options, &[answer(2, &[20, 21])]);
        assert_eq!(first, second);
        assert_eq!(first.answers[0].selected_option_ids, vec![20, 21]);
    }

    #[test]
    fn repeated_question_uses_first_answer() {
        let (questions, options) = fixture();
        let grade = score_attempt(&questions, &options, &[answer(1, &[10]), answer(1, &[11])]);
        assert_eq!(grade.earned, 1);
        assert_eq!(grade.answers.len(), 1);
        assert_eq!(grade.answers[0].selected_option_ids, vec![10]);

        let grade = score_attempt(&questions, &options, &[answer(1, &[11]), answer(1, &[10])]);
        assert_eq!(grade.earned, 0);
    }

    #[test]
    fn hidden_answer_key_is_not_serialized() {
        let (questions, options) = fixture();
        let hidden = build_questions(questions.clone(), options.clone(), false);
        let json = serde_json::to_value(&hidden).unwrap();
        assert!(json[0]["options"][0].get("isCorrect").is_none());

        let revealed = build_questions(questions, options, true);
        let json = serde_json::to_value(&revealed).unwrap();
        assert_eq!(json[0]["options"][0]["isCorrect"], true);
        assert_eq!(json[1]["options"].as_array().unwrap().len(), 3);
    }
}
