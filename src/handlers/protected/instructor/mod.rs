// /api/courses/instructor/* - INSTRUCTOR role, rows scoped to the caller

pub mod content;
pub mod courses;
pub mod quizzes;
pub mod revenue;
pub mod students;

use axum::Json;
use serde_json::{json, Value};

fn deleted(what: &str) -> Json<Value> {
    Json(json!({ "success": true, "message": format!("{} deleted successfully", what) }))
}
