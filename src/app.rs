use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{self, AppConfig};
use crate::database::DatabaseManager;
use crate::handlers;
use crate::middleware::{jwt_auth_middleware, require_admin, require_instructor, require_student};
use crate::services::{PgProgressStore, ProgressService, ProgressStore};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseManager,
    pub progress: ProgressService,
}

impl AppState {
    pub fn new(db: DatabaseManager) -> Self {
        let store = Arc::new(PgProgressStore::new(db.pool().clone()));
        Self::with_progress_store(db, store)
    }

    pub fn with_progress_store(db: DatabaseManager, store: Arc<dyn ProgressStore>) -> Self {
        Self {
            db,
            progress: ProgressService::new(store),
        }
    }

    pub fn pool(&self) -> PgPool {
        self.db.pool().clone()
    }
}

pub fn app(state: AppState) -> Router {
    let config = config::config();

    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(catalog_routes())
        .merge(learning_routes())
        // Protected API
        .merge(quiz_routes())
        .merge(enrollment_routes())
        .merge(review_routes())
        .merge(recommendation_routes())
        .merge(instructor_routes())
        // Elevated API
        .merge(admin_routes())
        .with_state(state)
        .layer(cors_layer(config));

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Optional bearer token; a bad one is served as a guest
fn catalog_routes() -> Router<AppState> {
    use handlers::public::{catalog_list, catalog_tags, course_detail, course_related};

    Router::new()
        .route("/api/courses", get(catalog_list))
        .route("/api/courses/tags", get(catalog_tags))
        .route("/api/courses/:course_id", get(course_detail))
        .route("/api/courses/:course_id/related", get(course_related))
}

fn learning_routes() -> Router<AppState> {
    use handlers::public::{course_content, course_progress, lesson_complete, lesson_progress};

    Router::new()
        .route("/api/courses/:course_id/content", get(course_content))
        .route("/api/courses/:course_id/progress", get(course_progress))
        .route("/api/lessons/:lesson_id/progress", post(lesson_progress))
        .route("/api/lessons/:lesson_id/complete", post(lesson_complete))
}

fn quiz_routes() -> Router<AppState> {
    use handlers::protected::quizzes;

    Router::new()
        .route("/api/courses/:course_id/quizzes", get(quizzes::course_quizzes))
        .route("/api/quizzes/:quiz_id", get(quizzes::quiz_get))
        .route(
            "/api/quizzes/:quiz_id/attempts",
            get(quizzes::attempt_list).post(quizzes::attempt_create),
        )
        .route(
            "/api/quizzes/:quiz_id/attempts/:attempt_id/submit",
            post(quizzes::attempt_submit),
        )
        .route(
            "/api/quizzes/:quiz_id/attempts/:attempt_id/answers",
            get(quizzes::attempt_answers),
        )
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn enrollment_routes() -> Router<AppState> {
    use handlers::protected::enrollments;

    Router::new()
        .route("/api/enrollments/my-courses", get(enrollments::my_courses))
        .route("/api/enrollments/enroll", post(enrollments::enroll))
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn review_routes() -> Router<AppState> {
    use handlers::protected::reviews;

    Router::new()
        .route("/api/reviews/courses/:course_id", post(reviews::review_create))
        .route("/api/reviews/courses/:course_id/my-review", get(reviews::review_mine))
        .route(
            "/api/reviews/:review_id",
            put(reviews::review_update).delete(reviews::review_delete),
        )
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn recommendation_routes() -> Router<AppState> {
    use handlers::protected::recommendations;

    // Layers run bottom-up: authenticate, then check the role
    Router::new()
        .route(
            "/api/recommendations/feedback",
            get(recommendations::feedback_list).post(recommendations::feedback_post),
        )
        .route_layer(middleware::from_fn(require_student))
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn instructor_routes() -> Router<AppState> {
    use handlers::protected::instructor::{content, courses, quizzes, revenue, students};

    Router::new()
        .route(
            "/api/courses/instructor/my-courses",
            get(courses::course_list).post(courses::course_create),
        )
        .route(
            "/api/courses/instructor/my-courses/:course_id",
            get(courses::course_get)
                .put(courses::course_update)
                .delete(courses::course_delete),
        )
        .route(
            "/api/courses/instructor/my-courses/:course_id/modules",
            get(content::module_list).post(content::module_create),
        )
        .route(
            "/api/courses/instructor/modules/:module_id",
            put(content::module_update).delete(content::module_delete),
        )
        .route(
            "/api/courses/instructor/modules/:module_id/lessons",
            get(content::lesson_list).post(content::lesson_create),
        )
        .route(
            "/api/courses/instructor/lessons/:lesson_id",
            put(content::lesson_update).delete(content::lesson_delete),
        )
        .route(
            "/api/courses/instructor/lessons/:lesson_id/assets",
            get(content::asset_list).post(content::asset_create),
        )
        .route(
            "/api/courses/instructor/assets/:asset_id",
            put(content::asset_update).delete(content::asset_delete),
        )
        .route(
            "/api/courses/instructor/my-courses/:course_id/quizzes",
            get(quizzes::quiz_list),
        )
        .route(
            "/api/courses/instructor/lessons/:lesson_id/quizzes",
            post(quizzes::quiz_create),
        )
        .route(
            "/api/courses/instructor/quizzes/:quiz_id",
            get(quizzes::quiz_get)
                .put(quizzes::quiz_update)
                .delete(quizzes::quiz_delete),
        )
        .route(
            "/api/courses/instructor/my-courses/:course_id/students",
            get(students::course_students),
        )
        .route("/api/courses/instructor/students", get(students::student_list))
        .route("/api/revenue/instructor/my-courses", get(revenue::my_revenue))
        .route_layer(middleware::from_fn(require_instructor))
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn admin_routes() -> Router<AppState> {
    use handlers::elevated::admin::{revenue, system, users};

    Router::new()
        .route("/api/admin/users", get(users::user_list).post(users::user_create))
        .route("/api/admin/users/role/:role", get(users::users_by_role))
        .route(
            "/api/admin/users/:user_id",
            get(users::user_get)
                .put(users::user_update)
                .delete(users::user_delete),
        )
        .route("/api/revenue/admin/summary", get(revenue::summary))
        .route("/api/revenue/admin/by-date", get(revenue::by_date))
        .route("/api/revenue/admin/by-course", get(revenue::by_course))
        .route("/api/revenue/admin/by-tag", get(revenue::by_tag))
        .route("/api/admin/system/overview", get(system::overview))
        .route("/api/admin/system/logs", get(system::logs))
        .route(
            "/api/admin/system/maintenance-mode",
            get(system::maintenance_get).put(system::maintenance_put),
        )
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    if config.security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    if origins.is_empty() {
        // Production without configured origins stays same-origin
        return if crate::is_production!() {
            CorsLayer::new()
        } else {
            CorsLayer::permissive()
        };
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "CourseHub API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "catalog": "/api/courses, /api/courses/tags, /api/courses/:courseId{,/related}",
                "learning": "/api/courses/:courseId/{content,progress}, /api/lessons/:lessonId/{progress,complete}",
                "quizzes": "/api/quizzes/* (protected)",
                "enrollments": "/api/enrollments/* (protected)",
                "reviews": "/api/reviews/* (protected)",
                "recommendations": "/api/recommendations/feedback (student)",
                "instructor": "/api/courses/instructor/*, /api/revenue/instructor/my-courses (instructor)",
                "admin": "/api/admin/{system,users}/*, /api/revenue/admin/* (admin)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}
