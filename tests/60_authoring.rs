mod common;

use anyhow::Result;
use coursehub_api::types::Role;
use reqwest::{header::AUTHORIZATION, StatusCode};
use serde_json::{json, Value};
use sqlx::PgPool;

use common::{fixtures, TestServer};

async fn course_percent(pool: &PgPool, course_id: i64, student_id: i64) -> Result<i32> {
    let percent = sqlx::query_scalar(
        "SELECT percent FROM student_course_progress WHERE course_id = $1 AND student_id = $2",
    )
    .bind(course_id)
    .bind(student_id)
    .fetch_one(pool)
    .await?;
    Ok(percent)
}

async fn send(server: &TestServer, method: reqwest::Method, path: &str, auth: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let mut request = reqwest::Client::new()
        .request(method, server.url(path))
        .header(AUTHORIZATION, auth);
    if let Some(body) = body {
        request = request.json(&body);
    }
    let res = request.send().await?;
    let status = res.status();
    let body = res.json().await.unwrap_or(Value::Null);
    Ok((status, body))
}

#[tokio::test]
async fn instructor_builds_course_outline() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let pool = common::pool().await?;
    let instructor = fixtures::user(&pool, "INSTRUCTOR").await?;
    let auth = common::bearer(instructor, Role::Instructor);
    let post = reqwest::Method::POST;

    let (status, body) = send(
        server,
        post.clone(),
        "/api/courses/instructor/my-courses",
        &auth,
        Some(json!({ "title": "Systems Programming", "priceCents": 250000 })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let course_id = body["course"]["id"].as_i64().unwrap_or_default();
    assert!(body["course"]["slug"].as_str().unwrap_or_default().starts_with("systems-programming-"));
    assert_eq!(body["course"]["currency"], "VND");
    assert_eq!(body["course"]["isPublished"], false);

    let (status, body) = send(
        server,
        post.clone(),
        &format!("/api/courses/instructor/my-courses/{}/modules", course_id),
        &auth,
        Some(json!({ "title": "Ownership" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["module"]["position"], 1);
    let module_id = body["module"]["id"].as_i64().unwrap_or_default();

    for title in ["Moves", "Borrows"] {
        let (status, _) = send(
            server,
            post.clone(),
            &format!("/api/courses/instructor/modules/{}/lessons", module_id),
            &auth,
            Some(json!({ "title": title, "durationS": 300 })),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send(
        server,
        reqwest::Method::GET,
        &format!("/api/courses/instructor/modules/{}/lessons", module_id),
        &auth,
        None,
    )
    .await?;
    let positions: Vec<i64> = body["lessons"]
        .as_array()
        .map(|lessons| lessons.iter().filter_map(|l| l["position"].as_i64()).collect())
        .unwrap_or_default();
    assert_eq!(positions, vec![1, 2]);

    let (_, body) = send(server, reqwest::Method::GET, "/api/courses/instructor/my-courses", &auth, None).await?;
    let listed = body["courses"]
        .as_array()
        .and_then(|courses| courses.iter().find(|c| c["id"] == course_id))
        .cloned()
        .unwrap_or(Value::Null);
    assert_eq!(listed["totalModules"], 1);
    assert_eq!(listed["totalLessons"], 2);

    let (status, body) = send(
        server,
        reqwest::Method::PUT,
        &format!("/api/courses/instructor/my-courses/{}", course_id),
        &auth,
        Some(json!({ "isPublished": true })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["course"]["isPublished"], true);
    assert!(!body["course"]["publishedAt"].is_null());
    Ok(())
}

#[tokio::test]
async fn other_instructor_sees_not_found() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let pool = common::pool().await?;
    let owner = fixtures::user(&pool, "INSTRUCTOR").await?;
    let other = fixtures::user(&pool, "INSTRUCTOR").await?;
    let course = fixtures::course(&pool, owner, true, &[Some(60)]).await?;
    let auth = common::bearer(other, Role::Instructor);

    for (method, path) in [
        (reqwest::Method::GET, format!("/api/courses/instructor/my-courses/{}", course.course_id)),
        (reqwest::Method::DELETE, format!("/api/courses/instructor/modules/{}", course.module_id)),
        (reqwest::Method::DELETE, format!("/api/courses/instructor/lessons/{}", course.lesson_ids[0])),
    ] {
        let (status, body) = send(server, method, &path, &auth, None).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", path);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    let lessons: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons WHERE module_id = $1")
        .bind(course.module_id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(lessons, 1);
    Ok(())
}

#[tokio::test]
async fn lesson_changes_rederive_student_progress() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let pool = common::pool().await?;
    let instructor = fixtures::user(&pool, "INSTRUCTOR").await?;
    let student = fixtures::user(&pool, "STUDENT").await?;
    let course = fixtures::course(&pool, instructor, true, &[Some(60), Some(60)]).await?;
    fixtures::enroll(&pool, course.course_id, student).await?;
    let auth = common::bearer(instructor, Role::Instructor);

    let res = reqwest::Client::new()
        .post(server.url(&format!("/api/lessons/{}/complete", course.lesson_ids[0])))
        .json(&json!({ "studentId": student }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(course_percent(&pool, course.course_id, student).await?, 50);

    let (status, body) = send(
        server,
        reqwest::Method::POST,
        &format!("/api/courses/instructor/modules/{}/lessons", course.module_id),
        &auth,
        Some(json!({ "title": "Extra reading" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(course_percent(&pool, course.course_id, student).await?, 33);

    let extra = body["lesson"]["id"].as_i64().unwrap_or_default();
    let (status, body) = send(
        server,
        reqwest::Method::DELETE,
        &format!("/api/courses/instructor/lessons/{}", extra),
        &auth,
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Lesson deleted successfully");
    assert_eq!(course_percent(&pool, course.course_id, student).await?, 50);

    let (_, body) = send(
        server,
        reqwest::Method::POST,
        &format!("/api/courses/instructor/my-courses/{}/modules", course.course_id),
        &auth,
        Some(json!({ "title": "Bonus" })),
    )
    .await?;
    let bonus = body["module"]["id"].as_i64().unwrap_or_default();
    for title in ["One", "Two"] {
        send(
            server,
            reqwest::Method::POST,
            &format!("/api/courses/instructor/modules/{}/lessons", bonus),
            &auth,
            Some(json!({ "title": title })),
        )
        .await?;
    }
    assert_eq!(course_percent(&pool, course.course_id, student).await?, 25);

    let (status, body) = send(
        server,
        reqwest::Method::DELETE,
        &format!("/api/courses/instructor/modules/{}", bonus),
        &auth,
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Module deleted successfully");
    assert_eq!(course_percent(&pool, course.course_id, student).await?, 50);
    Ok(())
}

#[tokio::test]
async fn authored_quiz_returns_answer_key() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let pool = common::pool().await?;
    let instructor = fixtures::user(&pool, "INSTRUCTOR").await?;
    let course = fixtures::course(&pool, instructor, true, &[Some(60)]).await?;
    let auth = common::bearer(instructor, Role::Instructor);

    let quiz = json!({
        "title": "Checkpoint",
        "questions": [
            {
                "question": "Which keyword moves a closure's captures?",
                "qtype": "SINGLE_CHOICE",
                "options": [
                    { "optionText": "move", "isCorrect": true },
                    { "optionText": "ref", "isCorrect": false }
                ]
            }
        ]
    });
    let (status, body) = send(
        server,
        reqwest::Method::POST,
        &format!("/api/courses/instructor/lessons/{}/quizzes", course.lesson_ids[0]),
        &auth,
        Some(quiz),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quiz"]["passScore"], 60);
    assert_eq!(body["quiz"]["lessonId"], course.lesson_ids[0]);
    assert_eq!(body["quiz"]["questions"][0]["qtype"], "SINGLE");
    assert_eq!(body["quiz"]["questions"][0]["options"][0]["isCorrect"], true);
    assert_eq!(body["quiz"]["questions"][0]["options"][1]["isCorrect"], false);

    let quiz_id = body["quiz"]["id"].as_i64().unwrap_or_default();
    let (status, body) = send(
        server,
        reqwest::Method::DELETE,
        &format!("/api/courses/instructor/quizzes/{}", quiz_id),
        &auth,
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Quiz deleted successfully");
    Ok(())
}
