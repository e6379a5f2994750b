mod common;

use anyhow::Result;
use chrono::{Duration, SecondsFormat, Utc};
use coursehub_api::types::Role;
use reqwest::{header::AUTHORIZATION, StatusCode};
use serde_json::{json, Value};

use common::fixtures;

/// `from`/`to` query covering the last and next hour
fn around_now() -> String {
    let now = Utc::now();
    let from = (now - Duration::hours(1)).to_rfc3339_opts(SecondsFormat::Secs, true);
    let to = (now + Duration::hours(1)).to_rfc3339_opts(SecondsFormat::Secs, true);
    format!("from={}&to={}", from, to)
}

fn find<'a>(rows: &'a Value, key: &str, id: i64) -> Option<&'a Value> {
    rows.as_array()?.iter().find(|row| row[key] == id)
}

#[tokio::test]
async fn enrolled_student_reviews_once() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let pool = common::pool().await?;
    let instructor = fixtures::user(&pool, "INSTRUCTOR").await?;
    let student = fixtures::user(&pool, "STUDENT").await?;
    let outsider = fixtures::user(&pool, "STUDENT").await?;
    let course = fixtures::course(&pool, instructor, true, &[Some(60)]).await?;
    fixtures::enroll(&pool, course.course_id, student).await?;

    let client = reqwest::Client::new();
    let url = server.url(&format!("/api/reviews/courses/{}", course.course_id));
    let body = json!({ "rating": 4, "comment": "Clear and practical" });

    let res = client
        .post(&url)
        .header(AUTHORIZATION, common::bearer(outsider, Role::Student))
        .json(&body)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let auth = common::bearer(student, Role::Student);
    let res = client.post(&url).header(AUTHORIZATION, &auth).json(&body).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await?;
    let review_id = created["review"]["id"].as_i64().unwrap_or_default();

    let res = client.post(&url).header(AUTHORIZATION, &auth).json(&body).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let mine: Value = client
        .get(server.url("/api/enrollments/my-courses"))
        .header(AUTHORIZATION, &auth)
        .send()
        .await?
        .json()
        .await?;
    let view = &mine["data"]["enrollments"][0]["course"];
    assert_eq!(view["avgRating"], 4.0);
    assert_eq!(view["reviewCount"], 1);

    let review_url = server.url(&format!("/api/reviews/{}", review_id));
    let res = client
        .put(&review_url)
        .header(AUTHORIZATION, common::bearer(outsider, Role::Student))
        .json(&json!({ "rating": 1 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(&review_url)
        .header(AUTHORIZATION, &auth)
        .json(&json!({ "rating": 5 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(updated["review"]["rating"], 5);
    assert_eq!(updated["review"]["comment"], "Clear and practical");

    let res = client.delete(&review_url).header(AUTHORIZATION, &auth).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.delete(&review_url).header(AUTHORIZATION, &auth).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn paid_orders_feed_revenue_reports() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let pool = common::pool().await?;
    let admin = fixtures::user(&pool, "ADMIN").await?;
    let instructor = fixtures::user(&pool, "INSTRUCTOR").await?;
    let buyer = fixtures::user(&pool, "STUDENT").await?;
    let other_buyer = fixtures::user(&pool, "STUDENT").await?;
    let first = fixtures::course(&pool, instructor, true, &[Some(60)]).await?;
    let second = fixtures::course(&pool, instructor, true, &[Some(60)]).await?;
    let (tag_id, _) = fixtures::tag(&pool, &[first.course_id, second.course_id]).await?;

    fixtures::paid_order(&pool, buyer, &[(first.course_id, 300_000), (second.course_id, 100_000)], "PAID").await?;
    fixtures::paid_order(&pool, other_buyer, &[(first.course_id, 300_000)], "PAID").await?;
    fixtures::paid_order(&pool, other_buyer, &[(second.course_id, 100_000)], "FAILED").await?;

    let client = reqwest::Client::new();
    let admin_auth = common::bearer(admin, Role::Admin);
    let range = around_now();

    let by_course: Value = client
        .get(server.url(&format!("/api/revenue/admin/by-course?{}", range)))
        .header(AUTHORIZATION, &admin_auth)
        .send()
        .await?
        .json()
        .await?;
    let row = find(&by_course["data"], "courseId", first.course_id).cloned().unwrap_or(Value::Null);
    assert_eq!(row["totalRevenue"], 600_000);
    assert_eq!(row["totalStudents"], 2);
    let row = find(&by_course["data"], "courseId", second.course_id).cloned().unwrap_or(Value::Null);
    assert_eq!(row["totalRevenue"], 100_000);
    assert_eq!(row["totalStudents"], 1);

    let by_tag: Value = client
        .get(server.url(&format!("/api/revenue/admin/by-tag?{}", range)))
        .header(AUTHORIZATION, &admin_auth)
        .send()
        .await?
        .json()
        .await?;
    let row = find(&by_tag["data"], "tagId", tag_id).cloned().unwrap_or(Value::Null);
    assert_eq!(row["totalRevenue"], 700_000);
    assert_eq!(row["courseCount"], 2);

    let by_date: Value = client
        .get(server.url(&format!("/api/revenue/admin/by-date?{}&groupBy=day", range)))
        .header(AUTHORIZATION, &admin_auth)
        .send()
        .await?
        .json()
        .await?;
    let today: i64 = by_date["data"]
        .as_array()
        .map(|points| points.iter().filter_map(|p| p["revenue"].as_i64()).sum())
        .unwrap_or_default();
    assert!(today >= 700_000);

    let mine: Value = client
        .get(server.url(&format!("/api/revenue/instructor/my-courses?{}", range)))
        .header(AUTHORIZATION, common::bearer(instructor, Role::Instructor))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(mine["totalRevenue"], 700_000);
    assert_eq!(mine["courses"][0]["courseId"], first.course_id);
    assert_eq!(mine["courses"][0]["students"], 2);
    Ok(())
}
