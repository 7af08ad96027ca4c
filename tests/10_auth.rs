mod common;

use anyhow::Result;
use coursemart_api::auth::{issue_token, Claims};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.get("/health").send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "ok");
    Ok(())
}

#[tokio::test]
async fn whoami_is_anonymous_without_a_token() -> Result<()> {
    let server = common::spawn_server().await?;

    let body: Value = server.get("/api/auth/whoami").send().await?.json().await?;
    assert_eq!(body["authenticated"], false);
    assert!(body["user"].is_null());
    Ok(())
}

#[tokio::test]
async fn whoami_continues_anonymously_with_a_bad_token() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.get("/api/auth/whoami").bearer_auth("not-a-jwt").send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["authenticated"], false);
    Ok(())
}

#[tokio::test]
async fn whoami_resolves_explicit_roles() -> Result<()> {
    let server = common::spawn_server().await?;

    let body: Value = server
        .get("/api/auth/whoami")
        .bearer_auth(common::instructor_token("inst-1"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["user"]["uid"], "inst-1");
    assert_eq!(body["user"]["role"], "instructor");
    Ok(())
}

#[tokio::test]
async fn display_name_marker_grants_instructor_role() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = common::token("legacy-1", "Grace Hopper [INSTRUCTOR]", None);

    let body: Value = server.get("/api/auth/whoami").bearer_auth(&token).send().await?.json().await?;
    assert_eq!(body["user"]["role"], "instructor");
    assert_eq!(body["user"]["name"], "Grace Hopper");

    let plain = common::token("legacy-2", "Alan Turing", None);
    let body: Value = server.get("/api/auth/whoami").bearer_auth(&plain).send().await?.json().await?;
    assert_eq!(body["user"]["role"], "student");
    Ok(())
}

#[tokio::test]
async fn protected_routes_reject_missing_and_foreign_tokens() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.get("/api/enrollments/me").send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "No authentication token provided");

    let foreign = issue_token("some-other-secret", &Claims::new("intruder", 1))?;
    let res = server.get("/api/enrollments/me").bearer_auth(foreign).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Invalid or expired token");
    Ok(())
}

#[tokio::test]
async fn students_cannot_create_courses() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .post("/api/courses")
        .bearer_auth(common::student_token("stu-1"))
        .json(&common::course_body("Sneaky Course", 10.0, "Design"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Instructor role required");
    Ok(())
}
