//! API integration tests.
//!
//! These tests drive the full router, including the session middleware and
//! role gates, against a mock database.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use std::sync::Arc;

use aashray_api::{app, flash::FLASH_COOKIE, middleware::AppState};
use aashray_common::{LocalStorage, config::SessionConfig};
use aashray_core::{AccountService, CaseService, SessionService, TeamService};
use aashray_db::{
    entities::{
        case::{self, CasePriority, CaseStatus},
        group, session, user,
    },
    repositories::{CaseRepository, GroupRepository, SessionRepository, UserRepository},
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, MockExecResult, Value};
use std::collections::BTreeMap;
use std::io::Cursor;
use tower::ServiceExt;

const TOKEN: &str = "0123456789abcdef0123456789abcdef";

/// Create test app state over the given connection.
fn create_test_state(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);

    let user_repo = UserRepository::new(Arc::clone(&db));
    let group_repo = GroupRepository::new(Arc::clone(&db));
    let case_repo = CaseRepository::new(Arc::clone(&db));
    let session_repo = SessionRepository::new(Arc::clone(&db));

    let storage = Arc::new(LocalStorage::new(
        std::env::temp_dir().join("aashray-api-tests"),
        "/media".to_string(),
    ));
    let session = SessionConfig::default();

    AppState {
        account_service: AccountService::new(user_repo.clone()),
        session_service: SessionService::new(
            session_repo,
            user_repo.clone(),
            group_repo.clone(),
            session.ttl_hours,
        ),
        case_service: CaseService::new(case_repo.clone(), storage),
        team_service: TeamService::new(user_repo, group_repo, case_repo),
        session,
        max_upload_bytes: 10 * 1024 * 1024,
    }
}

fn create_test_router(db: MockDatabase) -> Router {
    app(create_test_state(db.into_connection()))
}

/// Router over a connection the test keeps a handle to, for reading the
/// statement log afterwards.
fn logged_router(db: MockDatabase) -> (Router, DatabaseConnection) {
    let conn = db.into_connection();
    // `DatabaseConnection` is not `Clone` under sea-orm's `mock` feature;
    // share the underlying mock connection instead.
    let DatabaseConnection::MockDatabaseConnection(inner) = &conn else {
        unreachable!("MockDatabase::into_connection yields a mock connection")
    };
    let shared = DatabaseConnection::MockDatabaseConnection(Arc::clone(inner));
    (app(create_test_state(shared)), conn)
}

fn empty_router() -> Router {
    create_test_router(MockDatabase::new(DatabaseBackend::Postgres))
}

fn test_user(id: i64, username: &str, is_superuser: bool) -> user::Model {
    user::Model {
        id,
        username: username.to_string(),
        first_name: String::new(),
        last_name: String::new(),
        email: format!("{username}@example.com"),
        password: String::new(),
        is_superuser,
        is_active: true,
        date_joined: Utc::now().into(),
        last_login: None,
    }
}

fn group_row(id: i64, name: &str) -> group::Model {
    group::Model {
        id,
        name: name.to_string(),
    }
}

fn count_row(n: i64) -> BTreeMap<String, Value> {
    BTreeMap::from([("num_items".to_string(), Value::BigInt(Some(n)))])
}

fn rows_affected(n: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: n,
    }
}

fn case_row(id: i64, status: CaseStatus, reported_by: i64) -> case::Model {
    let now = Utc::now();
    case::Model {
        id,
        case_type: format!("Case type {id}"),
        place_spotted: "Market".to_string(),
        needs: "Rice".to_string(),
        priority: CasePriority::High,
        image: None,
        status,
        reported_by,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

/// Mock database that resolves `TOKEN` to the given user and groups.
fn signed_in(user: user::Model, groups: Vec<group::Model>) -> MockDatabase {
    let now = Utc::now();
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[session::Model {
            token: TOKEN.to_string(),
            user_id: user.id,
            created_at: now.into(),
            expires_at: (now + Duration::hours(1)).into(),
        }]])
        .append_query_results([[user]])
        .append_query_results([groups])
}

fn session_cookie() -> String {
    format!("{}={TOKEN}", SessionConfig::default().cookie_name)
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Notices queued by the response, decoded from the flash cookie.
fn flashed(response: &Response) -> Vec<serde_json::Value> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.strip_prefix(&format!("{FLASH_COOKIE}=")).map(ToString::to_string))
        .filter_map(|v| v.split(';').next().map(ToString::to_string))
        .filter_map(|v| URL_SAFE_NO_PAD.decode(v).ok())
        .filter_map(|raw| serde_json::from_slice::<Vec<serde_json::Value>>(&raw).ok())
        .flatten()
        .collect()
}

async fn json_body(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn html_body(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Bound values of the first statement starting with `prefix`.
fn bound_values(conn: DatabaseConnection, prefix: &str) -> Vec<Value> {
    conn.into_transaction_log()
        .iter()
        .flat_map(|txn| txn.statements().to_vec())
        .find(|stmt| stmt.sql.starts_with(prefix))
        .and_then(|stmt| stmt.values)
        .map(|values| values.0)
        .unwrap_or_default()
}

fn text(value: &str) -> Value {
    Value::String(Some(Box::new(value.to_string())))
}

fn png_bytes() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::new_rgb8(2, 2)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

const BOUNDARY: &str = "aashray-boundary";

/// Multipart body with text parts followed by one PNG image part.
fn multipart_report(fields: &[(&str, &str)], image: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"photo.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(image);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

#[tokio::test]
async fn test_gated_pages_redirect_to_login() {
    for uri in [
        "/volunteer/home/",
        "/volunteer/report/",
        "/cases/",
        "/team/dashboard/",
        "/dashboard/",
    ] {
        let response = empty_router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/login/", "{uri}");

        let notices = flashed(&response);
        assert_eq!(notices[0]["level"], "warning");
        assert_eq!(notices[0]["text"], "Please login to access this page.");
    }
}

#[tokio::test]
async fn test_gated_post_redirects_to_login() {
    let response = empty_router()
        .oneshot(
            Request::builder()
                .uri("/team/case/1/update/")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("status=RESOLVED"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login/");
}

#[tokio::test]
async fn test_login_page_renders() {
    let response = empty_router()
        .oneshot(Request::builder().uri("/login/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains(r#"name="username""#));
}

#[tokio::test]
async fn test_unknown_path_returns_404() {
    let response = empty_router()
        .oneshot(
            Request::builder()
                .uri("/nonexistent/endpoint")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_api_report_requires_authentication() {
    let response = empty_router()
        .oneshot(
            Request::builder()
                .uri("/api/report/")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"case_type":"Food Shortage"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({"success": false, "error": "Authentication required"})
    );
}

#[tokio::test]
async fn test_api_report_rejects_get() {
    let response = empty_router()
        .oneshot(
            Request::builder()
                .uri("/api/report/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_api_report_creates_case_owned_by_caller() {
    let db = signed_in(test_user(3, "asha", false), vec![group_row(2, "Volunteer")])
        .append_query_results([[case_row(17, CaseStatus::Pending, 3)]]);
    let (router, conn) = logged_router(db);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/report/")
                .method("POST")
                .header(header::COOKIE, session_cookie())
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "case_type=Food+Shortage&place_spotted=Market&needs=Rice&priority=HIGH&reported_by=99&status=RESOLVED",
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({
            "success": true,
            "message": "Case reported successfully",
            "case_id": 17
        })
    );

    let values = bound_values(conn, r#"INSERT INTO "case""#);
    assert!(values.contains(&Value::BigInt(Some(3))));
    assert!(!values.contains(&Value::BigInt(Some(99))));
    assert!(values.contains(&text("PENDING")));
    assert!(!values.contains(&text("RESOLVED")));
}

#[tokio::test]
async fn test_api_report_missing_field() {
    let db = signed_in(test_user(3, "asha", false), vec![]);

    let response = create_test_router(db)
        .oneshot(
            Request::builder()
                .uri("/api/report/")
                .method("POST")
                .header(header::COOKIE, session_cookie())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"place_spotted":"Market","needs":"Rice"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "MISSING_FIELD");
    assert_eq!(body["field"], "case_type");
}

#[tokio::test]
async fn test_api_report_invalid_priority() {
    let db = signed_in(test_user(3, "asha", false), vec![]);

    let response = create_test_router(db)
        .oneshot(
            Request::builder()
                .uri("/api/report/")
                .method("POST")
                .header(header::COOKIE, session_cookie())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"case_type":"Food","place_spotted":"Market","needs":"Rice","priority":"URGENT"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "INVALID_CHOICE");
    assert_eq!(body["field"], "priority");
}

#[tokio::test]
async fn test_volunteer_is_turned_away_from_admin_dashboard() {
    let db = signed_in(test_user(3, "asha", false), vec![group_row(2, "Volunteer")]);

    let response = create_test_router(db)
        .oneshot(
            Request::builder()
                .uri("/dashboard/")
                .header(header::COOKIE, session_cookie())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/volunteer/home/");
    let notices = flashed(&response);
    assert_eq!(notices[0]["level"], "error");
    assert_eq!(
        notices[0]["text"],
        "You do not have permission to access this page."
    );
}

#[tokio::test]
async fn test_signed_in_user_skips_login_form() {
    let db = signed_in(test_user(3, "kiran", false), vec![group_row(1, "Team")]);

    let response = create_test_router(db)
        .oneshot(
            Request::builder()
                .uri("/login/")
                .header(header::COOKIE, session_cookie())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/team/dashboard/");
}

#[tokio::test]
async fn test_appointing_existing_member_is_informational() {
    let db = signed_in(test_user(1, "root", true), vec![])
        .append_query_results([[test_user(4, "kiran", false)]])
        .append_query_results([[group_row(1, "Team")]])
        .append_exec_results([rows_affected(0)]);

    let response = create_test_router(db)
        .oneshot(
            Request::builder()
                .uri("/dashboard/appoint/4/")
                .method("POST")
                .header(header::COOKIE, session_cookie())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard/");
    let notices = flashed(&response);
    assert_eq!(notices[0]["level"], "info");
    assert_eq!(notices[0]["text"], "kiran is already a Team member.");
}

#[tokio::test]
async fn test_appointing_new_member() {
    let db = signed_in(test_user(1, "root", true), vec![])
        .append_query_results([[test_user(4, "kiran", false)]])
        .append_query_results([[group_row(1, "Team")]])
        .append_exec_results([rows_affected(1)]);

    let response = create_test_router(db)
        .oneshot(
            Request::builder()
                .uri("/dashboard/appoint/4/")
                .method("POST")
                .header(header::COOKIE, session_cookie())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let notices = flashed(&response);
    assert_eq!(notices[0]["level"], "success");
    assert_eq!(notices[0]["text"], "kiran has been appointed as a Team member.");
}

#[tokio::test]
async fn test_status_update_on_missing_case_is_404() {
    let db = signed_in(test_user(5, "kiran", false), vec![group_row(1, "Team")])
        .append_query_results([Vec::<case::Model>::new()]);

    let response = create_test_router(db)
        .oneshot(
            Request::builder()
                .uri("/team/case/404/update/")
                .method("POST")
                .header(header::COOKIE, session_cookie())
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("status=RESOLVED"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_html_report_form_renders_for_volunteer() {
    let db = signed_in(test_user(3, "asha", false), vec![group_row(2, "Volunteer")]);

    let response = create_test_router(db)
        .oneshot(
            Request::builder()
                .uri("/volunteer/report/")
                .header(header::COOKIE, session_cookie())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = html_body(response).await;
    assert!(html.contains("Report a Case"));
    assert!(html.contains(r#"enctype="multipart/form-data""#));
    assert!(html.contains(r#"<option value="HIGH">"#));
}

#[tokio::test]
async fn test_multipart_report_ignores_posted_owner_and_status() {
    let mut stored = case_row(21, CaseStatus::Pending, 3);
    stored.image = Some("case_images/stored.png".to_string());
    let db = signed_in(test_user(3, "asha", false), vec![group_row(2, "Volunteer")])
        .append_query_results([[stored]]);
    let (router, conn) = logged_router(db);

    let body = multipart_report(
        &[
            ("case_type", "Food Shortage"),
            ("place_spotted", "Market"),
            ("needs", "Rice"),
            ("priority", "HIGH"),
            ("reported_by", "99"),
            ("status", "RESOLVED"),
        ],
        &png_bytes(),
    );

    let response = router
        .oneshot(
            Request::builder()
                .uri("/volunteer/report/")
                .method("POST")
                .header(header::COOKIE, session_cookie())
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/volunteer/home/");
    let notices = flashed(&response);
    assert_eq!(notices[0]["level"], "success");

    let values = bound_values(conn, r#"INSERT INTO "case""#);
    assert!(values.contains(&text("Food Shortage")));
    assert!(values.contains(&text("HIGH")));
    assert!(values.contains(&Value::BigInt(Some(3))));
    assert!(!values.contains(&Value::BigInt(Some(99))));
    assert!(values.contains(&text("PENDING")));
    assert!(!values.contains(&text("RESOLVED")));

    let key = values
        .iter()
        .find_map(|v| match v {
            Value::String(Some(s)) if s.starts_with("case_images/") => Some(s.to_string()),
            _ => None,
        })
        .expect("image key bound");
    assert!(key.ends_with(".png"));

    let path = std::env::temp_dir().join("aashray-api-tests").join(&key);
    assert_eq!(std::fs::read(&path).unwrap(), png_bytes());
    std::fs::remove_file(path).unwrap();
}

#[tokio::test]
async fn test_html_report_with_errors_rerenders_form() {
    let db = signed_in(test_user(3, "asha", false), vec![group_row(2, "Volunteer")]);
    let (router, conn) = logged_router(db);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/volunteer/report/")
                .method("POST")
                .header(header::COOKIE, session_cookie())
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("case_type=Food&place_spotted=Market&needs=Rice"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = html_body(response).await;
    assert!(html.contains("Please correct the errors below."));
    assert!(html.contains(r#"value="Market""#));

    // Only the session lookup ran.
    assert!(bound_values(conn, r#"INSERT INTO "case""#).is_empty());
}

#[tokio::test]
async fn test_register_signs_in_new_volunteer() {
    let now = Utc::now();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[count_row(0)]])
        .append_query_results([[test_user(8, "meera", false)]])
        .append_query_results([[group_row(2, "Volunteer")]])
        .append_query_results([[session::Model {
            token: TOKEN.to_string(),
            user_id: 8,
            created_at: now.into(),
            expires_at: (now + Duration::hours(1)).into(),
        }]])
        .append_exec_results([rows_affected(1), rows_affected(1)]);
    let (router, conn) = logged_router(db);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/register/")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "username=meera&first_name=Meera&last_name=Nair&email=meera%40example.com&password1=correct-horse&password2=correct-horse",
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/volunteer/home/");
    let cookie_name = SessionConfig::default().cookie_name;
    assert!(
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.starts_with(&format!("{cookie_name}=")))
    );
    let notices = flashed(&response);
    assert_eq!(notices[0]["text"], "Registration successful! Welcome to Aashray.");

    // The user row and the Volunteer membership commit together.
    let log = conn.into_transaction_log();
    let txn = log
        .iter()
        .find(|t| t.statements().first().is_some_and(|s| s.sql == "BEGIN"))
        .expect("registration transaction");
    let sql: Vec<&str> = txn.statements().iter().map(|s| s.sql.as_str()).collect();
    assert!(sql.iter().any(|s| s.starts_with(r#"INSERT INTO "user""#)));
    assert!(sql.iter().any(|s| s.starts_with(r#"INSERT INTO "user_group""#)));
    assert_eq!(sql.last(), Some(&"COMMIT"));
}

#[tokio::test]
async fn test_register_with_invalid_fields_rerenders_form() {
    let response = empty_router()
        .oneshot(
            Request::builder()
                .uri("/register/")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "username=bad+name%21&first_name=Meera&last_name=Nair&email=meera%40example.com&password1=correct-horse&password2=other-horse",
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = html_body(response).await;
    assert!(html.contains("Enter a valid username."));
    assert!(html.contains("The two password fields didn"));
    assert!(html.contains(r#"value="Meera""#));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let db = signed_in(test_user(3, "asha", false), vec![group_row(2, "Volunteer")])
        .append_exec_results([rows_affected(1)]);
    let (router, conn) = logged_router(db);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/logout/")
                .method("POST")
                .header(header::COOKIE, session_cookie())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login/");
    let notices = flashed(&response);
    assert_eq!(notices[0]["level"], "info");
    assert_eq!(notices[0]["text"], "You have been logged out successfully.");

    let cookie_name = SessionConfig::default().cookie_name;
    assert!(
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.starts_with(&format!("{cookie_name}=;")) && v.contains("Max-Age=0"))
    );

    assert_eq!(
        bound_values(conn, r#"DELETE FROM "session""#),
        vec![text(TOKEN)]
    );
}

#[tokio::test]
async fn test_case_board_lists_filtered_cases() {
    let db = signed_in(test_user(3, "asha", false), vec![group_row(2, "Volunteer")])
        .append_query_results([vec![
            case_row(12, CaseStatus::Pending, 3),
            case_row(11, CaseStatus::Pending, 4),
        ]]);

    let response = create_test_router(db)
        .oneshot(
            Request::builder()
                .uri("/cases/?status=PENDING&priority=")
                .header(header::COOKIE, session_cookie())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = html_body(response).await;
    assert!(html.contains("2 case(s)"));
    assert!(html.find("Case type 12").unwrap() < html.find("Case type 11").unwrap());
    assert!(html.contains(r#"<option value="PENDING" selected>"#));
}

#[tokio::test]
async fn test_case_board_unknown_filter_matches_nothing() {
    // No case query is mocked, so reaching the database would fail the request.
    let db = signed_in(test_user(3, "asha", false), vec![group_row(2, "Volunteer")]);

    let response = create_test_router(db)
        .oneshot(
            Request::builder()
                .uri("/cases/?status=BOGUS")
                .header(header::COOKIE, session_cookie())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = html_body(response).await;
    assert!(html.contains("0 case(s)"));
    assert!(html.contains("No cases found."));
}

#[tokio::test]
async fn test_team_dashboard_groups_cases_by_status() {
    let db = signed_in(test_user(5, "kiran", false), vec![group_row(1, "Team")])
        .append_query_results([vec![
            case_row(3, CaseStatus::Resolved, 2),
            case_row(2, CaseStatus::InProgress, 2),
            case_row(1, CaseStatus::Pending, 2),
        ]]);

    let response = create_test_router(db)
        .oneshot(
            Request::builder()
                .uri("/team/dashboard/")
                .header(header::COOKIE, session_cookie())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = html_body(response).await;
    assert!(html.contains("Team Dashboard"));
    for id in 1..=3 {
        assert!(html.contains(&format!(r#"action="/team/case/{id}/update/""#)));
    }
    let pending = html.find("<h4>Pending").unwrap();
    let in_progress = html.find("<h4>In Progress").unwrap();
    let resolved = html.find("<h4>Resolved").unwrap();
    let case_one = html.find("#1 Case type 1").unwrap();
    assert!(pending < case_one && case_one < in_progress);
    assert!(html.find("#3 Case type 3").unwrap() > resolved);
}

#[tokio::test]
async fn test_volunteer_is_turned_away_from_team_dashboard() {
    let db = signed_in(test_user(3, "asha", false), vec![group_row(2, "Volunteer")]);

    let response = create_test_router(db)
        .oneshot(
            Request::builder()
                .uri("/team/dashboard/")
                .header(header::COOKIE, session_cookie())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/volunteer/home/");
}

#[tokio::test]
async fn test_removing_team_member() {
    let db = signed_in(test_user(1, "root", true), vec![])
        .append_query_results([[test_user(4, "kiran", false)]])
        .append_query_results([[group_row(1, "Team")]])
        .append_exec_results([rows_affected(1)]);

    let response = create_test_router(db)
        .oneshot(
            Request::builder()
                .uri("/dashboard/remove/4/")
                .method("POST")
                .header(header::COOKIE, session_cookie())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard/");
    let notices = flashed(&response);
    assert_eq!(notices[0]["level"], "success");
    assert_eq!(notices[0]["text"], "kiran has been removed from Team.");
}

#[tokio::test]
async fn test_removing_non_member_flashes_nothing() {
    let db = signed_in(test_user(1, "root", true), vec![])
        .append_query_results([[test_user(4, "kiran", false)]])
        .append_query_results([[group_row(1, "Team")]])
        .append_exec_results([rows_affected(0)]);

    let response = create_test_router(db)
        .oneshot(
            Request::builder()
                .uri("/dashboard/remove/4/")
                .method("POST")
                .header(header::COOKIE, session_cookie())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard/");
    assert!(flashed(&response).is_empty());
}

#[tokio::test]
async fn test_failed_session_lookup_is_server_error() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("connection reset".to_string())]);

    let response = create_test_router(db)
        .oneshot(
            Request::builder()
                .uri("/login/")
                .header(header::COOKIE, session_cookie())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "DATABASE_ERROR");
    assert_eq!(body["error"]["message"], "Internal server error");
}
