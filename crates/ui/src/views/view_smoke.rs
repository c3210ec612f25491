use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{Value, json};
use storage::repository::Storage;
use virtuatest_core::model::{AccessToken, Credentials, Role, TestSession, UserId, UserProfile};

use super::test_harness::{ShellCommand, setup_view_harness, setup_view_harness_with_api};
use crate::vm::{
    ButtonStyle, DialogButton, DialogKind, DialogRequest, DialogState, RoutePhase, ViewId,
};

/// Class attribute of the tag carrying `id`.
fn section_class<'a>(html: &'a str, id: &str) -> Option<&'a str> {
    let at = html.find(&format!(r#"id="{id}""#))?;
    let start = html[..at].rfind('<')?;
    let end = at + html[at..].find('>')?;
    let tag = &html[start..end];
    let class_at = tag.find(r#"class=""#)? + r#"class=""#.len();
    let class_end = class_at + tag[class_at..].find('"')?;
    Some(&tag[class_at..class_end])
}

fn ada(role: Role) -> Credentials {
    Credentials::new(
        AccessToken::new("token-ada"),
        UserProfile {
            id: UserId::new(3),
            email: "ada@example.com".into(),
            role,
            full_name: Some("Ada".into()),
        },
    )
}

async fn signed_in_storage(role: Role) -> Storage {
    let storage = Storage::in_memory();
    storage
        .credentials()
        .save(&ada(role))
        .await
        .expect("save credentials");
    storage
}

async fn cache_session(storage: &Storage, id: u64) {
    let session: TestSession =
        serde_json::from_value(json!({"id": id, "student_id": 3, "is_completed": false}))
            .expect("session json");
    storage
        .session_cache()
        .store(&session)
        .await
        .expect("cache session");
}

async fn respond(
    server: &mut ServerGuard,
    method: &str,
    path: &str,
    status: usize,
    body: Value,
) -> Mock {
    server
        .mock(method, path)
        .match_query(Matcher::Any)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

#[tokio::test(flavor = "current_thread")]
async fn shell_starts_on_login_without_credentials() {
    let mut harness = setup_view_harness(Storage::in_memory());
    harness.rebuild();
    harness.drive_async().await;

    let html = harness.render();
    assert_eq!(section_class(&html, "login-view"), Some("view active"));
    assert_eq!(section_class(&html, "dashboard-view"), Some("view hidden"));
    assert!(html.contains("Sign in"), "missing sign-in form in {html}");
    assert!(!html.contains("modal-overlay"), "no dialog expected in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn stored_credentials_open_the_dashboard() {
    let storage = signed_in_storage(Role::Student).await;
    let mut harness = setup_view_harness(storage);
    harness.rebuild();
    assert!(harness.drive_until_shown(ViewId::Dashboard).await);

    let html = harness.render();
    assert!(html.contains("Welcome, Ada"), "missing greeting in {html}");
    assert_eq!(section_class(&html, "login-view"), Some("view hidden"));
    assert_eq!(section_class(&html, "dashboard-view"), Some("view active"));
}

#[tokio::test(flavor = "current_thread")]
async fn stored_admin_lands_on_admin_view() {
    let storage = signed_in_storage(Role::Admin).await;
    let mut harness = setup_view_harness(storage);
    harness.rebuild();
    assert!(harness.drive_until_shown(ViewId::Admin).await);
    assert!(harness.render().contains("Administration"));
}

#[tokio::test(flavor = "current_thread")]
async fn dialog_host_renders_open_dialog() {
    let mut harness = setup_view_harness(Storage::in_memory());
    let _pending = harness.dialogs.show(
        DialogRequest::new(DialogKind::Error, "Login failed", "Invalid email or password")
            .with_button(DialogButton::new("OK", "ok", ButtonStyle::Primary)),
    );
    harness.rebuild();

    let html = harness.render();
    assert!(html.contains("modal-overlay"), "missing overlay in {html}");
    assert!(html.contains("fa-circle-xmark"), "missing error icon in {html}");
    assert!(html.contains("Invalid email or password"), "missing message in {html}");
    assert!(html.contains("btn btn-primary"), "missing button in {html}");

    harness.dialogs.select(0);
    assert_eq!(harness.dialogs.state(), DialogState::Closed);
    harness.drive_async().await;
    harness.drive_async().await;
    assert!(!harness.render().contains("modal-overlay"));
}

#[tokio::test(flavor = "current_thread")]
async fn logout_clears_credentials_and_returns_to_login() {
    let mut server = mockito::Server::new_async().await;
    respond(&mut server, "GET", "/test/history", 200, json!([])).await;
    let logout = respond(
        &mut server,
        "POST",
        "/auth/logout",
        200,
        json!({"message": "Logged out"}),
    )
    .await;

    let storage = signed_in_storage(Role::Student).await;
    let mut harness = setup_view_harness_with_api(storage, &server.url());
    harness.rebuild();
    assert!(harness.drive_until_shown(ViewId::Dashboard).await);
    assert!(harness.drive_until_rendered("Welcome, Ada").await);

    harness.send(ShellCommand::LogOut);
    assert!(harness.drive_until_shown(ViewId::Login).await);
    harness.drive_async().await;

    logout.assert_async().await;
    assert_eq!(harness.router.phase(), RoutePhase::Shown(ViewId::Login));
    assert_eq!(harness.storage.credentials().load().await.unwrap(), None);
    let html = harness.render();
    assert_eq!(section_class(&html, "login-view"), Some("view active"));
    assert!(!html.contains("Welcome, Ada"), "user still shown in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn rejected_token_on_load_signs_out() {
    let mut server = mockito::Server::new_async().await;
    respond(
        &mut server,
        "GET",
        "/test/progress/4",
        401,
        json!({"detail": "Could not validate credentials"}),
    )
    .await;
    respond(&mut server, "GET", "/test/history", 200, json!([])).await;

    let storage = signed_in_storage(Role::Student).await;
    cache_session(&storage, 4).await;
    let mut harness = setup_view_harness_with_api(storage, &server.url());
    harness.rebuild();

    assert!(harness.drive_until_rendered("Signed out").await);
    harness.drive_async().await;

    assert_eq!(harness.router.phase(), RoutePhase::Shown(ViewId::Login));
    assert_eq!(harness.storage.credentials().load().await.unwrap(), None);
    assert_eq!(harness.storage.session_cache().load().await.unwrap(), None);
    let html = harness.render();
    assert_eq!(section_class(&html, "login-view"), Some("view active"));
    assert!(html.contains("Could not validate credentials"), "missing detail in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn finished_cached_session_offers_a_new_test() {
    let mut server = mockito::Server::new_async().await;
    respond(
        &mut server,
        "GET",
        "/test/progress/9",
        200,
        json!({
            "session_id": 9,
            "total_modules": 4,
            "completed_modules": 4,
            "progress_percent": 100.0,
            "current_module": null
        }),
    )
    .await;
    respond(&mut server, "GET", "/test/history", 200, json!([])).await;

    let storage = signed_in_storage(Role::Student).await;
    cache_session(&storage, 9).await;
    let mut harness = setup_view_harness_with_api(storage, &server.url());
    harness.rebuild();

    assert!(harness.drive_until_rendered("Start test").await);
    assert!(!harness.render().contains("Continue test"));
}

#[tokio::test(flavor = "current_thread")]
async fn admin_view_loads_without_reports() {
    let mut server = mockito::Server::new_async().await;
    respond(
        &mut server,
        "GET",
        "/admin/stats",
        200,
        json!({"total_users": 12, "total_admins": 1, "active_users": 9, "ai_status": "online"}),
    )
    .await;
    respond(&mut server, "GET", "/admin/users", 200, json!([])).await;
    respond(
        &mut server,
        "GET",
        "/admin/config",
        200,
        json!({
            "reading_time_limit": 1200,
            "listening_time_limit": 840,
            "writing_time_limit": 2400,
            "speaking_time_limit": 180,
            "ai_generation_settings": {"difficulty": "B1"}
        }),
    )
    .await;
    respond(
        &mut server,
        "GET",
        "/admin/reports",
        404,
        json!({"detail": "Not Found"}),
    )
    .await;

    let storage = signed_in_storage(Role::Admin).await;
    let mut harness = setup_view_harness_with_api(storage, &server.url());
    harness.rebuild();

    assert!(harness.drive_until_rendered("AI service").await);
    let html = harness.render();
    assert!(html.contains("online"), "missing stats in {html}");
    assert!(html.contains("Test configuration"), "missing config form in {html}");
    assert!(!html.contains("Not Found"), "reports failure leaked into {html}");
}
