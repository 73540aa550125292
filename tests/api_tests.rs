mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{FakeIdentity, NoCredential, ScriptedProvider, app_state, chunks};
use marketers_hub::routes::{create_router, with_static_files};
use marketers_hub::services::hire::HIRE_SENT_ALERT;
use marketers_hub::state::SharedState;
use serde_json::{Value, json};
use tower::util::ServiceExt;

fn app(state: SharedState) -> Router {
    create_router().with_state(state)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn marketer_app() -> Router {
    app(app_state(
        FakeIdentity::with_account("ali@marketer.com", "secret1"),
        &ScriptedProvider::new(vec![chunks(&["مرحبا"])]),
    ))
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = marketer_app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_theme_toggle_round() {
    let app = marketer_app();
    let (status, body) = call(&app, "GET", "/api/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["theme"], "dark");

    let (_, body) = call(&app, "POST", "/api/theme/toggle", None).await;
    assert_eq!(body, json!({ "theme": "light", "dark": false }));

    let (_, body) = call(&app, "PUT", "/api/theme", Some(json!({ "theme": "dark" }))).await;
    assert_eq!(body, json!({ "theme": "dark", "dark": true }));
}

#[tokio::test]
async fn test_login_then_navigate() {
    let app = marketer_app();

    let (status, _) = call(&app, "GET", "/api/views/wallet", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "ali@marketer.com", "password": "secret1", "role": "marketer" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redirect"], "/dashboard.html");

    let (_, body) = call(&app, "GET", "/api/pages/dashboard", None).await;
    assert_eq!(body, json!({ "access": "granted" }));

    let (_, body) = call(&app, "GET", "/api/views/confirmers", None).await;
    assert_eq!(body["active"], "confirmers");
    assert_eq!(body["title"], "مجتمع المؤكدين");

    // Unknown names land on the role's dashboard.
    let (_, body) = call(&app, "GET", "/api/views/nope", None).await;
    assert_eq!(body["active"], "dashboard");
    assert_eq!(body["title"], "لوحة تحكم المسوق");

    let (_, body) = call(&app, "GET", "/api/nav", None).await;
    assert_eq!(body["links"].as_array().unwrap().len(), 6);
    assert_eq!(body["links"][0]["active"], true);

    let (_, body) = call(&app, "POST", "/api/auth/logout", None).await;
    assert_eq!(body["redirect"], "/");
    let (_, body) = call(&app, "GET", "/api/pages/dashboard", None).await;
    assert_eq!(body, json!({ "access": "redirect", "to": "/login.html" }));
}

#[tokio::test]
async fn test_wrong_password_is_localized() {
    let app = marketer_app();
    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "ali@marketer.com", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "auth/wrong-password");
    assert_eq!(body["error"], "كلمة المرور غير صحيحة. يرجى المحاولة مرة أخرى.");
}

#[tokio::test]
async fn test_admin_allow_list_and_no_bypass() {
    let app = app(app_state(
        FakeIdentity::with_account("admin@hub.dz", "secret1"),
        &ScriptedProvider::default(),
    ));

    let (status, _) = call(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "admin", "password": "admin123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (_, body) = call(&app, "GET", "/api/pages/admin", None).await;
    assert_eq!(body["access"], "redirect");

    let (_, body) = call(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "admin@hub.dz", "password": "secret1" })),
    )
    .await;
    assert_eq!(body["redirect"], "/admin.html");
    let (_, body) = call(&app, "GET", "/api/pages/admin", None).await;
    assert_eq!(body["access"], "granted");
    let (_, body) = call(&app, "GET", "/api/views/users", None).await;
    assert_eq!(body["title"], "إدارة المستخدمين");
}

#[tokio::test]
async fn test_switching_accounts_drops_admin_access() {
    let identity = FakeIdentity::with_account("admin@hub.dz", "secret1");
    identity.add_account("ali@marketer.com", "secret1");
    let app = app(app_state(identity, &ScriptedProvider::default()));

    let login = |email: &str| json!({ "email": email, "password": "secret1" });
    let (_, body) = call(&app, "POST", "/api/auth/login", Some(login("admin@hub.dz"))).await;
    assert_eq!(body["redirect"], "/admin.html");
    let (_, body) = call(&app, "GET", "/api/nav", None).await;
    assert_eq!(body["role"], "admin");

    let (_, body) = call(&app, "POST", "/api/auth/login", Some(login("ali@marketer.com"))).await;
    assert_eq!(body["redirect"], "/dashboard.html");
    let (_, body) = call(&app, "GET", "/api/pages/admin", None).await;
    assert_eq!(body, json!({ "access": "redirect", "to": "/login.html" }));
    let (_, body) = call(&app, "GET", "/api/nav", None).await;
    assert_eq!(body["role"], "marketer");
}

#[tokio::test]
async fn test_federated_dismissal_reports_alert() {
    let app = marketer_app();
    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/federated",
        Some(json!({ "outcome": "dismissed", "role": "confirmer" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "auth/popup-closed-by-user");

    let (_, body) = call(&app, "GET", "/api/auth/status", None).await;
    assert_eq!(body["available"], true);
    assert_eq!(body["user"], Value::Null);
    assert_eq!(body["alerts"], json!(["Sign-in process was cancelled. Please try again."]));
    let (_, body) = call(&app, "GET", "/api/session", None).await;
    assert_eq!(body["role"], Value::Null);
}

#[tokio::test]
async fn test_chat_flow() {
    let app = marketer_app();

    let (_, body) = call(&app, "POST", "/api/chat/open", None).await;
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);

    let (status, _) = call(&app, "POST", "/api/chat/messages", Some(json!({ "message": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, "POST", "/api/chat/messages", Some(json!({ "message": "سؤال" }))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let placeholder = body["placeholder_id"].clone();

    let mut snapshot = Value::Null;
    for _ in 0..50 {
        let (_, body) = call(&app, "GET", "/api/chat", None).await;
        if body["is_loading"] == false {
            snapshot = body;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(snapshot["messages"][2]["id"], placeholder);
    assert_eq!(snapshot["messages"][2]["text"], "مرحبا");
    assert_eq!(snapshot["messages"][2]["sender"], "ai");
}

#[tokio::test]
async fn test_chat_unavailable_without_credential() {
    let app = app(app_state(FakeIdentity::default(), &NoCredential));
    let (_, body) = call(&app, "GET", "/api/chat", None).await;
    assert_eq!(body["last_error"], "لا يمكن بدء خدمة الدردشة الآن.");
    let (status, _) = call(&app, "POST", "/api/chat/messages", Some(json!({ "message": "hi" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_hire_request() {
    let app = marketer_app();
    let (status, body) = call(
        &app,
        "POST",
        "/api/hire",
        Some(json!({ "confirmer_id": 2, "message": "حملة ملابس في وهران" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alert"], HIRE_SENT_ALERT);

    let (status, _) = call(&app, "POST", "/api/hire", Some(json!({ "confirmer_id": 7 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_page_is_not_found() {
    let app = marketer_app();
    let (status, _) = call(&app, "GET", "/api/pages/settings", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_pages_served_when_present() {
    let dir = std::env::temp_dir().join(format!("marketers-hub-public-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("login.html"), "<h1>login</h1>").unwrap();

    let state = app_state(FakeIdentity::default(), &ScriptedProvider::default());
    let served = with_static_files(create_router(), &dir).with_state(state.clone());
    let response = served
        .oneshot(Request::builder().uri("/login.html").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let api_only = with_static_files(create_router(), &dir.join("missing")).with_state(state);
    let (status, _) = call(&api_only, "GET", "/login.html", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&api_only, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);

    std::fs::remove_dir_all(&dir).unwrap();
}
