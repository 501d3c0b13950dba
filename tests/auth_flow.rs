use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    http::{Request, StatusCode, header},
    routing::post,
};
use serde::Deserialize;
use sonic_rs::JsonValueTrait;
use tower::ServiceExt;
use tower_cookies::{CookieManagerLayer, Cookies};

use dashboard_auth::models::profile::ProfileType;
use dashboard_auth::models::response::{AuthActionResponse, AuthFailure};
use dashboard_auth::models::session::SessionToken;
use dashboard_auth::store::cookie::{AUTH_COOKIE, CookieBackend, FileCookies, MemoryCookies};
use dashboard_auth::store::local::{FileStorage, LocalStorage, MemoryStorage};
use dashboard_auth::store::session::PROFILE_KEY;
use dashboard_auth::{AccessControl, AuthProvider, DeviceSessionStore, RestDataProvider, SessionStore};

const SECRET: &[u8] = b"integration-secret";

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

/// Stand-in for the school backend's login endpoint.
async fn backend_login(Json(body): Json<LoginBody>) -> (StatusCode, String) {
    if body.password != "secret" {
        return (StatusCode::UNAUTHORIZED, r#"{"message":"Unauthorized"}"#.to_string());
    }

    let payload = match body.username.as_str() {
        "bob" => r#"{"token":{"token":"abc"},"id":1,"username":"bob","profileType":"Guru"}"#,
        "root" => {
            r#"{"token":{"token":"root-credential"},"id":2,"username":"root","profileType":"SuperAdmin","createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-06-01T00:00:00Z"}"#
        }
        "siti" => {
            r#"{"token":{"token":"xyz"},"id":3,"username":"siti","profileType":"Siswa","student":{"id":30,"name":"Siti","nis":"2024001"}}"#
        }
        "legacy" => {
            r#"{"token":{"token":"legacy-credential"},"id":6,"username":"legacy","profileType":"Umum","createdAt":"2024-01-01 08:00:00"}"#
        }
        "mismatch" => {
            r#"{"token":{"token":"xyz"},"id":4,"username":"mismatch","profileType":"Guru","student":{"id":31}}"#
        }
        "notoken" => r#"{"id":5,"username":"notoken","profileType":"Umum"}"#,
        "garbage" => "<html>oops</html>",
        _ => return (StatusCode::UNAUTHORIZED, String::new()),
    };

    (StatusCode::OK, payload.to_string())
}

async fn spawn_backend() -> String {
    let app = Router::new().route("/login", post(backend_login));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

type MemoryStore = DeviceSessionStore<MemoryCookies, MemoryStorage>;

async fn provider() -> Arc<AuthProvider<MemoryStore>> {
    let api_url = spawn_backend().await;
    let store = DeviceSessionStore::new(MemoryCookies::new(), MemoryStorage::new(), false);
    Arc::new(AuthProvider::new(store, RestDataProvider::new(api_url), SECRET))
}

fn stored_profile(auth: &AuthProvider<MemoryStore>) -> Option<sonic_rs::Value> {
    auth.store()
        .storage()
        .get_item(PROFILE_KEY)
        .unwrap()
        .map(|raw| sonic_rs::from_str(&raw).unwrap())
}

#[tokio::test]
async fn successful_login_stores_cookie_and_credential_free_profile() {
    let auth = provider().await;

    let response = auth.login("bob", "secret").await;
    assert_eq!(response, AuthActionResponse::success("/dashboard"));
    assert_eq!(
        sonic_rs::to_string(&response).unwrap(),
        r#"{"success":true,"redirectTo":"/dashboard"}"#
    );

    let cookie = auth.store().cookies().get(AUTH_COOKIE).unwrap().unwrap();
    assert!(!cookie.value().is_empty());
    assert_eq!(cookie.path(), Some("/"));

    let profile = stored_profile(&auth).unwrap();
    assert_eq!(
        profile,
        sonic_rs::json!({"id": 1, "username": "bob", "profileType": "Guru"})
    );
    assert!(profile.get("token").is_none());

    let raw = auth.store().storage().get_item(PROFILE_KEY).unwrap().unwrap();
    assert!(!raw.contains("abc"));
}

#[tokio::test]
async fn rejected_login_writes_nothing() {
    let auth = provider().await;

    let response = auth.login("bob", "wrong").await;
    assert_eq!(response, AuthActionResponse::failure(AuthFailure::login_error()));
    assert_eq!(
        sonic_rs::to_string(&response).unwrap(),
        r#"{"success":false,"error":{"name":"LoginError","message":"Invalid username or password"}}"#
    );

    assert!(auth.store().cookies().get(AUTH_COOKIE).unwrap().is_none());
    assert!(stored_profile(&auth).is_none());
}

#[tokio::test]
async fn malformed_login_responses_fail_uniformly() {
    let auth = provider().await;

    for username in ["garbage", "mismatch", "notoken"] {
        let response = auth.login(username, "secret").await;
        assert_eq!(
            response,
            AuthActionResponse::failure(AuthFailure::login_error()),
            "{username}"
        );
        assert!(auth.store().read_token().is_none(), "{username}");
        assert!(stored_profile(&auth).is_none(), "{username}");
    }
}

#[tokio::test]
async fn session_lifecycle() {
    let auth = provider().await;

    assert!(auth.check().await.logout);

    auth.login("siti", "secret").await;
    assert!(auth.check().await.authenticated);
    assert_eq!(auth.get_permissions().await, Some(ProfileType::Student));

    let identity = auth.get_identity().await.unwrap();
    assert_eq!(identity.username, "siti");
    assert_eq!(identity.student.and_then(|s| s.nis).as_deref(), Some("2024001"));

    auth.store().clear_token().unwrap();
    let check = auth.check().await;
    assert!(!check.authenticated);
    assert!(check.logout);

    let logout = auth.logout().await;
    assert_eq!(logout, AuthActionResponse::success("/login"));
    assert_eq!(auth.get_permissions().await, None);
    assert_eq!(auth.logout().await, AuthActionResponse::success("/login"));
}

#[tokio::test]
async fn access_control_follows_logged_in_profile() {
    let auth = provider().await;
    let access = AccessControl::new(auth.clone());

    auth.login("bob", "secret").await;
    assert!(!access.can("users", "delete").await.can);
    assert!(access.can("students", "delete").await.can);

    auth.logout().await;
    auth.login("root", "secret").await;
    assert!(access.can("users", "delete").await.can);
    assert_eq!(auth.get_permissions().await, Some(ProfileType::SuperAdmin));

    let identity = auth.get_identity().await.unwrap();
    assert!(identity.created_at.is_some());
    assert!(identity.updated_at.is_some());
}

#[tokio::test]
async fn file_backed_session_survives_a_restart() {
    let api_url = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let cookies_path = dir.path().join("cookies.txt");
    let storage_path = dir.path().join("local_storage.json");

    let open = || {
        AuthProvider::new(
            DeviceSessionStore::new(
                FileCookies::new(&cookies_path),
                FileStorage::new(&storage_path),
                true,
            ),
            RestDataProvider::new(api_url.clone()),
            SECRET,
        )
    };

    let first = open();
    assert!(first.login("bob", "secret").await.success);

    let second = open();
    assert!(second.check().await.authenticated);
    assert_eq!(second.get_permissions().await, Some(ProfileType::Teacher));

    let jar = std::fs::read_to_string(&cookies_path).unwrap();
    assert!(jar.contains("SameSite=Strict"));
    assert!(jar.contains("Secure"));

    second.logout().await;
    assert!(open().check().await.logout);
}

#[tokio::test]
async fn backend_timestamps_are_stored_verbatim() {
    let auth = provider().await;

    assert!(auth.login("legacy", "secret").await.success);
    assert_eq!(auth.get_permissions().await, Some(ProfileType::General));

    let identity = auth.get_identity().await.unwrap();
    assert_eq!(identity.created_at.as_deref(), Some("2024-01-01 08:00:00"));
    assert_eq!(
        stored_profile(&auth).unwrap().get("createdAt").as_str(),
        Some("2024-01-01 08:00:00")
    );
}

#[tokio::test]
async fn unreadable_cookie_jar_does_not_block_the_session() {
    let api_url = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let cookies_path = dir.path().join("cookies.txt");
    std::fs::write(&cookies_path, "garbage\n").unwrap();

    let auth = AuthProvider::new(
        DeviceSessionStore::new(
            FileCookies::new(&cookies_path),
            MemoryStorage::new(),
            false,
        ),
        RestDataProvider::new(api_url),
        SECRET,
    );

    assert!(auth.check().await.logout);
    assert_eq!(auth.logout().await, AuthActionResponse::success("/login"));
    auth.store().clear_token().unwrap();

    assert!(auth.login("bob", "secret").await.success);
    assert!(auth.check().await.authenticated);
    assert!(!std::fs::read_to_string(&cookies_path).unwrap().contains("garbage"));
}

async fn issue_cookie(cookies: Cookies) -> StatusCode {
    let store = DeviceSessionStore::new(cookies, MemoryStorage::new(), true);
    match store.write_token(&SessionToken::new("signed-token".to_string())) {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn echo_cookie(cookies: Cookies) -> String {
    let store = DeviceSessionStore::new(cookies, MemoryStorage::new(), true);
    store
        .read_token()
        .map(|token| token.as_str().to_string())
        .unwrap_or_default()
}

#[tokio::test]
async fn request_cookies_back_the_session_store() {
    let app = Router::new()
        .route("/session", post(issue_cookie).get(echo_cookie))
        .layer(CookieManagerLayer::new());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("auth=signed-token"));
    assert!(set_cookie.contains("SameSite=Strict"));
    assert!(set_cookie.contains("Secure"));
    assert!(set_cookie.contains("Path=/"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/session")
                .header(header::COOKIE, "auth=from-browser")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"from-browser");
}
