mod common;

use artefolio_session::client::{ApiError, Conflict};
use artefolio_session::models::{GoogleSignUpCompleteData, SignInData, SignUpData};
use artefolio_session::session::{guard, RouteAccess, RouteDecision};
use common::{error_json, mock_me, mock_refresh_rejected, user_json, Harness, FRESH, STALE};
use mockito::{Matcher, Server, ServerGuard};

async fn mock_sign_in_ok(server: &mut ServerGuard) {
    server
        .mock("POST", "/auth/sign-in")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("set-cookie", &format!("{}; Path=/; HttpOnly", FRESH))
        .with_body(user_json("painter", true))
        .create_async()
        .await;
}

fn credentials() -> SignInData {
    SignInData {
        email: "painter@example.com".to_string(),
        password: "hunter22".to_string(),
    }
}

#[tokio::test]
async fn integration_startup_with_existing_session_is_authenticated() {
    let mut server = Server::new_async().await;
    let me = mock_me(&mut server, Matcher::Exact(FRESH.into()), 200, &user_json("painter", true)).await;

    let harness = Harness::new(&server, Some(FRESH));
    let store = harness.store();
    assert_eq!(guard(&store.session(), RouteAccess::Protected), RouteDecision::Wait);

    let session = store.initialize().await;

    assert!(!session.loading);
    assert_eq!(session.user.map(|u| u.username), Some("painter".to_string()));
    assert_eq!(guard(&store.session(), RouteAccess::Protected), RouteDecision::Render);
    assert_eq!(guard(&store.session(), RouteAccess::PublicOnly), RouteDecision::RedirectToHome);
    me.assert_async().await;
}

#[tokio::test]
async fn integration_startup_without_session_resolves_anonymous_once() {
    let mut server = Server::new_async().await;
    let me = server
        .mock("GET", "/auth/me")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(error_json("Not authenticated"))
        .expect(1)
        .create_async()
        .await;
    let refresh = mock_refresh_rejected(&mut server).await;

    let harness = Harness::new(&server, None);
    let store = harness.store();
    let mut rx = store.subscribe();
    assert!(rx.borrow_and_update().loading);

    let session = store.initialize().await;
    assert!(!session.loading);
    assert!(session.user.is_none());
    assert!(rx.has_changed().unwrap());
    assert!(!rx.borrow_and_update().loading);

    let again = store.initialize().await;
    assert_eq!(again, session);
    assert!(!rx.has_changed().unwrap());
    me.assert_async().await;

    assert_eq!(
        guard(&store.session(), RouteAccess::Protected),
        RouteDecision::RedirectToSignIn
    );
    assert_eq!(harness.navigator.visited(), vec!["/sign-in".to_string()]);
    refresh.assert_async().await;
}

#[tokio::test]
async fn integration_startup_and_other_calls_share_one_failed_refresh() {
    let mut server = Server::new_async().await;
    let me = server
        .mock("GET", "/auth/me")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(error_json("Access token expired"))
        .expect(2)
        .create_async()
        .await;
    let refresh = mock_refresh_rejected(&mut server).await;

    let harness = Harness::new(&server, Some(STALE));
    let store = harness.store();
    let (session, direct) = futures::join!(store.initialize(), harness.client.me());

    assert!(!session.loading);
    assert!(session.user.is_none());
    assert!(matches!(direct, Err(ApiError::SessionExpired(_))));
    me.assert_async().await;
    refresh.assert_async().await;
    assert_eq!(harness.navigator.visited(), vec!["/sign-in".to_string()]);
    assert!(harness.cookie_header().is_none());
}

#[tokio::test]
async fn integration_concurrent_initialize_calls_share_one_lookup() {
    let mut server = Server::new_async().await;
    let me = server
        .mock("GET", "/auth/me")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(user_json("painter", true))
        .expect(1)
        .create_async()
        .await;

    let harness = Harness::new(&server, Some(FRESH));
    let store = harness.store();
    let (a, b) = futures::join!(store.initialize(), store.initialize());

    assert_eq!(a, b);
    assert!(a.is_authenticated());
    me.assert_async().await;
}

#[tokio::test]
async fn integration_sign_in_then_sign_out() {
    let mut server = Server::new_async().await;
    mock_sign_in_ok(&mut server).await;
    let sign_out = server
        .mock("POST", "/auth/sign-out")
        .match_header("cookie", FRESH)
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let harness = Harness::new(&server, None);
    let store = harness.store();

    let user = store.sign_in(&credentials()).await.expect("sign-in should succeed");
    assert_eq!(store.user(), Some(user));

    store.sign_out().await;
    assert!(store.user().is_none());
    sign_out.assert_async().await;
}

#[tokio::test]
async fn integration_sign_out_clears_user_even_when_backend_fails() {
    let mut server = Server::new_async().await;
    mock_sign_in_ok(&mut server).await;
    server
        .mock("POST", "/auth/sign-out")
        .with_status(500)
        .with_body(error_json("boom"))
        .create_async()
        .await;

    let harness = Harness::new(&server, None);
    let store = harness.store();
    store.sign_in(&credentials()).await.expect("sign-in should succeed");

    store.sign_out().await;
    assert!(store.user().is_none());
    assert!(harness.navigator.visited().is_empty());
}

#[tokio::test]
async fn integration_failed_sign_in_leaves_session_unchanged() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/sign-in")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(error_json("Invalid email or password"))
        .create_async()
        .await;

    let harness = Harness::new(&server, None);
    let store = harness.store();
    let before = store.session();

    let err = store.sign_in(&credentials()).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(store.session(), before);
}

#[tokio::test]
async fn integration_sign_up_conflict_is_classified_and_keeps_current_user() {
    let mut server = Server::new_async().await;
    mock_sign_in_ok(&mut server).await;
    server
        .mock("POST", "/auth/sign-up")
        .with_status(409)
        .with_header("content-type", "application/json")
        .with_body(error_json("Username already taken"))
        .create_async()
        .await;

    let harness = Harness::new(&server, None);
    let store = harness.store();
    let signed_in = store.sign_in(&credentials()).await.expect("sign-in should succeed");

    let err = store
        .sign_up(&SignUpData {
            name: "Other Artist".to_string(),
            username: "painter".to_string(),
            email: "other@example.com".to_string(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.conflict(), Some(Conflict::Username));
    assert_eq!(store.user(), Some(signed_in));
}

#[tokio::test]
async fn integration_expired_google_sign_up_is_recognised() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/google/sign-up/complete")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(error_json("Invalid or expired pending signup"))
        .create_async()
        .await;

    let harness = Harness::new(&server, None);
    let store = harness.store();
    let err = store
        .google_sign_up_complete(&GoogleSignUpCompleteData {
            name: "Test Artist".to_string(),
            username: "painter".to_string(),
        })
        .await
        .unwrap_err();

    assert!(err.is_pending_sign_up_gone());
    assert!(store.user().is_none());
}

#[tokio::test]
async fn integration_google_link_adopts_the_linked_user() {
    let mut server = Server::new_async().await;
    let linked = serde_json::json!({
        "user": {
            "id": 42,
            "name": "Test Artist",
            "username": "painter",
            "email": "painter@example.com",
            "emailVerified": true,
            "googleId": "google-123",
            "createdAt": "2025-01-02T03:04:05Z",
            "updatedAt": "2025-01-02T03:04:05Z"
        }
    });
    server
        .mock("POST", "/auth/google/link-account")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(linked.to_string())
        .create_async()
        .await;

    let harness = Harness::new(&server, Some(FRESH));
    let store = harness.store();
    let user = store.google_link_account().await.expect("link should succeed");

    assert!(user.is_google_linked());
    assert_eq!(store.user(), Some(user));
}

#[tokio::test]
async fn integration_refresh_user_picks_up_email_verification() {
    let mut server = Server::new_async().await;
    mock_me(&mut server, Matcher::Exact(STALE.into()), 200, &user_json("painter", false)).await;
    let verify = server
        .mock("POST", "/auth/email/verify-verification-code")
        .match_body(Matcher::Json(serde_json::json!({ "code": "123456" })))
        .with_status(200)
        .with_header("set-cookie", &format!("{}; Path=/; HttpOnly", FRESH))
        .expect(1)
        .create_async()
        .await;
    mock_me(&mut server, Matcher::Exact(FRESH.into()), 200, &user_json("painter", true)).await;

    let harness = Harness::new(&server, Some(STALE));
    let store = harness.store();
    let session = store.initialize().await;
    assert_eq!(guard(&session, RouteAccess::EmailVerification), RouteDecision::Render);

    harness.client.verify_email_code("123456").await.expect("code should verify");
    let user = store.refresh_user().await.expect("user should reload");

    assert!(user.email_verified);
    assert_eq!(
        guard(&store.session(), RouteAccess::EmailVerification),
        RouteDecision::RedirectToHome
    );
    verify.assert_async().await;
}

#[tokio::test]
async fn integration_refresh_user_failure_signs_out() {
    let mut server = Server::new_async().await;
    mock_sign_in_ok(&mut server).await;
    mock_me(&mut server, Matcher::Any, 500, &error_json("boom")).await;

    let harness = Harness::new(&server, None);
    let store = harness.store();
    store.sign_in(&credentials()).await.expect("sign-in should succeed");

    assert!(store.refresh_user().await.is_none());
    assert!(store.user().is_none());
}

#[tokio::test]
async fn integration_lost_session_clears_the_store() {
    let mut server = Server::new_async().await;
    mock_me(&mut server, Matcher::Exact(STALE.into()), 200, &user_json("painter", true)).await;
    server
        .mock("POST", "/auth/email/resend-verification-email")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(error_json("Access token expired"))
        .create_async()
        .await;
    let _refresh = mock_refresh_rejected(&mut server).await;

    let harness = Harness::new(&server, Some(STALE));
    let store = harness.store();
    assert!(store.initialize().await.is_authenticated());

    let err = harness
        .client
        .resend_verification_email("painter@example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::SessionExpired(_)));
    assert!(store.user().is_none());
    assert!(!store.is_loading());
    assert_eq!(harness.navigator.visited(), vec!["/sign-in".to_string()]);
    assert!(harness.cookie_header().is_none());
}
