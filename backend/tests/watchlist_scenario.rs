//! End-to-end HTTP scenarios over the in-memory store and real credentials.

use std::sync::Arc;

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, Error as ActixError, test, web};
use chrono::Duration;
use futures::future::join_all;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use watchlist::Trace;
use watchlist::domain::{IdentityResolver, TRACE_ID_HEADER, WatchlistGateway};
use watchlist::inbound::http::health::{HealthState, live, ready};
use watchlist::inbound::http::state::HttpState;
use watchlist::inbound::http::users;
use watchlist::inbound::http::validation::json_config;
use watchlist::outbound::credentials::{PasetoCredentialService, TokenKey};
use watchlist::outbound::persistence::InMemoryUserRepository;

#[fixture]
fn state() -> HttpState {
    let key = TokenKey::generate().expect("random key");
    let credentials = Arc::new(PasetoCredentialService::new(&key, Duration::minutes(30)));
    let gateway = WatchlistGateway::new(
        Arc::new(InMemoryUserRepository::new()),
        Arc::clone(&credentials),
    );
    HttpState::new(Arc::new(gateway), IdentityResolver::new(credentials))
}

async fn app(
    state: HttpState,
) -> impl Service<Request, Response = ServiceResponse, Error = ActixError> {
    let health = web::Data::new(HealthState::new());
    health.mark_ready();
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(health)
            .app_data(json_config())
            .wrap(Trace)
            .service(web::scope("/api/v1").configure(users::configure))
            .service(ready)
            .service(live),
    )
    .await
}

async fn call<S>(app: &S, request: test::TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = ActixError>,
{
    let response = test::call_service(app, request.to_request()).await;
    let status = response.status();
    assert!(
        response.headers().contains_key(TRACE_ID_HEADER),
        "every response carries a trace id"
    );
    let body = test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

fn saved_keys(user: &Value) -> Vec<String> {
    user["savedItems"]
        .as_array()
        .expect("savedItems array")
        .iter()
        .map(|item| item["key"].as_str().expect("key string").to_owned())
        .collect()
}

async fn register<S>(app: &S, username: &str, email: &str, password: &str) -> String
where
    S: Service<Request, Response = ServiceResponse, Error = ActixError>,
{
    let (status, body) = call(
        app,
        test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(json!({"username": username, "email": email, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["token"].as_str().expect("token").to_owned()
}

#[rstest]
#[actix_web::test]
async fn register_login_save_and_remove(state: HttpState) {
    let app = app(state).await;
    register(&app, "alice", "a@x.com", "pw123").await;

    let (status, body) = call(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"email": "a@x.com", "password": "pw123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().expect("token").to_owned();

    let save = |key: Value| {
        test::TestRequest::post()
            .uri("/api/v1/users/me/saved-items")
            .insert_header(bearer(&token))
            .set_json(json!({"key": key, "title": "Heat", "releaseOrAuthorInfo": ["1995"]}))
    };

    let (status, user) = call(&app, save(json!(42))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved_keys(&user), ["42"]);

    let (_, me) = call(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/users/me")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(me["savedCount"], 1);
    assert_eq!(me["savedItems"][0]["title"], "Heat");

    let (status, user) = call(&app, save(json!("42"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved_keys(&user), ["42"]);

    let (status, user) = call(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/users/me/saved-items/42")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["savedCount"], 0);

    let (status, user) = call(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/users/me/saved-items/42")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "removing a missing key is not an error");
    assert_eq!(user["savedCount"], 0);
}

#[rstest]
#[actix_web::test]
async fn registration_token_authenticates_immediately(state: HttpState) {
    let app = app(state).await;
    let token = register(&app, "bob", "Bob@Example.com", "hunter2").await;

    let (status, me) = call(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/users/me")
            .insert_header(bearer(&token)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "bob@example.com");
    assert!(me.get("passwordHash").is_none());
}

#[rstest]
#[actix_web::test]
async fn failed_logins_share_one_response(state: HttpState) {
    let app = app(state).await;
    register(&app, "alice", "a@x.com", "pw123").await;

    let mut bodies = Vec::new();
    for (email, password) in [("a@x.com", "wrong"), ("nobody@x.com", "pw123")] {
        let (status, body) = call(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(json!({"email": email, "password": password})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        bodies.push((body["code"].clone(), body["message"].clone()));
    }

    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[0].1, "invalid credentials");
}

#[rstest]
#[actix_web::test]
async fn duplicate_registration_is_rejected(state: HttpState) {
    let app = app(state).await;
    register(&app, "alice", "a@x.com", "pw123").await;

    let (status, body) = call(
        &app,
        test::TestRequest::post().uri("/api/v1/users").set_json(
            json!({"username": "alice2", "email": "A@X.com", "password": "pw"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "email already registered");
    assert_eq!(body["details"]["field"], "email");
}

#[rstest]
#[case::no_header(None)]
#[case::forged(Some("Bearer v4.local.forged"))]
#[case::wrong_scheme(Some("Token abc"))]
#[actix_web::test]
async fn gated_routes_require_a_valid_token(state: HttpState, #[case] header: Option<&str>) {
    let app = app(state).await;

    let mut request = test::TestRequest::post()
        .uri("/api/v1/users/me/saved-items")
        .set_json(json!({"key": 42}));
    if let Some(value) = header {
        request = request.insert_header(("Authorization", value));
    }
    let (status, body) = call(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "login required");
    assert!(body["traceId"].is_string());
}

#[rstest]
#[case::empty_payload("Bearer v4.local.")]
#[case::truncated_payload("Bearer v4.local.AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA")]
#[case::truncated_with_footer("Bearer v4.local.AAAA.Zm9vdGVy")]
#[actix_web::test]
async fn truncated_tokens_are_treated_as_anonymous(state: HttpState, #[case] header: &str) {
    let app = app(state).await;

    let request = test::TestRequest::get()
        .uri("/api/v1/users/me")
        .insert_header(("Authorization", header));
    let (status, body) = call(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "login required");
}

#[rstest]
#[actix_web::test]
async fn concurrent_saves_of_one_key_yield_one_entry(state: HttpState) {
    let app = app(state).await;
    let token = register(&app, "alice", "a@x.com", "pw123").await;

    let requests = (0..16).map(|n| {
        call(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/users/me/saved-items")
                .insert_header(bearer(&token))
                .set_json(json!({"key": "OL27448W", "title": format!("copy {n}")})),
        )
    });
    for (status, _) in join_all(requests).await {
        assert_eq!(status, StatusCode::OK);
    }

    let (_, me) = call(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/users/me")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(saved_keys(&me), ["OL27448W"]);
}

#[rstest]
#[actix_web::test]
async fn health_probes_respond(state: HttpState) {
    let app = app(state).await;

    let (live_status, _) = call(&app, test::TestRequest::get().uri("/health/live")).await;
    let (ready_status, _) = call(&app, test::TestRequest::get().uri("/health/ready")).await;

    assert_eq!(live_status, StatusCode::OK);
    assert_eq!(ready_status, StatusCode::OK);
}
