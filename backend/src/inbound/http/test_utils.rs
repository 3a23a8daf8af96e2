//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::domain::ports::{MockCredentialService, MockWatchlistService};
use crate::domain::{IdentityResolver, UserId};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::json_config;

/// Token accepted by [`stub_identity`].
pub const TEST_TOKEN: &str = "test-token";
/// User id that [`TEST_TOKEN`] resolves to.
pub const TEST_USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

/// Identity resolver that accepts only [`TEST_TOKEN`].
pub fn stub_identity() -> IdentityResolver {
    let mut credentials = MockCredentialService::new();
    credentials.expect_verify_token().returning(|token| {
        (token == TEST_TOKEN).then(|| UserId::new(TEST_USER_ID).expect("fixture id"))
    });
    IdentityResolver::new(Arc::new(credentials))
}

/// `Authorization` header value carrying [`TEST_TOKEN`].
pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {TEST_TOKEN}"))
}

/// Build an app mounting `configure` under `/api/v1` over `watchlist`.
pub fn api_app<F>(
    watchlist: MockWatchlistService,
    configure: F,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    F: FnOnce(&mut web::ServiceConfig) + 'static,
{
    let state = HttpState::new(Arc::new(watchlist), stub_identity());
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .service(web::scope("/api/v1").configure(configure))
}
