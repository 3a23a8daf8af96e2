//! Request extractor that resolves the caller's identity.
//!
//! Handlers take a [`RequestContext`] argument instead of reading headers
//! themselves. The `Authorization` header is resolved once per request via the
//! [`IdentityResolver`] held in [`HttpState`]; a missing, malformed or
//! expired credential produces an anonymous context rather than an error.

use std::future::{Ready, ready};

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use tracing::{error, warn};

use crate::domain::{Error, RequestContext};
use crate::inbound::http::state::HttpState;

fn resolve(req: &HttpRequest) -> Result<RequestContext, Error> {
    let Some(state) = req.app_data::<web::Data<HttpState>>() else {
        error!("HTTP state missing from application data");
        return Err(Error::internal("HTTP state is not configured"));
    };
    let header = match req.headers().get(AUTHORIZATION).map(|value| value.to_str()) {
        None => None,
        Some(Ok(value)) => Some(value),
        Some(Err(_)) => {
            warn!("authorization header is not valid ASCII");
            None
        }
    };
    Ok(state.identity.resolve(header))
}

impl FromRequest for RequestContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req).map_err(actix_web::Error::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::domain::ports::{MockCredentialService, MockWatchlistService};
    use actix_web::{App, HttpResponse, get, test};
    use rstest::rstest;
    use std::sync::Arc;

    const USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    #[get("/whoami")]
    async fn whoami(ctx: RequestContext) -> HttpResponse {
        HttpResponse::Ok().body(ctx.user_id().map(ToString::to_string).unwrap_or_default())
    }

    fn state() -> HttpState {
        let mut credentials = MockCredentialService::new();
        credentials.expect_verify_token().returning(|token| {
            (token == "good").then(|| UserId::new(USER_ID).expect("fixture id"))
        });
        HttpState::new(
            Arc::new(MockWatchlistService::new()),
            crate::domain::IdentityResolver::new(Arc::new(credentials)),
        )
    }

    #[rstest]
    #[case::valid(Some("Bearer good"), USER_ID)]
    #[case::invalid(Some("Bearer forged"), "")]
    #[case::wrong_scheme(Some("Basic good"), "")]
    #[case::absent(None, "")]
    #[actix_web::test]
    async fn resolves_identity_from_authorization(
        #[case] header: Option<&str>,
        #[case] expected: &str,
    ) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .service(whoami),
        )
        .await;
        let mut req = test::TestRequest::get().uri("/whoami");
        if let Some(value) = header {
            req = req.insert_header((AUTHORIZATION, value));
        }

        let body = test::call_and_read_body(&app, req.to_request()).await;
        assert_eq!(body, expected.as_bytes());
    }

    #[actix_web::test]
    async fn missing_state_is_an_internal_error() {
        let app = test::init_service(App::new().service(whoami)).await;
        let req = test::TestRequest::get().uri("/whoami").to_request();

        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
