//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects the users and health endpoints plus the domain schemas
//! they reference, and registers the bearer token security scheme. Swagger UI
//! serves it at `/docs` in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{AuthPayload, Error, ErrorCode, SavedItem, User};
use crate::inbound::http::users::{LoginRequest, RegisterRequest, SaveItemRequest};

/// Name of the bearer token security scheme.
pub const BEARER_SCHEME: &str = "BearerToken";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let scheme = HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .bearer_format("PASETO")
            .description(Some(
                "Identity token issued by POST /api/v1/login or POST /api/v1/users.",
            ))
            .build();
        components.add_security_scheme(BEARER_SCHEME, SecurityScheme::Http(scheme));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Watchlist API",
        description = "Accounts and saved catalogue items for a movie and book watchlist."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::register,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::save_item,
        crate::inbound::http::users::remove_item,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        User,
        SavedItem,
        AuthPayload,
        Error,
        ErrorCode,
        LoginRequest,
        RegisterRequest,
        SaveItemRequest
    )),
    tags(
        (name = "users", description = "Accounts and saved items"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
