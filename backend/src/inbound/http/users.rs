//! Users API handlers.
//!
//! ```text
//! POST   /api/v1/login                        {"email":"a@x.com","password":"pw123"}
//! POST   /api/v1/users                        {"username":"alice","email":"a@x.com","password":"pw123"}
//! GET    /api/v1/users/me
//! POST   /api/v1/users/me/saved-items         {"key":42,"title":"Heat"}
//! DELETE /api/v1/users/me/saved-items/{key}
//! ```
//!
//! Request bodies are decoded into permissive DTOs whose fields are all
//! optional, so a missing field surfaces as a `400 invalid_request` naming
//! the field instead of a generic JSON error.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    ApiResult, AuthPayload, CatalogKey, Error, LoginCredentials, RawCatalogKey, Registration,
    RequestContext, SavedItem, User,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, map_login_validation_error, map_registration_validation_error,
    map_saved_item_validation_error, require,
};

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "alice@example.com")]
    pub email: Option<String>,
    #[schema(example = "pw123")]
    pub password: Option<String>,
}

impl LoginRequest {
    fn into_credentials(self) -> Result<LoginCredentials, Error> {
        let email = require(self.email, FieldName::new("email"))?;
        let password = require(self.password, FieldName::new("password"))?;
        LoginCredentials::try_from_parts(&email, &password).map_err(map_login_validation_error)
    }
}

/// Registration request body for `POST /api/v1/users`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "alice")]
    pub username: Option<String>,
    #[schema(example = "alice@example.com")]
    pub email: Option<String>,
    #[schema(example = "pw123")]
    pub password: Option<String>,
}

impl RegisterRequest {
    fn into_registration(self) -> Result<Registration, Error> {
        let username = require(self.username, FieldName::new("username"))?;
        let email = require(self.email, FieldName::new("email"))?;
        let password = require(self.password, FieldName::new("password"))?;
        Registration::try_from_parts(&username, &email, &password)
            .map_err(map_registration_validation_error)
    }
}

/// Saved-item request body for `POST /api/v1/users/me/saved-items`.
///
/// `key` accepts a JSON integer (movie catalogues) or string (book
/// catalogues).
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveItemRequest {
    #[schema(value_type = Option<String>, example = "42")]
    pub key: Option<RawCatalogKey>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub release_or_author_info: Option<Vec<String>>,
}

impl SaveItemRequest {
    fn into_item(self) -> Result<SavedItem, Error> {
        let raw = require(self.key, FieldName::new("key"))?;
        let key = CatalogKey::try_from(raw).map_err(map_saved_item_validation_error)?;
        let mut builder = SavedItem::builder(key);
        if let Some(title) = self.title {
            builder = builder.title(title);
        }
        if let Some(description) = self.description {
            builder = builder.description(description);
        }
        if let Some(image) = self.image {
            builder = builder.image(image);
        }
        if let Some(info) = self.release_or_author_info {
            builder = builder.release_or_author_info(info);
        }
        Ok(builder.build())
    }
}

/// Authenticate with email and password and receive an identity token.
///
/// Unknown email and wrong password produce the same `401` response.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthPayload),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "User store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AuthPayload>> {
    let credentials = payload.into_inner().into_credentials()?;
    state.watchlist.login(&credentials).await.map(web::Json)
}

/// Create an account and sign the new user in.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthPayload),
        (status = 400, description = "Invalid request or already registered", body = Error),
        (status = 503, description = "User store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = payload.into_inner().into_registration()?;
    let auth = state.watchlist.register(&registration).await?;
    Ok(HttpResponse::Created().json(auth))
}

/// Return the authenticated user and their saved items.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use watchlist::inbound::http::users::current_user;
///
/// let app = App::new().service(current_user);
/// ```
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Authenticated user", body = User),
        (status = 401, description = "Login required", body = Error),
        (status = 503, description = "User store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    ctx: RequestContext,
) -> ApiResult<web::Json<User>> {
    state.watchlist.fetch_self(&ctx).await.map(web::Json)
}

/// Add an item to the authenticated user's saved set.
///
/// Saving a key that is already present leaves the set unchanged.
#[utoipa::path(
    post,
    path = "/api/v1/users/me/saved-items",
    request_body = SaveItemRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 503, description = "User store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "saveItem"
)]
#[post("/users/me/saved-items")]
pub async fn save_item(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    payload: web::Json<SaveItemRequest>,
) -> ApiResult<web::Json<User>> {
    let item = payload.into_inner().into_item()?;
    state.watchlist.save_item(&ctx, item).await.map(web::Json)
}

/// Remove an item from the authenticated user's saved set.
///
/// Removing a key that is not saved is not an error.
#[utoipa::path(
    delete,
    path = "/api/v1/users/me/saved-items/{key}",
    params(("key" = String, Path, description = "Catalogue key of the saved item")),
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid key", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 503, description = "User store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "removeItem"
)]
#[delete("/users/me/saved-items/{key}")]
pub async fn remove_item(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    key: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let key = CatalogKey::new(key.into_inner()).map_err(map_saved_item_validation_error)?;
    state.watchlist.remove_item(&ctx, &key).await.map(web::Json)
}

/// Register every users handler on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(register)
        .service(current_user)
        .service(save_item)
        .service(remove_item);
}
