//! Tests for the watchlist gateway service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{MockCredentialService, MockUserRepository};
use crate::domain::{EmailAddress, ErrorCode, IdentityToken, PasswordHash, Username};
use rstest::{fixture, rstest};

const USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

type Gateway = WatchlistGateway<MockUserRepository, MockCredentialService>;

fn make_service(repo: MockUserRepository, credentials: MockCredentialService) -> Gateway {
    WatchlistGateway::new(Arc::new(repo), Arc::new(credentials))
}

#[fixture]
fn alice() -> User {
    User::new(
        UserId::new(USER_ID).expect("fixture id"),
        Username::new("alice").expect("fixture username"),
        EmailAddress::new("a@x.com").expect("fixture email"),
    )
}

fn record(user: User) -> UserRecord {
    UserRecord {
        user,
        password_hash: PasswordHash::new("stored-hash"),
    }
}

fn heat() -> SavedItem {
    SavedItem::builder(CatalogKey::from_number(42))
        .title("Heat")
        .build()
}

fn signed_in() -> RequestContext {
    RequestContext::authenticated(UserId::new(USER_ID).expect("fixture id"))
}

fn issuing_credentials() -> MockCredentialService {
    let mut credentials = MockCredentialService::new();
    credentials
        .expect_issue_token()
        .returning(|_| Ok(IdentityToken::new("token")));
    credentials
}

#[tokio::test]
async fn anonymous_gated_calls_never_touch_the_repository() {
    // No expectations: any repository call panics.
    let service = make_service(MockUserRepository::new(), MockCredentialService::new());
    let anonymous = RequestContext::anonymous();

    let errors = [
        service.fetch_self(&anonymous).await.expect_err("gated"),
        service.save_item(&anonymous, heat()).await.expect_err("gated"),
        service
            .remove_item(&anonymous, &CatalogKey::from_number(42))
            .await
            .expect_err("gated"),
    ];

    for err in errors {
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), LOGIN_REQUIRED);
    }
}

#[rstest]
#[case::unknown_email(false, DECOY_PASSWORD_HASH)]
#[case::wrong_password(true, "stored-hash")]
#[tokio::test]
async fn failed_logins_are_indistinguishable(
    alice: User,
    #[case] user_exists: bool,
    #[case] checked_hash: &'static str,
) {
    let mut repo = MockUserRepository::new();
    let found = user_exists.then(|| record(alice));
    repo.expect_find_by_email()
        .times(1)
        .return_once(move |_| Ok(found));
    let mut credentials = MockCredentialService::new();
    credentials
        .expect_verify_password()
        .withf(move |plaintext, hash| plaintext == "pw123" && hash.as_ref() == checked_hash)
        .times(1)
        .returning(|_, _| false);
    credentials.expect_issue_token().never();

    let service = make_service(repo, credentials);
    let creds = LoginCredentials::try_from_parts("a@x.com", "pw123").expect("credentials");
    let err = service.login(&creds).await.expect_err("login fails");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), INVALID_CREDENTIALS);
}

#[rstest]
#[tokio::test]
async fn login_issues_token_for_matching_password(alice: User) {
    let mut repo = MockUserRepository::new();
    let found = record(alice.clone());
    repo.expect_find_by_email()
        .withf(|email| email == "a@x.com")
        .times(1)
        .return_once(move |_| Ok(Some(found)));
    let mut credentials = issuing_credentials();
    credentials
        .expect_verify_password()
        .withf(|plaintext, hash| plaintext == "pw123" && hash.as_ref() == "stored-hash")
        .times(1)
        .returning(|_, _| true);

    let service = make_service(repo, credentials);
    let creds = LoginCredentials::try_from_parts("A@X.com", "pw123").expect("credentials");
    let payload = service.login(&creds).await.expect("login succeeds");

    assert_eq!(payload.token.as_ref(), "token");
    assert_eq!(payload.user, alice);
}

#[rstest]
#[tokio::test]
async fn register_rejects_taken_email_before_hashing(alice: User) {
    let mut repo = MockUserRepository::new();
    let existing = record(alice);
    repo.expect_find_by_email()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    repo.expect_create().never();
    let mut credentials = MockCredentialService::new();
    credentials.expect_hash_password().never();

    let service = make_service(repo, credentials);
    let registration =
        Registration::try_from_parts("bob", "a@x.com", "pw").expect("registration");
    let err = service.register(&registration).await.expect_err("duplicate");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "email already registered");
}

#[rstest]
#[tokio::test]
async fn register_rejects_taken_username(alice: User) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(None));
    let existing = record(alice);
    repo.expect_find_by_username()
        .withf(|username| username == "alice")
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    repo.expect_create().never();

    let service = make_service(repo, MockCredentialService::new());
    let registration =
        Registration::try_from_parts("alice", "other@x.com", "pw").expect("registration");
    let err = service.register(&registration).await.expect_err("duplicate");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "username already registered");
}

#[tokio::test]
async fn register_maps_create_time_conflicts_to_validation_errors() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email().return_once(|_| Ok(None));
    repo.expect_find_by_username().return_once(|_| Ok(None));
    repo.expect_create()
        .times(1)
        .return_once(|_| Err(UserPersistenceError::duplicate("email")));
    let mut credentials = MockCredentialService::new();
    credentials
        .expect_hash_password()
        .return_once(|_| Ok(PasswordHash::new("hashed")));
    credentials.expect_issue_token().never();

    let service = make_service(repo, credentials);
    let registration =
        Registration::try_from_parts("alice", "a@x.com", "pw123").expect("registration");
    let err = service.register(&registration).await.expect_err("race");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "email already registered");
}

#[tokio::test]
async fn register_stores_hash_and_signs_in() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email().return_once(|_| Ok(None));
    repo.expect_find_by_username().return_once(|_| Ok(None));
    repo.expect_create()
        .withf(|record| {
            record.password_hash.as_ref() == "hashed"
                && record.user.email().as_ref() == "a@x.com"
                && record.user.saved_count() == 0
        })
        .times(1)
        .return_once(|_| Ok(()));
    let mut credentials = issuing_credentials();
    credentials
        .expect_hash_password()
        .withf(|plaintext| plaintext == "pw123")
        .return_once(|_| Ok(PasswordHash::new("hashed")));

    let service = make_service(repo, credentials);
    let registration =
        Registration::try_from_parts("alice", " A@X.com ", "pw123").expect("registration");
    let payload = service.register(&registration).await.expect("registered");

    assert_eq!(payload.user.username().as_ref(), "alice");
    assert_eq!(payload.token.as_ref(), "token");
}

#[tokio::test]
async fn fetch_self_for_vanished_user_is_unauthorized() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let service = make_service(repo, MockCredentialService::new());
    let err = service.fetch_self(&signed_in()).await.expect_err("gone");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn save_item_delegates_one_atomic_call(alice: User) {
    let mut repo = MockUserRepository::new();
    let mut updated = alice;
    updated.insert_saved_item(heat());
    let expected = updated.clone();
    repo.expect_add_to_saved_set()
        .withf(|user_id, item| user_id.as_ref() == USER_ID && item.key().as_ref() == "42")
        .times(1)
        .return_once(move |_, _| Ok(Some(updated)));
    repo.expect_find_by_id().never();

    let service = make_service(repo, MockCredentialService::new());
    let user = service
        .save_item(&signed_in(), heat())
        .await
        .expect("saved");

    assert_eq!(user, expected);
}

#[rstest]
#[case::connection(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case::query(UserPersistenceError::query("boom"), ErrorCode::InternalError)]
#[tokio::test]
async fn remove_item_maps_storage_failures(
    #[case] failure: UserPersistenceError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_remove_from_saved_set()
        .times(1)
        .return_once(move |_, _| Err(failure));

    let service = make_service(repo, MockCredentialService::new());
    let err = service
        .remove_item(&signed_in(), &CatalogKey::from_number(42))
        .await
        .expect_err("storage failure");

    assert_eq!(err.code(), expected);
}
