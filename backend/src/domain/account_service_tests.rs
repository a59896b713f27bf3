//! Tests for the account service.

use std::sync::Arc;

use chrono::Utc;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockPasswordHasher, MockTokenIssuer, MockUserRepository};
use crate::domain::{
    EmailAddress, ErrorCode, IssuedToken, Password, PasswordHash, UserName,
};

type TestService = AccountService<MockUserRepository, MockPasswordHasher, MockTokenIssuer>;

fn make_service(
    users: MockUserRepository,
    hasher: MockPasswordHasher,
    tokens: MockTokenIssuer,
) -> TestService {
    AccountService::new(Arc::new(users), Arc::new(hasher), Arc::new(tokens))
}

#[fixture]
fn registration() -> Registration {
    Registration::new(
        UserName::new("alice123").expect("name"),
        EmailAddress::new("a@x.com").expect("email"),
        Password::new("secret1").expect("password"),
    )
}

#[fixture]
fn credentials() -> LoginCredentials {
    LoginCredentials::new(
        UserName::new("alice123").expect("name"),
        Password::new("secret1").expect("password"),
    )
}

fn stored_account() -> UserAccount {
    UserAccount {
        user: User::new(
            UserId::random(),
            UserName::new("alice123").expect("name"),
            EmailAddress::new("a@x.com").expect("email"),
        ),
        password_hash: PasswordHash::new("$2b$11$stored"),
    }
}

#[rstest]
#[tokio::test]
async fn register_rejects_taken_name_or_email_before_hashing(registration: Registration) {
    let mut users = MockUserRepository::new();
    users
        .expect_name_or_email_taken()
        .times(1)
        .return_once(|_, _| Ok(true));
    users.expect_create().never();

    let service = make_service(users, MockPasswordHasher::new(), MockTokenIssuer::new());
    let error = service
        .register(&registration)
        .await
        .expect_err("duplicate must fail");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), "User already exists");
}

#[rstest]
#[tokio::test]
async fn register_hashes_password_and_stores_account(registration: Registration) {
    let mut users = MockUserRepository::new();
    users
        .expect_name_or_email_taken()
        .times(1)
        .return_once(|_, _| Ok(false));
    users
        .expect_create()
        .withf(|account| {
            account.password_hash.as_str() == "$2b$11$hashed"
                && account.user.name().as_ref() == "alice123"
        })
        .times(1)
        .return_once(|_| Ok(()));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .withf(|password| password.expose() == "secret1")
        .times(1)
        .return_once(|_| Ok(PasswordHash::new("$2b$11$hashed")));

    let service = make_service(users, hasher, MockTokenIssuer::new());
    let user = service.register(&registration).await.expect("registered");

    assert_eq!(user.name().as_ref(), "alice123");
    assert_eq!(user.email().as_ref(), "a@x.com");
}

#[rstest]
#[tokio::test]
async fn register_maps_unique_violation_race_to_conflict(registration: Registration) {
    let mut users = MockUserRepository::new();
    users
        .expect_name_or_email_taken()
        .return_once(|_, _| Ok(false));
    users
        .expect_create()
        .return_once(|_| Err(UserPersistenceError::duplicate("users_name_key")));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .return_once(|_| Ok(PasswordHash::new("$2b$11$hashed")));

    let service = make_service(users, hasher, MockTokenIssuer::new());
    let error = service.register(&registration).await.expect_err("conflict");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn register_surfaces_store_failures(registration: Registration) {
    let mut users = MockUserRepository::new();
    users
        .expect_name_or_email_taken()
        .return_once(|_, _| Err(UserPersistenceError::connection("pool timed out")));

    let service = make_service(users, MockPasswordHasher::new(), MockTokenIssuer::new());
    let error = service.register(&registration).await.expect_err("store down");

    assert_eq!(error.code(), ErrorCode::StoreFailure);
    assert!(error.message().contains("pool timed out"));
}

#[rstest]
#[tokio::test]
async fn authenticate_unknown_name_is_not_found(credentials: LoginCredentials) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_name()
        .times(1)
        .return_once(|_| Ok(None));

    let service = make_service(users, MockPasswordHasher::new(), MockTokenIssuer::new());
    let error = service
        .authenticate(&credentials)
        .await
        .expect_err("unknown user");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "User not found");
}

#[rstest]
#[tokio::test]
async fn authenticate_wrong_password_issues_no_token(credentials: LoginCredentials) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_name()
        .return_once(|_| Ok(Some(stored_account())));
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().times(1).return_once(|_, _| Ok(false));
    let mut tokens = MockTokenIssuer::new();
    tokens.expect_issue().never();

    let service = make_service(users, hasher, tokens);
    let error = service
        .authenticate(&credentials)
        .await
        .expect_err("bad password");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), "Invalid password");
}

#[rstest]
#[tokio::test]
async fn authenticate_success_returns_token_and_user(credentials: LoginCredentials) {
    let account = stored_account();
    let expected_user = account.user.clone();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_name()
        .return_once(move |_| Ok(Some(account)));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_verify()
        .withf(|password, hash| {
            password.expose() == "secret1" && hash.as_str() == "$2b$11$stored"
        })
        .return_once(|_, _| Ok(true));
    let mut tokens = MockTokenIssuer::new();
    tokens
        .expect_issue()
        .times(1)
        .return_once(|_| Ok(IssuedToken::new("signed.jwt.value", Utc::now())));

    let service = make_service(users, hasher, tokens);
    let outcome = service.authenticate(&credentials).await.expect("login");

    assert_eq!(outcome.token.as_str(), "signed.jwt.value");
    assert_eq!(outcome.user, expected_user);
}

#[rstest]
#[tokio::test]
async fn authenticate_maps_signing_failure_to_internal(credentials: LoginCredentials) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_name()
        .return_once(|_| Ok(Some(stored_account())));
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().return_once(|_, _| Ok(true));
    let mut tokens = MockTokenIssuer::new();
    tokens
        .expect_issue()
        .return_once(|_| Err(TokenError::signing("bad key")));

    let service = make_service(users, hasher, tokens);
    let error = service.authenticate(&credentials).await.expect_err("signing");

    assert_eq!(error.code(), ErrorCode::InternalError);
}
