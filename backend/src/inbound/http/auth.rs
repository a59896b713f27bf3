//! Bearer-token extraction and ownership checks for preference routes.
//!
//! A presented `Authorization: Bearer` token is always verified, and its
//! subject must match the user a route addresses. Whether a missing token is
//! acceptable depends on the configured [`BearerPolicy`].

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::ports::TokenError;
use crate::domain::{Error, TokenClaims, UserId};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Whether preference routes demand a bearer token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BearerPolicy {
    /// Requests without a token pass; presented tokens are still checked.
    #[default]
    Optional,
    /// Every request must carry a valid token.
    Required,
}

impl BearerPolicy {
    /// Policy for the `require_bearer_token` setting.
    #[must_use]
    pub const fn from_required(required: bool) -> Self {
        if required { Self::Required } else { Self::Optional }
    }
}

/// Identity proven by the request's bearer token, if it carried one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerIdentity(Option<TokenClaims>);

impl BearerIdentity {
    /// Verified claims, when a token was presented.
    #[must_use]
    pub const fn claims(&self) -> Option<&TokenClaims> {
        self.0.as_ref()
    }

    /// Reject the request when a token names a different user than the one
    /// being addressed.
    pub fn authorize_user(&self, user_id: &UserId) -> Result<(), Error> {
        match &self.0 {
            Some(claims) if claims.user_id() != user_id => {
                debug!(subject = %claims.user_id(), addressed = %user_id, "token subject mismatch");
                Err(Error::forbidden("Token does not grant access to this user"))
            }
            _ => Ok(()),
        }
    }
}

fn map_token_error(error: TokenError) -> Error {
    match error {
        TokenError::Expired => Error::unauthorized("Token has expired"),
        TokenError::Invalid { .. } => Error::unauthorized("Invalid token"),
        TokenError::Signing { message } => Error::internal(message),
    }
}

fn extract(req: &HttpRequest) -> Result<BearerIdentity, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))?;

    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return match state.bearer_policy {
            BearerPolicy::Optional => Ok(BearerIdentity(None)),
            BearerPolicy::Required => Err(Error::unauthorized("Authentication required")),
        };
    };
    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("Authorization header must use the Bearer scheme"))?;

    let claims = state.tokens.verify(token).map_err(map_token_error)?;
    Ok(BearerIdentity(Some(claims)))
}

impl FromRequest for BearerIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req).map_err(actix_web::Error::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockTokenIssuer;
    use crate::domain::{EmailAddress, ErrorCode, UserName};
    use crate::inbound::http::test_utils::{state_with_tokens, token_claims};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test};
    use rstest::rstest;

    async fn whoami(identity: BearerIdentity) -> HttpResponse {
        let subject = identity
            .claims()
            .map(|claims| claims.user_id().to_string())
            .unwrap_or_else(|| "anonymous".to_owned());
        HttpResponse::Ok().body(subject)
    }

    async fn call(
        tokens: MockTokenIssuer,
        policy: BearerPolicy,
        header: Option<&str>,
    ) -> actix_web::dev::ServiceResponse {
        let state = state_with_tokens(tokens, policy);
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/", web::get().to(whoami)),
        )
        .await;
        let mut req = actix_test::TestRequest::get().uri("/");
        if let Some(value) = header {
            req = req.insert_header((AUTHORIZATION, value));
        }
        actix_test::call_service(&app, req.to_request()).await
    }

    #[rstest]
    #[case(BearerPolicy::Optional, StatusCode::OK)]
    #[case(BearerPolicy::Required, StatusCode::UNAUTHORIZED)]
    #[actix_web::test]
    async fn missing_token_follows_policy(
        #[case] policy: BearerPolicy,
        #[case] expected: StatusCode,
    ) {
        let mut tokens = MockTokenIssuer::new();
        tokens.expect_verify().times(0);
        let res = call(tokens, policy, None).await;
        assert_eq!(res.status(), expected);
    }

    #[rstest]
    #[case("Basic abc")]
    #[case("Bearer ")]
    #[actix_web::test]
    async fn non_bearer_headers_are_rejected(#[case] header: &str) {
        let mut tokens = MockTokenIssuer::new();
        tokens.expect_verify().times(0);
        let res = call(tokens, BearerPolicy::Optional, Some(header)).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case(TokenError::Expired)]
    #[case(TokenError::invalid("bad signature"))]
    #[actix_web::test]
    async fn rejected_tokens_are_unauthorized_even_when_optional(#[case] failure: TokenError) {
        let mut tokens = MockTokenIssuer::new();
        tokens
            .expect_verify()
            .withf(|token| token == "abc.def.ghi")
            .times(1)
            .return_once(move |_| Err(failure));
        let res = call(tokens, BearerPolicy::Optional, Some("Bearer abc.def.ghi")).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn valid_tokens_yield_claims() {
        let claims = token_claims(UserId::random());
        let expected = claims.user_id().to_string();
        let mut tokens = MockTokenIssuer::new();
        tokens
            .expect_verify()
            .times(1)
            .return_once(move |_| Ok(claims));
        let res = call(tokens, BearerPolicy::Required, Some("Bearer abc.def.ghi")).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = actix_test::read_body(res).await;
        assert_eq!(std::str::from_utf8(&body).expect("utf8"), expected);
    }

    #[rstest]
    fn ownership_is_enforced_only_for_presented_tokens() {
        let owner = UserId::random();
        let claims = TokenClaims::from_parts(
            owner,
            UserName::new("alice123").expect("name"),
            EmailAddress::new("a@x.com").expect("email"),
            chrono::Utc::now(),
            chrono::Utc::now() + chrono::Duration::hours(1),
        );
        let identity = BearerIdentity(Some(claims));
        assert!(identity.authorize_user(&owner).is_ok());
        let error = identity
            .authorize_user(&UserId::random())
            .expect_err("other user");
        assert_eq!(error.code(), ErrorCode::Forbidden);

        assert!(BearerIdentity(None).authorize_user(&owner).is_ok());
    }

    #[rstest]
    #[case(false, BearerPolicy::Optional)]
    #[case(true, BearerPolicy::Required)]
    fn policy_follows_setting(#[case] required: bool, #[case] expected: BearerPolicy) {
        assert_eq!(BearerPolicy::from_required(required), expected);
    }
}
