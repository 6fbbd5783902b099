//! Bearer-token request authentication.
//!
//! Protected handlers take an [`AuthenticatedUser`] argument; extraction
//! verifies the `Authorization: Bearer <token>` header against the token
//! issuer port and yields the token's subject. Any missing, malformed, or
//! rejected token produces a uniform 401.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::debug;

use crate::domain::user::UserId;
use crate::domain::Error;
use crate::inbound::http::state::HttpState;

/// The authenticated subject of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    user_id: UserId,
}

impl AuthenticatedUser {
    /// User id carried by the verified token.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("authorization header must use the Bearer scheme"))
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state missing from app data"))?;
    let token = bearer_token(req)?;
    let user_id = state.tokens.verify(token).map_err(|error| {
        debug!(%error, "bearer token rejected");
        Error::unauthorized("invalid or expired token")
    })?;

    Ok(AuthenticatedUser { user_id })
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, web, App, HttpResponse};

    use super::*;
    use crate::domain::ports::{FixtureTokenIssuer, MockAccounts, MockBrushingLog};
    use crate::inbound::http::ApiResult;

    fn fixture_state(user_id: UserId) -> HttpState {
        HttpState::new(
            Arc::new(MockAccounts::new()),
            Arc::new(MockBrushingLog::new()),
            Arc::new(FixtureTokenIssuer::new("tok-1", user_id)),
        )
    }

    async fn whoami(user: AuthenticatedUser) -> ApiResult<HttpResponse> {
        Ok(HttpResponse::Ok().body(user.user_id().to_string()))
    }

    async fn call_with_header(
        header_value: Option<&str>,
    ) -> (StatusCode, String, UserId) {
        let user_id = UserId::random();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fixture_state(user_id.clone())))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let mut req = test::TestRequest::get().uri("/whoami");
        if let Some(value) = header_value {
            req = req.insert_header((header::AUTHORIZATION, value));
        }
        let res = test::call_service(&app, req.to_request()).await;
        let status = res.status();
        let body = test::read_body(res).await;
        let body = String::from_utf8(body.to_vec()).expect("utf8 body");
        (status, body, user_id)
    }

    #[actix_web::test]
    async fn accepts_a_valid_bearer_token() {
        let (status, body, user_id) = call_with_header(Some("Bearer tok-1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, user_id.to_string());
    }

    #[actix_web::test]
    async fn rejects_a_missing_header() {
        let (status, _, _) = call_with_header(None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn rejects_a_non_bearer_scheme() {
        let (status, _, _) = call_with_header(Some("Basic dXNlcjpwYXNz")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn rejects_an_unknown_token() {
        let (status, _, _) = call_with_header(Some("Bearer forged")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn rejects_an_empty_token() {
        let (status, _, _) = call_with_header(Some("Bearer   ")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
