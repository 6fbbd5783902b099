//! Account HTTP handlers.
//!
//! ```text
//! POST /register
//! POST /login
//! GET  /me
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::auth::{AuthValidationError, LoginCredentials, RegistrationDetails};
use crate::domain::user::{User, UserId, UserValidationError};
use crate::domain::Error;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Request payload for registration.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestBody {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request payload for login.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequestBody {
    pub email: String,
    pub password: String,
}

/// Response payload carrying a freshly issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponseBody {
    pub token: String,
}

/// User profile payload; never includes credential material.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponseBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub current_score: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    #[schema(format = "date-time")]
    pub last_brushing_timestamp: Option<String>,
    #[schema(format = "date")]
    pub last_completed_streak_day: Option<String>,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<&User> for UserResponseBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            current_score: user.current_score(),
            current_streak: user.current_streak(),
            longest_streak: user.longest_streak(),
            last_brushing_timestamp: user.last_brushing_at().map(|at| at.to_rfc3339()),
            last_completed_streak_day: user.last_completed_day().map(|day| day.to_string()),
            created_at: user.created_at().to_rfc3339(),
        }
    }
}

fn map_auth_validation(err: AuthValidationError) -> Error {
    let field = match &err {
        AuthValidationError::EmptyEmail => "email",
        AuthValidationError::EmptyPassword | AuthValidationError::PasswordTooShort { .. } => {
            "password"
        }
        AuthValidationError::User(user_err) => match user_err {
            UserValidationError::EmptyName | UserValidationError::NameTooLong { .. } => "name",
            UserValidationError::InvalidEmail => "email",
            UserValidationError::InvalidId => "id",
        },
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

fn issue_token(state: &HttpState, user_id: &UserId) -> Result<String, Error> {
    state
        .tokens
        .issue(user_id)
        .map_err(|err| Error::internal(format!("token issuance failed: {err}")))
}

/// Register a new account and return a bearer token.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequestBody,
    responses(
        (status = 201, description = "Account created", body = TokenResponseBody),
        (status = 400, description = "Invalid payload or duplicate email", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequestBody>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let details =
        RegistrationDetails::try_from_parts(&payload.name, &payload.email, &payload.password)
            .map_err(map_auth_validation)?;

    let user = state.accounts.register(details).await?;
    let token = issue_token(&state, user.id())?;

    Ok(HttpResponse::Created().json(TokenResponseBody { token }))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequestBody,
    responses(
        (status = 200, description = "Authenticated", body = TokenResponseBody),
        (status = 400, description = "Missing fields", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequestBody>,
) -> ApiResult<web::Json<TokenResponseBody>> {
    let payload = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(map_auth_validation)?;

    let user = state.accounts.authenticate(credentials).await?;
    let token = issue_token(&state, user.id())?;

    Ok(web::Json(TokenResponseBody { token }))
}

/// Fetch the authenticated user's profile with fresh streak state.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Current user profile", body = UserResponseBody),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "User no longer exists", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "getMe",
    security(("BearerAuth" = []))
)]
#[get("/me")]
pub async fn me(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<UserResponseBody>> {
    let profile = state.accounts.profile(user.user_id()).await?;
    Ok(web::Json(UserResponseBody::from(&profile)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use chrono::{NaiveDate, TimeZone, Utc};
    use mockall::predicate::always;

    use super::*;
    use crate::domain::ports::{FixtureTokenIssuer, MockAccounts, MockBrushingLog};
    use crate::domain::user::{EmailAddress, PasswordHash, UserDraft, UserName};

    fn fixture_user(user_id: UserId) -> User {
        User::hydrate(UserDraft {
            id: user_id,
            name: UserName::new("Ada").expect("valid name"),
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            password_hash: PasswordHash::new("$2b$10$stored"),
            current_score: 40,
            current_streak: 2,
            longest_streak: 5,
            last_brushing_at: Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).single(),
            last_completed_day: NaiveDate::from_ymd_opt(2026, 3, 10),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
                .single()
                .expect("valid instant"),
        })
    }

    fn state_with(accounts: MockAccounts, user_id: UserId) -> HttpState {
        HttpState::new(
            Arc::new(accounts),
            Arc::new(MockBrushingLog::new()),
            Arc::new(FixtureTokenIssuer::new("tok-1", user_id)),
        )
    }

    async fn app(
        state: HttpState,
    ) -> impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    > {
        test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(register)
                .service(login)
                .service(me),
        )
        .await
    }

    #[actix_web::test]
    async fn register_returns_created_with_token() {
        let user_id = UserId::random();
        let user = fixture_user(user_id.clone());

        let mut accounts = MockAccounts::new();
        accounts
            .expect_register()
            .times(1)
            .return_once(move |_| Ok(user));

        let app = app(state_with(accounts, user_id)).await;
        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(serde_json::json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "123456"
            }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let body: TokenResponseBody = test::read_body_json(res).await;
        assert_eq!(body.token, "tok-1");
    }

    #[actix_web::test]
    async fn register_rejects_short_password_before_the_service() {
        // No expectation on the accounts mock: a register call would panic.
        let app = app(state_with(MockAccounts::new(), UserId::random())).await;
        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(serde_json::json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "12345"
            }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Error = test::read_body_json(res).await;
        assert_eq!(
            body.details().and_then(|d| d["field"].as_str()),
            Some("password")
        );
    }

    #[actix_web::test]
    async fn register_surfaces_duplicate_email_as_bad_request() {
        let mut accounts = MockAccounts::new();
        accounts
            .expect_register()
            .with(always())
            .returning(|_| Err(Error::invalid_request("email is already registered")));

        let app = app(state_with(accounts, UserId::random())).await;
        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(serde_json::json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "123456"
            }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn login_returns_token_for_valid_credentials() {
        let user_id = UserId::random();
        let user = fixture_user(user_id.clone());

        let mut accounts = MockAccounts::new();
        accounts
            .expect_authenticate()
            .times(1)
            .return_once(move |_| Ok(user));

        let app = app(state_with(accounts, user_id)).await;
        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(serde_json::json!({
                "email": "ada@example.com",
                "password": "123456"
            }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: TokenResponseBody = test::read_body_json(res).await;
        assert_eq!(body.token, "tok-1");
    }

    #[actix_web::test]
    async fn login_maps_bad_credentials_to_unauthorized() {
        let mut accounts = MockAccounts::new();
        accounts
            .expect_authenticate()
            .returning(|_| Err(Error::unauthorized("invalid email or password")));

        let app = app(state_with(accounts, UserId::random())).await;
        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(serde_json::json!({
                "email": "ada@example.com",
                "password": "wrong!"
            }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn login_rejects_missing_password() {
        let app = app(state_with(MockAccounts::new(), UserId::random())).await;
        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(serde_json::json!({
                "email": "ada@example.com",
                "password": ""
            }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn me_returns_profile_without_credential_material() {
        let user_id = UserId::random();
        let user = fixture_user(user_id.clone());

        let mut accounts = MockAccounts::new();
        accounts
            .expect_profile()
            .times(1)
            .return_once(move |_| Ok(user));

        let app = app(state_with(accounts, user_id.clone())).await;
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((header::AUTHORIZATION, "Bearer tok-1"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["id"], user_id.to_string());
        assert_eq!(body["currentScore"], 40);
        assert_eq!(body["currentStreak"], 2);
        assert_eq!(body["longestStreak"], 5);
        assert_eq!(body["lastCompletedStreakDay"], "2026-03-10");
        assert!(body.get("password").is_none());
        assert!(body.get("passwordHash").is_none());
    }

    #[actix_web::test]
    async fn me_requires_a_bearer_token() {
        let app = app(state_with(MockAccounts::new(), UserId::random())).await;
        let req = test::TestRequest::get().uri("/me").to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn me_maps_deleted_user_to_not_found() {
        let mut accounts = MockAccounts::new();
        accounts
            .expect_profile()
            .returning(|_| Err(Error::not_found("user not found")));

        let app = app(state_with(accounts, UserId::random())).await;
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((header::AUTHORIZATION, "Bearer tok-1"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
