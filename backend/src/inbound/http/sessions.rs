//! Brushing session HTTP handlers.
//!
//! ```text
//! POST /sessions
//! GET  /sessions
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::brushing::BrushingSession;
use crate::domain::Error;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::UserResponseBody;
use crate::inbound::http::ApiResult;

/// Request payload for logging a session.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogSessionRequestBody {
    /// Brushing duration in seconds; negative values are rejected and values
    /// above the cap are clamped before scoring.
    pub duration: i64,
}

/// A single brushing session in a listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponseBody {
    #[schema(format = "uuid")]
    pub id: String,
    /// Time-of-day bucket: `morning`, `noon`, or `evening`.
    pub session_type: String,
    #[schema(format = "date-time")]
    pub timestamp: String,
    /// Clamped duration in seconds.
    pub duration: u32,
}

impl From<&BrushingSession> for SessionResponseBody {
    fn from(session: &BrushingSession) -> Self {
        Self {
            id: session.id().to_string(),
            session_type: session.session_type().to_string(),
            timestamp: session.recorded_at().to_rfc3339(),
            duration: session.duration().secs(),
        }
    }
}

/// Response payload for a logged session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionLoggedResponseBody {
    /// Points awarded for this session.
    pub score_added: u64,
    /// User snapshot after score and streak updates.
    pub user: UserResponseBody,
}

/// Response payload for the recent-session listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionListResponseBody {
    /// Number of sessions returned.
    pub count: usize,
    /// Sessions, newest first.
    pub sessions: Vec<SessionResponseBody>,
}

/// Record a brushing session for the authenticated user.
///
/// The time-of-day bucket is derived from the server's wall clock, never
/// from the client.
#[utoipa::path(
    post,
    path = "/sessions",
    request_body = LogSessionRequestBody,
    responses(
        (status = 201, description = "Session recorded", body = SessionLoggedResponseBody),
        (status = 400, description = "Invalid duration", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "User no longer exists", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["sessions"],
    operation_id = "logSession",
    security(("BearerAuth" = []))
)]
#[post("/sessions")]
pub async fn log_session(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<LogSessionRequestBody>,
) -> ApiResult<HttpResponse> {
    let logged = state
        .brushing
        .log_session(user.user_id(), payload.duration)
        .await?;

    Ok(HttpResponse::Created().json(SessionLoggedResponseBody {
        score_added: logged.score_added,
        user: UserResponseBody::from(&logged.user),
    }))
}

/// List the authenticated user's most recent sessions, newest first.
#[utoipa::path(
    get,
    path = "/sessions",
    responses(
        (status = 200, description = "Recent sessions", body = SessionListResponseBody),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["sessions"],
    operation_id = "listSessions",
    security(("BearerAuth" = []))
)]
#[get("/sessions")]
pub async fn list_sessions(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<SessionListResponseBody>> {
    let recent = state.brushing.recent_sessions(user.user_id()).await?;
    let sessions: Vec<SessionResponseBody> =
        recent.sessions.iter().map(SessionResponseBody::from).collect();

    Ok(web::Json(SessionListResponseBody {
        count: sessions.len(),
        sessions,
    }))
}
