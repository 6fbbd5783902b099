//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: account endpoints, session endpoints, health probes, and
//! the bearer-token security scheme. The generated document backs Swagger
//! UI in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::sessions::{
    LogSessionRequestBody, SessionListResponseBody, SessionLoggedResponseBody, SessionResponseBody,
};
use crate::inbound::http::users::{
    LoginRequestBody, RegisterRequestBody, TokenResponseBody, UserResponseBody,
};

/// Enrich the generated document with the bearer-token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Bearer token issued by POST /register or POST /login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Bristle backend API",
        description = "HTTP interface for tooth-brushing habit tracking: accounts, \
                       brushing sessions, streaks, and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::me,
        crate::inbound::http::sessions::log_session,
        crate::inbound::http::sessions::list_sessions,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        RegisterRequestBody,
        LoginRequestBody,
        TokenResponseBody,
        UserResponseBody,
        LogSessionRequestBody,
        SessionResponseBody,
        SessionLoggedResponseBody,
        SessionListResponseBody,
    )),
    tags(
        (name = "auth", description = "Registration, login, and profile access"),
        (name = "sessions", description = "Brushing session logging and history"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::*;

    #[test]
    fn document_registers_all_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in ["/register", "/login", "/me", "/sessions", "/healthz/ready", "/healthz/live"] {
            assert!(paths.contains_key(path), "missing path {path}");
        }
    }

    #[test]
    fn document_declares_the_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components registered");
        assert!(components.security_schemes.contains_key("BearerAuth"));
    }
}
