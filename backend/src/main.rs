//! Backend entry-point: wires REST endpoints, persistence, and OpenAPI docs.

use std::env;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use mockable::{Clock, DefaultClock};
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use backend::domain::{AccountService, BrushingService};
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::inbound::http::health::{live, ready, HealthState};
use backend::inbound::http::sessions::{list_sessions, log_session};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::users::{login, me, register};
use backend::outbound::persistence::{MongoSessionRepository, MongoStore, MongoUserRepository};
use backend::outbound::security::{BcryptPasswordHasher, JwtTokenIssuer};
use backend::Trace;

/// Default bearer-token lifetime: 30 days, matching the issued-token
/// rotation expected by the mobile client.
const DEFAULT_JWT_TTL_SECS: i64 = 30 * 24 * 60 * 60;

fn jwt_secret() -> std::io::Result<Vec<u8>> {
    let secret_path =
        env::var("JWT_SECRET_FILE").unwrap_or_else(|_| "/var/run/secrets/jwt_secret".into());
    match std::fs::read(&secret_path) {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            let allow_dev = env::var("JWT_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %secret_path, error = %e, "using ephemeral JWT secret (dev only)");
                Ok(Uuid::new_v4().as_bytes().to_vec())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read JWT secret at {secret_path}: {e}"
                )))
            }
        }
    }
}

fn jwt_ttl_secs() -> i64 {
    env::var("JWT_TTL_SECS")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .filter(|ttl| *ttl > 0)
        .unwrap_or(DEFAULT_JWT_TTL_SECS)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());
    let mongo_uri = env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".into());
    let mongo_db = env::var("MONGO_DB").unwrap_or_else(|_| "bristle".into());
    let secret = jwt_secret()?;

    let store = MongoStore::connect(&mongo_uri, &mongo_db)
        .await
        .map_err(std::io::Error::other)?;

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let users = Arc::new(MongoUserRepository::new(&store));
    let sessions = Arc::new(MongoSessionRepository::new(&store));
    let hasher = Arc::new(BcryptPasswordHasher::new());
    let tokens = Arc::new(JwtTokenIssuer::new(
        &secret,
        jwt_ttl_secs(),
        Arc::clone(&clock),
    ));

    let accounts = AccountService::new(
        Arc::clone(&users),
        Arc::clone(&sessions),
        hasher,
        Arc::clone(&clock),
    );
    let brushing = BrushingService::new(users, sessions, clock);
    let http_state = web::Data::new(HttpState::new(
        Arc::new(accounts),
        Arc::new(brushing),
        tokens,
    ));

    let health_state = web::Data::new(HealthState::new());
    // Readiness gates on the database being reachable and indexed.
    match store.ping().await {
        Ok(()) => {
            if let Err(e) = store.ensure_indexes().await {
                warn!(error = %e, "index creation failed; continuing unready");
            } else {
                health_state.mark_ready();
            }
        }
        Err(e) => warn!(error = %e, "database unreachable at startup; continuing unready"),
    }

    // Clone for the server factory so the readiness probe stays accessible.
    let server_health_state = health_state.clone();
    HttpServer::new(move || {
        let app = App::new()
            .app_data(server_health_state.clone())
            .app_data(http_state.clone())
            .wrap(Trace)
            .service(register)
            .service(login)
            .service(me)
            .service(log_session)
            .service(list_sessions)
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        let app =
            app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

        app
    })
    .bind(bind_addr.as_str())?
    .run()
    .await
}
