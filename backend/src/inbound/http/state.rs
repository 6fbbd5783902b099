//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{Accounts, BrushingLog, TokenIssuer};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Account use-cases: registration, login, profile.
    pub accounts: Arc<dyn Accounts>,
    /// Brushing session use-cases: logging and listing.
    pub brushing: Arc<dyn BrushingLog>,
    /// Bearer-token issuance and verification.
    pub tokens: Arc<dyn TokenIssuer>,
}

impl HttpState {
    /// Bundle the port implementations handlers depend on.
    pub fn new(
        accounts: Arc<dyn Accounts>,
        brushing: Arc<dyn BrushingLog>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            accounts,
            brushing,
            tokens,
        }
    }
}
