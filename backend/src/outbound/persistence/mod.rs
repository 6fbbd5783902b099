//! MongoDB-backed persistence adapters.

mod mongo_session_repository;
mod mongo_user_repository;

use mongodb::bson::doc;
use mongodb::{Client, Database};

pub use mongo_session_repository::MongoSessionRepository;
pub use mongo_user_repository::MongoUserRepository;

/// Collection name for user records.
const USERS_COLLECTION: &str = "users";
/// Collection name for brushing sessions.
const SESSIONS_COLLECTION: &str = "brushing_sessions";

/// Handle to the backing MongoDB database.
///
/// Owns the client and hands out repository adapters bound to their
/// collections.
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Connect to MongoDB and select the given database.
    ///
    /// The driver connects lazily; call [`MongoStore::ping`] to verify the
    /// deployment is actually reachable.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self {
            db: client.database(db_name),
        })
    }

    /// Round-trip a `ping` command to verify connectivity.
    pub async fn ping(&self) -> Result<(), mongodb::error::Error> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    /// Create the indexes the repositories rely on, most importantly the
    /// unique email index backing duplicate-registration detection.
    pub async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        MongoUserRepository::new(self).ensure_indexes().await?;
        MongoSessionRepository::new(self).ensure_indexes().await?;
        Ok(())
    }

    pub(crate) fn database(&self) -> &Database {
        &self.db
    }
}
