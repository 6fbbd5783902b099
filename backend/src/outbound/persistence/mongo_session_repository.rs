//! MongoDB-backed [`SessionRepository`] adapter.

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::error::ErrorKind;
use mongodb::{Collection, IndexModel};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::brushing::{BrushingSession, SessionDuration, SessionType};
use crate::domain::ports::{SessionRepository, SessionRepositoryError};
use crate::domain::user::UserId;

use super::{MongoStore, SESSIONS_COLLECTION};

/// Stored representation of a brushing session.
///
/// The owning calendar day is materialised at write time from the server's
/// local timezone, so day-completion queries are exact string matches rather
/// than timezone-sensitive range scans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SessionDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub session_type: String,
    pub recorded_at: BsonDateTime,
    pub day: String,
    pub duration_secs: i32,
}

impl SessionDocument {
    pub(crate) fn from_domain(session: &BrushingSession) -> Self {
        let day = session
            .recorded_at()
            .with_timezone(&Local)
            .date_naive()
            .to_string();
        Self {
            id: session.id().to_string(),
            user_id: session.user_id().to_string(),
            session_type: session.session_type().to_string(),
            recorded_at: BsonDateTime::from_millis(session.recorded_at().timestamp_millis()),
            day,
            duration_secs: i32::try_from(session.duration().secs()).unwrap_or(i32::MAX),
        }
    }

    pub(crate) fn into_domain(self) -> Result<BrushingSession, SessionRepositoryError> {
        let id = Uuid::parse_str(&self.id).map_err(|err| {
            SessionRepositoryError::query(format!("stored session id invalid: {err}"))
        })?;
        let user_id = UserId::new(&self.user_id).map_err(|err| {
            SessionRepositoryError::query(format!("stored user id invalid: {err}"))
        })?;
        let session_type = self.session_type.parse::<SessionType>().map_err(|err| {
            SessionRepositoryError::query(format!("stored session type invalid: {err}"))
        })?;
        let recorded_at = DateTime::<Utc>::from_timestamp_millis(self.recorded_at.timestamp_millis())
            .ok_or_else(|| SessionRepositoryError::query("stored timestamp out of range"))?;
        let duration = SessionDuration::from_secs(i64::from(self.duration_secs.max(0)))
            .map_err(|err| SessionRepositoryError::query(format!("stored duration invalid: {err}")))?;

        Ok(BrushingSession::new(
            id,
            user_id,
            session_type,
            recorded_at,
            duration,
        ))
    }
}

fn map_mongo_error(error: mongodb::error::Error) -> SessionRepositoryError {
    match &*error.kind {
        ErrorKind::Io(_) | ErrorKind::ServerSelection { .. } => {
            SessionRepositoryError::connection(error.to_string())
        }
        _ => SessionRepositoryError::query(error.to_string()),
    }
}

/// MongoDB-backed session repository.
#[derive(Clone)]
pub struct MongoSessionRepository {
    collection: Collection<SessionDocument>,
}

impl MongoSessionRepository {
    /// Bind the repository to the store's sessions collection.
    pub fn new(store: &MongoStore) -> Self {
        Self {
            collection: store.database().collection(SESSIONS_COLLECTION),
        }
    }

    /// Index covering both the recent-session listing and the
    /// day-completion existence queries.
    pub(crate) async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        let by_user_day = IndexModel::builder()
            .keys(doc! { "user_id": 1, "day": 1, "session_type": 1 })
            .build();
        let by_user_recency = IndexModel::builder()
            .keys(doc! { "user_id": 1, "recorded_at": -1 })
            .build();
        self.collection
            .create_indexes([by_user_day, by_user_recency])
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for MongoSessionRepository {
    async fn insert(&self, session: &BrushingSession) -> Result<(), SessionRepositoryError> {
        let document = SessionDocument::from_domain(session);
        self.collection
            .insert_one(&document)
            .await
            .map_err(map_mongo_error)?;
        Ok(())
    }

    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: i64,
    ) -> Result<Vec<BrushingSession>, SessionRepositoryError> {
        let documents: Vec<SessionDocument> = self
            .collection
            .find(doc! { "user_id": user_id.to_string() })
            .sort(doc! { "recorded_at": -1 })
            .limit(limit)
            .await
            .map_err(map_mongo_error)?
            .try_collect()
            .await
            .map_err(map_mongo_error)?;

        documents
            .into_iter()
            .map(SessionDocument::into_domain)
            .collect()
    }

    async fn exists_on_day(
        &self,
        user_id: &UserId,
        day: NaiveDate,
        session_type: SessionType,
    ) -> Result<bool, SessionRepositoryError> {
        let filter = doc! {
            "user_id": user_id.to_string(),
            "day": day.to_string(),
            "session_type": session_type.to_string(),
        };
        let found = self
            .collection
            .find_one(filter)
            .await
            .map_err(map_mongo_error)?;
        Ok(found.is_some())
    }
}
