//! MongoDB-backed [`UserRepository`] adapter.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Collection, IndexModel};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::user::{EmailAddress, PasswordHash, User, UserDraft, UserId, UserName};

use super::{MongoStore, USERS_COLLECTION};

/// Mongo error code for a unique-index violation.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Stored representation of a user.
///
/// Calendar days are stored as `YYYY-MM-DD` strings so day comparisons never
/// depend on a timezone interpretation of a stored instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UserDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub current_score: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_brushing_at: Option<BsonDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_completed_day: Option<String>,
    pub created_at: BsonDateTime,
}

fn to_bson_datetime(at: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(at.timestamp_millis())
}

fn from_bson_datetime(at: BsonDateTime) -> Result<DateTime<Utc>, UserRepositoryError> {
    DateTime::from_timestamp_millis(at.timestamp_millis())
        .ok_or_else(|| UserRepositoryError::query("stored timestamp out of range"))
}

fn clamp_u32(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

impl UserDocument {
    pub(crate) fn from_domain(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            password_hash: user.password_hash().expose().to_owned(),
            current_score: i64::try_from(user.current_score()).unwrap_or(i64::MAX),
            current_streak: i32::try_from(user.current_streak()).unwrap_or(i32::MAX),
            longest_streak: i32::try_from(user.longest_streak()).unwrap_or(i32::MAX),
            last_brushing_at: user.last_brushing_at().map(to_bson_datetime),
            last_completed_day: user.last_completed_day().map(|day| day.to_string()),
            created_at: to_bson_datetime(user.created_at()),
        }
    }

    pub(crate) fn into_domain(self) -> Result<User, UserRepositoryError> {
        let id = UserId::new(&self.id)
            .map_err(|err| UserRepositoryError::query(format!("stored user id invalid: {err}")))?;
        let name = UserName::new(&self.name)
            .map_err(|err| UserRepositoryError::query(format!("stored name invalid: {err}")))?;
        let email = EmailAddress::new(&self.email)
            .map_err(|err| UserRepositoryError::query(format!("stored email invalid: {err}")))?;
        let last_brushing_at = self.last_brushing_at.map(from_bson_datetime).transpose()?;
        let last_completed_day = self
            .last_completed_day
            .as_deref()
            .map(|day| {
                day.parse::<NaiveDate>().map_err(|err| {
                    UserRepositoryError::query(format!("stored day invalid: {err}"))
                })
            })
            .transpose()?;

        Ok(User::hydrate(UserDraft {
            id,
            name,
            email,
            password_hash: PasswordHash::new(self.password_hash),
            current_score: u64::try_from(self.current_score).unwrap_or(0),
            current_streak: clamp_u32(self.current_streak),
            longest_streak: clamp_u32(self.longest_streak),
            last_brushing_at,
            last_completed_day,
            created_at: from_bson_datetime(self.created_at)?,
        }))
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    matches!(
        &*error.kind,
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

fn map_mongo_error(error: mongodb::error::Error) -> UserRepositoryError {
    match &*error.kind {
        ErrorKind::Io(_) | ErrorKind::ServerSelection { .. } => {
            UserRepositoryError::connection(error.to_string())
        }
        _ => UserRepositoryError::query(error.to_string()),
    }
}

/// MongoDB-backed user repository.
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    /// Bind the repository to the store's users collection.
    pub fn new(store: &MongoStore) -> Self {
        Self {
            collection: store.database().collection(USERS_COLLECTION),
        }
    }

    /// Create the unique email index duplicate detection relies on.
    pub(crate) async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let document = UserDocument::from_domain(user);
        self.collection
            .insert_one(&document)
            .await
            .map_err(|error| {
                if is_duplicate_key(&error) {
                    UserRepositoryError::duplicate_email(user.email().to_string())
                } else {
                    map_mongo_error(error)
                }
            })?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        self.collection
            .find_one(doc! { "_id": id.to_string() })
            .await
            .map_err(map_mongo_error)?
            .map(UserDocument::into_domain)
            .transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        self.collection
            .find_one(doc! { "email": email.as_ref() })
            .await
            .map_err(map_mongo_error)?
            .map(UserDocument::into_domain)
            .transpose()
    }

    async fn update_habit_state(&self, user: &User) -> Result<(), UserRepositoryError> {
        let last_brushing_at = user.last_brushing_at().map(to_bson_datetime);
        let last_completed_day = user.last_completed_day().map(|day| day.to_string());
        let update = doc! {
            "$set": {
                "current_score": i64::try_from(user.current_score()).unwrap_or(i64::MAX),
                "current_streak": i32::try_from(user.current_streak()).unwrap_or(i32::MAX),
                "longest_streak": i32::try_from(user.longest_streak()).unwrap_or(i32::MAX),
                "last_brushing_at": last_brushing_at,
                "last_completed_day": last_completed_day,
            }
        };

        let result = self
            .collection
            .update_one(doc! { "_id": user.id().to_string() }, update)
            .await
            .map_err(map_mongo_error)?;
        if result.matched_count == 0 {
            return Err(UserRepositoryError::query(format!(
                "user {} missing during habit-state update",
                user.id()
            )));
        }
        Ok(())
    }
}
