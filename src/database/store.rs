use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::models::{
    Booking, BookingFilter, BookingStatus, Content, GalleryAlbum, Role, Shift, TeamMember, User,
};

/// Errors from any store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Newest first.
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    /// `email` must already be normalized.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Fails with `StoreError::Conflict` when the email is taken.
    async fn insert_user(&self, user: &User) -> StoreResult<()>;
    async fn update_user_role(&self, id: Uuid, role: Role) -> StoreResult<Option<User>>;
    async fn update_user_password(&self, id: Uuid, password_hash: &str) -> StoreResult<bool>;
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()>;
    async fn find_booking(&self, id: Uuid) -> StoreResult<Option<Booking>>;
    /// Newest first, at most `filter.limit` rows.
    async fn list_bookings(&self, filter: &BookingFilter) -> StoreResult<Vec<Booking>>;
    /// Overwrites every field of an existing booking; false when it is gone.
    async fn save_booking(&self, booking: &Booking) -> StoreResult<bool>;
    async fn set_booking_status(&self, id: Uuid, status: BookingStatus) -> StoreResult<bool>;
}

#[async_trait]
pub trait ShiftStore: Send + Sync {
    /// Newest first.
    async fn list_shifts(&self) -> StoreResult<Vec<Shift>>;
    async fn find_shift(&self, id: Uuid) -> StoreResult<Option<Shift>>;
    async fn any_shift_exists(&self) -> StoreResult<bool>;
    async fn insert_shift(&self, shift: &Shift) -> StoreResult<()>;
    async fn save_shift(&self, shift: &Shift) -> StoreResult<bool>;
    /// Returns the removed shift so its media can be released.
    async fn delete_shift(&self, id: Uuid) -> StoreResult<Option<Shift>>;
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn find_content(&self, slug: &str) -> StoreResult<Option<Content>>;
    /// Creates the document or merges `data` over its top-level keys.
    async fn upsert_content(&self, slug: &str, data: Map<String, Value>) -> StoreResult<Content>;
    /// Creates the document only when no document has `slug`.
    async fn insert_content_if_absent(&self, slug: &str, data: Map<String, Value>) -> StoreResult<bool>;
    /// Replaces the whole document.
    async fn replace_content(&self, slug: &str, data: Map<String, Value>) -> StoreResult<Content>;
}

#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Oldest first.
    async fn list_team(&self) -> StoreResult<Vec<TeamMember>>;
    async fn find_member(&self, id: Uuid) -> StoreResult<Option<TeamMember>>;
    async fn insert_member(&self, member: &TeamMember) -> StoreResult<()>;
    async fn save_member(&self, member: &TeamMember) -> StoreResult<bool>;
    async fn delete_member(&self, id: Uuid) -> StoreResult<Option<TeamMember>>;
}

#[async_trait]
pub trait GalleryStore: Send + Sync {
    /// Newest first.
    async fn list_albums(&self) -> StoreResult<Vec<GalleryAlbum>>;
    async fn find_album(&self, id: Uuid) -> StoreResult<Option<GalleryAlbum>>;
    async fn insert_album(&self, album: &GalleryAlbum) -> StoreResult<()>;
    async fn save_album(&self, album: &GalleryAlbum) -> StoreResult<bool>;
    async fn delete_album(&self, id: Uuid) -> StoreResult<Option<GalleryAlbum>>;
}

#[async_trait]
pub trait MediaReferences: Send + Sync {
    /// True when any gallery cover/photo, team photo or shift image ends
    /// with `path`, compared case-insensitively.
    async fn is_media_referenced(&self, path: &str) -> StoreResult<bool>;
}

/// Everything the HTTP layer needs from persistence.
#[async_trait]
pub trait Store:
    UserStore + BookingStore + ShiftStore + ContentStore + TeamStore + GalleryStore + MediaReferences
{
    /// Cheap connectivity check used by the supervisor's watchdog.
    async fn ping(&self) -> StoreResult<()>;
    async fn close(&self);
}
