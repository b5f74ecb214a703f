use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{
    Booking, BookingFilter, BookingStatus, Content, GalleryAlbum, Role, Shift, TeamMember, User,
};
use super::store::{
    BookingStore, ContentStore, GalleryStore, MediaReferences, ShiftStore, Store, StoreError,
    StoreResult, TeamStore, UserStore,
};

/// In-process store with the same contract as `PgStore`. Used by the
/// integration tests and handy for running the API without PostgreSQL.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    bookings: RwLock<Vec<Booking>>,
    shifts: RwLock<Vec<Shift>>,
    content: RwLock<HashMap<String, Content>>,
    team: RwLock<Vec<TeamMember>>,
    albums: RwLock<Vec<GalleryAlbum>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T: Clone>(items: &[T], created: impl Fn(&T) -> chrono::DateTime<Utc>) -> Vec<T> {
    let mut out = items.to_vec();
    out.sort_by(|a, b| created(b).cmp(&created(a)));
    out
}

/// Replaces the item with the same id; false when there is none.
fn replace_by_id<T: Clone>(items: &mut [T], id: Uuid, with: &T, id_of: impl Fn(&T) -> Uuid) -> bool {
    match items.iter_mut().find(|item| id_of(item) == id) {
        Some(slot) => {
            *slot = with.clone();
            true
        }
        None => false,
    }
}

fn remove_by_id<T>(items: &mut Vec<T>, id: Uuid, id_of: impl Fn(&T) -> Uuid) -> Option<T> {
    let index = items.iter().position(|item| id_of(item) == id)?;
    Some(items.remove(index))
}

fn ends_with_ignore_case(value: &str, suffix: &str) -> bool {
    !suffix.is_empty() && value.to_lowercase().ends_with(&suffix.to_lowercase())
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(newest_first(&self.users.read().await, |u| u.created_at))
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("User already exists".to_string()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn update_user_role(&self, id: Uuid, role: Role) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.iter_mut().find(|u| u.id == id).map(|u| {
            u.role = role;
            u.updated_at = Utc::now();
            u.clone()
        }))
    }

    async fn update_user_password(&self, id: Uuid, password_hash: &str) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        Ok(match users.iter_mut().find(|u| u.id == id) {
            Some(u) => {
                u.password_hash = password_hash.to_string();
                u.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        Ok(remove_by_id(&mut *self.users.write().await, id, |u| u.id).is_some())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()> {
        self.bookings.write().await.push(booking.clone());
        Ok(())
    }

    async fn find_booking(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        Ok(self.bookings.read().await.iter().find(|b| b.id == id).cloned())
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> StoreResult<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        let mut matched: Vec<Booking> = bookings.iter().filter(|b| filter.matches(b)).cloned().collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched.truncate(filter.limit.max(0) as usize);
        Ok(matched)
    }

    async fn save_booking(&self, booking: &Booking) -> StoreResult<bool> {
        Ok(replace_by_id(&mut self.bookings.write().await, booking.id, booking, |b| b.id))
    }

    async fn set_booking_status(&self, id: Uuid, status: BookingStatus) -> StoreResult<bool> {
        let mut bookings = self.bookings.write().await;
        Ok(match bookings.iter_mut().find(|b| b.id == id) {
            Some(b) => {
                b.status = status;
                b.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl ShiftStore for MemoryStore {
    async fn list_shifts(&self) -> StoreResult<Vec<Shift>> {
        Ok(newest_first(&self.shifts.read().await, |s| s.created_at))
    }

    async fn find_shift(&self, id: Uuid) -> StoreResult<Option<Shift>> {
        Ok(self.shifts.read().await.iter().find(|s| s.id == id).cloned())
    }

    async fn any_shift_exists(&self) -> StoreResult<bool> {
        Ok(!self.shifts.read().await.is_empty())
    }

    async fn insert_shift(&self, shift: &Shift) -> StoreResult<()> {
        self.shifts.write().await.push(shift.clone());
        Ok(())
    }

    async fn save_shift(&self, shift: &Shift) -> StoreResult<bool> {
        Ok(replace_by_id(&mut self.shifts.write().await, shift.id, shift, |s| s.id))
    }

    async fn delete_shift(&self, id: Uuid) -> StoreResult<Option<Shift>> {
        Ok(remove_by_id(&mut *self.shifts.write().await, id, |s| s.id))
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn find_content(&self, slug: &str) -> StoreResult<Option<Content>> {
        Ok(self.content.read().await.get(slug).cloned())
    }

    async fn upsert_content(&self, slug: &str, data: Map<String, Value>) -> StoreResult<Content> {
        let mut content = self.content.write().await;
        let now = Utc::now();
        let doc = content.entry(slug.to_string()).or_insert_with(|| Content {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            data: Map::new(),
            created_at: now,
            updated_at: now,
        });
        doc.data.extend(data);
        doc.updated_at = now;
        Ok(doc.clone())
    }

    async fn insert_content_if_absent(&self, slug: &str, data: Map<String, Value>) -> StoreResult<bool> {
        let mut content = self.content.write().await;
        if content.contains_key(slug) {
            return Ok(false);
        }
        let now = Utc::now();
        content.insert(
            slug.to_string(),
            Content {
                id: Uuid::new_v4(),
                slug: slug.to_string(),
                data,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(true)
    }

    async fn replace_content(&self, slug: &str, data: Map<String, Value>) -> StoreResult<Content> {
        let mut content = self.content.write().await;
        let now = Utc::now();
        let doc = content.entry(slug.to_string()).or_insert_with(|| Content {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            data: Map::new(),
            created_at: now,
            updated_at: now,
        });
        doc.data = data;
        doc.updated_at = now;
        Ok(doc.clone())
    }
}

#[async_trait]
impl TeamStore for MemoryStore {
    async fn list_team(&self) -> StoreResult<Vec<TeamMember>> {
        let mut team = self.team.read().await.clone();
        team.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(team)
    }

    async fn find_member(&self, id: Uuid) -> StoreResult<Option<TeamMember>> {
        Ok(self.team.read().await.iter().find(|m| m.id == id).cloned())
    }

    async fn insert_member(&self, member: &TeamMember) -> StoreResult<()> {
        self.team.write().await.push(member.clone());
        Ok(())
    }

    async fn save_member(&self, member: &TeamMember) -> StoreResult<bool> {
        Ok(replace_by_id(&mut self.team.write().await, member.id, member, |m| m.id))
    }

    async fn delete_member(&self, id: Uuid) -> StoreResult<Option<TeamMember>> {
        Ok(remove_by_id(&mut *self.team.write().await, id, |m| m.id))
    }
}

#[async_trait]
impl GalleryStore for MemoryStore {
    async fn list_albums(&self) -> StoreResult<Vec<GalleryAlbum>> {
        Ok(newest_first(&self.albums.read().await, |a| a.created_at))
    }

    async fn find_album(&self, id: Uuid) -> StoreResult<Option<GalleryAlbum>> {
        Ok(self.albums.read().await.iter().find(|a| a.id == id).cloned())
    }

    async fn insert_album(&self, album: &GalleryAlbum) -> StoreResult<()> {
        self.albums.write().await.push(album.clone());
        Ok(())
    }

    async fn save_album(&self, album: &GalleryAlbum) -> StoreResult<bool> {
        Ok(replace_by_id(&mut self.albums.write().await, album.id, album, |a| a.id))
    }

    async fn delete_album(&self, id: Uuid) -> StoreResult<Option<GalleryAlbum>> {
        Ok(remove_by_id(&mut *self.albums.write().await, id, |a| a.id))
    }
}

#[async_trait]
impl MediaReferences for MemoryStore {
    async fn is_media_referenced(&self, path: &str) -> StoreResult<bool> {
        let in_gallery = self.albums.read().await.iter().any(|a| {
            ends_with_ignore_case(&a.cover_url, path)
                || a.photos.iter().any(|p| ends_with_ignore_case(p, path))
        });
        if in_gallery {
            return Ok(true);
        }
        if self.team.read().await.iter().any(|m| ends_with_ignore_case(&m.photo_url, path)) {
            return Ok(true);
        }
        Ok(self
            .shifts
            .read()
            .await
            .iter()
            .any(|s| ends_with_ignore_case(&s.image_url, path)))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn close(&self) {}
}
