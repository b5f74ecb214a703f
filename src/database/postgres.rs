use std::str::FromStr;

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{postgres::PgRow, PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::manager::DatabaseManager;
use super::models::{
    Booking, BookingFilter, BookingStatus, Content, GalleryAlbum, Role, Shift, TeamMember,
    UnknownVariant, User,
};
use super::store::{
    BookingStore, ContentStore, GalleryStore, MediaReferences, ShiftStore, Store, StoreError,
    StoreResult, TeamStore, UserStore,
};

const USER_COLUMNS: &str = "id, email, password_hash, role, created_at, updated_at";

const BOOKING_COLUMNS: &str = "id, email, shift_id, shift_title, child_full_name, dob, age, gender, \
     parent_full_name, parent_phone, parent2_full_name, parent2_phone, address, roommates, district, \
     payment_type, allergies, transfer, agree, status, created_at, updated_at";

const SHIFT_COLUMNS: &str = "id, title, dates, price, description, image_url, image_fit, \
     image_position, is_active, created_at, updated_at";

const TEAM_COLUMNS: &str = "id, name, position, description, photo_url, photo_fit, photo_position, \
     created_at, updated_at";

const ALBUM_COLUMNS: &str = "id, title, description, cover_url, cover_fit, cover_position, photos, \
     created_at, updated_at";

/// Text searched by `q`. Must stay identical to the trigram index expression
/// in the migrations or the index is not used.
const SEARCH_TEXT: &str = "email || ' ' || child_full_name || ' ' || parent_full_name || ' ' || parent_phone";

/// `ILIKE` pattern matching `term` anywhere, with LIKE wildcards escaped.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Unique violations surface as conflicts; everything else passes through.
fn map_unique(err: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            return StoreError::Conflict(format!("{} already exists", what));
        }
    }
    StoreError::Sqlx(err)
}

fn parse_column<T>(row: &PgRow, column: &str) -> StoreResult<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw: String = row.try_get(column)?;
    raw.parse()
        .map_err(|e: UnknownVariant| StoreError::Corrupt(format!("{}: {}", column, e)))
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: parse_column(row, "role")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn booking_from_row(row: &PgRow) -> StoreResult<Booking> {
    Ok(Booking {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        shift_id: row.try_get("shift_id")?,
        shift_title: row.try_get("shift_title")?,
        child_full_name: row.try_get("child_full_name")?,
        dob: row.try_get("dob")?,
        age: row.try_get("age")?,
        gender: parse_column(row, "gender")?,
        parent_full_name: row.try_get("parent_full_name")?,
        parent_phone: row.try_get("parent_phone")?,
        parent2_full_name: row.try_get("parent2_full_name")?,
        parent2_phone: row.try_get("parent2_phone")?,
        address: row.try_get("address")?,
        roommates: row.try_get("roommates")?,
        district: row.try_get("district")?,
        payment_type: parse_column(row, "payment_type")?,
        allergies: row.try_get("allergies")?,
        transfer: parse_column(row, "transfer")?,
        agree: row.try_get("agree")?,
        status: parse_column(row, "status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn shift_from_row(row: &PgRow) -> StoreResult<Shift> {
    Ok(Shift {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        dates: row.try_get("dates")?,
        price: row.try_get("price")?,
        description: row.try_get("description")?,
        image_url: row.try_get("image_url")?,
        image_fit: parse_column(row, "image_fit")?,
        image_position: parse_column(row, "image_position")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn member_from_row(row: &PgRow) -> StoreResult<TeamMember> {
    Ok(TeamMember {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        position: row.try_get("position")?,
        description: row.try_get("description")?,
        photo_url: row.try_get("photo_url")?,
        photo_fit: parse_column(row, "photo_fit")?,
        photo_position: parse_column(row, "photo_position")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn album_from_row(row: &PgRow) -> StoreResult<GalleryAlbum> {
    Ok(GalleryAlbum {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        cover_url: row.try_get("cover_url")?,
        cover_fit: parse_column(row, "cover_fit")?,
        cover_position: parse_column(row, "cover_position")?,
        photos: row.try_get("photos")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn content_from_row(row: &PgRow) -> StoreResult<Content> {
    let data: Value = row.try_get("data")?;
    let data = match data {
        Value::Object(map) => map,
        other => {
            return Err(StoreError::Corrupt(format!(
                "content data is not an object: {}",
                other
            )))
        }
    };
    Ok(Content {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        data,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn collect<T>(rows: Vec<PgRow>, map: fn(&PgRow) -> StoreResult<T>) -> StoreResult<Vec<T>> {
    rows.iter().map(map).collect()
}

#[async_trait]
impl UserStore for PgStore {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY created_at DESC", USER_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        collect(rows, user_from_row)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let row = sqlx::query(&sql).bind(email).fetch_optional(&self.pool).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, role, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "User"))?;
        Ok(())
    }

    async fn update_user_role(&self, id: Uuid, role: Role) -> StoreResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET role = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn update_user_password(&self, id: Uuid, password_hash: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl BookingStore for PgStore {
    async fn insert_booking(&self, b: &Booking) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO bookings (id, email, shift_id, shift_title, child_full_name, dob, age, gender, \
             parent_full_name, parent_phone, parent2_full_name, parent2_phone, address, roommates, \
             district, payment_type, allergies, transfer, agree, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, \
             $19, $20, $21, $22)",
        )
        .bind(b.id)
        .bind(&b.email)
        .bind(b.shift_id)
        .bind(&b.shift_title)
        .bind(&b.child_full_name)
        .bind(b.dob)
        .bind(b.age)
        .bind(b.gender.as_str())
        .bind(&b.parent_full_name)
        .bind(&b.parent_phone)
        .bind(&b.parent2_full_name)
        .bind(&b.parent2_phone)
        .bind(&b.address)
        .bind(&b.roommates)
        .bind(&b.district)
        .bind(b.payment_type.as_str())
        .bind(&b.allergies)
        .bind(b.transfer.as_str())
        .bind(b.agree)
        .bind(b.status.as_str())
        .bind(b.created_at)
        .bind(b.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "Booking"))?;
        Ok(())
    }

    async fn find_booking(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        let sql = format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(booking_from_row).transpose()
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> StoreResult<Vec<Booking>> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM bookings WHERE status = ", BOOKING_COLUMNS));
        qb.push_bind(filter.status.as_str());

        if let Some(shift_id) = filter.shift_id {
            qb.push(" AND shift_id = ").push_bind(shift_id);
        }
        if let Some(from) = filter.created_from {
            qb.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(to) = filter.created_to {
            qb.push(" AND created_at <= ").push_bind(to);
        }
        for term in filter.search_terms() {
            qb.push(" AND (").push(SEARCH_TEXT).push(") ILIKE ").push_bind(contains_pattern(&term));
        }
        qb.push(" ORDER BY created_at DESC LIMIT ").push_bind(filter.limit);

        let rows = qb.build().fetch_all(&self.pool).await?;
        collect(rows, booking_from_row)
    }

    async fn save_booking(&self, b: &Booking) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE bookings SET email = $2, shift_id = $3, shift_title = $4, child_full_name = $5, \
             dob = $6, age = $7, gender = $8, parent_full_name = $9, parent_phone = $10, \
             parent2_full_name = $11, parent2_phone = $12, address = $13, roommates = $14, \
             district = $15, payment_type = $16, allergies = $17, transfer = $18, agree = $19, \
             status = $20, updated_at = $21 WHERE id = $1",
        )
        .bind(b.id)
        .bind(&b.email)
        .bind(b.shift_id)
        .bind(&b.shift_title)
        .bind(&b.child_full_name)
        .bind(b.dob)
        .bind(b.age)
        .bind(b.gender.as_str())
        .bind(&b.parent_full_name)
        .bind(&b.parent_phone)
        .bind(&b.parent2_full_name)
        .bind(&b.parent2_phone)
        .bind(&b.address)
        .bind(&b.roommates)
        .bind(&b.district)
        .bind(b.payment_type.as_str())
        .bind(&b.allergies)
        .bind(b.transfer.as_str())
        .bind(b.agree)
        .bind(b.status.as_str())
        .bind(b.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_booking_status(&self, id: Uuid, status: BookingStatus) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE bookings SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ShiftStore for PgStore {
    async fn list_shifts(&self) -> StoreResult<Vec<Shift>> {
        let sql = format!("SELECT {} FROM shifts ORDER BY created_at DESC", SHIFT_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        collect(rows, shift_from_row)
    }

    async fn find_shift(&self, id: Uuid) -> StoreResult<Option<Shift>> {
        let sql = format!("SELECT {} FROM shifts WHERE id = $1", SHIFT_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(shift_from_row).transpose()
    }

    async fn any_shift_exists(&self) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM shifts)")
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn insert_shift(&self, s: &Shift) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO shifts (id, title, dates, price, description, image_url, image_fit, \
             image_position, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(s.id)
        .bind(&s.title)
        .bind(&s.dates)
        .bind(&s.price)
        .bind(&s.description)
        .bind(&s.image_url)
        .bind(s.image_fit.as_str())
        .bind(s.image_position.as_str())
        .bind(s.is_active)
        .bind(s.created_at)
        .bind(s.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "Shift"))?;
        Ok(())
    }

    async fn save_shift(&self, s: &Shift) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE shifts SET title = $2, dates = $3, price = $4, description = $5, image_url = $6, \
             image_fit = $7, image_position = $8, is_active = $9, updated_at = $10 WHERE id = $1",
        )
        .bind(s.id)
        .bind(&s.title)
        .bind(&s.dates)
        .bind(&s.price)
        .bind(&s.description)
        .bind(&s.image_url)
        .bind(s.image_fit.as_str())
        .bind(s.image_position.as_str())
        .bind(s.is_active)
        .bind(s.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_shift(&self, id: Uuid) -> StoreResult<Option<Shift>> {
        let sql = format!("DELETE FROM shifts WHERE id = $1 RETURNING {}", SHIFT_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(shift_from_row).transpose()
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn find_content(&self, slug: &str) -> StoreResult<Option<Content>> {
        let row = sqlx::query(
            "SELECT id, slug, data, created_at, updated_at FROM content_blocks WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(content_from_row).transpose()
    }

    async fn upsert_content(&self, slug: &str, data: Map<String, Value>) -> StoreResult<Content> {
        let row = sqlx::query(
            "INSERT INTO content_blocks (id, slug, data) VALUES ($1, $2, $3) \
             ON CONFLICT (slug) DO UPDATE SET data = content_blocks.data || EXCLUDED.data, \
             updated_at = now() \
             RETURNING id, slug, data, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(slug)
        .bind(Value::Object(data))
        .fetch_one(&self.pool)
        .await?;
        content_from_row(&row)
    }

    async fn insert_content_if_absent(&self, slug: &str, data: Map<String, Value>) -> StoreResult<bool> {
        let result = sqlx::query(
            "INSERT INTO content_blocks (id, slug, data) VALUES ($1, $2, $3) \
             ON CONFLICT (slug) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(slug)
        .bind(Value::Object(data))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn replace_content(&self, slug: &str, data: Map<String, Value>) -> StoreResult<Content> {
        let row = sqlx::query(
            "INSERT INTO content_blocks (id, slug, data) VALUES ($1, $2, $3) \
             ON CONFLICT (slug) DO UPDATE SET data = EXCLUDED.data, updated_at = now() \
             RETURNING id, slug, data, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(slug)
        .bind(Value::Object(data))
        .fetch_one(&self.pool)
        .await?;
        content_from_row(&row)
    }
}

#[async_trait]
impl TeamStore for PgStore {
    async fn list_team(&self) -> StoreResult<Vec<TeamMember>> {
        let sql = format!("SELECT {} FROM team_members ORDER BY created_at ASC", TEAM_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        collect(rows, member_from_row)
    }

    async fn find_member(&self, id: Uuid) -> StoreResult<Option<TeamMember>> {
        let sql = format!("SELECT {} FROM team_members WHERE id = $1", TEAM_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(member_from_row).transpose()
    }

    async fn insert_member(&self, m: &TeamMember) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO team_members (id, name, position, description, photo_url, photo_fit, \
             photo_position, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(m.id)
        .bind(&m.name)
        .bind(&m.position)
        .bind(&m.description)
        .bind(&m.photo_url)
        .bind(m.photo_fit.as_str())
        .bind(m.photo_position.as_str())
        .bind(m.created_at)
        .bind(m.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "Team member"))?;
        Ok(())
    }

    async fn save_member(&self, m: &TeamMember) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE team_members SET name = $2, position = $3, description = $4, photo_url = $5, \
             photo_fit = $6, photo_position = $7, updated_at = $8 WHERE id = $1",
        )
        .bind(m.id)
        .bind(&m.name)
        .bind(&m.position)
        .bind(&m.description)
        .bind(&m.photo_url)
        .bind(m.photo_fit.as_str())
        .bind(m.photo_position.as_str())
        .bind(m.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_member(&self, id: Uuid) -> StoreResult<Option<TeamMember>> {
        let sql = format!("DELETE FROM team_members WHERE id = $1 RETURNING {}", TEAM_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(member_from_row).transpose()
    }
}

#[async_trait]
impl GalleryStore for PgStore {
    async fn list_albums(&self) -> StoreResult<Vec<GalleryAlbum>> {
        let sql = format!("SELECT {} FROM gallery_albums ORDER BY created_at DESC", ALBUM_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        collect(rows, album_from_row)
    }

    async fn find_album(&self, id: Uuid) -> StoreResult<Option<GalleryAlbum>> {
        let sql = format!("SELECT {} FROM gallery_albums WHERE id = $1", ALBUM_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(album_from_row).transpose()
    }

    async fn insert_album(&self, a: &GalleryAlbum) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO gallery_albums (id, title, description, cover_url, cover_fit, cover_position, \
             photos, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(a.id)
        .bind(&a.title)
        .bind(&a.description)
        .bind(&a.cover_url)
        .bind(a.cover_fit.as_str())
        .bind(a.cover_position.as_str())
        .bind(&a.photos)
        .bind(a.created_at)
        .bind(a.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "Album"))?;
        Ok(())
    }

    async fn save_album(&self, a: &GalleryAlbum) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE gallery_albums SET title = $2, description = $3, cover_url = $4, cover_fit = $5, \
             cover_position = $6, photos = $7, updated_at = $8 WHERE id = $1",
        )
        .bind(a.id)
        .bind(&a.title)
        .bind(&a.description)
        .bind(&a.cover_url)
        .bind(a.cover_fit.as_str())
        .bind(a.cover_position.as_str())
        .bind(&a.photos)
        .bind(a.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_album(&self, id: Uuid) -> StoreResult<Option<GalleryAlbum>> {
        let sql = format!("DELETE FROM gallery_albums WHERE id = $1 RETURNING {}", ALBUM_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(album_from_row).transpose()
    }
}

#[async_trait]
impl MediaReferences for PgStore {
    async fn is_media_referenced(&self, path: &str) -> StoreResult<bool> {
        let referenced: bool = sqlx::query_scalar(
            "SELECT EXISTS ( \
                 SELECT 1 FROM gallery_albums \
                 WHERE right(lower(cover_url), length($1)) = lower($1) \
                    OR EXISTS (SELECT 1 FROM unnest(photos) AS p \
                               WHERE right(lower(p), length($1)) = lower($1)) \
                 UNION ALL \
                 SELECT 1 FROM team_members WHERE right(lower(photo_url), length($1)) = lower($1) \
                 UNION ALL \
                 SELECT 1 FROM shifts WHERE right(lower(image_url), length($1)) = lower($1) \
             )",
        )
        .bind(path)
        .fetch_one(&self.pool)
        .await?;
        Ok(referenced)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn close(&self) {
        DatabaseManager::close(&self.pool).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_pattern_matches_fragments_literally() {
        assert_eq!(contains_pattern("ива"), "%ива%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
