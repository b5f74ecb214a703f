use tracing::info;

use super::models::content::{default_home, HOME_SLUG};
use super::models::Shift;
use super::store::{Store, StoreResult};

/// What a reconcile pass created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub shift_created: bool,
    pub home_created: bool,
}

/// Starter shift shown on an empty site.
pub fn starter_shift() -> Shift {
    let mut shift = Shift::new("Зимняя смена «Снежный код»");
    shift.dates = "03.01.2026 – 09.01.2026".to_string();
    shift
}

/// Brings required records into existence. Safe to run on every start:
/// nothing is created when it already exists.
pub async fn reconcile(store: &dyn Store) -> StoreResult<SeedReport> {
    let mut report = SeedReport::default();

    if !store.any_shift_exists().await? {
        store.insert_shift(&starter_shift()).await?;
        report.shift_created = true;
        info!("Seeded starter shift");
    }

    if store.insert_content_if_absent(HOME_SLUG, default_home()).await? {
        report.home_created = true;
        info!("Seeded home content");
    }

    Ok(report)
}

/// Overwrites the home document with defaults (`novator seed --force`).
pub async fn reset_home(store: &dyn Store) -> StoreResult<()> {
    store.replace_content(HOME_SLUG, default_home()).await?;
    info!("Home content reset to defaults");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::database::{ContentStore, ShiftStore};

    #[tokio::test]
    async fn reconcile_is_idempotent() {
        let store = MemoryStore::new();

        let first = reconcile(&store).await.unwrap();
        assert_eq!(first, SeedReport { shift_created: true, home_created: true });

        let second = reconcile(&store).await.unwrap();
        assert_eq!(second, SeedReport::default());
        assert_eq!(store.list_shifts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reset_home_discards_edits() {
        let store = MemoryStore::new();
        reconcile(&store).await.unwrap();

        let mut edit = serde_json::Map::new();
        edit.insert("custom".into(), serde_json::json!(true));
        store.upsert_content(HOME_SLUG, edit).await.unwrap();

        reset_home(&store).await.unwrap();
        let home = store.find_content(HOME_SLUG).await.unwrap().unwrap();
        assert!(!home.data.contains_key("custom"));
        assert!(home.data.contains_key("hero"));
    }
}
