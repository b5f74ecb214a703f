use std::collections::HashSet;
use std::io::ErrorKind;
use std::sync::Arc;

use tracing::{info, warn};

use super::{normalize_media_path, Uploads};
use crate::database::Store;

/// Removes uploaded files that no record points at any more.
///
/// Call it after the record change is saved: the reference check reads the
/// current state of gallery, team and shift records.
#[derive(Clone)]
pub struct MediaCleaner {
    store: Arc<dyn Store>,
    uploads: Uploads,
}

impl MediaCleaner {
    pub fn new(store: Arc<dyn Store>, uploads: Uploads) -> Self {
        Self { store, uploads }
    }

    /// Plain file name inside the upload directory for `path`, if it is one.
    fn upload_file_name<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.uploads.url_path())?.strip_prefix('/')?;
        let plain = !rest.is_empty() && rest != "." && rest != ".." && !rest.contains('/');
        plain.then_some(rest)
    }

    /// Best-effort: failures are logged, never returned. Returns how many
    /// files were removed.
    pub async fn delete_if_unused<I, S>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut removed = 0;

        for raw in urls {
            let path = normalize_media_path(raw.as_ref());
            if path.is_empty() || !seen.insert(path.clone()) {
                continue;
            }
            let Some(file_name) = self.upload_file_name(&path) else {
                continue;
            };

            match self.store.is_media_referenced(&path).await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    warn!("Skipping cleanup of {}: reference check failed: {}", path, e);
                    continue;
                }
            }

            let target = self.uploads.dir().join(file_name);
            match tokio::fs::remove_file(&target).await {
                Ok(()) => {
                    info!("Deleted unused media {}", target.display());
                    removed += 1;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to delete unused media at {}: {}", target.display(), e),
            }
        }

        removed
    }
}
