use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

const BLOB_SCHEME: &str = "blob:posterkit/";

#[derive(Debug, Default)]
struct Slots {
    next_id: u64,
    blobs: HashMap<u64, Arc<[u8]>>,
}

/// Registry of temporary in-memory byte handles, addressed by `blob:` URLs.
///
/// Every registered blob stays alive until its [`BlobUrl`] is dropped or revoked, so the number of
/// live entries is the number of outstanding handles.
#[derive(Clone, Debug, Default)]
pub struct BlobRegistry {
    slots: Arc<Mutex<Slots>>,
}

impl BlobRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes and return the owning handle.
    pub fn register(&self, bytes: impl Into<Arc<[u8]>>) -> BlobUrl {
        let mut slots = self.lock();
        let id = slots.next_id;
        slots.next_id += 1;
        slots.blobs.insert(id, bytes.into());
        tracing::trace!(id, live = slots.blobs.len(), "blob registered");
        BlobUrl {
            id,
            url: format!("{BLOB_SCHEME}{id}"),
            registry: self.clone(),
        }
    }

    /// Resolve a `blob:` URL to its bytes, if it is still live.
    pub fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        let id: u64 = url.strip_prefix(BLOB_SCHEME)?.parse().ok()?;
        self.lock().blobs.get(&id).cloned()
    }

    /// Number of handles not yet revoked.
    pub fn live_count(&self) -> usize {
        self.lock().blobs.len()
    }

    fn revoke(&self, id: u64) {
        let mut slots = self.lock();
        slots.blobs.remove(&id);
        tracing::trace!(id, live = slots.blobs.len(), "blob revoked");
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Owning handle to a registered blob; revokes the entry on drop.
#[derive(Debug)]
pub struct BlobUrl {
    id: u64,
    url: String,
    registry: BlobRegistry,
}

impl BlobUrl {
    /// The `blob:` URL string.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Bytes behind this handle.
    pub fn bytes(&self) -> Option<Arc<[u8]>> {
        self.registry.resolve(&self.url)
    }

    /// Revoke explicitly; equivalent to dropping the handle.
    pub fn revoke(self) {}
}

impl Drop for BlobUrl {
    fn drop(&mut self) {
        self.registry.revoke(self.id);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/blob.rs"]
mod tests;
