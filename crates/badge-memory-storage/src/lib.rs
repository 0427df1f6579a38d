//! Memory-based content store.
//!
//! Implements [`ContentStore`] on top of a bounded LRU map. Nothing is
//! persisted; the store is meant for tests, dry runs and previews.
//!
//! ```rust
//! use badge_memory_storage::{MemoryContentStore, MemoryStoreLimits};
//!
//! let limits = MemoryStoreLimits::default()
//!     .with_capacity(16)
//!     .with_max_file_size(1024 * 1024);
//! let store = MemoryContentStore::with_limits(limits);
//! assert!(store.is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use std::num::NonZeroUsize;

use badge_storage_traits::{
    Backend, ContentId, ContentStore, StorageError, StoredFile, StoredObject,
};
use lru::LruCache;
use parking_lot::Mutex;

/// Default number of objects kept before the least recently used is evicted
pub const DEFAULT_CAPACITY: usize = 1000;

/// Default maximum size of a single object (32MB)
pub const DEFAULT_MAX_FILE_SIZE: usize = 32 * 1024 * 1024;

/// URL scheme used for objects held by this store
pub const MEMORY_URL_SCHEME: &str = "memory";

/// Limits for the memory store
#[derive(Debug, Clone, Copy)]
pub struct MemoryStoreLimits {
    /// Maximum number of stored objects
    pub capacity: usize,
    /// Maximum size of a single object in bytes
    pub max_file_size: usize,
}

impl Default for MemoryStoreLimits {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl MemoryStoreLimits {
    /// Set the object capacity (values below 1 are raised to 1)
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Set the per-object size limit
    pub fn with_max_file_size(mut self, max_file_size: usize) -> Self {
        self.max_file_size = max_file_size;
        self
    }
}

#[derive(Debug, Clone)]
struct MemoryObject {
    name: String,
    mime_type: String,
    data: Vec<u8>,
}

impl MemoryObject {
    fn descriptor(&self, id: &ContentId) -> StoredObject {
        StoredObject {
            id: id.clone(),
            url: MemoryContentStore::url_for(id, &self.name),
            size: self.data.len() as u64,
            mime_type: self.mime_type.clone(),
        }
    }
}

/// In-memory [`ContentStore`]
pub struct MemoryContentStore {
    objects: Mutex<LruCache<ContentId, MemoryObject>>,
    limits: MemoryStoreLimits,
}

impl std::fmt::Debug for MemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryContentStore")
            .field("len", &self.len())
            .field("limits", &self.limits)
            .finish()
    }
}

impl Default for MemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryContentStore {
    /// Create a store with default limits
    pub fn new() -> Self {
        Self::with_limits(MemoryStoreLimits::default())
    }

    /// Create a store with custom limits
    pub fn with_limits(limits: MemoryStoreLimits) -> Self {
        let capacity = NonZeroUsize::new(limits.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            objects: Mutex::new(LruCache::new(capacity)),
            limits,
        }
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    /// Whether the store holds no objects
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// URL for an object held by this store
    pub fn url_for(id: &ContentId, name: &str) -> String {
        format!("{MEMORY_URL_SCHEME}://{id}/{name}")
    }

    fn store(&self, file: StoredFile) -> Result<StoredObject, StorageError> {
        if file.data.is_empty() {
            return Err(StorageError::EmptyFile(file.name));
        }
        if file.data.len() > self.limits.max_file_size {
            return Err(StorageError::FileTooLarge {
                size: file.data.len(),
                max_size: self.limits.max_file_size,
            });
        }

        let id = file.content_id();
        let mut objects = self.objects.lock();
        // Known bytes keep the name they were first stored under
        if let Some(existing) = objects.get(&id) {
            return Ok(existing.descriptor(&id));
        }

        let object = MemoryObject {
            name: file.name,
            mime_type: file.mime_type,
            data: file.data,
        };
        let descriptor = object.descriptor(&id);
        if let Some((evicted, _)) = objects.push(id, object) {
            tracing::debug!(%evicted, "memory store evicted object");
        }

        Ok(descriptor)
    }
}

impl ContentStore for MemoryContentStore {
    fn backend(&self) -> Backend {
        Backend::Memory
    }

    async fn put(&self, file: StoredFile) -> Result<StoredObject, StorageError> {
        self.store(file)
    }

    async fn get(&self, id: &ContentId) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.objects.lock().get(id).map(|object| object.data.clone()))
    }
}
