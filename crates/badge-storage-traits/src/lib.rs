//! Badge storage - the content-addressed storage interface used to publish
//! badge artwork and metadata.
//!
//! A [`ContentStore`] is constructed by the caller and handed to whatever
//! needs to upload; nothing in the badge crates creates one implicitly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use std::future::Future;

use serde::{Deserialize, Serialize};

pub mod content_id;
pub mod error;

pub use content_id::ContentId;
pub use error::StorageError;

/// Backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Memory
    Memory,
    /// Remote HTTP store
    Http,
}

/// A file handed to a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Filename the store should record
    pub name: String,
    /// Media type of `data`
    pub mime_type: String,
    /// File contents
    pub data: Vec<u8>,
}

impl StoredFile {
    /// Create a new file
    pub fn new<N, M>(name: N, mime_type: M, data: Vec<u8>) -> Self
    where
        N: Into<String>,
        M: Into<String>,
    {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Content id of the file's bytes
    pub fn content_id(&self) -> ContentId {
        ContentId::for_data(&self.data)
    }
}

/// Descriptor returned by a store once a file is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Content id of the stored bytes
    pub id: ContentId,
    /// URL the object can be retrieved from
    pub url: String,
    /// Size in bytes
    pub size: u64,
    /// Media type recorded by the store
    pub mime_type: String,
}

/// Content-addressed storage client
///
/// Implementations must be safe to share across tasks. `put` is idempotent:
/// storing the same bytes twice yields the same [`ContentId`].
pub trait ContentStore: Send + Sync {
    /// Returns the backend type.
    fn backend(&self) -> Backend;

    /// Store a file and return its descriptor.
    fn put(&self, file: StoredFile)
    -> impl Future<Output = Result<StoredObject, StorageError>> + Send;

    /// Fetch the bytes stored under `id`, or `None` if the store has no such object.
    fn get(
        &self,
        id: &ContentId,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, StorageError>> + Send;
}
