//! Badge creation flow
//!
//! Creating a badge is three passthrough steps, run strictly in order:
//! upload the normalized artwork, upload the metadata document that points at
//! it, then mint with the metadata URI. A failing step stops the flow; later
//! steps never see a partial result.

use badge_media::{CropRegion, NormalizeOptions, SourceImage, normalize_to_square};
use badge_storage_traits::{ContentStore, StoredFile, StoredObject};

use crate::contract::{BadgeContract, MintReceipt, MintRequest};
use crate::error::Error;
use crate::metadata::{METADATA_FILENAME, METADATA_MIME_TYPE, NftMetadata};

/// Everything the create form collects
#[derive(Debug, Clone)]
pub struct BadgeDraft {
    /// Artwork as picked by the user
    pub image: SourceImage,
    /// Badge name
    pub name: String,
    /// Badge description
    pub description: String,
    /// Where the badge was issued
    pub location: Option<String>,
    /// Mint to this address instead of the caller's account
    pub recipient: Option<String>,
}

/// Result of uploading artwork and metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedBadge {
    /// Stored artwork
    pub image: StoredObject,
    /// Crop applied to the artwork
    pub crop: CropRegion,
    /// Metadata document as stored
    pub metadata: NftMetadata,
    /// Stored metadata document
    pub metadata_object: StoredObject,
}

impl PublishedBadge {
    /// URI the badge is minted with
    pub fn token_uri(&self) -> &str {
        &self.metadata_object.url
    }
}

/// Result of the full create flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedBadge {
    /// Uploaded artwork and metadata
    pub published: PublishedBadge,
    /// Mint outcome
    pub receipt: MintReceipt,
}

/// Normalizes artwork and uploads it together with its metadata
#[derive(Debug)]
pub struct BadgePublisher<S> {
    store: S,
    options: NormalizeOptions,
}

impl<S> BadgePublisher<S>
where
    S: ContentStore,
{
    /// Create a publisher that uploads to `store`
    pub fn new(store: S, options: NormalizeOptions) -> Self {
        Self { store, options }
    }

    /// The store uploads go to
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Normalize the draft's artwork, then upload it and its metadata
    ///
    /// Badge fields are validated before anything is uploaded.
    pub async fn publish(&self, draft: &BadgeDraft) -> Result<PublishedBadge, Error> {
        let mut metadata = NftMetadata::new(
            &draft.name,
            &draft.description,
            String::new(),
            draft.location.as_deref(),
        )?;

        let artwork = normalize_to_square(&draft.image, &self.options)?;
        let crop = artwork.crop;
        tracing::info!(
            filename = %artwork.filename,
            side = artwork.side,
            bytes = artwork.data.len(),
            "uploading badge artwork"
        );

        let mime_type = artwork.mime_type();
        let image = self
            .store
            .put(StoredFile::new(artwork.filename, mime_type, artwork.data))
            .await?;
        metadata.image = image.url.clone();

        let metadata_object = self
            .store
            .put(StoredFile::new(
                METADATA_FILENAME,
                METADATA_MIME_TYPE,
                metadata.to_json_bytes()?,
            ))
            .await?;
        tracing::info!(
            image = %image.url,
            token_uri = %metadata_object.url,
            "published badge metadata"
        );

        Ok(PublishedBadge {
            image,
            crop,
            metadata,
            metadata_object,
        })
    }
}

/// Publishes a badge and mints it
#[derive(Debug)]
pub struct BadgeCreator<S, C> {
    publisher: BadgePublisher<S>,
    contract: C,
}

impl<S, C> BadgeCreator<S, C>
where
    S: ContentStore,
    C: BadgeContract,
{
    /// Create a badge creator from its collaborators
    pub fn new(publisher: BadgePublisher<S>, contract: C) -> Self {
        Self {
            publisher,
            contract,
        }
    }

    /// The publisher used for uploads
    pub fn publisher(&self) -> &BadgePublisher<S> {
        &self.publisher
    }

    /// Upload artwork and metadata, then mint with the metadata URI
    pub async fn create(&self, draft: &BadgeDraft) -> Result<CreatedBadge, Error> {
        let published = self.publisher.publish(draft).await?;

        let receipt = self
            .contract
            .mint(MintRequest {
                token_uri: published.token_uri().to_string(),
                recipient: draft.recipient.clone(),
            })
            .await?;
        tracing::info!(
            tx = %receipt.transaction_hash,
            token_id = ?receipt.token_id,
            "minted badge"
        );

        Ok(CreatedBadge { published, receipt })
    }
}
