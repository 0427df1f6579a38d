//! Touch Badge creation flow
//!
//! Ties artwork normalization, content storage and minting together:
//!
//! 1. [`BadgePublisher::publish`] squares the artwork, uploads it, then uploads
//!    the [`NftMetadata`] document that references it.
//! 2. [`BadgeCreator::create`] additionally mints through a [`BadgeContract`]
//!    using the metadata URI.
//! 3. [`load_dashboard`] reads what an account owns.
//!
//! Storage is pluggable through [`ContentStore`]; [`HttpContentStore`] talks
//! to a Blossom-style blob server.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod contract;
mod dashboard;
mod error;
mod http_store;
pub mod metadata;
mod publish;

pub use badge_storage_traits::{ContentStore, StoredObject};
pub use contract::{
    BadgeContract, BadgeIndexer, ContractError, MintReceipt, MintRequest, OwnedBadge,
    TokenBalance, TokenLedger,
};
pub use dashboard::{Dashboard, load_dashboard};
pub use error::Error;
pub use http_store::{DEFAULT_TIMEOUT, HttpContentStore, HttpStoreConfig};
pub use metadata::{MetadataError, NftMetadata};
pub use publish::{BadgeCreator, BadgeDraft, BadgePublisher, CreatedBadge, PublishedBadge};
