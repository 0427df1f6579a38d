//! Badge core errors

use badge_media::NormalizeError;
use badge_storage_traits::StorageError;

use crate::contract::ContractError;
use crate::metadata::MetadataError;

/// Badge core error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Artwork could not be normalized
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    /// Badge fields are invalid
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    /// Upload or download failed
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Contract, indexer or ledger call failed
    #[error(transparent)]
    Contract(#[from] ContractError),
    /// JSON encoding failed
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the user should fix their input rather than try again later
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::Normalize(e) => e.is_input_error(),
            Self::Metadata(_) => true,
            Self::Storage(_) | Self::Contract(_) | Self::Json(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors() {
        let decode: Error = NormalizeError::Decode {
            reason: "empty".to_string(),
        }
        .into();
        assert!(decode.is_user_error());
        assert_eq!(decode.to_string(), "Failed to decode image: empty");

        let empty_name: Error = MetadataError::EmptyName.into();
        assert!(empty_name.is_user_error());

        let storage: Error = StorageError::Transport("offline".to_string()).into();
        assert!(!storage.is_user_error());
    }
}
