//! NFT metadata for a Touch Badge
//!
//! The JSON document stored next to the artwork and referenced by the token
//! URI. Field names follow the common ERC-721 metadata layout.

use serde::{Deserialize, Serialize};

/// Maximum length of a badge name in bytes
pub const MAX_NAME_LENGTH: usize = 256;

/// Maximum length of a badge description in bytes
pub const MAX_DESCRIPTION_LENGTH: usize = 4096;

/// Maximum length of a location in bytes
pub const MAX_LOCATION_LENGTH: usize = 256;

/// Filename the metadata document is stored under
pub const METADATA_FILENAME: &str = "metadata.json";

/// Media type of the metadata document
pub const METADATA_MIME_TYPE: &str = "application/json";

/// Badge metadata validation errors
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    /// Name is empty or whitespace
    #[error("Badge name cannot be empty")]
    EmptyName,
    /// A field is longer than allowed
    #[error("Badge {field} length {length} exceeds maximum {max_length}")]
    FieldTooLong {
        /// Field name
        field: &'static str,
        /// The actual length in bytes
        length: usize,
        /// The maximum length in bytes
        max_length: usize,
    },
}

/// Extra badge properties
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeProperties {
    /// Where the badge was issued
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Metadata document for a single badge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftMetadata {
    /// Badge name
    pub name: String,
    /// Badge description
    pub description: String,
    /// Reference to the artwork
    pub image: String,
    /// Extra properties
    #[serde(default)]
    pub properties: BadgeProperties,
}

impl NftMetadata {
    /// Build metadata from user input, trimming and validating every field
    ///
    /// An empty location is treated as absent.
    pub fn new(
        name: &str,
        description: &str,
        image: impl Into<String>,
        location: Option<&str>,
    ) -> Result<Self, MetadataError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MetadataError::EmptyName);
        }
        check_length("name", name, MAX_NAME_LENGTH)?;

        let description = description.trim();
        check_length("description", description, MAX_DESCRIPTION_LENGTH)?;

        let location = location.map(str::trim).filter(|l| !l.is_empty());
        if let Some(location) = location {
            check_length("location", location, MAX_LOCATION_LENGTH)?;
        }

        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            image: image.into(),
            properties: BadgeProperties {
                location: location.map(str::to_string),
            },
        })
    }

    /// Serialize to the JSON bytes that get stored
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }
}

fn check_length(field: &'static str, value: &str, max_length: usize) -> Result<(), MetadataError> {
    if value.len() > max_length {
        return Err(MetadataError::FieldTooLong {
            field,
            length: value.len(),
            max_length,
        });
    }
    Ok(())
}
