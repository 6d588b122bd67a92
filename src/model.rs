//! Resources read from App Store Connect JSON:API documents.

use serde_json::Value;

use crate::error::ResolutionError;
use crate::util::{resource_attribute, resource_id};

/// A marketing version (e.g. `1.2.3`) grouping builds submitted for testing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreReleaseVersion {
    pub id: String,
    pub version: String,
}

impl PreReleaseVersion {
    pub fn from_resource(resource: &Value) -> Result<Self, ResolutionError> {
        let id = resource_id(resource).ok_or(ResolutionError::MissingField { field: "id" })?;
        let version = resource_attribute(resource, "version")
            .ok_or(ResolutionError::MissingField { field: "attributes.version" })?;
        Ok(Self {
            id: id.to_string(),
            version: version.to_string(),
        })
    }
}

/// An uploaded binary. `version` holds the build number as a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRecord {
    pub id: String,
    pub version: String,
}

impl BuildRecord {
    pub fn from_resource(resource: &Value) -> Result<Self, ResolutionError> {
        let version = resource_attribute(resource, "version")
            .ok_or(ResolutionError::MissingField { field: "attributes.version" })?;
        Ok(Self {
            id: resource_id(resource).unwrap_or_default().to_string(),
            version: version.to_string(),
        })
    }

    pub fn build_number(&self) -> Result<u64, ResolutionError> {
        self.version
            .trim()
            .parse::<u64>()
            .map_err(|_| ResolutionError::InvalidBuildNumber {
                value: self.version.clone(),
            })
    }
}
