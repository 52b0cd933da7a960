//! CKAN request payloads
//!
//! Fields that have no source value are left out of the JSON entirely.

use serde::Serialize;

use crate::extras::Extras;

/// A `{"name": ...}` reference, used for groups and tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Named {
    pub name: String,
}

impl Named {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Body of a `package_create` call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Package {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_id: Option<String>,
    pub owner_org: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Named>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Named>,
    pub extras: Extras,
}

/// Body of a `resource_create` call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resource {
    pub package_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(
        rename = "licenseAttributionByText",
        skip_serializing_if = "Option::is_none"
    )]
    pub license_attribution_by_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}
