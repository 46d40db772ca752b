use serde::{Deserialize, Serialize};

use crate::types::ResourceKind;

/// Query parameters for the resource listing endpoint.
///
/// Unset fields are omitted from the query string entirely; the backend
/// treats a missing parameter and an absent filter the same way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceFilters {
    /// Number of entries to skip, for paging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,

    /// Maximum number of entries to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Restrict to a single resource category.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ResourceKind>,

    /// Restrict to resources carrying a concept or technology tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Full-text search over titles and summaries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ResourceFilters {
    /// Filters that match everything, with backend default paging.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to a resource category.
    pub fn with_kind(mut self, kind: ResourceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restrict to a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Search titles and summaries.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Page through results.
    pub fn with_page(mut self, skip: u32, limit: u32) -> Self {
        self.skip = Some(skip);
        self.limit = Some(limit);
        self
    }
}
