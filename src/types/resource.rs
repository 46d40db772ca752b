use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The broad category of a resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// A code repository or library.
    Code,

    /// A written article or blog post.
    Article,

    /// A video.
    Video,

    /// A forum or discussion thread.
    Forum,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Code => write!(f, "Code"),
            ResourceKind::Article => write!(f, "Article"),
            ResourceKind::Video => write!(f, "Video"),
            ResourceKind::Forum => write!(f, "Forum"),
        }
    }
}

/// A single catalog entry from the resource listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Stable identifier assigned by the backend.
    pub id: String,

    /// Display title.
    pub title: String,

    /// Canonical URL of the resource.
    pub url: String,

    /// The resource category.
    #[serde(rename = "type")]
    pub kind: ResourceKind,

    /// Short summary, when one has been generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Author or publisher name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Publication timestamp, RFC 3339 on the wire.
    #[serde(default, with = "crate::utils::time::option")]
    pub published_at: Option<OffsetDateTime>,

    /// Why the backend recommends this resource, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_reason: Option<String>,

    /// Concept tags attached to the resource.
    #[serde(default)]
    pub concepts: Vec<String>,

    /// Technology tags attached to the resource.
    #[serde(default)]
    pub tech_stack: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_listing_entry() {
        let json = r#"{
            "id": "res-1",
            "title": "Prompt caching deep dive",
            "url": "https://example.com/caching",
            "type": "Article"
        }"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.kind, ResourceKind::Article);
        assert!(resource.summary.is_none());
        assert!(resource.published_at.is_none());
        assert!(resource.concepts.is_empty());
    }

    #[test]
    fn round_trips_published_at_as_rfc3339() {
        let json = r#"{
            "id": "res-2",
            "title": "agent-kit",
            "url": "https://example.com/agent-kit",
            "type": "Code",
            "published_at": "2025-11-03T09:30:00Z"
        }"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        let back = serde_json::to_value(&resource).unwrap();
        assert_eq!(back["published_at"], "2025-11-03T09:30:00Z");
    }
}
