//! Wire types for the resource catalog API.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lineup::ChannelAttributes;

/// Entity type of operator entities.
pub const OPCO_ENTITY_TYPE: &str = "opco";
/// Entity type of channel entities.
pub const CHANNEL_ENTITY_TYPE: &str = "channel";
/// Edge type linking an operator to its channels.
pub const CONTAINS_EDGE_TYPE: &str = "contains";

/// Bearer token returned by the token exchange.
///
/// May be empty when the run continues after a failed exchange.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Token that authenticates nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value of the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("AuthToken(<empty>)")
        } else {
            f.write_str("AuthToken(<redacted>)")
        }
    }
}

/// Body of the token exchange request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenRequest {
    pub username: String,
    pub api_key: String,
}

/// Body of the token exchange response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Match tokens: operators send a bare string, channels a list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MatchTokens {
    Single(String),
    Many(Vec<String>),
}

/// Create-or-update request for one catalog entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntityUpsert {
    pub unique_id: String,
    pub entity_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub match_tokens: MatchTokens,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_type: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_number: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opco: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epg_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl EntityUpsert {
    /// Operator entity, keyed by its code.
    pub fn operator(code: &str) -> Self {
        Self {
            unique_id: code.to_string(),
            entity_types: vec![OPCO_ENTITY_TYPE.to_string()],
            name: Some(code.to_string()),
            match_tokens: MatchTokens::Single(code.to_string()),
            channel_type: None,
            type_description: None,
            channel_number: None,
            opco: None,
            epg_id: None,
            tags: Vec::new(),
        }
    }

    /// Channel entity owned by operator `code`.
    pub fn channel(code: &str, channel_id: &str, attributes: &ChannelAttributes) -> Self {
        let name = attributes.name();
        let unique_id = channel_unique_id(code, channel_id, &attributes.name_segment());
        let scoped_id = format!("{}_{}", code, channel_id);

        Self {
            match_tokens: MatchTokens::Many(vec![unique_id.clone(), scoped_id.clone()]),
            unique_id,
            entity_types: vec![CHANNEL_ENTITY_TYPE.to_string()],
            name,
            channel_type: attributes.channel_type().cloned(),
            type_description: attributes.type_description().cloned(),
            channel_number: attributes.channel_number().cloned(),
            opco: Some(code.to_string()),
            epg_id: Some(channel_id.to_string()),
            tags: vec![channel_id.to_string(), code.to_string(), scoped_id],
        }
    }
}

/// Unique ID of a channel entity: `{operator}_{channelId}_{channelName}`.
///
/// The name is part of the identity, so a renamed channel becomes a new
/// entity in the catalog. See [`ChannelAttributes::name_segment`] for
/// channels without a name.
pub fn channel_unique_id(code: &str, channel_id: &str, name_segment: &str) -> String {
    format!("{}_{}_{}", code, channel_id, name_segment)
}

/// Directed, typed edge between two entities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationshipEdge {
    #[serde(rename = "_fromUniqueId")]
    pub from_unique_id: String,
    #[serde(rename = "_toUniqueId")]
    pub to_unique_id: String,
    #[serde(rename = "_edgeType")]
    pub edge_type: String,
}

impl RelationshipEdge {
    /// `contains` edge from an operator to one of its channels.
    pub fn contains(from: &str, to: &str) -> Self {
        Self {
            from_unique_id: from.to_string(),
            to_unique_id: to.to_string(),
            edge_type: CONTAINS_EDGE_TYPE.to_string(),
        }
    }
}
