//! Message types and search result pages

use crate::types::peer::PeerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric message identifier. Within a peer, a larger id is a more recent
/// message; search history pages carry ids newest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message as held by the message cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: MessageId,
    /// The dialog this message belongs to.
    pub peer_id: PeerId,
    /// Sender, when distinct from the dialog peer (group messages).
    pub from_id: Option<PeerId>,
    pub text: String,
    pub date: DateTime<Utc>,
}

/// One page of message search results. The full records for `history` ids are
/// expected to be in the message cache by the time the page is returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSearchPage {
    /// Total number of matches known to the server.
    pub count: u32,
    pub history: Vec<MessageId>,
    /// Continuation token for the next page of a global search.
    pub next_rate: Option<u32>,
}

/// Server-side content filter for message searches. Opaque to the sidebar:
/// passed through to the search backend, never interpreted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchFilter {
    Photos,
    Video,
    Links,
    Documents,
    Music,
    Voice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Bold,
    Italic,
    Code,
    Link,
    Mention,
}

/// A span of rich-text formatting within a message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEntity {
    pub offset: usize,
    pub length: usize,
    pub kind: EntityKind,
}

/// Message text together with its formatting entities. Entities ride along
/// untouched; rendering rich content is the presentation layer's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextWithEntities {
    pub text: String,
    pub entities: Vec<TextEntity>,
}

impl TextWithEntities {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            entities: Vec::new(),
        }
    }
}
