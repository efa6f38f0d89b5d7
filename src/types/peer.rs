//! Peer and user identity types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric peer identifier. Positive ids are users, negative ids are
/// chats/channels, following the conversation backend's convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId(pub i64);

impl PeerId {
    /// Whether this id refers to a user account rather than a chat/channel.
    pub fn is_user(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse classification of a peer, as reported by the peer metadata manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeerKind {
    User,
    Chat,
    Channel,
    Megagroup,
}

/// Metadata for a peer (user, chat or channel).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerInfo {
    pub id: PeerId,
    pub kind: PeerKind,
    /// Display title (user full name, chat title).
    pub title: String,
    pub username: Option<String>,
    /// Member count, when the backend exposes one for this peer.
    pub participants_count: Option<u32>,
}

/// User-specific metadata, looked up separately from the generic peer record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: PeerId,
    pub first_name: Option<String>,
    /// Phone number without the leading "+".
    pub phone: Option<String>,
}
