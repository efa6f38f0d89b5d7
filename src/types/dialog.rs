//! Dialog list types

use crate::types::message::MessageId;
use crate::types::peer::PeerId;
use serde::{Deserialize, Serialize};

/// Which dialog list a fetch or render targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialogList {
    Chats,
    Archived,
}

impl DialogList {
    pub fn is_archived(&self) -> bool {
        matches!(self, DialogList::Archived)
    }
}

/// A conversation entry as held by the dialog cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogRecord {
    pub peer_id: PeerId,
    /// Server-assigned ordering index; doubles as the pagination offset for
    /// the page that follows this dialog.
    pub index: i64,
    pub top_message: Option<MessageId>,
    pub unread_count: u32,
    pub pinned: bool,
}

impl DialogRecord {
    /// A bare record for a peer that has no dialog yet. Search results can
    /// reference users the account never talked to; rendering such a result
    /// still needs a dialog-shaped record.
    pub fn placeholder(peer_id: PeerId) -> Self {
        Self {
            peer_id,
            index: 0,
            top_message: None,
            unread_count: 0,
            pinned: false,
        }
    }
}

/// One page of a conversation-list fetch, in server order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogsPage {
    pub dialogs: Vec<DialogRecord>,
    /// Total dialog count for the list, when the server reports one.
    pub count: Option<u32>,
}
