//! Render collaborator contract.
//!
//! The controller decides what appears where; a [`SidebarRenderer`] owns the
//! actual widgets. All methods are synchronous and must be cheap: they run on
//! the controller's task between awaits. Group-directed calls arrive with the
//! controller's session state locked, so implementations must not call back
//! into the controller.

use crate::types::{DialogList, DialogRecord, MessageRecord};

/// The four fixed search result groups, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchGroupId {
    /// Own contacts and existing chats matching the query.
    Contacts,
    /// Publicly resolvable peers (username matches).
    GlobalContacts,
    /// Message matches across all dialogs.
    GlobalMessages,
    /// Message matches scoped to one peer.
    PrivateMessages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Contacts,
    Messages,
}

impl SearchGroupId {
    pub const ALL: [SearchGroupId; 4] = [
        SearchGroupId::Contacts,
        SearchGroupId::GlobalContacts,
        SearchGroupId::GlobalMessages,
        SearchGroupId::PrivateMessages,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SearchGroupId::Contacts => "Contacts and Chats",
            SearchGroupId::GlobalContacts => "Global Search",
            SearchGroupId::GlobalMessages => "Global Search",
            SearchGroupId::PrivateMessages => "Private Search",
        }
    }

    pub fn kind(&self) -> GroupKind {
        match self {
            SearchGroupId::Contacts | SearchGroupId::GlobalContacts => GroupKind::Contacts,
            SearchGroupId::GlobalMessages | SearchGroupId::PrivateMessages => GroupKind::Messages,
        }
    }
}

/// Where a dialog entry is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    List(DialogList),
    Group(SearchGroupId),
}

/// Presentation hints for a new dialog entry.
#[derive(Debug, Clone, Copy)]
pub struct DialogEntryFlags {
    /// Entries in transient containers (search groups) skip the press ripple.
    pub ripple: bool,
}

impl Default for DialogEntryFlags {
    fn default() -> Self {
        Self { ripple: true }
    }
}

/// Opaque handle to a rendered dialog entry, allocated by the renderer and
/// passed back for follow-up updates to the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderedDialog(pub u64);

pub trait SidebarRenderer: Send + Sync {
    /// Append a dialog entry to a list or group.
    fn add_dialog(
        &self,
        dialog: &DialogRecord,
        target: RenderTarget,
        flags: DialogEntryFlags,
    ) -> RenderedDialog;

    /// Fill the entry's preview line from a message record.
    fn set_last_message(
        &self,
        dialog: &DialogRecord,
        message: &MessageRecord,
        rendered: RenderedDialog,
    );

    /// Replace the entry's caption line (member count, username, phone).
    fn set_caption(&self, rendered: RenderedDialog, caption: &str);

    /// Show or hide a search group's section.
    fn set_group_visible(&self, group: SearchGroupId, visible: bool);

    /// Remove all entries from a group and hide its section.
    fn clear_group(&self, group: SearchGroupId);

    /// Toggle a dialog list's loading indicator.
    fn set_list_loading(&self, list: DialogList, loading: bool);
}
