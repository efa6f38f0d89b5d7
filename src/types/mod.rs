pub mod contact;
pub mod dialog;
pub mod events;
pub mod message;
pub mod peer;

pub use contact::ContactMatches;
pub use dialog::{DialogList, DialogRecord, DialogsPage};
pub use events::SidebarEvent;
pub use message::{
    EntityKind, MessageId, MessageRecord, MessageSearchPage, SearchFilter, TextEntity,
    TextWithEntities,
};
pub use peer::{PeerId, PeerInfo, PeerKind, UserInfo};
