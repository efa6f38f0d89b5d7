//! Data-manager traits the sidebar coordinates against.
//!
//! The sidebar never talks to a server or a cache directly; the embedding
//! application supplies these collaborators. Async methods hit the network,
//! plain methods are synchronous cache lookups.

pub mod error;

pub use error::{ManagerError, Result};

use crate::types::{
    ContactMatches, DialogRecord, DialogsPage, MessageId, MessageRecord, MessageSearchPage, PeerId,
    PeerInfo, SearchFilter, TextWithEntities, UserInfo,
};
use async_trait::async_trait;
use futures_util::future::BoxFuture;

#[async_trait]
pub trait MessageManager: Send + Sync {
    /// Fetch one page of the conversation list. `offset_index` is the order
    /// index of the last dialog already loaded (0 for the first page).
    async fn get_conversations(
        &self,
        filter: &str,
        offset_index: i64,
        limit: usize,
        archived: bool,
    ) -> Result<DialogsPage>;

    /// Search messages. `peer` scopes the search to one dialog; `None` is a
    /// global search. `max_id` is the newest-already-seen cursor (`None` to
    /// start from the latest match) and `offset_rate` the server continuation
    /// token from the previous page.
    async fn get_search(
        &self,
        peer: Option<PeerId>,
        query: &str,
        filter: Option<SearchFilter>,
        max_id: Option<MessageId>,
        limit: usize,
        offset_rate: u32,
    ) -> Result<MessageSearchPage>;

    /// Cache lookup for a message returned in a search history page.
    fn get_message(&self, id: MessageId) -> Option<MessageRecord>;

    /// Cache lookup for the dialog of a peer, if one exists.
    fn get_dialog_by_peer(&self, peer: PeerId) -> Option<DialogRecord>;
}

#[async_trait]
pub trait UserManager: Send + Sync {
    /// Match contacts and public peers against a name/username query.
    async fn search_contacts(&self, query: &str, limit: usize) -> Result<ContactMatches>;

    /// Cache lookup for user metadata (phone number, name).
    fn get_user(&self, id: PeerId) -> Option<UserInfo>;
}

pub trait PeerManager: Send + Sync {
    fn get_peer(&self, id: PeerId) -> Option<PeerInfo>;
    fn get_username(&self, id: PeerId) -> Option<String>;
    /// Channel-backed peer. True for broadcast channels and megagroups both;
    /// combine with [`is_megagroup`](Self::is_megagroup) to tell them apart.
    fn is_channel(&self, id: PeerId) -> bool;
    fn is_megagroup(&self, id: PeerId) -> bool;
}

/// Two-phase translation result. `cached` is known as soon as the request is
/// acknowledged; `result` resolves once the text is actually available
/// (immediately for cache hits).
pub struct AckedTranslation {
    pub cached: bool,
    pub result: BoxFuture<'static, Result<Option<TextWithEntities>>>,
}

impl AckedTranslation {
    /// An already-resolved translation, for cache-backed implementations.
    pub fn ready(cached: bool, text: Option<TextWithEntities>) -> Self {
        Self {
            cached,
            result: Box::pin(futures_util::future::ready(Ok(text))),
        }
    }
}

#[async_trait]
pub trait Translator: Send + Sync {
    /// Request a translation of one message. With `only_cache`, the
    /// implementation must not hit the network and reports a miss as an
    /// uncached result resolving to `None`.
    async fn translate(
        &self,
        peer: PeerId,
        message: MessageId,
        to_lang: &str,
        only_cache: bool,
    ) -> Result<AckedTranslation>;
}

/// Everything the sidebar needs from the data layer, as one object.
pub trait Managers: MessageManager + UserManager + PeerManager + Send + Sync {}

impl<T> Managers for T where T: MessageManager + UserManager + PeerManager + Send + Sync {}
