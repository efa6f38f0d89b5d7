//! The sidebar controller.
//!
//! One [`Sidebar`] owns the coordination state for both dialog lists and the
//! search panel: pagination cursors, the search session, group activation and
//! the in-flight guards. It talks to the data layer through the manager
//! traits, pushes widget changes through a [`SidebarRenderer`] and emits
//! chrome intents as [`SidebarEvent`]s.
//!
//! Behavior is split across the sibling modules: `dialogs` for list
//! pagination, `search` for the session lifecycle and result merging,
//! `groups` for group bookkeeping.

mod dialogs;
mod groups;
mod search;

pub use search::SearchSessionSnapshot;

use crate::config::SidebarConfig;
use crate::manager::{Managers, MessageManager, PeerManager, UserManager};
use crate::render::{SearchGroupId, SidebarRenderer};
use crate::types::{PeerId, SidebarEvent};
use anyhow::anyhow;
use search::{SearchFlight, SearchState};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, watch};

/// Lock a state mutex, recovering the data if a previous holder panicked.
/// Guards here are never held across an await, so recovered data is never
/// mid-update.
pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Viewport information the presentation layer attaches to a scroll event.
#[derive(Debug, Clone, Default)]
pub struct ScrollProbe {
    /// Entries already rendered but still below the fold. Non-zero means
    /// there is buffered content to scroll through before fetching more.
    pub hidden_below: usize,
    /// Visibility flags for the list's trailing entries, in list order (the
    /// last flag is the bottommost entry). Supplying more than the configured
    /// lookback window is fine; only the tail of it is considered.
    pub tail_visible: Vec<bool>,
}

impl ScrollProbe {
    /// Whether any of the last `lookback` entries is visible.
    pub fn tail_hit(&self, lookback: usize) -> bool {
        self.tail_visible.iter().rev().take(lookback).any(|v| *v)
    }
}

pub struct Sidebar {
    pub(crate) messages: Arc<dyn MessageManager>,
    pub(crate) users: Arc<dyn UserManager>,
    pub(crate) peers: Arc<dyn PeerManager>,
    pub(crate) renderer: Arc<dyn SidebarRenderer>,
    pub(crate) config: SidebarConfig,

    pub(crate) event_tx: mpsc::UnboundedSender<SidebarEvent>,

    /// Pagination offsets: order index of the last dialog received per list,
    /// 0 before the first page. Never reset within a session.
    pub(crate) chats_offset: AtomicI64,
    pub(crate) archived_offset: AtomicI64,

    /// Outstanding-request marker for conversation-list fetches. Both lists
    /// share it; a second trigger joins the stored channel instead of
    /// issuing another request.
    pub(crate) dialog_fetch: Mutex<Option<watch::Receiver<bool>>>,

    /// Search session state: query, cursors, counters, group bookkeeping.
    pub(crate) search: Mutex<SearchState>,

    /// Session generation, bumped at every session boundary (input change,
    /// back). Fetches capture it at issuance; a mismatch at response time
    /// marks the response stale.
    pub(crate) search_generation: AtomicU64,

    /// Outstanding-request marker for the message-search fetch, tagged with
    /// the generation it was issued under.
    pub(crate) search_fetch: Mutex<Option<SearchFlight>>,

    /// Debounce flag: set while a scroll-triggered continuation timer is
    /// pending.
    pub(crate) search_timer_pending: AtomicBool,
}

impl Sidebar {
    pub fn builder() -> SidebarBuilder {
        SidebarBuilder::default()
    }

    pub fn config(&self) -> &SidebarConfig {
        &self.config
    }

    /// Focus the search input, optionally scoping the coming search to one
    /// peer. The focus intent round-trips through the presentation layer,
    /// which reports back via [`on_search_focus`](Self::on_search_focus).
    pub fn begin_search(&self, peer: Option<PeerId>) {
        if let Some(peer_id) = peer {
            lock_unpoisoned(&self.search).peer_target = Some(peer_id);
        }
        let _ = self.event_tx.send(SidebarEvent::FocusSearchInput);
    }

    /// The search input gained focus. Expands the search panel; focusing
    /// with an empty input discards whatever an earlier session left in the
    /// groups.
    pub fn on_search_focus(&self, current_value: &str) {
        let _ = self
            .event_tx
            .send(SidebarEvent::SearchPanelToggled { active: true });
        if current_value.is_empty() {
            self.clear_groups();
        }
    }

    /// The search input lost focus. With text still in the input the panel
    /// stays as is; an empty input collapses everything via [`back`](Self::back).
    pub fn on_search_blur(&self, current_value: &str) {
        if current_value.is_empty() {
            self.back();
        }
    }

    /// Leave search and the archived panel: collapse both, clear the input,
    /// end the session (query, peer target, groups). Any fetch still in
    /// flight is superseded and its response will be discarded.
    pub fn back(&self) {
        let _ = self
            .event_tx
            .send(SidebarEvent::ArchivedPanelToggled { active: false });
        let _ = self
            .event_tx
            .send(SidebarEvent::SearchPanelToggled { active: false });
        let _ = self.event_tx.send(SidebarEvent::ClearSearchInput);

        self.search_generation.fetch_add(1, Ordering::SeqCst);
        {
            let mut state = lock_unpoisoned(&self.search);
            state.reset_session(String::new());
            state.peer_target = None;
        }
        *lock_unpoisoned(&self.search_fetch) = None;
        self.clear_groups();
    }

    /// Open the archived-chats panel.
    pub fn open_archived(&self) {
        let _ = self
            .event_tx
            .send(SidebarEvent::ArchivedPanelToggled { active: true });
    }

    /// The message group search results currently target.
    pub fn active_message_group(&self) -> SearchGroupId {
        if lock_unpoisoned(&self.search).peer_target.is_some() {
            SearchGroupId::PrivateMessages
        } else {
            SearchGroupId::GlobalMessages
        }
    }
}

#[derive(Default)]
pub struct SidebarBuilder {
    messages: Option<Arc<dyn MessageManager>>,
    users: Option<Arc<dyn UserManager>>,
    peers: Option<Arc<dyn PeerManager>>,
    renderer: Option<Arc<dyn SidebarRenderer>>,
    config: SidebarConfig,
}

impl SidebarBuilder {
    /// Use one object for all three data-manager seams.
    pub fn with_managers<M>(mut self, managers: Arc<M>) -> Self
    where
        M: Managers + 'static,
    {
        self.messages = Some(managers.clone());
        self.users = Some(managers.clone());
        self.peers = Some(managers);
        self
    }

    pub fn with_messages(mut self, messages: Arc<dyn MessageManager>) -> Self {
        self.messages = Some(messages);
        self
    }

    pub fn with_users(mut self, users: Arc<dyn UserManager>) -> Self {
        self.users = Some(users);
        self
    }

    pub fn with_peers(mut self, peers: Arc<dyn PeerManager>) -> Self {
        self.peers = Some(peers);
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn SidebarRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_config(mut self, config: SidebarConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the controller and the receiving end of its event channel.
    pub fn build(self) -> anyhow::Result<(Arc<Sidebar>, mpsc::UnboundedReceiver<SidebarEvent>)> {
        let messages = self
            .messages
            .ok_or_else(|| anyhow!("a MessageManager is required"))?;
        let users = self
            .users
            .ok_or_else(|| anyhow!("a UserManager is required"))?;
        let peers = self
            .peers
            .ok_or_else(|| anyhow!("a PeerManager is required"))?;
        let renderer = self
            .renderer
            .ok_or_else(|| anyhow!("a SidebarRenderer is required"))?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let sidebar = Arc::new(Sidebar {
            messages,
            users,
            peers,
            renderer,
            config: self.config,
            event_tx,
            chats_offset: AtomicI64::new(0),
            archived_offset: AtomicI64::new(0),
            dialog_fetch: Mutex::new(None),
            search: Mutex::new(SearchState::default()),
            search_generation: AtomicU64::new(0),
            search_fetch: Mutex::new(None),
            search_timer_pending: AtomicBool::new(false),
        });

        Ok((sidebar, event_rx))
    }
}
