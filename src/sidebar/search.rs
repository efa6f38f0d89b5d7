//! Search session control and result merging

use super::groups::GroupTable;
use super::{ScrollProbe, Sidebar, lock_unpoisoned};
use crate::format::{format_phone_number, number_with_commas};
use crate::render::{DialogEntryFlags, RenderTarget, SearchGroupId};
use crate::types::{DialogRecord, MessageId, MessageSearchPage, PeerId};
use log::{debug, error, warn};
use scopeguard::defer;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::watch;
use tokio::time::sleep;

/// Cursor and counter state for one search session.
#[derive(Debug, Default)]
pub(crate) struct SearchState {
    /// Raw input value the session was started with.
    pub query: String,
    /// Scope for message searches. Survives query changes; only `back`
    /// clears it.
    pub peer_target: Option<PeerId>,
    /// Oldest message id merged so far; becomes the `max_id` cursor of the
    /// next page.
    pub min_message_id: Option<MessageId>,
    /// Server continuation token from the previous page.
    pub offset_rate: u32,
    /// Deduplicated history ids merged so far.
    pub loaded_count: u32,
    /// Total matches reported by the first response. Set once per session.
    pub found_count: Option<u32>,
    pub groups: GroupTable,
}

impl SearchState {
    /// Start a session for a new query: cursors and counters reset, the peer
    /// target deliberately kept.
    pub fn reset_session(&mut self, query: String) {
        self.query = query;
        self.min_message_id = None;
        self.offset_rate = 0;
        self.loaded_count = 0;
        self.found_count = None;
    }

    /// Everything the server reported has been loaded; no further fetch for
    /// this session.
    pub fn exhausted(&self) -> bool {
        self.found_count
            .is_some_and(|found| self.loaded_count >= found)
    }
}

/// In-flight marker for the message-search fetch. Tagged with the generation
/// it was issued under so a stale completion cannot clear a newer session's
/// marker.
#[derive(Debug)]
pub(crate) struct SearchFlight {
    pub generation: u64,
    pub rx: watch::Receiver<bool>,
}

/// Read-only view of the current search session, for status displays and
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSessionSnapshot {
    pub query: String,
    pub peer_target: Option<PeerId>,
    pub min_message_id: Option<MessageId>,
    pub offset_rate: u32,
    pub loaded_count: u32,
    pub found_count: Option<u32>,
}

impl SearchSessionSnapshot {
    /// Everything the server reported has been loaded.
    pub fn exhausted(&self) -> bool {
        self.found_count
            .is_some_and(|found| self.loaded_count >= found)
    }
}

impl Sidebar {
    /// React to an input-value change. A non-empty value starts a fresh
    /// session and issues its first fetch. Empty input is ignored here:
    /// results of the previous session stay until [`back`](Self::back).
    pub async fn on_search_input(self: &Arc<Self>, value: &str) {
        if value.trim().is_empty() {
            return;
        }

        self.search_generation.fetch_add(1, Ordering::SeqCst);
        lock_unpoisoned(&self.search).reset_session(value.to_string());
        // A fetch still in flight belongs to the superseded session; drop
        // its marker rather than waiting it out. Its response fails the
        // generation check and cannot clear the marker registered next.
        *lock_unpoisoned(&self.search_fetch) = None;
        self.clear_groups();

        self.search_more().await;
    }

    /// One search step: fetch the next message page for the current session.
    /// On the first page of a global search this also kicks off the contact
    /// lookup as an independent task. Joins an already-outstanding fetch
    /// instead of stacking a second one; a no-op when the query is empty or
    /// the session is exhausted.
    pub async fn search_more(self: &Arc<Self>) {
        struct FetchParams {
            query: String,
            peer: Option<PeerId>,
            max_id: Option<MessageId>,
            offset_rate: u32,
            first_global_page: bool,
        }
        enum Gate {
            Join(watch::Receiver<bool>),
            Run(watch::Sender<bool>, u64, FetchParams),
        }

        let gate = {
            let mut flight = lock_unpoisoned(&self.search_fetch);
            if let Some(f) = flight.as_ref() {
                Gate::Join(f.rx.clone())
            } else {
                let state = lock_unpoisoned(&self.search);
                if state.query.trim().is_empty() || state.exhausted() {
                    return;
                }
                let generation = self.search_generation.load(Ordering::SeqCst);
                let params = FetchParams {
                    query: state.query.clone(),
                    peer: state.peer_target,
                    max_id: state.min_message_id,
                    offset_rate: state.offset_rate,
                    first_global_page: state.peer_target.is_none()
                        && state.min_message_id.is_none(),
                };
                drop(state);
                let (tx, rx) = watch::channel(false);
                *flight = Some(SearchFlight { generation, rx });
                Gate::Run(tx, generation, params)
            }
        };

        let (tx, generation, params) = match gate {
            Gate::Join(mut rx) => {
                let _ = rx.changed().await;
                return;
            }
            Gate::Run(tx, generation, params) => (tx, generation, params),
        };

        defer! {
            let mut flight = lock_unpoisoned(&self.search_fetch);
            if flight.as_ref().is_some_and(|f| f.generation == generation) {
                *flight = None;
            }
            drop(flight);
            let _ = tx.send(true);
        }

        if params.first_global_page {
            let this = Arc::clone(self);
            let query = params.query.clone();
            tokio::spawn(async move {
                this.load_search_contacts(query, generation).await;
            });
        }

        let result = self
            .messages
            .get_search(
                params.peer,
                &params.query,
                None,
                params.max_id,
                self.config.search_page_size,
                params.offset_rate,
            )
            .await;

        match result {
            Ok(page) => {
                if self.search_generation.load(Ordering::SeqCst) != generation {
                    debug!(target: "Sidebar/Search", "dropping stale results for '{}'", params.query);
                    return;
                }
                self.merge_message_page(page, params.peer.is_some(), generation);
            }
            Err(e) => {
                error!(target: "Sidebar/Search", "message search failed: {}", e);
            }
        }
    }

    /// Near-end probe for the active message group. Returns whether a
    /// continuation was scheduled. Rapid calls coalesce: while a debounce
    /// timer is pending, further probes are no-ops.
    pub fn on_search_scrolled(self: &Arc<Self>, probe: &ScrollProbe) -> bool {
        if lock_unpoisoned(&self.search).query.trim().is_empty() {
            return false;
        }
        if !probe.tail_hit(self.config.scroll_lookback) {
            return false;
        }
        if self.search_timer_pending.swap(true, Ordering::SeqCst) {
            return false;
        }

        let this = Arc::clone(self);
        let delay = self.config.search_debounce;
        tokio::spawn(async move {
            sleep(delay).await;
            this.search_timer_pending.store(false, Ordering::SeqCst);
            this.search_more().await;
        });
        true
    }

    /// Whether a message-search fetch is currently in flight.
    pub fn search_fetch_outstanding(&self) -> bool {
        lock_unpoisoned(&self.search_fetch).is_some()
    }

    pub fn search_session(&self) -> SearchSessionSnapshot {
        let state = lock_unpoisoned(&self.search);
        SearchSessionSnapshot {
            query: state.query.clone(),
            peer_target: state.peer_target,
            min_message_id: state.min_message_id,
            offset_rate: state.offset_rate,
            loaded_count: state.loaded_count,
            found_count: state.found_count,
        }
    }

    /// Merge one page of message results into the session and its display
    /// group. Pages arrive newest-first; a leading id repeating the previous
    /// page's cursor is dropped before anything else. `generation` is
    /// re-validated under the session lock before the counters move and
    /// before every render write, so a response superseded mid-merge drops
    /// the rest of its batch instead of writing into the next session's
    /// groups.
    fn merge_message_page(&self, page: MessageSearchPage, private: bool, generation: u64) {
        let MessageSearchPage {
            count,
            mut history,
            next_rate,
        } = page;

        let group = if private {
            SearchGroupId::PrivateMessages
        } else {
            SearchGroupId::GlobalMessages
        };

        {
            let mut state = lock_unpoisoned(&self.search);
            if self.search_generation.load(Ordering::SeqCst) != generation {
                debug!(target: "Sidebar/Search", "dropping stale search results");
                return;
            }
            if let Some(min) = state.min_message_id
                && history.first() == Some(&min)
            {
                history.remove(0);
            }
            // A batch that deduplicated to nothing leaves the cursor alone.
            if let Some(last) = history.last() {
                state.min_message_id = Some(*last);
            }
            state.offset_rate = next_rate.unwrap_or(0);
            state.loaded_count += history.len() as u32;
            if state.found_count.is_none() {
                state.found_count = Some(count);
            }
        }

        let mut added = 0;
        for id in &history {
            let Some(message) = self.messages.get_message(*id) else {
                warn!(target: "Sidebar/Search", "message {} missing from cache, skipping", id);
                continue;
            };
            let dialog = self
                .messages
                .get_dialog_by_peer(message.peer_id)
                .unwrap_or_else(|| DialogRecord::placeholder(message.peer_id));
            // Render under the session lock: a reset clears groups inside the
            // same lock, so a write either lands before the clear or not at
            // all.
            {
                let _state = lock_unpoisoned(&self.search);
                if self.search_generation.load(Ordering::SeqCst) != generation {
                    return;
                }
                let rendered = self.renderer.add_dialog(
                    &dialog,
                    RenderTarget::Group(group),
                    DialogEntryFlags { ripple: false },
                );
                self.renderer.set_last_message(&dialog, &message, rendered);
            }
            added += 1;
        }
        self.note_group_entries(group, added, generation);
    }

    /// Contact half of a global search's first page. Runs as its own task so
    /// slow contact lookups never delay message results.
    pub(crate) async fn load_search_contacts(&self, query: String, generation: u64) {
        let matches = match self
            .users
            .search_contacts(&query, self.config.contacts_limit)
            .await
        {
            Ok(matches) => matches,
            Err(e) => {
                error!(target: "Sidebar/Search", "contact search failed: {}", e);
                return;
            }
        };
        if self.search_generation.load(Ordering::SeqCst) != generation {
            debug!(target: "Sidebar/Search", "dropping stale contact results for '{}'", query);
            return;
        }

        self.merge_contact_results(SearchGroupId::Contacts, &matches.my_results, true, generation);
        self.merge_contact_results(
            SearchGroupId::GlobalContacts,
            &matches.global_results,
            false,
            generation,
        );
    }

    /// Merge contact peers into a group. `with_member_count` switches the
    /// caption preference to member counts, used for the own-contacts group.
    /// Render writes re-validate `generation` under the session lock the same
    /// way the message merge does.
    fn merge_contact_results(
        &self,
        group: SearchGroupId,
        peers: &[PeerId],
        with_member_count: bool,
        generation: u64,
    ) {
        let mut added = 0;
        for &peer_id in peers {
            let dialog = self
                .messages
                .get_dialog_by_peer(peer_id)
                .unwrap_or_else(|| DialogRecord::placeholder(peer_id));
            let caption = self.contact_caption(peer_id, with_member_count);
            {
                let _state = lock_unpoisoned(&self.search);
                if self.search_generation.load(Ordering::SeqCst) != generation {
                    return;
                }
                let rendered = self.renderer.add_dialog(
                    &dialog,
                    RenderTarget::Group(group),
                    DialogEntryFlags { ripple: false },
                );
                self.renderer.set_caption(rendered, &caption);
            }
            added += 1;
        }
        self.note_group_entries(group, added, generation);
    }

    /// Caption under a contact result: member count when available and
    /// wanted, else "@username", else the phone number.
    fn contact_caption(&self, peer_id: PeerId, with_member_count: bool) -> String {
        if with_member_count
            && let Some(peer) = self.peers.get_peer(peer_id)
            && let Some(participants) = peer.participants_count
        {
            // Broadcast channels say "subscribers"; megagroups and plain
            // chats say "members".
            let noun = if self.peers.is_channel(peer_id) && !self.peers.is_megagroup(peer_id) {
                "subscribers"
            } else {
                "members"
            };
            return format!("{} {}", number_with_commas(u64::from(participants)), noun);
        }

        if let Some(username) = self.peers.get_username(peer_id) {
            return format!("@{}", username);
        }
        if let Some(user) = self.users.get_user(peer_id)
            && let Some(phone) = user.phone
        {
            return format!("+{}", format_phone_number(&phone));
        }
        String::new()
    }
}
