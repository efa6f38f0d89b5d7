//! Conversation-list pagination

use super::{ScrollProbe, Sidebar, lock_unpoisoned};
use crate::render::{DialogEntryFlags, RenderTarget};
use crate::types::DialogList;
use log::{debug, error};
use scopeguard::defer;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::watch;

impl Sidebar {
    /// Fetch and append the next page of a dialog list. If a dialog fetch is
    /// already outstanding (for either list), awaits that one instead of
    /// issuing a second request.
    ///
    /// Failures are logged and leave the cursor untouched; the next scroll
    /// trigger retries naturally.
    pub async fn load_dialogs(&self, list: DialogList) {
        enum Gate {
            Join(watch::Receiver<bool>),
            Run(watch::Sender<bool>),
        }

        let gate = {
            let mut in_flight = lock_unpoisoned(&self.dialog_fetch);
            match in_flight.as_ref() {
                Some(rx) => Gate::Join(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(false);
                    *in_flight = Some(rx);
                    Gate::Run(tx)
                }
            }
        };

        let tx = match gate {
            Gate::Join(mut rx) => {
                let _ = rx.changed().await;
                return;
            }
            Gate::Run(tx) => tx,
        };

        defer! {
            *lock_unpoisoned(&self.dialog_fetch) = None;
            let _ = tx.send(true);
        }

        self.renderer.set_list_loading(list, true);
        defer! {
            self.renderer.set_list_loading(list, false);
        }

        let offset = self.list_offset(list).load(Ordering::SeqCst);
        let result = self
            .messages
            .get_conversations("", offset, self.config.dialogs_page_size, list.is_archived())
            .await;

        match result {
            Ok(page) => {
                // An empty page means the list end; the cursor stays put.
                if let Some(last) = page.dialogs.last() {
                    self.list_offset(list).store(last.index, Ordering::SeqCst);
                    debug!(
                        target: "Sidebar/Dialogs",
                        "loaded {} {:?} dialogs, next offset {}",
                        page.dialogs.len(),
                        list,
                        last.index
                    );
                    for dialog in &page.dialogs {
                        self.renderer.add_dialog(
                            dialog,
                            RenderTarget::List(list),
                            DialogEntryFlags::default(),
                        );
                    }
                }
            }
            Err(e) => {
                error!(target: "Sidebar/Dialogs", "failed to load {:?} dialogs: {}", list, e);
            }
        }
    }

    /// Bottom-of-list probe for the normal chat list: load the next page
    /// once nothing buffered is left below the fold.
    pub async fn on_chats_scrolled(&self, hidden_below: usize) {
        if hidden_below > 0 || self.dialog_fetch_outstanding() {
            return;
        }
        self.load_dialogs(DialogList::Chats).await;
    }

    /// Near-end probe for the archived list: the next page loads once one of
    /// the trailing entries (the configured lookback window) is visible.
    pub async fn on_archived_scrolled(&self, probe: &ScrollProbe) {
        if probe.hidden_below > 0 || self.dialog_fetch_outstanding() {
            return;
        }
        if probe.tail_hit(self.config.scroll_lookback) {
            self.load_dialogs(DialogList::Archived).await;
        }
    }

    /// Whether a conversation-list fetch is currently in flight.
    pub fn dialog_fetch_outstanding(&self) -> bool {
        lock_unpoisoned(&self.dialog_fetch).is_some()
    }

    /// Pagination offset for the next page of a list (0 before the first).
    pub fn list_offset_index(&self, list: DialogList) -> i64 {
        self.list_offset(list).load(Ordering::SeqCst)
    }

    fn list_offset(&self, list: DialogList) -> &AtomicI64 {
        match list {
            DialogList::Chats => &self.chats_offset,
            DialogList::Archived => &self.archived_offset,
        }
    }
}
