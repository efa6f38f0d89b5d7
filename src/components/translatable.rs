//! Message translation view-model.
//!
//! A [`TranslatableMessage`] wraps one message's text and drives the
//! translate-on-display flow: show the original immediately, mark the slot
//! as loading while an uncached translation is fetched, then swap in the
//! translated text once it arrives. Every emission is gated on a
//! [`Middleware`] guard so a torn-down view never receives late updates.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::error;
use tokio::sync::mpsc;

use crate::manager::Translator;
use crate::types::{MessageId, PeerId, TextWithEntities};

/// Cache-only probing on the first pass is reserved for setups that defer
/// translation until the entry scrolls into view.
const USE_VISIBILITY_OBSERVER: bool = false;

/// Lifetime guard for view-bound async work. Cloned into spawned futures;
/// once the owning view calls [`Middleware::destroy`], in-flight passes
/// finish silently instead of emitting to a dead slot.
#[derive(Debug, Clone, Default)]
pub struct Middleware {
    destroyed: Arc<AtomicBool>,
}

impl Middleware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }

    pub fn alive(&self) -> bool {
        !self.destroyed.load(Ordering::SeqCst)
    }
}

/// What the message slot should currently display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationState {
    /// The untranslated text.
    Original,
    /// The untranslated text with a loading indicator; a translation is on
    /// its way.
    Loading,
    /// The translated text.
    Translated(TextWithEntities),
}

/// One message's translation coordinator.
pub struct TranslatableMessage {
    peer_id: PeerId,
    message_id: MessageId,
    original: TextWithEntities,
    translator: Arc<dyn Translator>,
    middleware: Middleware,
    first: AtomicBool,
    was_visible: AtomicBool,
}

impl TranslatableMessage {
    pub fn new(
        peer_id: PeerId,
        message_id: MessageId,
        original: TextWithEntities,
        translator: Arc<dyn Translator>,
        middleware: Middleware,
    ) -> Self {
        Self {
            peer_id,
            message_id,
            original,
            translator,
            middleware,
            first: AtomicBool::new(true),
            was_visible: AtomicBool::new(false),
        }
    }

    pub fn original_text(&self) -> &TextWithEntities {
        &self.original
    }

    pub fn middleware(&self) -> &Middleware {
        &self.middleware
    }

    /// Drive one translation pass and emit the resulting states on `tx`.
    ///
    /// Call again whenever the target language, the enablement toggle, or
    /// the visibility of the slot changes. A slot that has never been
    /// visible skips translation after the first pass; once seen, it keeps
    /// translating on later passes even while scrolled away.
    pub async fn resolve(
        &self,
        enabled: bool,
        visible: bool,
        lang: &str,
        tx: &mpsc::UnboundedSender<TranslationState>,
    ) {
        let first = self.first.swap(false, Ordering::SeqCst);
        if visible {
            self.was_visible.store(true, Ordering::SeqCst);
        }
        let was_visible = self.was_visible.load(Ordering::SeqCst);

        if !enabled || (!was_visible && !first) {
            let _ = tx.send(TranslationState::Original);
            return;
        }

        let only_cache = first && USE_VISIBILITY_OBSERVER;
        let acked = match self
            .translator
            .translate(self.peer_id, self.message_id, lang, only_cache)
            .await
        {
            Ok(acked) => acked,
            Err(e) => {
                error!(
                    target: "Components/Translate",
                    "translation request for message {} failed: {e}", self.message_id
                );
                if self.middleware.alive() {
                    let _ = tx.send(TranslationState::Original);
                }
                return;
            }
        };
        if !self.middleware.alive() {
            return;
        }

        if !acked.cached {
            let _ = tx.send(TranslationState::Loading);
        }

        let text = match acked.result.await {
            Ok(text) => text,
            Err(e) => {
                error!(
                    target: "Components/Translate",
                    "translation of message {} failed: {e}", self.message_id
                );
                if self.middleware.alive() {
                    let _ = tx.send(TranslationState::Original);
                }
                return;
            }
        };
        if !self.middleware.alive() {
            return;
        }

        match text {
            Some(text) => {
                let _ = tx.send(TranslationState::Translated(text));
            }
            None => {
                let _ = tx.send(TranslationState::Original);
            }
        }
    }
}
