// tests/search_session_test.rs
//
// Search session lifecycle: merging, cursors, stale-response discard,
// contact groups and the scroll debounce.

use async_trait::async_trait;
use chat_sidebar::manager::Result as ManagerResult;
use chat_sidebar::manager::{MessageManager, PeerManager, UserManager};
use chat_sidebar::types::{
    ContactMatches, DialogRecord, DialogsPage, MessageId, MessageRecord, MessageSearchPage, PeerId,
    PeerInfo, PeerKind, SearchFilter, UserInfo,
};
use chat_sidebar::{
    DialogEntryFlags, DialogList, RenderTarget, RenderedDialog, ScrollProbe, SearchGroupId,
    Sidebar, SidebarConfig, SidebarEvent, SidebarRenderer,
};
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, mpsc};

#[derive(Debug, Clone, PartialEq)]
struct SearchCall {
    query: String,
    peer: Option<i64>,
    max_id: Option<i64>,
    offset_rate: u32,
}

#[derive(Default)]
struct MockManagers {
    /// Canned search pages per query, served in order.
    search_pages: Mutex<HashMap<String, VecDeque<MessageSearchPage>>>,
    search_calls: Mutex<Vec<SearchCall>>,
    /// Queries whose get_search blocks until the notify fires.
    holds: Mutex<HashMap<String, Arc<Notify>>>,
    /// Message ids whose get_message blocks until the paired sender fires.
    message_blocks: Mutex<HashMap<i64, std_mpsc::Receiver<()>>>,
    message_requests: Mutex<Vec<i64>>,
    contacts: Mutex<HashMap<String, ContactMatches>>,
    contact_calls: AtomicUsize,
    messages: Mutex<HashMap<i64, MessageRecord>>,
    dialogs: Mutex<HashMap<i64, DialogRecord>>,
    peer_infos: Mutex<HashMap<i64, PeerInfo>>,
    user_infos: Mutex<HashMap<i64, UserInfo>>,
}

impl MockManagers {
    fn push_search_page(&self, query: &str, page: MessageSearchPage) {
        self.search_pages
            .lock()
            .unwrap()
            .entry(query.to_string())
            .or_default()
            .push_back(page);
    }

    fn hold_search(&self, query: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.holds
            .lock()
            .unwrap()
            .insert(query.to_string(), notify.clone());
        notify
    }

    fn block_message(&self, id: i64) -> std_mpsc::Sender<()> {
        let (tx, rx) = std_mpsc::channel();
        self.message_blocks.lock().unwrap().insert(id, rx);
        tx
    }

    fn message_requests(&self) -> Vec<i64> {
        self.message_requests.lock().unwrap().clone()
    }

    fn set_contacts(&self, query: &str, matches: ContactMatches) {
        self.contacts
            .lock()
            .unwrap()
            .insert(query.to_string(), matches);
    }

    fn seed_message(&self, id: i64, peer: i64) {
        self.messages.lock().unwrap().insert(
            id,
            MessageRecord {
                id: MessageId(id),
                peer_id: PeerId(peer),
                from_id: None,
                text: format!("message {id}"),
                date: Utc::now(),
            },
        );
    }

    fn seed_dialog(&self, peer: i64, index: i64) {
        self.dialogs.lock().unwrap().insert(
            peer,
            DialogRecord {
                peer_id: PeerId(peer),
                index,
                top_message: None,
                unread_count: 0,
                pinned: false,
            },
        );
    }

    fn seed_peer(&self, info: PeerInfo) {
        self.peer_infos.lock().unwrap().insert(info.id.0, info);
    }

    fn seed_user(&self, info: UserInfo) {
        self.user_infos.lock().unwrap().insert(info.id.0, info);
    }

    fn search_calls(&self) -> Vec<SearchCall> {
        self.search_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageManager for MockManagers {
    async fn get_conversations(
        &self,
        _filter: &str,
        _offset_index: i64,
        _limit: usize,
        _archived: bool,
    ) -> ManagerResult<DialogsPage> {
        Ok(DialogsPage {
            dialogs: vec![],
            count: Some(0),
        })
    }

    async fn get_search(
        &self,
        peer: Option<PeerId>,
        query: &str,
        _filter: Option<SearchFilter>,
        max_id: Option<MessageId>,
        _limit: usize,
        offset_rate: u32,
    ) -> ManagerResult<MessageSearchPage> {
        self.search_calls.lock().unwrap().push(SearchCall {
            query: query.to_string(),
            peer: peer.map(|p| p.0),
            max_id: max_id.map(|m| m.0),
            offset_rate,
        });
        let hold = self.holds.lock().unwrap().get(query).cloned();
        if let Some(hold) = hold {
            hold.notified().await;
        }
        let page = self
            .search_pages
            .lock()
            .unwrap()
            .get_mut(query)
            .and_then(VecDeque::pop_front);
        Ok(page.unwrap_or(MessageSearchPage {
            count: 0,
            history: vec![],
            next_rate: None,
        }))
    }

    fn get_message(&self, id: MessageId) -> Option<MessageRecord> {
        self.message_requests.lock().unwrap().push(id.0);
        let gate = self.message_blocks.lock().unwrap().remove(&id.0);
        if let Some(gate) = gate {
            let _ = gate.recv();
        }
        self.messages.lock().unwrap().get(&id.0).cloned()
    }

    fn get_dialog_by_peer(&self, peer: PeerId) -> Option<DialogRecord> {
        self.dialogs.lock().unwrap().get(&peer.0).cloned()
    }
}

#[async_trait]
impl UserManager for MockManagers {
    async fn search_contacts(&self, query: &str, _limit: usize) -> ManagerResult<ContactMatches> {
        self.contact_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .contacts
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }

    fn get_user(&self, id: PeerId) -> Option<UserInfo> {
        self.user_infos.lock().unwrap().get(&id.0).cloned()
    }
}

impl PeerManager for MockManagers {
    fn get_peer(&self, id: PeerId) -> Option<PeerInfo> {
        self.peer_infos.lock().unwrap().get(&id.0).cloned()
    }

    fn get_username(&self, id: PeerId) -> Option<String> {
        self.get_peer(id).and_then(|p| p.username)
    }

    fn is_channel(&self, id: PeerId) -> bool {
        matches!(
            self.get_peer(id).map(|p| p.kind),
            Some(PeerKind::Channel | PeerKind::Megagroup)
        )
    }

    fn is_megagroup(&self, id: PeerId) -> bool {
        matches!(self.get_peer(id).map(|p| p.kind), Some(PeerKind::Megagroup))
    }
}

#[derive(Default)]
struct RecordingRenderer {
    next_handle: AtomicU64,
    slots: Mutex<HashMap<u64, i64>>,
    adds: Mutex<Vec<(i64, RenderTarget, bool)>>,
    captions: Mutex<Vec<(i64, String)>>,
    previews: Mutex<Vec<(i64, i64)>>,
    visibility: Mutex<Vec<(SearchGroupId, bool)>>,
    cleared: Mutex<Vec<SearchGroupId>>,
}

impl RecordingRenderer {
    fn group_peers(&self, group: SearchGroupId) -> Vec<i64> {
        self.adds
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, t, _)| *t == RenderTarget::Group(group))
            .map(|(peer, _, _)| *peer)
            .collect()
    }

    fn ripple_flags(&self, group: SearchGroupId) -> Vec<bool> {
        self.adds
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, t, _)| *t == RenderTarget::Group(group))
            .map(|(_, _, ripple)| *ripple)
            .collect()
    }

    fn caption_of(&self, peer: i64) -> Option<String> {
        self.captions
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| *p == peer)
            .map(|(_, c)| c.clone())
    }

    fn visibility(&self) -> Vec<(SearchGroupId, bool)> {
        self.visibility.lock().unwrap().clone()
    }

    fn cleared(&self) -> Vec<SearchGroupId> {
        self.cleared.lock().unwrap().clone()
    }

    fn preview_count(&self) -> usize {
        self.previews.lock().unwrap().len()
    }
}

impl SidebarRenderer for RecordingRenderer {
    fn add_dialog(
        &self,
        dialog: &DialogRecord,
        target: RenderTarget,
        flags: DialogEntryFlags,
    ) -> RenderedDialog {
        let handle = self.next_handle.fetch_add(1, Ordering::SeqCst);
        self.slots.lock().unwrap().insert(handle, dialog.peer_id.0);
        self.adds
            .lock()
            .unwrap()
            .push((dialog.peer_id.0, target, flags.ripple));
        RenderedDialog(handle)
    }

    fn set_last_message(
        &self,
        _dialog: &DialogRecord,
        message: &MessageRecord,
        rendered: RenderedDialog,
    ) {
        let peer = self
            .slots
            .lock()
            .unwrap()
            .get(&rendered.0)
            .copied()
            .unwrap_or(0);
        self.previews.lock().unwrap().push((peer, message.id.0));
    }

    fn set_caption(&self, rendered: RenderedDialog, caption: &str) {
        let peer = self
            .slots
            .lock()
            .unwrap()
            .get(&rendered.0)
            .copied()
            .unwrap_or(0);
        self.captions
            .lock()
            .unwrap()
            .push((peer, caption.to_string()));
    }

    fn set_group_visible(&self, group: SearchGroupId, visible: bool) {
        self.visibility.lock().unwrap().push((group, visible));
    }

    fn clear_group(&self, group: SearchGroupId) {
        self.cleared.lock().unwrap().push(group);
    }

    fn set_list_loading(&self, _list: DialogList, _loading: bool) {}
}

struct Harness {
    sidebar: Arc<Sidebar>,
    managers: Arc<MockManagers>,
    renderer: Arc<RecordingRenderer>,
    #[allow(dead_code)]
    events: mpsc::UnboundedReceiver<SidebarEvent>,
}

impl Harness {
    fn new(managers: MockManagers) -> Self {
        Self::with_config(managers, SidebarConfig::default())
    }

    fn with_config(managers: MockManagers, config: SidebarConfig) -> Self {
        let managers = Arc::new(managers);
        let renderer = Arc::new(RecordingRenderer::default());
        let (sidebar, events) = Sidebar::builder()
            .with_managers(managers.clone())
            .with_renderer(renderer.clone())
            .with_config(config)
            .build()
            .expect("failed to build sidebar");
        Self {
            sidebar,
            managers,
            renderer,
            events,
        }
    }
}

/// Descending id range, the order search pages arrive in.
fn ids_desc(from: i64, to: i64) -> Vec<MessageId> {
    (to..=from).rev().map(MessageId).collect()
}

fn seed_history(managers: &MockManagers, peer: i64, history: &[MessageId]) {
    for id in history {
        managers.seed_message(id.0, peer);
    }
}

async fn wait_for(mut cond: impl FnMut() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn test_first_page_merges_and_activates_group() {
    let managers = MockManagers::default();
    let history = ids_desc(100, 81);
    managers.seed_dialog(7, 500);
    seed_history(&managers, 7, &history);
    managers.push_search_page(
        "abc",
        MessageSearchPage {
            count: 42,
            history,
            next_rate: Some(5),
        },
    );
    let h = Harness::new(managers);

    h.sidebar.on_search_input("abc").await;

    let session = h.sidebar.search_session();
    assert_eq!(session.query, "abc");
    assert_eq!(session.loaded_count, 20);
    assert_eq!(session.found_count, Some(42));
    assert_eq!(session.min_message_id, Some(MessageId(81)));
    assert_eq!(session.offset_rate, 5);
    assert!(!session.exhausted());

    assert_eq!(
        h.managers.search_calls(),
        vec![SearchCall {
            query: "abc".to_string(),
            peer: None,
            max_id: None,
            offset_rate: 0,
        }]
    );

    let rendered = h.renderer.group_peers(SearchGroupId::GlobalMessages);
    assert_eq!(rendered.len(), 20);
    assert_eq!(h.sidebar.group_len(SearchGroupId::GlobalMessages), 20);
    assert_eq!(h.renderer.preview_count(), 20);
    // Search-group entries render without the press ripple.
    assert!(
        h.renderer
            .ripple_flags(SearchGroupId::GlobalMessages)
            .iter()
            .all(|ripple| !ripple)
    );
    // Only the message group became visible; empty contact groups stay out.
    assert_eq!(
        h.renderer.visibility(),
        vec![(SearchGroupId::GlobalMessages, true)]
    );
}

#[tokio::test]
async fn test_continuation_drops_leading_duplicate() {
    let managers = MockManagers::default();
    managers.seed_dialog(7, 500);
    let first = ids_desc(100, 81);
    seed_history(&managers, 7, &first);
    seed_history(&managers, 7, &ids_desc(80, 79));
    managers.push_search_page(
        "abc",
        MessageSearchPage {
            count: 42,
            history: first,
            next_rate: Some(5),
        },
    );
    // The follow-up page repeats the cursor id at the front and reports a
    // different total; both must be ignored.
    managers.push_search_page(
        "abc",
        MessageSearchPage {
            count: 40,
            history: vec![MessageId(81), MessageId(80), MessageId(79)],
            next_rate: None,
        },
    );
    let h = Harness::new(managers);

    h.sidebar.on_search_input("abc").await;
    h.sidebar.search_more().await;

    let session = h.sidebar.search_session();
    assert_eq!(session.loaded_count, 22);
    assert_eq!(session.found_count, Some(42));
    assert_eq!(session.min_message_id, Some(MessageId(79)));
    assert_eq!(session.offset_rate, 0);

    let calls = h.managers.search_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].max_id, Some(81));
    assert_eq!(calls[1].offset_rate, 5);

    assert_eq!(h.sidebar.group_len(SearchGroupId::GlobalMessages), 22);
}

#[tokio::test]
async fn test_batch_of_only_the_duplicate_keeps_cursor() {
    let managers = MockManagers::default();
    managers.seed_dialog(7, 500);
    let first = ids_desc(100, 81);
    seed_history(&managers, 7, &first);
    managers.push_search_page(
        "abc",
        MessageSearchPage {
            count: 42,
            history: first,
            next_rate: None,
        },
    );
    managers.push_search_page(
        "abc",
        MessageSearchPage {
            count: 42,
            history: vec![MessageId(81)],
            next_rate: None,
        },
    );
    let h = Harness::new(managers);

    h.sidebar.on_search_input("abc").await;
    h.sidebar.search_more().await;

    let session = h.sidebar.search_session();
    assert_eq!(session.loaded_count, 20);
    assert_eq!(session.min_message_id, Some(MessageId(81)));
    assert_eq!(h.sidebar.group_len(SearchGroupId::GlobalMessages), 20);
}

#[tokio::test]
async fn test_zero_result_session_exhausts_immediately() {
    let managers = MockManagers::default();
    managers.push_search_page(
        "nothing",
        MessageSearchPage {
            count: 0,
            history: vec![],
            next_rate: None,
        },
    );
    let h = Harness::new(managers);

    h.sidebar.on_search_input("nothing").await;

    let session = h.sidebar.search_session();
    assert_eq!(session.found_count, Some(0));
    assert!(session.exhausted());

    // An exhausted session issues no further fetches.
    h.sidebar.search_more().await;
    assert_eq!(h.managers.search_calls().len(), 1);
}

#[tokio::test]
async fn test_stale_results_are_discarded() {
    let managers = MockManagers::default();
    let hold_one = managers.hold_search("one");
    managers.seed_dialog(7, 500);
    managers.seed_dialog(8, 400);
    managers.seed_message(50, 7);
    managers.seed_message(60, 8);
    managers.push_search_page(
        "one",
        MessageSearchPage {
            count: 1,
            history: vec![MessageId(50)],
            next_rate: None,
        },
    );
    managers.push_search_page(
        "two",
        MessageSearchPage {
            count: 1,
            history: vec![MessageId(60)],
            next_rate: None,
        },
    );
    let h = Harness::new(managers);

    let s1 = h.sidebar.clone();
    let t1 = tokio::spawn(async move { s1.on_search_input("one").await });
    wait_for(|| !h.managers.search_calls().is_empty()).await;

    // The input changes while the first fetch is still out.
    h.sidebar.on_search_input("two").await;
    assert_eq!(h.sidebar.search_session().loaded_count, 1);

    // The superseded fetch completes late; its page must not be merged.
    hold_one.notify_one();
    t1.await.expect("superseded input task panicked");

    let session = h.sidebar.search_session();
    assert_eq!(session.query, "two");
    assert_eq!(session.loaded_count, 1);
    assert_eq!(session.min_message_id, Some(MessageId(60)));
    assert_eq!(
        h.renderer.group_peers(SearchGroupId::GlobalMessages),
        vec![8]
    );
    assert!(!h.sidebar.search_fetch_outstanding());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_session_reset_mid_merge_drops_rest_of_batch() {
    let managers = MockManagers::default();
    managers.seed_dialog(7, 500);
    managers.seed_dialog(8, 400);
    managers.seed_message(101, 7);
    managers.seed_message(100, 7);
    managers.seed_message(60, 8);
    managers.push_search_page(
        "one",
        MessageSearchPage {
            count: 2,
            history: vec![MessageId(101), MessageId(100)],
            next_rate: None,
        },
    );
    managers.push_search_page(
        "two",
        MessageSearchPage {
            count: 1,
            history: vec![MessageId(60)],
            next_rate: None,
        },
    );
    // The second cache lookup of session one parks its merge mid-batch.
    let release = managers.block_message(100);
    let h = Harness::new(managers);

    let s1 = h.sidebar.clone();
    let t1 = tokio::spawn(async move { s1.on_search_input("one").await });
    wait_for(|| h.managers.message_requests().contains(&100)).await;

    // The input changes while the old merge sits halfway through its page.
    h.sidebar.on_search_input("two").await;

    release.send(()).expect("merge gate receiver dropped");
    t1.await.expect("superseded input task panicked");

    let session = h.sidebar.search_session();
    assert_eq!(session.query, "two");
    assert_eq!(session.loaded_count, 1);
    assert_eq!(session.min_message_id, Some(MessageId(60)));

    // The entry session one rendered before the reset was wiped by the
    // clear; the rest of its batch must never reach the renderer.
    assert_eq!(
        h.renderer.group_peers(SearchGroupId::GlobalMessages),
        vec![7, 8]
    );
    assert_eq!(h.renderer.preview_count(), 2);
    assert_eq!(h.renderer.cleared().len(), 8);
    assert_eq!(h.sidebar.group_len(SearchGroupId::GlobalMessages), 1);
    // Only the live session activated the group; the superseded batch may
    // not switch it back on.
    assert_eq!(
        h.renderer.visibility(),
        vec![(SearchGroupId::GlobalMessages, true)]
    );
    assert!(!h.sidebar.search_fetch_outstanding());
}

#[tokio::test]
async fn test_private_search_skips_contacts_and_targets_private_group() {
    let managers = MockManagers::default();
    managers.seed_dialog(9, 300);
    managers.seed_message(70, 9);
    managers.push_search_page(
        "abc",
        MessageSearchPage {
            count: 1,
            history: vec![MessageId(70)],
            next_rate: None,
        },
    );
    let h = Harness::new(managers);

    h.sidebar.begin_search(Some(PeerId(9)));
    h.sidebar.on_search_input("abc").await;

    assert_eq!(
        h.sidebar.active_message_group(),
        SearchGroupId::PrivateMessages
    );
    let calls = h.managers.search_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].peer, Some(9));
    assert_eq!(
        h.renderer.group_peers(SearchGroupId::PrivateMessages),
        vec![9]
    );

    // Peer-scoped searches never hit the contact path.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(h.managers.contact_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_contact_results_split_groups_with_captions() {
    let managers = MockManagers::default();
    managers.seed_peer(PeerInfo {
        id: PeerId(-2001),
        kind: PeerKind::Channel,
        title: "News".to_string(),
        username: Some("news".to_string()),
        participants_count: Some(1234),
    });
    managers.seed_peer(PeerInfo {
        id: PeerId(-2002),
        kind: PeerKind::Megagroup,
        title: "Group".to_string(),
        username: None,
        participants_count: Some(56),
    });
    managers.seed_peer(PeerInfo {
        id: PeerId(1002),
        kind: PeerKind::User,
        title: "Boris".to_string(),
        username: None,
        participants_count: None,
    });
    managers.seed_peer(PeerInfo {
        id: PeerId(1003),
        kind: PeerKind::User,
        title: "Charlie".to_string(),
        username: Some("charlie_dev".to_string()),
        participants_count: None,
    });
    managers.seed_user(UserInfo {
        id: PeerId(1002),
        first_name: Some("Boris".to_string()),
        phone: Some("79991234567".to_string()),
    });
    managers.seed_dialog(-2001, 900);
    managers.seed_dialog(-2002, 880);
    managers.seed_dialog(1002, 860);
    managers.set_contacts(
        "ab",
        ContactMatches {
            my_results: vec![PeerId(-2001), PeerId(-2002), PeerId(1002)],
            global_results: vec![PeerId(1003)],
        },
    );
    let h = Harness::new(managers);

    h.sidebar.on_search_input("ab").await;
    wait_for(|| h.sidebar.group_len(SearchGroupId::Contacts) == 3).await;

    assert_eq!(
        h.renderer.group_peers(SearchGroupId::Contacts),
        vec![-2001, -2002, 1002]
    );
    assert_eq!(
        h.renderer.group_peers(SearchGroupId::GlobalContacts),
        vec![1003]
    );
    // Broadcast channels count subscribers, megagroups count members; peers
    // without a member count fall back to username, then phone.
    assert_eq!(
        h.renderer.caption_of(-2001).as_deref(),
        Some("1,234 subscribers")
    );
    assert_eq!(h.renderer.caption_of(-2002).as_deref(), Some("56 members"));
    assert_eq!(
        h.renderer.caption_of(1002).as_deref(),
        Some("+7 999 123 45 67")
    );
    assert_eq!(
        h.renderer.caption_of(1003).as_deref(),
        Some("@charlie_dev")
    );

    let visibility = h.renderer.visibility();
    assert!(visibility.contains(&(SearchGroupId::Contacts, true)));
    assert!(visibility.contains(&(SearchGroupId::GlobalContacts, true)));
}

#[tokio::test]
async fn test_new_input_resets_session_and_clears_groups() {
    let managers = MockManagers::default();
    managers.seed_dialog(7, 500);
    managers.seed_message(100, 7);
    managers.seed_message(99, 7);
    managers.seed_message(200, 7);
    managers.push_search_page(
        "abc",
        MessageSearchPage {
            count: 10,
            history: vec![MessageId(100), MessageId(99)],
            next_rate: None,
        },
    );
    managers.push_search_page(
        "xyz",
        MessageSearchPage {
            count: 1,
            history: vec![MessageId(200)],
            next_rate: None,
        },
    );
    let h = Harness::new(managers);

    h.sidebar.on_search_input("abc").await;
    assert_eq!(h.sidebar.search_session().loaded_count, 2);

    h.sidebar.on_search_input("xyz").await;

    let session = h.sidebar.search_session();
    assert_eq!(session.query, "xyz");
    assert_eq!(session.loaded_count, 1);
    assert_eq!(session.found_count, Some(1));
    assert_eq!(session.min_message_id, Some(MessageId(200)));
    assert_eq!(h.sidebar.group_len(SearchGroupId::GlobalMessages), 1);

    // Each input change wipes all four groups.
    let cleared = h.renderer.cleared();
    assert_eq!(cleared.len(), 8);
    for group in SearchGroupId::ALL {
        assert!(cleared.contains(&group));
    }
}

#[tokio::test]
async fn test_blank_input_keeps_previous_results() {
    let managers = MockManagers::default();
    managers.seed_dialog(7, 500);
    managers.seed_message(50, 7);
    managers.push_search_page(
        "abc",
        MessageSearchPage {
            count: 1,
            history: vec![MessageId(50)],
            next_rate: None,
        },
    );
    let h = Harness::new(managers);

    h.sidebar.on_search_input("abc").await;
    assert_eq!(h.sidebar.group_len(SearchGroupId::GlobalMessages), 1);

    // Deleting the input text does not end the session; the groups stay
    // until an explicit back action.
    h.sidebar.on_search_input("").await;
    h.sidebar.on_search_input("   ").await;

    assert_eq!(h.managers.search_calls().len(), 1);
    assert_eq!(h.sidebar.search_session().query, "abc");
    assert_eq!(h.sidebar.group_len(SearchGroupId::GlobalMessages), 1);
    assert_eq!(h.renderer.cleared().len(), 4);
}

#[tokio::test]
async fn test_scroll_debounce_coalesces_probes() {
    let managers = MockManagers::default();
    managers.seed_dialog(7, 500);
    let first = ids_desc(100, 96);
    let second = ids_desc(96, 92);
    seed_history(&managers, 7, &first);
    seed_history(&managers, 7, &second);
    managers.push_search_page(
        "q",
        MessageSearchPage {
            count: 15,
            history: first,
            next_rate: None,
        },
    );
    managers.push_search_page(
        "q",
        MessageSearchPage {
            count: 15,
            history: second,
            next_rate: None,
        },
    );
    let h = Harness::with_config(
        managers,
        SidebarConfig {
            search_debounce: Duration::from_millis(25),
            ..Default::default()
        },
    );

    h.sidebar.on_search_input("q").await;
    assert_eq!(h.sidebar.search_session().loaded_count, 5);

    let probe = ScrollProbe {
        hidden_below: 0,
        tail_visible: vec![true],
    };
    assert!(h.sidebar.on_search_scrolled(&probe));
    // A second probe within the window coalesces into the pending timer.
    assert!(!h.sidebar.on_search_scrolled(&probe));

    wait_for(|| h.sidebar.search_session().loaded_count >= 9).await;
    assert_eq!(h.managers.search_calls().len(), 2);

    // Once the timer fired, the next probe arms a fresh one.
    assert!(h.sidebar.on_search_scrolled(&probe));
}

#[tokio::test]
async fn test_scroll_away_from_tail_is_a_noop() {
    let managers = MockManagers::default();
    managers.seed_dialog(7, 500);
    managers.seed_message(100, 7);
    managers.push_search_page(
        "q",
        MessageSearchPage {
            count: 5,
            history: vec![MessageId(100)],
            next_rate: None,
        },
    );
    let h = Harness::new(managers);
    h.sidebar.on_search_input("q").await;

    let probe = ScrollProbe {
        hidden_below: 0,
        tail_visible: vec![false, false, false, false, false],
    };
    assert!(!h.sidebar.on_search_scrolled(&probe));

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(h.managers.search_calls().len(), 1);
}

#[tokio::test]
async fn test_scroll_without_query_is_a_noop() {
    let h = Harness::new(MockManagers::default());
    let probe = ScrollProbe {
        hidden_below: 0,
        tail_visible: vec![true],
    };
    assert!(!h.sidebar.on_search_scrolled(&probe));
}

#[tokio::test]
async fn test_missing_cache_entries_are_skipped_but_counted() {
    let managers = MockManagers::default();
    managers.seed_dialog(7, 500);
    managers.seed_message(50, 7);
    managers.seed_message(48, 7);
    // Message 49 is in the history but not in the cache.
    managers.push_search_page(
        "q",
        MessageSearchPage {
            count: 3,
            history: vec![MessageId(50), MessageId(49), MessageId(48)],
            next_rate: None,
        },
    );
    let h = Harness::new(managers);

    h.sidebar.on_search_input("q").await;

    let session = h.sidebar.search_session();
    assert_eq!(session.loaded_count, 3);
    assert!(session.exhausted());
    assert_eq!(h.sidebar.group_len(SearchGroupId::GlobalMessages), 2);
    assert_eq!(
        h.renderer.group_peers(SearchGroupId::GlobalMessages),
        vec![7, 7]
    );
}

#[tokio::test]
async fn test_results_without_a_dialog_render_placeholders() {
    let managers = MockManagers::default();
    // Peer 99 has a matching message but no dialog record.
    managers.seed_message(50, 99);
    managers.push_search_page(
        "q",
        MessageSearchPage {
            count: 1,
            history: vec![MessageId(50)],
            next_rate: None,
        },
    );
    let h = Harness::new(managers);

    h.sidebar.on_search_input("q").await;

    assert_eq!(
        h.renderer.group_peers(SearchGroupId::GlobalMessages),
        vec![99]
    );
    assert_eq!(h.sidebar.group_len(SearchGroupId::GlobalMessages), 1);
}
