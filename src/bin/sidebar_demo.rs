use async_trait::async_trait;
use chat_sidebar::components::{Middleware, TranslatableMessage, TranslationState};
use chat_sidebar::manager::Result as ManagerResult;
use chat_sidebar::manager::{
    AckedTranslation, MessageManager, PeerManager, Translator, UserManager,
};
use chat_sidebar::types::{
    ContactMatches, DialogList, DialogRecord, DialogsPage, MessageId, MessageRecord,
    MessageSearchPage, PeerId, PeerInfo, PeerKind, SearchFilter, TextWithEntities, UserInfo,
};
use chat_sidebar::{
    DialogEntryFlags, RenderTarget, RenderedDialog, ScrollProbe, SearchGroupId, Sidebar,
    SidebarConfig, SidebarRenderer,
};
use chrono::Utc;
use clap::Parser;
use log::{debug, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

#[derive(Parser)]
#[command(name = "sidebar_demo")]
#[command(about = "Sidebar walkthrough over an in-memory fixture")]
#[command(
    long_about = "Drives the sidebar controller against a canned data set: pages through the chat list, runs a search session with contact and message results, and prints every render call and chrome event as it happens"
)]
struct Cli {
    /// Search query to run
    #[arg(short, long, default_value = "rust")]
    query: String,

    /// Scope the message search to one peer id
    #[arg(short, long)]
    peer: Option<i64>,

    /// Also walk the archived list
    #[arg(long)]
    archived: bool,

    /// Print the final search session as JSON
    #[arg(short, long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{} [{:<5}] [{}] - {}",
                Utc::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let cli = Cli::parse();

    let store = Arc::new(DemoStore::sample());
    let renderer = Arc::new(DemoRenderer {
        store: store.clone(),
        next_handle: AtomicU64::new(1),
    });

    // Small pages so the fixture paginates like a real account would.
    let config = SidebarConfig {
        dialogs_page_size: 4,
        search_page_size: 5,
        scroll_lookback: 2,
        ..Default::default()
    };
    let (sidebar, mut events) = Sidebar::builder()
        .with_managers(store)
        .with_renderer(renderer)
        .with_config(config)
        .build()?;

    info!("=== Chat list, first page ===");
    sidebar.load_dialogs(DialogList::Chats).await;

    info!("=== Chat list, scrolled to the bottom ===");
    sidebar.on_chats_scrolled(0).await;

    if cli.archived {
        info!("=== Archived list ===");
        sidebar.open_archived();
        sidebar.load_dialogs(DialogList::Archived).await;
        let probe = ScrollProbe {
            hidden_below: 0,
            tail_visible: vec![false, true],
        };
        sidebar.on_archived_scrolled(&probe).await;
    }

    info!("=== Searching for '{}' ===", cli.query);
    sidebar.begin_search(cli.peer.map(PeerId));
    sidebar.on_search_focus("");
    sidebar.on_search_input(&cli.query).await;

    // Contact results arrive on their own task; give it a moment.
    sleep(Duration::from_millis(50)).await;

    info!("=== Scrolling through the results ===");
    for _ in 0..10 {
        if sidebar.search_session().exhausted() {
            break;
        }
        sidebar.search_more().await;
    }

    let session = sidebar.search_session();
    if cli.json {
        let out = serde_json::json!({
            "query": session.query,
            "peer_target": session.peer_target.map(|p| p.0),
            "min_message_id": session.min_message_id.map(|m| m.0),
            "offset_rate": session.offset_rate,
            "loaded_count": session.loaded_count,
            "found_count": session.found_count,
            "groups": {
                "contacts": sidebar.group_len(SearchGroupId::Contacts),
                "global_contacts": sidebar.group_len(SearchGroupId::GlobalContacts),
                "global_messages": sidebar.group_len(SearchGroupId::GlobalMessages),
                "private_messages": sidebar.group_len(SearchGroupId::PrivateMessages),
            }
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        info!(
            "session '{}': loaded {} of {} matches, cursor at {:?}",
            session.query,
            session.loaded_count,
            session.found_count.unwrap_or(0),
            session.min_message_id
        );
    }

    info!("=== Translating a message ===");
    let translator: Arc<dyn Translator> = Arc::new(DemoTranslator);
    let message = TranslatableMessage::new(
        PeerId(1001),
        MessageId(129),
        TextWithEntities::plain("the rust rewrite is ready for review"),
        translator,
        Middleware::new(),
    );
    let (state_tx, mut states) = mpsc::unbounded_channel();
    message.resolve(true, true, "es", &state_tx).await;
    while let Ok(state) = states.try_recv() {
        match state {
            TranslationState::Original => {
                info!(target: "Demo/Translate", "showing original: \"{}\"", message.original_text().text)
            }
            TranslationState::Loading => info!(target: "Demo/Translate", "translating..."),
            TranslationState::Translated(text) => {
                info!(target: "Demo/Translate", "translated: \"{}\"", text.text)
            }
        }
    }

    info!("=== Back out of search ===");
    sidebar.back();

    info!("=== Chrome events, in order ===");
    while let Ok(event) = events.try_recv() {
        info!(target: "Demo/Events", "{:?}", event);
    }

    Ok(())
}

// ============================================================================
// Fixture data set
// ============================================================================

struct DemoStore {
    peers: Vec<PeerInfo>,
    users: Vec<UserInfo>,
    dialogs: Vec<(DialogList, DialogRecord)>,
    messages: Vec<MessageRecord>,
}

fn user_peer(id: i64, title: &str, username: Option<&str>) -> PeerInfo {
    PeerInfo {
        id: PeerId(id),
        kind: PeerKind::User,
        title: title.to_string(),
        username: username.map(str::to_string),
        participants_count: None,
    }
}

fn dialog(list: DialogList, peer: i64, index: i64, top: i64) -> (DialogList, DialogRecord) {
    (
        list,
        DialogRecord {
            peer_id: PeerId(peer),
            index,
            top_message: Some(MessageId(top)),
            unread_count: 0,
            pinned: false,
        },
    )
}

fn message(id: i64, peer: i64, text: &str) -> MessageRecord {
    MessageRecord {
        id: MessageId(id),
        peer_id: PeerId(peer),
        from_id: None,
        text: text.to_string(),
        date: Utc::now(),
    }
}

impl DemoStore {
    fn sample() -> Self {
        let peers = vec![
            user_peer(1001, "Alice Hartley", Some("alice")),
            user_peer(1002, "Boris Rustamov", None),
            user_peer(1003, "Charlie", Some("rustacean_dev")),
            user_peer(1004, "Dana Webb", Some("dana")),
            user_peer(1005, "Grace Osei", None),
            PeerInfo {
                id: PeerId(-2001),
                kind: PeerKind::Channel,
                title: "Rust Announcements".to_string(),
                username: Some("rustnews".to_string()),
                participants_count: Some(48_213),
            },
            PeerInfo {
                id: PeerId(-2002),
                kind: PeerKind::Megagroup,
                title: "Crate Chat".to_string(),
                username: Some("cratechat".to_string()),
                participants_count: Some(1_842),
            },
            PeerInfo {
                id: PeerId(-2003),
                kind: PeerKind::Chat,
                title: "Weekend Plans".to_string(),
                username: None,
                participants_count: Some(5),
            },
            PeerInfo {
                id: PeerId(-2004),
                kind: PeerKind::Chat,
                title: "Old Project".to_string(),
                username: None,
                participants_count: Some(3),
            },
        ];

        let users = vec![
            UserInfo {
                id: PeerId(1001),
                first_name: Some("Alice".to_string()),
                phone: Some("15551234567".to_string()),
            },
            UserInfo {
                id: PeerId(1002),
                first_name: Some("Boris".to_string()),
                phone: Some("79991234567".to_string()),
            },
            UserInfo {
                id: PeerId(1003),
                first_name: Some("Charlie".to_string()),
                phone: None,
            },
            UserInfo {
                id: PeerId(1004),
                first_name: Some("Dana".to_string()),
                phone: Some("447911123456".to_string()),
            },
            UserInfo {
                id: PeerId(1005),
                first_name: Some("Grace".to_string()),
                phone: None,
            },
        ];

        let dialogs = vec![
            dialog(DialogList::Chats, -2001, 9000, 130),
            dialog(DialogList::Chats, 1001, 8900, 129),
            dialog(DialogList::Chats, -2002, 8800, 128),
            dialog(DialogList::Chats, 1002, 8700, 127),
            dialog(DialogList::Chats, -2003, 8600, 126),
            dialog(DialogList::Chats, 1004, 8500, 125),
            dialog(DialogList::Archived, -2004, 7000, 112),
            dialog(DialogList::Archived, 1005, 6900, 113),
        ];

        let messages = vec![
            message(130, -2001, "Rust 1.89 released with stabilized trait upcasting"),
            message(129, 1001, "the rust rewrite is ready for review"),
            message(128, -2002, "anyone benchmarked the new rust allocator?"),
            message(127, 1002, "lunch tomorrow?"),
            message(126, -2003, "who brings the grill?"),
            message(125, 1004, "rustfmt broke our CI again"),
            message(124, -2001, "New rustup release candidate is out"),
            message(123, -2002, "cargo workspaces make this so much easier"),
            message(122, 1001, "found a rusty old bike in the garage"),
            message(121, -2002, "the borrow checker was right all along, rust wins"),
            message(120, 1004, "rust-analyzer keeps eating my RAM"),
            message(119, -2001, "Announcing the community rust meetup on Friday"),
            message(118, 1002, "did you see the rust game engine demo?"),
            message(117, -2003, "weekend plans moved to sunday"),
            message(116, 1001, "rustlings exercise 42 is brutal"),
            message(115, -2002, "ship it"),
            message(114, 1004, "one more rust question about lifetimes"),
            message(113, 1005, "see you around, new office next week"),
            message(112, -2004, "final project retro notes"),
        ];

        Self {
            peers,
            users,
            dialogs,
            messages,
        }
    }
}

#[async_trait]
impl MessageManager for DemoStore {
    async fn get_conversations(
        &self,
        _filter: &str,
        offset_index: i64,
        limit: usize,
        archived: bool,
    ) -> ManagerResult<DialogsPage> {
        let list = if archived {
            DialogList::Archived
        } else {
            DialogList::Chats
        };
        let mut dialogs: Vec<DialogRecord> = self
            .dialogs
            .iter()
            .filter(|(l, _)| *l == list)
            .map(|(_, d)| d.clone())
            .collect();
        dialogs.sort_by(|a, b| b.index.cmp(&a.index));
        let count = dialogs.len() as u32;
        if offset_index > 0 {
            dialogs.retain(|d| d.index < offset_index);
        }
        dialogs.truncate(limit);
        Ok(DialogsPage {
            dialogs,
            count: Some(count),
        })
    }

    async fn get_search(
        &self,
        peer: Option<PeerId>,
        query: &str,
        _filter: Option<SearchFilter>,
        max_id: Option<MessageId>,
        limit: usize,
        _offset_rate: u32,
    ) -> ManagerResult<MessageSearchPage> {
        let needle = query.to_lowercase();
        let mut ids: Vec<MessageId> = self
            .messages
            .iter()
            .filter(|m| peer.is_none_or(|p| m.peer_id == p))
            .filter(|m| m.text.to_lowercase().contains(&needle))
            .map(|m| m.id)
            .collect();
        ids.sort_by(|a, b| b.cmp(a));
        let count = ids.len() as u32;
        // The offset id itself is included, as the live backend does.
        let start = match max_id {
            Some(max) => ids.iter().position(|id| *id <= max).unwrap_or(ids.len()),
            None => 0,
        };
        let history: Vec<MessageId> = ids[start..].iter().take(limit).copied().collect();
        Ok(MessageSearchPage {
            count,
            history,
            next_rate: None,
        })
    }

    fn get_message(&self, id: MessageId) -> Option<MessageRecord> {
        self.messages.iter().find(|m| m.id == id).cloned()
    }

    fn get_dialog_by_peer(&self, peer: PeerId) -> Option<DialogRecord> {
        self.dialogs
            .iter()
            .find(|(_, d)| d.peer_id == peer)
            .map(|(_, d)| d.clone())
    }
}

#[async_trait]
impl UserManager for DemoStore {
    async fn search_contacts(&self, query: &str, limit: usize) -> ManagerResult<ContactMatches> {
        let needle = query.trim().to_lowercase();
        let mut matches = ContactMatches::default();
        if needle.is_empty() {
            return Ok(matches);
        }
        for peer in &self.peers {
            let hit = peer.title.to_lowercase().contains(&needle)
                || peer
                    .username
                    .as_deref()
                    .is_some_and(|u| u.to_lowercase().contains(&needle));
            if !hit {
                continue;
            }
            if self.get_dialog_by_peer(peer.id).is_some() {
                if matches.my_results.len() < limit {
                    matches.my_results.push(peer.id);
                }
            } else if matches.global_results.len() < limit {
                matches.global_results.push(peer.id);
            }
        }
        Ok(matches)
    }

    fn get_user(&self, id: PeerId) -> Option<UserInfo> {
        self.users.iter().find(|u| u.id == id).cloned()
    }
}

impl PeerManager for DemoStore {
    fn get_peer(&self, id: PeerId) -> Option<PeerInfo> {
        self.peers.iter().find(|p| p.id == id).cloned()
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

// ============================================================================
// Console renderer
// ============================================================================

struct DemoRenderer {
    store: Arc<DemoStore>,
    next_handle: AtomicU64,
}

impl DemoRenderer {
    fn title_of(&self, peer: PeerId) -> String {
        self.store
            .get_peer(peer)
            .map(|p| p.title)
            .unwrap_or_else(|| peer.to_string())
    }
}

impl SidebarRenderer for DemoRenderer {
    fn add_dialog(
        &self,
        dialog: &DialogRecord,
        target: RenderTarget,
        _flags: DialogEntryFlags,
    ) -> RenderedDialog {
        let handle = RenderedDialog(self.next_handle.fetch_add(1, Ordering::SeqCst));
        let slot = match target {
            RenderTarget::List(list) => format!("{list:?}"),
            RenderTarget::Group(group) => format!("{group:?}"),
        };
        info!(target: "Demo/Render", "[{}] + {}", slot, self.title_of(dialog.peer_id));
        handle
    }

    fn set_last_message(
        &self,
        _dialog: &DialogRecord,
        message: &MessageRecord,
        _rendered: RenderedDialog,
    ) {
        info!(target: "Demo/Render", "      \"{}\"", message.text);
    }

    fn set_caption(&self, _rendered: RenderedDialog, caption: &str) {
        if !caption.is_empty() {
            info!(target: "Demo/Render", "      {}", caption);
        }
    }

    fn set_group_visible(&self, group: SearchGroupId, visible: bool) {
        info!(
            target: "Demo/Render",
            "group {:?} ({}) {}",
            group,
            group.label(),
            if visible { "shown" } else { "hidden" }
        );
    }

    fn clear_group(&self, _group: SearchGroupId) {}

    fn set_list_loading(&self, list: DialogList, loading: bool) {
        debug!(target: "Demo/Render", "{:?} loading: {}", list, loading);
    }
}

// ============================================================================
// Canned translator
// ============================================================================

struct DemoTranslator;

#[async_trait]
impl Translator for DemoTranslator {
    async fn translate(
        &self,
        _peer: PeerId,
        message: MessageId,
        to_lang: &str,
        only_cache: bool,
    ) -> ManagerResult<AckedTranslation> {
        if only_cache {
            return Ok(AckedTranslation::ready(false, None));
        }
        let lang = to_lang.to_string();
        Ok(AckedTranslation {
            cached: false,
            result: Box::pin(async move {
                sleep(Duration::from_millis(20)).await;
                Ok(Some(TextWithEntities::plain(format!(
                    "[{lang}] message {message}, translated"
                ))))
            }),
        })
    }
}
