pub mod components;
pub mod config;
pub mod format;
pub mod manager;
pub mod render;
pub mod sidebar;
pub mod types;

pub use config::SidebarConfig;
pub use render::{DialogEntryFlags, RenderTarget, RenderedDialog, SearchGroupId, SidebarRenderer};
pub use sidebar::{ScrollProbe, SearchSessionSnapshot, Sidebar, SidebarBuilder};
pub use types::{DialogList, SidebarEvent};
