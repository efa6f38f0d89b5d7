//! Render-intent events emitted by the sidebar controller

/// Chrome and navigation intents for the presentation layer. The controller
/// decides *when* these happen; applying them (classes, focus, routing) is the
/// embedder's job. Delivered over an unbounded channel; sends to a dropped
/// receiver are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarEvent {
    /// The search panel expanded or collapsed.
    SearchPanelToggled { active: bool },
    /// The archived-chats panel opened or closed.
    ArchivedPanelToggled { active: bool },
    /// The search input should receive focus.
    FocusSearchInput,
    /// The search input's text should be cleared.
    ClearSearchInput,
}
