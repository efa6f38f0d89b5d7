use std::time::Duration;

/// Tuning knobs for the sidebar controller. `Default` matches the stock
/// client behavior.
#[derive(Clone, Debug)]
pub struct SidebarConfig {
    /// Dialogs requested per conversation-list page.
    pub dialogs_page_size: usize,
    /// Message ids requested per search page.
    pub search_page_size: usize,
    /// Maximum contacts requested per contact search.
    pub contacts_limit: usize,
    /// How many trailing list entries count as "near the end" when deciding
    /// whether a scroll position should trigger the next page.
    pub scroll_lookback: usize,
    /// Delay before a scroll-triggered search continuation fires; rapid
    /// scroll events within the window coalesce into one fetch.
    pub search_debounce: Duration,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            dialogs_page_size: 50,
            search_page_size: 20,
            contacts_limit: 20,
            scroll_lookback: 5,
            search_debounce: Duration::ZERO,
        }
    }
}
