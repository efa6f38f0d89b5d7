//! Custom icon loading

use async_trait::async_trait;
use log::error;

/// Icons bundled as standalone SVG assets rather than font glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomIcon {
    Like,
}

impl CustomIcon {
    pub fn name(&self) -> &'static str {
        match self {
            CustomIcon::Like => "like",
        }
    }
}

/// Base path custom icon assets are served from.
pub const CUSTOM_ICON_BASE: &str = "assets/img/customIcons/";

/// Asset path for an icon's SVG file.
pub fn custom_icon_path(icon: CustomIcon) -> String {
    format!("{}{}.svg", CUSTOM_ICON_BASE, icon.name())
}

/// Fetches bundled asset files by path.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch_text(&self, path: &str) -> crate::manager::Result<String>;
}

/// Markup for an icon slot. `svg` is `None` when there is nothing to show;
/// the slot itself still renders (as an empty span) so layout stays stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconMarkup {
    pub svg: Option<String>,
}

/// Load an icon's SVG markup. No icon, or a failed fetch, yields empty
/// markup; fetch failures are logged, never surfaced.
pub async fn load_custom_icon(fetcher: &dyn AssetFetcher, icon: Option<CustomIcon>) -> IconMarkup {
    let Some(icon) = icon else {
        return IconMarkup::default();
    };
    match fetcher.fetch_text(&custom_icon_path(icon)).await {
        Ok(svg) => IconMarkup { svg: Some(svg) },
        Err(e) => {
            error!(target: "Components/Icon", "SVG loading error: {}", e);
            IconMarkup::default()
        }
    }
}
