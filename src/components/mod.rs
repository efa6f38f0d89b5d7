pub mod icon;
pub mod translatable;

pub use icon::{AssetFetcher, CustomIcon, IconMarkup, custom_icon_path, load_custom_icon};
pub use translatable::{Middleware, TranslatableMessage, TranslationState};
