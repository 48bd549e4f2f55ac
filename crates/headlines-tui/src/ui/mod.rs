//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, title bar, tabs, status bar and overlays
//! - `input`: keyboard event handling
//! - `styles`: color scheme and text styling
//! - `tabs`: per-page content (breaking news, search, bookmarks)

pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
