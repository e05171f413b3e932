//! Host-side models of the presentation surfaces
//!
//! The surfaces themselves live in separate processes; these types describe
//! what the control loop decides for them.

pub mod content_view;
pub mod menu;

pub use content_view::{Bounds, ContentView, OFFSCREEN_Y};
pub use menu::{MenuAction, MenuEntry, MenuModel};
