//! next-calc - a calculator disguise shell
//!
//! A calculator is the default face of the window; a messaging view stays
//! loaded behind it and is revealed only after the passcode is typed on the
//! keypad. This library holds the host side: the lock state machine, the
//! idle countdown, the panic paths and the local control API the surfaces
//! talk to.

pub mod api;
pub mod config;
pub mod control;
pub mod error;
pub mod services;
pub mod state;
pub mod store;
pub mod surfaces;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use control::{ControlHandle, Notification, SurfaceEvent};
pub use error::{ControlError, SettingsError};
pub use state::AppState;
pub use store::SettingsStore;
pub use tasks::{spawn_controller, spawn_menu_presenter, ControlOptions};
pub use utils::signals::shutdown_signal;
