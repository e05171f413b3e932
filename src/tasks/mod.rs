//! Background tasks module
//!
//! The control loop that owns all lock state, and the presenter that follows it.

pub mod control_loop;
pub mod menu_presenter;

// Re-export main functions
pub use control_loop::{spawn_controller, ControlOptions, Controller};
pub use menu_presenter::{menu_presenter_task, spawn_menu_presenter};
