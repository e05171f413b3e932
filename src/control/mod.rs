//! Command/control contract between the host and the presentation surfaces
//!
//! Surfaces never touch shared state: they send a [`Command`] and receive a
//! reply, and they listen to [`Notification`]s.

pub mod command;
pub mod handle;

pub use command::{Command, Notification, StatusSnapshot, Surface, SurfaceEvent};
pub use handle::ControlHandle;
