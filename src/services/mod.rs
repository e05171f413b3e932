//! Filesystem side effects performed on behalf of the control loop

pub mod content_data;

pub use content_data::*;
