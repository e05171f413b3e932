//! Placement of the embedded content view inside the host window
//!
//! The view is never destroyed while locked: it is moved far above the
//! visible region so its page keeps running and delivering notifications.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Vertical offset used to park the view out of sight
pub const OFFSCREEN_Y: i32 = -10_000;

pub const DEFAULT_WINDOW_WIDTH: u32 = 1200;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct ContentView {
    bounds: Bounds,
}

impl ContentView {
    /// Created parked, since the app starts locked
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bounds: Bounds { x: 0, y: OFFSCREEN_Y, width, height },
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn is_visible(&self) -> bool {
        self.bounds.y >= 0
    }

    /// Move into the visible, interactive region
    pub fn reveal(&mut self) {
        self.bounds.x = 0;
        self.bounds.y = 0;
        debug!("Content view revealed at {:?}", self.bounds);
    }

    /// Move out of sight without unloading
    pub fn park(&mut self) {
        self.bounds.x = 0;
        self.bounds.y = OFFSCREEN_Y;
        debug!("Content view parked at {:?}", self.bounds);
    }

    /// Follow the host window size, keeping the current placement
    pub fn resize(&mut self, width: u32, height: u32) {
        self.bounds.width = width;
        self.bounds.height = height;
    }
}

impl Default for ContentView {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_parked() {
        let view = ContentView::default();
        assert!(!view.is_visible());
        assert_eq!(view.bounds().y, OFFSCREEN_Y);
        assert_eq!(view.bounds().width, 1200);
    }

    #[test]
    fn resize_keeps_placement() {
        let mut view = ContentView::default();
        view.resize(640, 480);
        assert!(!view.is_visible());
        view.reveal();
        view.resize(1024, 768);
        assert_eq!(view.bounds(), Bounds { x: 0, y: 0, width: 1024, height: 768 });
    }
}
