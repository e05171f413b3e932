//! Shared state of the HTTP control surface

use std::{sync::Arc, time::Instant};
use tokio::sync::watch;

use crate::{api::access::AccessPolicy, control::ControlHandle, surfaces::MenuModel};

/// What every handler gets: a way to reach the control loop plus server metadata
#[derive(Debug, Clone)]
pub struct AppState {
    pub control: ControlHandle,
    pub menu: watch::Receiver<MenuModel>,
    pub access: Arc<AccessPolicy>,
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
}

impl AppState {
    pub fn new(
        control: ControlHandle,
        menu: watch::Receiver<MenuModel>,
        access: AccessPolicy,
        host: String,
        port: u16,
    ) -> Self {
        Self {
            control,
            menu,
            access: Arc::new(access),
            start_time: Instant::now(),
            port,
            host,
        }
    }

    /// Latest menu published by the presenter
    pub fn current_menu(&self) -> MenuModel {
        self.menu.borrow().clone()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
