//! Menu presenter background task
//!
//! Read-only consumer of lock notifications: rebuilds the menu model whenever
//! the lock state or content availability changes.

use tokio::{
    sync::{broadcast::error::RecvError, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    control::{ControlHandle, Notification},
    surfaces::MenuModel,
};

#[derive(Debug, Default)]
struct MenuFacts {
    unlocked: bool,
    content_loaded: bool,
}

/// Spawn the presenter and return the receiving end of the menu model
pub fn spawn_menu_presenter(
    control: ControlHandle,
    development: bool,
) -> (watch::Receiver<MenuModel>, JoinHandle<()>) {
    let (menu_tx, menu_rx) = watch::channel(MenuModel::build(false, false, development));
    let task = tokio::spawn(menu_presenter_task(control, menu_tx, development));
    (menu_rx, task)
}

/// Background task that keeps the published menu in step with the lock state
pub async fn menu_presenter_task(
    control: ControlHandle,
    menu_tx: watch::Sender<MenuModel>,
    development: bool,
) {
    info!("Starting menu presenter task");

    let mut notifications = control.subscribe();
    let mut facts = MenuFacts::default();
    resync(&control, &mut facts).await;
    publish(&menu_tx, &facts, development);

    loop {
        match notifications.recv().await {
            Ok(Notification::LockStateChanged { is_locked }) => {
                facts.unlocked = !is_locked;
            }
            Ok(Notification::ContentLoaded) => {
                facts.content_loaded = true;
            }
            Ok(_) => continue,
            Err(RecvError::Lagged(skipped)) => {
                warn!("Menu presenter missed {} notifications, resyncing", skipped);
                resync(&control, &mut facts).await;
            }
            Err(RecvError::Closed) => break,
        }

        publish(&menu_tx, &facts, development);
    }

    info!("Menu presenter task stopped");
}

async fn resync(control: &ControlHandle, facts: &mut MenuFacts) {
    match control.status().await {
        Ok(status) => {
            facts.unlocked = status.lock.unlocked;
            facts.content_loaded = status.lock.content_loaded;
        }
        Err(e) => warn!("Failed to read lock state for menu: {}", e),
    }
}

fn publish(menu_tx: &watch::Sender<MenuModel>, facts: &MenuFacts, development: bool) {
    debug!(
        "Rebuilding menu: unlocked={}, content_loaded={}",
        facts.unlocked, facts.content_loaded
    );
    menu_tx.send_replace(MenuModel::build(facts.unlocked, facts.content_loaded, development));
}
