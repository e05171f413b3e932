//! The control loop: sole owner of lock state, idle countdown and settings
//!
//! Commands and idle checks are serialized on one task, so transitions are
//! totally ordered and each command observes the state left by the previous
//! one.

use std::path::PathBuf;
use tokio::{
    sync::{broadcast, mpsc, oneshot},
    task::JoinHandle,
    time::Instant,
};
use tracing::{debug, error, info, warn};

use crate::{
    control::{Command, ControlHandle, Notification, StatusSnapshot, SurfaceEvent},
    error::{ControlError, SettingsError},
    services::{clear_content_data, ClearOutcome},
    state::{ActivityMonitor, DigitOutcome, LockReason, LockState, PanicTrigger, PasscodeBuffer},
    store::SettingsStore,
    surfaces::ContentView,
};

const COMMAND_QUEUE_SIZE: usize = 64;
const NOTIFICATION_CAPACITY: usize = 100;

/// Process-level switches for the control loop
#[derive(Debug, Clone)]
pub struct ControlOptions {
    /// Persistent partition of the embedded content view
    pub content_data_dir: PathBuf,
    pub development: bool,
    /// Treat the host window being hidden as a panic
    pub panic_on_hide: bool,
}

pub struct Controller {
    lock: LockState,
    activity: ActivityMonitor,
    buffer: PasscodeBuffer,
    panic_trigger: PanicTrigger,
    content: ContentView,
    store: SettingsStore,
    options: ControlOptions,
    notifications: broadcast::Sender<Notification>,
}

/// Start the control loop and return a handle to it
pub fn spawn_controller(store: SettingsStore, options: ControlOptions) -> (ControlHandle, JoinHandle<()>) {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_SIZE);
    let (notification_tx, _) = broadcast::channel(NOTIFICATION_CAPACITY);

    let controller = Controller::new(store, options, notification_tx.clone());
    let task = tokio::spawn(controller.run(command_rx));

    (ControlHandle::new(command_tx, notification_tx), task)
}

fn respond<T>(command: &'static str, reply: oneshot::Sender<T>, value: T) {
    if reply.send(value).is_err() {
        debug!("Caller of {} went away before the reply", command);
    }
}

impl Controller {
    pub fn new(
        store: SettingsStore,
        options: ControlOptions,
        notifications: broadcast::Sender<Notification>,
    ) -> Self {
        Self {
            lock: LockState::new(),
            activity: ActivityMonitor::new(),
            buffer: PasscodeBuffer::new(store.passcode()),
            panic_trigger: PanicTrigger::new(),
            content: ContentView::default(),
            store,
            options,
            notifications,
        }
    }

    /// Run until every [`ControlHandle`] is dropped
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        info!("Control loop started - app is locked");

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => break,
                },
                _ = self.activity.next_check() => self.idle_check(),
            }
        }

        self.activity.cancel();
        info!("Control loop stopped");
    }

    async fn handle(&mut self, command: Command) {
        let name = command.name();
        debug!("Handling {}", name);

        match command {
            Command::Unlock { reply } => {
                let unlocked = self.unlock();
                respond(name, reply, unlocked);
            }
            Command::Lock { reply } => {
                let locked = self.lock(LockReason::User);
                respond(name, reply, locked);
            }
            Command::GetPasscode { reply } => {
                respond(name, reply, self.store.passcode().to_string());
            }
            Command::SetPasscode { passcode, reply } => {
                let result = self.set_passcode(&passcode).await;
                respond(name, reply, result);
            }
            Command::ResetPasscode { reply } => {
                let result = self.reset_settings().await;
                respond(name, reply, result);
            }
            Command::GetIdleTimeout { reply } => {
                respond(name, reply, self.store.idle_timeout_seconds());
            }
            Command::SetIdleTimeout { seconds, reply } => {
                let result = self.set_idle_timeout(seconds).await;
                respond(name, reply, result);
            }
            Command::Panic { reply } => {
                self.panic().await;
                respond(name, reply, true);
            }
            Command::ClearContentData { reply } => {
                let outcome = self.clear_content_data().await;
                respond(name, reply, outcome);
            }
            Command::IsDevelopmentMode { reply } => {
                respond(name, reply, self.options.development);
            }
            Command::DisguiseDigit { digit, reply } => {
                let result = self.disguise_digit(digit).await;
                respond(name, reply, result);
            }
            Command::DisguiseClear { reply } => {
                self.buffer.clear();
                respond(name, reply, ());
            }
            Command::ContentKey { key, reply } => {
                let fired = self.content_key(&key).await;
                respond(name, reply, fired);
            }
            Command::Surface { event, reply } => {
                self.surface_event(event).await;
                respond(name, reply, ());
            }
            Command::OpenSettings { reply } => {
                let opened = self.open_settings();
                respond(name, reply, opened);
            }
            Command::CloseSettings { reply } => {
                let closed = self.close_settings();
                respond(name, reply, closed);
            }
            Command::Status { reply } => {
                respond(name, reply, self.status());
            }
        }
    }

    fn notify(&self, notification: Notification) {
        if self.notifications.send(notification).is_err() {
            debug!("No notification subscribers");
        }
    }

    // ===== transitions =====

    fn unlock(&mut self) -> bool {
        if !self.lock.unlock() {
            debug!("Unlock ignored - already unlocked");
            return false;
        }

        self.content.reveal();
        self.activity.unlocked(self.store.idle_timeout_seconds());

        info!("App unlocked - content view revealed");
        self.notify(Notification::LockStateChanged { is_locked: false });
        true
    }

    fn lock(&mut self, reason: LockReason) -> bool {
        if reason == LockReason::User && !self.lock.content_loaded {
            warn!("Lock requested before the content finished loading - ignored");
            return false;
        }
        if !self.lock.lock() {
            debug!("Lock ({}) ignored - already locked", reason.as_str());
            return false;
        }

        self.content.park();
        self.activity.cancel();
        self.buffer.reload(self.store.passcode());

        if self.lock.close_settings() {
            info!("Closing settings overlay on lock");
            self.notify(Notification::SettingsClosed);
        }

        info!("App locked ({}) - content view parked off-screen", reason.as_str());
        self.notify(Notification::LockStateChanged { is_locked: true });
        true
    }

    /// Forced lock plus destructive reset. Never fails: cleanup errors are logged.
    async fn panic(&mut self) {
        warn!("Panic mode activated");
        self.lock(LockReason::Panic);

        self.notify(Notification::ContentStorageClearRequested);

        let outcome = clear_content_data(&self.options.content_data_dir).await;
        if !outcome.success {
            warn!("Content data not cleared during panic: {}", outcome.message);
        }

        if let Err(e) = self.store.reset().await {
            error!("Failed to reset settings during panic: {}", e);
        }
        self.buffer.reload(self.store.passcode());

        self.notify(Notification::WindowHideRequested);
        info!("Panic handling complete");
    }

    fn idle_check(&mut self) {
        let timeout = self.store.idle_timeout_seconds();
        if !self.lock.unlocked || timeout == 0 {
            self.activity.cancel();
            return;
        }

        if self.activity.check(timeout) {
            info!("Idle timeout of {}s reached, locking", timeout);
            self.lock(LockReason::IdleTimeout);
        }
    }

    fn record_activity(&mut self) {
        self.activity
            .reset(self.lock.unlocked, self.store.idle_timeout_seconds());
    }

    // ===== settings =====

    async fn set_passcode(&mut self, passcode: &str) -> Result<(), SettingsError> {
        if let Err(e) = self.store.set_passcode(passcode).await {
            warn!("Passcode change rejected: {}", e);
            return Err(e);
        }
        self.buffer.reload(self.store.passcode());
        Ok(())
    }

    async fn reset_settings(&mut self) -> Result<(), SettingsError> {
        if let Err(e) = self.store.reset().await {
            error!("Failed to reset settings: {}", e);
            return Err(e);
        }
        self.buffer.reload(self.store.passcode());
        self.record_activity();
        Ok(())
    }

    async fn set_idle_timeout(&mut self, seconds: u64) -> Result<(), SettingsError> {
        if let Err(e) = self.store.set_idle_timeout(seconds).await {
            error!("Failed to save idle timeout: {}", e);
            return Err(e);
        }
        // Re-arm against the new threshold, or drop the countdown for 0
        self.record_activity();
        Ok(())
    }

    async fn clear_content_data(&mut self) -> ClearOutcome {
        clear_content_data(&self.options.content_data_dir).await
    }

    fn open_settings(&mut self) -> bool {
        if self.lock.is_locked() {
            warn!("Settings requested while locked - ignored");
            return false;
        }
        self.lock.settings_open = true;
        self.notify(Notification::OpenSettingsRequested);
        true
    }

    fn close_settings(&mut self) -> bool {
        let was_open = self.lock.close_settings();
        if was_open {
            self.notify(Notification::SettingsClosed);
        }
        was_open
    }

    // ===== surface input =====

    async fn disguise_digit(&mut self, digit: char) -> Result<DigitOutcome, ControlError> {
        if !digit.is_ascii_digit() {
            return Err(ControlError::InvalidDigit(digit));
        }

        let outcome = self.buffer.push(digit);
        match outcome {
            DigitOutcome::Pending => {}
            DigitOutcome::Unlock => {
                info!("Passcode entered on calculator");
                self.unlock();
            }
            DigitOutcome::EmergencyReset => {
                warn!("Emergency code entered on calculator");
                self.panic().await;
            }
            DigitOutcome::EasterEgg => {
                debug!("Easter egg code entered");
                self.notify(Notification::EasterEgg);
            }
        }
        Ok(outcome)
    }

    async fn content_key(&mut self, key: &str) -> bool {
        if self.lock.unlocked {
            self.record_activity();
        }

        if !self.panic_trigger.feed(key, Instant::now()) {
            return false;
        }

        warn!("Panic sequence typed in content view");
        self.panic().await;
        true
    }

    async fn surface_event(&mut self, event: SurfaceEvent) {
        let unlocked = self.lock.unlocked;
        let timeout = self.store.idle_timeout_seconds();

        match event {
            SurfaceEvent::Input { surface } => {
                if unlocked {
                    debug!("Input activity on {:?}", surface);
                    self.record_activity();
                }
            }
            SurfaceEvent::FocusGained => self.activity.focus_gained(),
            SurfaceEvent::FocusLost | SurfaceEvent::Minimized => {
                debug!("Window lost attention ({:?})", event);
                self.activity.focus_lost(unlocked, timeout);
            }
            SurfaceEvent::Restored
            | SurfaceEvent::Shown
            | SurfaceEvent::ContentNavigated
            | SurfaceEvent::ContentDomReady => {
                if unlocked {
                    debug!("Activity from {:?}", event);
                    self.record_activity();
                }
            }
            SurfaceEvent::Hidden => {
                if self.options.panic_on_hide {
                    warn!("Host window hidden - treating as panic");
                    self.panic().await;
                }
            }
            SurfaceEvent::Resized { width, height } => self.content.resize(width, height),
            SurfaceEvent::ContentLoaded => {
                if !self.lock.content_loaded {
                    self.lock.content_loaded = true;
                    info!("Embedded content loaded");
                    self.notify(Notification::ContentLoaded);
                }
            }
            SurfaceEvent::Closed => {
                info!("Host window closed");
                self.activity.cancel();
            }
        }
    }

    fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            lock: self.lock.clone(),
            content_bounds: self.content.bounds(),
            idle: self.activity.status(self.store.idle_timeout_seconds()),
            development: self.options.development,
        }
    }
}
