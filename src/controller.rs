//! Screen navigation and connection flow for the networking panel.
//!
//! ```text
//!                 OpenAdvanced
//!   NetworkList ───────────────► Advanced
//!     │   ▲  ▲                      │
//!     │   │  └──────── Back ────────┘
//!     │   │
//!     │   └── Back / DetailConnect / DetailForget
//!     │                              │
//!     └──── View(ssid) ─────► NetworkDetail(entry)
//! ```
//!
//! Every activation starts on `NetworkList`.

use std::sync::mpsc::{Receiver, TryRecvError};

use tracing::{debug, info, warn};

use crate::backend::{ConnectionManager, ManagerSignal};
use crate::models::{NetworkEntry, SecurityType, Ssid};
use crate::prompt::{Prompter, TextPrompt, ask_secret};
use crate::settings::SettingsStore;
use crate::views::{AdvancedSettingsView, DetailIntent, ListIntent, NetworkDetailView, NetworkListView};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    NetworkList,
    NetworkDetail(NetworkEntry),
    Advanced,
}

/// User input coming from a front end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PanelIntent {
    /// Label click on a list row.
    Connect(Ssid),
    /// Edit button on a list row.
    View(Ssid),
    DetailConnect,
    DetailForget,
    OpenAdvanced,
    Back,
    ToggleTethering(bool),
    EditTetheringPassword,
    ToggleRoaming(bool),
    EditApn,
}

pub struct NetworkingController<M, S, P> {
    manager: M,
    prompter: P,
    signals: Receiver<ManagerSignal>,
    screen: Screen,
    active: bool,
    show_advanced: bool,
    list: NetworkListView,
    detail: NetworkDetailView,
    advanced: AdvancedSettingsView<S>,
}

impl<M, S, P> NetworkingController<M, S, P>
where
    M: ConnectionManager,
    S: SettingsStore,
    P: Prompter,
{
    /// `signals` must be the receiving end of the sender the manager was
    /// built with.
    pub fn new(manager: M, settings: S, prompter: P, signals: Receiver<ManagerSignal>) -> Self {
        let advanced = AdvancedSettingsView::new(settings, &manager);
        Self {
            manager,
            prompter,
            signals,
            screen: Screen::NetworkList,
            active: false,
            show_advanced: true,
            list: NetworkListView::new(),
            detail: NetworkDetailView::new(),
            advanced,
        }
    }

    /// Hide the Advanced screen entirely.
    pub fn with_advanced(mut self, show_advanced: bool) -> Self {
        self.show_advanced = show_advanced;
        self
    }

    /// Panel became visible.
    pub fn activate(&mut self) {
        debug!("networking panel activated");
        self.active = true;
        self.screen = Screen::NetworkList;
        self.manager.start();
        self.refresh();
    }

    /// Panel was hidden. The last rendered snapshot stays as it is.
    pub fn deactivate(&mut self) {
        debug!("networking panel deactivated");
        self.active = false;
        self.manager.stop();
    }

    pub fn refresh(&mut self) {
        self.list.refresh(&self.manager);
        if let Screen::NetworkDetail(_) = self.screen {
            self.detail.refresh(&self.manager);
            if let Some(network) = self.detail.network() {
                self.screen = Screen::NetworkDetail(network.clone());
            }
        }
        self.advanced.refresh(&self.manager);
    }

    /// Apply every signal queued by the manager. Consecutive refreshes are
    /// folded into one. Returns the number of signals consumed.
    pub fn process_signals(&mut self) -> usize {
        if !self.active {
            return 0;
        }

        let mut pending = Vec::new();
        loop {
            match self.signals.try_recv() {
                Ok(signal) => pending.push(signal),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("connection manager signal channel closed");
                    break;
                }
            }
        }

        let count = pending.len();
        let mut dirty = false;
        for signal in pending {
            match signal {
                ManagerSignal::Refresh => dirty = true,
                ManagerSignal::WrongPassword(ssid) => {
                    if dirty {
                        self.refresh();
                        dirty = false;
                    }
                    self.on_wrong_password(&ssid);
                }
            }
        }
        if dirty {
            self.refresh();
        }
        count
    }

    pub fn handle(&mut self, intent: PanelIntent) {
        if !self.active {
            debug!(?intent, "ignoring intent while panel is inactive");
            return;
        }

        match intent {
            PanelIntent::Connect(_) | PanelIntent::View(_)
                if self.screen != Screen::NetworkList =>
            {
                debug!(?intent, "ignoring list intent outside the network list");
            }
            PanelIntent::Connect(ssid) => {
                if let Some(ListIntent::Connect(network)) = self.list.click(&ssid) {
                    self.request_connect(&network);
                }
            }
            PanelIntent::View(ssid) => {
                if let Some(ListIntent::View(network)) = self.list.edit(&ssid) {
                    self.request_view(network);
                }
            }
            PanelIntent::DetailConnect => {
                if !matches!(self.screen, Screen::NetworkDetail(_)) {
                    return;
                }
                if let Some(DetailIntent::Connect(network)) = self.detail.press_connect() {
                    self.request_connect(&network);
                    self.navigate(Screen::NetworkList);
                }
            }
            PanelIntent::DetailForget => {
                if !matches!(self.screen, Screen::NetworkDetail(_)) {
                    return;
                }
                if let Some(DetailIntent::Forget(network)) = self.detail.press_forget() {
                    self.request_forget(&network);
                    self.navigate(Screen::NetworkList);
                }
            }
            PanelIntent::OpenAdvanced => {
                if self.show_advanced && self.screen == Screen::NetworkList {
                    self.navigate(Screen::Advanced);
                }
            }
            PanelIntent::Back => self.navigate(Screen::NetworkList),
            intent if self.screen != Screen::Advanced => {
                debug!(?intent, "ignoring advanced intent outside the advanced screen");
            }
            PanelIntent::ToggleTethering(enabled) => {
                self.advanced.toggle_tethering(enabled, &self.manager);
            }
            PanelIntent::EditTetheringPassword => {
                self.advanced
                    .edit_tethering_password(&self.manager, &mut self.prompter);
            }
            PanelIntent::ToggleRoaming(enabled) => {
                self.advanced.toggle_roaming(enabled, &self.manager);
            }
            PanelIntent::EditApn => {
                self.advanced.edit_apn(&self.manager, &mut self.prompter);
            }
        }
    }

    pub fn request_connect(&mut self, network: &NetworkEntry) {
        if self.manager.is_known_connection(&network.ssid) {
            info!("activating saved connection {}", network.ssid);
            if let Err(e) = self.manager.activate_known_connection(&network.ssid) {
                warn!("failed to activate {}: {}", network.ssid, e);
            }
            self.list.refresh(&self.manager);
            return;
        }

        match network.security_type {
            SecurityType::Open => {
                info!("connecting to open network {}", network.ssid);
                if let Err(e) = self.manager.connect(network, None) {
                    warn!("failed to connect to {}: {}", network.ssid, e);
                }
            }
            SecurityType::Wpa => {
                let prompt = TextPrompt::password("Enter password")
                    .subtitle(format!("for \"{}\"", network.ssid));
                self.connect_with_prompt(network, &prompt);
            }
            SecurityType::Unsupported => {
                warn!("refusing to connect to {}: unsupported security", network.ssid);
            }
        }
    }

    pub fn request_view(&mut self, network: NetworkEntry) {
        let known = self.manager.is_known_connection(&network.ssid);
        self.detail.view(network.clone(), known);
        self.navigate(Screen::NetworkDetail(network));
    }

    pub fn request_forget(&mut self, network: &NetworkEntry) {
        let message = format!("Forget Wi-Fi Network \"{}\"?", network.ssid);
        if !self.prompter.confirm(&message) {
            return;
        }

        info!("forgetting {}", network.ssid);
        if let Err(e) = self.manager.forget_connection(&network.ssid) {
            warn!("failed to forget {}: {}", network.ssid, e);
        }
        self.navigate(Screen::NetworkList);
        self.refresh();
    }

    /// Re-prompt after a rejected passphrase, unless the network has
    /// disappeared in the meantime.
    pub fn on_wrong_password(&mut self, ssid: &Ssid) {
        let seen = self.manager.seen_networks();
        let Some(network) = seen.get(ssid) else {
            debug!("dropping wrong-password signal for vanished network {}", ssid);
            return;
        };

        let prompt =
            TextPrompt::password("Wrong password").subtitle(format!("for \"{}\"", network.ssid));
        self.connect_with_prompt(network, &prompt);
    }

    fn connect_with_prompt(&mut self, network: &NetworkEntry, prompt: &TextPrompt) {
        let Some(passphrase) = ask_secret(&mut self.prompter, prompt) else {
            debug!("password prompt for {} cancelled", network.ssid);
            return;
        };
        info!("connecting to {}", network.ssid);
        if let Err(e) = self.manager.connect(network, Some(&passphrase)) {
            warn!("failed to connect to {}: {}", network.ssid, e);
        }
    }

    fn navigate(&mut self, screen: Screen) {
        if self.screen != screen {
            debug!(from = ?self.screen, to = ?screen, "navigate");
        }
        self.screen = screen;
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn show_advanced(&self) -> bool {
        self.show_advanced
    }

    pub fn list(&self) -> &NetworkListView {
        &self.list
    }

    pub fn detail(&self) -> &NetworkDetailView {
        &self.detail
    }

    pub fn advanced(&self) -> &AdvancedSettingsView<S> {
        &self.advanced
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn prompter_mut(&mut self) -> &mut P {
        &mut self.prompter
    }
}
