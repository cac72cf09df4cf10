//! Advanced screen: tethering, roaming and APN.

use tracing::{info, warn};

use crate::backend::ConnectionManager;
use crate::prompt::{Prompter, TextPrompt, ask_secret};
use crate::settings::{GSM_APN, GSM_ROAMING, SettingsStore};

#[derive(Debug)]
pub struct AdvancedSettingsView<S> {
    settings: S,
    tethering_enabled: bool,
    /// Cleared while a tethering change is in flight.
    tethering_toggle_enabled: bool,
    roaming_enabled: bool,
    ipv4_address: String,
}

impl<S: SettingsStore> AdvancedSettingsView<S> {
    /// Reads the stored cellular settings and pushes them to the manager once.
    pub fn new<M: ConnectionManager + ?Sized>(settings: S, manager: &M) -> Self {
        let roaming_enabled = settings.get_bool(GSM_ROAMING);
        let apn = settings.get(GSM_APN);
        push_cellular(manager, roaming_enabled, &apn);

        Self {
            settings,
            tethering_enabled: manager.is_tethering_enabled(),
            tethering_toggle_enabled: true,
            roaming_enabled,
            ipv4_address: manager.ipv4_address(),
        }
    }

    pub fn refresh<M: ConnectionManager + ?Sized>(&mut self, manager: &M) {
        self.ipv4_address = manager.ipv4_address();
        self.tethering_enabled = manager.is_tethering_enabled();
        self.tethering_toggle_enabled = true;
    }

    /// The toggle stays disabled until the next refresh. A rejected change
    /// puts the switch back where it was.
    pub fn toggle_tethering<M: ConnectionManager + ?Sized>(&mut self, enabled: bool, manager: &M) {
        if !self.tethering_toggle_enabled {
            return;
        }
        info!("setting tethering enabled={}", enabled);
        let previous = self.tethering_enabled;
        self.tethering_enabled = enabled;
        self.tethering_toggle_enabled = false;
        if let Err(e) = manager.set_tethering_enabled(enabled) {
            warn!("failed to set tethering: {}", e);
            self.tethering_enabled = previous;
        }
    }

    pub fn edit_tethering_password<M, P>(&mut self, manager: &M, prompter: &mut P)
    where
        M: ConnectionManager + ?Sized,
        P: Prompter + ?Sized,
    {
        let prompt = TextPrompt::password("Enter new tethering password")
            .seed(manager.tethering_password());
        let Some(password) = ask_secret(prompter, &prompt) else {
            return;
        };
        if let Err(e) = manager.set_tethering_password(&password) {
            warn!("failed to change tethering password: {}", e);
        }
    }

    pub fn toggle_roaming<M: ConnectionManager + ?Sized>(&mut self, enabled: bool, manager: &M) {
        self.roaming_enabled = enabled;
        if let Err(e) = self.settings.put_bool(GSM_ROAMING, enabled) {
            warn!("failed to persist roaming setting: {}", e);
        }
        push_cellular(manager, enabled, &self.settings.get(GSM_APN));
    }

    /// A blank answer switches back to automatic APN configuration; cancel
    /// leaves everything as it was.
    pub fn edit_apn<M, P>(&mut self, manager: &M, prompter: &mut P)
    where
        M: ConnectionManager + ?Sized,
        P: Prompter + ?Sized,
    {
        let roaming = self.settings.get_bool(GSM_ROAMING);
        let prompt = TextPrompt::new("Enter APN")
            .subtitle("leave blank for automatic configuration")
            .seed(self.settings.get(GSM_APN));
        let Some(answer) = prompter.text(&prompt) else {
            return;
        };

        let apn = answer.trim();
        let stored = if apn.is_empty() {
            self.settings.remove(GSM_APN)
        } else {
            self.settings.put(GSM_APN, apn)
        };
        if let Err(e) = stored {
            warn!("failed to persist APN: {}", e);
        }
        push_cellular(manager, roaming, apn);
    }

    pub fn tethering_enabled(&self) -> bool {
        self.tethering_enabled
    }

    pub fn tethering_toggle_enabled(&self) -> bool {
        self.tethering_toggle_enabled
    }

    pub fn roaming_enabled(&self) -> bool {
        self.roaming_enabled
    }

    pub fn apn(&self) -> String {
        self.settings.get(GSM_APN)
    }

    pub fn ipv4_address(&self) -> &str {
        &self.ipv4_address
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }
}

fn push_cellular<M: ConnectionManager + ?Sized>(manager: &M, roaming: bool, apn: &str) {
    if let Err(e) = manager.update_cellular_settings(roaming, apn) {
        warn!("failed to update cellular settings: {}", e);
    }
}
