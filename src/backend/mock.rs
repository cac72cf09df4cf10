use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::backend::{BackendError, BackendResult, ConnectionManager, ManagerSignal, SignalSender};
use crate::models::{ConnectedType, NetworkEntry, SecurityType, SeenNetworks, Ssid};

/// A command the panel issued, as recorded by [`MockBackend`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendCall {
    ActivateKnown(Ssid),
    Connect {
        ssid: Ssid,
        passphrase: Option<String>,
    },
    Forget(Ssid),
    SetTethering(bool),
    SetTetheringPassword(String),
    UpdateCellular {
        roaming: bool,
        apn: String,
    },
    Start,
    Stop,
}

#[derive(Default)]
struct MockState {
    seen: SeenNetworks,
    known: HashSet<Ssid>,
    passphrases: HashMap<Ssid, String>,
    tethering: bool,
    tethering_password: String,
    ipv4_address: String,
    scanning: bool,
    fail_tethering: bool,
    snapshot_reads: usize,
    calls: Vec<BackendCall>,
}

/// In-memory connection manager for the demo mode and tests.
///
/// Every command is appended to a call log. Commands also update the fake
/// state the way a real manager eventually would, and send
/// [`ManagerSignal::Refresh`] if a signal sender is attached.
pub struct MockBackend {
    state: RefCell<MockState>,
    signals: Option<SignalSender>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(MockState {
                tethering_password: "swagswagcomma".to_string(),
                ..MockState::default()
            }),
            signals: None,
        }
    }

    /// A populated backend for running the panel without NetworkManager.
    pub fn demo() -> Self {
        let backend = Self::new();
        backend.set_networks(
            [
                NetworkEntry::new("Home_Fiber_5G", 92, SecurityType::Wpa)
                    .with_connected(ConnectedType::Connected),
                NetworkEntry::new("Office_Main", 71, SecurityType::Wpa),
                NetworkEntry::new("Coffee_Shop_Free", 64, SecurityType::Open),
                NetworkEntry::new("Guest_Network", 40, SecurityType::Open),
                NetworkEntry::new("Corp_Enterprise", 38, SecurityType::Unsupported),
                NetworkEntry::new("Linksys_502", 12, SecurityType::Wpa),
            ]
            .into_iter()
            .collect(),
        );
        backend.set_known(&Ssid::from("Home_Fiber_5G"), true);
        backend.set_known(&Ssid::from("Guest_Network"), true);
        backend.require_passphrase(&Ssid::from("Office_Main"), "correct horse");
        backend.set_ipv4_address("192.168.43.1");
        backend
    }

    pub fn with_signals(mut self, signals: SignalSender) -> Self {
        self.signals = Some(signals);
        self
    }

    pub fn set_networks(&self, seen: SeenNetworks) {
        self.state.borrow_mut().seen = seen;
    }

    pub fn set_known(&self, ssid: &Ssid, known: bool) {
        let mut state = self.state.borrow_mut();
        if known {
            state.known.insert(ssid.clone());
        } else {
            state.known.remove(ssid);
        }
    }

    /// Make [`ConnectionManager::connect`] reject any other passphrase for `ssid`
    /// with a [`ManagerSignal::WrongPassword`].
    pub fn require_passphrase(&self, ssid: &Ssid, passphrase: &str) {
        self.state
            .borrow_mut()
            .passphrases
            .insert(ssid.clone(), passphrase.to_string());
    }

    pub fn set_tethering(&self, enabled: bool) {
        self.state.borrow_mut().tethering = enabled;
    }

    pub fn set_ipv4_address(&self, address: &str) {
        self.state.borrow_mut().ipv4_address = address.to_string();
    }

    /// Reject tethering changes with [`BackendError::PermissionDenied`].
    pub fn fail_tethering_changes(&self, fail: bool) {
        self.state.borrow_mut().fail_tethering = fail;
    }

    /// How many times the scan snapshot has been read.
    pub fn snapshot_reads(&self) -> usize {
        self.state.borrow().snapshot_reads
    }

    pub fn is_scanning(&self) -> bool {
        self.state.borrow().scanning
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Push a signal as if it came from the manager's own thread.
    pub fn emit(&self, signal: ManagerSignal) {
        if let Some(tx) = &self.signals {
            // The receiver is gone only when the panel has been torn down.
            let _ = tx.send(signal);
        }
    }

    fn record(&self, call: BackendCall) {
        debug!(?call, "mock backend call");
        self.state.borrow_mut().calls.push(call);
    }

    fn mark_connected(&self, ssid: &Ssid) {
        let mut state = self.state.borrow_mut();
        let entries = state.seen.values();
        for entry in entries {
            let connected = if &entry.ssid == ssid {
                ConnectedType::Connected
            } else {
                ConnectedType::Disconnected
            };
            state.seen.insert(entry.with_connected(connected));
        }
        state.known.insert(ssid.clone());
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionManager for MockBackend {
    fn seen_networks(&self) -> SeenNetworks {
        let mut state = self.state.borrow_mut();
        state.snapshot_reads += 1;
        state.seen.clone()
    }

    fn is_known_connection(&self, ssid: &Ssid) -> bool {
        self.state.borrow().known.contains(ssid)
    }

    fn ipv4_address(&self) -> String {
        self.state.borrow().ipv4_address.clone()
    }

    fn activate_known_connection(&self, ssid: &Ssid) -> BackendResult<()> {
        self.record(BackendCall::ActivateKnown(ssid.clone()));
        if !self.is_known_connection(ssid) {
            return Err(BackendError::NotFound(ssid.to_string()));
        }
        self.mark_connected(ssid);
        self.emit(ManagerSignal::Refresh);
        Ok(())
    }

    fn connect(&self, network: &NetworkEntry, passphrase: Option<&str>) -> BackendResult<()> {
        self.record(BackendCall::Connect {
            ssid: network.ssid.clone(),
            passphrase: passphrase.map(str::to_string),
        });

        let expected = self.state.borrow().passphrases.get(&network.ssid).cloned();
        match expected {
            Some(expected) if passphrase != Some(expected.as_str()) => {
                self.emit(ManagerSignal::WrongPassword(network.ssid.clone()));
            }
            _ => {
                self.mark_connected(&network.ssid);
                self.emit(ManagerSignal::Refresh);
            }
        }
        Ok(())
    }

    fn forget_connection(&self, ssid: &Ssid) -> BackendResult<()> {
        self.record(BackendCall::Forget(ssid.clone()));
        let mut state = self.state.borrow_mut();
        state.known.remove(ssid);
        if let Some(entry) = state.seen.get_mut(ssid) {
            entry.connected = ConnectedType::Disconnected;
        }
        Ok(())
    }

    fn is_tethering_enabled(&self) -> bool {
        self.state.borrow().tethering
    }

    fn set_tethering_enabled(&self, enabled: bool) -> BackendResult<()> {
        self.record(BackendCall::SetTethering(enabled));
        if self.state.borrow().fail_tethering {
            return Err(BackendError::PermissionDenied);
        }
        self.state.borrow_mut().tethering = enabled;
        self.emit(ManagerSignal::Refresh);
        Ok(())
    }

    fn tethering_password(&self) -> String {
        self.state.borrow().tethering_password.clone()
    }

    fn set_tethering_password(&self, password: &str) -> BackendResult<()> {
        self.record(BackendCall::SetTetheringPassword(password.to_string()));
        self.state.borrow_mut().tethering_password = password.to_string();
        Ok(())
    }

    fn update_cellular_settings(&self, roaming: bool, apn: &str) -> BackendResult<()> {
        self.record(BackendCall::UpdateCellular {
            roaming,
            apn: apn.to_string(),
        });
        Ok(())
    }

    fn start(&self) {
        self.record(BackendCall::Start);
        self.state.borrow_mut().scanning = true;
        self.emit(ManagerSignal::Refresh);
    }

    fn stop(&self) {
        self.record(BackendCall::Stop);
        self.state.borrow_mut().scanning = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn wrong_passphrase_emits_signal() {
        let (tx, rx) = mpsc::channel();
        let backend = MockBackend::demo().with_signals(tx);
        let office = backend
            .seen_networks()
            .get(&Ssid::from("Office_Main"))
            .cloned()
            .unwrap();

        backend.connect(&office, Some("hunter22")).unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            ManagerSignal::WrongPassword(Ssid::from("Office_Main"))
        );
        assert!(!backend.is_known_connection(&office.ssid));
    }

    #[test]
    fn connect_marks_single_network_connected() {
        let backend = MockBackend::demo();
        let guest = backend
            .seen_networks()
            .get(&Ssid::from("Guest_Network"))
            .cloned()
            .unwrap();

        backend.connect(&guest, None).unwrap();

        let connected: Vec<_> = backend
            .seen_networks()
            .iter()
            .filter(|e| e.connected == ConnectedType::Connected)
            .map(|e| e.ssid.to_string())
            .collect();
        assert_eq!(connected, vec!["Guest_Network"]);
    }

    #[test]
    fn activate_unknown_connection_fails() {
        let backend = MockBackend::new();
        let err = backend
            .activate_known_connection(&Ssid::from("nope"))
            .unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));
    }
}
