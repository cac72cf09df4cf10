//! Detail screen for a single network.

use crate::backend::ConnectionManager;
use crate::models::{NetworkEntry, SeenNetworks, Ssid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DetailIntent {
    Connect(NetworkEntry),
    Forget(NetworkEntry),
}

/// Labels and control states shown on the detail screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailFields {
    pub ssid: String,
    pub state: &'static str,
    pub signal: &'static str,
    pub security: &'static str,
    pub connect_enabled: bool,
    pub forget_enabled: bool,
}

#[derive(Debug, Default)]
pub struct NetworkDetailView {
    network: Option<NetworkEntry>,
    known: bool,
}

impl NetworkDetailView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&mut self, network: NetworkEntry, known: bool) {
        self.network = Some(network);
        self.known = known;
    }

    /// Pick up the latest copy of the shown network. If it dropped out of the
    /// snapshot the last copy stays on screen.
    pub fn refresh<M: ConnectionManager + ?Sized>(&mut self, manager: &M) {
        let seen = manager.seen_networks();
        self.update(&seen, |ssid| manager.is_known_connection(ssid));
    }

    pub fn update(&mut self, seen: &SeenNetworks, is_known: impl Fn(&Ssid) -> bool) {
        let Some(current) = self.network.as_mut() else {
            return;
        };
        if let Some(latest) = seen.get(&current.ssid) {
            *current = latest.clone();
        }
        self.known = is_known(&current.ssid);
    }

    pub fn network(&self) -> Option<&NetworkEntry> {
        self.network.as_ref()
    }

    pub fn fields(&self) -> Option<DetailFields> {
        let network = self.network.as_ref()?;
        Some(DetailFields {
            ssid: network.ssid.display().into_owned(),
            state: network.connected.label(),
            signal: network.signal().quality_label(),
            security: network.security_type.label(),
            connect_enabled: network.is_disconnected(),
            forget_enabled: self.known,
        })
    }

    pub fn press_connect(&self) -> Option<DetailIntent> {
        self.network
            .as_ref()
            .filter(|n| n.is_disconnected())
            .map(|n| DetailIntent::Connect(n.clone()))
    }

    pub fn press_forget(&self) -> Option<DetailIntent> {
        self.network
            .as_ref()
            .filter(|_| self.known)
            .map(|n| DetailIntent::Forget(n.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConnectedType, SecurityType};

    #[test]
    fn fields_for_connected_network() {
        let mut view = NetworkDetailView::new();
        view.view(
            NetworkEntry::new("home", 90, SecurityType::Wpa)
                .with_connected(ConnectedType::Connected),
            true,
        );

        let fields = view.fields().unwrap();
        assert_eq!(fields.ssid, "home");
        assert_eq!(fields.state, "Connected");
        assert_eq!(fields.signal, "Excellent");
        assert_eq!(fields.security, "WPA2");
        assert!(!fields.connect_enabled);
        assert!(fields.forget_enabled);
        assert!(view.press_connect().is_none());
        assert!(matches!(view.press_forget(), Some(DetailIntent::Forget(_))));
    }

    #[test]
    fn unknown_network_cannot_be_forgotten() {
        let mut view = NetworkDetailView::new();
        view.view(NetworkEntry::new("cafe", 20, SecurityType::Open), false);

        let fields = view.fields().unwrap();
        assert_eq!(fields.signal, "Weak");
        assert_eq!(fields.security, "Open");
        assert_eq!(fields.state, "Disconnected");
        assert!(view.press_forget().is_none());
        assert!(matches!(view.press_connect(), Some(DetailIntent::Connect(_))));
    }

    #[test]
    fn update_follows_same_ssid() {
        let mut view = NetworkDetailView::new();
        view.view(NetworkEntry::new("home", 70, SecurityType::Wpa), true);

        let seen: SeenNetworks = [
            NetworkEntry::new("other", 99, SecurityType::Open),
            NetworkEntry::new("home", 10, SecurityType::Wpa)
                .with_connected(ConnectedType::Connecting),
        ]
        .into_iter()
        .collect();
        view.update(&seen, |_| false);

        let fields = view.fields().unwrap();
        assert_eq!(fields.ssid, "home");
        assert_eq!(fields.state, "Connecting");
        assert_eq!(fields.signal, "None");
        assert!(!fields.forget_enabled);
    }

    #[test]
    fn vanished_network_keeps_last_copy() {
        let mut view = NetworkDetailView::new();
        view.view(NetworkEntry::new("gone", 50, SecurityType::Open), true);
        view.update(&SeenNetworks::new(), |_| true);
        assert_eq!(view.network().map(|n| n.strength), Some(50));
    }

    #[test]
    fn empty_view_has_no_fields() {
        let view = NetworkDetailView::new();
        assert!(view.fields().is_none());
        assert!(view.press_connect().is_none());
    }
}
