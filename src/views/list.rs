//! The scan-result list on the main screen.

use crate::backend::ConnectionManager;
use crate::models::{ConnectedType, NetworkEntry, SecurityType, SeenNetworks, SignalBucket, Ssid};

pub const SCANNING_PLACEHOLDER: &str = "Scanning for networks...";
pub const CONNECTING_LABEL: &str = "CONNECTING...";
pub const EDIT_LABEL: &str = "EDIT";

/// Trailing status glyph. At most one is shown per row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusIcon {
    Checkmark,
    Blocked,
    Lock,
    /// No glyph; the row keeps the space so columns stay aligned.
    None,
}

impl StatusIcon {
    pub fn for_network(network: &NetworkEntry) -> Self {
        if network.connected == ConnectedType::Connected {
            StatusIcon::Checkmark
        } else if network.security_type == SecurityType::Unsupported {
            StatusIcon::Blocked
        } else if network.security_type == SecurityType::Wpa {
            StatusIcon::Lock
        } else {
            StatusIcon::None
        }
    }

    pub fn icon_name(self) -> Option<&'static str> {
        match self {
            StatusIcon::Checkmark => Some("object-select-symbolic"),
            StatusIcon::Blocked => Some("action-unavailable-symbolic"),
            StatusIcon::Lock => Some("changes-prevent-symbolic"),
            StatusIcon::None => None,
        }
    }
}

/// Everything a front end needs to draw one network row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkRow {
    pub network: NetworkEntry,
    pub label: String,
    /// Greyed out when false (unsupported security).
    pub enabled: bool,
    /// Clicking the label starts a connection.
    pub clickable: bool,
    /// Drawn heavier while connecting or connected.
    pub emphasized: bool,
    pub connecting: bool,
    /// Shows the edit button that opens the detail screen.
    pub editable: bool,
    pub status: StatusIcon,
    pub signal: SignalBucket,
}

impl NetworkRow {
    fn new(network: NetworkEntry, known: bool) -> Self {
        let enabled = network.security_type != SecurityType::Unsupported;
        let disconnected = network.is_disconnected();
        Self {
            label: network.ssid.display().into_owned(),
            enabled,
            clickable: enabled && disconnected,
            emphasized: !disconnected,
            connecting: network.connected == ConnectedType::Connecting,
            editable: known,
            status: StatusIcon::for_network(&network),
            signal: network.signal(),
            network,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListIntent {
    Connect(NetworkEntry),
    View(NetworkEntry),
}

/// Strongest first. Equal strengths keep their snapshot order, so rows do
/// not swap places between refreshes.
pub fn sort_by_strength(networks: &mut [NetworkEntry]) {
    networks.sort_by(|a, b| b.strength.cmp(&a.strength));
}

#[derive(Debug, Default)]
pub struct NetworkListView {
    rows: Vec<NetworkRow>,
}

impl NetworkListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh<M: ConnectionManager + ?Sized>(&mut self, manager: &M) {
        let seen = manager.seen_networks();
        self.rebuild(&seen, |ssid| manager.is_known_connection(ssid));
    }

    /// Throw away all rows and build them again from `seen`.
    pub fn rebuild(&mut self, seen: &SeenNetworks, is_known: impl Fn(&Ssid) -> bool) {
        let mut networks = seen.values();
        sort_by_strength(&mut networks);

        self.rows = networks
            .into_iter()
            .map(|network| {
                let known = is_known(&network.ssid);
                NetworkRow::new(network, known)
            })
            .collect();
    }

    /// True while there is nothing to list; the placeholder replaces the list.
    pub fn is_scanning(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[NetworkRow] {
        &self.rows
    }

    pub fn row(&self, ssid: &Ssid) -> Option<&NetworkRow> {
        self.rows.iter().find(|row| &row.network.ssid == ssid)
    }

    /// Label click. Ignored unless the row is clickable.
    pub fn click(&self, ssid: &Ssid) -> Option<ListIntent> {
        self.row(ssid)
            .filter(|row| row.clickable)
            .map(|row| ListIntent::Connect(row.network.clone()))
    }

    /// Edit button. Only known networks have one.
    pub fn edit(&self, ssid: &Ssid) -> Option<ListIntent> {
        self.row(ssid)
            .filter(|row| row.editable)
            .map(|row| ListIntent::View(row.network.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seen(entries: Vec<NetworkEntry>) -> SeenNetworks {
        entries.into_iter().collect()
    }

    fn labels(view: &NetworkListView) -> Vec<String> {
        view.rows().iter().map(|r| r.label.clone()).collect()
    }

    #[test]
    fn strongest_first_and_clickable() {
        let mut view = NetworkListView::new();
        view.rebuild(
            &seen(vec![
                NetworkEntry::new("B", 10, SecurityType::Wpa),
                NetworkEntry::new("A", 90, SecurityType::Open),
            ]),
            |_| false,
        );

        assert_eq!(labels(&view), vec!["A", "B"]);

        let a = &view.rows()[0];
        assert!(a.clickable);
        assert_eq!(a.signal.index(), 3);
        assert_eq!(a.status, StatusIcon::None);

        let b = &view.rows()[1];
        assert_eq!(b.status, StatusIcon::Lock);
        assert_eq!(b.signal.index(), 0);
    }

    #[test]
    fn equal_strength_keeps_snapshot_order() {
        let snapshot = seen(vec![
            NetworkEntry::new("first", 50, SecurityType::Open),
            NetworkEntry::new("strong", 80, SecurityType::Open),
            NetworkEntry::new("second", 50, SecurityType::Wpa),
            NetworkEntry::new("third", 50, SecurityType::Open),
        ]);

        let mut view = NetworkListView::new();
        view.rebuild(&snapshot, |_| false);
        let once = labels(&view);
        view.rebuild(&snapshot, |_| false);

        assert_eq!(once, vec!["strong", "first", "second", "third"]);
        assert_eq!(labels(&view), once);
    }

    #[test]
    fn sort_is_non_increasing() {
        let mut networks: Vec<_> = [3u8, 99, 42, 42, 0, 100, 67]
            .iter()
            .enumerate()
            .map(|(i, s)| NetworkEntry::new(format!("n{i}"), *s, SecurityType::Open))
            .collect();
        sort_by_strength(&mut networks);
        assert!(networks.windows(2).all(|w| w[0].strength >= w[1].strength));
        let tied: Vec<_> = networks
            .iter()
            .filter(|n| n.strength == 42)
            .map(|n| n.ssid.to_string())
            .collect();
        assert_eq!(tied, vec!["n2", "n3"]);
    }

    #[test]
    fn empty_snapshot_shows_placeholder() {
        let mut view = NetworkListView::new();
        view.rebuild(&seen(vec![NetworkEntry::new("x", 5, SecurityType::Open)]), |_| false);
        assert!(!view.is_scanning());

        view.rebuild(&SeenNetworks::new(), |_| false);
        assert!(view.is_scanning());
        assert!(view.rows().is_empty());
    }

    #[test]
    fn status_icon_priority() {
        let connected_wpa = NetworkEntry::new("c", 50, SecurityType::Wpa)
            .with_connected(ConnectedType::Connected);
        let connected_unsupported = NetworkEntry::new("u", 50, SecurityType::Unsupported)
            .with_connected(ConnectedType::Connected);
        let unsupported = NetworkEntry::new("x", 50, SecurityType::Unsupported);

        assert_eq!(StatusIcon::for_network(&connected_wpa), StatusIcon::Checkmark);
        assert_eq!(StatusIcon::for_network(&connected_unsupported), StatusIcon::Checkmark);
        assert_eq!(StatusIcon::for_network(&unsupported), StatusIcon::Blocked);
    }

    #[test]
    fn row_affordances() {
        let mut view = NetworkListView::new();
        view.rebuild(
            &seen(vec![
                NetworkEntry::new("busy", 70, SecurityType::Wpa)
                    .with_connected(ConnectedType::Connecting),
                NetworkEntry::new("blocked", 60, SecurityType::Unsupported),
                NetworkEntry::new("home", 50, SecurityType::Wpa),
            ]),
            |ssid| ssid.as_bytes() == b"home",
        );

        let busy = view.row(&Ssid::from("busy")).unwrap();
        assert!(busy.connecting);
        assert!(busy.emphasized);
        assert!(!busy.clickable);
        assert!(view.click(&Ssid::from("busy")).is_none());

        let blocked = view.row(&Ssid::from("blocked")).unwrap();
        assert!(!blocked.enabled);
        assert!(!blocked.clickable);
        assert!(view.click(&Ssid::from("blocked")).is_none());

        let home = view.row(&Ssid::from("home")).unwrap();
        assert!(home.editable);
        assert!(!busy.editable);
        assert!(matches!(
            view.edit(&Ssid::from("home")),
            Some(ListIntent::View(n)) if n.ssid == Ssid::from("home")
        ));
        assert!(view.edit(&Ssid::from("busy")).is_none());
        assert!(matches!(
            view.click(&Ssid::from("home")),
            Some(ListIntent::Connect(_))
        ));
    }
}
