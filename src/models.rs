use std::borrow::Cow;
use std::fmt;

/// Identifier bytes of a wireless network.
///
/// SSIDs are not guaranteed to be valid UTF-8, so equality and lookups are
/// done on the raw bytes. Use [`Ssid::display`] to get something printable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ssid(Vec<u8>);

impl Ssid {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lossy UTF-8 decoding, for labels only.
    pub fn display(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl fmt::Display for Ssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<&str> for Ssid {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<String> for Ssid {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl From<Vec<u8>> for Ssid {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for Ssid {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SecurityType {
    Open,
    Wpa,
    Unsupported,
}

impl SecurityType {
    pub fn label(self) -> &'static str {
        match self {
            SecurityType::Open => "Open",
            SecurityType::Wpa => "WPA2",
            SecurityType::Unsupported => "Unsupported",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectedType {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectedType {
    pub fn label(self) -> &'static str {
        match self {
            ConnectedType::Disconnected => "Disconnected",
            ConnectedType::Connecting => "Connecting",
            ConnectedType::Connected => "Connected",
        }
    }
}

/// One network from the connection manager's latest scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkEntry {
    pub ssid: Ssid,
    /// Relative signal quality, 0-100.
    pub strength: u8,
    pub security_type: SecurityType,
    pub connected: ConnectedType,
}

impl NetworkEntry {
    pub fn new(ssid: impl Into<Ssid>, strength: u8, security_type: SecurityType) -> Self {
        Self {
            ssid: ssid.into(),
            strength: strength.min(100),
            security_type,
            connected: ConnectedType::Disconnected,
        }
    }

    pub fn with_connected(mut self, connected: ConnectedType) -> Self {
        self.connected = connected;
        self
    }

    pub fn is_disconnected(&self) -> bool {
        self.connected == ConnectedType::Disconnected
    }

    pub fn signal(&self) -> SignalBucket {
        SignalBucket::from_strength(self.strength)
    }
}

/// Scan snapshot: SSID to entry, unique keys, in the order the connection
/// manager reported them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeenNetworks {
    entries: Vec<NetworkEntry>,
}

impl SeenNetworks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced entry keeps its original position.
    pub fn insert(&mut self, entry: NetworkEntry) {
        match self.entries.iter_mut().find(|e| e.ssid == entry.ssid) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, ssid: &Ssid) -> Option<&NetworkEntry> {
        self.entries.iter().find(|e| &e.ssid == ssid)
    }

    pub fn get_mut(&mut self, ssid: &Ssid) -> Option<&mut NetworkEntry> {
        self.entries.iter_mut().find(|e| &e.ssid == ssid)
    }

    pub fn contains(&self, ssid: &Ssid) -> bool {
        self.get(ssid).is_some()
    }

    pub fn remove(&mut self, ssid: &Ssid) -> Option<NetworkEntry> {
        let pos = self.entries.iter().position(|e| &e.ssid == ssid)?;
        Some(self.entries.remove(pos))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkEntry> {
        self.entries.iter()
    }

    pub fn values(&self) -> Vec<NetworkEntry> {
        self.entries.clone()
    }
}

impl FromIterator<NetworkEntry> for SeenNetworks {
    fn from_iter<I: IntoIterator<Item = NetworkEntry>>(iter: I) -> Self {
        let mut seen = SeenNetworks::new();
        for entry in iter {
            seen.insert(entry);
        }
        seen
    }
}

/// Four-level signal indicator shared by the list and detail screens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SignalBucket {
    Low,
    Medium,
    High,
    Full,
}

impl SignalBucket {
    /// `clamp(round(strength / 33), 0, 3)`. Rounds half away from zero.
    pub fn from_strength(strength: u8) -> Self {
        let index = (f64::from(strength) / 33.0).round() as i32;
        match index.clamp(0, 3) {
            0 => SignalBucket::Low,
            1 => SignalBucket::Medium,
            2 => SignalBucket::High,
            _ => SignalBucket::Full,
        }
    }

    pub fn index(self) -> usize {
        match self {
            SignalBucket::Low => 0,
            SignalBucket::Medium => 1,
            SignalBucket::High => 2,
            SignalBucket::Full => 3,
        }
    }

    pub fn icon_name(self) -> &'static str {
        match self {
            SignalBucket::Low => "network-wireless-signal-none-symbolic",
            SignalBucket::Medium => "network-wireless-signal-weak-symbolic",
            SignalBucket::High => "network-wireless-signal-good-symbolic",
            SignalBucket::Full => "network-wireless-signal-excellent-symbolic",
        }
    }

    pub fn quality_label(self) -> &'static str {
        match self {
            SignalBucket::Low => "None",
            SignalBucket::Medium => "Weak",
            SignalBucket::High => "OK",
            SignalBucket::Full => "Excellent",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_reference_points() {
        assert_eq!(SignalBucket::from_strength(0).index(), 0);
        assert_eq!(SignalBucket::from_strength(33).index(), 1);
        assert_eq!(SignalBucket::from_strength(66).index(), 2);
        assert_eq!(SignalBucket::from_strength(100).index(), 3);
    }

    #[test]
    fn bucket_boundary_sits_between_16_and_17() {
        assert_eq!(SignalBucket::from_strength(16), SignalBucket::Low);
        assert_eq!(SignalBucket::from_strength(17), SignalBucket::Medium);
        assert_eq!(SignalBucket::from_strength(49), SignalBucket::Medium);
        assert_eq!(SignalBucket::from_strength(50), SignalBucket::High);
        assert_eq!(SignalBucket::from_strength(82), SignalBucket::High);
        assert_eq!(SignalBucket::from_strength(83), SignalBucket::Full);
    }

    #[test]
    fn bucket_is_monotonic() {
        let mut last = SignalBucket::Low;
        for strength in 0..=100u8 {
            let bucket = SignalBucket::from_strength(strength);
            assert!(bucket >= last, "bucket dropped at strength {strength}");
            last = bucket;
        }
    }

    #[test]
    fn ssid_display_is_lossy() {
        let ssid = Ssid::new(vec![b'c', b'a', b'f', 0xff]);
        assert_eq!(ssid.display(), "caf\u{fffd}");
        assert_ne!(ssid, Ssid::from("caf\u{fffd}"));
    }

    #[test]
    fn seen_networks_replace_keeps_position() {
        let mut seen: SeenNetworks = [
            NetworkEntry::new("a", 10, SecurityType::Open),
            NetworkEntry::new("b", 20, SecurityType::Wpa),
        ]
        .into_iter()
        .collect();

        seen.insert(NetworkEntry::new("a", 80, SecurityType::Open));

        let order: Vec<_> = seen.iter().map(|e| e.ssid.to_string()).collect();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(seen.get(&Ssid::from("a")).map(|e| e.strength), Some(80));
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn strength_is_capped_at_100() {
        assert_eq!(NetworkEntry::new("x", 250, SecurityType::Open).strength, 100);
    }
}
