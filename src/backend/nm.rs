//! NetworkManager over the system D-Bus.
//!
//! Bus round-trips happen on command calls and on two background threads:
//! a scanner that reloads access points while the panel is visible, and a
//! listener on the wireless device's `StateChanged` signal. Queries only
//! read the cache those threads fill.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};
use zbus::blocking::{Connection, Proxy};
use zbus::zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::backend::{
    BackendError, BackendResult, ConnectionManager, ManagerSignal, SignalSender,
};
use crate::models::{ConnectedType, NetworkEntry, SecurityType, SeenNetworks, Ssid};

pub mod nm_consts {
    pub const BUS_NAME: &str = "org.freedesktop.NetworkManager";
    pub const OBJECT_PATH: &str = "/org/freedesktop/NetworkManager";
    pub const SETTINGS_PATH: &str = "/org/freedesktop/NetworkManager/Settings";
    pub const NM_INTERFACE: &str = "org.freedesktop.NetworkManager";
    pub const DEVICE_INTERFACE: &str = "org.freedesktop.NetworkManager.Device";
    pub const WIFI_DEVICE_INTERFACE: &str = "org.freedesktop.NetworkManager.Device.Wireless";
    pub const AP_INTERFACE: &str = "org.freedesktop.NetworkManager.AccessPoint";
    pub const ACTIVE_CONNECTION_INTERFACE: &str =
        "org.freedesktop.NetworkManager.Connection.Active";
    pub const IP4_CONFIG_INTERFACE: &str = "org.freedesktop.NetworkManager.IP4Config";
    pub const SETTINGS_INTERFACE: &str = "org.freedesktop.NetworkManager.Settings";
    pub const CONNECTION_INTERFACE: &str = "org.freedesktop.NetworkManager.Settings.Connection";

    pub const DEVICE_TYPE_WIFI: u32 = 2;

    pub const DEVICE_STATE_DISCONNECTED: u32 = 30;
    pub const DEVICE_STATE_PREPARE: u32 = 40;
    pub const DEVICE_STATE_NEED_AUTH: u32 = 60;
    pub const DEVICE_STATE_SECONDARIES: u32 = 90;
    pub const DEVICE_STATE_ACTIVATED: u32 = 100;
    pub const DEVICE_STATE_REASON_SUPPLICANT_DISCONNECT: u32 = 8;

    pub const AP_FLAGS_NONE: u32 = 0x0;
    pub const AP_FLAGS_PRIVACY: u32 = 0x1;
    pub const AP_FLAGS_WPS: u32 = 0x2;

    pub const AP_SEC_PAIR_WEP40: u32 = 0x1;
    pub const AP_SEC_PAIR_WEP104: u32 = 0x2;
    pub const AP_SEC_GROUP_WEP40: u32 = 0x10;
    pub const AP_SEC_GROUP_WEP104: u32 = 0x20;
    pub const AP_SEC_KEY_MGMT_PSK: u32 = 0x100;
    pub const AP_SEC_KEY_MGMT_802_1X: u32 = 0x200;
}

use nm_consts::*;

/// Connection id and SSID of the hotspot profile used for tethering.
pub const TETHERING_ID: &str = "netpanel-hotspot";
pub const DEFAULT_TETHERING_PASSWORD: &str = "swagswagcomma";

type ConnectionSettings = HashMap<String, HashMap<String, OwnedValue>>;

/// Saved connection profiles, by role.
#[derive(Debug, Default)]
struct Profiles {
    wifi: HashMap<Ssid, OwnedObjectPath>,
    hotspot: Option<OwnedObjectPath>,
    gsm: Option<OwnedObjectPath>,
}

#[derive(Debug, Default)]
struct NmState {
    seen: SeenNetworks,
    profiles: Profiles,
    /// Set while an activation we started has not finished yet.
    connecting_to: Option<Ssid>,
    ipv4_address: String,
    tethering_enabled: bool,
    tethering_password: String,
}

type Shared = Arc<Mutex<NmState>>;

fn lock(state: &Mutex<NmState>) -> MutexGuard<'_, NmState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct NetworkManagerBackend {
    bus: Bus,
    state: Shared,
    signals: SignalSender,
    scan_interval: Duration,
    /// Bumped by every start and stop; a scanner exits once it sees a newer
    /// value than the one it was started with.
    scan_generation: Arc<AtomicU64>,
}

impl NetworkManagerBackend {
    pub fn new(signals: SignalSender, scan_interval: Duration) -> BackendResult<Self> {
        let conn = Connection::system().map_err(unavailable)?;
        let device = first_wifi_device(&conn)?;
        let bus = Bus { conn, device };
        info!(device = %bus.device.as_str(), "using wireless device");

        let state: Shared = Arc::new(Mutex::new(NmState {
            tethering_password: DEFAULT_TETHERING_PASSWORD.to_string(),
            ..NmState::default()
        }));
        reload(&bus, &state)?;
        let password = bus.tethering_password(&lock(&state).profiles);
        if let Some(password) = password {
            lock(&state).tethering_password = password;
        }

        spawn_state_listener(bus.clone(), state.clone(), signals.clone())?;

        Ok(Self {
            bus,
            state,
            signals,
            scan_interval,
            scan_generation: Arc::new(AtomicU64::new(0)),
        })
    }

    fn state(&self) -> MutexGuard<'_, NmState> {
        lock(&self.state)
    }

    fn notify(&self) {
        if let Err(e) = reload(&self.bus, &self.state) {
            warn!("failed to reload network state: {}", e);
        }
        let _ = self.signals.send(ManagerSignal::Refresh);
    }

    fn ensure_hotspot(&self) -> BackendResult<OwnedObjectPath> {
        if let Some(path) = self.state().profiles.hotspot.clone() {
            return Ok(path);
        }
        let password = self.state().tethering_password.clone();
        let path = self.bus.add_hotspot(&password)?;
        self.state().profiles.hotspot = Some(path.clone());
        Ok(path)
    }
}

impl Drop for NetworkManagerBackend {
    fn drop(&mut self) {
        self.scan_generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl ConnectionManager for NetworkManagerBackend {
    fn seen_networks(&self) -> SeenNetworks {
        self.state().seen.clone()
    }

    fn is_known_connection(&self, ssid: &Ssid) -> bool {
        self.state().profiles.wifi.contains_key(ssid)
    }

    fn ipv4_address(&self) -> String {
        self.state().ipv4_address.clone()
    }

    fn activate_known_connection(&self, ssid: &Ssid) -> BackendResult<()> {
        let path = self
            .state()
            .profiles
            .wifi
            .get(ssid)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(ssid.to_string()))?;

        self.state().connecting_to = Some(ssid.clone());
        let nm = self.bus.nm()?;
        let _active: OwnedObjectPath = nm
            .call(
                "ActivateConnection",
                &(&path, &self.bus.device, ObjectPath::from_static_str_unchecked("/")),
            )
            .map_err(unavailable)?;
        self.notify();
        Ok(())
    }

    fn connect(&self, network: &NetworkEntry, passphrase: Option<&str>) -> BackendResult<()> {
        let ssid = network.ssid.display().into_owned();

        let mut connection: HashMap<&str, Value<'_>> = HashMap::new();
        connection.insert("type", Value::from("802-11-wireless"));
        connection.insert("id", Value::from(ssid.as_str()));

        let mut wireless: HashMap<&str, Value<'_>> = HashMap::new();
        wireless.insert("ssid", Value::from(network.ssid.as_bytes().to_vec()));
        wireless.insert("mode", Value::from("infrastructure"));

        let mut settings: HashMap<&str, HashMap<&str, Value<'_>>> = HashMap::new();
        if let Some(psk) = passphrase {
            let mut security: HashMap<&str, Value<'_>> = HashMap::new();
            security.insert("key-mgmt", Value::from("wpa-psk"));
            security.insert("auth-alg", Value::from("open"));
            security.insert("psk", Value::from(psk));
            settings.insert("802-11-wireless-security", security);
        }
        settings.insert("connection", connection);
        settings.insert("802-11-wireless", wireless);
        settings.insert("ipv4", HashMap::from([("method", Value::from("auto"))]));
        settings.insert("ipv6", HashMap::from([("method", Value::from("ignore"))]));

        self.state().connecting_to = Some(network.ssid.clone());
        let nm = self.bus.nm()?;
        let (profile, _active): (OwnedObjectPath, OwnedObjectPath) = nm
            .call(
                "AddAndActivateConnection",
                &(
                    settings,
                    &self.bus.device,
                    ObjectPath::from_static_str_unchecked("/"),
                ),
            )
            .map_err(unavailable)?;
        debug!(profile = %profile.as_str(), "added connection for {}", network.ssid);
        self.notify();
        Ok(())
    }

    fn forget_connection(&self, ssid: &Ssid) -> BackendResult<()> {
        let path = self
            .state()
            .profiles
            .wifi
            .remove(ssid)
            .ok_or_else(|| BackendError::NotFound(ssid.to_string()))?;
        self.bus.delete_connection(&path)?;
        self.notify();
        Ok(())
    }

    fn is_tethering_enabled(&self) -> bool {
        self.state().tethering_enabled
    }

    fn set_tethering_enabled(&self, enabled: bool) -> BackendResult<()> {
        if enabled {
            let hotspot = self.ensure_hotspot()?;
            let nm = self.bus.nm()?;
            let _active: OwnedObjectPath = nm
                .call(
                    "ActivateConnection",
                    &(&hotspot, &self.bus.device, ObjectPath::from_static_str_unchecked("/")),
                )
                .map_err(unavailable)?;
        } else {
            self.bus.deactivate_device()?;
        }
        self.state().tethering_enabled = enabled;
        self.notify();
        Ok(())
    }

    fn tethering_password(&self) -> String {
        self.state().tethering_password.clone()
    }

    fn set_tethering_password(&self, password: &str) -> BackendResult<()> {
        let hotspot = self.ensure_hotspot()?;
        let mut settings = self.bus.connection_settings(&hotspot)?;
        settings
            .entry("802-11-wireless-security".to_string())
            .or_default()
            .insert("psk".to_string(), owned(Value::from(password))?);
        self.bus.update_connection(&hotspot, &settings)?;
        self.state().tethering_password = password.to_string();

        if self.is_tethering_enabled() {
            self.set_tethering_enabled(false)?;
            self.set_tethering_enabled(true)?;
        }
        Ok(())
    }

    fn update_cellular_settings(&self, roaming: bool, apn: &str) -> BackendResult<()> {
        let Some(gsm) = self.state().profiles.gsm.clone() else {
            debug!("no gsm connection profile, skipping cellular settings");
            return Ok(());
        };

        let mut settings = self.bus.connection_settings(&gsm)?;
        let group = settings.entry("gsm".to_string()).or_default();
        let home_only = Value::from(!roaming);
        let apn_value = Value::from(apn);
        let unchanged = group.get("home-only").is_some_and(|v| **v == home_only)
            && group.get("apn").is_some_and(|v| **v == apn_value);
        if unchanged {
            return Ok(());
        }

        info!("updating cellular settings roaming={} apn={:?}", roaming, apn);
        group.insert("home-only".to_string(), owned(home_only)?);
        if apn.is_empty() {
            group.remove("apn");
        } else {
            group.insert("apn".to_string(), owned(apn_value)?);
        }
        self.bus.update_connection(&gsm, &settings)
    }

    fn start(&self) {
        let generation = self.scan_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let bus = self.bus.clone();
        let state = self.state.clone();
        let signals = self.signals.clone();
        let current = self.scan_generation.clone();
        let interval = self.scan_interval;

        let spawned = thread::Builder::new()
            .name("nm-scan".to_string())
            .spawn(move || {
                while current.load(Ordering::SeqCst) == generation {
                    if let Err(e) = bus.request_scan() {
                        debug!("scan request rejected: {}", e);
                    }
                    thread::sleep(interval);
                    if current.load(Ordering::SeqCst) != generation {
                        break;
                    }
                    match reload(&bus, &state) {
                        Ok(()) => {
                            if signals.send(ManagerSignal::Refresh).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("failed to reload network state: {}", e),
                    }
                }
                debug!("scanner stopped");
            });
        if let Err(e) = spawned {
            warn!("failed to start scanner: {}", e);
        }
    }

    fn stop(&self) {
        self.scan_generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Classify an access point from its `Flags`, `WpaFlags` and `RsnFlags`.
pub fn security_from_flags(flags: u32, wpa_flags: u32, rsn_flags: u32) -> SecurityType {
    let props = wpa_flags | rsn_flags;
    let supports_wpa = props
        & (AP_SEC_PAIR_WEP40
            | AP_SEC_PAIR_WEP104
            | AP_SEC_GROUP_WEP40
            | AP_SEC_GROUP_WEP104
            | AP_SEC_KEY_MGMT_PSK)
        != 0;

    if flags == AP_FLAGS_NONE || (flags & AP_FLAGS_WPS != 0 && !supports_wpa) {
        SecurityType::Open
    } else if flags & AP_FLAGS_PRIVACY != 0
        && supports_wpa
        && props & AP_SEC_KEY_MGMT_802_1X == 0
    {
        SecurityType::Wpa
    } else {
        SecurityType::Unsupported
    }
}

/// NetworkManager stores IPv4 addresses as a network-order `u32`.
pub fn ipv4_from_nm(address: u32) -> Ipv4Addr {
    Ipv4Addr::from(address.to_ne_bytes())
}

fn connected_type(device_state: u32) -> ConnectedType {
    match device_state {
        DEVICE_STATE_ACTIVATED => ConnectedType::Connected,
        DEVICE_STATE_PREPARE..=DEVICE_STATE_SECONDARIES => ConnectedType::Connecting,
        _ => ConnectedType::Disconnected,
    }
}

fn unavailable(e: impl std::fmt::Display) -> BackendError {
    BackendError::Unavailable(e.to_string())
}

fn owned(value: Value<'_>) -> BackendResult<OwnedValue> {
    value.try_to_owned().map_err(unavailable)
}

fn take<T>(settings: &mut ConnectionSettings, group: &str, key: &str) -> Option<T>
where
    T: TryFrom<OwnedValue>,
{
    settings
        .get_mut(group)?
        .remove(key)
        .and_then(|value| T::try_from(value).ok())
}

/// Pull a fresh snapshot from the bus into the cache.
fn reload(bus: &Bus, state: &Mutex<NmState>) -> BackendResult<()> {
    let profiles = bus.profiles()?;
    let connecting_to = lock(state).connecting_to.clone();
    let seen = bus.seen_networks(connecting_to.as_ref())?;
    let ipv4_address = bus.ipv4_address().unwrap_or_else(|e| {
        debug!("no ipv4 address: {}", e);
        String::new()
    });
    let tethering_enabled = bus.active_connection_id()?.as_deref() == Some(TETHERING_ID);

    let mut state = lock(state);
    state.seen = seen;
    state.profiles = profiles;
    state.ipv4_address = ipv4_address;
    state.tethering_enabled = tethering_enabled;
    Ok(())
}

fn spawn_state_listener(bus: Bus, state: Shared, signals: SignalSender) -> BackendResult<()> {
    thread::Builder::new()
        .name("nm-state".to_string())
        .spawn(move || {
            let device = match bus.proxy(bus.device.as_str(), DEVICE_INTERFACE) {
                Ok(device) => device,
                Err(e) => {
                    warn!("cannot watch device state: {}", e);
                    return;
                }
            };
            let changes = match device.receive_signal("StateChanged") {
                Ok(changes) => changes,
                Err(e) => {
                    warn!("cannot watch device state: {}", e);
                    return;
                }
            };

            for message in changes {
                let (new_state, old_state, reason): (u32, u32, u32) =
                    match message.body().deserialize() {
                        Ok(args) => args,
                        Err(e) => {
                            debug!("malformed StateChanged signal: {}", e);
                            continue;
                        }
                    };
                debug!(new_state, old_state, reason, "device state changed");
                on_state_changed(&bus, &state, &signals, new_state, reason);
            }
        })
        .map(|_| ())
        .map_err(unavailable)
}

fn on_state_changed(
    bus: &Bus,
    state: &Mutex<NmState>,
    signals: &SignalSender,
    new_state: u32,
    reason: u32,
) {
    let rejected = {
        let mut state = lock(state);
        match new_state {
            DEVICE_STATE_NEED_AUTH if reason == DEVICE_STATE_REASON_SUPPLICANT_DISCONNECT => state
                .connecting_to
                .take()
                .map(|ssid| {
                    let profile = state.profiles.wifi.remove(&ssid);
                    (ssid, profile)
                }),
            DEVICE_STATE_ACTIVATED | DEVICE_STATE_DISCONNECTED => {
                state.connecting_to = None;
                None
            }
            _ => None,
        }
    };

    if let Some((ssid, profile)) = rejected {
        info!("passphrase rejected for {}", ssid);
        if let Some(profile) = profile {
            if let Err(e) = bus.delete_connection(&profile) {
                warn!("failed to remove rejected connection for {}: {}", ssid, e);
            }
        }
        let _ = signals.send(ManagerSignal::WrongPassword(ssid));
    }

    if let Err(e) = reload(bus, state) {
        warn!("failed to reload network state: {}", e);
    }
    let _ = signals.send(ManagerSignal::Refresh);
}

#[derive(Clone)]
struct Bus {
    conn: Connection,
    device: OwnedObjectPath,
}

impl Bus {
    fn proxy<'a>(&'a self, path: &'a str, interface: &'static str) -> BackendResult<Proxy<'a>> {
        Proxy::new(&self.conn, BUS_NAME, path, interface).map_err(unavailable)
    }

    fn nm(&self) -> BackendResult<Proxy<'_>> {
        self.proxy(OBJECT_PATH, NM_INTERFACE)
    }

    fn request_scan(&self) -> BackendResult<()> {
        let wireless = self.proxy(self.device.as_str(), WIFI_DEVICE_INTERFACE)?;
        let options: HashMap<&str, Value<'_>> = HashMap::new();
        wireless.call("RequestScan", &options).map_err(unavailable)
    }

    /// One entry per SSID, strongest access point wins.
    fn seen_networks(&self, connecting_to: Option<&Ssid>) -> BackendResult<SeenNetworks> {
        let device = self.proxy(self.device.as_str(), DEVICE_INTERFACE)?;
        let device_state: u32 = device.get_property("State").map_err(unavailable)?;

        let wireless = self.proxy(self.device.as_str(), WIFI_DEVICE_INTERFACE)?;
        let active_ap: OwnedObjectPath = wireless
            .get_property("ActiveAccessPoint")
            .map_err(unavailable)?;
        let ap_paths: Vec<OwnedObjectPath> = wireless
            .call("GetAccessPoints", &())
            .map_err(unavailable)?;

        let active_ssid = if active_ap.as_str() == "/" {
            None
        } else {
            let ap = self.proxy(active_ap.as_str(), AP_INTERFACE)?;
            let bytes: Vec<u8> = ap.get_property("Ssid").map_err(unavailable)?;
            Some(Ssid::from(bytes))
        };

        let mut seen = SeenNetworks::new();
        for path in ap_paths {
            let ap = self.proxy(path.as_str(), AP_INTERFACE)?;
            let bytes: Vec<u8> = ap.get_property("Ssid").map_err(unavailable)?;
            let ssid = Ssid::from(bytes);
            if ssid.is_empty() {
                continue;
            }

            let strength: u8 = ap.get_property("Strength").map_err(unavailable)?;
            if seen.get(&ssid).is_some_and(|e| e.strength >= strength) {
                continue;
            }

            let flags: u32 = ap.get_property("Flags").map_err(unavailable)?;
            let wpa_flags: u32 = ap.get_property("WpaFlags").map_err(unavailable)?;
            let rsn_flags: u32 = ap.get_property("RsnFlags").map_err(unavailable)?;

            let connected = if active_ssid.as_ref() == Some(&ssid) {
                connected_type(device_state)
            } else if connecting_to == Some(&ssid) {
                ConnectedType::Connecting
            } else {
                ConnectedType::Disconnected
            };

            seen.insert(
                NetworkEntry::new(ssid, strength, security_from_flags(flags, wpa_flags, rsn_flags))
                    .with_connected(connected),
            );
        }
        Ok(seen)
    }

    fn profiles(&self) -> BackendResult<Profiles> {
        let settings = self.proxy(SETTINGS_PATH, SETTINGS_INTERFACE)?;
        let paths: Vec<OwnedObjectPath> = settings
            .call("ListConnections", &())
            .map_err(unavailable)?;

        let mut profiles = Profiles::default();
        for path in paths {
            let mut config = match self.connection_settings(&path) {
                Ok(config) => config,
                Err(e) => {
                    debug!(path = %path.as_str(), "skipping unreadable connection: {}", e);
                    continue;
                }
            };
            let kind: Option<String> = take(&mut config, "connection", "type");
            let id: Option<String> = take(&mut config, "connection", "id");

            match kind.as_deref() {
                Some("gsm") => profiles.gsm = Some(path),
                Some("802-11-wireless") if id.as_deref() == Some(TETHERING_ID) => {
                    profiles.hotspot = Some(path)
                }
                Some("802-11-wireless") => {
                    if let Some(bytes) = take::<Vec<u8>>(&mut config, "802-11-wireless", "ssid") {
                        profiles.wifi.insert(Ssid::from(bytes), path);
                    }
                }
                _ => {}
            }
        }
        Ok(profiles)
    }

    fn connection_settings(&self, path: &OwnedObjectPath) -> BackendResult<ConnectionSettings> {
        let connection = self.proxy(path.as_str(), CONNECTION_INTERFACE)?;
        connection.call("GetSettings", &()).map_err(unavailable)
    }

    fn update_connection(
        &self,
        path: &OwnedObjectPath,
        settings: &ConnectionSettings,
    ) -> BackendResult<()> {
        let connection = self.proxy(path.as_str(), CONNECTION_INTERFACE)?;
        connection.call("Update", settings).map_err(unavailable)
    }

    fn delete_connection(&self, path: &OwnedObjectPath) -> BackendResult<()> {
        let connection = self.proxy(path.as_str(), CONNECTION_INTERFACE)?;
        connection.call("Delete", &()).map_err(unavailable)
    }

    fn tethering_password(&self, profiles: &Profiles) -> Option<String> {
        let hotspot = profiles.hotspot.as_ref()?;
        let connection = self.proxy(hotspot.as_str(), CONNECTION_INTERFACE).ok()?;
        let mut secrets: ConnectionSettings = connection
            .call("GetSecrets", &("802-11-wireless-security",))
            .map_err(|e| debug!("cannot read hotspot secrets: {}", e))
            .ok()?;
        take(&mut secrets, "802-11-wireless-security", "psk")
    }

    fn add_hotspot(&self, password: &str) -> BackendResult<OwnedObjectPath> {
        let mut settings: HashMap<&str, HashMap<&str, Value<'_>>> = HashMap::new();
        settings.insert(
            "connection",
            HashMap::from([
                ("type", Value::from("802-11-wireless")),
                ("id", Value::from(TETHERING_ID)),
                ("autoconnect", Value::from(false)),
            ]),
        );
        settings.insert(
            "802-11-wireless",
            HashMap::from([
                ("ssid", Value::from(TETHERING_ID.as_bytes().to_vec())),
                ("mode", Value::from("ap")),
            ]),
        );
        settings.insert(
            "802-11-wireless-security",
            HashMap::from([
                ("key-mgmt", Value::from("wpa-psk")),
                ("proto", Value::from(vec!["rsn"])),
                ("pairwise", Value::from(vec!["ccmp"])),
                ("group", Value::from(vec!["ccmp"])),
                ("psk", Value::from(password)),
            ]),
        );
        settings.insert("ipv4", HashMap::from([("method", Value::from("shared"))]));
        settings.insert("ipv6", HashMap::from([("method", Value::from("ignore"))]));

        info!("creating tethering profile {}", TETHERING_ID);
        let proxy = self.proxy(SETTINGS_PATH, SETTINGS_INTERFACE)?;
        proxy.call("AddConnection", &settings).map_err(unavailable)
    }

    fn active_connection(&self) -> BackendResult<Option<OwnedObjectPath>> {
        let device = self.proxy(self.device.as_str(), DEVICE_INTERFACE)?;
        let active: OwnedObjectPath = device
            .get_property("ActiveConnection")
            .map_err(unavailable)?;
        Ok((active.as_str() != "/").then_some(active))
    }

    fn active_connection_id(&self) -> BackendResult<Option<String>> {
        let Some(active) = self.active_connection()? else {
            return Ok(None);
        };
        let proxy = self.proxy(active.as_str(), ACTIVE_CONNECTION_INTERFACE)?;
        let id: String = proxy.get_property("Id").map_err(unavailable)?;
        Ok(Some(id))
    }

    fn deactivate_device(&self) -> BackendResult<()> {
        let Some(active) = self.active_connection()? else {
            return Ok(());
        };
        self.nm()?
            .call("DeactivateConnection", &(&active,))
            .map_err(unavailable)
    }

    fn ipv4_address(&self) -> BackendResult<String> {
        let device = self.proxy(self.device.as_str(), DEVICE_INTERFACE)?;
        let config: OwnedObjectPath = device.get_property("Ip4Config").map_err(unavailable)?;
        if config.as_str() == "/" {
            return Ok(String::new());
        }

        let ip4 = self.proxy(config.as_str(), IP4_CONFIG_INTERFACE)?;
        let addresses: Vec<Vec<u32>> = ip4.get_property("Addresses").map_err(unavailable)?;
        Ok(addresses
            .first()
            .and_then(|address| address.first())
            .map(|address| ipv4_from_nm(*address).to_string())
            .unwrap_or_default())
    }
}

fn first_wifi_device(conn: &Connection) -> BackendResult<OwnedObjectPath> {
    let nm = Proxy::new(conn, BUS_NAME, OBJECT_PATH, NM_INTERFACE).map_err(unavailable)?;
    let devices: Vec<OwnedObjectPath> = nm.call("GetDevices", &()).map_err(unavailable)?;

    for path in devices {
        let device_type: u32 = {
            let device = Proxy::new(conn, BUS_NAME, path.as_str(), DEVICE_INTERFACE)
                .map_err(unavailable)?;
            device.get_property("DeviceType").map_err(unavailable)?
        };
        if device_type == DEVICE_TYPE_WIFI {
            return Ok(path);
        }
    }

    Err(BackendError::Unavailable("No Wi-Fi device found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_networks() {
        assert_eq!(security_from_flags(0, 0, 0), SecurityType::Open);
        assert_eq!(
            security_from_flags(AP_FLAGS_NONE, AP_SEC_KEY_MGMT_PSK, 0),
            SecurityType::Open
        );
        assert_eq!(security_from_flags(AP_FLAGS_WPS, 0, 0), SecurityType::Open);
    }

    #[test]
    fn wpa_personal() {
        assert_eq!(
            security_from_flags(AP_FLAGS_PRIVACY, 0, AP_SEC_KEY_MGMT_PSK),
            SecurityType::Wpa
        );
        assert_eq!(
            security_from_flags(AP_FLAGS_PRIVACY | AP_FLAGS_WPS, AP_SEC_KEY_MGMT_PSK, 0),
            SecurityType::Wpa
        );
        assert_eq!(
            security_from_flags(AP_FLAGS_PRIVACY, AP_SEC_PAIR_WEP40 | AP_SEC_GROUP_WEP104, 0),
            SecurityType::Wpa
        );
    }

    #[test]
    fn enterprise_and_bare_privacy_are_unsupported() {
        assert_eq!(
            security_from_flags(
                AP_FLAGS_PRIVACY,
                0,
                AP_SEC_KEY_MGMT_PSK | AP_SEC_KEY_MGMT_802_1X
            ),
            SecurityType::Unsupported
        );
        assert_eq!(
            security_from_flags(AP_FLAGS_PRIVACY, 0, 0),
            SecurityType::Unsupported
        );
    }

    #[test]
    fn device_states() {
        assert_eq!(connected_type(DEVICE_STATE_ACTIVATED), ConnectedType::Connected);
        assert_eq!(connected_type(DEVICE_STATE_NEED_AUTH), ConnectedType::Connecting);
        assert_eq!(connected_type(DEVICE_STATE_PREPARE), ConnectedType::Connecting);
        assert_eq!(connected_type(DEVICE_STATE_SECONDARIES), ConnectedType::Connecting);
        assert_eq!(connected_type(DEVICE_STATE_DISCONNECTED), ConnectedType::Disconnected);
        assert_eq!(connected_type(120), ConnectedType::Disconnected);
    }

    #[test]
    fn ipv4_is_network_order() {
        let raw = u32::from_ne_bytes([192, 168, 43, 1]);
        assert_eq!(ipv4_from_nm(raw), Ipv4Addr::new(192, 168, 43, 1));
    }
}
