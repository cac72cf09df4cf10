pub mod mock;
pub mod nm;

use std::sync::mpsc::Sender;

use crate::models::{NetworkEntry, SeenNetworks, Ssid};

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("connection manager unavailable: {0}")]
    Unavailable(String),
    #[error("no saved connection for {0}")]
    NotFound(String),
    #[error("permission denied")]
    PermissionDenied,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Asynchronous notifications from the connection manager.
///
/// These are produced on whatever thread the backend uses and must only be
/// applied on the control thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManagerSignal {
    /// The scan snapshot changed; pull it again.
    Refresh,
    /// Association failed because the passphrase was rejected.
    WrongPassword(Ssid),
}

pub type SignalSender = Sender<ManagerSignal>;

/// The network-management collaborator behind the panel.
///
/// Queries return the backend's cached state and must not block on the bus.
/// Commands may fail; the panel logs failures and waits for the next
/// [`ManagerSignal::Refresh`] to observe the outcome.
pub trait ConnectionManager {
    fn seen_networks(&self) -> SeenNetworks;
    fn is_known_connection(&self, ssid: &Ssid) -> bool;
    fn ipv4_address(&self) -> String;

    fn activate_known_connection(&self, ssid: &Ssid) -> BackendResult<()>;
    fn connect(&self, network: &NetworkEntry, passphrase: Option<&str>) -> BackendResult<()>;
    fn forget_connection(&self, ssid: &Ssid) -> BackendResult<()>;

    fn is_tethering_enabled(&self) -> bool;
    fn set_tethering_enabled(&self, enabled: bool) -> BackendResult<()>;
    fn tethering_password(&self) -> String;
    fn set_tethering_password(&self, password: &str) -> BackendResult<()>;

    fn update_cellular_settings(&self, roaming: bool, apn: &str) -> BackendResult<()>;

    /// Begin background scanning. Called when the panel becomes visible.
    fn start(&self);
    /// Stop background scanning. Called when the panel is hidden.
    fn stop(&self);
}

impl<M: ConnectionManager + ?Sized> ConnectionManager for Box<M> {
    fn seen_networks(&self) -> SeenNetworks {
        (**self).seen_networks()
    }

    fn is_known_connection(&self, ssid: &Ssid) -> bool {
        (**self).is_known_connection(ssid)
    }

    fn ipv4_address(&self) -> String {
        (**self).ipv4_address()
    }

    fn activate_known_connection(&self, ssid: &Ssid) -> BackendResult<()> {
        (**self).activate_known_connection(ssid)
    }

    fn connect(&self, network: &NetworkEntry, passphrase: Option<&str>) -> BackendResult<()> {
        (**self).connect(network, passphrase)
    }

    fn forget_connection(&self, ssid: &Ssid) -> BackendResult<()> {
        (**self).forget_connection(ssid)
    }

    fn is_tethering_enabled(&self) -> bool {
        (**self).is_tethering_enabled()
    }

    fn set_tethering_enabled(&self, enabled: bool) -> BackendResult<()> {
        (**self).set_tethering_enabled(enabled)
    }

    fn tethering_password(&self) -> String {
        (**self).tethering_password()
    }

    fn set_tethering_password(&self, password: &str) -> BackendResult<()> {
        (**self).set_tethering_password(password)
    }

    fn update_cellular_settings(&self, roaming: bool, apn: &str) -> BackendResult<()> {
        (**self).update_cellular_settings(roaming, apn)
    }

    fn start(&self) {
        (**self).start()
    }

    fn stop(&self) {
        (**self).stop()
    }
}
