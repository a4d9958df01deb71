//! WiFi subsystem: scan results, the radio seam and the connection flow.
//!
//! ## Components
//!
//! - **scanner**: one scan, bounded result list, saved-network lookup
//! - **attempt**: one connection attempt with a deadline
//! - **selector**: interactive network picker (list + password keyboard)
//! - **orchestrator**: saved credentials first, then the selector

pub mod attempt;
pub mod orchestrator;
pub mod scanner;
pub mod selector;

use core::net::Ipv4Addr;

use heapless::{String, Vec};

use crate::config::{MAX_NETWORKS, PASSWORD_MAX_LEN, SSID_MAX_LEN};
use crate::error::Result;

pub type Ssid = String<SSID_MAX_LEN>;
pub type Password = String<PASSWORD_MAX_LEN>;

/// Scan results in scan order, at most [`MAX_NETWORKS`].
pub type NetworkList = Vec<NetworkRecord, MAX_NETWORKS>;

/// Authentication advertised by an access point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AuthMode {
    Open,
    Wep,
    WpaPsk,
    Wpa2Psk,
    WpaWpa2Psk,
    Wpa3Psk,
    Enterprise,
    Unknown,
}

impl AuthMode {
    /// Everything except an open network asks for a password.
    pub fn needs_password(self) -> bool {
        self != AuthMode::Open
    }

    pub fn label(self) -> &'static str {
        match self {
            AuthMode::Open => "Open",
            AuthMode::Wep => "WEP",
            AuthMode::WpaPsk => "WPA",
            AuthMode::Wpa2Psk => "WPA2",
            AuthMode::WpaWpa2Psk => "WPA/WPA2",
            AuthMode::Wpa3Psk => "WPA3",
            AuthMode::Enterprise => "Enterprise",
            AuthMode::Unknown => "Unknown",
        }
    }
}

/// One access point seen by a scan.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetworkRecord {
    pub ssid: Ssid,
    /// Signal strength in dBm.
    pub rssi: i8,
    pub auth: AuthMode,
}

impl NetworkRecord {
    /// Build a record, cutting the SSID at [`SSID_MAX_LEN`] bytes on a
    /// character boundary.
    pub fn new(ssid: &str, rssi: i8, auth: AuthMode) -> Self {
        Self {
            ssid: truncated(ssid),
            rssi,
            auth,
        }
    }

    pub fn needs_password(&self) -> bool {
        self.auth.needs_password()
    }

    /// Signal quality on a 0..=4 scale.
    pub fn signal_bars(&self) -> u8 {
        match self.rssi {
            r if r >= -50 => 4,
            r if r >= -60 => 3,
            r if r >= -70 => 2,
            r if r >= -80 => 1,
            _ => 0,
        }
    }
}

/// Saved SSID and password. An open network stores an empty password.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CredentialPair {
    pub ssid: Ssid,
    pub password: Password,
}

impl CredentialPair {
    pub fn new(ssid: &str, password: &str) -> Self {
        Self {
            ssid: truncated(ssid),
            password: truncated(password),
        }
    }

    /// Password to hand to the radio for a network with `auth`.
    pub fn password_for(&self, auth: AuthMode) -> Option<&str> {
        if auth.needs_password() {
            Some(self.password.as_str())
        } else {
            None
        }
    }
}

/// Station link state as reported by the radio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkStatus {
    /// No connection requested.
    Idle,
    /// Association or DHCP in progress.
    Connecting,
    /// Associated and addressed.
    Connected,
    /// The radio gave up on the current request.
    Failed,
}

/// An established station link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
    pub ssid: Ssid,
    pub address: Ipv4Addr,
}

/// Station-mode radio driver.
///
/// `begin_connection` only starts the request; progress is observed by
/// polling [`Radio::connection_status`] every tick.
pub trait Radio {
    /// Blocking scan. Results beyond [`MAX_NETWORKS`] are dropped.
    fn scan(&mut self) -> Result<NetworkList>;

    /// Start connecting. `password` is `None` for open networks.
    fn begin_connection(&mut self, ssid: &str, password: Option<&str>) -> Result<()>;

    fn connection_status(&mut self) -> LinkStatus;

    /// IPv4 address once the link is up.
    fn local_address(&self) -> Option<Ipv4Addr>;

    fn disconnect(&mut self) -> Result<()>;
}

/// Copy `s` into a bounded string, dropping whatever does not fit.
pub(crate) fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
