//! Station-mode WiFi on `esp-radio`, with DHCP from `embassy-net`.
//!
//! A connection counts as up once the driver reports an association
//! *and* the stack holds an IPv4 lease. `begin_connection` only hands the
//! request to the driver; association and DHCP progress in the background
//! (the stack runner is spawned by `main`) and each tick observes them.

use core::net::Ipv4Addr;

use embassy_futures::block_on;
use embassy_net::Stack;
use esp_radio::wifi::{
    AccessPointInfo, AuthMethod, ClientConfig, ModeConfig, ScanConfig, WifiController,
};

use crate::config::MAX_NETWORKS;
use crate::error::{RadioError, Result};
use crate::wifi::scanner::bounded;
use crate::wifi::{AuthMode, LinkStatus, NetworkList, NetworkRecord, Radio};

/// Driver-side state of the last `begin_connection`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Join {
    Idle,
    Requested,
    Rejected,
}

pub struct StationRadio<'d> {
    controller: WifiController<'d>,
    stack: Stack<'d>,
    join: Join,
}

impl<'d> StationRadio<'d> {
    /// Put the controller in client mode and start it.
    pub fn new(mut controller: WifiController<'d>, stack: Stack<'d>) -> Result<Self> {
        let mode = ModeConfig::Client(ClientConfig::default());
        if let Err(e) = controller.set_config(&mode) {
            warn!("wifi mode config failed: {:?}", defmt::Debug2Format(&e));
            return Err(RadioError::NotStarted.into());
        }
        if let Err(e) = block_on(controller.start_async()) {
            warn!("wifi start failed: {:?}", defmt::Debug2Format(&e));
            return Err(RadioError::NotStarted.into());
        }
        info!("WiFi started in station mode");

        Ok(Self {
            controller,
            stack,
            join: Join::Idle,
        })
    }
}

/// Map the driver's auth method onto ours. A missing method is open.
fn auth_mode(method: Option<AuthMethod>) -> AuthMode {
    match method {
        None | Some(AuthMethod::None) => AuthMode::Open,
        Some(AuthMethod::Wep) => AuthMode::Wep,
        Some(AuthMethod::Wpa) => AuthMode::WpaPsk,
        Some(AuthMethod::Wpa2Personal) => AuthMode::Wpa2Psk,
        Some(AuthMethod::WpaWpa2Personal) => AuthMode::WpaWpa2Psk,
        Some(AuthMethod::Wpa3Personal) | Some(AuthMethod::Wpa2Wpa3Personal) => AuthMode::Wpa3Psk,
        Some(AuthMethod::Wpa2Enterprise) => AuthMode::Enterprise,
        Some(_) => AuthMode::Unknown,
    }
}

fn record(ap: &AccessPointInfo) -> NetworkRecord {
    NetworkRecord::new(ap.ssid.as_str(), ap.signal_strength, auth_mode(ap.auth_method))
}

impl Radio for StationRadio<'_> {
    fn scan(&mut self) -> Result<NetworkList> {
        let config = ScanConfig::default().with_max(MAX_NETWORKS);
        match block_on(self.controller.scan_with_config_async(config)) {
            Ok(results) => {
                debug!("scan returned {} access points", results.len());
                Ok(bounded(results.iter().map(record)))
            }
            Err(e) => {
                warn!("scan failed: {:?}", defmt::Debug2Format(&e));
                Err(RadioError::ScanFailed.into())
            }
        }
    }

    fn begin_connection(&mut self, ssid: &str, password: Option<&str>) -> Result<()> {
        if matches!(self.controller.is_connected(), Ok(true)) {
            if let Err(e) = block_on(self.controller.disconnect_async()) {
                warn!("disconnect before join failed: {:?}", defmt::Debug2Format(&e));
            }
        }

        let client = match password {
            Some(password) => ClientConfig::default()
                .with_ssid(ssid.into())
                .with_password(password.into()),
            None => ClientConfig::default()
                .with_ssid(ssid.into())
                .with_auth_method(AuthMethod::None),
        };
        if let Err(e) = self.controller.set_config(&ModeConfig::Client(client)) {
            warn!("wifi client config failed: {:?}", defmt::Debug2Format(&e));
            return Err(RadioError::ConnectFailed.into());
        }

        // Returns as soon as the driver has the request.
        self.join = match self.controller.connect() {
            Ok(()) => {
                info!("joining {}", ssid);
                Join::Requested
            }
            Err(e) => {
                warn!("join request rejected: {:?}", defmt::Debug2Format(&e));
                Join::Rejected
            }
        };
        Ok(())
    }

    fn connection_status(&mut self) -> LinkStatus {
        match (self.join, self.controller.is_connected()) {
            (Join::Rejected, _) | (_, Err(_)) => LinkStatus::Failed,
            (Join::Requested, Ok(true)) => LinkStatus::Connected,
            (Join::Requested, Ok(false)) => LinkStatus::Connecting,
            (Join::Idle, _) => LinkStatus::Idle,
        }
    }

    fn local_address(&self) -> Option<Ipv4Addr> {
        self.stack.config_v4().map(|config| config.address.address())
    }

    fn disconnect(&mut self) -> Result<()> {
        self.join = Join::Idle;
        block_on(self.controller.disconnect_async()).map_err(|e| {
            debug!("disconnect: {:?}", defmt::Debug2Format(&e));
            RadioError::ConnectFailed.into()
        })
    }
}
