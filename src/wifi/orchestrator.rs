//! Top-level connection policy.
//!
//! One cycle: scan → list of what was found → saved credentials (if that
//! SSID is on the air) → interactive selector → make sure the pair is
//! persisted → ready.
//! `restart` begins a new cycle with a fresh scan.

use crate::context::Context;
use crate::error::Error;
use crate::storage::CredentialStore;
use crate::ui::input::{ControlInputs, InputFrame};
use crate::ui::{screens, Surface};
use crate::wifi::attempt::{AttemptStatus, ConnectionAttempt};
use crate::wifi::scanner;
use crate::wifi::selector::{NetworkSelector, SelectorStep};
use crate::wifi::{Connection, CredentialPair, NetworkList, Radio};

/// What the orchestrator is doing, for logging and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    Scanning,
    Listing,
    NoNetworks,
    SavedAttempt,
    Announcing,
    Selecting,
    Ready,
    Failed,
}

/// Result of one orchestrator poll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Progress {
    Working,
    Ready(Connection),
    Failed(Error),
}

enum Phase {
    /// The first poll paints the scanning screen, the second one scans.
    Scanning { shown: bool },
    /// Scan results on screen; a press skips ahead.
    Listing { since_ms: u64 },
    NoNetworks { since_ms: u64 },
    SavedAttempt {
        attempt: ConnectionAttempt,
        credentials: CredentialPair,
    },
    /// "Connected!" after a saved-credential connection.
    Announcing {
        since_ms: u64,
        connection: Connection,
    },
    Selecting(NetworkSelector),
    Ready(Connection),
    Failed(Error),
}

pub struct Orchestrator {
    phase: Phase,
    networks: NetworkList,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            phase: Phase::Scanning { shown: false },
            networks: NetworkList::new(),
        }
    }

    /// Start a new cycle. The network list is rebuilt by the next scan.
    pub fn restart(&mut self) {
        info!("Restarting connection cycle");
        self.networks.clear();
        self.phase = Phase::Scanning { shown: false };
    }

    pub fn poll<R, S, I, D>(
        &mut self,
        ctx: &mut Context<R, S, I, D>,
        frame: InputFrame,
        now_ms: u64,
    ) -> Progress
    where
        R: Radio,
        S: CredentialStore,
        I: ControlInputs,
        D: Surface,
    {
        let next = match &mut self.phase {
            Phase::Scanning { shown: false } => {
                screens::scanning(&mut ctx.surface);
                ctx.present();
                Some(Phase::Scanning { shown: true })
            }

            Phase::Scanning { shown: true } => Some(Self::after_scan(&mut self.networks, ctx, now_ms)),

            Phase::Listing { since_ms } => {
                if frame.pressed || now_ms.saturating_sub(*since_ms) >= ctx.config.wifi.list_ms {
                    Some(Self::after_list(&self.networks, ctx, now_ms))
                } else {
                    None
                }
            }

            Phase::NoNetworks { since_ms } => {
                if now_ms.saturating_sub(*since_ms) >= ctx.config.wifi.notice_ms {
                    Some(Phase::Failed(Error::NoNetworksFound))
                } else {
                    None
                }
            }

            Phase::SavedAttempt {
                attempt,
                credentials,
            } => match attempt.poll(&mut ctx.radio, now_ms) {
                AttemptStatus::Pending => None,
                AttemptStatus::Connected(connection) => {
                    info!("Connected to saved network");
                    ctx.vault.ensure_saved(credentials);
                    screens::connected(&mut ctx.surface, connection.address);
                    ctx.present();
                    Some(Phase::Announcing {
                        since_ms: now_ms,
                        connection,
                    })
                }
                AttemptStatus::Failed => {
                    warn!("Failed to connect to saved network");
                    if let Err(e) = ctx.radio.disconnect() {
                        warn!("Disconnect failed: {:?}", e);
                    }
                    Some(Phase::Selecting(NetworkSelector::new(
                        &self.networks,
                        &ctx.config,
                        now_ms,
                    )))
                }
            },

            Phase::Announcing {
                since_ms,
                connection,
            } => {
                if now_ms.saturating_sub(*since_ms) >= ctx.config.wifi.notice_ms {
                    Some(Phase::Ready(connection.clone()))
                } else {
                    None
                }
            }

            Phase::Selecting(selector) => match selector.poll(ctx, &self.networks, frame, now_ms) {
                SelectorStep::Pending => None,
                SelectorStep::Connected {
                    connection,
                    credentials,
                } => {
                    ctx.vault.ensure_saved(&credentials);
                    Some(Phase::Ready(connection))
                }
                SelectorStep::Empty => Some(Phase::Failed(Error::NoNetworksFound)),
            },

            Phase::Ready(_) | Phase::Failed(_) => None,
        };

        if let Some(phase) = next {
            self.phase = phase;
        }

        match &self.phase {
            Phase::Ready(connection) => Progress::Ready(connection.clone()),
            Phase::Failed(e) => Progress::Failed(*e),
            _ => Progress::Working,
        }
    }

    /// Scan, then list the results (or go on straight away when the list
    /// is disabled).
    fn after_scan<R, S, I, D>(
        networks: &mut NetworkList,
        ctx: &mut Context<R, S, I, D>,
        now_ms: u64,
    ) -> Phase
    where
        R: Radio,
        S: CredentialStore,
        I: ControlInputs,
        D: Surface,
    {
        *networks = match scanner::scan(&mut ctx.radio) {
            Ok(networks) => networks,
            Err(Error::NoNetworksFound) => {
                screens::no_networks(&mut ctx.surface);
                ctx.present();
                return Phase::NoNetworks { since_ms: now_ms };
            }
            Err(e) => {
                warn!("Scan failed: {:?}", e);
                return Phase::Failed(e);
            }
        };

        if ctx.config.wifi.list_ms == 0 {
            return Self::after_list(networks, ctx, now_ms);
        }
        screens::network_list(&mut ctx.surface, networks);
        ctx.present();
        Phase::Listing { since_ms: now_ms }
    }

    /// Try the saved pair if its network is on the air, otherwise open the
    /// selector.
    fn after_list<R, S, I, D>(
        networks: &NetworkList,
        ctx: &mut Context<R, S, I, D>,
        now_ms: u64,
    ) -> Phase
    where
        R: Radio,
        S: CredentialStore,
        I: ControlInputs,
        D: Surface,
    {
        let Some(saved) = ctx.vault.load() else {
            return Phase::Selecting(NetworkSelector::new(networks, &ctx.config, now_ms));
        };

        let Some(network) = scanner::find(networks, saved.ssid.as_str()) else {
            info!("Saved network {} not found in scan", saved.ssid.as_str());
            return Phase::Selecting(NetworkSelector::new(networks, &ctx.config, now_ms));
        };

        info!("Found saved network: {}", saved.ssid.as_str());
        screens::connecting_saved(&mut ctx.surface, saved.ssid.as_str());
        ctx.present();

        match ConnectionAttempt::start(
            &mut ctx.radio,
            saved.ssid.as_str(),
            saved.password_for(network.auth),
            now_ms,
            ctx.config.wifi.connect_timeout_ms,
        ) {
            Ok(attempt) => Phase::SavedAttempt {
                attempt,
                credentials: saved,
            },
            Err(e) => {
                warn!("Could not start saved connection: {:?}", e);
                Phase::Selecting(NetworkSelector::new(networks, &ctx.config, now_ms))
            }
        }
    }

    pub fn stage(&self) -> Stage {
        match self.phase {
            Phase::Scanning { .. } => Stage::Scanning,
            Phase::Listing { .. } => Stage::Listing,
            Phase::NoNetworks { .. } => Stage::NoNetworks,
            Phase::SavedAttempt { .. } => Stage::SavedAttempt,
            Phase::Announcing { .. } => Stage::Announcing,
            Phase::Selecting(_) => Stage::Selecting,
            Phase::Ready(_) => Stage::Ready,
            Phase::Failed(_) => Stage::Failed,
        }
    }

    /// Results of the current cycle's scan.
    pub fn networks(&self) -> &NetworkList {
        &self.networks
    }

    pub fn selector(&self) -> Option<&NetworkSelector> {
        match &self.phase {
            Phase::Selecting(selector) => Some(selector),
            _ => None,
        }
    }
}
