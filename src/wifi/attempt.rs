//! A single connection attempt with a deadline.

use crate::error::Result;
use crate::wifi::{truncated, Connection, LinkStatus, Radio, Ssid};

/// Outcome of polling an attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptStatus {
    Pending,
    Connected(Connection),
    Failed,
}

/// Tracks one `begin_connection` until the link is up, the radio gives up,
/// or the timeout passes.
#[derive(Clone, Debug)]
pub struct ConnectionAttempt {
    ssid: Ssid,
    started_ms: u64,
    timeout_ms: u64,
}

impl ConnectionAttempt {
    /// Ask the radio to connect and start the clock.
    pub fn start<R: Radio>(
        radio: &mut R,
        ssid: &str,
        password: Option<&str>,
        now_ms: u64,
        timeout_ms: u64,
    ) -> Result<Self> {
        info!("Connecting to {}", ssid);
        radio.begin_connection(ssid, password)?;
        Ok(Self {
            ssid: truncated(ssid),
            started_ms: now_ms,
            timeout_ms,
        })
    }

    pub fn poll<R: Radio>(&self, radio: &mut R, now_ms: u64) -> AttemptStatus {
        match radio.connection_status() {
            LinkStatus::Connected => {
                if let Some(address) = radio.local_address() {
                    info!("Connected to {}", self.ssid.as_str());
                    return AttemptStatus::Connected(Connection {
                        ssid: self.ssid.clone(),
                        address,
                    });
                }
            }
            LinkStatus::Failed => {
                warn!("Connection to {} failed", self.ssid.as_str());
                return AttemptStatus::Failed;
            }
            LinkStatus::Idle | LinkStatus::Connecting => {}
        }

        if self.expired(now_ms) {
            warn!(
                "Connection to {} timed out after {} ms",
                self.ssid.as_str(),
                self.timeout_ms
            );
            AttemptStatus::Failed
        } else {
            AttemptStatus::Pending
        }
    }

    pub fn expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.started_ms) >= self.timeout_ms
    }

    pub fn ssid(&self) -> &str {
        self.ssid.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{ConnectOutcome, MockRadio};
    use crate::wifi::{AuthMode, NetworkRecord};
    use core::net::Ipv4Addr;

    fn radio() -> MockRadio {
        MockRadio::new(&[NetworkRecord::new("Home", -50, AuthMode::Wpa2Psk)])
    }

    #[test]
    fn connects_after_link_delay() {
        let mut radio = radio();
        radio.accept("Home", "pw", 3);
        let attempt = ConnectionAttempt::start(&mut radio, "Home", Some("pw"), 0, 10_000).unwrap();
        assert_eq!(attempt.poll(&mut radio, 20), AttemptStatus::Pending);
        assert_eq!(attempt.poll(&mut radio, 40), AttemptStatus::Pending);
        match attempt.poll(&mut radio, 60) {
            AttemptStatus::Connected(conn) => {
                assert_eq!(conn.ssid.as_str(), "Home");
                assert_eq!(conn.address, Ipv4Addr::new(192, 168, 1, 42));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn wrong_password_times_out() {
        let mut radio = radio();
        radio.accept("Home", "right", 1);
        let attempt = ConnectionAttempt::start(&mut radio, "Home", Some("wrong"), 0, 10_000).unwrap();
        assert_eq!(attempt.poll(&mut radio, 9_999), AttemptStatus::Pending);
        assert_eq!(attempt.poll(&mut radio, 10_000), AttemptStatus::Failed);
    }

    #[test]
    fn radio_reported_failure_ends_attempt_early() {
        let mut radio = radio();
        radio.outcome = ConnectOutcome::Reject;
        let attempt = ConnectionAttempt::start(&mut radio, "Home", Some("pw"), 0, 10_000).unwrap();
        assert_eq!(attempt.poll(&mut radio, 20), AttemptStatus::Failed);
    }

    #[test]
    fn begin_error_is_returned() {
        let mut radio = radio();
        radio.outcome = ConnectOutcome::Error;
        assert!(ConnectionAttempt::start(&mut radio, "Home", None, 0, 10_000).is_err());
    }
}
