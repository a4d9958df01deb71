//! Network scan and saved-network lookup.

use crate::error::{Error, Result};
use crate::wifi::{NetworkList, NetworkRecord, Radio};

/// Run one scan and log what was found.
///
/// An empty result is reported as [`Error::NoNetworksFound`].
pub fn scan<R: Radio>(radio: &mut R) -> Result<NetworkList> {
    let networks = radio.scan()?;
    if networks.is_empty() {
        info!("No networks found");
        return Err(Error::NoNetworksFound);
    }

    info!("Found {} networks", networks.len());
    for (i, net) in networks.iter().enumerate() {
        debug!(
            "{}: {} ({} dBm) {}",
            i + 1,
            net.ssid.as_str(),
            net.rssi,
            net.auth.label()
        );
    }
    Ok(networks)
}

/// Collect records in order, keeping at most the list capacity.
pub fn bounded<I>(records: I) -> NetworkList
where
    I: IntoIterator<Item = NetworkRecord>,
{
    let mut list = NetworkList::new();
    for record in records {
        if list.push(record).is_err() {
            break;
        }
    }
    list
}

/// First record whose SSID equals `ssid` byte for byte.
pub fn find<'a>(networks: &'a [NetworkRecord], ssid: &str) -> Option<&'a NetworkRecord> {
    networks.iter().find(|net| net.ssid.as_str() == ssid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_NETWORKS;
    use crate::mock::MockRadio;
    use crate::wifi::AuthMode;

    #[test]
    fn empty_scan_is_no_networks() {
        let mut radio = MockRadio::new(&[]);
        assert_eq!(scan(&mut radio), Err(Error::NoNetworksFound));
    }

    #[test]
    fn scan_keeps_order() {
        let mut radio = MockRadio::new(&[
            NetworkRecord::new("b", -40, AuthMode::Open),
            NetworkRecord::new("a", -70, AuthMode::Wpa2Psk),
        ]);
        let list = scan(&mut radio).unwrap();
        assert_eq!(list[0].ssid.as_str(), "b");
        assert_eq!(list[1].ssid.as_str(), "a");
    }

    #[test]
    fn radio_error_is_propagated() {
        let mut radio = MockRadio::new(&[]);
        radio.fail_scan = true;
        assert!(matches!(scan(&mut radio), Err(Error::Radio(_))));
    }

    #[test]
    fn bounded_drops_extra_records() {
        let list = bounded((0..30).map(|i| NetworkRecord::new("n", -(i as i8), AuthMode::Open)));
        assert_eq!(list.len(), MAX_NETWORKS);
        assert_eq!(list[MAX_NETWORKS - 1].rssi, -(MAX_NETWORKS as i8 - 1));
    }

    #[test]
    fn find_is_exact() {
        let list = bounded([
            NetworkRecord::new("Home", -40, AuthMode::Wpa2Psk),
            NetworkRecord::new("Home-5G", -60, AuthMode::Wpa2Psk),
        ]);
        assert_eq!(find(&list, "Home-5G").map(|n| n.rssi), Some(-60));
        assert!(find(&list, "home").is_none());
        assert!(find(&list, "Home ").is_none());
        assert!(find(&list, "").is_none());
    }
}
