//! In-memory collaborators for host tests.
//!
//! These implement the same traits as the board glue so the whole
//! connection flow runs on the host: a scripted radio, a RAM key-value
//! store, settable control inputs and a 128×64 frame buffer.

use core::convert::Infallible;
use core::net::Ipv4Addr;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use heapless::{String, Vec};

use crate::config::{ADC_MAX, NAMESPACE_MAX_LEN, PASSWORD_MAX_LEN, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::error::{RadioError, Result, StorageError};
use crate::storage::CredentialStore;
use crate::ui::input::ControlInputs;
use crate::ui::Surface;
use crate::wifi::scanner::bounded;
use crate::wifi::{truncated, LinkStatus, NetworkList, NetworkRecord, Password, Radio, Ssid};

// ═══════════════════════════════════════════════════════════════════════════
// Radio
// ═══════════════════════════════════════════════════════════════════════════

/// How [`MockRadio`] answers `begin_connection`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Connect only to accepted SSID/password pairs; others hang until the
    /// caller times out.
    #[default]
    CheckCredentials,
    /// Report `LinkStatus::Failed` on the first status poll.
    Reject,
    /// Fail `begin_connection` itself.
    Error,
}

#[derive(Clone, Debug)]
struct Accepted {
    ssid: Ssid,
    password: Password,
    polls: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Link {
    Idle,
    /// Connects after this many more status polls.
    Joining(u32),
    /// Wrong credentials: never comes up.
    Hanging,
    Rejected,
    Up,
}

/// Scripted station radio.
#[derive(Clone, Debug)]
pub struct MockRadio {
    networks: NetworkList,
    accepted: Vec<Accepted, 4>,
    link: Link,
    pub outcome: ConnectOutcome,
    pub fail_scan: bool,
    pub address: Ipv4Addr,
    /// Every `begin_connection` call, in order.
    pub attempts: Vec<(Ssid, Option<Password>), 16>,
    pub scans: u32,
    pub disconnects: u32,
}

impl MockRadio {
    pub fn new(networks: &[NetworkRecord]) -> Self {
        Self {
            networks: bounded(networks.iter().cloned()),
            accepted: Vec::new(),
            link: Link::Idle,
            outcome: ConnectOutcome::default(),
            fail_scan: false,
            address: Ipv4Addr::new(192, 168, 1, 42),
            attempts: Vec::new(),
            scans: 0,
            disconnects: 0,
        }
    }

    /// Let `ssid` connect with `password` (empty for open networks) after
    /// `polls` status polls.
    pub fn accept(&mut self, ssid: &str, password: &str, polls: u32) {
        let _ = self.accepted.push(Accepted {
            ssid: truncated(ssid),
            password: truncated(password),
            polls,
        });
    }

    /// Results of the next scan.
    pub fn set_networks(&mut self, networks: &[NetworkRecord]) {
        self.networks = bounded(networks.iter().cloned());
    }

    pub fn is_connected(&self) -> bool {
        self.link == Link::Up
    }
}

impl Radio for MockRadio {
    fn scan(&mut self) -> Result<NetworkList> {
        self.scans += 1;
        if self.fail_scan {
            return Err(RadioError::ScanFailed.into());
        }
        Ok(self.networks.clone())
    }

    fn begin_connection(&mut self, ssid: &str, password: Option<&str>) -> Result<()> {
        let _ = self.attempts.push((truncated(ssid), password.map(truncated)));

        self.link = match self.outcome {
            ConnectOutcome::Error => return Err(RadioError::ConnectFailed.into()),
            ConnectOutcome::Reject => Link::Rejected,
            ConnectOutcome::CheckCredentials => {
                let password = password.unwrap_or("");
                self.accepted
                    .iter()
                    .find(|a| a.ssid.as_str() == ssid && a.password.as_str() == password)
                    .map_or(Link::Hanging, |a| Link::Joining(a.polls))
            }
        };
        Ok(())
    }

    fn connection_status(&mut self) -> LinkStatus {
        match self.link {
            Link::Idle => LinkStatus::Idle,
            Link::Joining(left) => {
                let left = left.saturating_sub(1);
                if left == 0 {
                    self.link = Link::Up;
                    LinkStatus::Connected
                } else {
                    self.link = Link::Joining(left);
                    LinkStatus::Connecting
                }
            }
            Link::Hanging => LinkStatus::Connecting,
            Link::Rejected => LinkStatus::Failed,
            Link::Up => LinkStatus::Connected,
        }
    }

    fn local_address(&self) -> Option<Ipv4Addr> {
        (self.link == Link::Up).then_some(self.address)
    }

    fn disconnect(&mut self) -> Result<()> {
        self.disconnects += 1;
        self.link = Link::Idle;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Credential store
// ═══════════════════════════════════════════════════════════════════════════

type Namespace = String<NAMESPACE_MAX_LEN>;

#[derive(Clone, Debug)]
struct Entry {
    namespace: Namespace,
    key: String<16>,
    value: String<PASSWORD_MAX_LEN>,
}

/// Handle returned by [`MemoryStore::open`].
#[derive(Debug)]
pub struct MemoryHandle {
    namespace: Namespace,
    read_only: bool,
}

/// RAM key-value store with failure injection.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Vec<Entry, 8>,
    pub fail_open: bool,
    pub fail_write: bool,
    /// Successful `put_string` calls.
    pub writes: u32,
    /// Handles opened and not yet closed.
    pub open_handles: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value without going through a handle.
    pub fn insert(&mut self, namespace: &str, key: &str, value: &str) {
        self.set(namespace, key, value);
    }

    /// Raw value under `namespace`/`key`.
    pub fn value(&self, namespace: &str, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.namespace.as_str() == namespace && e.key.as_str() == key)
            .map(|e| e.value.as_str())
    }

    fn set(&mut self, namespace: &str, key: &str, value: &str) -> bool {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.namespace.as_str() == namespace && e.key.as_str() == key)
        {
            entry.value = truncated(value);
            return true;
        }
        self.entries
            .push(Entry {
                namespace: truncated(namespace),
                key: truncated(key),
                value: truncated(value),
            })
            .is_ok()
    }
}

impl CredentialStore for MemoryStore {
    type Handle = MemoryHandle;

    fn open(&mut self, namespace: &str, read_only: bool) -> Result<MemoryHandle, StorageError> {
        if self.fail_open || namespace.is_empty() || namespace.len() > NAMESPACE_MAX_LEN {
            return Err(StorageError::OpenFailed);
        }
        self.open_handles += 1;
        Ok(MemoryHandle {
            namespace: truncated(namespace),
            read_only,
        })
    }

    fn get_string<const N: usize>(
        &mut self,
        handle: &MemoryHandle,
        key: &str,
        default: &str,
    ) -> Result<String<N>, StorageError> {
        let value = self.value(handle.namespace.as_str(), key).unwrap_or(default);
        String::try_from(value).map_err(|_| StorageError::Corrupted)
    }

    fn put_string(
        &mut self,
        handle: &MemoryHandle,
        key: &str,
        value: &str,
    ) -> Result<(), StorageError> {
        if handle.read_only {
            return Err(StorageError::ReadOnly);
        }
        if self.fail_write || !self.set(handle.namespace.as_str(), key, value) {
            return Err(StorageError::Flash);
        }
        self.writes += 1;
        Ok(())
    }

    fn close(&mut self, _handle: MemoryHandle) {
        self.open_handles = self.open_handles.saturating_sub(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Controls
// ═══════════════════════════════════════════════════════════════════════════

/// Potentiometer and button levels set directly by the test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptedInputs {
    pub x: u16,
    pub y: u16,
    /// Idle level of the active-low button is high.
    pub button_high: bool,
}

impl ScriptedInputs {
    /// Both pots centred, button released.
    pub const fn neutral() -> Self {
        Self {
            x: ADC_MAX / 2,
            y: ADC_MAX / 2,
            button_high: true,
        }
    }

    pub fn set_xy(&mut self, x: u16, y: u16) {
        self.x = x;
        self.y = y;
    }

    pub fn press(&mut self) {
        self.button_high = false;
    }

    pub fn release(&mut self) {
        self.button_high = true;
    }
}

impl Default for ScriptedInputs {
    fn default() -> Self {
        Self::neutral()
    }
}

impl ControlInputs for ScriptedInputs {
    fn read_x(&mut self) -> u16 {
        self.x
    }

    fn read_y(&mut self) -> u16 {
        self.y
    }

    fn button_is_high(&mut self) -> bool {
        self.button_high
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Display
// ═══════════════════════════════════════════════════════════════════════════

const FB_WIDTH: usize = SCREEN_WIDTH as usize;
const FB_HEIGHT: usize = SCREEN_HEIGHT as usize;

/// 128×64 monochrome frame buffer.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    pixels: [[bool; FB_WIDTH]; FB_HEIGHT],
    out_of_bounds: u32,
    /// Number of `present` calls.
    pub frames: u32,
}

impl FrameBuffer {
    pub const fn new() -> Self {
        Self {
            pixels: [[false; FB_WIDTH]; FB_HEIGHT],
            out_of_bounds: 0,
            frames: 0,
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }

    pub fn lit_pixels(&self) -> usize {
        self.pixels
            .iter()
            .map(|row| row.iter().filter(|p| **p).count())
            .sum()
    }

    /// Pixels drawn outside the panel since creation.
    pub fn out_of_bounds(&self) -> u32 {
        self.out_of_bounds
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (x, y) = (point.x, point.y);
            if x < 0 || y < 0 || x as usize >= FB_WIDTH || y as usize >= FB_HEIGHT {
                self.out_of_bounds += 1;
                continue;
            }
            self.pixels[y as usize][x as usize] = color.is_on();
        }
        Ok(())
    }
}

impl Surface for FrameBuffer {
    fn present(&mut self) -> Result<()> {
        self.frames += 1;
        Ok(())
    }
}
