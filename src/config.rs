//! Application-wide constants and runtime configuration.
//!
//! All hardware pin assignments, timing parameters, and layout
//! constants live here so they can be tuned in one place. The runtime
//! structs at the bottom default from these constants and are handed to
//! each component's constructor.

// Display

/// SSD1306 I²C address.
pub const OLED_I2C_ADDRESS: u8 = 0x3C;

/// Panel size in pixels.
pub const SCREEN_WIDTH: u32 = 128;
pub const SCREEN_HEIGHT: u32 = 64;

// GPIO pin assignments (ESP32-C3 SuperMini)
//
// esp-hal hands out pins as distinct peripheral types, so the wiring is
// fixed in `main.rs`; keep this table in step with it.
//
//   OLED SDA       → GPIO8
//   OLED SCL       → GPIO9
//   Pot X (ADC1)   → GPIO0
//   Pot Y (ADC1)   → GPIO1
//   Button SELECT  → GPIO2 (active-low, internal pull-up)

// Analog input

/// Full-scale reading of the 12-bit ADC.
pub const ADC_MAX: u16 = 4095;

/// Readings below this are the negative zone.
pub const AXIS_LOW_THRESHOLD: u16 = 1200;

/// Readings above this are the positive zone.
pub const AXIS_HIGH_THRESHOLD: u16 = ADC_MAX - AXIS_LOW_THRESHOLD;

/// Quiet interval between accepted zone transitions on one axis (ms).
pub const AXIS_DEBOUNCE_MS: u64 = 150;

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 200;

/// Minimum spacing between two cursor moves, across both axes (ms).
pub const MOVE_DELAY_MS: u64 = 150;

/// Control loop period (ms).
pub const POLL_INTERVAL_MS: u64 = 20;

// WiFi

/// Maximum number of networks kept from one scan.
pub const MAX_NETWORKS: usize = 20;

/// SSIDs are at most 32 bytes (802.11).
pub const SSID_MAX_LEN: usize = 32;

/// WPA passphrases are at most 63 characters, PSKs 64 hex digits.
pub const PASSWORD_MAX_LEN: usize = 64;

/// How long one connection attempt may take before it is abandoned (ms).
pub const CONNECT_TIMEOUT_MS: u64 = 10_000;

/// How long a result / "no networks" notice stays up (ms).
pub const NOTICE_MS: u64 = 2_000;

/// How long the "Enter password for:" prompt is shown (ms).
pub const PASSWORD_PROMPT_MS: u64 = 1_000;

/// How long the scan result list stays up unless skipped with a press (ms).
/// Zero skips the list.
pub const NETWORK_LIST_MS: u64 = 1_500;

// Credential storage

/// Namespace holding the saved credential pair.
pub const CREDENTIALS_NAMESPACE: &str = "wifi-creds";

pub const KEY_SSID: &str = "ssid";
pub const KEY_PASSWORD: &str = "password";

/// Longest namespace name the store accepts.
pub const NAMESPACE_MAX_LEN: usize = 15;

/// Flash region reserved for the credential map (the default NVS partition
/// of the ESP-IDF layout, 6 × 4 KB sectors).
pub const STORAGE_FLASH_START: u32 = 0x9000;
pub const STORAGE_FLASH_END: u32 = 0xF000;

// On-screen keyboard

/// Password buffer capacity (visible characters).
pub const PASSWORD_CAPACITY: usize = 49;

/// Keyboard cell size in pixels.
pub const KEY_CELL_WIDTH: u32 = 7;
pub const KEY_CELL_HEIGHT: u32 = 8;

/// First pixel row of the key grid.
pub const KEY_GRID_TOP: i32 = 16;

// Marquee

/// Pixel advance of one character of the 6×10 font.
pub const CHAR_WIDTH_PX: u32 = 6;

/// Pixels moved per smooth-scroll step.
pub const SMOOTH_STEP_PX: u32 = 2;

pub const MARQUEE_WIDTH_CHARS: usize = 20;
pub const MARQUEE_WIDTH_PX: u32 = 120;
pub const MARQUEE_SCROLL_MS: u64 = 150;
pub const MARQUEE_PAUSE_MS: u64 = 1_000;

/// SSID field on the selector screen: 18 characters next to the "SSID:" label.
pub const SSID_MARQUEE_WIDTH_CHARS: usize = 18;
pub const SSID_MARQUEE_SCROLL_MS: u64 = 100;
pub const SSID_MARQUEE_PAUSE_MS: u64 = 1_500;

/// Password prompt: almost full width.
pub const PROMPT_MARQUEE_WIDTH_CHARS: usize = 21;

/// Keyboard edit line, left of the focused-key label.
pub const BUFFER_MARQUEE_WIDTH_CHARS: usize = 16;
pub const BUFFER_MARQUEE_SCROLL_MS: u64 = 80;
pub const BUFFER_MARQUEE_PAUSE_MS: u64 = 600;

// Runtime configuration

/// Thresholds and timings of the debounced controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputConfig {
    pub low_threshold: u16,
    pub high_threshold: u16,
    pub axis_debounce_ms: u64,
    pub button_debounce_ms: u64,
    pub move_delay_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            low_threshold: AXIS_LOW_THRESHOLD,
            high_threshold: AXIS_HIGH_THRESHOLD,
            axis_debounce_ms: AXIS_DEBOUNCE_MS,
            button_debounce_ms: BUTTON_DEBOUNCE_MS,
            move_delay_ms: MOVE_DELAY_MS,
        }
    }
}

/// Geometry and timing of one scrolling text field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MarqueeConfig {
    /// Visible characters.
    pub width_chars: usize,
    /// Visible pixels (used to clear / clip the field).
    pub width_px: u32,
    /// Pixel advance of one character.
    pub char_px: u32,
    pub scroll_delay_ms: u64,
    pub pause_delay_ms: u64,
    pub looping: bool,
    pub smooth: bool,
}

impl Default for MarqueeConfig {
    fn default() -> Self {
        Self {
            width_chars: MARQUEE_WIDTH_CHARS,
            width_px: MARQUEE_WIDTH_PX,
            char_px: CHAR_WIDTH_PX,
            scroll_delay_ms: MARQUEE_SCROLL_MS,
            pause_delay_ms: MARQUEE_PAUSE_MS,
            looping: true,
            smooth: true,
        }
    }
}

impl MarqueeConfig {
    /// Field of `width_chars` characters, pixel width derived from the font.
    pub const fn with_width(mut self, width_chars: usize) -> Self {
        self.width_chars = width_chars;
        self.width_px = width_chars as u32 * self.char_px;
        self
    }

    /// SSID line of the selector screen.
    pub fn ssid() -> Self {
        Self {
            scroll_delay_ms: SSID_MARQUEE_SCROLL_MS,
            pause_delay_ms: SSID_MARQUEE_PAUSE_MS,
            ..Self::default()
        }
        .with_width(SSID_MARQUEE_WIDTH_CHARS)
    }

    /// SSID line of the password prompt.
    pub fn prompt() -> Self {
        Self::default().with_width(PROMPT_MARQUEE_WIDTH_CHARS)
    }

    /// Edit line of the keyboard: runs once to the tail and stays there.
    pub fn edit_line() -> Self {
        Self {
            scroll_delay_ms: BUFFER_MARQUEE_SCROLL_MS,
            pause_delay_ms: BUFFER_MARQUEE_PAUSE_MS,
            looping: false,
            smooth: false,
            ..Self::default()
        }
        .with_width(BUFFER_MARQUEE_WIDTH_CHARS)
    }
}

/// Connection policy knobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WifiConfig {
    pub namespace: &'static str,
    pub connect_timeout_ms: u64,
    pub notice_ms: u64,
    pub prompt_ms: u64,
    pub list_ms: u64,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            namespace: CREDENTIALS_NAMESPACE,
            connect_timeout_ms: CONNECT_TIMEOUT_MS,
            notice_ms: NOTICE_MS,
            prompt_ms: PASSWORD_PROMPT_MS,
            list_ms: NETWORK_LIST_MS,
        }
    }
}

/// Everything tunable at runtime, passed down through the context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub input: InputConfig,
    pub wifi: WifiConfig,
    pub ssid_marquee: MarqueeConfig,
    pub prompt_marquee: MarqueeConfig,
    pub edit_marquee: MarqueeConfig,
}

impl Config {
    pub fn new() -> Self {
        Self {
            input: InputConfig::default(),
            wifi: WifiConfig::default(),
            ssid_marquee: MarqueeConfig::ssid(),
            prompt_marquee: MarqueeConfig::prompt(),
            edit_marquee: MarqueeConfig::edit_line(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
