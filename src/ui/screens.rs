//! Full-screen painters.
//!
//! Each function clears the target and draws one screen. None of them
//! presents; the caller flushes once per frame.

use core::fmt::Write;
use core::net::Ipv4Addr;

use embedded_graphics::mono_font::ascii::{FONT_4X6, FONT_5X8, FONT_6X10};
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use heapless::String;

use crate::config::SCREEN_WIDTH;
use crate::ui::marquee::Marquee;
use crate::wifi::NetworkRecord;

/// Pixel rows between text lines.
const LINE_HEIGHT: i32 = 10;

/// Left edge of the SSID marquee on the summary screen ("SSID:" is 5 chars).
const SSID_FIELD_X: i32 = 30;

/// Networks listed by name on the scan result screen.
pub const LISTED_NETWORKS: usize = 6;

/// Row pitch of the scan result list (5×8 font).
const LIST_LINE_HEIGHT: i32 = 8;

/// Small-print rows at the bottom of the summary screen (4×6 font).
const FOOTER_TOP: i32 = 52;
const FOOTER_LINE_HEIGHT: i32 = 6;

fn small_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_4X6)
        .text_color(BinaryColor::On)
        .build()
}

fn text_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

fn line<D>(target: &mut D, text: &str, row: i32)
where
    D: DrawTarget<Color = BinaryColor>,
{
    let _ = Text::with_baseline(text, Point::new(0, row * LINE_HEIGHT), text_style(), Baseline::Top)
        .draw(target);
}

/// Clear and print `lines` top to bottom.
pub fn message<D>(target: &mut D, lines: &[&str])
where
    D: DrawTarget<Color = BinaryColor>,
{
    let _ = target.clear(BinaryColor::Off);
    for (row, text) in lines.iter().enumerate() {
        line(target, text, row as i32);
    }
}

pub fn scanning<D>(target: &mut D)
where
    D: DrawTarget<Color = BinaryColor>,
{
    message(target, &["WiFi Selector", "Scanning networks..."]);
}

pub fn no_networks<D>(target: &mut D)
where
    D: DrawTarget<Color = BinaryColor>,
{
    message(target, &["No WiFi networks", "found!"]);
}

pub fn nothing_to_select<D>(target: &mut D)
where
    D: DrawTarget<Color = BinaryColor>,
{
    message(target, &["No networks to", "select from!"]);
}

pub fn connecting_saved<D>(target: &mut D, ssid: &str)
where
    D: DrawTarget<Color = BinaryColor>,
{
    message(target, &["Connecting to saved:", ssid]);
}

pub fn connecting<D>(target: &mut D, ssid: &str)
where
    D: DrawTarget<Color = BinaryColor>,
{
    message(target, &["Connecting to:", ssid, "Please wait..."]);
}

pub fn connected<D>(target: &mut D, address: Ipv4Addr)
where
    D: DrawTarget<Color = BinaryColor>,
{
    let ip = ip_line(address);
    message(target, &["Connected!", ip.as_str()]);
}

pub fn connection_failed<D>(target: &mut D)
where
    D: DrawTarget<Color = BinaryColor>,
{
    message(target, &["Connection failed!", "Press button", "to try again"]);
}

/// Idle screen once the device is online.
pub fn online<D>(target: &mut D, ssid: &str, address: Ipv4Addr)
where
    D: DrawTarget<Color = BinaryColor>,
{
    let ip = ip_line(address);
    message(target, &["WiFi ready", ssid, ip.as_str()]);
}

/// Terminal error, waiting for a button press to rescan.
pub fn retry_prompt<D>(target: &mut D, reason: &str)
where
    D: DrawTarget<Color = BinaryColor>,
{
    message(target, &[reason, "", "Press button", "to scan again"]);
}

/// "Enter password for:" with the SSID on the next line.
pub fn password_prompt<D, const N: usize>(target: &mut D, ssid: &Marquee<N>)
where
    D: DrawTarget<Color = BinaryColor>,
{
    message(target, &["Enter password for:"]);
    ssid.draw_with_background(
        target,
        Point::new(0, LINE_HEIGHT),
        text_style(),
        BinaryColor::Off,
    );
}

/// Browsing screen for the network at `index` of `total`.
pub fn network_summary<D, const N: usize>(
    target: &mut D,
    network: &NetworkRecord,
    ssid: &Marquee<N>,
    index: usize,
    total: usize,
) where
    D: DrawTarget<Color = BinaryColor>,
{
    let _ = target.clear(BinaryColor::Off);
    line(target, "Select Network:", 0);

    let row_y = LINE_HEIGHT + 2;
    let _ = Text::with_baseline("SSID:", Point::new(0, row_y), text_style(), Baseline::Top)
        .draw(target);
    let panel = target.bounding_box();
    ssid.draw_with_background(
        &mut target.clipped(&panel),
        Point::new(SSID_FIELD_X, row_y),
        text_style(),
        BinaryColor::Off,
    );

    let mut buf: String<32> = String::new();
    let _ = write!(buf, "Signal: {} dBm", network.rssi);
    line_at(target, buf.as_str(), row_y + LINE_HEIGHT);
    signal_bars(target, network.signal_bars(), row_y + LINE_HEIGHT);

    buf.clear();
    if network.needs_password() {
        let _ = write!(buf, "Protected {}", network.auth.label());
    } else {
        let _ = buf.push_str("Open");
    }
    line_at(target, buf.as_str(), row_y + 2 * LINE_HEIGHT);

    buf.clear();
    let _ = write!(buf, "Network {} of {}", index + 1, total);
    line_at(target, buf.as_str(), row_y + 3 * LINE_HEIGHT);

    let _ = Text::with_baseline(
        "Y:nav  BTN:select",
        Point::new(0, FOOTER_TOP),
        small_style(),
        Baseline::Top,
    )
    .draw(target);
    if ssid.needs_scrolling() {
        let _ = Text::with_baseline(
            "Scrolling...",
            Point::new(0, FOOTER_TOP + FOOTER_LINE_HEIGHT),
            small_style(),
            Baseline::Top,
        )
        .draw(target);
    }
}

/// Scan results: a count, the first [`LISTED_NETWORKS`] as "ssid (rssi)"
/// and how many did not fit. Long names are clipped at the panel edge.
pub fn network_list<D>(target: &mut D, networks: &[NetworkRecord])
where
    D: DrawTarget<Color = BinaryColor>,
{
    let _ = target.clear(BinaryColor::Off);
    let panel = target.bounding_box();
    let mut clipped = target.clipped(&panel);

    let mut buf: String<48> = String::new();
    let _ = write!(buf, "Found {} networks:", networks.len());
    list_line(&mut clipped, buf.as_str(), 0);

    let mut row = 1;
    for network in networks.iter().take(LISTED_NETWORKS) {
        buf.clear();
        let _ = write!(buf, "{} ({})", network.ssid.as_str(), network.rssi);
        list_line(&mut clipped, buf.as_str(), row);
        row += 1;
    }

    if networks.len() > LISTED_NETWORKS {
        buf.clear();
        let _ = write!(buf, "...and {} more", networks.len() - LISTED_NETWORKS);
        list_line(&mut clipped, buf.as_str(), row);
    }
}

fn list_line<D>(target: &mut D, text: &str, row: i32)
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyleBuilder::new()
        .font(&FONT_5X8)
        .text_color(BinaryColor::On)
        .build();
    let at = Point::new(0, row * LIST_LINE_HEIGHT);
    let _ = Text::with_baseline(text, at, style, Baseline::Top).draw(target);
}

fn line_at<D>(target: &mut D, text: &str, y: i32)
where
    D: DrawTarget<Color = BinaryColor>,
{
    let _ = Text::with_baseline(text, Point::new(0, y), text_style(), Baseline::Top).draw(target);
}

/// Four ascending bars at the right edge, `level` of them filled.
fn signal_bars<D>(target: &mut D, level: u8, top: i32)
where
    D: DrawTarget<Color = BinaryColor>,
{
    const BAR_WIDTH: u32 = 3;
    const BAR_GAP: u32 = 1;
    let left = SCREEN_WIDTH as i32 - 4 * (BAR_WIDTH + BAR_GAP) as i32;

    for i in 0..4u8 {
        let height = 2 + 2 * u32::from(i);
        let x = left + i32::from(i) * (BAR_WIDTH + BAR_GAP) as i32;
        let y = top + 8 - height as i32;
        let bar = Rectangle::new(Point::new(x, y), Size::new(BAR_WIDTH, height));
        let style = if i < level {
            PrimitiveStyle::with_fill(BinaryColor::On)
        } else {
            PrimitiveStyle::with_stroke(BinaryColor::On, 1)
        };
        let _ = bar.into_styled(style).draw(target);
    }
}

fn ip_line(address: Ipv4Addr) -> String<24> {
    let mut s = String::new();
    let _ = write!(s, "IP: {}", address);
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarqueeConfig;
    use crate::mock::FrameBuffer;
    use crate::wifi::AuthMode;

    #[test]
    fn ip_line_formats_dotted_quad() {
        assert_eq!(ip_line(Ipv4Addr::new(10, 0, 0, 7)).as_str(), "IP: 10.0.0.7");
    }

    #[test]
    fn message_draws_something() {
        let mut fb = FrameBuffer::new();
        scanning(&mut fb);
        assert!(fb.lit_pixels() > 0);
        message(&mut fb, &[]);
        assert_eq!(fb.lit_pixels(), 0);
    }

    #[test]
    fn more_bars_light_more_pixels() {
        let mut weak = FrameBuffer::new();
        let mut strong = FrameBuffer::new();
        signal_bars(&mut weak, 1, 0);
        signal_bars(&mut strong, 4, 0);
        assert!(strong.lit_pixels() > weak.lit_pixels());
    }

    fn lit_rows(fb: &FrameBuffer, rows: core::ops::Range<usize>) -> usize {
        rows.flat_map(|y| (0..SCREEN_WIDTH as usize).map(move |x| (x, y)))
            .filter(|&(x, y)| fb.pixel(x, y))
            .count()
    }

    fn summary_with(ssid: &str) -> FrameBuffer {
        let mut fb = FrameBuffer::new();
        let mut m: Marquee = Marquee::new(MarqueeConfig::ssid());
        let net = NetworkRecord::new(ssid, -60, AuthMode::Wpa2Psk);
        m.set_text(net.ssid.as_str(), 0);
        network_summary(&mut fb, &net, &m, 0, 1);
        fb
    }

    #[test]
    fn scrolling_hint_only_for_long_ssids() {
        let indicator = (FOOTER_TOP + FOOTER_LINE_HEIGHT) as usize..64;
        assert_eq!(lit_rows(&summary_with("Home"), indicator.clone()), 0);
        assert!(lit_rows(&summary_with("A network name that will not fit"), indicator) > 0);
    }

    fn named(count: usize) -> heapless::Vec<NetworkRecord, 20> {
        let mut nets = heapless::Vec::new();
        for i in 0..count {
            let mut name: String<32> = String::new();
            let _ = write!(name, "net-{}", i);
            let _ = nets.push(NetworkRecord::new(name.as_str(), -40 - i as i8, AuthMode::Open));
        }
        nets
    }

    #[test]
    fn short_list_has_no_overflow_line() {
        let mut fb = FrameBuffer::new();
        network_list(&mut fb, &named(3));
        // Header plus three names fill the top four rows only.
        assert!(lit_rows(&fb, 0..32) > 0);
        assert_eq!(lit_rows(&fb, 32..64), 0);
    }

    #[test]
    fn long_list_ends_with_overflow_line() {
        let mut fb = FrameBuffer::new();
        network_list(&mut fb, &named(9));
        // Header, six names and "...and 3 more" use all eight rows.
        assert!(lit_rows(&fb, 56..64) > 0);
        assert_eq!(fb.out_of_bounds(), 0);
    }

    #[test]
    fn overlong_names_are_clipped_to_the_panel() {
        let mut fb = FrameBuffer::new();
        let nets = [NetworkRecord::new("An extremely long network name, 32b", -50, AuthMode::Open)];
        network_list(&mut fb, &nets);
        assert!(fb.lit_pixels() > 0);
        assert_eq!(fb.out_of_bounds(), 0);
    }

    #[test]
    fn summary_stays_on_panel() {
        let mut fb = FrameBuffer::new();
        let mut m: Marquee = Marquee::new(MarqueeConfig::ssid());
        let net = NetworkRecord::new("A very long network name indeed", -72, AuthMode::WpaWpa2Psk);
        m.set_text(net.ssid.as_str(), 0);
        network_summary(&mut fb, &net, &m, 3, 12);
        assert!(fb.lit_pixels() > 0);
        assert_eq!(fb.out_of_bounds(), 0);
    }
}
