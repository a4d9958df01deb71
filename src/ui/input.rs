//! Debounced potentiometer and button input.
//!
//! Two potentiometers act as a coarse joystick: each axis is split into
//! three zones and only a zone *transition* counts as a step, so holding a
//! knob at one end does not auto-repeat. The select button is active-low
//! with a pull-up.
//!
//! Everything here is driven by the caller's clock (`now_ms`); nothing reads
//! a timer on its own.

use crate::config::InputConfig;

/// Raw sample source: two ADC channels and one digital pin.
pub trait ControlInputs {
    /// X potentiometer, 0..=4095.
    fn read_x(&mut self) -> u16;
    /// Y potentiometer, 0..=4095.
    fn read_y(&mut self) -> u16;
    /// `true` while the select line is high (released).
    fn button_is_high(&mut self) -> bool;
}

/// Discretised region of one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Zone {
    Negative,
    Neutral,
    Positive,
}

impl Zone {
    pub fn from_raw(raw: u16, low: u16, high: u16) -> Self {
        if raw < low {
            Zone::Negative
        } else if raw > high {
            Zone::Positive
        } else {
            Zone::Neutral
        }
    }
}

/// One debounced step on an axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Movement {
    /// -1
    Back,
    /// 0
    #[default]
    Still,
    /// +1
    Forward,
}

impl Movement {
    pub fn delta(self) -> i8 {
        match self {
            Movement::Back => -1,
            Movement::Still => 0,
            Movement::Forward => 1,
        }
    }

    pub fn is_still(self) -> bool {
        self == Movement::Still
    }

    /// Sign of `delta`; zero is [`Movement::Still`].
    pub fn from_delta(delta: i8) -> Self {
        match delta {
            d if d < 0 => Movement::Back,
            0 => Movement::Still,
            _ => Movement::Forward,
        }
    }

    /// Step produced by a zone change.
    fn from_transition(from: Zone, to: Zone) -> Self {
        match (from, to) {
            (Zone::Neutral, Zone::Negative) | (Zone::Positive, Zone::Negative) => Movement::Back,
            (Zone::Neutral, Zone::Positive) | (Zone::Negative, Zone::Positive) => Movement::Forward,
            _ => Movement::Still,
        }
    }
}

/// Zone tracker for one potentiometer.
#[derive(Clone, Debug)]
pub struct AxisDebouncer {
    zone: Zone,
    last_transition_ms: Option<u64>,
    low: u16,
    high: u16,
    quiet_ms: u64,
}

impl AxisDebouncer {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            zone: Zone::Neutral,
            last_transition_ms: None,
            low: config.low_threshold,
            high: config.high_threshold,
            quiet_ms: config.axis_debounce_ms,
        }
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Feed one raw sample.
    ///
    /// A transition that arrives within the quiet interval is not accepted;
    /// the old zone is kept so the change is seen again on a later sample.
    pub fn sample(&mut self, raw: u16, now_ms: u64) -> Movement {
        let zone = Zone::from_raw(raw, self.low, self.high);
        if zone == self.zone {
            return Movement::Still;
        }

        if let Some(last) = self.last_transition_ms {
            if now_ms.saturating_sub(last) < self.quiet_ms {
                return Movement::Still;
            }
        }

        let movement = Movement::from_transition(self.zone, zone);
        self.zone = zone;
        self.last_transition_ms = Some(now_ms);
        movement
    }
}

/// Falling-edge detector for the active-low select button.
///
/// Both edges are debounced: a press is accepted only when the line has
/// been up for `debounce_ms` since the last release, and at least that
/// long after the previous accepted press.
#[derive(Clone, Debug)]
pub struct ButtonDebouncer {
    was_low: bool,
    last_press_ms: Option<u64>,
    last_release_ms: Option<u64>,
    debounce_ms: u64,
}

impl ButtonDebouncer {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            was_low: false,
            last_press_ms: None,
            last_release_ms: None,
            debounce_ms: config.button_debounce_ms,
        }
    }

    fn quiet_since(&self, mark: Option<u64>, now_ms: u64) -> bool {
        mark.map_or(true, |t| now_ms.saturating_sub(t) >= self.debounce_ms)
    }

    /// Returns `true` once per physical press, however long it is held.
    pub fn pressed(&mut self, level_high: bool, now_ms: u64) -> bool {
        let low = !level_high;
        let falling = low && !self.was_low;
        let rising = !low && self.was_low;
        self.was_low = low;

        if rising {
            self.last_release_ms = Some(now_ms);
        }
        if !falling {
            return false;
        }

        let settled = self.quiet_since(self.last_press_ms, now_ms)
            && self.quiet_since(self.last_release_ms, now_ms);
        if settled {
            self.last_press_ms = Some(now_ms);
        }
        settled
    }
}

/// Global rate limiter for cursor moves.
#[derive(Clone, Debug)]
pub struct MoveLimiter {
    last_move_ms: Option<u64>,
    delay_ms: u64,
}

impl MoveLimiter {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            last_move_ms: None,
            delay_ms: config.move_delay_ms,
        }
    }

    pub fn can_advance(&self, now_ms: u64) -> bool {
        self.last_move_ms
            .map_or(true, |last| now_ms.saturating_sub(last) >= self.delay_ms)
    }

    pub fn record(&mut self, now_ms: u64) {
        self.last_move_ms = Some(now_ms);
    }
}

/// Debounced input of one poll cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputFrame {
    pub dx: Movement,
    pub dy: Movement,
    pub pressed: bool,
}

impl InputFrame {
    pub const IDLE: Self = Self {
        dx: Movement::Still,
        dy: Movement::Still,
        pressed: false,
    };

    pub fn moved(&self) -> bool {
        !self.dx.is_still() || !self.dy.is_still()
    }
}

/// Both potentiometers plus the select button.
pub struct Controls<I> {
    inputs: I,
    x: AxisDebouncer,
    y: AxisDebouncer,
    button: ButtonDebouncer,
    limiter: MoveLimiter,
}

impl<I: ControlInputs> Controls<I> {
    pub fn new(inputs: I, config: &InputConfig) -> Self {
        Self {
            inputs,
            x: AxisDebouncer::new(config),
            y: AxisDebouncer::new(config),
            button: ButtonDebouncer::new(config),
            limiter: MoveLimiter::new(config),
        }
    }

    /// Sample everything once.
    ///
    /// The axes are only read when the move limiter allows it; the limiter
    /// is re-armed only when one of them actually produced a step.
    pub fn poll(&mut self, now_ms: u64) -> InputFrame {
        let mut frame = InputFrame::IDLE;

        if self.limiter.can_advance(now_ms) {
            frame.dx = self.x.sample(self.inputs.read_x(), now_ms);
            frame.dy = self.y.sample(self.inputs.read_y(), now_ms);
            if frame.moved() {
                self.limiter.record(now_ms);
            }
        }

        frame.pressed = self.button.pressed(self.inputs.button_is_high(), now_ms);
        frame
    }

    pub fn inputs_mut(&mut self) -> &mut I {
        &mut self.inputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEUTRAL: u16 = 2048;

    fn axis() -> AxisDebouncer {
        AxisDebouncer::new(&InputConfig::default())
    }

    #[test]
    fn zone_thresholds() {
        let cfg = InputConfig::default();
        let zone = |raw| Zone::from_raw(raw, cfg.low_threshold, cfg.high_threshold);
        assert_eq!(zone(0), Zone::Negative);
        assert_eq!(zone(1199), Zone::Negative);
        assert_eq!(zone(1200), Zone::Neutral);
        assert_eq!(zone(2895), Zone::Neutral);
        assert_eq!(zone(2896), Zone::Positive);
        assert_eq!(zone(4095), Zone::Positive);
    }

    #[test]
    fn neutral_to_negative_after_quiet_interval() {
        let mut x = axis();
        assert_eq!(x.sample(NEUTRAL, 0), Movement::Still);
        assert_eq!(x.sample(NEUTRAL, 200), Movement::Still);
        assert_eq!(x.sample(500, 400), Movement::Back);
    }

    #[test]
    fn negative_to_positive_skips_neutral() {
        let mut x = axis();
        assert_eq!(x.sample(500, 0), Movement::Back);
        assert_eq!(x.sample(500, 100), Movement::Still);
        assert_eq!(x.sample(3500, 300), Movement::Forward);
        assert_eq!(x.sample(500, 500), Movement::Back);
    }

    #[test]
    fn return_to_neutral_is_silent() {
        let mut x = axis();
        assert_eq!(x.sample(3500, 0), Movement::Forward);
        assert_eq!(x.sample(NEUTRAL, 200), Movement::Still);
        assert_eq!(x.zone(), Zone::Neutral);
        assert_eq!(x.sample(3500, 400), Movement::Forward);
    }

    #[test]
    fn holding_a_zone_does_not_repeat() {
        let mut y = axis();
        assert_eq!(y.sample(4000, 0), Movement::Forward);
        for t in (20..2_000).step_by(20) {
            assert_eq!(y.sample(4000, t), Movement::Still);
        }
    }

    #[test]
    fn transition_inside_quiet_interval_is_deferred() {
        let mut x = axis();
        assert_eq!(x.sample(500, 1_000), Movement::Back);
        // Jitter back to neutral too early: ignored, zone unchanged.
        assert_eq!(x.sample(NEUTRAL, 1_050), Movement::Still);
        assert_eq!(x.zone(), Zone::Negative);
        assert_eq!(x.sample(NEUTRAL, 1_150), Movement::Still);
        assert_eq!(x.zone(), Zone::Neutral);
    }

    #[test]
    fn never_two_steps_within_debounce_interval() {
        // Deterministic pseudo-random walk across all three zones.
        let mut x = axis();
        let mut seed: u32 = 0x1234_5678;
        let mut last_step: Option<u64> = None;
        for i in 0..5_000u64 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let raw = (seed >> 20) as u16 % 4096;
            let now = i * 7;
            if !x.sample(raw, now).is_still() {
                if let Some(prev) = last_step {
                    assert!(now - prev >= 150, "steps at {} and {}", prev, now);
                }
                last_step = Some(now);
            }
        }
        assert!(last_step.is_some());
    }

    #[test]
    fn button_fires_once_per_press() {
        let mut btn = ButtonDebouncer::new(&InputConfig::default());
        assert!(!btn.pressed(true, 0));
        assert!(btn.pressed(false, 10));
        for t in (20..1_000).step_by(20) {
            assert!(!btn.pressed(false, t));
        }
        assert!(!btn.pressed(true, 1_000));
        assert!(btn.pressed(false, 1_300));
    }

    #[test]
    fn button_bounce_is_suppressed() {
        let mut btn = ButtonDebouncer::new(&InputConfig::default());
        assert!(btn.pressed(false, 100));
        assert!(!btn.pressed(true, 105));
        assert!(!btn.pressed(false, 110));
        assert!(!btn.pressed(true, 400));
        assert!(!btn.pressed(false, 420));
        assert!(!btn.pressed(true, 430));
        assert!(btn.pressed(false, 650));
    }

    #[test]
    fn release_bounce_after_long_hold_is_not_a_press() {
        let mut btn = ButtonDebouncer::new(&InputConfig::default());
        assert!(btn.pressed(false, 100));
        for t in (120..400).step_by(20) {
            assert!(!btn.pressed(false, t));
        }
        // Contacts chatter as the button comes up.
        assert!(!btn.pressed(true, 400));
        assert!(!btn.pressed(false, 402));
        assert!(!btn.pressed(true, 404));
        assert!(!btn.pressed(false, 406));
        assert!(!btn.pressed(true, 408));
        // A real press once the line has settled.
        assert!(btn.pressed(false, 700));
    }

    #[test]
    fn limiter_spaces_moves() {
        let mut limiter = MoveLimiter::new(&InputConfig::default());
        assert!(limiter.can_advance(0));
        limiter.record(0);
        assert!(!limiter.can_advance(149));
        assert!(limiter.can_advance(150));
    }

    struct Fixed {
        x: u16,
        y: u16,
        high: bool,
        x_reads: usize,
    }

    impl ControlInputs for Fixed {
        fn read_x(&mut self) -> u16 {
            self.x_reads += 1;
            self.x
        }
        fn read_y(&mut self) -> u16 {
            self.y
        }
        fn button_is_high(&mut self) -> bool {
            self.high
        }
    }

    #[test]
    fn controls_gate_axis_reads_behind_limiter() {
        let inputs = Fixed {
            x: 4000,
            y: NEUTRAL,
            high: true,
            x_reads: 0,
        };
        let mut controls = Controls::new(inputs, &InputConfig::default());

        let frame = controls.poll(0);
        assert_eq!(frame.dx, Movement::Forward);
        assert_eq!(frame.dy, Movement::Still);

        // Limiter armed: axes are not even sampled.
        controls.inputs_mut().x = 500;
        let frame = controls.poll(50);
        assert!(!frame.moved());
        assert_eq!(controls.inputs_mut().x_reads, 1);

        let frame = controls.poll(160);
        assert_eq!(frame.dx, Movement::Back);
    }

    #[test]
    fn controls_report_button_regardless_of_limiter() {
        let inputs = Fixed {
            x: 4000,
            y: NEUTRAL,
            high: true,
            x_reads: 0,
        };
        let mut controls = Controls::new(inputs, &InputConfig::default());
        let _ = controls.poll(0);
        controls.inputs_mut().high = false;
        let frame = controls.poll(20);
        assert!(frame.pressed);
        assert!(!frame.moved());
    }
}
