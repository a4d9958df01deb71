//! Time-driven scrolling text for fixed-width fields.
//!
//! A [`Marquee`] owns a copy of its text and a scroll position. The data
//! side (`update` / `window`) is separate from painting, so the same
//! scroller can be drawn plainly or over a cleared field.
//!
//! Positions count characters, not bytes; SSIDs may carry UTF-8.

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use heapless::String;

use crate::config::{MarqueeConfig, SMOOTH_STEP_PX};

/// Default text capacity, enough for SSIDs and passwords.
pub const MARQUEE_CAPACITY: usize = 64;

/// Scrolling view over one piece of text.
#[derive(Clone, Debug)]
pub struct Marquee<const N: usize = MARQUEE_CAPACITY> {
    text: String<N>,
    len_chars: usize,
    config: MarqueeConfig,
    position: usize,
    pixel_offset: u32,
    paused: bool,
    parked: bool,
    pause_started_ms: u64,
    last_step_ms: u64,
    needs_scrolling: bool,
}

impl<const N: usize> Marquee<N> {
    pub fn new(config: MarqueeConfig) -> Self {
        Self {
            text: String::new(),
            len_chars: 0,
            config,
            position: 0,
            pixel_offset: 0,
            paused: false,
            parked: false,
            pause_started_ms: 0,
            last_step_ms: 0,
            needs_scrolling: false,
        }
    }

    /// Replace the text and restart from the head with a fresh pause.
    ///
    /// Text longer than the capacity is cut at a character boundary.
    pub fn set_text(&mut self, text: &str, now_ms: u64) {
        self.text.clear();
        for c in text.chars() {
            if self.text.push(c).is_err() {
                break;
            }
        }
        self.len_chars = self.text.chars().count();
        self.reset(now_ms);
        self.needs_scrolling = self.len_chars > self.config.width_chars;
    }

    /// Back to the head, paused.
    pub fn reset(&mut self, now_ms: u64) {
        self.position = 0;
        self.pixel_offset = 0;
        self.parked = false;
        self.last_step_ms = now_ms;
        self.pause_started_ms = now_ms;
        self.paused = true;
    }

    pub fn pause(&mut self, now_ms: u64) {
        self.paused = true;
        self.pause_started_ms = now_ms;
    }

    pub fn resume(&mut self, now_ms: u64) {
        self.paused = false;
        self.last_step_ms = now_ms;
    }

    /// Advance the animation. Call every loop iteration.
    ///
    /// Returns `true` when the visible window moved, so the caller knows
    /// the field needs repainting.
    pub fn update(&mut self, now_ms: u64) -> bool {
        if !self.needs_scrolling || self.parked {
            return false;
        }

        if self.paused {
            if now_ms.saturating_sub(self.pause_started_ms) >= self.config.pause_delay_ms {
                self.resume(now_ms);
            }
            return false;
        }

        if now_ms.saturating_sub(self.last_step_ms) < self.config.scroll_delay_ms {
            return false;
        }

        let before = (self.position, self.pixel_offset);
        if self.config.smooth {
            self.pixel_offset += SMOOTH_STEP_PX;
            if self.pixel_offset >= self.config.char_px {
                self.pixel_offset = 0;
                self.advance_char(now_ms);
            }
        } else {
            self.advance_char(now_ms);
        }

        self.last_step_ms = now_ms;
        (self.position, self.pixel_offset) != before
    }

    fn advance_char(&mut self, now_ms: u64) {
        self.position += 1;
        if self.position < self.len_chars {
            return;
        }

        if self.config.looping {
            self.position = 0;
        } else {
            // Stay on the tail until the text changes.
            self.position = self.len_chars.saturating_sub(self.config.width_chars);
            self.parked = true;
        }
        self.pixel_offset = 0;
        self.pause(now_ms);
    }

    /// Characters to show at the current position.
    ///
    /// Smooth mode carries one extra character for the partially visible
    /// cell on the right edge. Past the end, a looping marquee continues
    /// with one blank and then the head; the blank takes one of the slots.
    pub fn window(&self) -> String<N> {
        if !self.needs_scrolling {
            return self.text.clone();
        }

        let span = self.span();
        let mut out: String<N> = String::new();
        for c in self.text.chars().skip(self.position).take(span) {
            if out.push(c).is_err() {
                return out;
            }
        }

        let shown = self.len_chars.saturating_sub(self.position).min(span);
        if self.config.looping && shown < span {
            if out.push(' ').is_err() {
                return out;
            }
            for c in self.text.chars().take(span - shown - 1) {
                if out.push(c).is_err() {
                    break;
                }
            }
        }
        out
    }

    fn span(&self) -> usize {
        if self.config.smooth {
            self.config.width_chars + 1
        } else {
            self.config.width_chars
        }
    }

    /// Paint the window at `origin` (top-left), clipped to the field.
    pub fn draw<D>(&self, target: &mut D, origin: Point, style: MonoTextStyle<'_, BinaryColor>)
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let field = self.field(origin, style);
        let window = self.window();
        let start = origin - Point::new(self.pixel_offset as i32, 0);
        let mut clipped = target.clipped(&field);
        let _ = Text::with_baseline(window.as_str(), start, style, Baseline::Top).draw(&mut clipped);
    }

    /// Clear the field to `background`, then paint the window on top.
    pub fn draw_with_background<D>(
        &self,
        target: &mut D,
        origin: Point,
        style: MonoTextStyle<'_, BinaryColor>,
        background: BinaryColor,
    ) where
        D: DrawTarget<Color = BinaryColor>,
    {
        let field = self.field(origin, style);
        let _ = field
            .into_styled(PrimitiveStyle::with_fill(background))
            .draw(target);
        self.draw(target, origin, style);
    }

    fn field(&self, origin: Point, style: MonoTextStyle<'_, BinaryColor>) -> Rectangle {
        let height = style.font.character_size.height;
        Rectangle::new(origin, Size::new(self.config.width_px, height))
    }

    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    pub fn is_scrolling(&self) -> bool {
        self.needs_scrolling && !self.paused
    }

    pub fn needs_scrolling(&self) -> bool {
        self.needs_scrolling
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn pixel_offset(&self) -> u32 {
        self.pixel_offset
    }

    pub fn config(&self) -> &MarqueeConfig {
        &self.config
    }
}
