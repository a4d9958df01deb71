//! On-screen keyboard driven by the two potentiometers.
//!
//! The cursor walks a fixed [`KeyMatrix`] with wraparound on both axes and
//! the button activates the focused key. Special cells are tagged
//! [`Key`] variants rather than reserved character codes.

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::iso_8859_1::FONT_5X8;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use heapless::String;

use crate::config::{
    MarqueeConfig, KEY_CELL_HEIGHT, KEY_CELL_WIDTH, KEY_GRID_TOP, PASSWORD_CAPACITY, SCREEN_WIDTH,
};
use crate::ui::input::InputFrame;
use crate::ui::input_logic::wrap_step;
use crate::ui::marquee::Marquee;

/// One cell of the key grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    /// Appends the character.
    Literal(char),
    /// Removes the last character.
    Delete,
    /// Ends the session with the current buffer.
    Confirm,
    /// Appends a space.
    Space,
    /// Unused cell.
    Blank,
}

impl Key {
    /// Single glyph drawn in the grid cell.
    pub fn glyph(self) -> char {
        match self {
            Key::Literal(c) => c,
            Key::Delete => '«',
            Key::Confirm => '»',
            Key::Space => '·',
            Key::Blank => ' ',
        }
    }

    /// Short name shown next to the edit line for special keys.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Key::Delete => Some("DEL"),
            Key::Confirm => Some("OK"),
            Key::Space => Some("SPC"),
            Key::Literal(_) | Key::Blank => None,
        }
    }
}

/// Cursor position inside an `R` × `C` grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor {
    pub col: usize,
    pub row: usize,
}

impl Cursor {
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Move by one cell per non-zero delta, wrapping at every edge.
    pub fn step(self, dx: i8, dy: i8, cols: usize, rows: usize) -> Self {
        Self {
            col: wrap_step(self.col, dx, cols),
            row: wrap_step(self.row, dy, rows),
        }
    }
}

/// Fixed key grid of `R` rows and `C` columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyMatrix<const R: usize, const C: usize> {
    keys: [[Key; C]; R],
}

impl<const R: usize, const C: usize> KeyMatrix<R, C> {
    pub const fn new(keys: [[Key; C]; R]) -> Self {
        Self { keys }
    }

    pub const fn rows(&self) -> usize {
        R
    }

    pub const fn cols(&self) -> usize {
        C
    }

    /// Key under the cursor. Out-of-range cursors read as [`Key::Blank`].
    pub fn key(&self, at: Cursor) -> Key {
        self.keys
            .get(at.row)
            .and_then(|row| row.get(at.col))
            .copied()
            .unwrap_or(Key::Blank)
    }

    /// First cell holding `key`, row-major.
    pub fn find(&self, key: Key) -> Option<Cursor> {
        self.keys.iter().enumerate().find_map(|(row, cells)| {
            cells
                .iter()
                .position(|k| *k == key)
                .map(|col| Cursor::new(col, row))
        })
    }
}

const fn row_of(chars: &[u8; 18]) -> [Key; 18] {
    let mut out = [Key::Blank; 18];
    let mut i = 0;
    while i < 18 {
        if chars[i] != 0 {
            out[i] = Key::Literal(chars[i] as char);
        }
        i += 1;
    }
    out
}

const fn first_row() -> [Key; 18] {
    let mut out = row_of(b"\0\0\0ABCDEFGHIJKLMNO");
    out[0] = Key::Delete;
    out[1] = Key::Confirm;
    out[2] = Key::Space;
    out
}

/// Reference layout: 6 rows × 18 columns.
///
/// ```text
/// « » · A B C D E F G H I J K L M N O
/// P Q R S T U V W X Y Z a b c d e f g
/// h i j k l m n o p q r s t u v w x y
/// z 0 1 2 3 4 5 6 7 8 9 ! ? @ # $ % ^
/// & * ( ) - _ + = | \ : ; " ' < > , .
/// / ~ ` [ ] { }
/// ```
pub const LAYOUT: KeyMatrix<6, 18> = KeyMatrix::new([
    first_row(),
    row_of(b"PQRSTUVWXYZabcdefg"),
    row_of(b"hijklmnopqrstuvwxy"),
    row_of(b"z0123456789!?@#$%^"),
    row_of(b"&*()-_+=|\\:;\"'<>,."),
    row_of(b"/~`[]{}\0\0\0\0\0\0\0\0\0\0\0"),
]);

/// Bounded append / delete-last text buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditBuffer<const N: usize> {
    text: String<N>,
}

impl<const N: usize> EditBuffer<N> {
    pub const fn new() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// Append `c`. Returns `false` (and changes nothing) when full.
    pub fn push(&mut self, c: char) -> bool {
        self.text.push(c).is_ok()
    }

    /// Remove the last character, if any.
    pub fn pop(&mut self) -> Option<char> {
        self.text.pop()
    }

    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.text.len() >= N
    }

    pub fn into_inner(self) -> String<N> {
        self.text
    }
}

/// Result of one keyboard poll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyboardStep {
    Editing,
    Finished(String<PASSWORD_CAPACITY>),
}

/// One password-entry session.
pub struct Keyboard<const R: usize = 6, const C: usize = 18> {
    matrix: &'static KeyMatrix<R, C>,
    cursor: Cursor,
    buffer: EditBuffer<PASSWORD_CAPACITY>,
    line: Marquee<PASSWORD_CAPACITY>,
    dirty: bool,
}

impl Keyboard {
    /// Session over the reference [`LAYOUT`].
    pub fn new(line: MarqueeConfig, now_ms: u64) -> Self {
        Self::with_matrix(&LAYOUT, line, now_ms)
    }
}

impl<const R: usize, const C: usize> Keyboard<R, C> {
    pub fn with_matrix(matrix: &'static KeyMatrix<R, C>, line: MarqueeConfig, now_ms: u64) -> Self {
        let mut line = Marquee::new(line);
        line.set_text("", now_ms);
        Self {
            matrix,
            cursor: Cursor::default(),
            buffer: EditBuffer::new(),
            line,
            dirty: true,
        }
    }

    /// Apply one input frame: movement first, then the button. Also runs
    /// the edit line, so a long password scrolls while the knobs are idle.
    pub fn poll(&mut self, frame: InputFrame, now_ms: u64) -> KeyboardStep {
        if self.line.update(now_ms) {
            self.dirty = true;
        }

        if frame.moved() {
            self.cursor = self.cursor.step(frame.dx.delta(), frame.dy.delta(), C, R);
            self.dirty = true;
        }

        if !frame.pressed {
            return KeyboardStep::Editing;
        }

        let key = self.matrix.key(self.cursor);
        let changed = match key {
            Key::Delete => self.buffer.pop().is_some(),
            Key::Confirm => {
                debug!("keyboard: confirmed {} chars", self.buffer.len());
                let text = core::mem::take(&mut self.buffer).into_inner();
                return KeyboardStep::Finished(text);
            }
            Key::Space => self.buffer.push(' '),
            Key::Literal(c) => self.buffer.push(c),
            Key::Blank => false,
        };

        if changed {
            self.line.set_text(self.buffer.as_str(), now_ms);
            self.dirty = true;
        }
        KeyboardStep::Editing
    }

    /// Paint the edit line, the focused-key label and the grid.
    pub fn render<D>(&mut self, target: &mut D)
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let _ = target.clear(BinaryColor::Off);

        let text = line_style(BinaryColor::On);
        self.line.draw(target, Point::zero(), text);

        let mut glyph = [0u8; 4];
        let focused = self.focused();
        let label = match focused.label() {
            Some(label) => label,
            None => &*focused.glyph().encode_utf8(&mut glyph),
        };
        let right = TextStyleBuilder::new()
            .alignment(Alignment::Right)
            .baseline(Baseline::Top)
            .build();
        let _ = Text::with_text_style(
            label,
            Point::new(SCREEN_WIDTH as i32 - 1, 0),
            text,
            right,
        )
        .draw(target);

        for row in 0..R {
            for col in 0..C {
                let at = Cursor::new(col, row);
                self.draw_cell(target, at, at == self.cursor);
            }
        }

        self.dirty = false;
    }

    fn draw_cell<D>(&self, target: &mut D, at: Cursor, focused: bool)
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let origin = Point::new(
            (at.col as u32 * KEY_CELL_WIDTH) as i32,
            KEY_GRID_TOP + (at.row as u32 * KEY_CELL_HEIGHT) as i32,
        );

        let fg = if focused {
            let _ = Rectangle::new(origin, Size::new(KEY_CELL_WIDTH, KEY_CELL_HEIGHT))
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                .draw(target);
            BinaryColor::Off
        } else {
            BinaryColor::On
        };

        let mut buf = [0u8; 4];
        let glyph = self.matrix.key(at).glyph().encode_utf8(&mut buf);
        let style = MonoTextStyleBuilder::new()
            .font(&FONT_5X8)
            .text_color(fg)
            .build();
        let _ = Text::with_baseline(glyph, origin + Point::new(1, 0), style, Baseline::Top)
            .draw(target);
    }

    pub fn focused(&self) -> Key {
        self.matrix.key(self.cursor)
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn text(&self) -> &str {
        self.buffer.as_str()
    }

    /// Something changed since the last render, the edit line included.
    pub fn needs_redraw(&self) -> bool {
        self.dirty
    }
}

fn line_style(color: BinaryColor) -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(color)
        .build()
}
