//! Label overlay drawn onto sampled frames.

use crate::classify::Classification;
use crate::frame::Frame;

/// Background block, as (x0, y0, x1, y1) with exclusive far edges.
pub const LABEL_BOX: (u32, u32, u32, u32) = (30, 30, 330, 80);
/// Top-left corner of the first glyph.
pub const TEXT_ORIGIN: (u32, u32) = (40, 48);
pub const TEXT_SCALE: u32 = 2;

const BACKGROUND: [u8; 3] = [0, 0, 0];
const FOREGROUND: [u8; 3] = [255, 255, 255];

const GLYPH_WIDTH: u32 = 3;
const GLYPH_HEIGHT: u32 = 5;
const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

/// Text drawn for a sample, e.g. `Day (Brightness: 142.37)`.
pub fn label_text(label: Classification, brightness: f64) -> String {
    format!("{label} (Brightness: {brightness:.2})")
}

/// Draw the background block and label text in place.
///
/// Must run after brightness has been measured; the overlay changes the
/// pixels it covers.
pub fn annotate(frame: &mut Frame, label: Classification, brightness: f64) {
    let (x0, y0, x1, y1) = LABEL_BOX;
    fill_rect(frame, x0, y0, x1, y1, BACKGROUND);
    draw_text(
        frame,
        TEXT_ORIGIN.0,
        TEXT_ORIGIN.1,
        &label_text(label, brightness),
        FOREGROUND,
    );
}

fn fill_rect(frame: &mut Frame, x0: u32, y0: u32, x1: u32, y1: u32, color: [u8; 3]) {
    let x1 = x1.min(frame.width());
    let y1 = y1.min(frame.height());
    for y in y0..y1 {
        for x in x0..x1 {
            frame.put_rgb(x, y, color);
        }
    }
}

fn draw_text(frame: &mut Frame, x: u32, y: u32, text: &str, color: [u8; 3]) {
    let mut cursor = x;
    for ch in text.chars() {
        if cursor >= frame.width() {
            break;
        }
        draw_char(frame, cursor, y, ch, color);
        cursor += GLYPH_ADVANCE * TEXT_SCALE;
    }
}

fn draw_char(frame: &mut Frame, x: u32, y: u32, ch: char, color: [u8; 3]) {
    let glyph = glyph_bits(ch.to_ascii_uppercase());
    for (row, pattern) in glyph.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if (pattern >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                continue;
            }
            let px = x + col * TEXT_SCALE;
            let py = y + row as u32 * TEXT_SCALE;
            for dy in 0..TEXT_SCALE {
                for dx in 0..TEXT_SCALE {
                    frame.put_rgb(px + dx, py + dy, color);
                }
            }
        }
    }
}

/// 3x5 bitmap glyphs, one row per byte, low three bits used.
const fn glyph_bits(ch: char) -> [u8; GLYPH_HEIGHT as usize] {
    match ch {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b111, 0b001, 0b001, 0b101, 0b111],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _ => [0b111, 0b101, 0b010, 0b000, 0b010],
    }
}
