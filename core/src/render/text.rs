//! 3×5 点阵字体

use crate::render::surface::{Rgba, Surface};

/// 字形宽度（点）
const GLYPH_W: u32 = 3;
/// 字形高度（点）
const GLYPH_H: u32 = 5;
/// 字间距（点）
const SPACING: u32 = 1;

/// 每行 3 位，高位在左
type Glyph = [u8; 5];

/// 无法显示的字符
const UNKNOWN: Glyph = [0b111, 0b001, 0b010, 0b000, 0b010];

#[rustfmt::skip]
fn glyph(c: char) -> Glyph {
    match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        ' ' => [0; 5],
        _ => UNKNOWN,
    }
}

/// 文本在给定点大小下的像素宽度
#[must_use]
pub fn text_width(text: &str, px: u32) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0;
    }
    (n * (GLYPH_W + SPACING) - SPACING) * px
}

/// 文本像素高度
#[must_use]
pub const fn text_height(px: u32) -> u32 {
    GLYPH_H * px
}

/// 以左上角为基准绘制文本
pub fn draw_text(surface: &mut dyn Surface, text: &str, origin: (i32, i32), px: u32, color: Rgba) {
    let px = px.max(1);
    let step = ((GLYPH_W + SPACING) * px) as i32;
    for (i, c) in text.chars().enumerate() {
        let gx = origin.0 + i as i32 * step;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits & (1 << (GLYPH_W - 1 - col)) != 0 {
                    surface.fill_rect(
                        gx + (col * px) as i32,
                        origin.1 + (row as u32 * px) as i32,
                        px,
                        px,
                        color,
                    );
                }
            }
        }
    }
}

/// 以中心坐标绘制文本
pub fn draw_text_centered(
    surface: &mut dyn Surface,
    text: &str,
    center: (f32, f32),
    px: u32,
    color: Rgba,
) {
    let px = px.max(1);
    let x = center.0 as i32 - (text_width(text, px) / 2) as i32;
    let y = center.1 as i32 - (text_height(px) / 2) as i32;
    draw_text(surface, text, (x, y), px, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::surface::{DrawCall, RecordingSurface};

    #[test]
    fn test_text_metrics() {
        assert_eq!(text_width("", 2), 0);
        assert_eq!(text_width("1", 2), 6);
        assert_eq!(text_width("12", 2), 14);
        assert_eq!(text_height(3), 15);
    }

    #[test]
    fn test_digit_one_pixel_count() {
        let mut surface = RecordingSurface::new(10, 10);
        draw_text(&mut surface, "1", (0, 0), 1, [255; 4]);
        assert_eq!(surface.calls.len(), 8);
        assert_eq!(
            surface.calls[0],
            DrawCall::FillRect {
                x: 1,
                y: 0,
                color: [255; 4]
            }
        );
    }

    #[test]
    fn test_space_draws_nothing() {
        let mut surface = RecordingSurface::new(10, 10);
        draw_text(&mut surface, "  ", (0, 0), 2, [255; 4]);
        assert!(surface.calls.is_empty());
    }
}
