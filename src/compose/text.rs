/*
 *  compose/text.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
 *
 *  Large-print text overlays built from the embedded-graphics mono fonts
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use embedded_graphics::mono_font::{iso_8859_1::FONT_10X20, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};

/// Suffix shown after the amount
pub const CURRENCY_UNIT: &str = "Sats";

/// Draw target adapter that blows every pixel up into a `factor` x `factor`
/// block, offset by `origin` on the wrapped target.
///
/// The mono fonts top out at 10x20, far too small for a 1448 px wide panel
/// read from arm's length, so text is drawn at native size through this.
pub struct Magnified<'a, D> {
    target: &'a mut D,
    origin: Point,
    factor: u32,
}

impl<'a, D: DrawTarget> Magnified<'a, D> {
    pub fn new(target: &'a mut D, origin: Point, factor: u32) -> Self {
        Self { target, origin, factor: factor.max(1) }
    }
}

impl<D: DrawTarget> OriginDimensions for Magnified<'_, D> {
    fn size(&self) -> Size {
        let Size { width, height } = self.target.bounding_box().size;
        Size::new(width / self.factor, height / self.factor)
    }
}

impl<D: DrawTarget> DrawTarget for Magnified<'_, D> {
    type Color = D::Color;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let f = self.factor as i32;
        let block = Size::new_equal(self.factor);
        for Pixel(p, color) in pixels {
            let top_left = self.origin + Point::new(p.x * f, p.y * f);
            self.target.fill_solid(&Rectangle::new(top_left, block), color)?;
        }
        Ok(())
    }
}

/// Draw one line of text with its top-left corner at `at`.
pub fn draw_text<D>(
    target: &mut D,
    text: &str,
    at: Point,
    scale: u32,
    color: Rgb888,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let style = MonoTextStyle::new(&FONT_10X20, color);
    let mut big = Magnified::new(target, at, scale);
    Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut big)?;
    Ok(())
}

/// Pixel box a line of `text` occupies at `scale`
pub fn text_size(text: &str, scale: u32) -> Size {
    let glyph = FONT_10X20.character_size;
    let spacing = FONT_10X20.character_spacing;
    let chars = text.chars().count() as u32;
    let width = if chars == 0 { 0 } else { chars * glyph.width + (chars - 1) * spacing };
    Size::new(width * scale, glyph.height * scale)
}

/// 5000 -> "5,000"
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// "5,000 Sats"
pub fn amount_label(sats: u64) -> String {
    format!("{} {}", group_thousands(sats), CURRENCY_UNIT)
}
