/*
 *  bitmap.rs
 *
 *  lnpos - sats on the glass
 *	(c) 2026 lnpos contributors
 *
 *	Full colour raster shared by the composer and the panel driver
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use image::{imageops, GrayImage, Rgb, RgbImage};

/// A runtime-sized RGB raster that embedded-graphics can draw on.
///
/// Pixel storage is an `image::RgbImage` so the whole-frame operations
/// (paste, thumbnail, flips, inversion) come from `image::imageops`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    img: RgbImage,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, fill: Rgb888) -> Self {
        Self {
            img: RgbImage::from_pixel(width, height, to_rgb(fill)),
        }
    }

    pub fn from_image(img: RgbImage) -> Self {
        Self { img }
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    /// Colour at (x,y); None if out of bounds
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        self.img.get_pixel_checked(x, y).map(|p| from_rgb(*p))
    }

    /// Copy `top` into this bitmap with its top-left corner at `at`.
    /// Anything falling outside is clipped.
    pub fn paste(&mut self, top: &Bitmap, at: Point) {
        imageops::replace(&mut self.img, &top.img, at.x as i64, at.y as i64);
    }

    /// Left-right mirror, in place
    pub fn mirror(&mut self) {
        imageops::flip_horizontal_in_place(&mut self.img);
    }

    /// Tonal inversion of every channel, in place
    pub fn invert(&mut self) {
        imageops::invert(&mut self.img);
    }

    /// Shrink to fit inside `max`, keeping aspect ratio. Never enlarges.
    pub fn thumbnail(&self, max: Size) -> Bitmap {
        let fitted = fit_within(self.size(), max);
        if fitted == self.size() {
            return self.clone();
        }
        Self {
            img: imageops::thumbnail(&self.img, fitted.width, fitted.height),
        }
    }

    pub fn rotate180(&self) -> Bitmap {
        Self { img: imageops::rotate180(&self.img) }
    }

    /// Quarter turn clockwise
    pub fn rotate90(&self) -> Bitmap {
        Self { img: imageops::rotate90(&self.img) }
    }

    /// Quarter turn counter-clockwise
    pub fn rotate270(&self) -> Bitmap {
        Self { img: imageops::rotate270(&self.img) }
    }

    /// 8-bit luminance copy, the format e-paper frame buffers take
    pub fn to_gray(&self) -> GrayImage {
        imageops::grayscale(&self.img)
    }

    #[inline]
    fn contains(&self, p: Point) -> bool {
        p.x >= 0
            && p.y >= 0
            && (p.x as u32) < self.img.width()
            && (p.y as u32) < self.img.height()
    }
}

/// Largest size with the aspect ratio of `size` that fits inside `max`.
/// Sizes already inside `max` come back unchanged.
pub fn fit_within(size: Size, max: Size) -> Size {
    if size.width <= max.width && size.height <= max.height {
        return size;
    }
    if size.width == 0 || size.height == 0 {
        return Size::zero();
    }
    let (w, h) = (size.width as u64, size.height as u64);
    let (mw, mh) = (max.width as u64, max.height as u64);
    if w * mh >= h * mw {
        let fitted_h = (h * mw + w / 2) / w;
        Size::new(max.width, fitted_h.max(1) as u32)
    } else {
        let fitted_w = (w * mh + h / 2) / h;
        Size::new(fitted_w.max(1) as u32, max.height)
    }
}

#[inline]
fn to_rgb(c: Rgb888) -> Rgb<u8> {
    Rgb([c.r(), c.g(), c.b()])
}

#[inline]
fn from_rgb(p: Rgb<u8>) -> Rgb888 {
    Rgb888::new(p.0[0], p.0[1], p.0[2])
}

impl OriginDimensions for Bitmap {
    fn size(&self) -> Size {
        Size::new(self.img.width(), self.img.height())
    }
}

impl DrawTarget for Bitmap {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if self.contains(p) {
                self.img.put_pixel(p.x as u32, p.y as u32, to_rgb(c));
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        // scaled text and QR modules land here, keep it a tight loop
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else { return Ok(()) };
        let rgb = to_rgb(color);
        for y in area.top_left.y..=bottom_right.y {
            for x in area.top_left.x..=bottom_right.x {
                self.img.put_pixel(x as u32, y as u32, rgb);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let rgb = to_rgb(color);
        self.img.pixels_mut().for_each(|p| *p = rgb);
        Ok(())
    }
}
