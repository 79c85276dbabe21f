/*
 *  compose/badge.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
 *
 *  "Lightning accepted" badge: loaded from disk or drawn in-house
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

use std::path::{Path, PathBuf};

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    PrimitiveStyle, PrimitiveStyleBuilder, Rectangle, RoundedRectangle, StrokeAlignment, Triangle,
};
use image::{Rgb, RgbImage};
use log::{debug, info};
use thiserror::Error;

use super::text::draw_text;
use crate::bitmap::Bitmap;

/// Size of the built-in badge
pub const BUILTIN_SIZE: Size = Size::new(640, 300);

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("cannot load badge {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Load a badge image (PNG/JPEG/BMP). Transparent areas are flattened
/// over white so they match the canvas.
pub fn load(path: &Path) -> Result<Bitmap, AssetError> {
    let rgba = image::open(path)
        .map_err(|source| AssetError::Image { path: path.to_path_buf(), source })?
        .to_rgba8();

    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, px) in rgba.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        rgb.put_pixel(x, y, Rgb([over_white(r, a), over_white(g, a), over_white(b, a)]));
    }
    info!("Loaded badge {} ({}x{})", path.display(), rgb.width(), rgb.height());
    Ok(Bitmap::from_image(rgb))
}

#[inline]
fn over_white(channel: u8, alpha: u8) -> u8 {
    let (c, a) = (channel as u16, alpha as u16);
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

/// Badge drawn with primitives for installs without an asset directory:
/// a bolt and "LIGHTNING / ACCEPTED" inside a rounded frame.
pub fn builtin() -> Bitmap {
    let mut bmp = Bitmap::new(BUILTIN_SIZE.width, BUILTIN_SIZE.height, Rgb888::WHITE);

    let frame = PrimitiveStyleBuilder::new()
        .stroke_color(Rgb888::BLACK)
        .stroke_width(8)
        .stroke_alignment(StrokeAlignment::Inside)
        .build();
    let fill = PrimitiveStyle::with_fill(Rgb888::BLACK);

    // every draw below targets an in-memory bitmap, Infallible
    RoundedRectangle::with_equal_corners(
        Rectangle::new(Point::zero(), BUILTIN_SIZE),
        Size::new(32, 32),
    )
    .into_styled(frame)
    .draw(&mut bmp)
    .ok();

    // bolt, two overlapping wedges
    Triangle::new(Point::new(130, 30), Point::new(50, 170), Point::new(120, 170))
        .into_styled(fill)
        .draw(&mut bmp)
        .ok();
    Triangle::new(Point::new(90, 130), Point::new(160, 130), Point::new(70, 270))
        .into_styled(fill)
        .draw(&mut bmp)
        .ok();

    draw_text(&mut bmp, "LIGHTNING", Point::new(200, 60), 4, Rgb888::BLACK).ok();
    draw_text(&mut bmp, "ACCEPTED", Point::new(200, 160), 4, Rgb888::BLACK).ok();

    debug!("Drew built-in badge {}x{}", bmp.width(), bmp.height());
    bmp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_over_white() {
        assert_eq!(over_white(0, 255), 0);
        assert_eq!(over_white(0, 0), 255);
        assert_eq!(over_white(200, 0), 255);
        assert_eq!(over_white(0, 128), 127);
    }

    #[test]
    fn test_builtin_badge_has_ink() {
        let badge = builtin();
        assert_eq!((badge.width(), badge.height()), (640, 300));
        // frame stroke and bolt
        assert_eq!(badge.pixel(2, 150), Some(Rgb888::BLACK));
        assert_eq!(badge.pixel(100, 150), Some(Rgb888::BLACK));
        // inside margin stays paper
        assert_eq!(badge.pixel(20, 20), Some(Rgb888::WHITE));
    }

    #[test]
    fn test_builtin_badge_is_deterministic() {
        assert_eq!(builtin(), builtin());
    }

    #[test]
    fn test_load_flattens_alpha() {
        let path = std::env::temp_dir().join(format!("lnpos-badge-{}.png", std::process::id()));
        let mut rgba = image::RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, image::Rgba([0, 0, 0, 255]));
        rgba.put_pixel(1, 0, image::Rgba([0, 0, 0, 0]));
        rgba.save(&path).unwrap();

        let badge = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(badge.pixel(0, 0), Some(Rgb888::BLACK));
        assert_eq!(badge.pixel(1, 0), Some(Rgb888::WHITE));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/nonexistent/badge.png")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/badge.png"));
    }
}
