/*
 *  compose/qr.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
 *
 *  QR symbol for the payment request
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

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use qrcodegen::{QrCode, QrCodeEcc, QrSegment, Version};

use super::ComposeError;
use crate::bitmap::Bitmap;

/// Encode with medium error correction, smallest version that fits.
/// The level is held at Medium even when a version has spare room.
pub fn encode(payload: &str) -> Result<QrCode, ComposeError> {
    let segments = QrSegment::make_segments(payload);
    QrCode::encode_segments_advanced(
        &segments,
        QrCodeEcc::Medium,
        Version::MIN,
        Version::MAX,
        None,
        false,
    )
    .map_err(|_| {
        ComposeError::DataIntegrity(format!(
            "payment request of {} bytes does not fit a QR symbol",
            payload.len()
        ))
    })
}

/// Black-on-white raster of `qr`, `module_px` pixels per module with a
/// quiet zone of `border` modules on every side.
pub fn rasterize(qr: &QrCode, module_px: u32, border: u32) -> Bitmap {
    let modules = qr.size() as u32 + 2 * border;
    let side = modules * module_px;
    let mut bmp = Bitmap::new(side, side, Rgb888::WHITE);
    let block = Size::new_equal(module_px);

    for y in 0..qr.size() {
        for x in 0..qr.size() {
            if qr.get_module(x, y) {
                let top_left = Point::new(
                    ((x as u32 + border) * module_px) as i32,
                    ((y as u32 + border) * module_px) as i32,
                );
                // Infallible
                bmp.fill_solid(&Rectangle::new(top_left, block), Rgb888::BLACK).ok();
            }
        }
    }
    bmp
}
