/*
 *  panel/epd.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
 *
 *  Fit, rotate and push composed frames to the e-paper panel
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

use clap::ValueEnum;
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::*;
use image::GrayImage;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::bitmap::Bitmap;
use crate::panel::error::PanelError;
use crate::panel::traits::{BoxedPanel, FrameSink};

/// How the panel is mounted relative to the composed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    None,
    /// Quarter turn clockwise
    #[serde(alias = "CW")]
    Cw,
    /// Quarter turn counter-clockwise
    #[serde(alias = "CCW")]
    Ccw,
    /// Half turn
    #[serde(alias = "FLIP")]
    Flip,
}

impl Rotation {
    /// Frame size the host composes into for a `physical` panel
    pub fn logical_size(self, physical: Size) -> Size {
        match self {
            Rotation::Cw | Rotation::Ccw => Size::new(physical.height, physical.width),
            Rotation::None | Rotation::Flip => physical,
        }
    }

    fn apply(self, frame: Bitmap) -> Bitmap {
        match self {
            Rotation::None => frame,
            Rotation::Cw => frame.rotate90(),
            Rotation::Ccw => frame.rotate270(),
            Rotation::Flip => frame.rotate180(),
        }
    }
}

/// Display driver adapter: owns the panel and turns a composed bitmap
/// into the grey frame the controller wants.
pub struct EpdDisplay {
    panel: BoxedPanel,
    rotation: Rotation,
}

impl EpdDisplay {
    /// Initialise `panel` and wrap it
    pub fn new(mut panel: BoxedPanel, rotation: Rotation) -> Result<Self, PanelError> {
        panel.init()?;
        let caps = panel.capabilities();
        info!("Panel {} ready, {}x{}, rotation {:?}", caps.name, caps.width, caps.height, rotation);
        if let Some(vcom) = caps.vcom {
            info!("VCOM set to {:.2}V", vcom);
        }
        Ok(Self { panel, rotation })
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Size of the upright frame before mounting rotation
    pub fn logical_size(&self) -> Size {
        let (w, h) = self.panel.dimensions();
        self.rotation.logical_size(Size::new(w, h))
    }

    /// Fit into the panel, turn it half way round, anchor the result to
    /// the bottom-right corner, then apply the mounting rotation.
    pub fn prepare(&self, frame: &Bitmap) -> GrayImage {
        let logical = self.logical_size();
        let fitted = frame.thumbnail(logical).rotate180();

        let mut canvas = Bitmap::new(logical.width, logical.height, Rgb888::WHITE);
        let offset = Point::new(
            (logical.width - fitted.width()) as i32,
            (logical.height - fitted.height()) as i32,
        );
        canvas.paste(&fitted, offset);
        debug!(
            "Fitted {}x{} frame to {}x{} at {:?}",
            frame.width(),
            frame.height(),
            fitted.width(),
            fitted.height(),
            offset
        );

        self.rotation.apply(canvas).to_gray()
    }
}

impl FrameSink for EpdDisplay {
    fn render(&mut self, frame: &Bitmap) -> Result<(), PanelError> {
        let gray = self.prepare(frame);
        self.panel.write_frame(gray.as_raw())?;
        self.panel.refresh_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::drivers::mock::MockPanel;
    use embedded_graphics::primitives::Rectangle;

    fn display(width: u32, height: u32, rotation: Rotation) -> (EpdDisplay, MockPanel) {
        let panel = MockPanel::new_with_size(width, height);
        let display = EpdDisplay::new(Box::new(panel.clone()), rotation).unwrap();
        (display, panel)
    }

    #[test]
    fn test_new_initialises_panel() {
        let (_, panel) = display(80, 60, Rotation::None);
        assert_eq!(panel.state().lock().unwrap().init_count, 1);
    }

    #[test]
    fn test_init_failure_propagates() {
        let panel = MockPanel::new_with_size(80, 60);
        panel.state().lock().unwrap().simulate_init_failure = true;
        assert!(EpdDisplay::new(Box::new(panel), Rotation::None).is_err());
    }

    #[test]
    fn test_fit_is_bottom_aligned() {
        // 1448x1072 fits 800x600 as 800x592, leaving 8 white rows on top
        let (d, _) = display(800, 600, Rotation::None);
        let frame = Bitmap::new(1448, 1072, Rgb888::BLACK);
        let gray = d.prepare(&frame);
        assert_eq!(gray.dimensions(), (800, 600));
        assert_eq!(gray.get_pixel(400, 7).0[0], 255);
        assert_eq!(gray.get_pixel(400, 8).0[0], 0);
        assert_eq!(gray.get_pixel(799, 599).0[0], 0);
    }

    #[test]
    fn test_frame_is_turned_half_way() {
        let (d, _) = display(100, 100, Rotation::None);
        let mut frame = Bitmap::new(100, 100, Rgb888::WHITE);
        frame.fill_solid(&Rectangle::new(Point::zero(), Size::new(10, 10)), Rgb888::BLACK).unwrap();
        let gray = d.prepare(&frame);
        assert_eq!(gray.get_pixel(95, 95).0[0], 0);
        assert_eq!(gray.get_pixel(5, 5).0[0], 255);
    }

    #[test]
    fn test_quarter_turn_mount() {
        let (d, _) = display(60, 80, Rotation::Cw);
        assert_eq!(d.logical_size(), Size::new(80, 60));
        let gray = d.prepare(&Bitmap::new(80, 60, Rgb888::BLACK));
        assert_eq!(gray.dimensions(), (60, 80));
        assert_eq!(gray.get_pixel(30, 40).0[0], 0);
    }

    #[test]
    fn test_render_writes_and_refreshes() {
        let (mut d, panel) = display(40, 30, Rotation::Flip);
        d.render(&Bitmap::new(40, 30, Rgb888::WHITE)).unwrap();

        let state = panel.state();
        let state = state.lock().unwrap();
        assert_eq!(state.write_count, 1);
        assert_eq!(state.refresh_count, 1);
        assert_eq!(state.last_frame.as_ref().map(|f| f.len()), Some(40 * 30));
    }

    #[test]
    fn test_write_failure_skips_refresh() {
        let (mut d, panel) = display(40, 30, Rotation::None);
        panel.state().lock().unwrap().simulate_write_failure = true;
        assert!(d.render(&Bitmap::new(40, 30, Rgb888::WHITE)).is_err());
        assert_eq!(panel.state().lock().unwrap().refresh_count, 0);
    }
}
