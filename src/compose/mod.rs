/*
 *  compose/mod.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
 *
 *  Frame composer: badge, payment QR and the three text lines
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

pub mod badge;
pub mod qr;
pub mod text;

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::*;
use log::debug;
use thiserror::Error;

use crate::bitmap::Bitmap;
use crate::invoice::InvoiceSnapshot;

pub use badge::AssetError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComposeError {
    #[error("invoice data integrity: {0}")]
    DataIntegrity(String),
}

/// Fixed placement of everything on the canvas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Canvas size, the IT8951 6" frame
    pub canvas: Size,

    pub badge_at: Point,

    pub qr_at: Point,
    /// QR raster is shrunk to fit this box, never enlarged
    pub qr_box: Size,
    pub qr_module_px: u32,
    /// Quiet zone, in modules
    pub qr_border: u32,

    /// Font magnification, 10x20 cells become 40x80
    pub text_scale: u32,
    pub memo_at: Point,
    pub prompt_at: Point,
    pub amount_at: Point,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            canvas: Size::new(1448, 1072),
            badge_at: Point::new(100, 100),
            qr_at: Point::new(130, 700),
            qr_box: Size::new(300, 300),
            qr_module_px: 8,
            qr_border: 1,
            text_scale: 4,
            memo_at: Point::new(550, 700),
            prompt_at: Point::new(550, 840),
            amount_at: Point::new(550, 920),
        }
    }
}

/// Turns an invoice snapshot into a panel-ready frame.
///
/// Composition is a pure function of the snapshot: the badge is loaded
/// once up front and nothing else is read while composing.
#[derive(Debug, Clone)]
pub struct Composer {
    badge: Bitmap,
    layout: Layout,
}

impl Composer {
    pub fn new(badge: Bitmap) -> Self {
        Self { badge, layout: Layout::default() }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Full frame: `render` followed by `finish`
    pub fn compose(&self, snapshot: &InvoiceSnapshot) -> Result<Bitmap, ComposeError> {
        let mut frame = self.render(snapshot)?;
        Self::finish(&mut frame);
        Ok(frame)
    }

    /// Frame as it reads on paper, before the optical-path transforms.
    /// Fails rather than drawing an OPEN invoice without its QR.
    pub fn render(&self, snapshot: &InvoiceSnapshot) -> Result<Bitmap, ComposeError> {
        let layout = &self.layout;
        let mut canvas = Bitmap::new(layout.canvas.width, layout.canvas.height, Rgb888::WHITE);
        canvas.paste(&self.badge, layout.badge_at);

        if !snapshot.is_open() {
            debug!("Composed badge-only frame for {} invoice", snapshot.state);
            return Ok(canvas);
        }

        let descriptor = snapshot
            .payment_descriptor
            .as_deref()
            .filter(|d| !d.is_empty())
            .ok_or_else(|| {
                ComposeError::DataIntegrity("OPEN invoice has no payment_request".into())
            })?;

        let code = qr::encode(descriptor)?;
        let symbol =
            qr::rasterize(&code, layout.qr_module_px, layout.qr_border).thumbnail(layout.qr_box);
        canvas.paste(&symbol, layout.qr_at);

        let [memo, prompt, amount] = self.overlay_lines(snapshot);
        // drawing on a Bitmap is Infallible
        let placed = [
            (memo, layout.memo_at),
            (prompt, layout.prompt_at),
            (amount, layout.amount_at),
        ];
        for (line, at) in &placed {
            text::draw_text(&mut canvas, line, *at, layout.text_scale, Rgb888::BLACK).ok();
        }

        debug!(
            "Composed QR frame: {} module symbol at {}px, {} sats",
            code.size(),
            symbol.width(),
            snapshot.amount
        );
        Ok(canvas)
    }

    /// Mirror then invert. The panel is read through a reflective,
    /// inverted optical path; every frame gets both exactly once.
    pub fn finish(frame: &mut Bitmap) {
        frame.mirror();
        frame.invert();
    }

    /// Memo, prompt and amount lines for an OPEN invoice
    pub fn overlay_lines(&self, snapshot: &InvoiceSnapshot) -> [String; 3] {
        [
            format!("Item: {}", snapshot.memo),
            "Scan to pay:".to_string(),
            text::amount_label(snapshot.amount),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::InvoiceState;
    use embedded_graphics::primitives::Rectangle;

    const REQUEST: &str = "lnbc50u1pjq8fhzqq9yq2rp5dkxyz0ssesvmp3qn0tjw4v";

    fn open_snapshot() -> InvoiceSnapshot {
        InvoiceSnapshot {
            state: InvoiceState::Open,
            amount: 5000,
            memo: "coffee".into(),
            payment_descriptor: Some(REQUEST.into()),
        }
    }

    fn closed_snapshot(state: InvoiceState) -> InvoiceSnapshot {
        InvoiceSnapshot { state, amount: 5000, memo: "coffee".into(), payment_descriptor: None }
    }

    fn composer() -> Composer {
        Composer::new(badge::builtin())
    }

    /// Undo mirror+invert (both are involutions and commute)
    fn unfinish(frame: &Bitmap) -> Bitmap {
        let mut f = frame.clone();
        f.invert();
        f.mirror();
        f
    }

    fn region_matches(a: &Bitmap, b: &Bitmap, area: Rectangle) -> bool {
        area.points().all(|p| a.pixel(p.x as u32, p.y as u32) == b.pixel(p.x as u32, p.y as u32))
    }

    #[test]
    fn test_compose_is_idempotent() {
        let c = composer();
        assert_eq!(c.compose(&open_snapshot()).unwrap(), c.compose(&open_snapshot()).unwrap());
        let settled = closed_snapshot(InvoiceState::Settled);
        assert_eq!(c.compose(&settled).unwrap(), c.compose(&settled).unwrap());
    }

    #[test]
    fn test_closed_states_show_badge_only() {
        let c = composer();
        let layout = Layout::default();
        let mut expected = Bitmap::new(layout.canvas.width, layout.canvas.height, Rgb888::WHITE);
        expected.paste(&badge::builtin(), layout.badge_at);
        Composer::finish(&mut expected);

        for state in [InvoiceState::Settled, InvoiceState::Canceled, InvoiceState::Other] {
            assert_eq!(c.compose(&closed_snapshot(state)).unwrap(), expected, "{state}");
        }
    }

    #[test]
    fn test_closed_state_ignores_stray_descriptor() {
        let c = composer();
        let mut snap = closed_snapshot(InvoiceState::Settled);
        snap.payment_descriptor = Some(REQUEST.into());
        assert_eq!(
            c.compose(&snap).unwrap(),
            c.compose(&closed_snapshot(InvoiceState::Settled)).unwrap()
        );
    }

    #[test]
    fn test_open_frame_carries_the_qr_symbol() {
        let c = composer();
        let layout = c.layout().clone();
        let frame = unfinish(&c.compose(&open_snapshot()).unwrap());

        let code = qr::encode(REQUEST).unwrap();
        let symbol = qr::rasterize(&code, layout.qr_module_px, layout.qr_border);
        assert!(symbol.width() <= layout.qr_box.width, "test request should not need shrinking");

        // every module, sampled at its centre, reads back as encoded
        let step = layout.qr_module_px;
        for y in 0..code.size() {
            for x in 0..code.size() {
                let px = layout.qr_at.x as u32 + (x as u32 + layout.qr_border) * step + step / 2;
                let py = layout.qr_at.y as u32 + (y as u32 + layout.qr_border) * step + step / 2;
                let dark = frame.pixel(px, py) == Some(Rgb888::BLACK);
                assert_eq!(dark, code.get_module(x, y), "module ({x},{y})");
            }
        }

        // badge is still there
        let badge = badge::builtin();
        let area = Rectangle::new(layout.badge_at, badge.size());
        let mut expected = Bitmap::new(layout.canvas.width, layout.canvas.height, Rgb888::WHITE);
        expected.paste(&badge, layout.badge_at);
        assert!(region_matches(&frame, &expected, area));
    }

    #[test]
    fn test_open_frame_text_lines() {
        let c = composer();
        let layout = c.layout().clone();
        let frame = c.render(&open_snapshot()).unwrap();

        let lines = c.overlay_lines(&open_snapshot());
        assert_eq!(lines, ["Item: coffee".to_string(), "Scan to pay:".into(), "5,000 Sats".into()]);

        let mut expected = Bitmap::new(layout.canvas.width, layout.canvas.height, Rgb888::WHITE);
        for (line, at) in lines.iter().zip([layout.memo_at, layout.prompt_at, layout.amount_at]) {
            text::draw_text(&mut expected, line, at, layout.text_scale, Rgb888::BLACK).unwrap();
            let area = Rectangle::new(at, text::text_size(line, layout.text_scale));
            assert!(region_matches(&frame, &expected, area), "line {line:?}");
        }
    }

    #[test]
    fn test_mirror_and_invert_applied_once() {
        let c = composer();
        let layout = c.layout().clone();
        let w = layout.canvas.width;

        for snap in [open_snapshot(), closed_snapshot(InvoiceState::Canceled)] {
            let mut expected = c.render(&snap).unwrap();
            expected.mirror();
            expected.invert();
            let frame = c.compose(&snap).unwrap();
            assert_eq!(frame, expected);

            // white paper corner comes out black
            assert_eq!(frame.pixel(0, 0), Some(Rgb888::BLACK));
            // left stroke of the badge frame lands on the right, as white
            let x = layout.badge_at.x as u32 + 2;
            let y = layout.badge_at.y as u32 + 150;
            assert_eq!(frame.pixel(w - 1 - x, y), Some(Rgb888::WHITE));
            assert_eq!(frame.pixel(x, y), Some(Rgb888::BLACK));
        }
    }

    #[test]
    fn test_open_without_descriptor_is_an_integrity_error() {
        let c = composer();
        let mut snap = open_snapshot();
        snap.payment_descriptor = None;
        assert!(matches!(c.compose(&snap), Err(ComposeError::DataIntegrity(_))));

        snap.payment_descriptor = Some(String::new());
        assert!(matches!(c.compose(&snap), Err(ComposeError::DataIntegrity(_))));
    }

    #[test]
    fn test_large_symbol_is_shrunk_into_box() {
        let c = composer();
        let layout = c.layout().clone();
        let mut snap = open_snapshot();
        snap.payment_descriptor = Some(format!("lnbc{}", "q".repeat(300)));
        let frame = unfinish(&c.compose(&snap).unwrap());

        // nothing from the symbol spills below or right of the box
        let below = Rectangle::new(
            Point::new(layout.qr_at.x, layout.qr_at.y + layout.qr_box.height as i32),
            Size::new(layout.qr_box.width, 20),
        );
        assert!(below.points().all(|p| frame.pixel(p.x as u32, p.y as u32) == Some(Rgb888::WHITE)));
        let right = Rectangle::new(
            Point::new(layout.qr_at.x + layout.qr_box.width as i32, layout.qr_at.y),
            Size::new(20, layout.qr_box.height),
        );
        assert!(right.points().all(|p| frame.pixel(p.x as u32, p.y as u32) == Some(Rgb888::WHITE)));
    }
}
