/*
 *  state.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
 *
 *  What the panel is believed to show, and when that has to change
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

use chrono::{DateTime, Local, TimeDelta};

use crate::bitmap::Bitmap;

/// Render when openness flips, and always on the first cycle
#[inline]
pub fn should_render(had_open_invoice: bool, is_open_now: bool, first_cycle: bool) -> bool {
    first_cycle || had_open_invoice != is_open_now
}

/// Loop-owned memory of the last frame pushed to the panel
#[derive(Debug, Default)]
pub struct DisplayState {
    has_open_invoice: bool,
    last_rendered: Option<Bitmap>,
    rendered_at: Option<DateTime<Local>>,
    renders: u64,
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_open_invoice(&self) -> bool {
        self.has_open_invoice
    }

    /// Exactly the frame last handed to the panel
    pub fn last_rendered(&self) -> Option<&Bitmap> {
        self.last_rendered.as_ref()
    }

    pub fn rendered_at(&self) -> Option<DateTime<Local>> {
        self.rendered_at
    }

    /// How long the current frame has been up at `now`
    pub fn shown_for(&self, now: DateTime<Local>) -> Option<TimeDelta> {
        self.rendered_at.map(|at| now - at)
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }

    pub fn is_first_cycle(&self) -> bool {
        self.last_rendered.is_none()
    }

    pub fn should_render(&self, is_open_now: bool) -> bool {
        should_render(self.has_open_invoice, is_open_now, self.is_first_cycle())
    }

    /// Call only after the panel accepted `frame`
    pub fn record(&mut self, is_open_now: bool, frame: Bitmap) {
        self.has_open_invoice = is_open_now;
        self.last_rendered = Some(frame);
        self.rendered_at = Some(Local::now());
        self.renders += 1;
    }
}
