/*
 *  panel/traits.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
 *
 *  Panel and frame sink abstractions
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

use crate::bitmap::Bitmap;
use crate::panel::error::PanelError;

/// Panel geometry and electrical metadata
#[derive(Debug, Clone, PartialEq)]
pub struct PanelCapabilities {
    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,

    /// VCOM the controller reports, in volts (None for software panels)
    pub vcom: Option<f32>,

    /// Short human readable name for logs
    pub name: String,
}

/// Minimal hardware abstraction for an 8-bit greyscale e-paper panel
///
/// Frames are row-major, one byte per pixel, `width * height` bytes.
/// A frame only becomes visible after `refresh_full`.
pub trait Panel: Send {
    /// Returns the capabilities of this panel
    fn capabilities(&self) -> &PanelCapabilities;

    /// Returns the panel dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Bring the controller up; called once before the first frame
    fn init(&mut self) -> Result<(), PanelError>;

    /// Load a full greyscale frame into the controller's buffer
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), PanelError>;

    /// Full-panel, ghost-free (GC16) refresh of the loaded frame
    fn refresh_full(&mut self) -> Result<(), PanelError>;
}

pub type BoxedPanel = Box<dyn Panel>;

/// The one capability the render loop needs: put this frame on the glass.
pub trait FrameSink {
    fn render(&mut self, frame: &Bitmap) -> Result<(), PanelError>;
}
