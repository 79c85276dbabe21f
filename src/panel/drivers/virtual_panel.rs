/*
 *  panel/drivers/virtual_panel.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
 *
 *  Software panel: every full refresh lands on disk as a PNG
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

use std::fs;
use std::path::PathBuf;

use image::GrayImage;
use log::{debug, info};

use crate::panel::error::PanelError;
use crate::panel::traits::{Panel, PanelCapabilities};

pub const LATEST_FRAME: &str = "latest.png";

/// Stand-in for the e-paper panel when no hardware is attached
///
/// `write_frame` only buffers; `refresh_full` is what "shows" the frame,
/// writing `frame-NNNN.png` and overwriting `latest.png`.
pub struct VirtualPanel {
    capabilities: PanelCapabilities,
    output_dir: PathBuf,
    pending: Option<GrayImage>,
    refreshes: u32,
    initialized: bool,
}

impl VirtualPanel {
    pub fn new(
        width: u32,
        height: u32,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, PanelError> {
        if width == 0 || height == 0 {
            return Err(PanelError::InvalidConfiguration(format!(
                "virtual panel needs non-zero dimensions, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            capabilities: PanelCapabilities {
                width,
                height,
                vcom: None,
                name: "virtual".to_string(),
            },
            output_dir: output_dir.into(),
            pending: None,
            refreshes: 0,
            initialized: false,
        })
    }

    pub fn frame_path(&self, index: u32) -> PathBuf {
        self.output_dir.join(format!("frame-{:04}.png", index))
    }
}

impl Panel for VirtualPanel {
    fn capabilities(&self) -> &PanelCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), PanelError> {
        fs::create_dir_all(&self.output_dir)?;
        self.initialized = true;
        info!(
            "Virtual panel {}x{} writing frames to {}",
            self.capabilities.width,
            self.capabilities.height,
            self.output_dir.display()
        );
        Ok(())
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<(), PanelError> {
        if !self.initialized {
            return Err(PanelError::NotInitialized);
        }
        let expected = (self.capabilities.width * self.capabilities.height) as usize;
        if frame.len() != expected {
            return Err(PanelError::BufferSizeMismatch { expected, actual: frame.len() });
        }
        let (width, height) = (self.capabilities.width, self.capabilities.height);
        let image = GrayImage::from_raw(width, height, frame.to_vec())
            .ok_or(PanelError::BufferSizeMismatch { expected, actual: frame.len() })?;
        self.pending = Some(image);
        Ok(())
    }

    fn refresh_full(&mut self) -> Result<(), PanelError> {
        let Some(image) = self.pending.as_ref() else {
            debug!("Refresh with no frame loaded, nothing to show");
            return Ok(());
        };
        self.refreshes += 1;
        let path = self.frame_path(self.refreshes);
        image.save(&path)?;
        image.save(self.output_dir.join(LATEST_FRAME))?;
        debug!("Virtual refresh #{} -> {}", self.refreshes, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("lnpos-vpanel-{}-{}", tag, std::process::id()))
    }

    #[test]
    fn test_rejects_zero_size() {
        assert!(matches!(
            VirtualPanel::new(0, 600, scratch_dir("zero")),
            Err(PanelError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_refresh_writes_numbered_and_latest_frames() {
        let dir = scratch_dir("frames");
        let mut panel = VirtualPanel::new(4, 2, &dir).unwrap();
        panel.init().unwrap();

        panel.write_frame(&[0, 255, 0, 255, 255, 0, 255, 0]).unwrap();
        panel.refresh_full().unwrap();
        panel.write_frame(&[255; 8]).unwrap();
        panel.refresh_full().unwrap();

        assert!(dir.join("frame-0001.png").exists());
        assert!(dir.join("frame-0002.png").exists());

        let first = image::open(dir.join("frame-0001.png")).unwrap().to_luma8();
        assert_eq!(first.as_raw(), &vec![0, 255, 0, 255, 255, 0, 255, 0]);
        let latest = image::open(dir.join(LATEST_FRAME)).unwrap().to_luma8();
        assert_eq!(latest.as_raw(), &vec![255; 8]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_size_mismatch() {
        let dir = scratch_dir("mismatch");
        let mut panel = VirtualPanel::new(4, 2, &dir).unwrap();
        panel.init().unwrap();
        assert!(matches!(
            panel.write_frame(&[0; 7]),
            Err(PanelError::BufferSizeMismatch { expected: 8, actual: 7 })
        ));
        // oversized frames are refused too, and nothing is left pending
        assert!(matches!(
            panel.write_frame(&[0; 9]),
            Err(PanelError::BufferSizeMismatch { expected: 8, actual: 9 })
        ));
        panel.refresh_full().unwrap();
        assert!(!dir.join("frame-0001.png").exists());
        fs::remove_dir_all(&dir).ok();
    }
}
