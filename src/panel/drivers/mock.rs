/*
 *  panel/drivers/mock.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
 *
 *  Mock panel for tests
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

use std::sync::{Arc, Mutex};

use crate::panel::error::PanelError;
use crate::panel::traits::{Panel, PanelCapabilities};

/// Mock panel driver for testing
///
/// Records every operation in shared state so tests can inspect what the
/// host sent after the panel has been boxed away.
#[derive(Debug, Clone)]
pub struct MockPanel {
    capabilities: PanelCapabilities,
    state: Arc<Mutex<MockPanelState>>,
}

/// Internal state for the mock panel (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockPanelState {
    /// Number of times init() was called
    pub init_count: usize,

    /// Number of full refreshes issued
    pub refresh_count: usize,

    /// Number of frames written
    pub write_count: usize,

    /// Last frame written via write_frame
    pub last_frame: Option<Vec<u8>>,

    /// Whether the panel is initialized
    pub is_initialized: bool,

    /// Simulate failures (for error testing)
    pub simulate_init_failure: bool,
    pub simulate_write_failure: bool,
    pub simulate_refresh_failure: bool,
}

impl MockPanel {
    pub fn new_with_size(width: u32, height: u32) -> Self {
        Self {
            capabilities: PanelCapabilities {
                width,
                height,
                vcom: Some(-2.61),
                name: "mock".to_string(),
            },
            state: Arc::new(Mutex::new(MockPanelState::default())),
        }
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockPanelState>> {
        Arc::clone(&self.state)
    }
}

impl Panel for MockPanel {
    fn capabilities(&self) -> &PanelCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), PanelError> {
        let mut state = self.state.lock().unwrap();
        if state.simulate_init_failure {
            return Err(PanelError::InitializationFailed("Simulated init failure".to_string()));
        }
        state.init_count += 1;
        state.is_initialized = true;
        Ok(())
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<(), PanelError> {
        let expected = (self.capabilities.width * self.capabilities.height) as usize;
        let mut state = self.state.lock().unwrap();
        if !state.is_initialized {
            return Err(PanelError::NotInitialized);
        }
        if state.simulate_write_failure {
            return Err(PanelError::SpiError("Simulated write failure".to_string()));
        }
        if frame.len() != expected {
            return Err(PanelError::BufferSizeMismatch { expected, actual: frame.len() });
        }
        state.write_count += 1;
        state.last_frame = Some(frame.to_vec());
        Ok(())
    }

    fn refresh_full(&mut self) -> Result<(), PanelError> {
        let mut state = self.state.lock().unwrap();
        if state.simulate_refresh_failure {
            return Err(PanelError::SpiError("Simulated refresh failure".to_string()));
        }
        state.refresh_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_panel_init() {
        let mut panel = MockPanel::new_with_size(8, 4);
        let state = panel.state();
        assert!(!state.lock().unwrap().is_initialized);

        panel.init().unwrap();
        assert_eq!(state.lock().unwrap().init_count, 1);
        assert!(state.lock().unwrap().is_initialized);
    }

    #[test]
    fn test_mock_panel_requires_init() {
        let mut panel = MockPanel::new_with_size(8, 4);
        assert!(matches!(panel.write_frame(&[0; 32]), Err(PanelError::NotInitialized)));
    }

    #[test]
    fn test_mock_panel_checks_frame_size() {
        let mut panel = MockPanel::new_with_size(8, 4);
        panel.init().unwrap();
        match panel.write_frame(&[0; 31]) {
            Err(PanelError::BufferSizeMismatch { expected, actual }) => {
                assert_eq!((expected, actual), (32, 31));
            }
            other => panic!("unexpected {:?}", other),
        }
        panel.write_frame(&[7; 32]).unwrap();
        assert_eq!(panel.state().lock().unwrap().last_frame.as_deref(), Some(&[7u8; 32][..]));
    }
}
