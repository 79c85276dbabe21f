/*
 *  panel/plugin/adapter.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
 *
 *  Wrap a C ABI panel plugin as a Panel
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

use std::panic::{self, AssertUnwindSafe};
use log::{debug, error};

use crate::panel::error::PanelError;
use crate::panel::traits::{Panel, PanelCapabilities};
use super::ffi::{
    LnPosError,
    LnPosErrorCode,
    LnPosPanelConfig,
    LnPosPanelHandle,
    LnPosPanelInfo,
    LnPosRefreshMode,
};
use super::loader::LoadedPlugin;

/// Settings handed to the plugin's `create`
#[derive(Debug, Clone, PartialEq)]
pub struct PluginPanelConfig {
    pub spi_device: String,
    pub spi_hz: u32,
    pub vcom: f32,
}

/// Adapter that drives a plugin panel through its vtable
///
/// Every call is panic-guarded; the instance is destroyed on drop.
pub struct PluginPanelAdapter {
    /// The loaded plugin (kept alive for vtable access)
    plugin: LoadedPlugin,

    /// Opaque handle to the plugin panel instance
    handle: *mut LnPosPanelHandle,

    /// Cached panel capabilities
    capabilities: PanelCapabilities,
}

// SAFETY: the handle is only ever touched through the vtable, and the
// adapter is used from one thread at a time (&mut self on every call)
unsafe impl Send for PluginPanelAdapter {}

impl PluginPanelAdapter {
    /// Create the panel instance and read back its geometry and VCOM
    pub fn new(plugin: LoadedPlugin, config: &PluginPanelConfig) -> Result<Self, PanelError> {
        let vtable = plugin.vtable();
        let ffi_config = LnPosPanelConfig::new(&config.spi_device, config.spi_hz, config.vcom);

        let mut handle: *mut LnPosPanelHandle = std::ptr::null_mut();
        let mut error = LnPosError::default();

        let (result, panic_error) = catch_ffi_call(|| {
            (vtable.create)(&ffi_config, &mut handle, &mut error)
        });
        if let Some(e) = panic_error {
            return Err(e.into());
        }
        if result != LnPosErrorCode::Success || handle.is_null() {
            return Err(error.into());
        }

        debug!("Created plugin panel instance: {:p}", handle);

        let mut info = LnPosPanelInfo::default();
        let (result, panic_error) = catch_ffi_call(|| {
            (vtable.info)(handle, &mut info, &mut error)
        });
        if let Some(e) = panic_error {
            (vtable.destroy)(handle);
            return Err(e.into());
        }
        if result != LnPosErrorCode::Success {
            (vtable.destroy)(handle);
            return Err(error.into());
        }

        let capabilities = PanelCapabilities {
            width: info.width,
            height: info.height,
            vcom: Some(info.vcom),
            name: plugin.metadata().driver_type.clone(),
        };
        debug!("Plugin panel capabilities: {:?}", capabilities);

        Ok(Self { plugin, handle, capabilities })
    }

    pub fn plugin_name(&self) -> &str {
        &self.plugin.metadata().name
    }

    pub fn plugin_version(&self) -> &str {
        &self.plugin.metadata().version
    }

    fn check(
        result: LnPosErrorCode,
        panic_error: Option<LnPosError>,
        error: LnPosError,
    ) -> Result<(), PanelError> {
        if let Some(e) = panic_error {
            return Err(e.into());
        }
        if result != LnPosErrorCode::Success {
            return Err(error.into());
        }
        Ok(())
    }
}

impl Panel for PluginPanelAdapter {
    fn capabilities(&self) -> &PanelCapabilities {
        &self.capabilities
    }

    /// The plugin brings the panel up in `create`; here we only make sure
    /// it reported a usable frame
    fn init(&mut self) -> Result<(), PanelError> {
        if self.capabilities.width == 0 || self.capabilities.height == 0 {
            return Err(PanelError::InitializationFailed(format!(
                "plugin {} reported a {}x{} panel",
                self.plugin_name(),
                self.capabilities.width,
                self.capabilities.height
            )));
        }
        Ok(())
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<(), PanelError> {
        let expected = (self.capabilities.width * self.capabilities.height) as usize;
        if frame.len() != expected {
            return Err(PanelError::BufferSizeMismatch { expected, actual: frame.len() });
        }

        let vtable = self.plugin.vtable();
        let mut error = LnPosError::default();
        let (result, panic_error) = catch_ffi_call(|| {
            (vtable.write_frame)(self.handle, frame.as_ptr(), frame.len(), &mut error)
        });
        Self::check(result, panic_error, error)
    }

    fn refresh_full(&mut self) -> Result<(), PanelError> {
        let vtable = self.plugin.vtable();
        let mut error = LnPosError::default();
        let (result, panic_error) = catch_ffi_call(|| {
            (vtable.refresh)(self.handle, LnPosRefreshMode::Gc16, &mut error)
        });
        Self::check(result, panic_error, error)
    }
}

impl Drop for PluginPanelAdapter {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            debug!("Destroying plugin panel instance: {:p}", self.handle);
            let vtable = self.plugin.vtable();
            (vtable.destroy)(self.handle);
            self.handle = std::ptr::null_mut();
        }
    }
}

/// Run an FFI call, turning a panic in plugin code into an error code
/// so it never unwinds across the C boundary
fn catch_ffi_call<F>(f: F) -> (LnPosErrorCode, Option<LnPosError>)
where
    F: FnOnce() -> LnPosErrorCode,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(code) => (code, None),
        Err(panic_info) => {
            let message = if let Some(s) = panic_info.downcast_ref::<&str>() {
                format!("Plugin panic: {}", s)
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                format!("Plugin panic: {}", s)
            } else {
                "Plugin panic: unknown error".to_string()
            };

            error!("Caught panic in plugin FFI call: {}", message);
            let panic_error = LnPosError::new(LnPosErrorCode::ErrorPanic, &message);
            (LnPosErrorCode::ErrorPanic, Some(panic_error))
        }
    }
}
