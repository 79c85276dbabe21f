/*
 *  panel/plugin/ffi.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
 *
 *  C ABI between the host and vendor panel plugins
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

//! FFI types for lnpos panel plugins
//!
//! All types are `#[repr(C)]`; a plugin built against the same ABI major
//! version can be loaded by any host of that major version.

use std::ffi::c_char;

use crate::panel::error::PanelError;

/// Plugin ABI version
pub const LNPOS_PLUGIN_ABI_VERSION_MAJOR: u32 = 1;
pub const LNPOS_PLUGIN_ABI_VERSION_MINOR: u32 = 0;
pub const LNPOS_PLUGIN_ABI_VERSION_PATCH: u32 = 0;

/// Maximum length for error messages
pub const LNPOS_ERROR_MESSAGE_SIZE: usize = 256;

/// Maximum length for plugin metadata strings
pub const LNPOS_PLUGIN_NAME_SIZE: usize = 64;
pub const LNPOS_PLUGIN_VERSION_SIZE: usize = 32;
pub const LNPOS_PLUGIN_DRIVER_TYPE_SIZE: usize = 32;

/// Maximum length for the SPI device path, terminator included
pub const LNPOS_PATH_SIZE: usize = 256;

/// Opaque handle to a plugin panel instance
#[repr(C)]
pub struct LnPosPanelHandle {
    _private: [u8; 0],
}

/// Error codes returned by plugin functions
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LnPosErrorCode {
    /// Operation completed successfully
    Success = 0,

    /// Generic error
    ErrorGeneric = 1,

    /// Invalid argument passed to function
    ErrorInvalidArgument = 2,

    /// SPI or controller communication error
    ErrorCommunication = 3,

    /// Initialization failed
    ErrorInitialization = 4,

    /// Null pointer passed where non-null expected
    ErrorNullPointer = 5,

    /// Panic occurred in plugin code
    ErrorPanic = 6,

    /// ABI version mismatch
    ErrorAbiMismatch = 7,
}

/// Error information structure
#[repr(C)]
pub struct LnPosError {
    pub code: LnPosErrorCode,

    /// Human-readable error message (null-terminated)
    pub message: [c_char; LNPOS_ERROR_MESSAGE_SIZE],
}

impl LnPosError {
    pub fn new(code: LnPosErrorCode, message: &str) -> Self {
        let mut error = Self {
            code,
            message: [0; LNPOS_ERROR_MESSAGE_SIZE],
        };
        write_c_string(&mut error.message, message);
        error
    }

    pub fn success() -> Self {
        Self::new(LnPosErrorCode::Success, "")
    }

    /// Extract error message as Rust string
    pub fn message_str(&self) -> String {
        read_c_string(&self.message)
    }
}

impl Default for LnPosError {
    fn default() -> Self {
        Self::success()
    }
}

impl From<PanelError> for LnPosError {
    fn from(error: PanelError) -> Self {
        let (code, message) = match error {
            PanelError::SpiError(msg) =>
                (LnPosErrorCode::ErrorCommunication, msg),
            PanelError::InitializationFailed(msg) =>
                (LnPosErrorCode::ErrorInitialization, msg),
            PanelError::InvalidConfiguration(msg) =>
                (LnPosErrorCode::ErrorInvalidArgument, msg),
            PanelError::BufferSizeMismatch { expected, actual } =>
                (LnPosErrorCode::ErrorInvalidArgument,
                 format!("Buffer size mismatch: expected {}, got {}", expected, actual)),
            PanelError::NotInitialized =>
                (LnPosErrorCode::ErrorInitialization, "Panel not initialized".to_string()),
            PanelError::Io(e) =>
                (LnPosErrorCode::ErrorCommunication, e.to_string()),
            PanelError::Other(msg) =>
                (LnPosErrorCode::ErrorGeneric, msg),
        };
        Self::new(code, &message)
    }
}

impl From<LnPosError> for PanelError {
    fn from(error: LnPosError) -> Self {
        let message = error.message_str();
        match error.code {
            LnPosErrorCode::Success => PanelError::Other("No error".to_string()),
            LnPosErrorCode::ErrorCommunication => PanelError::SpiError(message),
            LnPosErrorCode::ErrorInitialization => PanelError::InitializationFailed(message),
            LnPosErrorCode::ErrorInvalidArgument => PanelError::InvalidConfiguration(message),
            _ => PanelError::Other(message),
        }
    }
}

/// Refresh waveform, numbered as on the IT8951 controller
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LnPosRefreshMode {
    /// Clear to white, used by plugins at start-up
    Init = 0,
    /// Fast monochrome update
    Du = 1,
    /// Full 16 level greyscale, slow and ghost-free
    Gc16 = 2,
}

/// Panel settings passed to `create`
#[repr(C)]
pub struct LnPosPanelConfig {
    /// SPI device path (e.g. "/dev/spidev0.0")
    pub spi_path: [c_char; LNPOS_PATH_SIZE],

    /// SPI clock in Hz (0 = plugin default)
    pub spi_hz: u32,

    /// VCOM to program, in volts (negative)
    pub vcom: f32,
}

impl LnPosPanelConfig {
    pub fn new(spi_path: &str, spi_hz: u32, vcom: f32) -> Self {
        let mut config = Self {
            spi_path: [0; LNPOS_PATH_SIZE],
            spi_hz,
            vcom,
        };
        write_c_string(&mut config.spi_path, spi_path);
        config
    }
}

/// What the panel reports about itself
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LnPosPanelInfo {
    pub width: u32,
    pub height: u32,
    /// VCOM read back from the controller, in volts
    pub vcom: f32,
}

/// Plugin vtable - function pointers for all panel operations
#[repr(C)]
pub struct LnPosPluginVTable {
    /// Get plugin ABI version (major, minor, patch)
    pub abi_version: extern "C" fn(
        major: *mut u32,
        minor: *mut u32,
        patch: *mut u32
    ),

    /// Get plugin metadata (name, version, driver_type)
    pub plugin_info: extern "C" fn(
        name: *mut c_char,
        version: *mut c_char,
        driver_type: *mut c_char
    ),

    /// Open the SPI device, program VCOM and clear the panel
    pub create: extern "C" fn(
        config: *const LnPosPanelConfig,
        handle: *mut *mut LnPosPanelHandle,
        error: *mut LnPosError
    ) -> LnPosErrorCode,

    /// Destroy a panel instance
    pub destroy: extern "C" fn(
        handle: *mut LnPosPanelHandle
    ),

    /// Get panel geometry and VCOM
    pub info: extern "C" fn(
        handle: *const LnPosPanelHandle,
        info: *mut LnPosPanelInfo,
        error: *mut LnPosError
    ) -> LnPosErrorCode,

    /// Load an 8bpp frame, `width * height` bytes, into panel memory
    pub write_frame: extern "C" fn(
        handle: *mut LnPosPanelHandle,
        buffer: *const u8,
        length: usize,
        error: *mut LnPosError
    ) -> LnPosErrorCode,

    /// Refresh the whole panel from its memory
    pub refresh: extern "C" fn(
        handle: *mut LnPosPanelHandle,
        mode: LnPosRefreshMode,
        error: *mut LnPosError
    ) -> LnPosErrorCode,
}

/// Plugin registration function type
///
/// Each plugin must export:
/// ```c
/// const LnPosPluginVTable *lnpos_panel_register(void);
/// ```
pub type PluginRegisterFn = extern "C" fn() -> *const LnPosPluginVTable;

/// Copy `s` into a fixed C buffer, truncating and null-terminating
pub fn write_c_string(buffer: &mut [c_char], s: &str) {
    let Some(max) = buffer.len().checked_sub(1) else { return };
    let len = s.len().min(max);
    for (slot, &byte) in buffer.iter_mut().zip(s.as_bytes().iter().take(len)) {
        *slot = byte as c_char;
    }
    buffer[len] = 0;
}

/// Read a null-terminated string out of a C buffer
pub fn read_c_string(buffer: &[c_char]) -> String {
    let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    let bytes: Vec<u8> = buffer[..len].iter().map(|&c| c as u8).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}
