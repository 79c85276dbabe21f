/*
 *  panel/error.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
 *
 *  Error types for the e-paper panel subsystem
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

use std::fmt;
use std::error::Error;

/// Unified error type for all panel operations
#[derive(Debug)]
pub enum PanelError {
    /// Panel bring-up failed
    InitializationFailed(String),

    /// Transfer to the panel controller failed
    SpiError(String),

    /// Invalid configuration
    InvalidConfiguration(String),

    /// Frame buffer size does not match the panel
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Frame written before `init`
    NotInitialized,

    /// Writing a virtual frame to disk failed
    Io(std::io::Error),

    /// Generic error with message
    Other(String),
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelError::InitializationFailed(msg) =>
                write!(f, "Panel initialization failed: {}", msg),
            PanelError::SpiError(msg) =>
                write!(f, "SPI communication error: {}", msg),
            PanelError::InvalidConfiguration(msg) =>
                write!(f, "Invalid panel configuration: {}", msg),
            PanelError::BufferSizeMismatch { expected, actual } =>
                write!(f, "Buffer size mismatch: expected {} bytes, got {}", expected, actual),
            PanelError::NotInitialized =>
                write!(f, "Panel used before initialization"),
            PanelError::Io(err) =>
                write!(f, "Panel I/O error: {}", err),
            PanelError::Other(msg) =>
                write!(f, "{}", msg),
        }
    }
}

impl Error for PanelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PanelError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PanelError {
    fn from(err: std::io::Error) -> Self {
        PanelError::Io(err)
    }
}

impl From<image::ImageError> for PanelError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => PanelError::Io(e),
            other => PanelError::Other(format!("image encode: {}", other)),
        }
    }
}
