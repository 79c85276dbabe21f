/*
 *  panel/plugin/mod.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
 *
 *  Vendor panel SDKs loaded at runtime
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

//! Dynamic plugin system for e-paper panels
//!
//! Real panels (IT8951 and friends) sit behind vendor SDKs that own the
//! SPI framing. Each SDK is wrapped in a small shared library exporting
//! `lnpos_panel_register`, which hands back a C vtable.
//!
//! ## Plugin Discovery
//!
//! Plugins are searched in the following locations (in priority order):
//!
//! 1. `$LNPOS_DRIVER_PATH` (environment variable)
//! 2. `./target/release/drivers/` (development)
//! 3. `~/.local/lib/lnpos/drivers/` (user-local)
//! 4. `/usr/local/lib/lnpos/drivers/` (system)
//! 5. `/usr/lib/lnpos/drivers/` (system)
//!
//! A `plugin_path` in the config skips the search.
//!
//! ## Plugin Naming Convention
//!
//! - Linux: `liblnpos_it8951.so` or `liblnpos-it8951.so`
//! - macOS: `liblnpos_it8951.dylib`
//! - Windows: `lnpos_it8951.dll`

pub mod ffi;
pub mod loader;
pub mod adapter;

pub use ffi::{
    LnPosPluginVTable,
    LnPosPanelHandle,
    LnPosErrorCode,
    LnPosError,
    LnPosPanelConfig,
    LnPosPanelInfo,
    LnPosRefreshMode,
};

pub use loader::{PluginLoader, LoadedPlugin, PluginMetadata};
pub use adapter::{PluginPanelAdapter, PluginPanelConfig};
