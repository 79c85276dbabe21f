/*
 *  panel/plugin/loader.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
 *
 *  Find and load panel plugin shared libraries
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

use std::ffi::c_char;
use std::path::{Path, PathBuf};
use log::{debug, info, warn};
use libloading::{Library, Symbol};

use crate::panel::error::PanelError;
use super::ffi::{
    read_c_string,
    LnPosPluginVTable,
    PluginRegisterFn,
    LNPOS_PLUGIN_ABI_VERSION_MAJOR,
    LNPOS_PLUGIN_ABI_VERSION_MINOR,
    LNPOS_PLUGIN_ABI_VERSION_PATCH,
    LNPOS_PLUGIN_NAME_SIZE,
    LNPOS_PLUGIN_VERSION_SIZE,
    LNPOS_PLUGIN_DRIVER_TYPE_SIZE,
};

/// Environment override for the plugin directory
pub const DRIVER_PATH_ENV: &str = "LNPOS_DRIVER_PATH";

/// Plugin metadata extracted from the plugin
#[derive(Debug, Clone)]
pub struct PluginMetadata {
    /// Plugin name (e.g., "IT8951 e-paper panel")
    pub name: String,

    /// Plugin version (e.g., "1.0.0")
    pub version: String,

    /// Driver type (e.g., "it8951")
    pub driver_type: String,

    /// ABI version (major, minor, patch)
    pub abi_version: (u32, u32, u32),
}

/// A loaded plugin with its library and vtable
pub struct LoadedPlugin {
    /// The shared library; the vtable points into it. None only for
    /// vtables compiled into the host.
    _library: Option<Library>,

    vtable: &'static LnPosPluginVTable,

    metadata: PluginMetadata,
}

impl LoadedPlugin {
    pub fn vtable(&self) -> &'static LnPosPluginVTable {
        self.vtable
    }

    pub fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    /// Wrap a vtable that lives in this binary
    pub fn from_static(vtable: &'static LnPosPluginVTable) -> Result<Self, PanelError> {
        let metadata = PluginLoader::read_metadata(vtable)?;
        Ok(Self { _library: None, vtable, metadata })
    }
}

/// Plugin loader - searches for and loads panel plugins
pub struct PluginLoader;

impl PluginLoader {
    /// Get the search paths for plugins in priority order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. Environment variable override
        if let Ok(path) = std::env::var(DRIVER_PATH_ENV) {
            paths.push(PathBuf::from(path));
        }

        // 2. Development directory (relative to cwd)
        paths.push(PathBuf::from("./target/release/drivers"));

        // 3. User-local directories
        if let Some(home) = dirs_next::home_dir() {
            paths.push(home.join(".local/lib/lnpos/drivers"));
        }

        // 4. System directories
        paths.push(PathBuf::from("/usr/local/lib/lnpos/drivers"));
        paths.push(PathBuf::from("/usr/lib/lnpos/drivers"));

        paths
    }

    /// Possible plugin filenames for a driver type, e.g. "it8951" gives
    /// `liblnpos_it8951.so` and `liblnpos-it8951.so` on Linux
    pub fn plugin_filenames(driver_type: &str) -> Vec<String> {
        let mut names = Vec::new();

        #[cfg(target_os = "linux")]
        {
            names.push(format!("liblnpos_{}.so", driver_type));
            names.push(format!("liblnpos-{}.so", driver_type));
        }

        #[cfg(target_os = "macos")]
        {
            names.push(format!("liblnpos_{}.dylib", driver_type));
            names.push(format!("liblnpos-{}.dylib", driver_type));
        }

        #[cfg(target_os = "windows")]
        {
            names.push(format!("lnpos_{}.dll", driver_type));
            names.push(format!("lnpos-{}.dll", driver_type));
        }

        names
    }

    /// Find a plugin file for the given driver type
    pub fn find_plugin(driver_type: &str) -> Option<PathBuf> {
        let filenames = Self::plugin_filenames(driver_type);

        for path in Self::search_paths() {
            if !path.exists() {
                continue;
            }
            for filename in &filenames {
                let plugin_path = path.join(filename);
                if plugin_path.exists() {
                    debug!("Found plugin at: {}", plugin_path.display());
                    return Some(plugin_path);
                }
            }
        }

        debug!("Plugin not found for driver: {}", driver_type);
        None
    }

    /// Load a plugin from a specific path: open the library, resolve
    /// `lnpos_panel_register`, check the ABI and read the metadata
    pub fn load_plugin<P: AsRef<Path>>(path: P) -> Result<LoadedPlugin, PanelError> {
        let path = path.as_ref();
        info!("Loading plugin from: {}", path.display());

        // SAFETY: loading runs the library's initialisers; plugins are
        // trusted code installed alongside the host
        let library = unsafe {
            Library::new(path).map_err(|e| {
                let msg = format!("Failed to load {}: {}", path.display(), e);
                PanelError::InitializationFailed(msg)
            })?
        };

        let vtable_ptr = {
            // SAFETY: symbol type is fixed by the plugin ABI
            let register_fn: Symbol<PluginRegisterFn> = unsafe {
                library.get(b"lnpos_panel_register\0").map_err(|e| {
                    let msg = format!("Failed to find registration function: {}", e);
                    PanelError::InitializationFailed(msg)
                })?
            };
            register_fn()
        };

        if vtable_ptr.is_null() {
            return Err(PanelError::InitializationFailed(
                "Plugin registration returned null vtable".to_string(),
            ));
        }

        // SAFETY: the vtable is static data inside the library, which
        // LoadedPlugin keeps loaded for as long as the reference lives
        let vtable: &'static LnPosPluginVTable = unsafe { &*vtable_ptr };
        let metadata = Self::read_metadata(vtable)?;

        Ok(LoadedPlugin { _library: Some(library), vtable, metadata })
    }

    /// Load a plugin by driver type from the standard search paths
    pub fn load_by_driver_type(driver_type: &str) -> Result<LoadedPlugin, PanelError> {
        let path = Self::find_plugin(driver_type).ok_or_else(|| {
            PanelError::InitializationFailed(format!(
                "Plugin not found for driver '{}' (searched {:?}, set {} to override)",
                driver_type,
                Self::search_paths(),
                DRIVER_PATH_ENV
            ))
        })?;
        Self::load_plugin(path)
    }

    fn read_metadata(vtable: &LnPosPluginVTable) -> Result<PluginMetadata, PanelError> {
        let (mut major, mut minor, mut patch) = (0u32, 0u32, 0u32);
        (vtable.abi_version)(&mut major, &mut minor, &mut patch);

        debug!("Plugin ABI version: {}.{}.{}", major, minor, patch);

        if major != LNPOS_PLUGIN_ABI_VERSION_MAJOR {
            return Err(PanelError::InitializationFailed(format!(
                "ABI version mismatch: plugin {}.{}.{} incompatible with host {}.{}.{}",
                major, minor, patch,
                LNPOS_PLUGIN_ABI_VERSION_MAJOR,
                LNPOS_PLUGIN_ABI_VERSION_MINOR,
                LNPOS_PLUGIN_ABI_VERSION_PATCH
            )));
        }

        if minor > LNPOS_PLUGIN_ABI_VERSION_MINOR {
            warn!("Plugin has newer minor version {}.{}.{} than host {}.{}.{}",
                major, minor, patch,
                LNPOS_PLUGIN_ABI_VERSION_MAJOR,
                LNPOS_PLUGIN_ABI_VERSION_MINOR,
                LNPOS_PLUGIN_ABI_VERSION_PATCH
            );
        }

        let mut name_buf = vec![0 as c_char; LNPOS_PLUGIN_NAME_SIZE];
        let mut version_buf = vec![0 as c_char; LNPOS_PLUGIN_VERSION_SIZE];
        let mut driver_type_buf = vec![0 as c_char; LNPOS_PLUGIN_DRIVER_TYPE_SIZE];

        (vtable.plugin_info)(
            name_buf.as_mut_ptr(),
            version_buf.as_mut_ptr(),
            driver_type_buf.as_mut_ptr()
        );

        let metadata = PluginMetadata {
            name: read_c_string(&name_buf),
            version: read_c_string(&version_buf),
            driver_type: read_c_string(&driver_type_buf),
            abi_version: (major, minor, patch),
        };
        info!("Loaded plugin: {} v{} ({})", metadata.name, metadata.version, metadata.driver_type);
        Ok(metadata)
    }
}
