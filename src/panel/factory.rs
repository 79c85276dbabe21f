/*
 *  panel/factory.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
 *
 *  Build the configured panel backend
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

use log::info;

use crate::config::{DisplayConfig, DriverKind};
use crate::panel::drivers::virtual_panel::VirtualPanel;
use crate::panel::error::PanelError;
use crate::panel::traits::BoxedPanel;

#[cfg(feature = "plugin-system")]
use crate::panel::plugin::{PluginLoader, PluginPanelAdapter, PluginPanelConfig};

/// Factory for creating panels from configuration
pub struct PanelFactory;

impl PanelFactory {
    /// Create the panel named by `config.driver`. The panel is returned
    /// uninitialised; `EpdDisplay::new` brings it up.
    pub fn create_from_config(config: &DisplayConfig) -> Result<BoxedPanel, PanelError> {
        match config.driver {
            DriverKind::Virtual => {
                info!("Virtual panel requested");
                Ok(Box::new(VirtualPanel::new(config.width, config.height, &config.output_dir)?))
            }
            DriverKind::Plugin => Self::create_plugin(config),
        }
    }

    #[cfg(feature = "plugin-system")]
    fn create_plugin(config: &DisplayConfig) -> Result<BoxedPanel, PanelError> {
        let plugin = match (&config.plugin_path, config.plugin.as_deref()) {
            (Some(path), _) => PluginLoader::load_plugin(path)?,
            (None, Some(name)) => PluginLoader::load_by_driver_type(name)?,
            (None, None) => {
                return Err(PanelError::InvalidConfiguration(
                    "plugin driver needs a plugin name or plugin_path".to_string(),
                ));
            }
        };

        let panel_config = PluginPanelConfig {
            spi_device: config.spi_device.clone(),
            spi_hz: config.spi_hz,
            vcom: config.vcom,
        };
        let adapter = PluginPanelAdapter::new(plugin, &panel_config)?;
        info!("Using plugin panel {} v{}", adapter.plugin_name(), adapter.plugin_version());
        Ok(Box::new(adapter))
    }

    #[cfg(not(feature = "plugin-system"))]
    fn create_plugin(_config: &DisplayConfig) -> Result<BoxedPanel, PanelError> {
        Err(PanelError::InvalidConfiguration(
            "plugin panels not enabled. Enable with --features plugin-system".to_string(),
        ))
    }
}
