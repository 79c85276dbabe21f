/*
 *  main.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
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

use std::process::ExitCode;

use anyhow::Context;
use env_logger::Env;
use log::{error, info, warn};
use tokio::sync::watch;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use lnpos::compose::{badge, Composer};
use lnpos::config::{self, Config};
use lnpos::controller::{PosController, Timing};
use lnpos::lnd::LndClient;
use lnpos::panel::{EpdDisplay, PanelFactory};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Waits for SIGINT, SIGTERM or SIGHUP and logs which one arrived.
#[cfg(unix)]
async fn signal_handler() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn signal_handler() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received. Initiating graceful shutdown.");
    Ok(())
}

async fn run(cfg: Config) -> anyhow::Result<()> {
    let badge = match cfg.assets.badge.as_deref() {
        Some(path) => badge::load(path)?,
        None => {
            info!("No badge image configured, drawing the built-in badge");
            badge::builtin()
        }
    };
    let composer = Composer::new(badge);

    let client = LndClient::new(&cfg.lightning).context("setting up the payment node client")?;
    info!("Polling invoices at {}", client.url());

    let panel = PanelFactory::create_from_config(&cfg.display).context("creating the panel")?;
    let display = EpdDisplay::new(panel, cfg.display.rotate).context("initializing the panel")?;
    let logical = display.logical_size();
    info!("Panel ready, {}x{} mounted {:?}", logical.width, logical.height, display.rotation());

    let mut controller = PosController::new(client, display, composer, Timing::from(&cfg.timing));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match signal_handler().await {
            Ok(()) => {
                shutdown_tx.send(true).ok();
            }
            Err(e) => {
                warn!("Signal handling unavailable: {}", e);
                // keep the sender alive, the loop then only stops on error
                let _hold = shutdown_tx;
                std::future::pending::<()>().await;
            }
        }
    });

    info!("Entering render loop");
    controller
        .run(shutdown_rx)
        .await
        .map_err(|e| {
            let category = e.category();
            anyhow::Error::new(e).context(category)
        })?;
    info!("Shut down cleanly, panel keeps its last frame");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // logger is not up yet
            eprintln!("lnpos: {}", e);
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level()))
        .format_timestamp_secs()
        .init();

    info!("{} v.{} built {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), BUILD_DATE);

    match run(cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
