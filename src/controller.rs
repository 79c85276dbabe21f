/*
 *  controller.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
 *
 *  Poll, decide, render, sleep, repeat
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

use std::time::Duration;

use chrono::Local;
use log::{debug, info};
use thiserror::Error;
use tokio::sync::watch;

use crate::compose::{ComposeError, Composer};
use crate::config::TimingConfig;
use crate::invoice::{InvoiceError, InvoiceSource};
use crate::panel::{FrameSink, PanelError};
use crate::state::DisplayState;

/// Anything that ends the loop
#[derive(Debug, Error)]
pub enum LoopError {
    #[error(transparent)]
    Invoice(#[from] InvoiceError),
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error("panel I/O fault: {0}")]
    Panel(#[from] PanelError),
}

impl LoopError {
    /// One-line class of failure for the exit log
    pub fn category(&self) -> &'static str {
        match self {
            LoopError::Invoice(e) if e.is_data_error() => "payment node sent unusable invoice data",
            LoopError::Invoice(_) => "payment node poll failed",
            LoopError::Compose(_) => "invoice cannot be drawn",
            LoopError::Panel(_) => "panel hardware fault",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new frame went to the panel
    Rendered { open: bool },
    /// Openness unchanged, panel untouched
    Unchanged { open: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub poll_interval: Duration,
    pub settle: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        (&TimingConfig::default()).into()
    }
}

impl From<&TimingConfig> for Timing {
    fn from(cfg: &TimingConfig) -> Self {
        Self { poll_interval: cfg.poll_interval(), settle: cfg.settle() }
    }
}

/// The render loop. Owns the display state; the invoice source and the
/// frame sink are only ever called one at a time from here.
pub struct PosController<S, D> {
    source: S,
    sink: D,
    composer: Composer,
    state: DisplayState,
    timing: Timing,
}

impl<S: InvoiceSource, D: FrameSink> PosController<S, D> {
    pub fn new(source: S, sink: D, composer: Composer, timing: Timing) -> Self {
        Self { source, sink, composer, state: DisplayState::new(), timing }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    /// One poll. On any error the display state is left as it was, so the
    /// panel keeps its last good frame.
    pub async fn cycle(&mut self) -> Result<CycleOutcome, LoopError> {
        let snapshot = self.source.latest_invoice().await?;
        let open = snapshot.is_open();

        if !self.state.should_render(open) {
            debug!("No change, invoice {} (open={})", snapshot.state, open);
            return Ok(CycleOutcome::Unchanged { open });
        }

        info!(
            "Invoice state change: was open={} is open={} ({}, {} sats)",
            self.state.has_open_invoice(),
            open,
            snapshot.state,
            snapshot.amount
        );
        let frame = self.composer.compose(&snapshot)?;
        let shown_for = self.state.shown_for(Local::now());
        self.sink.render(&frame)?;
        self.state.record(open, frame);
        match shown_for {
            Some(up) => info!(
                "Panel refreshed, render #{} (previous frame up {}s)",
                self.state.renders(),
                up.num_seconds()
            ),
            None => info!("Panel refreshed, render #{}", self.state.renders()),
        }

        Ok(CycleOutcome::Rendered { open })
    }

    /// Run until `shutdown` turns true or a cycle fails. Shutdown is only
    /// observed between cycles, while waiting.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<(), LoopError> {
        loop {
            if *shutdown.borrow() {
                break;
            }
            if let CycleOutcome::Rendered { .. } = self.cycle().await? {
                // e-paper keeps drawing after the refresh call returns
                if pause(self.timing.settle, &mut shutdown).await {
                    break;
                }
            }
            if pause(self.timing.poll_interval, &mut shutdown).await {
                break;
            }
        }
        info!("Render loop stopped after {} renders", self.state.renders());
        Ok(())
    }
}

/// Sleep for `duration`; true when shutdown was requested meanwhile
async fn pause(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return true;
    }
    let changed = tokio::select! {
        _ = tokio::time::sleep(duration) => return false,
        changed = shutdown.changed() => changed,
    };
    // a dropped sender means nobody can stop us cleanly any more
    changed.is_err() || *shutdown.borrow()
}
