/*
 *  lib.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
 *
 *  Lightning point-of-sale e-paper display
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

//! Polls an LND node for its newest invoice and shows it on an e-paper
//! panel: a QR code and the amount while the invoice is open, the
//! "lightning accepted" badge otherwise. The panel is only refreshed when
//! the invoice flips between open and closed.

pub mod bitmap;
pub mod compose;
pub mod config;
pub mod controller;
pub mod invoice;
pub mod lnd;
pub mod panel;
pub mod state;

pub use bitmap::Bitmap;
pub use compose::{ComposeError, Composer, Layout};
pub use controller::{CycleOutcome, LoopError, PosController, Timing};
pub use invoice::{InvoiceError, InvoiceSnapshot, InvoiceSource, InvoiceState};
pub use lnd::LndClient;
pub use state::{should_render, DisplayState};
