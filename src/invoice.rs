/*
 *  invoice.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
 *
 *  Invoice snapshot model and the LND /v1/invoices wire format
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
use std::future::Future;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Lifecycle state of an invoice as reported by the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceState {
    Open,
    Settled,
    Canceled,
    /// ACCEPTED (held HTLC) and anything newer
    #[default]
    #[serde(other)]
    Other,
}

impl fmt::Display for InvoiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InvoiceState::Open => "OPEN",
            InvoiceState::Settled => "SETTLED",
            InvoiceState::Canceled => "CANCELED",
            InvoiceState::Other => "OTHER",
        };
        f.write_str(s)
    }
}

/// One poll's view of the current invoice. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceSnapshot {
    pub state: InvoiceState,
    /// Satoshis
    pub amount: u64,
    pub memo: String,
    /// BOLT-11 payment request, only kept for OPEN invoices
    pub payment_descriptor: Option<String>,
}

impl InvoiceSnapshot {
    pub fn is_open(&self) -> bool {
        self.state == InvoiceState::Open
    }
}

#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("request to payment node failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("payment node answered HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("cannot decode invoice list: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("payment node returned no invoices")]
    NoInvoices,

    #[error("malformed invoice: {0}")]
    Malformed(String),

    #[error("cannot set up node client: {0}")]
    Setup(String),
}

impl InvoiceError {
    /// Errors that say the data is unusable, as opposed to the node being
    /// unreachable
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            InvoiceError::Decode(_) | InvoiceError::NoInvoices | InvoiceError::Malformed(_)
        )
    }
}

/// Anything that can be asked for the node's current invoice
pub trait InvoiceSource {
    fn latest_invoice(&self) -> impl Future<Output = Result<InvoiceSnapshot, InvoiceError>> + Send;
}

#[derive(Debug, Deserialize)]
struct ListInvoiceResponse {
    #[serde(default)]
    invoices: Vec<WireInvoice>,
}

#[derive(Debug, Deserialize)]
struct WireInvoice {
    #[serde(default)]
    state: InvoiceState,
    /// int64 travels as a JSON string through the REST gateway
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    memo: String,
    #[serde(default)]
    payment_request: String,
}

fn not_sats(value: impl fmt::Display) -> InvoiceError {
    InvoiceError::Malformed(format!("value {value} is not a satoshi amount"))
}

impl TryFrom<WireInvoice> for InvoiceSnapshot {
    type Error = InvoiceError;

    fn try_from(wire: WireInvoice) -> Result<Self, Self::Error> {
        let amount = match wire.value {
            None | Some(Value::Null) => 0,
            Some(Value::String(s)) => {
                s.trim().parse::<u64>().map_err(|_| not_sats(format!("{s:?}")))?
            }
            Some(Value::Number(n)) => n.as_u64().ok_or_else(|| not_sats(&n))?,
            Some(other) => return Err(not_sats(other)),
        };

        let payment_descriptor = match wire.state {
            InvoiceState::Open if !wire.payment_request.is_empty() => Some(wire.payment_request),
            _ => None,
        };

        Ok(InvoiceSnapshot { state: wire.state, amount, memo: wire.memo, payment_descriptor })
    }
}

/// Parse a `/v1/invoices` body and pick the newest invoice, which the node
/// lists last.
pub fn parse_invoices(body: &str) -> Result<InvoiceSnapshot, InvoiceError> {
    let response: ListInvoiceResponse = serde_json::from_str(body)?;
    let last = response.invoices.into_iter().next_back().ok_or(InvoiceError::NoInvoices)?;
    InvoiceSnapshot::try_from(last)
}
