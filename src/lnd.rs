/*
 *  lnd.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
 *
 *  LND REST client, macaroon authenticated
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

use std::fs;
use std::time::Duration;

use log::{debug, warn};
use reqwest::{header, Certificate, Client};

use crate::config::LightningConfig;
use crate::invoice::{parse_invoices, InvoiceError, InvoiceSnapshot, InvoiceSource};

pub const MACAROON_HEADER: &str = "Grpc-Metadata-macaroon";
const INVOICES_PATH: &str = "/v1/invoices";
const CONNECT_TIMEOUT_MS: u64 = 5_000;
/// Characters of an error body kept for the log
const ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct LndClient {
    client: Client,
    url: String,
}

impl LndClient {
    pub fn new(cfg: &LightningConfig) -> Result<Self, InvoiceError> {
        const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

        let mut macaroon = header::HeaderValue::from_str(cfg.macaroon.trim())
            .map_err(|_| InvoiceError::Setup("macaroon is not a valid header value".into()))?;
        macaroon.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert("User-Agent", header::HeaderValue::from_static(VERSION));
        headers.insert("Accept", header::HeaderValue::from_static("application/json"));
        headers.insert(MACAROON_HEADER, macaroon);

        let mut builder = Client::builder()
            .connect_timeout(Duration::from_millis(CONNECT_TIMEOUT_MS.min(cfg.timeout_ms)))
            .default_headers(headers)
            .timeout(Duration::from_millis(cfg.timeout_ms));

        if let Some(path) = &cfg.tls_cert {
            let pem = fs::read(path)
                .map_err(|e| InvoiceError::Setup(format!("cannot read {}: {e}", path.display())))?;
            let cert = Certificate::from_pem(&pem)
                .map_err(|e| {
                    InvoiceError::Setup(format!("bad certificate {}: {e}", path.display()))
                })?;
            builder = builder.add_root_certificate(cert);
            debug!("Trusting node certificate {}", path.display());
        }
        if cfg.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for {}", cfg.url);
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self { client: builder.build()?, url: invoices_url(&cfg.url) })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Node base URL to the invoice listing, tolerating a URL that already
/// names the endpoint
fn invoices_url(base: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    if base.ends_with(INVOICES_PATH) {
        base.to_string()
    } else {
        format!("{base}{INVOICES_PATH}")
    }
}

/// First `max` characters of `body`, never splitting a UTF-8 sequence
fn clip(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((end, _)) => body[..end].to_string(),
        None => body.to_string(),
    }
}

impl InvoiceSource for LndClient {
    async fn latest_invoice(&self) -> Result<InvoiceSnapshot, InvoiceError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(InvoiceError::Status {
                status: status.as_u16(),
                body: clip(&body, ERROR_BODY_CHARS),
            });
        }

        let snapshot = parse_invoices(&body)?;
        debug!(
            "Latest invoice: {} {} sats {:?}",
            snapshot.state, snapshot.amount, snapshot.memo
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::InvoiceState;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned response, hand back the raw request head
    async fn serve_once(
        status: &'static str,
        body: &str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        serve_after(Duration::ZERO, status, body.to_string()).await
    }

    /// As `serve_once`, but sit on the request for `delay` before answering
    async fn serve_after(
        delay: Duration,
        status: &'static str,
        body: String,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = sock.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            tokio::time::sleep(delay).await;
            let reply = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            // the client may have hung up already
            sock.write_all(reply.as_bytes()).await.ok();
            sock.shutdown().await.ok();
            String::from_utf8_lossy(&buf).into_owned()
        });
        (format!("http://{addr}"), handle)
    }

    fn settings(url: String) -> LightningConfig {
        LightningConfig {
            url,
            macaroon: "0201036c6e64".into(),
            timeout_ms: 2_000,
            ..LightningConfig::default()
        }
    }

    #[test]
    fn test_invoices_url() {
        const LISTING: &str = "https://umbrel.local:8080/v1/invoices";
        assert_eq!(invoices_url("https://umbrel.local:8080"), LISTING);
        assert_eq!(invoices_url("https://umbrel.local:8080/"), LISTING);
        assert_eq!(invoices_url(LISTING), LISTING);
    }

    #[tokio::test]
    async fn test_fetches_latest_invoice_with_macaroon() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"invoices":[{"state":"OPEN","value":"5000","memo":"coffee","payment_request":"lnbc50u1x"}]}"#,
        )
        .await;

        let client = LndClient::new(&settings(url)).unwrap();
        let snap = client.latest_invoice().await.unwrap();
        assert_eq!(snap.state, InvoiceState::Open);
        assert_eq!(snap.amount, 5000);

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(request.starts_with("get /v1/invoices "), "{request}");
        assert!(request.contains("grpc-metadata-macaroon: 0201036c6e64"), "{request}");
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let (url, _server) = serve_once("500 Internal Server Error", r#"{"message":"boom"}"#).await;
        let client = LndClient::new(&settings(url)).unwrap();
        match client.latest_invoice().await {
            Err(InvoiceError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert!(body.contains("boom"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_body_clipped_on_char_boundary() {
        // the euro sign straddles byte 200
        let page = format!("{}\u{20ac} gateway error", "x".repeat(199));
        let (url, _server) = serve_after(Duration::ZERO, "502 Bad Gateway", page).await;
        let client = LndClient::new(&settings(url)).unwrap();
        match client.latest_invoice().await {
            Err(InvoiceError::Status { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body.chars().count(), ERROR_BODY_CHARS);
                assert!(body.ends_with("x\u{20ac}"), "{body}");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("short", 200), "short");
        assert_eq!(clip("\u{e9}t\u{e9}", 2), "\u{e9}t");
        assert_eq!(clip("", 3), "");
    }

    #[tokio::test]
    async fn test_hung_node_times_out() {
        let (url, _server) = serve_after(Duration::from_secs(5), "200 OK", "{}".to_string()).await;
        let mut cfg = settings(url);
        cfg.timeout_ms = 300;
        let client = LndClient::new(&cfg).unwrap();

        let started = std::time::Instant::now();
        let err = client.latest_invoice().await.unwrap_err();
        let elapsed = started.elapsed();

        match &err {
            InvoiceError::Http(e) => assert!(e.is_timeout(), "{e}"),
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(!err.is_data_error());
        assert!(elapsed >= Duration::from_millis(250), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(3), "{elapsed:?}");
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let (url, _server) = serve_once("200 OK", "{}").await;
        let client = LndClient::new(&settings(url)).unwrap();
        assert!(matches!(client.latest_invoice().await, Err(InvoiceError::NoInvoices)));
    }

    #[tokio::test]
    async fn test_unreachable_node() {
        // bind then drop to get a port nobody listens on
        let addr = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();
        let client = LndClient::new(&settings(format!("http://{addr}"))).unwrap();
        let err = client.latest_invoice().await.unwrap_err();
        assert!(matches!(err, InvoiceError::Http(_)));
        assert!(!err.is_data_error());
    }

    #[test]
    fn test_rejects_bad_macaroon() {
        let mut cfg = settings("http://127.0.0.1:1".into());
        cfg.macaroon = "bad\nvalue".into();
        assert!(matches!(LndClient::new(&cfg), Err(InvoiceError::Setup(_))));
    }

    #[test]
    fn test_missing_cert_file() {
        let mut cfg = settings("https://127.0.0.1:1".into());
        cfg.tls_cert = Some("/nonexistent/tls.cert".into());
        assert!(matches!(LndClient::new(&cfg), Err(InvoiceError::Setup(_))));
    }
}
