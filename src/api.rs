//! Synchronous downloader for World Bank indicator spreadsheets.
//!
//! The bulk-download endpoint `indicator/{code}?downloadformat=excel` returns one
//! workbook per indicator covering every country and year. This module only
//! moves bytes; parsing lives in [`crate::loader`].
//!
//! ### Notes
//! - There is no retry: any transport or HTTP failure is returned as
//!   [`AnalysisError::Fetch`].
//! - The HTTP client keeps a 30s total / 10s connect timeout and follows up to 5 redirects
//!   (the endpoint redirects to a static file host).
//!
//! Typical usage:
//! ```no_run
//! # use wdi_explore::api::{Client, SpreadsheetSource};
//! let client = Client::default();
//! let bytes = client.fetch(&SpreadsheetSource::Remote { code: "SP.URB.GROW".into() })?;
//! # Ok::<(), wdi_explore::error::AnalysisError>(())
//! ```

use crate::error::{AnalysisError, Result};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where an indicator workbook comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpreadsheetSource {
    /// Download `<base_url>/indicator/<code>?downloadformat=excel`.
    Remote { code: String },
    /// Read a workbook already on disk.
    File(PathBuf),
}

impl SpreadsheetSource {
    /// Resolve an indicator code against an optional directory of pre-downloaded
    /// workbooks named `<code>.xls` or `<code>.xlsx`.
    pub fn for_code(code: &str, data_dir: Option<&Path>) -> Result<Self> {
        let Some(dir) = data_dir else {
            return Ok(Self::Remote { code: code.into() });
        };
        ["xlsx", "xls"]
            .iter()
            .map(|ext| dir.join(format!("{code}.{ext}")))
            .find(|p| p.is_file())
            .map(Self::File)
            .ok_or_else(|| {
                AnalysisError::fetch(
                    code,
                    format!("no {code}.xlsx or {code}.xls in {}", dir.display()),
                )
            })
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        Self::with_base_url("https://api.worldbank.org/v2/en")
    }
}

// Allow -, _, . unescaped in codes (indicator ids are dotted)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Download URL for an indicator spreadsheet.
pub fn indicator_url(base_url: &str, code: &str) -> String {
    format!(
        "{}/indicator/{}?downloadformat=excel",
        base_url.trim_end_matches('/'),
        percent_encoding::utf8_percent_encode(code.trim(), SAFE)
    )
}

/// Upper bound on one download, connect included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

impl Client {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        // Builder only fails when the TLS backend cannot initialize; fall back to defaults then.
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("wdi-explore/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| HttpClient::new());
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    /// Fetch the raw workbook bytes for a source.
    ///
    /// ### Errors
    /// - Network error or non-success HTTP status
    /// - File read error
    pub fn fetch(&self, source: &SpreadsheetSource) -> Result<Vec<u8>> {
        match source {
            SpreadsheetSource::Remote { code } => self.download(code),
            SpreadsheetSource::File(path) => std::fs::read(path)
                .map_err(|e| AnalysisError::fetch(path.display().to_string(), e)),
        }
    }

    fn download(&self, code: &str) -> Result<Vec<u8>> {
        let url = indicator_url(&self.base_url, code);
        log::debug!("GET {url}");
        let resp = self
            .http
            .get(&url)
            .send()
            .map_err(|e| AnalysisError::fetch(&url, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AnalysisError::fetch(
                &url,
                format!("request failed with HTTP {status}"),
            ));
        }
        let bytes = resp.bytes().map_err(|e| AnalysisError::fetch(&url, e))?;
        log::debug!("downloaded {} bytes for {code}", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_keeps_dotted_codes_and_trims_slash() {
        assert_eq!(
            indicator_url("https://example.org/v2/en/", "EN.ATM.CO2E.PC"),
            "https://example.org/v2/en/indicator/EN.ATM.CO2E.PC?downloadformat=excel"
        );
        assert_eq!(
            indicator_url("http://x", "A B"),
            "http://x/indicator/A%20B?downloadformat=excel"
        );
    }

    #[test]
    fn data_dir_resolution_prefers_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("AG.LND.FRST.ZS.xls"), b"x").unwrap();
        let src = SpreadsheetSource::for_code("AG.LND.FRST.ZS", Some(dir.path())).unwrap();
        assert_eq!(
            src,
            SpreadsheetSource::File(dir.path().join("AG.LND.FRST.ZS.xls"))
        );
        assert!(SpreadsheetSource::for_code("NOPE", Some(dir.path())).is_err());
        assert_eq!(
            SpreadsheetSource::for_code("NOPE", None).unwrap(),
            SpreadsheetSource::Remote {
                code: "NOPE".into()
            }
        );
    }

    #[test]
    fn refused_download_fails_once_without_waiting() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let c = Client::with_base_url(format!("http://127.0.0.1:{port}/"));
        let started = std::time::Instant::now();
        let e = c.fetch(&SpreadsheetSource::Remote {
            code: "NY.GDP.MKTP.KD.ZG".into(),
        });
        assert!(matches!(e, Err(AnalysisError::Fetch { .. })));
        assert!(started.elapsed() < CONNECT_TIMEOUT);
    }

    #[test]
    fn missing_file_is_fetch_error() {
        let c = Client::default();
        let e = c.fetch(&SpreadsheetSource::File("/definitely/not/here.xlsx".into()));
        assert!(matches!(e, Err(AnalysisError::Fetch { .. })));
    }
}
