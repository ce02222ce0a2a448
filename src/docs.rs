//! Blocking client for the heatmap library's README, shown as in-app documentation.
//!
//! Server errors are retried with a short backoff; client errors fail at once.
//!
//! ```no_run
//! # use rubix_rs::docs::DocsClient;
//! let text = DocsClient::new()?.fetch_readme()?;
//! println!("{}", text);
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result, bail};
use log::debug;
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

pub const DEFAULT_README_URL: &str =
    "https://raw.githubusercontent.com/Advestis/adrubix/master/README.md";

#[derive(Debug, Clone)]
pub struct DocsClient {
    pub url: String,
    http: HttpClient,
}

impl DocsClient {
    pub fn new() -> Result<Self> {
        Self::with_url(DEFAULT_README_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(5))
            .user_agent(concat!("rubix_rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            url: url.into(),
            http,
        })
    }

    /// Download the README as plain text.
    pub fn fetch_readme(&self) -> Result<String> {
        let mut last_err: Option<anyhow::Error> = None;
        for backoff_ms in [100u64, 300, 700] {
            match self.http.get(&self.url).send() {
                Ok(r) if r.status().is_success() => {
                    return r.text().with_context(|| format!("read body of {}", self.url));
                }
                Ok(r) if r.status().is_server_error() => {
                    debug!("GET {} -> {}, retrying", self.url, r.status());
                }
                Ok(r) => bail!("GET {} failed with HTTP {}", self.url, r.status()),
                Err(e) => last_err = Some(e.into()),
            }
            std::thread::sleep(Duration::from_millis(backoff_ms));
        }
        bail!("network error fetching {}: {:?}", self.url, last_err);
    }

    /// Run [`fetch_readme`](Self::fetch_readme) on a worker thread; the result arrives on the receiver.
    pub fn fetch_in_background(self) -> mpsc::Receiver<Result<String>> {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let _ = sender.send(self.fetch_readme());
        });
        receiver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_with_custom_url() {
        let c = DocsClient::with_url("http://127.0.0.1:9/README.md").unwrap();
        assert_eq!(c.url, "http://127.0.0.1:9/README.md");
    }

    #[test]
    fn background_fetch_returns_before_the_request_ends() {
        let rx = DocsClient::with_url("http://127.0.0.1:9/README.md")
            .unwrap()
            .fetch_in_background();
        // retries back off for over a second before giving up
        assert!(matches!(rx.try_recv(), Err(mpsc::TryRecvError::Empty)));
        let res = rx.recv_timeout(Duration::from_secs(60)).unwrap();
        assert!(res.is_err());
    }
}
