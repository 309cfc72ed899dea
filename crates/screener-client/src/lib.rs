// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reqwest::blocking::Client as HttpClient;
use screener_app::{DetailResponse, RetrievalFailure};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_DETAIL_PATH: &str = "/api/resume_detail";
pub const KEY_PARAM: &str = "file";

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    detail_path: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, detail_path: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("server.base_url must not be empty");
        }
        let base_url =
            Url::parse(trimmed).with_context(|| format!("parse server.base_url {trimmed:?}"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "server.base_url {trimmed:?} must use http or https, got {}",
                base_url.scheme()
            );
        }
        if base_url.cannot_be_a_base() {
            bail!("server.base_url {trimmed:?} is not a base URL");
        }

        let detail_path = detail_path.trim();
        if detail_path.is_empty() {
            bail!("server.detail_path must not be empty");
        }
        let detail_path = if detail_path.starts_with('/') {
            detail_path.to_owned()
        } else {
            format!("/{detail_path}")
        };

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            detail_path,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn detail_path(&self) -> &str {
        &self.detail_path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Lookup URL for `key`, with the key percent-encoded into the query.
    pub fn detail_url(&self, key: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url(), self.detail_path))
            .with_context(|| format!("build detail URL from {}", self.base_url()))?;
        url.query_pairs_mut().append_pair(KEY_PARAM, key);
        Ok(url)
    }

    /// Performs one lookup. The response is returned as decoded even when it
    /// reports `ok = false`; transport errors, non-2xx statuses and bodies that
    /// are not a detail object come back as [`RetrievalFailure`].
    pub fn fetch_detail(
        &self,
        key: &str,
    ) -> std::result::Result<DetailResponse, RetrievalFailure> {
        let url = self
            .detail_url(key)
            .map_err(|error| RetrievalFailure::Transport(format!("{error:#}")))?;
        debug!(url = url.as_str(), "fetching resume detail");

        let response = self
            .http
            .get(url)
            .send()
            .map_err(|error| classify_error(self.base_url(), error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalFailure::Status(status.as_u16()));
        }

        let body = response
            .text()
            .map_err(|error| classify_error(self.base_url(), error))?;
        serde_json::from_str(&body).map_err(|error| RetrievalFailure::Decode(error.to_string()))
    }

    /// Startup reachability check; any HTTP answer counts as reachable.
    pub fn ping(&self) -> Result<()> {
        self.http
            .get(self.base_url.clone())
            .send()
            .map_err(|error| connection_error(self.base_url(), error))?;
        Ok(())
    }
}

fn classify_error(base_url: &str, error: reqwest::Error) -> RetrievalFailure {
    if error.is_timeout() {
        return RetrievalFailure::Timeout;
    }
    RetrievalFailure::Transport(connection_error(base_url, error).to_string())
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- is the screener server running? ({})",
        base_url,
        error
    )
}
