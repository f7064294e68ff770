use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::collect::global_variables::{
    ACTIVATION_MAX_POLLS, ACTIVATION_POLL_SECS, PLANET_API_URL, PL_API_KEY_ENV, SEARCH_PAGE_SIZE,
};

/// One page of quick-search results.
#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(rename = "_links")]
    links: PageLinks,
    features: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct PageLinks {
    #[serde(rename = "_next")]
    next: Option<String>,
}

/// Client for the Planet Data API.
///
/// Constructed explicitly and passed by reference into whatever needs the
/// catalog, so no process-wide session state exists. Requests authenticate
/// with HTTP basic auth, the API key as user name.
pub struct PlanetCollect {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl PlanetCollect {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, PLANET_API_URL)
    }

    /// Read the API key from the `PL_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(PL_API_KEY_ENV)
            .with_context(|| format!("{} is not set", PL_API_KEY_ENV))?;
        Self::new(api_key)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .with_context(|| format!("invalid Data API base URL: {}", base_url))?;
        // Url::join drops the last path segment without this.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(PlanetCollect {
            client: Client::new(),
            api_key: api_key.into(),
            base_url,
        })
    }

    /// Run a quick search and drain its result pages.
    ///
    /// Follows `_links._next` until `limit` items were collected or the
    /// catalog has no further page. Returns the raw item records.
    pub fn quick_search(&self, request: &Value, sort: &str, limit: usize) -> Result<Vec<Value>> {
        let mut url = self.endpoint("quick-search")?;
        url.query_pairs_mut()
            .append_pair("_sort", sort)
            .append_pair("_page_size", &SEARCH_PAGE_SIZE.to_string());

        let response = self
            .client
            .post(url)
            .basic_auth(&self.api_key, Some(""))
            .json(request)
            .send()
            .context("quick-search request failed")?;
        let mut page: SearchPage = decode_page(response)?;

        let mut items: Vec<Value> = Vec::new();
        loop {
            let page_count = page.features.len();
            items.extend(page.features.into_iter().take(limit - items.len()));
            if items.len() >= limit || page_count == 0 {
                break;
            }
            let next = match page.links.next {
                Some(next) => next,
                None => break,
            };
            debug!("following next search page: {}", next);
            let response = self
                .client
                .get(&next)
                .basic_auth(&self.api_key, Some(""))
                .send()
                .context("quick-search pagination request failed")?;
            page = decode_page(response)?;
        }
        debug!("quick-search returned {} items", items.len());
        Ok(items)
    }

    /// Asset map for one catalog item.
    pub fn assets(&self, item_type: &str, item_id: &str) -> Result<Value> {
        let url = self.endpoint(&format!("item-types/{}/items/{}/assets", item_type, item_id))?;
        self.get_json(url.as_str())
    }

    /// Request activation of one asset. Activation is idempotent on the API
    /// side; an already active asset simply stays active.
    pub fn activate(&self, asset: &Value) -> Result<()> {
        let link = asset
            .pointer("/_links/activate")
            .and_then(Value::as_str)
            .context("asset has no activation link")?;
        let response = self
            .client
            .post(link)
            .basic_auth(&self.api_key, Some(""))
            .send()
            .context("activation request failed")?;
        if !response.status().is_success() {
            bail!("activation request returned {}", response.status());
        }
        Ok(())
    }

    /// Poll an item's asset until it reports `active`, then return it.
    pub fn await_active(
        &self,
        item_type: &str,
        item_id: &str,
        asset_type: &str,
        poll_interval: Duration,
        max_polls: u32,
    ) -> Result<Value> {
        for poll in 0..max_polls {
            let assets = self.assets(item_type, item_id)?;
            let asset = assets
                .get(asset_type)
                .with_context(|| format!("item {} has no {} asset", item_id, asset_type))?;
            match asset.get("status").and_then(Value::as_str) {
                Some("active") => return Ok(asset.clone()),
                Some("inactive") => self.activate(asset)?,
                _ => {}
            }
            debug!(
                "asset {}:{} not active yet (poll {}/{})",
                item_id,
                asset_type,
                poll + 1,
                max_polls
            );
            thread::sleep(poll_interval);
        }
        bail!(
            "asset {}:{} did not become active within {} polls",
            item_id,
            asset_type,
            max_polls
        )
    }

    /// Download an active asset into `dest_dir`, named after the item id.
    pub fn download(&self, asset: &Value, item_id: &str, dest_dir: &Path) -> Result<PathBuf> {
        let location = asset
            .get("location")
            .and_then(Value::as_str)
            .context("asset has no download location, was it activated?")?;
        std::fs::create_dir_all(dest_dir)
            .with_context(|| format!("failed to create {}", dest_dir.display()))?;
        let dest = dest_dir.join(format!("{}.tif", item_id));

        let response = self
            .client
            .get(location)
            .basic_auth(&self.api_key, Some(""))
            .send()
            .context("download request failed")?;
        if !response.status().is_success() {
            bail!("download returned {}", response.status());
        }

        let progress = ProgressBar::new(response.content_length().unwrap_or(0));
        progress.set_style(
            ProgressStyle::with_template("{bar:40} {bytes}/{total_bytes} {bytes_per_sec}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        let mut reader = progress.wrap_read(response);
        let mut file =
            File::create(&dest).with_context(|| format!("failed to create {}", dest.display()))?;
        io::copy(&mut reader, &mut file)
            .with_context(|| format!("failed to write {}", dest.display()))?;
        progress.finish_and_clear();

        info!("downloaded {} to {}", item_id, dest.display());
        Ok(dest)
    }

    /// Activate, wait for, and download one scene's asset. The activation
    /// pipeline is keyed by the item id and strictly sequential.
    pub fn download_scene(&self, scene: &Value, asset_type: &str, dest_dir: &Path) -> Result<PathBuf> {
        let item_id = scene
            .get("id")
            .and_then(Value::as_str)
            .context("scene record has no id")?;
        let item_type = scene
            .pointer("/properties/item_type")
            .and_then(Value::as_str)
            .with_context(|| format!("scene {} has no properties.item_type", item_id))?;
        let asset = self.await_active(
            item_type,
            item_id,
            asset_type,
            Duration::from_secs(ACTIVATION_POLL_SECS),
            ACTIVATION_MAX_POLLS,
        )?;
        self.download(&asset, item_id, dest_dir)
    }

    fn get_json(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.api_key, Some(""))
            .send()
            .with_context(|| format!("GET {} failed", url))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("Data API returned {} for {}: {}", status, url, body);
        }
        response
            .json()
            .with_context(|| format!("failed to decode response from {}", url))
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("invalid endpoint path: {}", path))
    }
}

fn decode_page(response: reqwest::blocking::Response) -> Result<SearchPage> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        bail!("Data API returned {}: {}", status, body);
    }
    response.json().context("failed to decode search page")
}
