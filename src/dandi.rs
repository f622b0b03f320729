//! Remote dataset access through the DANDI archive REST API.
//!
//! Resolves a (dandiset id, asset path) pair to a downloadable asset and
//! streams it to disk. The downloaded recordings are NWB files; parsing
//! them is outside this crate, which consumes spike and behavior tables
//! exported from them (see [`crate::io`]).

use std::fs::File;
use std::path::Path;

use serde::Deserialize;

use crate::error::FcError;

/// Base URL of the DANDI archive API.
pub const DANDI_API_URL: &str = "https://api.dandiarchive.org/api";

/// One asset record as returned by the asset-listing endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Asset {
    /// The archive-wide identifier of the asset.
    pub asset_id: String,
    /// The path of the asset within its dandiset.
    pub path: String,
    /// The size of the asset in bytes.
    pub size: u64,
}

#[derive(Debug, Deserialize)]
struct AssetPage {
    results: Vec<Asset>,
}

/// A handle on one remote recording of a DANDI dataset.
#[derive(Debug)]
pub struct DandiClient {
    dandiset_id: String,
    filepath: String,
    version: String,
    api_url: String,
    http: reqwest::blocking::Client,
}

impl DandiClient {
    /// Create a client for the given dandiset and asset path, using the
    /// "draft" version of the dandiset.
    pub fn new(dandiset_id: &str, filepath: &str) -> Result<Self, FcError> {
        Self::with_version(dandiset_id, filepath, "draft")
    }

    /// Create a client for the given dandiset, asset path and version.
    pub fn with_version(
        dandiset_id: &str,
        filepath: &str,
        version: &str,
    ) -> Result<Self, FcError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("functional_connectivity/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FcError::Remote(format!("Cannot build HTTP client: {}", e)))?;

        Ok(DandiClient {
            dandiset_id: dandiset_id.to_string(),
            filepath: filepath.to_string(),
            version: version.to_string(),
            api_url: DANDI_API_URL.to_string(),
            http,
        })
    }

    /// Point the client at a different API root, e.g. a staging deployment.
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    /// Resolve the asset matching the configured path.
    pub fn resolve_asset(&self) -> Result<Asset, FcError> {
        let url = format!(
            "{}/dandisets/{}/versions/{}/assets/",
            self.api_url, self.dandiset_id, self.version
        );
        let page: AssetPage = self
            .http
            .get(&url)
            .query(&[("path", self.filepath.as_str())])
            .send()
            .map_err(|e| FcError::Remote(format!("Asset listing request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| FcError::Remote(format!("Asset listing request failed: {}", e)))?
            .json()
            .map_err(|e| FcError::Remote(format!("Cannot decode asset listing: {}", e)))?;

        page.results
            .into_iter()
            .find(|asset| asset.path == self.filepath)
            .ok_or_else(|| {
                FcError::Remote(format!(
                    "No asset at path {} in dandiset {}",
                    self.filepath, self.dandiset_id
                ))
            })
    }

    /// The download URL of the asset; it redirects to the blob store.
    pub fn download_url(&self, asset: &Asset) -> String {
        format!("{}/assets/{}/download/", self.api_url, asset.asset_id)
    }

    /// Download the configured asset to the given local path.
    pub fn download_to(&self, target: &Path) -> Result<Asset, FcError> {
        let asset = self.resolve_asset()?;
        log::info!("This dataset is of size {}.", human_bytes(asset.size));

        let mut response = self
            .http
            .get(self.download_url(&asset))
            .send()
            .map_err(|e| FcError::Remote(format!("Download request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| FcError::Remote(format!("Download request failed: {}", e)))?;

        let mut file = File::create(target)
            .map_err(|e| FcError::Io(format!("Cannot create {}: {}", target.display(), e)))?;
        std::io::copy(&mut response, &mut file)
            .map_err(|e| FcError::Io(format!("Cannot write {}: {}", target.display(), e)))?;

        log::info!("Downloaded {} to {}", asset.path, target.display());
        Ok(asset)
    }
}

/// Format a byte count in human-readable binary units.
pub fn human_bytes(size: u64) -> String {
    const UNITS: [&str; 9] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB", "YiB"];
    let mut value = size as f64;
    for unit in &UNITS[..UNITS.len() - 1] {
        if value < 1024.0 {
            return format!("{:.1} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.1} {}", value, UNITS[UNITS.len() - 1])
}
