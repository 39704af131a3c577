//! Media and metadata publishing to a Pinata-style content-addressed store.
//!
//! For each image in the collection directory: pin the raw bytes, build a
//! metadata record pointing at the resulting content id, pin the record, and
//! collect the record's content id as the token URI. File ordering is stable
//! (lexicographic by file name) so token URIs line up across runs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::HarnessError;

/// Default API base of the pinning service.
pub const DEFAULT_API_URL: &str = "https://api.pinata.cloud/";

/// Pre-pinned token URIs used when media publishing is disabled.
pub const DEFAULT_TOKEN_URIS: [&str; 3] = [
    "ipfs://Qmf6BsW7NYaMhCuXdztXr9o5PjSKPAbKdnRgQrLdejnUTk",
    "ipfs://QmTnL9YdZmP9GnQJAMX5efQEXVAxVJhA2VDHFNo8kxJdBA",
    "ipfs://QmXRwwKKPDCjFPM5L2zvsL7gtxzTqj8B3unAHVtjnJJWKF",
];

/// One trait entry in a token's metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: u64,
}

/// Metadata record pinned alongside each image; its content id becomes the
/// token URI. Never mutated after upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub name: String,
    pub description: String,
    pub image: String,
    pub attributes: Vec<Attribute>,
}

impl MetadataRecord {
    /// Build the record for an image already pinned under `image_hash`.
    pub fn for_image(name: &str, image_hash: &str) -> Self {
        Self {
            name: name.to_string(),
            description: format!("Image of {name}"),
            image: format!("ipfs://{image_hash}"),
            attributes: vec![Attribute {
                trait_type: "Cuteness".to_string(),
                value: 100,
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Client for the pinning service.
#[derive(Debug, Clone)]
pub struct Publisher {
    http: reqwest::Client,
    api_url: Url,
    jwt: String,
}

impl Publisher {
    pub fn new(jwt: impl Into<String>) -> Result<Self> {
        let api_url = Url::parse(DEFAULT_API_URL).context("Failed to parse pinning API URL")?;
        Self::with_api_url(api_url, jwt)
    }

    pub fn with_api_url(api_url: Url, jwt: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            api_url,
            jwt: jwt.into(),
        })
    }

    /// Pin every image in `dir` plus a metadata record per image and return the
    /// token URIs, one per image, in stable file order.
    pub async fn publish_directory(&self, dir: &Path) -> Result<Vec<String>> {
        let files = collect_image_files(dir)?;
        anyhow::ensure!(!files.is_empty(), "No images found in {}", dir.display());

        let mut token_uris = Vec::with_capacity(files.len());
        for path in files {
            let name = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .with_context(|| format!("Image file {} has no usable name", path.display()))?
                .to_string();

            let image_hash = self.pin_file(&path).await?;
            tracing::info!(image = %name, hash = %image_hash, "Image pinned");

            let metadata = MetadataRecord::for_image(&name, &image_hash);
            let metadata_hash = self.pin_json(&metadata).await?;
            tracing::info!(image = %name, hash = %metadata_hash, "Metadata pinned");

            token_uris.push(format!("ipfs://{metadata_hash}"));
        }

        tracing::info!(count = token_uris.len(), "Token URIs published");
        Ok(token_uris)
    }

    /// Pin a single file's raw bytes, returning the content id.
    async fn pin_file(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();

        let form = reqwest::multipart::Form::new()
            .part("file", reqwest::multipart::Part::bytes(bytes).file_name(file_name));

        let endpoint = self
            .api_url
            .join("pinning/pinFileToIPFS")
            .context("Failed to build pin-file endpoint URL")?;
        let response = self
            .http
            .post(endpoint)
            .bearer_auth(&self.jwt)
            .multipart(form)
            .send()
            .await
            .map_err(|e| HarnessError::PublishingUnavailable(e.to_string()))?;

        Self::parse_pin_response(response).await
    }

    /// Pin a structured metadata record, returning the content id.
    async fn pin_json(&self, metadata: &MetadataRecord) -> Result<String> {
        let endpoint = self
            .api_url
            .join("pinning/pinJSONToIPFS")
            .context("Failed to build pin-json endpoint URL")?;
        let response = self
            .http
            .post(endpoint)
            .bearer_auth(&self.jwt)
            .json(metadata)
            .send()
            .await
            .map_err(|e| HarnessError::PublishingUnavailable(e.to_string()))?;

        Self::parse_pin_response(response).await
    }

    async fn parse_pin_response(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(
                HarnessError::PublishingUnavailable(format!("{status}: {body}")).into(),
            );
        }
        let parsed: PinResponse = response
            .json()
            .await
            .map_err(|e| HarnessError::PublishingUnavailable(e.to_string()))?;
        Ok(parsed.ipfs_hash)
    }
}

/// Image files in `dir`, lexicographically ordered by file name.
fn collect_image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list image directory {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .context("Failed to read image directory entry")?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| matches!(ext, "png" | "jpg" | "jpeg" | "svg"))
        })
        .collect();
    files.sort_by_key(|path| path.file_name().map(|n| n.to_os_string()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_metadata_record_shape() {
        let metadata = MetadataRecord::for_image("pug", "QmHash");
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["name"], "pug");
        assert_eq!(json["description"], "Image of pug");
        assert_eq!(json["image"], "ipfs://QmHash");
        assert_eq!(json["attributes"][0]["trait_type"], "Cuteness");
        assert_eq!(json["attributes"][0]["value"], 100);
    }

    #[test]
    fn test_collect_image_files_stable_order() {
        let tmp = TempDir::new("nifty-images").unwrap();
        for name in ["shiba-inu.png", "pug.png", "st-bernard.png", "notes.txt"] {
            std::fs::write(tmp.path().join(name), b"x").unwrap();
        }

        let files = collect_image_files(tmp.path()).unwrap();
        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        // Sorted, and the non-image file is skipped.
        assert_eq!(names, ["pug.png", "shiba-inu.png", "st-bernard.png"]);
    }

    #[test]
    fn test_collect_image_files_missing_dir_fails() {
        assert!(collect_image_files(Path::new("/nonexistent/nifty")).is_err());
    }

    #[test]
    fn test_default_token_uris_are_ipfs() {
        assert_eq!(DEFAULT_TOKEN_URIS.len(), 3);
        assert!(DEFAULT_TOKEN_URIS.iter().all(|uri| uri.starts_with("ipfs://")));
    }
}
