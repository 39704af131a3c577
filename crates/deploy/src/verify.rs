//! Best-effort source verification against an Etherscan-style API.

use anyhow::{Context, Result};
use url::Url;

use crate::{DeploymentRecord, HarnessError};

/// Client for a block-explorer verification endpoint.
#[derive(Debug, Clone)]
pub struct Verifier {
    http: reqwest::Client,
    api_url: Url,
    api_key: String,
}

impl Verifier {
    pub fn new(api_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let api_url = Url::parse(api_url).context("Failed to parse explorer API URL")?;
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            api_url,
            api_key: api_key.into(),
        })
    }

    /// Submit a deployed address and its constructor arguments for source
    /// verification.
    pub async fn submit(&self, record: &DeploymentRecord) -> Result<(), HarnessError> {
        let address = record.address.to_string();
        let params = [
            ("module", "contract"),
            ("action", "verifysourcecode"),
            ("apikey", self.api_key.as_str()),
            ("contractaddress", address.as_str()),
            ("contractname", record.name.as_str()),
            // Etherscan's API spells it this way.
            ("constructorArguements", record.constructor_args.as_str()),
        ];

        let response = self
            .http
            .post(self.api_url.clone())
            .form(&params)
            .send()
            .await
            .map_err(|e| HarnessError::VerificationFailure(e.to_string()))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| HarnessError::VerificationFailure(e.to_string()))?;

        let accepted = body.get("status").and_then(|s| s.as_str()) == Some("1");
        if !accepted {
            let reason = body
                .get("result")
                .and_then(|r| r.as_str())
                .unwrap_or("unknown")
                .to_string();
            return Err(HarnessError::VerificationFailure(reason));
        }
        Ok(())
    }

    /// Submit and swallow the result: verification success is logged, failure
    /// is a warning, and the run always proceeds.
    pub async fn submit_best_effort(&self, record: &DeploymentRecord) {
        match self.submit(record).await {
            Ok(()) => {
                tracing::info!(contract = %record.name, address = %record.address, "Verification submitted")
            }
            Err(e) => {
                tracing::warn!(contract = %record.name, error = %e, "Verification failed; continuing")
            }
        }
    }
}
