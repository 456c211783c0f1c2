// ============================================================
// Layer 6 - Remote Model Store
// ============================================================
// Read-only access to a model published over HTTP(S).
//
// The URL names the manifest (…/model.json). Shard names listed
// in the manifest are resolved relative to that URL, the way a
// browser resolves relative links.
//
//   exists - HEAD request; any failure means "not available"
//   load   - GET manifest, GET every shard, rebuild the model
//
// Uses reqwest's blocking client: every caller of this layer is
// synchronous, and the client carries a timeout so a stalled host
// cannot hang the session.

use std::time::Duration;

use reqwest::{blocking::Client, Url};

use crate::domain::error::{LabError, LabResult};
use crate::infra::artifact;
use crate::ml::model::TrainedModel;

pub struct RemoteStore {
    client: Client,
}

impl RemoteStore {
    pub fn new(timeout: Duration) -> LabResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("iris-lab/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LabError::Configuration(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// True when the manifest answers a HEAD request with a 2xx status.
    pub fn exists(&self, url: &str) -> bool {
        match self.client.head(url).send() {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!("Remote model check failed for '{}': {}", url, e);
                false
            }
        }
    }

    pub fn load(&self, url: &str) -> LabResult<TrainedModel> {
        let base = Url::parse(url).map_err(|e| LabError::network(url, e))?;

        let manifest = artifact::parse_manifest(&self.fetch(&base)?)?;

        let mut weights = Vec::new();
        for shard in &manifest.weights.shards {
            let shard_url = base.join(shard).map_err(|e| LabError::network(url, e))?;
            artifact::append_shard(&mut weights, &self.fetch(&shard_url)?, manifest.weights.byte_length)?;
        }

        let model = artifact::decode(&manifest, weights)?;
        tracing::info!("Loaded remote model from '{}'", url);
        Ok(model)
    }

    fn fetch(&self, url: &Url) -> LabResult<Vec<u8>> {
        tracing::debug!("GET {}", url);
        let bytes = self
            .client
            .get(url.clone())
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.bytes())
            .map_err(|e| LabError::network(url.as_str(), e))?;
        Ok(bytes.to_vec())
    }
}
