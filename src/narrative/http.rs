// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! HTTP narrative generator.
//!
//! POSTs the fact bundle as JSON to a configured endpoint and parses
//! the response as a [`Narrative`]. Every failure surfaces as a
//! recoverable [`ReportError::Narrative`] so the pipeline can fall
//! back to deterministic copy.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::errors::ReportError;

use super::{FactBundle, Narrative, NarrativeGenerator};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Narrative generator backed by an external HTTP service.
pub struct HttpNarrativeGenerator {
    client: Client,
    endpoint: String,
}

impl HttpNarrativeGenerator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl NarrativeGenerator for HttpNarrativeGenerator {
    async fn generate(&self, facts: &FactBundle) -> Result<Narrative, ReportError> {
        debug!(endpoint = %self.endpoint, week = %facts.iso_label, "requesting narrative");
        let response = self
            .client
            .post(&self.endpoint)
            .json(facts)
            .send()
            .await
            .map_err(|e| ReportError::Narrative(format!("narrative request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %self.endpoint, %status, "narrative service returned error status");
            return Err(ReportError::Narrative(format!(
                "narrative service returned {status}"
            )));
        }

        response
            .json::<Narrative>()
            .await
            .map_err(|e| ReportError::Narrative(format!("parsing narrative response: {e}")))
    }

    fn generator_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_response_parses() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/narrative")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"headline": "Strong week", "model": "svc-1"}"#)
            .create_async()
            .await;

        let generator = HttpNarrativeGenerator::new(format!("{}/narrative", server.url()));
        let narrative = generator.generate(&FactBundle::default()).await.unwrap();
        assert_eq!(narrative.headline, "Strong week");
        assert_eq!(narrative.model, "svc-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_recoverable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/narrative")
            .with_status(503)
            .create_async()
            .await;

        let generator = HttpNarrativeGenerator::new(format!("{}/narrative", server.url()));
        let err = generator
            .generate(&FactBundle::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Narrative(_)));
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_narrative_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/narrative")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json at all")
            .create_async()
            .await;

        let generator = HttpNarrativeGenerator::new(format!("{}/narrative", server.url()));
        let err = generator
            .generate(&FactBundle::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Narrative(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_generator_name() {
        let generator = HttpNarrativeGenerator::new("http://localhost/narrative");
        assert_eq!(generator.generator_name(), "http");
    }
}
