//! Trace delivery to an OTLP/HTTP collector

use std::time::Duration;

use async_trait::async_trait;
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use prost::Message;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::config::OtlpConfig;
use crate::error::{BridgeError, Result};

const OTLP_CONTENT_TYPE: &str = "application/x-protobuf";

/// Where finished traces go. Object-safe so tests can swap in a recorder.
#[async_trait]
pub trait TraceSink: Send + Sync {
    /// Delivers one trace; either every span lands or the call fails.
    async fn consume(&self, trace: ExportTraceServiceRequest) -> Result<()>;
}

/// Posts protobuf-encoded traces to a collector's `/v1/traces` endpoint.
pub struct OtlpHttpSink {
    client: reqwest::Client,
    traces_url: String,
    headers: Vec<(String, String)>,
}

impl OtlpHttpSink {
    pub fn new(config: &OtlpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| BridgeError::SinkFailure(format!("build http client: {e}")))?;
        let traces_url = format!("{}/v1/traces", config.endpoint.trim_end_matches('/'));
        let headers = config
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        Ok(Self {
            client,
            traces_url,
            headers,
        })
    }
}

#[async_trait]
impl TraceSink for OtlpHttpSink {
    async fn consume(&self, trace: ExportTraceServiceRequest) -> Result<()> {
        let body = trace.encode_to_vec();
        debug!("Exporting {} bytes to {}", body.len(), self.traces_url);

        let mut request = self
            .client
            .post(&self.traces_url)
            .header(CONTENT_TYPE, OTLP_CONTENT_TYPE)
            .body(body);
        for (name, value) in &self.headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BridgeError::SinkFailure(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::SinkFailure(format!("collector returned {status}")));
        }
        Ok(())
    }
}
