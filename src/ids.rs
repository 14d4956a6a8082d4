//! Deterministic trace identity derived from pipeline facts

use sha2::{Digest, Sha256};

use crate::error::{BridgeError, Result};

pub type TraceId = [u8; 16];
pub type SpanId = [u8; 8];

/// Sentinel for "no parent"; serialized as an empty parent span id.
pub const ZERO_SPAN_ID: SpanId = [0u8; 8];

/// Derives the trace id and root span id for a finished pipeline.
///
/// Both ids come from a single SHA-256 digest over the commit sha, the
/// pipeline id and the pipeline finish time, so retried deliveries of the
/// same pipeline always map to the same trace. The trace id is the first
/// 16 digest bytes, the root span id the following 8.
pub fn trace_root_ids(
    commit_sha: &str,
    pipeline_id: &str,
    finished_at: &str,
) -> Result<(TraceId, SpanId)> {
    if commit_sha.is_empty() || pipeline_id.is_empty() || finished_at.is_empty() {
        return Err(BridgeError::InvalidIdentityInput);
    }

    let mut hasher = Sha256::new();
    hasher.update(commit_sha.as_bytes());
    hasher.update(pipeline_id.as_bytes());
    hasher.update(finished_at.as_bytes());
    let digest = hasher.finalize();

    let mut trace_id = [0u8; 16];
    trace_id.copy_from_slice(&digest[..16]);
    let mut root_span_id = [0u8; 8];
    root_span_id.copy_from_slice(&digest[16..24]);

    Ok((trace_id, root_span_id))
}

/// Returns a fresh random span id for a child span.
pub fn random_span_id() -> SpanId {
    rand::random()
}
