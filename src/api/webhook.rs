//! Webhook handler for GitLab pipeline events

use axum::body::Bytes;
use axum::extract::State as AxumState;
use axum::http::{HeaderMap, Method, StatusCode, header};
use tracing::{debug, error, info};

use crate::SharedState;
use crate::error::{BridgeError, Result};
use crate::gate::{self, Disposition};
use crate::model::{GitlabEvent, PIPELINE_HOOK};
use crate::spans;

/// Header GitLab stamps on every delivery.
const GITLAB_EVENT_HEADER: &str = "X-Gitlab-Event";
const SUPPORTED_CONTENT_TYPE: &str = "application/json";

/// Handles one webhook delivery end to end: validate, decode, gate,
/// translate, hand off to the sink.
pub async fn handle_webhook(
    AxumState(state): AxumState<SharedState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    if let Err(e) = validate_request(&method, &headers) {
        error!("Invalid request: {}", e);
        return (StatusCode::BAD_REQUEST, "Invalid request");
    }

    // validate_request guarantees the header is present and supported.
    let event_type = headers
        .get(GITLAB_EVENT_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let event = match GitlabEvent::decode(event_type, &body) {
        Ok(event) => event,
        Err(e) => {
            error!("Error decoding the request: {}", e);
            return (StatusCode::BAD_REQUEST, "Unable to handle the request");
        }
    };

    let pipeline_event = match &event {
        GitlabEvent::Pipeline(pipeline_event) => pipeline_event,
        GitlabEvent::Job(job_event) => {
            // Job hooks repeat what the pipeline event carries; acknowledge
            // and move on.
            debug!("Ignoring job hook for job {}", job_event.id);
            return (StatusCode::OK, "OK");
        }
    };

    let pipeline = &pipeline_event.pipeline;
    match gate::evaluate(pipeline, &state.config.traces.refs) {
        Disposition::Filtered => {
            info!(
                "Ref {:?} of pipeline {} is not configured to be exported",
                pipeline.git_ref, pipeline.id
            );
            (StatusCode::OK, "Not configured to be exported")
        }
        Disposition::Suppressed => {
            debug!("Pipeline {} has not finished yet, skipping", pipeline.id);
            (StatusCode::OK, "OK")
        }
        Disposition::Export => match export_trace(&state, &event).await {
            Ok(()) => (StatusCode::OK, "OK"),
            Err(e) => {
                error!("Unable to export the trace: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Unable to export the trace")
            }
        },
    }
}

/// Checks method and headers the way GitLab sends real deliveries.
fn validate_request(method: &Method, headers: &HeaderMap) -> Result<()> {
    if method != Method::POST {
        return Err(BridgeError::MalformedRequest(format!(
            "unsupported method: {method}"
        )));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    if content_type != Some(SUPPORTED_CONTENT_TYPE) {
        return Err(BridgeError::MalformedRequest(format!(
            "unsupported content type: {content_type:?}"
        )));
    }

    let event_type = headers.get(GITLAB_EVENT_HEADER).and_then(|v| v.to_str().ok());
    if event_type != Some(PIPELINE_HOOK) {
        return Err(BridgeError::MalformedRequest(format!(
            "unsupported event type: {event_type:?}"
        )));
    }

    Ok(())
}

async fn export_trace(state: &SharedState, event: &GitlabEvent) -> Result<()> {
    let Some(trace) = spans::build_trace(event)? else {
        return Ok(());
    };
    let span_count: usize = trace
        .resource_spans
        .iter()
        .flat_map(|rs| rs.scope_spans.iter())
        .map(|ss| ss.spans.len())
        .sum();
    state.sink.consume(trace).await?;
    info!("Exported a trace with {} spans", span_count);
    Ok(())
}
