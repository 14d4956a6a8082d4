//! Assembles OTLP traces from decoded GitLab events

use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::common::v1::{InstrumentationScope, KeyValue};
use opentelemetry_proto::tonic::resource::v1::Resource;
use opentelemetry_proto::tonic::trace::v1::{ResourceSpans, ScopeSpans, Span, Status};

use crate::attrs;
use crate::error::Result;
use crate::ids::{self, SpanId, TraceId, ZERO_SPAN_ID};
use crate::model::{GitlabEvent, GitlabPipelineEvent};
use crate::timestamp::parse_gitlab_time;

/// Builds the trace for one delivery, or `None` for event kinds that carry
/// nothing worth a trace of their own.
pub fn build_trace(event: &GitlabEvent) -> Result<Option<ExportTraceServiceRequest>> {
    match event {
        GitlabEvent::Pipeline(pipeline_event) => pipeline_trace(pipeline_event).map(Some),
        // Job events repeat data the final pipeline event already carries;
        // translating them too would duplicate spans.
        GitlabEvent::Job(_) => Ok(None),
    }
}

/// One trace per finished pipeline: a root span for the pipeline plus one
/// child span per job that itself finished.
pub fn pipeline_trace(event: &GitlabPipelineEvent) -> Result<ExportTraceServiceRequest> {
    let pipeline = &event.pipeline;
    let (trace_id, root_span_id) =
        ids::trace_root_ids(&pipeline.sha, &pipeline.id.to_string(), &pipeline.finished_at)?;

    let mut spans = Vec::with_capacity(event.jobs.len() + 1);
    spans.push(make_span(
        &trace_id,
        &root_span_id,
        &ZERO_SPAN_ID,
        format!("Gitlab Pipeline: {} - {}", pipeline.id, pipeline.url),
        parse_gitlab_time(&pipeline.created_at)?,
        parse_gitlab_time(&pipeline.finished_at)?,
        attrs::pipeline_attributes(event),
        attrs::classify_status(&pipeline.status),
    ));

    for job in &event.jobs {
        // Manual or skipped jobs can stay unfinished in a finished pipeline;
        // they get no span.
        if job.finished_at.is_empty() {
            continue;
        }
        let job_url = format!("{}/jobs/{}", event.project.url, job.id);
        spans.push(make_span(
            &trace_id,
            &ids::random_span_id(),
            &root_span_id,
            format!("Job: {} - {} - Stage: {}", job.name, job.id, job.stage),
            parse_gitlab_time(&job.started_at)?,
            parse_gitlab_time(&job.finished_at)?,
            attrs::job_attributes(job, &job_url),
            attrs::classify_status(&job.status),
        ));
    }

    Ok(wrap_spans(event, spans))
}

#[allow(clippy::too_many_arguments)]
fn make_span(
    trace_id: &TraceId,
    span_id: &SpanId,
    parent_span_id: &SpanId,
    name: String,
    start_time_unix_nano: u64,
    end_time_unix_nano: u64,
    attributes: Vec<KeyValue>,
    status: Status,
) -> Span {
    let parent_span_id = if parent_span_id == &ZERO_SPAN_ID {
        Vec::new()
    } else {
        parent_span_id.to_vec()
    };
    Span {
        trace_id: trace_id.to_vec(),
        span_id: span_id.to_vec(),
        parent_span_id,
        name,
        start_time_unix_nano,
        end_time_unix_nano,
        attributes,
        status: Some(status),
        ..Default::default()
    }
}

fn wrap_spans(event: &GitlabPipelineEvent, spans: Vec<Span>) -> ExportTraceServiceRequest {
    ExportTraceServiceRequest {
        resource_spans: vec![ResourceSpans {
            resource: Some(Resource {
                attributes: attrs::resource_attributes(event),
                ..Default::default()
            }),
            scope_spans: vec![ScopeSpans {
                scope: Some(InstrumentationScope {
                    name: env!("CARGO_PKG_NAME").to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    ..Default::default()
                }),
                spans,
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
}

#[cfg(test)]
mod tests {
    use opentelemetry_proto::tonic::trace::v1::status::StatusCode;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{Job, Pipeline, Project};

    fn finished_event() -> GitlabPipelineEvent {
        GitlabPipelineEvent {
            kind: "pipeline".to_string(),
            pipeline: Pipeline {
                id: 1234567890,
                git_ref: "main".to_string(),
                status: "success".to_string(),
                sha: "abc123".to_string(),
                url: "https://gitlab.example.com/group/app/-/pipelines/1234567890".to_string(),
                created_at: "2024-01-01 12:30:15 UTC".to_string(),
                finished_at: "2024-01-01 12:40:15 UTC".to_string(),
                ..Default::default()
            },
            jobs: vec![
                Job {
                    id: 7961245403,
                    name: "job1".to_string(),
                    stage: "build".to_string(),
                    status: "success".to_string(),
                    started_at: "2024-01-01 12:30:20 UTC".to_string(),
                    finished_at: "2024-01-01 12:35:00 UTC".to_string(),
                    ..Default::default()
                },
                Job {
                    id: 7961245404,
                    name: "job2".to_string(),
                    stage: "deploy".to_string(),
                    status: "failed".to_string(),
                    started_at: "2024-01-01 12:35:05 UTC".to_string(),
                    finished_at: "2024-01-01 12:40:10 UTC".to_string(),
                    ..Default::default()
                },
                Job {
                    id: 7961245405,
                    name: "manual-job".to_string(),
                    stage: "deploy".to_string(),
                    status: "manual".to_string(),
                    ..Default::default()
                },
            ],
            project: Project {
                id: 5,
                name: "app".to_string(),
                path: "group/app".to_string(),
                url: "https://gitlab.example.com/group/app".to_string(),
            },
            ..Default::default()
        }
    }

    fn all_spans(trace: &ExportTraceServiceRequest) -> &[Span] {
        &trace.resource_spans[0].scope_spans[0].spans
    }

    #[test]
    fn test_trace_shape_and_parenthood() {
        let trace = pipeline_trace(&finished_event()).unwrap();

        assert_eq!(trace.resource_spans.len(), 1);
        assert_eq!(trace.resource_spans[0].scope_spans.len(), 1);

        let spans = all_spans(&trace);
        // Root plus two finished jobs; the manual job has no span.
        assert_eq!(spans.len(), 3);

        let root = &spans[0];
        assert_eq!(root.trace_id.len(), 16);
        assert_eq!(root.span_id.len(), 8);
        assert!(root.parent_span_id.is_empty());
        assert_eq!(
            root.name,
            "Gitlab Pipeline: 1234567890 - https://gitlab.example.com/group/app/-/pipelines/1234567890"
        );

        for child in &spans[1..] {
            assert_eq!(child.trace_id, root.trace_id);
            assert_eq!(child.parent_span_id, root.span_id);
            assert_ne!(child.span_id, root.span_id);
        }
        assert_ne!(spans[1].span_id, spans[2].span_id);
        assert_eq!(spans[1].name, "Job: job1 - 7961245403 - Stage: build");
    }

    #[test]
    fn test_span_times_and_status() {
        let trace = pipeline_trace(&finished_event()).unwrap();
        let spans = all_spans(&trace);

        let root = &spans[0];
        assert_eq!(root.start_time_unix_nano, 1_704_112_215_000_000_000);
        assert_eq!(root.end_time_unix_nano, 1_704_112_815_000_000_000);
        assert_eq!(root.status.as_ref().unwrap().code, StatusCode::Ok as i32);

        let failed_deploy = &spans[2];
        assert_eq!(failed_deploy.status.as_ref().unwrap().code, StatusCode::Error as i32);
        assert_eq!(failed_deploy.status.as_ref().unwrap().message, "failed");
    }

    #[test]
    fn test_retries_reuse_identity_but_not_child_ids() {
        let event = finished_event();
        let first = pipeline_trace(&event).unwrap();
        let second = pipeline_trace(&event).unwrap();

        let first_spans = all_spans(&first);
        let second_spans = all_spans(&second);
        assert_eq!(first_spans[0].trace_id, second_spans[0].trace_id);
        assert_eq!(first_spans[0].span_id, second_spans[0].span_id);
        assert_ne!(first_spans[1].span_id, second_spans[1].span_id);
    }

    #[test]
    fn test_missing_sha_is_an_error() {
        let mut event = finished_event();
        event.pipeline.sha.clear();
        assert!(pipeline_trace(&event).is_err());
    }

    #[test]
    fn test_job_event_builds_no_trace() {
        let event = GitlabEvent::Job(Default::default());
        assert_eq!(build_trace(&event).unwrap(), None);
    }

    #[test]
    fn test_unparseable_job_time_is_an_error() {
        let mut event = finished_event();
        event.jobs[0].started_at = "last tuesday".to_string();
        assert!(pipeline_trace(&event).is_err());
    }
}
