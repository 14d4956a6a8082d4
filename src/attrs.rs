//! Maps GitLab pipeline and job fields onto span attributes

use opentelemetry_proto::tonic::common::v1::{AnyValue, KeyValue, any_value};
use opentelemetry_proto::tonic::trace::v1::{Status, status};

use crate::model::{GitlabPipelineEvent, Job};
use crate::semconv;

/// `object_attributes.source` value marking a downstream pipeline.
const PARENT_PIPELINE_SOURCE: &str = "parent_pipeline";

/// The only pipeline/job status that maps to an error span status.
const FAILED_STATUS: &str = "failed";

/// Resource-level attributes identifying where a trace came from.
pub fn resource_attributes(event: &GitlabPipelineEvent) -> Vec<KeyValue> {
    let mut attributes = Vec::new();
    put_str(&mut attributes, semconv::SERVICE_NAME, &event.project.path);
    put_str(&mut attributes, semconv::SPAN_SOURCE, semconv::SPAN_SOURCE_VALUE);
    attributes
}

/// Attributes for the root span of a pipeline trace.
pub fn pipeline_attributes(event: &GitlabPipelineEvent) -> Vec<KeyValue> {
    let pipeline = &event.pipeline;
    let mut attributes = Vec::new();

    put_str(&mut attributes, semconv::PIPELINE_URL, &pipeline.url);
    put_str(&mut attributes, semconv::PIPELINE_RUN_ID, pipeline.id.to_string());
    put_str(&mut attributes, semconv::PIPELINE_DURATION, pipeline.duration.to_string());
    put_str(
        &mut attributes,
        semconv::PIPELINE_QUEUED_DURATION,
        pipeline.queued_duration.to_string(),
    );
    put_str(&mut attributes, semconv::PIPELINE_USER, &event.user.name);
    put_str(&mut attributes, semconv::PIPELINE_USERNAME, &event.user.username);
    put_str(&mut attributes, semconv::PIPELINE_USER_EMAIL, &event.user.email);
    put_str(&mut attributes, semconv::PIPELINE_COMMIT_MESSAGE, &event.commit.message);
    put_str(&mut attributes, semconv::PIPELINE_COMMIT_TITLE, &event.commit.title);
    put_str(&mut attributes, semconv::PIPELINE_COMMIT_TIMESTAMP, &event.commit.timestamp);
    put_str(&mut attributes, semconv::PIPELINE_COMMIT_URL, &event.commit.url);
    put_str(
        &mut attributes,
        semconv::PIPELINE_COMMIT_AUTHOR_EMAIL,
        &event.commit.author.email,
    );

    for variable in &pipeline.variables {
        put_str(
            &mut attributes,
            format!("{}.{}", semconv::PIPELINE_VARIABLE_PREFIX, variable.key),
            &variable.value,
        );
    }

    // Upstream linkage only exists for pipelines triggered by another pipeline;
    // standalone runs carry a zero-valued source_pipeline block that must not
    // produce attributes.
    if pipeline.source == PARENT_PIPELINE_SOURCE {
        let parent = &event.parent_pipeline;
        put_str(&mut attributes, semconv::PARENT_PIPELINE_RUN_ID, parent.id.to_string());
        put_str(
            &mut attributes,
            semconv::PARENT_PIPELINE_URL,
            format!("{}/pipelines/{}", parent.project.url, parent.id),
        );
    }

    attributes
}

/// Attributes for one job span. The job URL is synthesized by the caller
/// since the webhook payload does not carry one.
pub fn job_attributes(job: &Job, job_url: &str) -> Vec<KeyValue> {
    let mut attributes = Vec::new();

    put_str(&mut attributes, semconv::TASK_RUN_ID, job.id.to_string());
    put_str(&mut attributes, semconv::TASK_RUN_URL, job_url);
    put_str(&mut attributes, semconv::TASK_TYPE, task_type(&job.stage));
    put_str(&mut attributes, semconv::JOB_ENVIRONMENT, &job.environment.name);
    put_str(&mut attributes, semconv::JOB_RUNNER_ID, job.runner.id.to_string());
    put_str(&mut attributes, semconv::JOB_RUNNER_DESCRIPTION, &job.runner.description);
    put_str(&mut attributes, semconv::JOB_RUNNER_IS_ACTIVE, job.runner.active.to_string());
    put_str(&mut attributes, semconv::JOB_RUNNER_IS_SHARED, job.runner.is_shared.to_string());
    for tag in &job.runner.tags {
        // Tags are multi-valued: repeated entries under one key, not an upsert.
        push_str(&mut attributes, semconv::JOB_RUNNER_TAG, tag);
    }

    attributes
}

/// Normalizes a free-form stage name into a task type.
pub fn task_type(stage: &str) -> String {
    let stage = stage.to_lowercase();
    for known in ["build", "test", "deploy"] {
        if stage.contains(known) {
            return known.to_string();
        }
    }
    stage
}

/// Span status for a raw GitLab status string. Only `failed` is an error;
/// everything else (including cancellations and skips) reports Ok, with the
/// raw status preserved as the message.
pub fn classify_status(raw: &str) -> Status {
    let code = if raw == FAILED_STATUS {
        status::StatusCode::Error
    } else {
        status::StatusCode::Ok
    };
    Status {
        message: raw.to_string(),
        code: code as i32,
    }
}

/// Sets `key` to `value`, replacing an existing entry with the same key.
fn put_str(attributes: &mut Vec<KeyValue>, key: impl Into<String>, value: impl Into<String>) {
    let key = key.into();
    let value = str_value(value);
    if let Some(existing) = attributes.iter_mut().find(|kv| kv.key == key) {
        existing.value = value;
    } else {
        attributes.push(KeyValue { key, value });
    }
}

/// Appends `key`/`value` without deduplication.
fn push_str(attributes: &mut Vec<KeyValue>, key: impl Into<String>, value: impl Into<String>) {
    attributes.push(KeyValue {
        key: key.into(),
        value: str_value(value),
    });
}

fn str_value(value: impl Into<String>) -> Option<AnyValue> {
    Some(AnyValue {
        value: Some(any_value::Value::StringValue(value.into())),
    })
}
