//! GitLab webhook payload model

use serde::{Deserialize, Deserializer};

use crate::error::{BridgeError, Result};

/// `X-Gitlab-Event` value for pipeline deliveries.
pub const PIPELINE_HOOK: &str = "Pipeline Hook";
/// `X-Gitlab-Event` value for per-job deliveries.
pub const JOB_HOOK: &str = "Job Hook";

/// One decoded webhook delivery.
///
/// Pipeline events carry everything needed for a trace; job events repeat
/// data the pipeline event already has, so they decode cleanly but produce
/// no trace of their own.
#[derive(Debug, Clone, PartialEq)]
pub enum GitlabEvent {
    Pipeline(GitlabPipelineEvent),
    Job(GitlabJobEvent),
}

impl GitlabEvent {
    /// Decodes a webhook body according to its `X-Gitlab-Event` header value.
    pub fn decode(event_type: &str, body: &[u8]) -> Result<Self> {
        match event_type {
            PIPELINE_HOOK => Ok(Self::Pipeline(decode_json(body)?)),
            JOB_HOOK => Ok(Self::Job(decode_json(body)?)),
            other => Err(BridgeError::MalformedRequest(format!(
                "unsupported event type: {other}"
            ))),
        }
    }
}

fn decode_json<'a, T: Deserialize<'a>>(body: &'a [u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| BridgeError::MalformedRequest(format!("decode json: {e}")))
}

/// Payload of a `Pipeline Hook` delivery.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GitlabPipelineEvent {
    #[serde(rename = "object_kind")]
    pub kind: String,
    #[serde(rename = "object_attributes")]
    pub pipeline: Pipeline,
    #[serde(rename = "builds")]
    pub jobs: Vec<Job>,
    pub project: Project,
    #[serde(rename = "source_pipeline")]
    pub parent_pipeline: ParentPipeline,
    pub user: User,
    pub commit: Commit,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Pipeline {
    pub id: i64,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub status: String,
    pub source: String,
    pub sha: String,
    pub url: String,
    pub created_at: String,
    #[serde(deserialize_with = "null_to_default")]
    pub finished_at: String,
    #[serde(deserialize_with = "null_to_default")]
    pub duration: i64,
    #[serde(deserialize_with = "null_to_default")]
    pub queued_duration: i64,
    pub variables: Vec<Variable>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Job {
    pub id: i64,
    pub name: String,
    pub stage: String,
    pub status: String,
    pub created_at: String,
    #[serde(deserialize_with = "null_to_default")]
    pub started_at: String,
    #[serde(deserialize_with = "null_to_default")]
    pub finished_at: String,
    #[serde(deserialize_with = "null_to_default")]
    pub runner: Runner,
    #[serde(deserialize_with = "null_to_default")]
    pub environment: Environment,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Runner {
    pub id: i64,
    pub description: String,
    pub runner_type: String,
    pub active: bool,
    pub is_shared: bool,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Environment {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(rename = "path_with_namespace")]
    pub path: String,
    #[serde(rename = "web_url")]
    pub url: String,
}

/// `source_pipeline` block; only populated for downstream pipelines.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParentPipeline {
    #[serde(rename = "pipeline_id")]
    pub id: i64,
    pub project: Project,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Commit {
    pub id: String,
    pub message: String,
    pub title: String,
    pub timestamp: String,
    pub url: String,
    pub author: CommitAuthor,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Variable {
    pub key: String,
    pub value: String,
}

/// Payload of a `Job Hook` delivery. Flat, with `build_`-prefixed keys.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GitlabJobEvent {
    #[serde(rename = "object_kind")]
    pub kind: String,
    pub sha: String,
    pub retries_count: i64,
    #[serde(rename = "build_id")]
    pub id: i64,
    #[serde(rename = "build_name")]
    pub name: String,
    #[serde(rename = "build_stage")]
    pub stage: String,
    #[serde(rename = "build_status")]
    pub status: String,
    #[serde(rename = "build_created_at")]
    pub created_at: String,
    #[serde(rename = "build_started_at", deserialize_with = "null_to_default")]
    pub started_at: String,
    #[serde(rename = "build_finished_at", deserialize_with = "null_to_default")]
    pub finished_at: String,
    #[serde(rename = "build_duration", deserialize_with = "null_to_default")]
    pub duration: f64,
    #[serde(rename = "build_failure_reason")]
    pub failure_reason: String,
    pub pipeline_id: i64,
    #[serde(rename = "source_pipeline")]
    pub parent_pipeline: ParentPipeline,
    pub repository: Repository,
    pub project: Project,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Repository {
    pub name: String,
    #[serde(rename = "homepage")]
    pub url: String,
}

/// GitLab sends explicit JSON `null` for unset fields; fold those into the
/// field's default instead of failing the whole decode.
fn null_to_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let value = Option::<T>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
