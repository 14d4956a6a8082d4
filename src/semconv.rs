//! Span and resource attribute keys shared by the attribute mapper and its tests

pub const SERVICE_NAME: &str = "service.name";
pub const SPAN_SOURCE: &str = "span.source";

/// Value of [`SPAN_SOURCE`] stamped on every resource this crate produces.
pub const SPAN_SOURCE_VALUE: &str = "gitlab-receiver";

pub const PIPELINE_RUN_ID: &str = "cicd.pipeline.run.id";
pub const PIPELINE_URL: &str = "cicd.pipeline.url";
pub const PIPELINE_DURATION: &str = "cicd.pipeline.duration";
pub const PIPELINE_QUEUED_DURATION: &str = "cicd.pipeline.queued.duration";
pub const PIPELINE_USER: &str = "cicd.pipeline.user";
pub const PIPELINE_USERNAME: &str = "cicd.pipeline.username";
pub const PIPELINE_USER_EMAIL: &str = "cicd.pipeline.user.email";
pub const PIPELINE_COMMIT_MESSAGE: &str = "cicd.pipeline.commit.message";
pub const PIPELINE_COMMIT_TITLE: &str = "cicd.pipeline.commit.title";
pub const PIPELINE_COMMIT_TIMESTAMP: &str = "cicd.pipeline.commit.timestamp";
pub const PIPELINE_COMMIT_URL: &str = "cicd.pipeline.commit.url";
pub const PIPELINE_COMMIT_AUTHOR_EMAIL: &str = "cicd.pipeline.commit.author.email";

/// Pipeline variables land under `cicd.pipeline.variable.<KEY>`.
pub const PIPELINE_VARIABLE_PREFIX: &str = "cicd.pipeline.variable";

pub const PARENT_PIPELINE_RUN_ID: &str = "cicd.parent.pipeline.run.id";
pub const PARENT_PIPELINE_URL: &str = "cicd.parent.pipeline.url";

pub const TASK_RUN_ID: &str = "cicd.pipeline.task.run.id";
pub const TASK_RUN_URL: &str = "cicd.pipeline.task.run.url.full";
pub const TASK_TYPE: &str = "cicd.pipeline.task.type";

pub const JOB_ENVIRONMENT: &str = "cicd.job.environment";
pub const JOB_RUNNER_ID: &str = "cicd.job.runner.id";
pub const JOB_RUNNER_DESCRIPTION: &str = "cicd.job.runner.description";
pub const JOB_RUNNER_IS_ACTIVE: &str = "cicd.job.runner.active";
pub const JOB_RUNNER_IS_SHARED: &str = "cicd.job.runner.shared";
pub const JOB_RUNNER_TAG: &str = "cicd.job.runner.tag";
