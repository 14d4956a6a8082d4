//! Decides whether a pipeline delivery becomes a trace

use crate::model::Pipeline;

/// What to do with a structurally valid pipeline delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Translate and hand off to the sink.
    Export,
    /// Ref not in the configured allow-list; acknowledge and drop.
    Filtered,
    /// Pipeline not finished yet; acknowledge and wait for the final delivery.
    Suppressed,
}

/// Evaluates one pipeline against the configured ref allow-list.
///
/// The ref filter wins over the finished check, so an unfinished pipeline on
/// an unconfigured ref reports [`Disposition::Filtered`]. An empty allow-list
/// admits every ref. Only a literally empty `finished_at` counts as
/// unfinished; the sentinel string `"null"` is a set value.
pub fn evaluate(pipeline: &Pipeline, allowed_refs: &[String]) -> Disposition {
    if !allowed_refs.is_empty() && !allowed_refs.iter().any(|r| r == &pipeline.git_ref) {
        return Disposition::Filtered;
    }
    if pipeline.finished_at.is_empty() || pipeline.status == "running" {
        return Disposition::Suppressed;
    }
    Disposition::Export
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished_pipeline(git_ref: &str) -> Pipeline {
        Pipeline {
            git_ref: git_ref.to_string(),
            status: "success".to_string(),
            finished_at: "2024-01-01 12:30:15 UTC".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_allow_list_admits_all_refs() {
        let pipeline = finished_pipeline("anything-goes");
        assert_eq!(evaluate(&pipeline, &[]), Disposition::Export);
    }

    #[test]
    fn test_unlisted_ref_is_filtered() {
        let pipeline = finished_pipeline("feature/xyz");
        let refs = vec!["main".to_string(), "release".to_string()];
        assert_eq!(evaluate(&pipeline, &refs), Disposition::Filtered);
    }

    #[test]
    fn test_listed_ref_is_exported() {
        let pipeline = finished_pipeline("main");
        let refs = vec!["main".to_string()];
        assert_eq!(evaluate(&pipeline, &refs), Disposition::Export);
    }

    #[test]
    fn test_ref_filter_wins_over_finished_check() {
        let mut pipeline = finished_pipeline("feature/xyz");
        pipeline.finished_at.clear();
        let refs = vec!["main".to_string()];
        assert_eq!(evaluate(&pipeline, &refs), Disposition::Filtered);
    }

    #[test]
    fn test_unfinished_pipeline_is_suppressed() {
        let mut pipeline = finished_pipeline("main");
        pipeline.finished_at.clear();
        assert_eq!(evaluate(&pipeline, &[]), Disposition::Suppressed);
    }

    #[test]
    fn test_running_status_is_suppressed_even_with_finish_time() {
        let mut pipeline = finished_pipeline("main");
        pipeline.status = "running".to_string();
        assert_eq!(evaluate(&pipeline, &[]), Disposition::Suppressed);
    }

    #[test]
    fn test_null_sentinel_counts_as_finished() {
        let mut pipeline = finished_pipeline("main");
        pipeline.finished_at = "null".to_string();
        assert_eq!(evaluate(&pipeline, &[]), Disposition::Export);
    }
}
