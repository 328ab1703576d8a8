use serde::{Deserialize, Serialize};

/// Lifecycle state of a sync job as reported by `/api/sync/jobs/:id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Terminal states stop the status poller.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// A sync job snapshot. The backend owns this shape; the console only
/// renders it and decides whether to keep polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncJob {
    pub id: String,
    pub status: JobStatus,
    /// Completion fraction in [0, 1], when the backend reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f32>,
    #[serde(default)]
    pub records_synced: u64,
    /// Failure detail for `Failed` jobs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_job_wire_shape() {
        let json = r#"{"id":"job-42","status":"running","progress":0.25,"recordsSynced":120}"#;
        let job: SyncJob = serde_json::from_str(json).unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.records_synced, 120);
        assert!(job.error.is_none());
    }
}
