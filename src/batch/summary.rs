// Per-file outcomes and the run summary
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::BatchError;
use crate::input::MediaFile;

/// Terminal status of one file
#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    Succeeded {
        segments: usize,
        artifacts: Vec<PathBuf>,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub media: MediaFile,
    pub status: FileStatus,
    /// Non-fatal problems: degraded annotation, artifacts that could not be written
    pub warnings: Vec<String>,
    pub elapsed: Duration,
}

impl FileOutcome {
    pub fn succeeded(media: MediaFile, segments: usize, artifacts: Vec<PathBuf>, warnings: Vec<String>, elapsed: Duration) -> Self {
        Self {
            media,
            status: FileStatus::Succeeded { segments, artifacts },
            warnings,
            elapsed,
        }
    }

    pub fn failed(media: MediaFile, reason: impl Into<String>, warnings: Vec<String>, elapsed: Duration) -> Self {
        Self {
            media,
            status: FileStatus::Failed { reason: reason.into() },
            warnings,
            elapsed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, FileStatus::Succeeded { .. })
    }
}

/// Result of a whole run
#[derive(Debug)]
pub struct RunSummary {
    pub outcomes: Vec<FileOutcome>,
    /// Run-level warnings: skipped inputs, device fallback
    pub warnings: Vec<String>,
    /// Set when the run stopped before processing any file
    pub halted: Option<BatchError>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn halted(error: BatchError, warnings: Vec<String>, elapsed: Duration) -> Self {
        Self {
            outcomes: Vec::new(),
            warnings,
            halted: Some(error),
            elapsed,
        }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn outcome_for(&self, display_name: &str) -> Option<&FileOutcome> {
        self.outcomes.iter().find(|o| o.media.display_name == display_name)
    }

    /// 0 when every file succeeded, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.halted.is_some() || self.failed() > 0 {
            1
        } else {
            0
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Run summary: {} files, {} succeeded, {} failed ({:.1}s)",
            self.total(),
            self.succeeded(),
            self.failed(),
            self.elapsed.as_secs_f64()
        )?;

        if let Some(error) = &self.halted {
            writeln!(f, "  halted: {}", error)?;
        }

        if !self.outcomes.is_empty() {
            writeln!(f, "  {:<8} {:>8}  {:<32} DETAIL", "STATUS", "TIME", "FILE")?;
        }
        for outcome in &self.outcomes {
            let (status, detail) = match &outcome.status {
                FileStatus::Succeeded { segments, artifacts } => {
                    ("ok", format!("{} segments, {} artifacts", segments, artifacts.len()))
                }
                FileStatus::Failed { reason } => ("FAILED", reason.clone()),
            };
            writeln!(
                f,
                "  {:<8} {:>7.1}s  {:<32} {}",
                status,
                outcome.elapsed.as_secs_f64(),
                outcome.media.display_name,
                detail
            )?;
            for warning in &outcome.warnings {
                writeln!(f, "  {:<8} {:>8}  {:<32} warning: {}", "", "", "", warning)?;
            }
        }

        for warning in &self.warnings {
            writeln!(f, "  warning: {}", warning)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::InputError;
    use crate::test_support::media;

    #[test]
    fn test_counts_and_exit_code() {
        let summary = RunSummary {
            outcomes: vec![
                FileOutcome::succeeded(media("/m/a.mp3"), 3, vec![PathBuf::from("a/a.txt")], Vec::new(), Duration::from_secs(2)),
                FileOutcome::failed(media("/m/b.mp3"), "failed to decode media", Vec::new(), Duration::from_millis(10)),
            ],
            warnings: vec!["Skipping unsupported file /m/c.txt".to_string()],
            halted: None,
            elapsed: Duration::from_secs(3),
        };

        assert_eq!(summary.total(), 2);
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.exit_code(), 1);

        let table = summary.to_string();
        assert!(table.starts_with("Run summary: 2 files, 1 succeeded, 1 failed"));
        assert!(table.contains("FAILED"));
        assert!(table.contains("failed to decode media"));
        assert!(table.contains("warning: Skipping unsupported file"));
    }

    #[test]
    fn test_halted_run() {
        let summary = RunSummary::halted(
            BatchError::from(InputError::NoInput("/empty".to_string())),
            Vec::new(),
            Duration::ZERO,
        );
        assert_eq!(summary.succeeded(), 0);
        assert_eq!(summary.exit_code(), 1);
        assert!(summary.to_string().contains("halted: no supported media files found"));
    }

    #[test]
    fn test_all_succeeded_exits_zero() {
        let summary = RunSummary {
            outcomes: vec![FileOutcome::succeeded(media("/m/a.mp3"), 1, Vec::new(), Vec::new(), Duration::ZERO)],
            warnings: Vec::new(),
            halted: None,
            elapsed: Duration::ZERO,
        };
        assert_eq!(summary.exit_code(), 0);
    }
}
