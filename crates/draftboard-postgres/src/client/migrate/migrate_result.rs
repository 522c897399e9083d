use std::time::Duration;

use serde::Serialize;

/// Applied and pending migration versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    /// Versions recorded in `__diesel_schema_migrations`, oldest first.
    pub applied_versions: Vec<String>,
    /// Embedded versions not applied yet, oldest first.
    pub pending_versions: Vec<String>,
}

impl MigrationStatus {
    /// Creates a new migration status.
    pub fn new(applied_versions: Vec<String>, pending_versions: Vec<String>) -> Self {
        Self {
            applied_versions,
            pending_versions,
        }
    }

    /// Returns the share of migrations applied, from 0.0 to 1.0.
    pub fn progress_ratio(&self) -> f64 {
        let total = self.total_migrations();
        if total == 0 {
            1.0
        } else {
            self.applied_migrations() as f64 / total as f64
        }
    }

    /// Returns the number of applied migrations.
    #[inline]
    pub fn applied_migrations(&self) -> usize {
        self.applied_versions.len()
    }

    /// Returns the number of pending migrations.
    #[inline]
    pub fn pending_migrations(&self) -> usize {
        self.pending_versions.len()
    }

    /// Returns the total number of migrations.
    #[inline]
    pub fn total_migrations(&self) -> usize {
        self.applied_migrations() + self.pending_migrations()
    }

    /// Returns true if all migrations have been applied.
    #[inline]
    pub fn is_up_to_date(&self) -> bool {
        self.pending_versions.is_empty()
    }
}

/// Outcome of a migration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationResult {
    /// Time spent applying migrations.
    pub duration: Duration,
    /// Versions applied by this run.
    pub processed_versions: Vec<String>,
}

impl MigrationResult {
    /// Creates a result for a successful run.
    pub fn success(duration: Duration, processed_versions: Vec<String>) -> Self {
        Self {
            duration,
            processed_versions,
        }
    }

    /// Returns true if nothing had to be applied.
    pub fn is_no_op(&self) -> bool {
        self.processed_versions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ratio() {
        let status = MigrationStatus::new(vec!["1".into()], vec!["2".into(), "3".into()]);
        assert!(!status.is_up_to_date());
        assert_eq!(status.total_migrations(), 3);
        assert!((status.progress_ratio() - 1.0 / 3.0).abs() < f64::EPSILON);

        let empty = MigrationStatus::new(vec![], vec![]);
        assert!(empty.is_up_to_date());
        assert_eq!(empty.progress_ratio(), 1.0);
    }

    #[test]
    fn no_op_result() {
        assert!(MigrationResult::success(Duration::ZERO, vec![]).is_no_op());
        assert!(!MigrationResult::success(Duration::ZERO, vec!["1".into()]).is_no_op());
    }
}
