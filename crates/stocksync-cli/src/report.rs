//! JSON run reports.
//!
//! Every run writes one file named `{kind}_{YYYYmmdd_HHMMSS}.json` under the
//! reports directory. Long runs may rewrite it at checkpoints; the last
//! write carries `finished_at`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use stocksync_core::RejectedRecord;
use uuid::Uuid;

/// Outcome buckets of one run kind. Serialized next to the run metadata.
pub(crate) trait ReportBuckets: Serialize {
    /// Item count per bucket, for the report header and the summary line.
    fn totals(&self) -> BTreeMap<&'static str, usize>;
}

#[derive(Debug)]
pub(crate) struct RunReport {
    run_id: Uuid,
    kind: &'static str,
    started_at: DateTime<Utc>,
    dry_run: bool,
    path: PathBuf,
}

#[derive(Serialize)]
struct ReportDocument<'a, B: Serialize> {
    run_id: Uuid,
    kind: &'a str,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    dry_run: bool,
    totals: BTreeMap<&'static str, usize>,
    rejected: &'a [RejectedRecord],
    #[serde(flatten)]
    buckets: &'a B,
}

impl RunReport {
    pub(crate) fn start(
        reports_dir: &Path,
        kind: &'static str,
        dry_run: bool,
        started_at: DateTime<Utc>,
    ) -> Self {
        let file_name = format!("{kind}_{}.json", started_at.format("%Y%m%d_%H%M%S"));
        Self {
            run_id: Uuid::new_v4(),
            kind,
            started_at,
            dry_run,
            path: reports_dir.join(file_name),
        }
    }

    pub(crate) fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the report as it stands, without `finished_at`.
    pub(crate) fn checkpoint<B: ReportBuckets>(
        &self,
        buckets: &B,
        rejected: &[RejectedRecord],
    ) -> anyhow::Result<()> {
        self.write(buckets, rejected, None)
    }

    /// Writes the final report and returns its path.
    pub(crate) fn finish<B: ReportBuckets>(
        &self,
        buckets: &B,
        rejected: &[RejectedRecord],
        finished_at: DateTime<Utc>,
    ) -> anyhow::Result<&Path> {
        self.write(buckets, rejected, Some(finished_at))?;
        Ok(self.path())
    }

    fn write<B: ReportBuckets>(
        &self,
        buckets: &B,
        rejected: &[RejectedRecord],
        finished_at: Option<DateTime<Utc>>,
    ) -> anyhow::Result<()> {
        let document = ReportDocument {
            run_id: self.run_id,
            kind: self.kind,
            started_at: self.started_at,
            finished_at,
            dry_run: self.dry_run,
            totals: buckets.totals(),
            rejected,
            buckets,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!("failed to create reports dir {}: {e}", parent.display())
            })?;
        }
        let json = serde_json::to_string_pretty(&document)?;
        std::fs::write(&self.path, json)
            .map_err(|e| anyhow::anyhow!("failed to write report {}: {e}", self.path.display()))?;

        tracing::debug!(
            run_id = %self.run_id,
            path = %self.path.display(),
            finished = finished_at.is_some(),
            "wrote run report"
        );
        Ok(())
    }
}

/// `"updated=2 unchanged=5 ..."`, in bucket-name order.
pub(crate) fn summary_line(totals: &BTreeMap<&'static str, usize>) -> String {
    totals
        .iter()
        .map(|(bucket, count)| format!("{bucket}={count}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Serialize)]
    struct Buckets {
        done: Vec<String>,
        failed: Vec<String>,
    }

    impl ReportBuckets for Buckets {
        fn totals(&self) -> BTreeMap<&'static str, usize> {
            BTreeMap::from([("done", self.done.len()), ("failed", self.failed.len())])
        }
    }

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("stocksync-report-{}", Uuid::new_v4()))
    }

    #[test]
    fn file_name_carries_kind_and_start_time() {
        let started = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let report = RunReport::start(Path::new("reports"), "stock", false, started);
        assert_eq!(report.path(), Path::new("reports/stock_20240309_140507.json"));
    }

    #[test]
    fn final_report_has_metadata_totals_and_buckets() {
        let dir = scratch_dir();
        let started = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let report = RunReport::start(&dir, "products", true, started);
        let buckets = Buckets {
            done: vec!["C01".into(), "C02".into()],
            failed: vec![],
        };
        let rejected = [RejectedRecord::new("X1", "missing product name")];

        let path = report
            .finish(&buckets, &rejected, started + chrono::Duration::seconds(3))
            .unwrap()
            .to_path_buf();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(json["run_id"], report.run_id().to_string());
        assert_eq!(json["kind"], "products");
        assert_eq!(json["dry_run"], true);
        assert_eq!(json["totals"]["done"], 2);
        assert_eq!(json["totals"]["failed"], 0);
        assert_eq!(json["done"][1], "C02");
        assert_eq!(json["rejected"][0]["reason"], "missing product name");
        assert!(json["finished_at"].is_string());

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn checkpoint_leaves_finished_at_empty() {
        let dir = scratch_dir();
        let report = RunReport::start(&dir, "stock", false, Utc::now());
        let buckets = Buckets {
            done: vec![],
            failed: vec!["C09".into()],
        };
        report.checkpoint(&buckets, &[]).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(report.path()).unwrap()).unwrap();
        assert!(json["finished_at"].is_null());
        assert_eq!(json["failed"][0], "C09");

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn summary_line_lists_buckets_in_order() {
        let totals = BTreeMap::from([("updated", 2), ("errored", 1)]);
        assert_eq!(summary_line(&totals), "errored=1 updated=2");
    }
}
