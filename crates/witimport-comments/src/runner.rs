//! Import runner: concurrent fan-out over all records, fan-in of outcomes

use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use indicatif::ProgressBar;
use tokio::time::Instant;

use crate::dispatch::{CommentTransport, Dispatcher};
use crate::error::InputError;
use crate::expand::{expand, token_count};
use crate::export::{DownloadSink, FailureExport, deliver_failures};
use crate::record::{ExpandedRecord, parse_input};

/// Records that did not get their comment, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureSet {
    records: Vec<ExpandedRecord>,
}

impl FailureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ExpandedRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExpandedRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[ExpandedRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ExpandedRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a FailureSet {
    type Item = &'a ExpandedRecord;
    type IntoIter = std::slice::Iter<'a, ExpandedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Result of submitting one batch of records
#[derive(Debug)]
pub struct RunReport {
    pub total: usize,
    pub succeeded: usize,
    pub failures: FailureSet,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Dispatch every record at once and wait for all of them to settle.
///
/// Each call owns a fresh [`FailureSet`]: nothing carries over between runs.
/// A rejected record never stops its siblings; the function returns only
/// after every dispatch has a terminal outcome.
pub async fn submit_all<T: CommentTransport>(
    dispatcher: &Dispatcher<T>,
    records: &[ExpandedRecord],
    pb: &ProgressBar,
) -> RunReport {
    let start = Instant::now();
    let mut failures = FailureSet::new();
    let mut succeeded = 0usize;

    let mut in_flight: FuturesUnordered<_> = records
        .iter()
        .map(|record| async move { (record, dispatcher.dispatch(record).await) })
        .collect();
    log::info!("Dispatching {} comments", in_flight.len());

    while let Some((record, outcome)) = in_flight.next().await {
        pb.inc(1);
        if outcome.is_success() {
            succeeded += 1;
        } else {
            pb.set_message(format!("#{} {outcome}", record.work_item_id));
            failures.push(record.clone());
        }
    }

    RunReport {
        total: records.len(),
        succeeded,
        failures,
        elapsed: start.elapsed(),
    }
}

/// Outcome of a whole import, from CSV text to exported failures
#[derive(Debug)]
pub struct ImportSummary {
    pub rows: usize,
    /// `WorkItemId` tokens that did not clean up to an id
    pub skipped_tokens: usize,
    pub report: RunReport,
    /// Present when failures were written to the sink
    pub export: Option<FailureExport>,
}

/// Parse, expand, dispatch, and export failures.
///
/// Only bad input is an error, and it is returned before any request goes
/// out. Export problems are logged and leave the report intact.
pub async fn import_csv<T: CommentTransport>(
    text: &str,
    dispatcher: &Dispatcher<T>,
    sink: &dyn DownloadSink,
    pb: &ProgressBar,
) -> Result<ImportSummary, InputError> {
    let rows = parse_input(text)?;
    let records = expand(&rows);
    let skipped_tokens = token_count(&rows) - records.len();
    log::info!(
        "{} rows expanded to {} work item comments",
        rows.len(),
        records.len()
    );
    if skipped_tokens > 0 {
        log::debug!("Skipped {skipped_tokens} invalid work item id tokens");
    }

    pb.set_length(records.len() as u64);
    let report = submit_all(dispatcher, &records, pb).await;
    pb.finish_and_clear();
    log_report(&report);

    let export = deliver_failures(&report.failures, sink);

    Ok(ImportSummary {
        rows: rows.len(),
        skipped_tokens,
        report,
        export,
    })
}

fn log_report(report: &RunReport) {
    log::info!("=== Import Summary ===");
    log::info!(
        "Comments: {}/{} added ({} failed)",
        report.succeeded,
        report.total,
        report.failed()
    );
    log::info!("Time: {:.1}s", report.elapsed.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use indexmap::IndexMap;
    use witimport_core::{RetryPolicy, TransportError};

    use super::*;
    use crate::endpoint::Endpoint;
    use crate::record::WorkItemId;
    use crate::render::CommentBody;

    /// Fixed status per work item id; unlisted ids get 200.
    struct ByItem {
        statuses: HashMap<u64, u16>,
        /// Delay before answering, per id, to shuffle completion order
        latency: HashMap<u64, Duration>,
        calls: Mutex<Vec<u64>>,
    }

    impl ByItem {
        fn new(statuses: &[(u64, u16)]) -> Self {
            Self {
                statuses: statuses.iter().copied().collect(),
                latency: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with_latency(mut self, latency: &[(u64, u64)]) -> Self {
            self.latency = latency
                .iter()
                .map(|&(id, ms)| (id, Duration::from_millis(ms)))
                .collect();
            self
        }
    }

    fn id_from_url(url: &str) -> u64 {
        url.split("/workItems/")
            .nth(1)
            .and_then(|rest| rest.split('/').next())
            .and_then(|id| id.parse().ok())
            .expect("id in url")
    }

    #[async_trait]
    impl CommentTransport for ByItem {
        async fn post_comment(
            &self,
            url: &str,
            _token: &str,
            _body: &CommentBody,
        ) -> Result<u16, TransportError> {
            let id = id_from_url(url);
            self.calls.lock().unwrap().push(id);
            if let Some(delay) = self.latency.get(&id) {
                tokio::time::sleep(*delay).await;
            }
            Ok(self.statuses.get(&id).copied().unwrap_or(200))
        }
    }

    fn records(ids: &[u64]) -> Vec<ExpandedRecord> {
        ids.iter()
            .map(|&id| {
                let mut fields = IndexMap::new();
                fields.insert("Notes".to_string(), format!("note {id}"));
                ExpandedRecord {
                    title: format!("item {id}"),
                    work_item_id: WorkItemId(id),
                    fields,
                }
            })
            .collect()
    }

    fn dispatcher(transport: ByItem) -> Dispatcher<ByItem> {
        Dispatcher::new(
            transport,
            Endpoint::new("https://dev.azure.com/org/", "Proj"),
            "tok",
            RetryPolicy::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn failures_match_failed_outcomes() {
        let d = dispatcher(ByItem::new(&[(2, 400), (4, 404), (5, 503)]));
        let recs = records(&[1, 2, 3, 4, 5, 6]);
        let report = submit_all(&d, &recs, &ProgressBar::hidden()).await;

        assert_eq!(report.total, 6);
        assert_eq!(report.succeeded, 3);
        assert_eq!(report.failed(), 3);
        let mut failed: Vec<u64> = report.failures.iter().map(|r| r.work_item_id.0).collect();
        failed.sort_unstable();
        assert_eq!(failed, [2, 4, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_slow_retries_before_returning() {
        // #5 keeps answering 503 and takes 1+2+4+8 = 15s of backoff
        let d = dispatcher(ByItem::new(&[(5, 503)]));
        let recs = records(&[5, 6]);
        let report = submit_all(&d, &recs, &ProgressBar::hidden()).await;

        assert_eq!(report.total, 2);
        assert_eq!(report.failed(), 1);
        assert!(report.elapsed >= Duration::from_secs(15));
        let calls = d.transport().calls.lock().unwrap();
        assert_eq!(calls.iter().filter(|&&id| id == 5).count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn dispatches_without_waiting_for_each_other() {
        let d = dispatcher(
            ByItem::new(&[]).with_latency(&[(1, 1000), (2, 1000), (3, 1000)]),
        );
        let report = submit_all(&d, &records(&[1, 2, 3]), &ProgressBar::hidden()).await;
        assert_eq!(report.succeeded, 3);
        // Sequential dispatch would take 3s
        assert!(report.elapsed < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_order_is_completion_order() {
        let d = dispatcher(
            ByItem::new(&[(1, 400), (2, 400), (3, 400)])
                .with_latency(&[(1, 300), (2, 100), (3, 200)]),
        );
        let report = submit_all(&d, &records(&[1, 2, 3]), &ProgressBar::hidden()).await;
        let order: Vec<u64> = report.failures.iter().map(|r| r.work_item_id.0).collect();
        assert_eq!(order, [2, 3, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_records_are_copied_intact() {
        let d = dispatcher(ByItem::new(&[(7, 403)]));
        let recs = records(&[7]);
        let report = submit_all(&d, &recs, &ProgressBar::hidden()).await;
        assert_eq!(report.failures.as_slice(), recs.as_slice());
    }

    #[tokio::test(start_paused = true)]
    async fn second_run_starts_with_empty_failures() {
        let d = dispatcher(ByItem::new(&[(1, 400)]));
        let first = submit_all(&d, &records(&[1, 2]), &ProgressBar::hidden()).await;
        assert_eq!(first.failed(), 1);

        let second = submit_all(&d, &records(&[2, 3]), &ProgressBar::hidden()).await;
        assert!(second.failures.is_empty());
        assert_eq!(second.succeeded, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_input_settles_immediately() {
        let d = dispatcher(ByItem::new(&[]));
        let report = submit_all(&d, &[], &ProgressBar::hidden()).await;
        assert_eq!(report.total, 0);
        assert!(report.failures.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn progress_counts_every_record() {
        let d = dispatcher(ByItem::new(&[(1, 400)]));
        let pb = ProgressBar::hidden();
        submit_all(&d, &records(&[1, 2, 3]), &pb).await;
        assert_eq!(pb.position(), 3);
    }
}
