use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::errors::{CollectorError, DatabaseError, Error, Result as AppResult};
use crate::holdings::{Asset, HoldingPosition, HoldingsRepositoryTrait};
use crate::market_data::{
    LookbackRange, MarketDataError, MarketDataProvider, PriceHistoryPoint,
    PriceHistoryRepositoryTrait, PricePoint,
};
use crate::settings::CollectorSettings;

use super::backfill_model::{BackfillJob, JobStatus};
use super::backfill_service::{partition_points, BackfillService};
use super::backfill_traits::BackfillRepositoryTrait;

/// In-memory stand-in for the jobs table, enforcing the same state
/// machine the SQL-backed repository enforces with filtered updates.
#[derive(Default)]
struct MockBackfillRepository {
    jobs: Mutex<Vec<BackfillJob>>,
}

impl MockBackfillRepository {
    fn push(&self, job: BackfillJob) {
        self.jobs.lock().unwrap().push(job);
    }

    fn job(owner_id: &str, asset_id: &str, lookback: LookbackRange, status: JobStatus) -> BackfillJob {
        BackfillJob {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            asset_id: asset_id.to_string(),
            lookback,
            status,
            requested_at: chrono::Utc::now().naive_utc(),
            completed_at: None,
            error_message: None,
        }
    }
}

impl BackfillRepositoryTrait for MockBackfillRepository {
    fn insert_or_get(
        &self,
        owner_id: &str,
        asset_id: &str,
        lookback: LookbackRange,
    ) -> AppResult<BackfillJob> {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(existing) = jobs.iter().find(|j| {
            j.owner_id == owner_id && j.asset_id == asset_id && j.lookback == lookback
        }) {
            return Ok(existing.clone());
        }
        let job = Self::job(owner_id, asset_id, lookback, JobStatus::Queued);
        jobs.push(job.clone());
        Ok(job)
    }

    fn get(&self, job_id: &str) -> AppResult<Option<BackfillJob>> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .find(|j| j.id == job_id)
            .cloned())
    }

    fn list_queued(&self, owner_id: &str) -> AppResult<Vec<BackfillJob>> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .filter(|j| j.owner_id == owner_id && j.status == JobStatus::Queued)
            .cloned()
            .collect())
    }

    fn claim(&self, job_id: &str) -> AppResult<Option<BackfillJob>> {
        let mut jobs = self.jobs.lock().unwrap();
        for job in jobs.iter_mut() {
            if job.id == job_id && job.status == JobStatus::Queued {
                job.status = JobStatus::Running;
                return Ok(Some(job.clone()));
            }
        }
        Ok(None)
    }

    fn finalize(
        &self,
        job_id: &str,
        terminal: JobStatus,
        error_message: Option<&str>,
    ) -> AppResult<BackfillJob> {
        let mut jobs = self.jobs.lock().unwrap();
        for job in jobs.iter_mut() {
            if job.id == job_id && job.status == JobStatus::Running {
                job.status = terminal;
                job.completed_at = Some(chrono::Utc::now().naive_utc());
                job.error_message = error_message.map(|m| m.to_string());
                return Ok(job.clone());
            }
        }
        Err(Error::Collector(CollectorError::InvalidTransition(format!(
            "Job {} is not running",
            job_id
        ))))
    }

    fn requeue_failed(&self, job_id: &str) -> AppResult<BackfillJob> {
        let mut jobs = self.jobs.lock().unwrap();
        let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) else {
            return Err(Error::Collector(CollectorError::NotFound(format!(
                "Backfill job {}",
                job_id
            ))));
        };
        if job.status != JobStatus::Failed {
            return Err(Error::Collector(CollectorError::InvalidTransition(
                format!("Job {} has status {}", job_id, job.status.as_str()),
            )));
        }
        job.status = JobStatus::Queued;
        job.completed_at = None;
        job.error_message = None;
        Ok(job.clone())
    }
}

struct MockHoldings {
    assets: HashMap<String, Asset>,
}

impl MockHoldings {
    fn with_asset(asset_id: &str) -> Self {
        let now = chrono::Utc::now().naive_utc();
        let mut assets = HashMap::new();
        assets.insert(
            asset_id.to_string(),
            Asset {
                id: asset_id.to_string(),
                symbol: asset_id.to_string(),
                name: None,
                asset_class: Some("CRYPTO".to_string()),
                currency: "USD".to_string(),
                created_at: now,
                updated_at: now,
            },
        );
        Self { assets }
    }
}

impl HoldingsRepositoryTrait for MockHoldings {
    fn get_holdings_with_assets(&self, _owner_id: &str) -> AppResult<Vec<HoldingPosition>> {
        Ok(Vec::new())
    }

    fn get_asset(&self, asset_id: &str) -> AppResult<Option<Asset>> {
        Ok(self.assets.get(asset_id).cloned())
    }
}

#[derive(Default)]
struct RecordingHistory {
    points: Mutex<Vec<(String, PricePoint)>>,
    fail_writes: bool,
}

impl PriceHistoryRepositoryTrait for RecordingHistory {
    fn upsert_points(&self, asset_id: &str, points: &[PricePoint]) -> AppResult<usize> {
        if self.fail_writes {
            return Err(Error::Database(DatabaseError::QueryFailed(
                diesel::result::Error::RollbackTransaction,
            )));
        }
        let mut stored = self.points.lock().unwrap();
        for point in points {
            stored.push((asset_id.to_string(), *point));
        }
        Ok(points.len())
    }

    fn upsert_point(&self, asset_id: &str, date: NaiveDate, price: f64) -> AppResult<()> {
        self.upsert_points(asset_id, &[PricePoint::new(date, price)])
            .map(|_| ())
    }

    fn get_history(&self, asset_id: &str) -> AppResult<Vec<PriceHistoryPoint>> {
        Ok(self
            .points
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == asset_id)
            .map(|(id, p)| PriceHistoryPoint {
                id: Uuid::new_v4().to_string(),
                asset_id: id.clone(),
                date: p.date,
                price: p.price,
                created_at: chrono::Utc::now().naive_utc(),
            })
            .collect())
    }

    fn delete_older_than(&self, _cutoff: NaiveDate) -> AppResult<usize> {
        Ok(0)
    }
}

struct SeriesProvider {
    series: Result<Vec<PricePoint>, String>,
    calls: AtomicUsize,
}

#[async_trait]
impl MarketDataProvider for SeriesProvider {
    async fn get_fx_rate(&self) -> Result<f64, MarketDataError> {
        Ok(7.2)
    }

    async fn get_current_price(
        &self,
        _symbol: &str,
        _asset_class: Option<&str>,
    ) -> Result<f64, MarketDataError> {
        Err(MarketDataError::NotFound("unused".to_string()))
    }

    async fn get_historical_daily_prices(
        &self,
        _symbol: &str,
        _range: LookbackRange,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.series
            .clone()
            .map_err(MarketDataError::ProviderError)
    }
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

struct Fixture {
    service: BackfillService,
    repository: Arc<MockBackfillRepository>,
    history: Arc<RecordingHistory>,
    provider: Arc<SeriesProvider>,
}

fn fixture(series: Result<Vec<PricePoint>, String>, fail_writes: bool) -> Fixture {
    let repository = Arc::new(MockBackfillRepository::default());
    let history = Arc::new(RecordingHistory {
        fail_writes,
        ..Default::default()
    });
    let provider = Arc::new(SeriesProvider {
        series,
        calls: AtomicUsize::new(0),
    });
    let service = BackfillService::new(
        repository.clone(),
        Arc::new(MockHoldings::with_asset("BTC")),
        history.clone(),
        provider.clone(),
        CollectorSettings::default(),
    );
    Fixture {
        service,
        repository,
        history,
        provider,
    }
}

#[tokio::test]
async fn partial_series_persists_only_valid_points() {
    let f = fixture(
        Ok(vec![
            PricePoint::new(d(2025, 1, 1), 100.0),
            PricePoint::new(d(2025, 1, 2), -1.0),
        ]),
        false,
    );
    f.service
        .request_backfill("owner-1", "BTC", LookbackRange::OneMonth)
        .unwrap();

    let finished = f.service.drain_queued_backfills("owner-1").await.unwrap();

    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].status, JobStatus::Partial);
    assert_eq!(
        finished[0].error_message.as_deref(),
        Some("1 invalid point(s) dropped")
    );

    let stored = f.history.points.lock().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].1.date, d(2025, 1, 1));
    assert_eq!(stored[0].1.price, 100.0);
}

#[tokio::test]
async fn clean_series_completes() {
    let f = fixture(
        Ok(vec![
            PricePoint::new(d(2025, 1, 1), 100.0),
            PricePoint::new(d(2025, 1, 2), 101.5),
        ]),
        false,
    );
    f.service
        .request_backfill("owner-1", "BTC", LookbackRange::ThreeMonths)
        .unwrap();

    let finished = f.service.drain_queued_backfills("owner-1").await.unwrap();

    assert_eq!(finished[0].status, JobStatus::Completed);
    assert!(finished[0].error_message.is_none());
    assert!(finished[0].completed_at.is_some());
    assert_eq!(f.history.points.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn all_invalid_series_is_partial_with_nothing_persisted() {
    let f = fixture(
        Ok(vec![PricePoint::new(d(2025, 1, 1), f64::NAN)]),
        false,
    );
    f.service
        .request_backfill("owner-1", "BTC", LookbackRange::OneYear)
        .unwrap();

    let finished = f.service.drain_queued_backfills("owner-1").await.unwrap();

    assert_eq!(finished[0].status, JobStatus::Partial);
    assert!(f.history.points.lock().unwrap().is_empty());
}

#[tokio::test]
async fn provider_error_fails_job_with_message() {
    let f = fixture(Err("upstream exploded".to_string()), false);
    f.service
        .request_backfill("owner-1", "BTC", LookbackRange::OneMonth)
        .unwrap();

    let finished = f.service.drain_queued_backfills("owner-1").await.unwrap();

    assert_eq!(finished[0].status, JobStatus::Failed);
    assert!(finished[0]
        .error_message
        .as_deref()
        .unwrap()
        .contains("upstream exploded"));
    assert!(f.history.points.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_series_fails_job() {
    let f = fixture(Ok(Vec::new()), false);
    f.service
        .request_backfill("owner-1", "BTC", LookbackRange::All)
        .unwrap();

    let finished = f.service.drain_queued_backfills("owner-1").await.unwrap();

    assert_eq!(finished[0].status, JobStatus::Failed);
    assert_eq!(
        finished[0].error_message.as_deref(),
        Some("Provider returned no data points")
    );
}

#[tokio::test]
async fn unknown_asset_fails_job() {
    let f = fixture(Ok(vec![PricePoint::new(d(2025, 1, 1), 1.0)]), false);
    f.service
        .request_backfill("owner-1", "DOGE", LookbackRange::OneMonth)
        .unwrap();

    let finished = f.service.drain_queued_backfills("owner-1").await.unwrap();

    assert_eq!(finished[0].status, JobStatus::Failed);
    assert!(finished[0]
        .error_message
        .as_deref()
        .unwrap()
        .contains("Unknown asset"));
    // The provider was never consulted for an unresolvable asset.
    assert_eq!(f.provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn duplicate_request_reuses_existing_job() {
    let f = fixture(Ok(Vec::new()), false);

    let first = f
        .service
        .request_backfill("owner-1", "BTC", LookbackRange::OneMonth)
        .unwrap();
    let second = f
        .service
        .request_backfill("owner-1", "BTC", LookbackRange::OneMonth)
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(f.repository.jobs.lock().unwrap().len(), 1);

    // A different window is a different job.
    let other = f
        .service
        .request_backfill("owner-1", "BTC", LookbackRange::OneYear)
        .unwrap();
    assert_ne!(first.id, other.id);
}

#[tokio::test]
async fn drain_never_resurrects_failed_jobs() {
    let f = fixture(Ok(vec![PricePoint::new(d(2025, 1, 1), 1.0)]), false);
    let failed = MockBackfillRepository::job(
        "owner-1",
        "BTC",
        LookbackRange::OneMonth,
        JobStatus::Failed,
    );
    f.repository.push(failed.clone());

    let finished = f.service.drain_queued_backfills("owner-1").await.unwrap();

    assert!(finished.is_empty());
    assert_eq!(f.provider.calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        f.repository.get(&failed.id).unwrap().unwrap().status,
        JobStatus::Failed
    );
}

#[tokio::test]
async fn explicit_retry_requeues_failed_job_only() {
    let f = fixture(Ok(vec![PricePoint::new(d(2025, 1, 1), 1.0)]), false);
    let failed = MockBackfillRepository::job(
        "owner-1",
        "BTC",
        LookbackRange::OneMonth,
        JobStatus::Failed,
    );
    let completed = MockBackfillRepository::job(
        "owner-1",
        "BTC",
        LookbackRange::OneYear,
        JobStatus::Completed,
    );
    f.repository.push(failed.clone());
    f.repository.push(completed.clone());

    let requeued = f.service.retry_failed_backfill(&failed.id).unwrap();
    assert_eq!(requeued.status, JobStatus::Queued);
    assert!(requeued.completed_at.is_none());
    assert!(requeued.error_message.is_none());

    let result = f.service.retry_failed_backfill(&completed.id);
    assert!(matches!(
        result,
        Err(Error::Collector(CollectorError::InvalidTransition(_)))
    ));

    let missing = f.service.retry_failed_backfill("no-such-job");
    assert!(matches!(
        missing,
        Err(Error::Collector(CollectorError::NotFound(_)))
    ));

    // The re-queued job is now eligible for a normal drain.
    let finished = f.service.drain_queued_backfills("owner-1").await.unwrap();
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].status, JobStatus::Completed);
}

#[tokio::test]
async fn history_write_failure_propagates_after_closing_job() {
    let f = fixture(Ok(vec![PricePoint::new(d(2025, 1, 1), 1.0)]), true);
    let job = f
        .service
        .request_backfill("owner-1", "BTC", LookbackRange::OneMonth)
        .unwrap();

    let result = f.service.drain_queued_backfills("owner-1").await;
    assert!(result.is_err());

    let closed = f.repository.get(&job.id).unwrap().unwrap();
    assert_eq!(closed.status, JobStatus::Failed);
}

#[test]
fn partition_keeps_only_finite_positive_prices() {
    let (valid, dropped) = partition_points(vec![
        PricePoint::new(d(2025, 1, 1), 100.0),
        PricePoint::new(d(2025, 1, 2), -1.0),
        PricePoint::new(d(2025, 1, 3), 0.0),
        PricePoint::new(d(2025, 1, 4), f64::INFINITY),
        PricePoint::new(d(2025, 1, 5), 0.0001),
    ]);
    assert_eq!(valid.len(), 2);
    assert_eq!(dropped, 3);
}
