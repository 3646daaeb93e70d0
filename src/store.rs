// src/store.rs

//! Append-only, queryable storage of time-stamped numeric samples.
//!
//! The store owns every series exclusively: analyzers and forecasters work
//! on owned snapshots, never on references into the store. A read-write
//! lock keeps concurrent `record` and `window` calls safe when producers
//! and consumers run on separate threads.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

use crate::error::{ForesightError, ForesightResult};
use crate::types::{Aggregator, ResourceId, Sample};

/// In-memory store of named, timestamp-ordered series
#[derive(Debug, Default)]
pub struct SeriesStore {
    series: RwLock<HashMap<ResourceId, Vec<Sample>>>,
}

impl SeriesStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    // Every series vector is valid between operations, so a panic in
    // another thread while a guard was held leaves the data usable;
    // recover the guard rather than masking a series as empty or erroring.
    fn read_guard(&self) -> RwLockReadGuard<'_, HashMap<ResourceId, Vec<Sample>>> {
        self.series.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, HashMap<ResourceId, Vec<Sample>>> {
        self.series.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a sample, keeping the series sorted by timestamp.
    ///
    /// Re-recording an existing timestamp overwrites the stored value, so
    /// re-ingestion is idempotent. Non-finite values are rejected with
    /// `InvalidSample` and never stored.
    pub fn record(
        &self,
        series_id: &str,
        timestamp: DateTime<Utc>,
        value: f64,
    ) -> ForesightResult<()> {
        if !value.is_finite() {
            return Err(ForesightError::invalid_sample(
                series_id,
                &format!("non-finite value {value}"),
            ));
        }

        let mut series = self.write_guard();
        let samples = series.entry(series_id.to_string()).or_default();

        match samples.binary_search_by_key(&timestamp, |s| s.timestamp) {
            Ok(pos) => samples[pos].value = value,
            Err(pos) => samples.insert(pos, Sample::new(timestamp, value)),
        }

        trace!(series_id, %timestamp, value, "sample recorded");
        Ok(())
    }

    /// Samples with `start <= timestamp < end`, ascending.
    ///
    /// An unknown series or an empty range yields an empty Vec, not an
    /// error. The returned snapshot is owned and restartable.
    pub fn window(
        &self,
        series_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<Sample> {
        self.read_guard()
            .get(series_id)
            .map(|samples| {
                samples
                    .iter()
                    .filter(|s| s.timestamp >= start && s.timestamp < end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Owned snapshot of a whole series, ascending by timestamp
    pub fn snapshot(&self, series_id: &str) -> Vec<Sample> {
        self.read_guard().get(series_id).cloned().unwrap_or_default()
    }

    /// Bucket samples into fixed-width windows and aggregate each bucket.
    ///
    /// Buckets containing no samples are omitted rather than zero-filled.
    /// Each output sample carries the bucket's start timestamp.
    pub fn resample(
        &self,
        series_id: &str,
        bucket: Duration,
        aggregator: Aggregator,
    ) -> Vec<Sample> {
        let samples = self.snapshot(series_id);
        resample_samples(&samples, bucket, aggregator)
    }

    /// Most recent sample; `NotFound` when the series is empty or unknown
    pub fn latest(&self, series_id: &str) -> ForesightResult<Sample> {
        self.read_guard()
            .get(series_id)
            .and_then(|samples| samples.last().copied())
            .ok_or_else(|| ForesightError::not_found(series_id))
    }

    /// Remove samples older than `cutoff`, returning how many were dropped.
    ///
    /// The only way series data ever leaves the store.
    pub fn trim_before(&self, series_id: &str, cutoff: DateTime<Utc>) -> usize {
        let mut series = self.write_guard();
        match series.get_mut(series_id) {
            Some(samples) => {
                let before = samples.len();
                samples.retain(|s| s.timestamp >= cutoff);
                before - samples.len()
            }
            None => 0,
        }
    }

    /// Number of samples held for a series
    pub fn len(&self, series_id: &str) -> usize {
        self.read_guard().get(series_id).map(Vec::len).unwrap_or(0)
    }

    /// Whether a series is empty or unknown
    pub fn is_empty(&self, series_id: &str) -> bool {
        self.len(series_id) == 0
    }

    /// Just the values of a series, ascending by timestamp
    pub fn values(&self, series_id: &str) -> Vec<f64> {
        self.read_guard()
            .get(series_id)
            .map(|samples| samples.iter().map(|s| s.value).collect())
            .unwrap_or_default()
    }

    /// Ids of all series currently held
    pub fn series_ids(&self) -> Vec<ResourceId> {
        self.read_guard().keys().cloned().collect()
    }
}

/// Bucket an already-sorted slice of samples and aggregate each bucket
pub fn resample_samples(samples: &[Sample], bucket: Duration, aggregator: Aggregator) -> Vec<Sample> {
    let bucket_secs = bucket.num_seconds();
    if bucket_secs <= 0 || samples.is_empty() {
        return Vec::new();
    }

    let mut out: Vec<Sample> = Vec::new();
    let mut current_bucket: Option<(i64, Vec<f64>)> = None;

    for sample in samples {
        let bucket_start = sample.timestamp.timestamp().div_euclid(bucket_secs) * bucket_secs;
        match current_bucket.as_mut() {
            Some((start, values)) if *start == bucket_start => values.push(sample.value),
            _ => {
                if let Some((start, values)) = current_bucket.take() {
                    out.push(aggregate_bucket(start, &values, aggregator));
                }
                current_bucket = Some((bucket_start, vec![sample.value]));
            }
        }
    }
    if let Some((start, values)) = current_bucket {
        out.push(aggregate_bucket(start, &values, aggregator));
    }

    out
}

fn aggregate_bucket(bucket_start: i64, values: &[f64], aggregator: Aggregator) -> Sample {
    let value = match aggregator {
        Aggregator::Mean => values.iter().sum::<f64>() / values.len() as f64,
        Aggregator::Max => values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
        Aggregator::Min => values.iter().fold(f64::INFINITY, |a, &b| a.min(b)),
        Aggregator::Sum => values.iter().sum(),
    };
    Sample::new(
        Utc.timestamp_opt(bucket_start, 0).single().unwrap_or_default(),
        value,
    )
}
