//! Metrics for video-source extraction
//!
//! Tracks outcomes per terminal failure kind, how many mirrors were decoded
//! or dropped, and response times.

use crate::models::{ExtractionFailure, ExtractionResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractionMetrics {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub page_not_found: u64,
    pub no_video_servers: u64,
    pub no_valid_links: u64,
    pub mirrors_decoded: u64,
    pub mirrors_dropped: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub average_response_time_ms: f64,
    pub total_response_time_ms: u64,
}

impl ExtractionMetrics {
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            (self.successful_requests as f64 / self.total_requests as f64) * 100.0
        }
    }

    pub fn failed_requests(&self) -> u64 {
        self.total_requests - self.successful_requests
    }

    pub fn record(&mut self, result: &ExtractionResult, dropped: usize, response_time: Duration) {
        self.total_requests += 1;
        self.mirrors_decoded += result.descriptors().len() as u64;
        self.mirrors_dropped += dropped as u64;

        self.total_response_time_ms += response_time.as_millis() as u64;
        self.average_response_time_ms =
            self.total_response_time_ms as f64 / self.total_requests as f64;

        match result.failure() {
            None => {
                self.successful_requests += 1;
                self.last_success = Some(Utc::now());
            }
            Some(failure) => {
                match failure {
                    ExtractionFailure::PageNotFound => self.page_not_found += 1,
                    ExtractionFailure::NoVideoServers => self.no_video_servers += 1,
                    ExtractionFailure::NoValidLinks => self.no_valid_links += 1,
                }
                self.last_failure = Some(Utc::now());
                self.last_error = Some(failure.to_string());
            }
        }
    }
}

/// Shared metrics tracker
#[derive(Default)]
pub struct MetricsTracker {
    metrics: Mutex<ExtractionMetrics>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ExtractionMetrics> {
        self.metrics.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn record_extraction(&self, result: &ExtractionResult, dropped: usize, response_time: Duration) {
        let mut metrics = self.lock();
        metrics.record(result, dropped, response_time);

        log::debug!(
            "Extraction took {}ms - success rate: {:.2}%",
            response_time.as_millis(),
            metrics.success_rate()
        );
    }

    pub fn snapshot(&self) -> ExtractionMetrics {
        self.lock().clone()
    }

    /// Human readable report served at `/metrics/summary`
    pub fn summary(&self) -> String {
        let m = self.snapshot();
        let mut out = String::new();

        // Writing into a String never fails
        let _ = writeln!(out, "=== Video Source Extraction ===");
        let _ = writeln!(out, "Success Rate: {:.2}%", m.success_rate());
        let _ = writeln!(out, "Total Requests: {}", m.total_requests);
        let _ = writeln!(out, "Successful: {}", m.successful_requests);
        let _ = writeln!(out, "Failed: {}", m.failed_requests());
        let _ = writeln!(out, "  Page Not Found: {}", m.page_not_found);
        let _ = writeln!(out, "  No Video Servers: {}", m.no_video_servers);
        let _ = writeln!(out, "  No Valid Links: {}", m.no_valid_links);
        let _ = writeln!(out, "Mirrors Decoded: {}", m.mirrors_decoded);
        let _ = writeln!(out, "Mirrors Dropped: {}", m.mirrors_dropped);
        let _ = writeln!(out, "Avg Response Time: {:.2}ms", m.average_response_time_ms);
        if let Some(last_error) = &m.last_error {
            let _ = writeln!(out, "Last Error: {}", last_error);
        }
        out
    }
}
