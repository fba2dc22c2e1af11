//! Network throughput probe
//!
//! Downloads from one URL and uploads a zero-filled payload to another,
//! timing both. The whole run is bounded by the configured timeout so a
//! stalled endpoint cannot hold up the bot.

use crate::config::SpeedtestConfig;
use crate::error::{VaultError, VaultResult};
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use std::time::{Duration, Instant};

/// Throughput measured by one run
#[derive(Debug, Clone)]
pub struct SpeedReport {
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub downloaded_bytes: u64,
    pub uploaded_bytes: u64,
    pub measured_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct Speedtest {
    client: reqwest::Client,
    config: SpeedtestConfig,
}

impl Speedtest {
    pub fn new(config: SpeedtestConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Measure download then upload throughput
    pub async fn run(&self) -> VaultResult<SpeedReport> {
        tracing::info!(
            download_url = %self.config.download_url,
            upload_url = %self.config.upload_url,
            "Starting speed test"
        );

        let probe = async {
            let (downloaded_bytes, download_time) = self.measure_download().await?;
            let (uploaded_bytes, upload_time) = self.measure_upload().await?;
            Ok::<_, VaultError>(SpeedReport {
                download_mbps: megabits_per_second(downloaded_bytes, download_time),
                upload_mbps: megabits_per_second(uploaded_bytes, upload_time),
                downloaded_bytes,
                uploaded_bytes,
                measured_at: Utc::now(),
            })
        };

        let report = tokio::time::timeout(self.config.timeout, probe)
            .await
            .map_err(|_| {
                VaultError::ExternalService(format!(
                    "speed test timed out after {}s",
                    self.config.timeout.as_secs()
                ))
            })??;

        tracing::info!(
            download_mbps = report.download_mbps,
            upload_mbps = report.upload_mbps,
            "Speed test finished"
        );
        Ok(report)
    }

    async fn measure_download(&self) -> VaultResult<(u64, Duration)> {
        let started = Instant::now();
        let response = self
            .client
            .get(&self.config.download_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(external)?;

        let mut total = 0u64;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            total += chunk.map_err(external)?.len() as u64;
        }

        Ok((total, started.elapsed()))
    }

    async fn measure_upload(&self) -> VaultResult<(u64, Duration)> {
        let payload = vec![0u8; self.config.upload_bytes];
        let started = Instant::now();

        self.client
            .post(&self.config.upload_url)
            .body(payload)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(external)?;

        Ok((self.config.upload_bytes as u64, started.elapsed()))
    }
}

fn external(err: reqwest::Error) -> VaultError {
    VaultError::ExternalService(format!("speed test request failed: {}", err))
}

/// Convert a byte count over a duration into megabits per second
pub fn megabits_per_second(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= f64::EPSILON {
        return 0.0;
    }
    (bytes as f64 * 8.0) / secs / 1_000_000.0
}
