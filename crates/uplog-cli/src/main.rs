use std::env::{self, VarError};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use uplog_core::domain::{LogBatch, LogLevel, LogRecord, UploadError};
use uplog_core::impls::{InMemoryLogStorage, TracingEventSink};
use uplog_core::ports::{Clock, EventSink, LogUploader, SystemClock};
use uplog_core::{DriverBuilder, PolicyConfig, PolicyError};

#[derive(Debug, thiserror::Error)]
enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    NotPositive { name: &'static str, value: String },

    #[error("{name} must be a non-negative integer, got {value:?}")]
    NotInteger { name: &'static str, value: String },

    #[error("{name} is not valid unicode")]
    NotUnicode { name: &'static str },

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Build(#[from] uplog_core::app::BuildError),
}

#[derive(Debug, Clone)]
struct CliConfig {
    policy: PolicyConfig,
    tick_every: Duration,
    run_for: Duration,
    fail_first: u32,
}

impl CliConfig {
    fn load() -> Result<Self, ConfigError> {
        let policy = parse_policy("UPLOG_POLICY", env::var("UPLOG_POLICY"))?;
        let tick_ms = parse_positive_u64("UPLOG_TICK_MS", env::var("UPLOG_TICK_MS"), 250)?;
        let run_ms = parse_positive_u64("UPLOG_RUN_MS", env::var("UPLOG_RUN_MS"), 5_000)?;
        let fail_first = parse_u32("UPLOG_FAIL_FIRST", env::var("UPLOG_FAIL_FIRST"), 1)?;

        Ok(Self {
            policy,
            tick_every: Duration::from_millis(tick_ms),
            run_for: Duration::from_millis(run_ms),
            fail_first,
        })
    }
}

// 各 parse_* は env::var() の結果を受け取る（テストは環境変数を書き換えない）

/// Unset means "not configured"; a value that is present but not unicode is an error.
fn present(name: &'static str, raw: Result<String, VarError>) -> Result<Option<String>, ConfigError> {
    match raw {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode { name }),
    }
}

fn parse_policy(
    name: &'static str,
    raw: Result<String, VarError>,
) -> Result<PolicyConfig, ConfigError> {
    match present(name, raw)? {
        Some(json) if !json.trim().is_empty() => Ok(PolicyConfig::from_json(&json)?),
        _ => Ok(PolicyConfig::default()),
    }
}

fn parse_positive_u64(
    name: &'static str,
    raw: Result<String, VarError>,
    default: u64,
) -> Result<u64, ConfigError> {
    let Some(raw) = present(name, raw)? else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::NotPositive { name, value: raw }),
    }
}

fn parse_u32(
    name: &'static str,
    raw: Result<String, VarError>,
    default: u32,
) -> Result<u32, ConfigError> {
    let Some(raw) = present(name, raw)? else {
        return Ok(default);
    };
    raw.trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::NotInteger { name, value: raw })
}

/// Pretends to send batches; fails the first `n` attempts.
struct ConsoleUploader {
    remaining_failures: AtomicU32,
}

impl ConsoleUploader {
    fn new(n: u32) -> Self {
        Self {
            remaining_failures: AtomicU32::new(n),
        }
    }
}

#[async_trait]
impl LogUploader for ConsoleUploader {
    async fn upload(&self, batch: &LogBatch) -> Result<(), UploadError> {
        let left = self.remaining_failures.load(Ordering::Relaxed);
        if left > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(UploadError::Transport(format!(
                "intentional failure (left={left})"
            )));
        }

        info!(batch_id = %batch.id, records = batch.len(), "sent");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    stats: uplog_core::app::DriverStats,
    flushed_records: usize,
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        warn!(error = %err, "uplog demo failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ConfigError> {
    let config = CliConfig::load()?;
    info!(?config, "starting");

    // (A) storage / uploader / policy を用意
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let sink: Arc<dyn EventSink> = Arc::new(TracingEventSink);
    let storage = Arc::new(InMemoryLogStorage::new());
    let policy = config.policy.build(Arc::clone(&sink), clock.now())?;

    let driver = DriverBuilder::new()
        .storage(storage.clone())
        .uploader(Arc::new(ConsoleUploader::new(config.fail_first)))
        .policy(policy)
        .event_sink(sink)
        .clock(Arc::clone(&clock))
        .tick_every(config.tick_every)
        .upload_timeout(Duration::from_secs(5))
        .build()?;
    let driver = Arc::new(driver);

    // (B) driver をバックグラウンドで起動
    let handle = Arc::clone(&driver).spawn();

    // (C) 合成ログを投入
    let producer = {
        let storage = storage.clone();
        let clock = Arc::clone(&clock);
        tokio::spawn(async move {
            let mut seq: u64 = 0;
            loop {
                let level = if seq % 10 == 9 { LogLevel::Warn } else { LogLevel::Info };
                storage.append(LogRecord::new(
                    clock.utc_now(),
                    level,
                    serde_json::json!({ "seq": seq, "msg": "synthetic record" }),
                ));
                seq += 1;
                sleep(Duration::from_millis(40)).await;
            }
        })
    };

    sleep(config.run_for).await;

    // (D) 停止して残りを flush
    producer.abort();
    handle.shutdown_and_join().await;

    let flushed_records = match driver.flush_now().await {
        Ok(summary) => summary.records,
        Err(err) => {
            warn!(error = %err, "final flush failed");
            0
        }
    };

    let summary = Summary {
        stats: driver.stats(),
        flushed_records,
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(err) => warn!(error = %err, "could not encode summary"),
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
