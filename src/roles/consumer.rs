use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rdkafka::consumer::StreamConsumer;
use rdkafka::message::Message;
use tokio::signal;
use tokio::time::{interval, timeout};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::event::{PluginEvent, now_millis};
use crate::metrics::stats::Stats;
use crate::shutdown::{Shutdown, ShutdownListener, join_within};
use crate::transport::kafka::create_consumer;

const POLL_TIMEOUT: Duration = Duration::from_millis(100);
const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ConsumerConfig {
    pub topic: String,
    pub group: Option<String>,
    pub brokers: String,
    pub snapshot_interval_secs: u64,
}

/// Consumer role: subscribe to one topic and poll until interrupted,
/// decoding each payload as a JSON event.
pub async fn run_consumer(config: ConsumerConfig) -> Result<()> {
    let group = resolve_group(config.group);

    println!("Starting consumer:");
    println!("  Brokers: {}", config.brokers);
    println!("  Topic: {}", config.topic);
    println!("  Group: {group}");

    let consumer = create_consumer(&config.brokers, &group, &config.topic)
        .map_err(|e| anyhow::Error::msg(format!("failed to create consumer: {e}")))?;

    let stats = Arc::new(Stats::new());
    let shutdown = Shutdown::new();

    let mut handles = Vec::new();
    handles.push(tokio::spawn(run_poll_loop(
        consumer,
        stats.clone(),
        shutdown.subscribe(),
    )));

    // Periodic stats snapshot
    let snapshot_stats = stats.clone();
    let mut snapshot_shutdown = shutdown.subscribe();
    let interval_secs = config.snapshot_interval_secs;
    handles.push(tokio::spawn(async move {
        let mut timer = interval(Duration::from_secs(interval_secs));
        timer.tick().await; // the first tick completes immediately
        loop {
            tokio::select! {
                _ = snapshot_shutdown.recv() => break,
                _ = timer.tick() => {
                    let snap = snapshot_stats.snapshot().await;
                    println!(
                        "Consumer stats - Consumed: {}, Errors: {}, Rate: {:.2} msg/s, P99 latency: {}ms",
                        snap.consumed_count,
                        snap.error_count,
                        snap.interval_consume_rate(),
                        snap.latency_ms_p99
                    );
                }
            }
        }
    }));

    signal::ctrl_c().await?;
    println!("Ctrl+C received, stopping consumer");
    shutdown.trigger();
    join_within(handles, JOIN_TIMEOUT).await;

    // Final statistics
    let final_stats = stats.snapshot().await;
    println!("\nFinal consumer statistics:");
    println!("  Events consumed: {}", final_stats.consumed_count);
    println!("  Errors: {}", final_stats.error_count);
    println!("  Average rate: {:.2} msg/s", final_stats.consume_rate());
    println!(
        "  Latency P50: {}ms, P95: {}ms, P99: {}ms",
        final_stats.latency_ms_p50, final_stats.latency_ms_p95, final_stats.latency_ms_p99
    );
    println!(
        "  Total duration: {:.2}s",
        final_stats.total_duration.as_secs_f64()
    );

    Ok(())
}

/// A missing or empty group id gets a fresh random one, which is logged and
/// actually applied to the consumer configuration.
fn resolve_group(group: Option<String>) -> String {
    match group {
        Some(group) if !group.is_empty() => group,
        _ => {
            let group = Uuid::new_v4().to_string();
            println!("No consumer group supplied, using random group: {group}");
            group
        }
    }
}

/// Poll loop with a bounded wait per call so the task stays responsive to
/// shutdown. Timeouts and transient broker errors are retried on the next
/// iteration without comment.
async fn run_poll_loop(consumer: StreamConsumer, stats: Arc<Stats>, mut shutdown: ShutdownListener) {
    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            polled = timeout(POLL_TIMEOUT, consumer.recv()) => match polled {
                Err(_) => {} // nothing within the poll window
                Ok(Err(e)) => debug!(error = %e, "poll error"),
                Ok(Ok(message)) => {
                    let key = message
                        .key()
                        .map(|k| String::from_utf8_lossy(k).into_owned())
                        .unwrap_or_default();
                    process_payload(
                        &stats,
                        &key,
                        message.payload().unwrap_or_default(),
                        message.partition(),
                        message.offset(),
                    )
                    .await;
                }
            }
        }
    }
}

/// Decode one record. A malformed payload is logged with partition/offset
/// context and counted; it never terminates the loop.
async fn process_payload(stats: &Stats, key: &str, payload: &[u8], partition: i32, offset: i64) {
    match serde_json::from_slice::<PluginEvent>(payload) {
        Ok(event) => {
            let latency_ms = (now_millis() - event.timestamp).max(0) as u64;
            stats.record_consumed(latency_ms).await;
            info!(
                key,
                client_id = %event.client_id,
                code = %event.code,
                value = event.value,
                timestamp = event.timestamp,
                "consumed record"
            );
        }
        Err(e) => {
            warn!(partition, offset, error = %e, "failed to decode event payload");
            stats.record_error().await;
        }
    }
}
