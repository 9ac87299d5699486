use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::signal;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::{Identity, Role};
use crate::event::{EmitterSpec, PluginEvent, WireFormat, default_emitters};
use crate::metrics::stats::Stats;
use crate::sample::sample_range;
use crate::shutdown::{Shutdown, ShutdownListener, join_within};
use crate::transport::EventSink;
use crate::transport::mqtt::MqttSink;

const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct GeneratorConfig {
    pub role: Role,
    pub host: String,
    pub port: u16,
    pub format: WireFormat,
}

/// Generator role: resolve identity, connect to the MQTT broker, run one
/// emitter task per signal class until interrupted.
pub async fn run_generator(config: GeneratorConfig) -> Result<()> {
    let identity = Identity::resolve(config.role);

    println!("Starting {} generator:", config.role);
    println!("  Client id: {}", identity.client_id);
    println!("  Broker: {}:{}", config.host, config.port);
    println!("  Format: {}", config.format);

    let sink = MqttSink::connect(&config.host, config.port, &identity)
        .await
        .map_err(|e| anyhow::Error::msg(format!("failed to connect to broker: {e}")))?;
    let sink: Arc<dyn EventSink> = Arc::new(sink);

    let stats = Arc::new(Stats::new());
    let shutdown = Shutdown::new();

    let mut handles = Vec::new();
    for spec in default_emitters() {
        handles.push(tokio::spawn(run_emitter(
            sink.clone(),
            identity.client_id.clone(),
            spec,
            config.format,
            stats.clone(),
            shutdown.subscribe(),
        )));
    }

    signal::ctrl_c().await?;
    println!("Ctrl+C received, stopping {}", config.role);
    shutdown.trigger();
    join_within(handles, JOIN_TIMEOUT).await;

    // Final statistics
    let final_stats = stats.snapshot().await;
    println!("\nFinal generator statistics:");
    println!("  Events published: {}", final_stats.published_count);
    println!("  Errors: {}", final_stats.error_count);
    println!("  Average rate: {:.2} msg/s", final_stats.publish_rate());
    println!(
        "  Total duration: {:.2}s",
        final_stats.total_duration.as_secs_f64()
    );

    let _ = sink.shutdown().await;

    Ok(())
}

/// One periodic emitter: sample, build, encode, publish, log, sleep. Runs
/// until the shutdown signal fires; publish failures are counted and the
/// next tick simply tries again.
pub async fn run_emitter(
    sink: Arc<dyn EventSink>,
    client_id: String,
    spec: EmitterSpec,
    format: WireFormat,
    stats: Arc<Stats>,
    mut shutdown: ShutdownListener,
) {
    let topic = spec.topic();

    loop {
        let value = sample_range(spec.min, spec.max);
        let event = PluginEvent::new(&client_id, spec.code, value);

        match format.encode(&event) {
            Ok(payload) => match sink.publish(&topic, payload).await {
                Ok(()) => {
                    stats.record_published().await;
                    info!(
                        client_id = %event.client_id,
                        code = %event.code,
                        value = event.value,
                        timestamp = event.timestamp,
                        "published event"
                    );
                }
                Err(e) => {
                    warn!(%topic, error = %e, "publish failed");
                    stats.record_error().await;
                }
            },
            Err(e) => {
                warn!(%topic, error = %e, "failed to encode event");
                stats.record_error().await;
            }
        }

        tokio::select! {
            _ = shutdown.recv() => break,
            _ = sleep(spec.interval) => {}
        }
    }
}
