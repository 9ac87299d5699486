//! MQTT sink built on rumqttc (async), QoS 1 publishes.

use std::time::Duration;

use bytes::Bytes;
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::config::Identity;
use crate::transport::{EventSink, TransportError};

const KEEP_ALIVE: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const CHANNEL_CAPACITY: usize = 100;

pub struct MqttSink {
    client: AsyncClient,
    driver: JoinHandle<()>,
}

impl MqttSink {
    /// Connect and wait for the broker's CONNACK. Failures (including the
    /// connect timeout) are returned to the caller, which treats them as
    /// fatal; there is no retry here.
    pub async fn connect(
        host: &str,
        port: u16,
        identity: &Identity,
    ) -> Result<Self, TransportError> {
        let mut options = MqttOptions::new(&identity.client_id, host, port);
        options.set_credentials(
            &identity.credentials.username,
            &identity.credentials.password,
        );
        options.set_keep_alive(KEEP_ALIVE);

        let (client, mut eventloop) = AsyncClient::new(options, CHANNEL_CAPACITY);

        timeout(CONNECT_TIMEOUT, async {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Incoming::ConnAck(_))) => return Ok(()),
                    Ok(_) => {}
                    Err(e) => return Err(TransportError::Connect(e.to_string())),
                }
            }
        })
        .await
        .map_err(|_| {
            TransportError::Connect(format!(
                "no CONNACK from {host}:{port} within {CONNECT_TIMEOUT:?}"
            ))
        })??;
        info!(%host, port, "connected to MQTT broker");

        // Keep polling so acks and keep-alives flow; rumqttc reconnects as
        // long as the loop is driven.
        let driver = tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                        info!("reconnected to MQTT broker");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "MQTT connection lost");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });

        Ok(Self { client, driver })
    }
}

#[async_trait::async_trait]
impl EventSink for MqttSink {
    /// At-least-once, no retain. The eventloop driver handles the PUBACK.
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<(), TransportError> {
        self.client
            .publish(topic, QoS::AtLeastOnce, false, payload.to_vec())
            .await
            .map_err(|e| TransportError::Publish(e.to_string()))
    }

    async fn shutdown(&self) -> Result<(), TransportError> {
        let _ = self.client.disconnect().await;
        self.driver.abort();
        Ok(())
    }
}
