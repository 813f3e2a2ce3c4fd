// ── Session driver ──
//
// One task owns all session state and processes signals strictly in
// arrival order. Each connection attempt gets a fresh generation and a
// pump task that decodes transport items and forwards them over a
// bounded channel; the driver drops anything tagged with an older
// generation. When the channel is full, frames are shed and every other
// signal waits for room.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use url::Url;

use fleetmirror_api::codec::{self, DecodeError, ServerEvent};
use fleetmirror_api::{Connector, Inbound};

use super::{CloseReason, SessionConfig, SessionState, SessionStatus};
use crate::model::{Device, DeviceId, Frame};
use crate::relay::FrameRelay;
use crate::store::Registry;

/// Signals buffered between a pump and the driver.
const SIGNAL_BUFFER: usize = 64;

/// What a pump reports about its transport.
#[derive(Debug)]
pub(super) enum Signal {
    Opened,
    Event(Result<ServerEvent, DecodeError>),
    Closed(CloseReason),
}

#[derive(Debug)]
pub(super) struct Tagged {
    pub(super) generation: u64,
    pub(super) signal: Signal,
}

pub(super) struct Driver<C: Connector + ?Sized> {
    config: SessionConfig,
    connector: Arc<C>,
    registry: Arc<Registry>,
    relay: FrameRelay,
    status: watch::Sender<SessionStatus>,
    cancel: CancellationToken,

    signals_tx: mpsc::Sender<Tagged>,
    signals_rx: mpsc::Receiver<Tagged>,
    generation: u64,
    pump: Option<JoinHandle<()>>,
    reconnect_at: Option<Instant>,
}

impl<C: Connector + ?Sized> Driver<C> {
    pub(super) fn new(
        config: SessionConfig,
        connector: Arc<C>,
        registry: Arc<Registry>,
        relay: FrameRelay,
        status: watch::Sender<SessionStatus>,
        cancel: CancellationToken,
    ) -> Self {
        let (signals_tx, signals_rx) = mpsc::channel(SIGNAL_BUFFER);
        Self {
            config,
            connector,
            registry,
            relay,
            status,
            cancel,
            signals_tx,
            signals_rx,
            generation: 0,
            pump: None,
            reconnect_at: None,
        }
    }

    pub(super) async fn run(mut self) {
        self.connect();

        loop {
            let deadline = self.reconnect_at;
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                Some(tagged) = self.signals_rx.recv() => self.handle(tagged),
                () = wait_until(deadline) => {
                    self.reconnect_at = None;
                    info!(attempt = self.generation + 1, "reconnecting to event stream");
                    self.connect();
                }
            }
        }

        self.teardown();
    }

    /// Start a new attempt, replacing any previous transport.
    fn connect(&mut self) {
        if let Some(old) = self.pump.take() {
            old.abort();
        }
        self.generation += 1;
        let generation = self.generation;

        self.status.send_modify(|s| {
            s.state = SessionState::Connecting;
            s.generation = generation;
        });

        self.pump = Some(tokio::spawn(pump(
            Arc::clone(&self.connector),
            self.config.url.clone(),
            generation,
            self.signals_tx.clone(),
        )));
    }

    pub(super) fn handle(&mut self, tagged: Tagged) {
        if tagged.generation != self.generation {
            trace!(
                generation = tagged.generation,
                current = self.generation,
                "dropping signal from stale transport"
            );
            return;
        }

        match tagged.signal {
            Signal::Opened => {
                info!(generation = self.generation, "event stream open");
                self.registry.set_connected(true);
                self.status.send_modify(|s| {
                    s.state = SessionState::Open;
                    s.retries = 0;
                });
            }
            Signal::Event(event) => self.dispatch(event),
            Signal::Closed(reason) => {
                self.pump = None;
                self.registry.set_connected(false);
                let delay = self.config.reconnect_delay;
                warn!(
                    generation = self.generation,
                    reason = %reason,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "event stream closed, will reconnect"
                );
                self.status.send_modify(|s| {
                    s.state = SessionState::Closed(reason);
                    s.retries = s.retries.saturating_add(1);
                });
                self.reconnect_at = Some(Instant::now() + delay);
            }
        }
    }

    /// Route one decoded event to the registry or the frame relay.
    fn dispatch(&self, event: Result<ServerEvent, DecodeError>) {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "dropping undecodable event");
                return;
            }
        };
        self.registry.mark_event();

        match event {
            ServerEvent::Frame(msg) => self.relay.publish(Frame::from(msg)),
            ServerEvent::DeviceStatus(msg) => {
                debug!(device_id = %msg.device_id, status = %msg.status, "device status");
                self.registry.update_device_status(
                    &DeviceId::from(msg.device_id),
                    msg.status,
                    msg.connected,
                );
            }
            ServerEvent::DeviceList(msg) => {
                debug!(count = msg.devices.len(), "device list");
                self.registry
                    .set_devices(msg.devices.into_iter().map(Device::from));
            }
            ServerEvent::Unknown { kind } => debug!(kind, "ignoring unhandled event type"),
        }
    }

    fn teardown(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.reconnect_at = None;
        self.registry.set_connected(false);
        self.status
            .send_modify(|s| s.state = SessionState::Closed(CloseReason::Shutdown));
        info!("event session shut down");
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Drive one transport instance, forwarding everything as tagged signals.
async fn pump<C: Connector + ?Sized>(
    connector: Arc<C>,
    url: Url,
    generation: u64,
    tx: mpsc::Sender<Tagged>,
) {
    let send = |signal| {
        let tx = tx.clone();
        async move { tx.send(Tagged { generation, signal }).await.is_ok() }
    };

    let mut stream = match connector.connect(&url).await {
        Ok(stream) => stream,
        Err(e) => {
            send(Signal::Closed(CloseReason::ConnectFailed(e.to_string()))).await;
            return;
        }
    };

    if !send(Signal::Opened).await {
        return;
    }

    let reason = loop {
        match stream.next().await {
            Some(Ok(Inbound::Payload(payload))) => {
                let event = codec::decode_payload(&payload);
                if let Ok(ServerEvent::Frame(msg)) = event {
                    let signal = Signal::Event(Ok(ServerEvent::Frame(msg)));
                    match tx.try_send(Tagged { generation, signal }) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => trace!(generation, "driver busy, frame shed"),
                        Err(TrySendError::Closed(_)) => return,
                    }
                } else if !send(Signal::Event(event)).await {
                    return;
                }
            }
            Some(Ok(Inbound::Close { code, reason })) => break CloseReason::Remote { code, reason },
            Some(Err(e)) => break CloseReason::Transport(e.to_string()),
            None => break CloseReason::Ended,
        }
    };

    send(Signal::Closed(reason)).await;
}
