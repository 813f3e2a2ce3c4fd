//! Event stream transport.
//!
//! A [`Connector`] opens one transport instance and hands back a stream of
//! [`Inbound`] items. It knows nothing about reconnection or message types:
//! the session layer in `fleetmirror-core` owns the lifecycle, and the
//! [`codec`](crate::codec) owns decoding. [`WsConnector`] is the production
//! implementation on top of `tokio-tungstenite`.
//!
//! # Example
//!
//! ```rust,ignore
//! use fleetmirror_api::{Connector, Inbound, WsConnector};
//! use futures_util::StreamExt;
//! use url::Url;
//!
//! let url = Url::parse("ws://localhost:8080/api/ws/screen")?;
//! let mut stream = WsConnector.connect(&url).await?;
//!
//! while let Some(Ok(Inbound::Payload(payload))) = stream.next().await {
//!     println!("{payload:?}");
//! }
//! ```

use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use url::Url;

use crate::error::Error;

/// Stream of items from one transport instance. Ends when the connection
/// does; an `Err` item is always the last one.
pub type InboundStream = BoxStream<'static, Result<Inbound, Error>>;

/// Opens event transport instances.
pub trait Connector: Send + Sync + 'static {
    fn connect(&self, url: &Url) -> BoxFuture<'static, Result<InboundStream, Error>>;
}

/// One item received from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Payload(Payload),
    /// The peer sent a close frame.
    Close { code: Option<u16>, reason: String },
}

/// Raw message body, not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

// ── WsConnector ──────────────────────────────────────────────────────

/// WebSocket connector backed by `tokio-tungstenite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn connect(&self, url: &Url) -> BoxFuture<'static, Result<InboundStream, Error>> {
        let url = url.clone();
        Box::pin(async move {
            tracing::info!(url = %url, "Connecting to event stream");

            let uri: tungstenite::http::Uri = url.as_str().parse().map_err(
                |e: tungstenite::http::uri::InvalidUri| Error::WebSocketConnect(e.to_string()),
            )?;

            let (ws_stream, _response) =
                tokio_tungstenite::connect_async(ClientRequestBuilder::new(uri))
                    .await
                    .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

            tracing::info!("Event stream connected");

            // The write half stays inside `ws_stream` so tungstenite can
            // keep answering pings while we only read.
            let stream = ws_stream.filter_map(|frame| std::future::ready(translate(frame)));
            Ok(stream.boxed())
        })
    }
}

/// Map a tungstenite frame onto an [`Inbound`] item, dropping control frames.
fn translate(
    frame: Result<tungstenite::Message, tungstenite::Error>,
) -> Option<Result<Inbound, Error>> {
    match frame {
        Ok(tungstenite::Message::Text(text)) => {
            Some(Ok(Inbound::Payload(Payload::Text(text.as_str().to_owned()))))
        }
        Ok(tungstenite::Message::Binary(bytes)) => {
            Some(Ok(Inbound::Payload(Payload::Binary(bytes.to_vec()))))
        }
        Ok(tungstenite::Message::Close(frame)) => {
            let (code, reason) = frame.map_or((None, String::new()), |cf| {
                (Some(u16::from(cf.code)), cf.reason.as_str().to_owned())
            });
            Some(Ok(Inbound::Close { code, reason }))
        }
        Ok(tungstenite::Message::Ping(_)) => {
            // tungstenite queues the pong itself
            tracing::trace!("WebSocket ping");
            None
        }
        Ok(_) => None,
        Err(e) => Some(Err(Error::WebSocket(e.to_string()))),
    }
}
