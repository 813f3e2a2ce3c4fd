// fleetmirror-api: wire layer for the device fleet backend (event stream + REST commands)

pub mod client;
pub mod codec;
pub mod error;
pub mod models;
pub mod transport;
pub mod websocket;

pub use client::MobileClient;
pub use codec::{DecodeError, ServerEvent};
pub use error::{Error, FailureKind};
pub use websocket::{Connector, Inbound, InboundStream, Payload, WsConnector};
