//! Event stream message codec.
//!
//! Turns one raw inbound payload into a [`ServerEvent`]. Dispatch is on the
//! `type` field: the three known kinds decode into typed structs, anything
//! else becomes [`ServerEvent::Unknown`] so newer servers can add message
//! types without breaking older clients. Decoding is pure -- logging and
//! routing are the caller's job.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::models::{DeviceListMessage, DeviceStatusMessage, FrameMessage};
use crate::websocket::Payload;

/// A recognised inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Display-only screen frame.
    Frame(FrameMessage),
    /// Status change of a single device.
    DeviceStatus(DeviceStatusMessage),
    /// Full device list (authoritative resync).
    DeviceList(DeviceListMessage),
    /// Well-formed message with a `type` this client does not handle.
    Unknown { kind: String },
}

impl ServerEvent {
    /// The wire `type` tag of this event.
    pub fn kind(&self) -> &str {
        match self {
            Self::Frame(_) => "frame",
            Self::DeviceStatus(_) => "device_status",
            Self::DeviceList(_) => "device_list",
            Self::Unknown { kind } => kind,
        }
    }
}

/// A payload that could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("payload is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    #[error("payload has no string `type` field")]
    MissingType,

    #[error("malformed `{kind}` message: {source}")]
    Malformed {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Decode a text payload.
pub fn decode(text: &str) -> Result<ServerEvent, DecodeError> {
    let value: Value = serde_json::from_str(text).map_err(DecodeError::Syntax)?;

    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingType)?
        .to_owned();

    match kind.as_str() {
        "frame" => typed(kind, value).map(ServerEvent::Frame),
        "device_status" => typed(kind, value).map(ServerEvent::DeviceStatus),
        "device_list" => typed(kind, value).map(ServerEvent::DeviceList),
        _ => Ok(ServerEvent::Unknown { kind }),
    }
}

/// Decode a binary payload; it must carry UTF-8 JSON like a text frame.
pub fn decode_bytes(bytes: &[u8]) -> Result<ServerEvent, DecodeError> {
    decode(std::str::from_utf8(bytes)?)
}

/// Decode whatever the transport delivered.
pub fn decode_payload(payload: &Payload) -> Result<ServerEvent, DecodeError> {
    match payload {
        Payload::Text(text) => decode(text),
        Payload::Binary(bytes) => decode_bytes(bytes),
    }
}

fn typed<T: DeserializeOwned>(kind: String, value: Value) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|source| DecodeError::Malformed { kind, source })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_device_status() {
        let event =
            decode(r#"{"type":"device_status","deviceId":"d1","status":"busy","connected":true}"#)
                .unwrap();

        assert_eq!(
            event,
            ServerEvent::DeviceStatus(DeviceStatusMessage {
                device_id: "d1".into(),
                status: "busy".into(),
                connected: true,
            })
        );
    }

    #[test]
    fn decodes_frame_with_numeric_device_id() {
        let event = decode(
            r#"{"type":"frame","deviceId":7,"image":"data:image/jpeg;base64,/9j/","timestamp":1760000000000}"#,
        )
        .unwrap();

        let ServerEvent::Frame(frame) = event else {
            panic!("expected frame, got {event:?}");
        };
        assert_eq!(frame.device_id, "7");
        assert_eq!(frame.timestamp, 1_760_000_000_000);
    }

    #[test]
    fn decodes_device_list_and_ignores_extra_fields() {
        let event = decode(
            r#"{"type":"device_list","timestamp":1,"devices":[
                {"id":1,"ip":"192.168.31.1","port":9801,"status":"online","connected":true},
                {"id":2,"ip":"192.168.31.2","port":9801,"status":"offline","connected":false}
            ]}"#,
        )
        .unwrap();

        let ServerEvent::DeviceList(list) = event else {
            panic!("expected device list, got {event:?}");
        };
        assert_eq!(list.devices.len(), 2);
        assert_eq!(list.devices[1].id, "2");
    }

    #[test]
    fn unknown_type_is_tolerated() {
        let event = decode(r#"{"type":"bogus"}"#).unwrap();
        assert_eq!(event, ServerEvent::Unknown { kind: "bogus".into() });
        assert_eq!(event.kind(), "bogus");
    }

    #[test]
    fn server_greetings_are_unknown_events() {
        let event = decode(r#"{"type":"welcome","data":"connected","timestamp":1}"#).unwrap();
        assert_eq!(event.kind(), "welcome");
    }

    #[test]
    fn invalid_json_is_a_syntax_error() {
        assert!(matches!(decode("not json at all"), Err(DecodeError::Syntax(_))));
    }

    #[test]
    fn missing_or_non_string_type_is_rejected() {
        assert!(matches!(decode(r#"{"deviceId":"d1"}"#), Err(DecodeError::MissingType)));
        assert!(matches!(decode(r#"{"type":3}"#), Err(DecodeError::MissingType)));
        assert!(matches!(decode("[1,2,3]"), Err(DecodeError::MissingType)));
    }

    #[test]
    fn known_type_with_bad_fields_is_malformed() {
        let err = decode(r#"{"type":"device_status","deviceId":"d1","status":"busy"}"#)
            .unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { ref kind, .. } if kind == "device_status"));
    }

    #[test]
    fn binary_payloads_must_be_utf8() {
        let payload = Payload::Binary(vec![0xff, 0xfe, 0x00]);
        assert!(matches!(decode_payload(&payload), Err(DecodeError::Utf8(_))));

        let payload = Payload::Binary(br#"{"type":"device_list","devices":[]}"#.to_vec());
        assert!(matches!(decode_payload(&payload), Ok(ServerEvent::DeviceList(_))));
    }
}
