// ── Screen frames ──

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};

use super::device::DeviceId;

/// One captured screen image of a device.
///
/// `image` is kept in its wire encoding (normally a
/// `data:image/jpeg;base64,...` URL) so consumers that hand it straight
/// to a renderer pay no decoding cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub device_id: DeviceId,
    pub image: String,
    /// Capture time, epoch milliseconds (backend clock).
    pub timestamp: i64,
}

impl Frame {
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// MIME type from a `data:` URL prefix, if present.
    pub fn mime_type(&self) -> Option<&str> {
        let rest = self.image.strip_prefix("data:")?;
        let (header, _) = rest.split_once(',')?;
        header.split(';').next().filter(|m| !m.is_empty())
    }

    /// Decode the image into raw bytes.
    ///
    /// Accepts both a `data:<mime>;base64,` URL and bare base64.
    pub fn image_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        let encoded = match self.image.split_once(";base64,") {
            Some((prefix, data)) if prefix.starts_with("data:") => data,
            _ => self.image.as_str(),
        };
        STANDARD.decode(encoded)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn frame(image: &str) -> Frame {
        Frame {
            device_id: DeviceId::from("1"),
            image: image.into(),
            timestamp: 1_760_000_000_000,
        }
    }

    #[test]
    fn decodes_data_url() {
        let f = frame("data:image/jpeg;base64,/9j/4A==");
        assert_eq!(f.mime_type(), Some("image/jpeg"));
        assert_eq!(f.image_bytes().unwrap(), vec![0xff, 0xd8, 0xff, 0xe0]);
    }

    #[test]
    fn decodes_bare_base64() {
        let f = frame("aGVsbG8=");
        assert_eq!(f.mime_type(), None);
        assert_eq!(f.image_bytes().unwrap(), b"hello");
    }

    #[test]
    fn invalid_base64_is_an_error() {
        assert!(frame("data:image/png;base64,!!!").image_bytes().is_err());
    }

    #[test]
    fn captured_at_converts_millis() {
        let at = frame("").captured_at().unwrap();
        assert_eq!(at.timestamp_millis(), 1_760_000_000_000);
    }
}
