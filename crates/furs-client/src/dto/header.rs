//! Message headers.

use furs_core::CivilDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header of every sealed request: a fresh message id and the send time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FursHeader {
    #[serde(rename = "MessageID")]
    pub message_id: Uuid,
    #[serde(rename = "DateTime")]
    pub date_time: CivilDateTime,
}

impl FursHeader {
    /// A random v4 message id stamped with the current Ljubljana time.
    pub fn new() -> Self {
        Self::with(Uuid::new_v4(), CivilDateTime::now())
    }

    pub fn with(message_id: Uuid, date_time: CivilDateTime) -> Self {
        Self {
            message_id,
            date_time,
        }
    }
}

impl Default for FursHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Header echoed back in responses. Kept loose: nothing in it affects how a
/// response is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResponseHeader {
    #[serde(rename = "MessageID", default)]
    pub message_id: Option<Uuid>,
    #[serde(rename = "DateTime", default)]
    pub date_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_wire_names() {
        let id = Uuid::parse_str("4a2c5e1f-0b3d-4c6e-8f7a-1b2c3d4e5f60").unwrap();
        let header = FursHeader::with(id, CivilDateTime::parse("2024-03-15T10:00:00").unwrap());
        assert_eq!(
            serde_json::to_string(&header).unwrap(),
            r#"{"MessageID":"4a2c5e1f-0b3d-4c6e-8f7a-1b2c3d4e5f60","DateTime":"2024-03-15T10:00:00"}"#
        );
    }

    #[test]
    fn new_headers_get_distinct_ids() {
        assert_ne!(FursHeader::new().message_id, FursHeader::new().message_id);
    }

    #[test]
    fn response_header_tolerates_missing_fields() {
        let header: ResponseHeader = serde_json::from_str("{}").unwrap();
        assert_eq!(header, ResponseHeader::default());
    }
}
