//! Timestamp codec
//!
//! Stores UTC instants as fixed-width RFC 3339 strings with millisecond
//! precision (`2024-03-01T12:00:00.000Z`). Years are restricted to four
//! digits so the width, and with it the ordering, stays fixed.

use chrono::{DateTime, Datelike, Utc};

use super::traits::ValueCodec;
use crate::error::{EncodeError, RestoreError};
use crate::value::{Value, ValueType};

/// Stored timestamp format
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Ordered UTC timestamp codec
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimestampCodec;

impl TimestampCodec {
    fn check_year(&self, t: &DateTime<Utc>) -> Result<(), EncodeError> {
        if (0..=9999).contains(&t.year()) {
            Ok(())
        } else {
            Err(EncodeError::OutOfRange {
                codec: self.codec_id().to_string(),
                value: t.to_string(),
                reason: "year outside 0000..=9999".to_string(),
            })
        }
    }
}

impl ValueCodec for TimestampCodec {
    fn encode(&self, value: &Value) -> Result<String, EncodeError> {
        let mismatch = || EncodeError::TypeMismatch {
            codec: self.codec_id().to_string(),
            expected: ValueType::Timestamp,
            found: value.type_name(),
        };
        let t = match value {
            Value::Timestamp(t) => *t,
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|_| mismatch())?,
            _ => return Err(mismatch()),
        };
        self.check_year(&t)?;
        Ok(t.format(TIMESTAMP_FORMAT).to_string())
    }

    fn decode(&self, stored: &str) -> Result<Value, RestoreError> {
        DateTime::parse_from_rfc3339(stored)
            .map(|t| Value::Timestamp(t.with_timezone(&Utc)))
            .map_err(|e| RestoreError::new(stored, ValueType::Timestamp, e.to_string()))
    }

    fn codec_id(&self) -> &str {
        "timestamp"
    }

    fn value_type(&self) -> &ValueType {
        &ValueType::Timestamp
    }

    fn is_ordered(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_fixed_width_millis() {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let encoded = TimestampCodec.encode(&Value::Timestamp(t)).unwrap();
        assert_eq!(encoded, "2024-03-01T12:00:00.000Z");
        assert_eq!(TimestampCodec.decode(&encoded).unwrap(), Value::Timestamp(t));
    }

    #[test]
    fn test_ordering() {
        let a = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        let b = a + Duration::milliseconds(1);
        let ea = TimestampCodec.encode(&Value::Timestamp(a)).unwrap();
        let eb = TimestampCodec.encode(&Value::Timestamp(b)).unwrap();
        assert!(ea < eb);
    }

    #[test]
    fn test_string_operand_is_normalized() {
        let encoded = TimestampCodec
            .encode(&Value::from("2024-03-01T13:00:00+01:00"))
            .unwrap();
        assert_eq!(encoded, "2024-03-01T12:00:00.000Z");
    }

    #[test]
    fn test_decode_garbage() {
        let err = TimestampCodec.decode("yesterday").unwrap_err();
        assert_eq!(err.target, ValueType::Timestamp);
    }

    #[test]
    fn test_wrong_type() {
        assert!(TimestampCodec.encode(&Value::Int(1)).is_err());
    }
}
