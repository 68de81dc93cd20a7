//! Lexicographic range encoding for numbers
//!
//! The store compares attribute values byte-wise, so numbers are written as
//! fixed-width, non-negative digit strings:
//!
//! | Configuration | Encoding of `v` | Ordered |
//! |---------------|-----------------|---------|
//! | `max_digits > 0` | `pad(v + offset, max_digits)`, `v + offset >= 0` | yes |
//! | `max_digits == 0, offset != 0` | `v + offset`, unpadded | no |
//! | neither | natural string form | no |
//!
//! Floats are first scaled to fixed point with `right` fractional digits,
//! shifted by `offset * 10^right` and padded to `left + right` digits with a
//! decimal point in between.
//!
//! ## Contract
//!
//! - Values that do not fit the configured width, or that shift below zero,
//!   are rejected with [`EncodeError::OutOfRange`]. Nothing is truncated.
//! - For every value `v` in range: `decode(encode(v)) == v`.
//! - For `a < b` in range: `encode(a) < encode(b)` (ordered configurations).
//! - The offset itself must fit the width; [`IntegerCodec::fits_layout`] and
//!   [`FloatCodec::fits_layout`] check a configuration before it is used.

use super::traits::ValueCodec;
use crate::error::{EncodeError, RestoreError};
use crate::value::{Value, ValueType};

/// Largest supported width; 10^38 still fits an i128.
pub const MAX_DIGITS: usize = 38;

fn pow10(exp: usize) -> i128 {
    10i128.pow(exp as u32)
}

fn digit_count(n: i128) -> usize {
    n.unsigned_abs().to_string().len()
}

fn pad(digits: String, width: usize) -> String {
    if digits.len() >= width {
        digits
    } else {
        format!("{}{}", "0".repeat(width - digits.len()), digits)
    }
}

/// Zero-padded, offset-shifted codec for `Int` and `Long` values
///
/// # Example
///
/// ```
/// use domainmap_core::codec::{IntegerCodec, ValueCodec};
/// use domainmap_core::Value;
///
/// let codec = IntegerCodec::int(4, 1000);
/// assert_eq!(codec.encode(&Value::Int(-5)).unwrap(), "0995");
/// assert_eq!(codec.decode("0995").unwrap(), Value::Int(-5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerCodec {
    value_type: ValueType,
    max_digits: usize,
    offset: i64,
}

impl IntegerCodec {
    /// Codec for `value_type` (`Int` or `Long`)
    ///
    /// Any other value type is treated as `Long`.
    pub fn new(value_type: ValueType, max_digits: usize, offset: i64) -> Self {
        let value_type = match value_type {
            ValueType::Int => ValueType::Int,
            _ => ValueType::Long,
        };
        IntegerCodec {
            value_type,
            max_digits: max_digits.min(MAX_DIGITS),
            offset,
        }
    }

    /// Codec for 32-bit attributes
    pub fn int(max_digits: usize, offset: i64) -> Self {
        Self::new(ValueType::Int, max_digits, offset)
    }

    /// Codec for 64-bit attributes
    pub fn long(max_digits: usize, offset: i64) -> Self {
        Self::new(ValueType::Long, max_digits, offset)
    }

    /// Configured width
    pub fn max_digits(&self) -> usize {
        self.max_digits
    }

    /// Configured offset
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Whether `max_digits` and `offset` form a fixed-width layout
    ///
    /// A non-zero offset needs a width that can hold it.
    pub fn fits_layout(max_digits: usize, offset: i64) -> bool {
        if max_digits > MAX_DIGITS {
            return false;
        }
        offset == 0 || (max_digits > 0 && digit_count(offset as i128) <= max_digits)
    }

    fn is_natural(&self) -> bool {
        self.offset == 0 && self.max_digits == 0
    }

    fn out_of_range(&self, value: impl ToString, reason: impl Into<String>) -> EncodeError {
        EncodeError::OutOfRange {
            codec: self.codec_id().to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    fn narrow(&self, n: i128, stored: &str) -> Result<Value, RestoreError> {
        let overflow = || RestoreError::new(stored, self.value_type.clone(), "overflow");
        match self.value_type {
            ValueType::Int => i32::try_from(n).map(Value::Int).map_err(|_| overflow()),
            _ => i64::try_from(n).map(Value::Long).map_err(|_| overflow()),
        }
    }
}

impl ValueCodec for IntegerCodec {
    fn encode(&self, value: &Value) -> Result<String, EncodeError> {
        let n = value.as_integral().ok_or_else(|| EncodeError::TypeMismatch {
            codec: self.codec_id().to_string(),
            expected: self.value_type.clone(),
            found: value.type_name(),
        })?;

        if self.is_natural() {
            return Ok(n.to_string());
        }

        let shifted = n
            .checked_add(self.offset as i128)
            .ok_or_else(|| self.out_of_range(n, "overflows the shift"))?;
        if shifted < 0 {
            return Err(self.out_of_range(n, format!("below -{}", self.offset)));
        }
        let digits = shifted.to_string();
        if self.max_digits > 0 && digits.len() > self.max_digits {
            return Err(self.out_of_range(n, format!("wider than {} digits", self.max_digits)));
        }
        Ok(pad(digits, self.max_digits))
    }

    fn decode(&self, stored: &str) -> Result<Value, RestoreError> {
        let fail = |reason: &str| RestoreError::new(stored, self.value_type.clone(), reason);

        if self.is_natural() {
            let n = stored
                .parse::<i128>()
                .map_err(|e| fail(&e.to_string()))?;
            return self.narrow(n, stored);
        }

        if stored.is_empty() || !stored.bytes().all(|b| b.is_ascii_digit()) {
            return Err(fail("expected zero-padded digits"));
        }
        if stored.len() > MAX_DIGITS {
            return Err(fail("too many digits"));
        }
        let shifted = stored.parse::<i128>().map_err(|e| fail(&e.to_string()))?;
        let n = shifted
            .checked_sub(self.offset as i128)
            .ok_or_else(|| fail("overflow"))?;
        self.narrow(n, stored)
    }

    fn codec_id(&self) -> &str {
        "numeric"
    }

    fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    fn is_ordered(&self) -> bool {
        self.max_digits > 0
    }
}

/// Fixed-point, offset-shifted codec for `Float` values
///
/// # Example
///
/// ```
/// use domainmap_core::codec::{FloatCodec, ValueCodec};
/// use domainmap_core::Value;
///
/// let codec = FloatCodec::new(3, 2, 100);
/// assert_eq!(codec.encode(&Value::Float(-1.5)).unwrap(), "098.50");
/// assert_eq!(codec.decode("098.50").unwrap(), Value::Float(-1.5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatCodec {
    left: usize,
    right: usize,
    offset: i64,
}

impl FloatCodec {
    /// Codec with `left` integer digits, `right` fractional digits and an offset
    pub fn new(left: usize, right: usize, offset: i64) -> Self {
        let right = right.min(MAX_DIGITS);
        let left = left.min(MAX_DIGITS - right);
        FloatCodec {
            left,
            right,
            offset,
        }
    }

    /// Integer digit width
    pub fn left(&self) -> usize {
        self.left
    }

    /// Fractional digit width
    pub fn right(&self) -> usize {
        self.right
    }

    /// Configured offset
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Whether `left`, `right` and `offset` form a fixed-width layout
    ///
    /// The shifted offset `offset * 10^right` must fit `left + right` digits.
    pub fn fits_layout(left: usize, right: usize, offset: i64) -> bool {
        let width = left + right;
        if width > MAX_DIGITS {
            return false;
        }
        if offset == 0 {
            return true;
        }
        match (offset as i128).checked_mul(pow10(right)) {
            Some(shift) => width > 0 && digit_count(shift) <= width,
            None => false,
        }
    }

    fn is_natural(&self) -> bool {
        self.offset == 0 && self.left == 0 && self.right == 0
    }

    fn shift(&self) -> Option<i128> {
        (self.offset as i128).checked_mul(pow10(self.right))
    }

    fn width(&self) -> usize {
        self.left + self.right
    }

    fn out_of_range(&self, value: f64, reason: impl Into<String>) -> EncodeError {
        EncodeError::OutOfRange {
            codec: self.codec_id().to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl ValueCodec for FloatCodec {
    fn encode(&self, value: &Value) -> Result<String, EncodeError> {
        let v = value.as_float().ok_or_else(|| EncodeError::TypeMismatch {
            codec: self.codec_id().to_string(),
            expected: ValueType::Float,
            found: value.type_name(),
        })?;
        if !v.is_finite() {
            return Err(self.out_of_range(v, "not finite"));
        }

        if self.is_natural() {
            return Ok(v.to_string());
        }

        let scale = pow10(self.right);
        let scaled = (v * scale as f64).round();
        if scaled.abs() >= 1e37 {
            return Err(self.out_of_range(v, "exceeds fixed-point range"));
        }
        let shifted = self
            .shift()
            .and_then(|shift| (scaled as i128).checked_add(shift))
            .ok_or_else(|| self.out_of_range(v, "offset overflows the fixed-point range"))?;
        if shifted < 0 {
            return Err(self.out_of_range(v, format!("below -{}", self.offset)));
        }

        let digits = shifted.to_string();
        let width = self.width();
        if width > 0 && digits.len() > width {
            return Err(self.out_of_range(v, format!("wider than {}.{} digits", self.left, self.right)));
        }
        // Keep at least one integer digit so the point never leads.
        let digits = pad(digits, width.max(self.right + 1));
        if self.right == 0 {
            return Ok(digits);
        }
        let split = digits.len() - self.right;
        Ok(format!("{}.{}", &digits[..split], &digits[split..]))
    }

    fn decode(&self, stored: &str) -> Result<Value, RestoreError> {
        let fail = |reason: &str| RestoreError::new(stored, ValueType::Float, reason);

        if self.is_natural() {
            return stored
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| fail(&e.to_string()));
        }

        let (int_part, frac_part) = match stored.split_once('.') {
            Some((i, f)) => (i, f),
            None => (stored, ""),
        };
        if frac_part.len() != self.right {
            return Err(fail("fractional width mismatch"));
        }
        let digits = format!("{}{}", int_part, frac_part);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(fail("expected zero-padded digits"));
        }
        if digits.len() > MAX_DIGITS {
            return Err(fail("too many digits"));
        }
        let shifted = digits.parse::<i128>().map_err(|e| fail(&e.to_string()))?;
        let scale = pow10(self.right);
        let fixed = self
            .shift()
            .and_then(|shift| shifted.checked_sub(shift))
            .ok_or_else(|| fail("offset overflows the fixed-point range"))?;
        Ok(Value::Float(fixed as f64 / scale as f64))
    }

    fn codec_id(&self) -> &str {
        "numeric-float"
    }

    fn value_type(&self) -> &ValueType {
        &ValueType::Float
    }

    fn is_ordered(&self) -> bool {
        self.width() > 0
    }
}
