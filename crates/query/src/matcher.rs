//! Matchers: the right-hand side of a condition leaf
//!
//! A [`Matcher`] pairs a comparison operator with its raw operand values and
//! an optional [`ValueCodec`]. Matchers are usually built *unbound*: the
//! attribute's type is not known where the query is written, so the codec is
//! bound later, when the condition is resolved against domain metadata.
//!
//! A codec attached with [`Matcher::with_codec`] is *explicit* and survives
//! resolution unchanged.
//!
//! ## Rendering
//!
//! | Constructor            | Renders as                 |
//! |------------------------|----------------------------|
//! | [`is`]                 | `= v`                      |
//! | [`is_not`]             | `!= v`                     |
//! | [`greater_than`]       | `> v`                      |
//! | [`greater_equal`]      | `>= v`                     |
//! | [`less_than`]          | `< v`                      |
//! | [`less_equal`]         | `<= v`                     |
//! | [`like`] / [`not_like`]| `like v` / `not like v`    |
//! | [`between`]`(a).and(b)`| `between a and b`          |
//! | [`is_in`]              | `in (v1, ..., vn)`         |
//! | [`is_null`]            | `is null`                  |
//! | [`is_not_null`]        | `is not null`              |
//!
//! Operands are encoded with the bound codec, then quoted. `like` patterns
//! are quoted as written: encoding `%` wildcards would break them.

use std::fmt;
use std::sync::Arc;

use domainmap_core::codec::untyped;
use domainmap_core::{Error, Limits, Result, Value, ValueCodec};
use smallvec::SmallVec;

use crate::syntax::quote_literal;

/// Comparison operator of a matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Is,
    /// `!=`
    IsNot,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessEqual,
    /// `like`
    Like,
    /// `not like`
    NotLike,
    /// `between ... and ...`
    Between,
    /// `in (...)`
    In,
    /// `is null`
    IsNull,
    /// `is not null`
    IsNotNull,
}

impl Operator {
    /// Query keyword
    pub fn keyword(&self) -> &'static str {
        match self {
            Operator::Is => "=",
            Operator::IsNot => "!=",
            Operator::GreaterThan => ">",
            Operator::GreaterEqual => ">=",
            Operator::LessThan => "<",
            Operator::LessEqual => "<=",
            Operator::Like => "like",
            Operator::NotLike => "not like",
            Operator::Between => "between",
            Operator::In => "in",
            Operator::IsNull => "is null",
            Operator::IsNotNull => "is not null",
        }
    }

    /// Whether operands are quoted verbatim instead of encoded
    pub fn is_pattern(&self) -> bool {
        matches!(self, Operator::Like | Operator::NotLike)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Operator, operands and (possibly deferred) codec
#[derive(Debug, Clone)]
pub struct Matcher {
    operator: Operator,
    values: SmallVec<[Value; 2]>,
    codec: Option<Arc<dyn ValueCodec>>,
    explicit: bool,
}

impl Matcher {
    fn new(operator: Operator, values: SmallVec<[Value; 2]>) -> Self {
        Matcher {
            operator,
            values,
            codec: None,
            explicit: false,
        }
    }

    fn unary(operator: Operator, value: Value) -> Self {
        let mut values = SmallVec::new();
        values.push(value);
        Self::new(operator, values)
    }

    /// Attach a codec that resolution will not replace
    pub fn with_codec(mut self, codec: Arc<dyn ValueCodec>) -> Self {
        self.codec = Some(codec);
        self.explicit = true;
        self
    }

    /// Copy of this matcher bound to `codec`, unless a codec is explicit
    pub fn bind(&self, codec: &Arc<dyn ValueCodec>) -> Matcher {
        let mut bound = self.clone();
        if !self.explicit {
            bound.codec = Some(Arc::clone(codec));
        }
        bound
    }

    /// Operator
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Raw operand values
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Bound codec, if any
    pub fn codec(&self) -> Option<&Arc<dyn ValueCodec>> {
        self.codec.as_ref()
    }

    /// Whether the codec was supplied by the caller
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// Whether the matcher has every operand its operator needs
    pub fn is_complete(&self) -> bool {
        match self.operator {
            Operator::Between => self.values.len() == 2,
            Operator::In => !self.values.is_empty(),
            Operator::IsNull | Operator::IsNotNull => true,
            _ => self.values.len() == 1,
        }
    }

    /// Render the matcher clause for `attribute` with default limits
    pub fn describe(&self, attribute: &str) -> Result<String> {
        self.render(attribute, &Limits::default())
    }

    /// Render the matcher clause for `attribute`
    ///
    /// `attribute` is only used in error reports.
    ///
    /// # Errors
    ///
    /// - [`Error::IncompleteMatcher`] for a `between` without upper bound
    /// - [`Error::Encode`] when an operand does not fit the codec
    /// - [`Error::Limit`] for oversized operands or `in` lists
    pub fn render(&self, attribute: &str, limits: &Limits) -> Result<String> {
        if !self.is_complete() {
            return Err(Error::IncompleteMatcher {
                attribute: attribute.to_string(),
                operator: self.operator.keyword(),
            });
        }

        let keyword = self.operator.keyword();
        match self.operator {
            Operator::IsNull | Operator::IsNotNull => Ok(keyword.to_string()),
            Operator::Between => {
                let low = self.operand(attribute, &self.values[0], limits)?;
                let high = self.operand(attribute, &self.values[1], limits)?;
                Ok(format!("{} {} and {}", keyword, low, high))
            }
            Operator::In => {
                limits.validate_in_values(self.values.len())?;
                let operands = self
                    .values
                    .iter()
                    .map(|v| self.operand(attribute, v, limits))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("{} ({})", keyword, operands.join(", ")))
            }
            _ => {
                let operand = self.operand(attribute, &self.values[0], limits)?;
                Ok(format!("{} {}", keyword, operand))
            }
        }
    }

    fn operand(&self, attribute: &str, value: &Value, limits: &Limits) -> Result<String> {
        let encoded = if self.operator.is_pattern() {
            value.to_string()
        } else {
            match &self.codec {
                Some(codec) => codec.encode(value)?,
                None => untyped().encode(value)?,
            }
        };
        limits.validate_encoded_value(attribute, &encoded)?;
        Ok(quote_literal(&encoded))
    }
}

/// Half-built `between` matcher, waiting for its upper bound
#[derive(Debug, Clone)]
pub struct Between {
    low: Value,
}

impl Between {
    /// Supply the upper bound
    pub fn and(self, high: impl Into<Value>) -> Matcher {
        let mut values = SmallVec::new();
        values.push(self.low);
        values.push(high.into());
        Matcher::new(Operator::Between, values)
    }
}

/// A `between` used without its upper bound; rendering it fails
impl From<Between> for Matcher {
    fn from(between: Between) -> Self {
        Matcher::unary(Operator::Between, between.low)
    }
}

/// `= v`
pub fn is(value: impl Into<Value>) -> Matcher {
    Matcher::unary(Operator::Is, value.into())
}

/// `!= v`
pub fn is_not(value: impl Into<Value>) -> Matcher {
    Matcher::unary(Operator::IsNot, value.into())
}

/// `> v`
pub fn greater_than(value: impl Into<Value>) -> Matcher {
    Matcher::unary(Operator::GreaterThan, value.into())
}

/// `>= v`
pub fn greater_equal(value: impl Into<Value>) -> Matcher {
    Matcher::unary(Operator::GreaterEqual, value.into())
}

/// `< v`
pub fn less_than(value: impl Into<Value>) -> Matcher {
    Matcher::unary(Operator::LessThan, value.into())
}

/// `<= v`
pub fn less_equal(value: impl Into<Value>) -> Matcher {
    Matcher::unary(Operator::LessEqual, value.into())
}

/// `like pattern`
pub fn like(pattern: impl Into<String>) -> Matcher {
    Matcher::unary(Operator::Like, Value::String(pattern.into()))
}

/// `not like pattern`
pub fn not_like(pattern: impl Into<String>) -> Matcher {
    Matcher::unary(Operator::NotLike, Value::String(pattern.into()))
}

/// `between low and high`; finish with [`Between::and`]
pub fn between(low: impl Into<Value>) -> Between {
    Between { low: low.into() }
}

/// `in (v1, ..., vn)`
pub fn is_in<I, V>(values: I) -> Matcher
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Matcher::new(Operator::In, values.into_iter().map(Into::into).collect())
}

/// `is null`
pub fn is_null() -> Matcher {
    Matcher::new(Operator::IsNull, SmallVec::new())
}

/// `is not null`
pub fn is_not_null() -> Matcher {
    Matcher::new(Operator::IsNotNull, SmallVec::new())
}
