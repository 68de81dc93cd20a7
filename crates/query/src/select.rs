//! Select statements
//!
//! [`Select`] assembles the full query text:
//!
//! ```text
//! select <projection> from <domain> [where <condition>]
//!     [order by <attribute> asc|desc] [limit <n>]
//! ```
//!
//! Rendering resolves the `where` condition against the domain metadata
//! first, so typed attributes are compared in their stored encoding.

use std::fmt;

use domainmap_core::{DeferredReference, Error, Limits, Result, ITEM_NAME};
use domainmap_metadata::DomainMetadata;

use crate::condition::{where_item_name, Condition};
use crate::matcher::is;
use crate::syntax::quote_identifier;

/// What a select returns
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Projection {
    /// `*`
    #[default]
    All,
    /// `count(*)`
    Count,
    /// `itemName()`
    ItemName,
    /// Named attributes
    Attributes(Vec<String>),
}

/// Sort direction of an `order by` clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// `asc`
    #[default]
    Asc,
    /// `desc`
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("asc"),
            Direction::Desc => f.write_str("desc"),
        }
    }
}

/// Settings applied while rendering
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Store limits checked against names, operands and the limit clause
    pub limits: Limits,
    /// Reject attributes the metadata does not define
    pub strict_attributes: bool,
}

/// Query text plus what the transport needs alongside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedQuery {
    /// Query text
    pub text: String,
    /// Whether the read must be strongly consistent
    pub consistent_read: bool,
    /// Condition attributes rendered with the untyped codec
    pub unresolved: Vec<String>,
}

impl fmt::Display for RenderedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Select statement builder
#[derive(Debug, Clone, Default)]
pub struct Select {
    projection: Projection,
    domain: Option<String>,
    filter: Option<Condition>,
    order: Option<(String, Direction)>,
    limit: Option<u32>,
    consistent_read: bool,
}

impl Select {
    /// `select *`
    pub fn all() -> Self {
        Self::default()
    }

    /// `select count(*)`
    pub fn count() -> Self {
        Self::with_projection(Projection::Count)
    }

    /// `select itemName()`
    pub fn item_names() -> Self {
        Self::with_projection(Projection::ItemName)
    }

    /// `select <a>, <b>, ...`
    pub fn attributes<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_projection(Projection::Attributes(
            names.into_iter().map(Into::into).collect(),
        ))
    }

    fn with_projection(projection: Projection) -> Self {
        Select {
            projection,
            ..Self::default()
        }
    }

    /// `select *` of the single item `reference` points at
    pub fn for_reference(reference: &DeferredReference) -> Self {
        Select::all()
            .from(reference.domain.clone())
            .filter(where_item_name(is(reference.id.clone())))
    }

    /// Domain to query; defaults to the metadata's domain
    pub fn from(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// `where` condition
    pub fn filter(mut self, condition: impl Into<Condition>) -> Self {
        self.filter = Some(condition.into());
        self
    }

    /// `order by` clause
    pub fn order_by(mut self, attribute: impl Into<String>, direction: Direction) -> Self {
        self.order = Some((attribute.into(), direction));
        self
    }

    /// `limit` clause
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Request a strongly consistent read
    pub fn consistent_read(mut self, consistent: bool) -> Self {
        self.consistent_read = consistent;
        self
    }

    /// Projection
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Condition, if any
    pub fn condition(&self) -> Option<&Condition> {
        self.filter.as_ref()
    }

    /// Limit clause, if set
    pub fn limit_value(&self) -> Option<u32> {
        self.limit
    }

    /// Whether a consistent read was requested
    pub fn is_consistent_read(&self) -> bool {
        self.consistent_read
    }

    /// Render with default options
    pub fn describe(&self, metadata: Option<&DomainMetadata>) -> Result<RenderedQuery> {
        self.render(metadata, &RenderOptions::default())
    }

    /// Render the statement
    ///
    /// # Errors
    ///
    /// - [`Error::MissingDomain`] with neither a domain nor metadata
    /// - [`Error::Limit`] for an out-of-range limit or oversized name
    /// - any error of [`Condition::resolve`] or [`Condition::render`]
    pub fn render(
        &self,
        metadata: Option<&DomainMetadata>,
        options: &RenderOptions,
    ) -> Result<RenderedQuery> {
        let limits = &options.limits;
        let domain = match (&self.domain, metadata) {
            (Some(domain), _) => domain.as_str(),
            (None, Some(metadata)) => metadata.domain(),
            (None, None) => return Err(Error::MissingDomain),
        };
        limits.validate_name_length(domain)?;

        let mut text = String::from("select ");
        match &self.projection {
            Projection::All => text.push('*'),
            Projection::Count => text.push_str("count(*)"),
            Projection::ItemName => text.push_str(ITEM_NAME),
            Projection::Attributes(names) => {
                for name in names {
                    limits.validate_name_length(name)?;
                }
                let quoted: Vec<String> = names.iter().map(|n| quote_identifier(n)).collect();
                text.push_str(&quoted.join(", "));
            }
        }
        text.push_str(" from ");
        text.push_str(&quote_identifier(domain));

        let mut unresolved = Vec::new();
        if let Some(filter) = &self.filter {
            let resolution = filter.resolve(metadata, options.strict_attributes)?;
            text.push_str(" where ");
            text.push_str(&resolution.condition.render(limits)?);
            unresolved = resolution.unresolved;
        }

        if let Some((attribute, direction)) = &self.order {
            text.push_str(" order by ");
            if attribute == ITEM_NAME {
                text.push_str(ITEM_NAME);
            } else {
                text.push_str(&quote_identifier(attribute));
            }
            text.push(' ');
            text.push_str(&direction.to_string());
        }

        if let Some(limit) = self.limit {
            limits.validate_select_limit(limit)?;
            text.push_str(&format!(" limit {}", limit));
        }

        tracing::debug!(query = %text, consistent_read = self.consistent_read, "rendered select");
        Ok(RenderedQuery {
            text,
            consistent_read: self.consistent_read,
            unresolved,
        })
    }
}

impl From<&DeferredReference> for Select {
    fn from(reference: &DeferredReference) -> Self {
        Select::for_reference(reference)
    }
}
