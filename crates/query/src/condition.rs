//! Condition expression trees
//!
//! A [`Condition`] is a persistent value: every join, group or negation
//! returns a new condition sharing its operands through `Arc`, and no node
//! is mutated after construction. A condition built once can be used as a
//! template from many threads; resolving it against metadata produces a new
//! tree with bound matchers and leaves the template untouched.
//!
//! # Rendering
//!
//! The store evaluates joins left to right without precedence, so joins
//! render flat: `a.and(b).or(c)` is `a and b or c`. [`Condition::group`] is
//! the only way to force an evaluation order.
//!
//! ```
//! use domainmap_query::{condition, is, is_not, less_equal, less_than};
//!
//! let left = condition("a", is(1)).and(("b", is_not(2))).group();
//! let right = condition("c", less_than(100)).and(("d", less_equal(200))).group();
//! assert_eq!(
//!     left.or(right).group().describe().unwrap(),
//!     "((`a` = '1' and `b` != '2') or (`c` < '100' and `d` <= '200'))"
//! );
//! ```

use std::fmt;
use std::sync::Arc;

use domainmap_core::{Error, Limits, Result, ITEM_NAME};
use domainmap_metadata::DomainMetadata;

use crate::matcher::Matcher;
use crate::syntax::quote_identifier;

/// Join operator between two conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Join {
    /// `and`
    And,
    /// `or`
    Or,
    /// `intersection` (both sides match on the same multi-valued attribute)
    Intersection,
}

impl Join {
    /// Query keyword
    pub fn keyword(&self) -> &'static str {
        match self {
            Join::And => "and",
            Join::Or => "or",
            Join::Intersection => "intersection",
        }
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// What a leaf compares
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// A named attribute
    Attribute(String),
    /// The item name (`itemName()`)
    ItemName,
}

#[derive(Debug)]
enum Node {
    Leaf { target: Target, matcher: Matcher },
    Join { left: Condition, join: Join, right: Condition },
    Not(Condition),
}

/// Immutable node of a query expression tree
#[derive(Debug, Clone)]
pub struct Condition {
    node: Arc<Node>,
    grouped: bool,
}

/// Resolved condition plus the attribute names metadata did not know
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Condition with every resolvable matcher bound
    pub condition: Condition,
    /// Names that fell back to the untyped codec, in first-use order
    pub unresolved: Vec<String>,
}

/// Leaf comparing attribute `name` with `matcher`
pub fn condition(name: impl Into<String>, matcher: impl Into<Matcher>) -> Condition {
    Condition::leaf(Target::Attribute(name.into()), matcher.into())
}

/// Leaf comparing the item name with `matcher`
pub fn where_item_name(matcher: impl Into<Matcher>) -> Condition {
    Condition::leaf(Target::ItemName, matcher.into())
}

/// Negate `condition`
pub fn not(condition: Condition) -> Condition {
    condition.not()
}

/// Parenthesize `condition`
pub fn group(condition: Condition) -> Condition {
    condition.group()
}

impl Condition {
    fn leaf(target: Target, matcher: Matcher) -> Self {
        Self::from_node(Node::Leaf { target, matcher })
    }

    fn from_node(node: Node) -> Self {
        Condition {
            node: Arc::new(node),
            grouped: false,
        }
    }

    fn join(self, join: Join, right: Condition) -> Self {
        Self::from_node(Node::Join {
            left: self,
            join,
            right,
        })
    }

    /// `self and other`
    ///
    /// `other` renders without parentheses unless it is grouped.
    pub fn and(self, other: impl Into<Condition>) -> Condition {
        self.join(Join::And, other.into())
    }

    /// `self or other`
    pub fn or(self, other: impl Into<Condition>) -> Condition {
        self.join(Join::Or, other.into())
    }

    /// `self intersection other`
    pub fn intersection(self, other: impl Into<Condition>) -> Condition {
        self.join(Join::Intersection, other.into())
    }

    /// Wrap in parentheses
    ///
    /// Grouping a grouped condition changes nothing.
    pub fn group(self) -> Condition {
        Condition {
            node: self.node,
            grouped: true,
        }
    }

    /// `not self`
    ///
    /// An ungrouped negation is unwrapped instead of negated twice.
    pub fn not(self) -> Condition {
        if let Node::Not(inner) = self.node.as_ref() {
            if !self.grouped {
                return inner.clone();
            }
        }
        Self::from_node(Node::Not(self))
    }

    /// Whether the condition renders in parentheses
    pub fn is_grouped(&self) -> bool {
        self.grouped
    }

    /// Whether the condition is a single comparison
    pub fn is_leaf(&self) -> bool {
        matches!(self.node.as_ref(), Node::Leaf { .. })
    }

    /// Attribute names referenced by leaves, left to right
    pub fn attribute_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self.node.as_ref() {
            Node::Leaf {
                target: Target::Attribute(name),
                ..
            } => names.push(name),
            Node::Leaf { .. } => {}
            Node::Join { left, right, .. } => {
                left.collect_names(names);
                right.collect_names(names);
            }
            Node::Not(inner) => inner.collect_names(names),
        }
    }

    /// Bind every leaf's matcher against `metadata`
    ///
    /// Matchers with an explicit codec keep it. Other attribute leaves get
    /// the codec of the attribute of the same name; item-name leaves get the
    /// identifier's codec. Names the metadata does not define keep the
    /// untyped codec and are listed in [`Resolution::unresolved`]. Without
    /// metadata the tree is returned as is.
    ///
    /// # Errors
    ///
    /// With `strict`, an undefined name is [`Error::UnresolvedAttribute`].
    pub fn resolve(&self, metadata: Option<&DomainMetadata>, strict: bool) -> Result<Resolution> {
        let Some(metadata) = metadata else {
            return Ok(Resolution {
                condition: self.clone(),
                unresolved: Vec::new(),
            });
        };
        let mut resolver = Resolver {
            metadata,
            strict,
            unresolved: Vec::new(),
        };
        let condition = resolver.visit(self)?;
        Ok(Resolution {
            condition,
            unresolved: resolver.unresolved,
        })
    }

    /// Render with the codecs currently bound and default limits
    ///
    /// Unbound matchers use the untyped codec.
    pub fn describe(&self) -> Result<String> {
        self.render(&Limits::default())
    }

    /// Resolve against `metadata`, then render
    pub fn describe_with(&self, metadata: &DomainMetadata) -> Result<String> {
        self.resolve(Some(metadata), false)?
            .condition
            .render(&Limits::default())
    }

    /// Render with the codecs currently bound
    pub fn render(&self, limits: &Limits) -> Result<String> {
        let mut out = String::new();
        self.write(limits, &mut out)?;
        Ok(out)
    }

    fn write(&self, limits: &Limits, out: &mut String) -> Result<()> {
        if self.grouped {
            out.push('(');
        }
        match self.node.as_ref() {
            Node::Leaf { target, matcher } => {
                let name = match target {
                    Target::Attribute(name) => {
                        out.push_str(&quote_identifier(name));
                        name.as_str()
                    }
                    Target::ItemName => {
                        out.push_str(ITEM_NAME);
                        ITEM_NAME
                    }
                };
                out.push(' ');
                out.push_str(&matcher.render(name, limits)?);
            }
            Node::Join { left, join, right } => {
                left.write(limits, out)?;
                out.push(' ');
                out.push_str(join.keyword());
                out.push(' ');
                right.write(limits, out)?;
            }
            Node::Not(inner) => {
                out.push_str("not ");
                inner.write(limits, out)?;
            }
        }
        if self.grouped {
            out.push(')');
        }
        Ok(())
    }
}

impl<S, M> From<(S, M)> for Condition
where
    S: Into<String>,
    M: Into<Matcher>,
{
    fn from((name, matcher): (S, M)) -> Self {
        condition(name, matcher)
    }
}

struct Resolver<'a> {
    metadata: &'a DomainMetadata,
    strict: bool,
    unresolved: Vec<String>,
}

impl Resolver<'_> {
    fn visit(&mut self, condition: &Condition) -> Result<Condition> {
        let node = match condition.node.as_ref() {
            Node::Leaf { target, matcher } => {
                let target = self.retarget(target);
                let matcher = if matcher.is_explicit() {
                    matcher.clone()
                } else {
                    self.bind(&target, matcher)?
                };
                Node::Leaf { target, matcher }
            }
            Node::Join { left, join, right } => Node::Join {
                left: self.visit(left)?,
                join: *join,
                right: self.visit(right)?,
            },
            Node::Not(inner) => Node::Not(self.visit(inner)?),
        };
        Ok(Condition {
            node: Arc::new(node),
            grouped: condition.grouped,
        })
    }

    // The identifier is stored as the item name, never as an attribute.
    fn retarget(&self, target: &Target) -> Target {
        match (target, self.metadata.identifier_attribute()) {
            (Target::Attribute(name), Some(id))
                if id.name() == name && self.metadata.attribute(name).is_none() =>
            {
                Target::ItemName
            }
            _ => target.clone(),
        }
    }

    fn bind(&mut self, target: &Target, matcher: &Matcher) -> Result<Matcher> {
        let (name, descriptor) = match target {
            Target::ItemName => (ITEM_NAME, self.metadata.identifier_attribute()),
            Target::Attribute(name) => (name.as_str(), self.metadata.attribute(name)),
        };

        if let Some(descriptor) = descriptor {
            tracing::debug!(
                attribute = %name,
                codec = descriptor.codec().codec_id(),
                "bound matcher codec"
            );
            return Ok(matcher.bind(descriptor.codec()));
        }

        // Item names are plain strings; the untyped codec is exact for them.
        if matches!(target, Target::ItemName) {
            return Ok(matcher.clone());
        }

        if self.strict {
            return Err(Error::UnresolvedAttribute {
                attribute: name.to_string(),
                type_name: self.metadata.type_name().to_string(),
            });
        }
        tracing::debug!(
            attribute = %name,
            type_name = %self.metadata.type_name(),
            "attribute not mapped, using untyped codec"
        );
        if !self.unresolved.iter().any(|n| n == name) {
            self.unresolved.push(name.to_string());
        }
        Ok(matcher.clone())
    }
}
