//! Query expressions for domainmap
//!
//! Builds conditions over attribute names and renders them into the store's
//! query text:
//! - Matcher: operator, operands and codec of one comparison
//! - Condition: persistent `and`/`or`/`intersection`/`not`/group trees
//! - Select: full `select ... from ... where ...` statements
//!
//! Conditions are written without knowing attribute types. Rendering
//! against [`DomainMetadata`](domainmap_metadata::DomainMetadata) binds each
//! leaf to its attribute's codec, so numbers compare in their padded,
//! offset form.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod condition;
pub mod matcher;
pub mod select;
pub mod syntax;

pub use condition::{condition, group, not, where_item_name, Condition, Join, Resolution, Target};
pub use matcher::{
    between, greater_equal, greater_than, is, is_in, is_not, is_not_null, is_null, less_equal,
    less_than, like, not_like, Between, Matcher, Operator,
};
pub use select::{Direction, Projection, RenderOptions, RenderedQuery, Select};
pub use syntax::{quote_identifier, quote_literal};
