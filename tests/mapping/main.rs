//! Mapping Test Suite
//!
//! End-to-end tests through the public `domainmap` API:
//!
//! - **Ordering**: padded/offset numeric encodings sort like numbers
//! - **Round trip**: objects survive `to_item` then `from_item`
//! - **Flattening**: nested objects share their owner's attribute namespace
//! - **Queries**: condition trees and selects render to store syntax
//! - **Config**: `domainmap.toml` and schema files on disk
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test mapping
//! cargo test --test mapping queries::
//! ```

mod common;

mod config_files;
mod flattening;
mod ordering;
mod queries;
mod round_trip;
