//! Wire records shared by the locator library, CLI and HTTP service.

pub mod types;

pub use types::{
    parse_search_items, search_items_from_value, Highlight, LocatorResult, Position, RecordError,
    SearchItem, Severity,
};
