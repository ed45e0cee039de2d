//! Companion value types from sibling components: an array-like list and
//! a key/value record. Only their conversion contract matters to the
//! bridge.

pub mod list;
pub mod record;

pub use list::{ListComponent, ListValue, LIST_TAG};
pub use record::{RecordComponent, RecordValue, RECORD_TAG};
