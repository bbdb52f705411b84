//! Document codec: encode settings to a document, populate settings from one.
//!
//! - `document` - the ordered field list and its byte representation
//! - `encode` - settings -> document, in declaration order
//! - `populate` - document -> existing settings, in place

mod document;
mod encode;
mod populate;

pub use document::Document;
pub use encode::encode;
pub use populate::{PopulateReport, populate};

pub(crate) use encode::encode_members;
pub(crate) use populate::populate_members;
