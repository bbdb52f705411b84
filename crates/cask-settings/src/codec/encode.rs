//! Settings -> document.

use serde_json::{Map, Value};

use crate::codec::Document;
use crate::error::Result;
use crate::inventory::{Schema, Settings};

/// Encode the included members of `settings` into a new document.
///
/// Fields are written in declaration order. The whole document is built in
/// memory; a failing member aborts the encode before anything reaches storage.
pub fn encode<S: Settings>(schema: &Schema<S>, settings: &S) -> Result<Document> {
    encode_members(schema, settings).map(Document::from_map)
}

pub(crate) fn encode_members<S: Settings>(
    schema: &Schema<S>,
    settings: &S,
) -> Result<Map<String, Value>> {
    let mut fields = Map::new();
    for member in schema.included() {
        let name = &member.descriptor.serialized_name;
        let value = member.access.encode(name, settings)?;
        fields.insert(name.clone(), value);
    }
    Ok(fields)
}
