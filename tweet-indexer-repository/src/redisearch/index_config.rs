//! RediSearch index definition.
//!
//! Renders an [`IndexSchema`] into the arguments of `FT.CREATE`.

use crate::schema::{FieldKind, IndexField, IndexSchema};

/// Arguments following `FT.CREATE` for the given index and schema.
///
/// The index covers hashes whose key starts with the schema prefix:
///
/// ```text
/// FT.CREATE <index> ON HASH PREFIX 1 <prefix> SCHEMA <field> <TYPE> [SORTABLE] ...
/// ```
pub fn create_index_args(index_name: &str, schema: &IndexSchema) -> Vec<String> {
    let mut args = vec![
        index_name.to_string(),
        "ON".to_string(),
        "HASH".to_string(),
        "PREFIX".to_string(),
        "1".to_string(),
        schema.key_prefix.clone(),
        "SCHEMA".to_string(),
    ];

    for field in &schema.fields {
        args.extend(field_args(field));
    }

    args
}

fn field_args(field: &IndexField) -> Vec<String> {
    let mut args = vec![field.name.clone()];
    match field.kind {
        FieldKind::Text => args.push("TEXT".to_string()),
        FieldKind::Tag => args.push("TAG".to_string()),
        FieldKind::Geo => args.push("GEO".to_string()),
        FieldKind::Numeric { sortable } => {
            args.push("NUMERIC".to_string());
            if sortable {
                args.push("SORTABLE".to_string());
            }
        }
    }
    args
}

/// Arguments following `FT.DROPINDEX`; `DD` also deletes the indexed hashes.
pub fn drop_index_args(index_name: &str) -> Vec<String> {
    vec![index_name.to_string(), "DD".to_string()]
}
