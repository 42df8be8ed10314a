use serde_json::Value;
use tracing::warn;

use super::{Document, Loaded, TypeRegistry, KEY_ATTRIBUTE, TYPE_ATTRIBUTE};
use crate::error::{FinderError, FinderResult};
use crate::store::RawRecord;

/// Build a typed document from a raw record.
///
/// The record's `_type` picks the constructor when the registry knows it;
/// otherwise `D` itself is built. The record key fills in a missing `key`
/// attribute and is then forced onto the document, so the document key always
/// equals the record key.
pub fn instantiate<D: Document>(
    raw: RawRecord,
    registry: Option<&TypeRegistry<D>>,
) -> FinderResult<Loaded<D>> {
    let tag = raw
        .data
        .get(TYPE_ATTRIBUTE)
        .and_then(Value::as_str)
        .map(str::to_string);

    let mut attributes = raw.data.clone();
    attributes.remove(TYPE_ATTRIBUTE);
    attributes
        .entry(KEY_ATTRIBUTE)
        .or_insert_with(|| Value::String(raw.key.clone()));

    let factory = tag
        .as_deref()
        .and_then(|name| registry.and_then(|registry| registry.resolve(name)));

    let (type_name, built) = match (factory, tag) {
        (Some(factory), Some(name)) => {
            let built = factory(attributes);
            (name, built)
        }
        (_, tag) => {
            if let Some(name) = tag.filter(|name| name != D::TYPE_NAME) {
                warn!(
                    bucket = %raw.bucket,
                    key = %raw.key,
                    type_name = %name,
                    fallback = D::TYPE_NAME,
                    "unresolved document type; building fallback type"
                );
            }
            (D::TYPE_NAME.to_string(), D::from_attributes(attributes))
        }
    };

    let mut data = built.map_err(|e| FinderError::Instantiate {
        key: raw.key.clone(),
        type_name: type_name.clone(),
        message: e.to_string(),
    })?;
    data.set_key(&raw.key);

    Ok(Loaded::from_store(data, type_name, raw))
}
