mod document;

use proc_macro::TokenStream;

/// Derive macro for the `Document` trait.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, Document)]
/// #[document(bucket = "people", type_name = "Person")]
/// struct Person {
///     #[document(key)]
///     #[serde(default)]
///     pub key: String,
///     pub name: String,
/// }
/// ```
///
/// - `#[document(bucket = "...")]` sets the bucket name.
///   If omitted, defaults to snake_case struct name + "s".
/// - `#[document(type_name = "...")]` sets the `_type` tag.
///   If omitted, defaults to the struct name.
/// - `#[document(key)]` marks the `String` field holding the record key.
///   If omitted, defaults to a field named `key`. The field is filled from
///   the `key` attribute, so a differently named field needs
///   `#[serde(rename = "key")]`.
#[proc_macro_derive(Document, attributes(document))]
pub fn derive_document(input: TokenStream) -> TokenStream {
    document::derive_document(input)
}
