use crate::error::MetaError;
use crate::meta::AvroInputMeta;

/// One persistence protocol for `AvroInputMeta`.
///
/// Implemented by `MarkupCodec` (document text) and `RepositoryCodec`
/// (attribute store). Both walk the aggregate in the same fixed order and
/// must reconstruct an equal aggregate from their own output.
///
/// `save` writes a ragged file locations block padded, as `normalize()`
/// would leave it, without touching the borrowed aggregate.
/// `AvroInputMeta::get_xml` / `save_rep` also normalize the aggregate itself.
pub trait MetaCodec {
    /// Where `save` writes to (nothing for markup, step ids for the repository).
    type Target<'a>;
    /// What `load` reads from.
    type Source<'a>;
    type Output;

    fn save(&self, meta: &AvroInputMeta, target: Self::Target<'_>) -> Result<Self::Output, MetaError>;

    /// All-or-nothing: either a fully populated aggregate or an error.
    fn load(&self, source: Self::Source<'_>) -> Result<AvroInputMeta, MetaError>;
}

pub(crate) fn flag(value: bool) -> &'static str {
    if value { "Y" } else { "N" }
}

/// `Y`, `YES`, `TRUE`, `1` (any case) are true; everything else is false.
pub(crate) fn parse_flag(text: &str) -> bool {
    let text = text.trim();
    let truthy = ["Y", "YES", "TRUE", "1"]
        .iter()
        .any(|t| text.eq_ignore_ascii_case(t));
    if !truthy && !text.is_empty() && !["N", "NO", "FALSE", "0"].iter().any(|t| text.eq_ignore_ascii_case(t)) {
        tracing::warn!(value = %text, "unrecognized boolean literal, reading as false");
    }
    truthy
}
