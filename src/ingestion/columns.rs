//! Header normalization and required-column resolution

use crate::error::DataSourceError;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9]+").expect("static regex");
}

/// `"Unit Price ($)"` -> `unit_price`, `"Sub_Collection"` -> `sub_collection`.
pub fn normalize_header(raw: &str) -> String {
    let lowered = raw.trim_start_matches('\u{feff}').trim().to_lowercase();
    NON_ALNUM
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_string()
}

/// Positions of the logical fields a loader needs, resolved against one
/// header row.
#[derive(Debug)]
pub struct ColumnIndex {
    headers: Vec<String>,
}

impl ColumnIndex {
    pub fn new<'a>(raw_headers: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            headers: raw_headers.into_iter().map(normalize_header).collect(),
        }
    }

    /// First header matching any alias, in alias order.
    pub fn find(&self, aliases: &[String]) -> Option<usize> {
        aliases.iter().find_map(|alias| {
            let wanted = normalize_header(alias);
            self.headers.iter().position(|h| *h == wanted)
        })
    }

    /// Resolve every `(field, aliases)` pair or report all missing fields at
    /// once.
    pub fn require<const N: usize>(
        &self,
        source_name: &str,
        fields: [(&str, &[String]); N],
    ) -> Result<[usize; N], DataSourceError> {
        let mut resolved = [0usize; N];
        let mut missing = Vec::new();

        for (slot, (field, aliases)) in fields.iter().enumerate() {
            match self.find(aliases) {
                Some(idx) => resolved[slot] = idx,
                None => missing.push(field.to_string()),
            }
        }

        if missing.is_empty() {
            Ok(resolved)
        } else {
            Err(DataSourceError::MissingColumns {
                source_name: source_name.to_string(),
                missing,
            })
        }
    }
}
