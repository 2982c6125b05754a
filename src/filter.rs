use crate::model::EnrichedRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// User-selected inclusion sets. An empty set leaves that dimension
/// unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub countries: BTreeSet<String>,
    pub categories: BTreeSet<String>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries.extend(countries.into_iter().map(Into::into));
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.extend(categories.into_iter().map(Into::into));
        self
    }

    pub fn is_unconstrained(&self) -> bool {
        self.countries.is_empty() && self.categories.is_empty()
    }

    pub fn matches(&self, record: &EnrichedRecord) -> bool {
        (self.countries.is_empty() || self.countries.contains(&record.country))
            && (self.categories.is_empty() || self.categories.contains(&record.category))
    }

    /// Rows of `records` that pass both inclusion sets, in source order.
    pub fn apply<'a>(&self, records: &'a [EnrichedRecord]) -> Vec<&'a EnrichedRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}
