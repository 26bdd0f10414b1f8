// src/schema/types.rs

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

use crate::period::Period;

/// Name of one known workbook layout, in `YYYY-MM` form.
///
/// Tags compare lexicographically, which for zero-padded `YYYY-MM` is the
/// same as chronological order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantTag(String);

impl VariantTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Period> for VariantTag {
    fn from(p: Period) -> Self {
        Self(p.to_string())
    }
}

impl fmt::Display for VariantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a page lives inside one workbook variant and how its columns are named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLayout {
    /// `None` when the publisher did not include this page in the variant.
    pub sheet: Option<String>,
    /// Rows above the header row.
    pub skip_header: usize,
    /// Notes/trailer rows at the bottom of the sheet.
    pub skip_footer: usize,
    /// Simplified raw label → canonical column name.
    pub columns: BTreeMap<String, String>,
}

/// One entry of the registry document: a layout valid for an inclusive tag range.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutSpan {
    pub from: Period,
    pub through: Period,
    #[serde(flatten)]
    pub layout: PageLayout,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageSpans {
    pub page: String,
    pub layouts: Vec<LayoutSpan>,
}

/// On-disk registry document.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryDoc {
    pub pages: Vec<PageSpans>,
}

/// Outcome of matching a period against a page's known variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantMatch {
    pub tag: VariantTag,
    /// `false` when the period had no layout of its own and the latest known
    /// variant was used instead.
    pub exact: bool,
}
