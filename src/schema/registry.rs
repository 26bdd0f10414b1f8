// src/schema/registry.rs

use anyhow::{Context, Result};
use std::{
    collections::BTreeMap,
    fs,
    path::Path,
    sync::Arc,
};
use tracing::debug;

use super::types::{PageLayout, RegistryDoc, VariantMatch, VariantTag};
use crate::{error::EtlError, period::Period};

static BUILTIN_LAYOUTS: &str = include_str!("../../assets/layouts/eia860m.json");

/// Pick the layout for `period`: the exact tag if known, else the latest tag.
///
/// Returns `None` only when `known` is empty.
pub fn select_variant<'a, I>(period: Period, known: I) -> Option<VariantMatch>
where
    I: IntoIterator<Item = &'a VariantTag>,
{
    let wanted = VariantTag::from(period);
    let mut latest: Option<&VariantTag> = None;
    for tag in known {
        if *tag == wanted {
            return Some(VariantMatch {
                tag: wanted,
                exact: true,
            });
        }
        if latest.map_or(true, |l| tag > l) {
            latest = Some(tag);
        }
    }
    latest.map(|tag| VariantMatch {
        tag: tag.clone(),
        exact: false,
    })
}

struct PageEntry {
    name: String,
    variants: BTreeMap<VariantTag, Arc<PageLayout>>,
}

/// `(page, variant) → layout` lookup, built from a registry document.
///
/// Every month covered by a layout span becomes a known tag, so a period
/// resolves exactly whenever some span covers it.
pub struct Registry {
    pages: Vec<PageEntry>,
}

impl Registry {
    /// The layouts shipped with the crate.
    pub fn builtin() -> Result<Self, EtlError> {
        Self::from_json_str(BUILTIN_LAYOUTS)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        Self::from_json_str(&text).with_context(|| format!("loading registry {:?}", path))
    }

    pub fn from_json_str(text: &str) -> Result<Self, EtlError> {
        let doc: RegistryDoc =
            serde_json::from_str(text).map_err(|e| EtlError::Registry(e.to_string()))?;

        let mut pages: Vec<PageEntry> = Vec::with_capacity(doc.pages.len());
        for spans in doc.pages {
            if pages.iter().any(|p| p.name == spans.page) {
                return Err(EtlError::Registry(format!(
                    "page `{}` declared twice",
                    spans.page
                )));
            }

            let mut variants = BTreeMap::new();
            for span in spans.layouts {
                if span.through < span.from {
                    return Err(EtlError::Registry(format!(
                        "page `{}`: span {}..{} is reversed",
                        spans.page, span.from, span.through
                    )));
                }
                let layout = Arc::new(span.layout);
                for period in Period::range(span.from, span.through) {
                    if variants
                        .insert(VariantTag::from(period), Arc::clone(&layout))
                        .is_some()
                    {
                        return Err(EtlError::Registry(format!(
                            "page `{}`: {} is covered by more than one layout",
                            spans.page, period
                        )));
                    }
                }
            }

            debug!(page = %spans.page, variants = variants.len(), "registered page layouts");
            pages.push(PageEntry {
                name: spans.page,
                variants,
            });
        }

        Ok(Self { pages })
    }

    /// Page names in declaration order.
    pub fn pages(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|p| p.name.as_str())
    }

    fn entry(&self, page: &str) -> Result<&PageEntry, EtlError> {
        self.pages
            .iter()
            .find(|p| p.name == page)
            .ok_or_else(|| EtlError::UnknownPage {
                page: page.to_string(),
            })
    }

    pub fn known_tags(&self, page: &str) -> Result<impl Iterator<Item = &VariantTag>, EtlError> {
        Ok(self.entry(page)?.variants.keys())
    }

    pub fn layout(&self, page: &str, tag: &VariantTag) -> Result<&PageLayout, EtlError> {
        self.entry(page)?
            .variants
            .get(tag)
            .map(|l| l.as_ref())
            .ok_or_else(|| EtlError::RegistryGap {
                page: page.to_string(),
                tag: tag.clone(),
            })
    }

    /// Resolve the variant of `page` for `period`.
    ///
    /// With `strict` set, a period without its own layout is an error instead
    /// of falling back to the latest variant.
    pub fn resolve(&self, page: &str, period: Period, strict: bool) -> Result<VariantMatch, EtlError> {
        let m = select_variant(period, self.known_tags(page)?).ok_or_else(|| {
            EtlError::RegistryGap {
                page: page.to_string(),
                tag: VariantTag::from(period),
            }
        })?;
        if strict && !m.exact {
            return Err(EtlError::NoExactVariant {
                page: page.to_string(),
                period,
            });
        }
        Ok(m)
    }
}
