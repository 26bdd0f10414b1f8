// src/merge/labels.rs

use std::collections::HashMap;

/// Code → human label lookup. Unknown codes have no label.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    labels: HashMap<String, String>,
}

impl LabelTable {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            labels: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Generator operational status codes as published with Form EIA-860.
    pub fn operational_status() -> Self {
        Self::new([
            ("OP", "Operating - in service and producing some electricity"),
            ("SB", "Standby/backup - available for service but not normally used"),
            ("OS", "Out of service - not expected to return to service next year"),
            ("OA", "Out of service - expected to return to service next year"),
            ("RE", "Retired - no longer in service and not expected to return"),
            ("P", "Planned for installation, regulatory approvals not initiated"),
            ("L", "Regulatory approvals pending, not under construction"),
            ("T", "Regulatory approvals received, not under construction"),
            ("U", "Under construction, 50 percent complete or less"),
            ("V", "Under construction, more than 50 percent complete"),
            ("TS", "Construction complete, not yet in commercial operation"),
            ("OT", "Other"),
            ("IP", "Planned generator canceled, indefinitely postponed, or dropped from resource plan"),
            ("CN", "Canceled, previously reported as planned"),
        ])
    }

    pub fn label(&self, code: &str) -> Option<&str> {
        self.labels.get(code).map(String::as_str)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }
}
