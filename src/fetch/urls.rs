// src/fetch/urls.rs

use crate::period::Period;

pub const CURRENT_URL_TEMPLATE: &str =
    "https://www.eia.gov/electricity/data/eia860m/xls/{month}_generator{year}.xlsx";

pub const ARCHIVE_URL_TEMPLATE: &str =
    "https://www.eia.gov/electricity/data/eia860m/archive/xls/{month}_generator{year}.xlsx";

/// Fill `{year}` and `{month}` (lowercase month name) in a location template.
pub fn render(template: &str, period: Period) -> String {
    template
        .replace("{year}", &period.year.to_string())
        .replace("{month}", &period.month_name())
}

/// Primary ("current") and fallback ("archive") locations for one period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locations {
    pub current: String,
    pub archive: String,
}

impl Locations {
    pub fn for_period(current_template: &str, archive_template: &str, period: Period) -> Self {
        Self {
            current: render(current_template, period),
            archive: render(archive_template, period),
        }
    }
}
