//! Fixed column policy for the generator inventory.
//!
//! These lists are the only place the normalizer learns column names; every
//! merge step takes them as arguments so tests can use their own.

/// Integer identifiers parsed leniently at extraction.
pub const INTEGER_ID_COLUMNS: &[&str] = &["plant_id_eia", "utility_id_eia"];

/// Text identifiers that pick up spurious leading zeros upstream.
pub const ZERO_PADDED_ID_COLUMNS: &[&str] = &["generator_id", "boiler_id"];

pub const STATUS_CODE_COLUMN: &str = "operational_status_code";
pub const STATUS_LABEL_COLUMN: &str = "operational_status";

/// Only the retired page lacks a status column.
pub const RETIRED_STATUS_CODE: &str = "RE";

/// Rows missing any of these are unusable.
pub const REQUIRED_ID_COLUMNS: &[&str] = &["plant_id_eia", "generator_id"];

/// Columns where a blank or a literal zero means "not reported".
pub const ZERO_SENTINEL_COLUMNS: &[&str] = &[
    "planned_derate_year",
    "planned_derate_month",
    "planned_net_summer_capacity_derate_mw",
    "planned_uprate_year",
    "planned_uprate_month",
    "planned_net_summer_capacity_uprate_mw",
    "latitude",
    "longitude",
];

/// `(date column, year column, month column)`.
pub const DATE_GROUPS: &[(&str, &str, &str)] = &[
    ("generator_operating_date", "operating_year", "operating_month"),
    ("generator_retirement_date", "retirement_year", "retirement_month"),
    (
        "current_planned_generator_operating_date",
        "current_planned_operating_year",
        "current_planned_operating_month",
    ),
    (
        "planned_generator_retirement_date",
        "planned_retirement_year",
        "planned_retirement_month",
    ),
];

/// Geocoding links that the sheets carry but nothing downstream wants.
pub const SCRATCH_COLUMNS: &[&str] = &["google_map", "bing_map"];

pub const PRIORITY_COLUMNS: &[&str] = &[
    "report_date",
    "plant_id_eia",
    "plant_name_eia",
    "utility_id_eia",
    "utility_name_eia",
    "generator_id",
    "technology_description",
];

pub const REPORT_YEAR_COLUMN: &str = "report_year";
pub const REPORT_MONTH_COLUMN: &str = "report_month";
pub const REPORT_DATE_COLUMN: &str = "report_date";
