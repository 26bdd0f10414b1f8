// src/period.rs

use chrono::{Month, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

use crate::error::EtlError;

/// One monthly reporting snapshot. Ordered by year, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, EtlError> {
        if (1..=12).contains(&month) {
            Ok(Self { year, month })
        } else {
            Err(EtlError::InvalidPeriod(format!("{year}-{month}")))
        }
    }

    /// Lowercase English month name, as used in the publisher's file names.
    pub fn month_name(&self) -> String {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name().to_ascii_lowercase())
            .unwrap_or_default()
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Every month from `start` through `end`, inclusive. Empty if `end < start`.
    pub fn range(start: Period, end: Period) -> Vec<Period> {
        let mut out = Vec::new();
        let mut cur = start;
        while cur <= end {
            out.push(cur);
            cur = cur.next();
        }
        out
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EtlError::InvalidPeriod(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        if y.len() != 4 || m.is_empty() || m.len() > 2 {
            return Err(invalid());
        }
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        Period::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Drop periods older than the publisher's first snapshot, keeping input order.
///
/// Missing history is expected, so nothing is reported for the dropped ones.
pub fn resolve_periods(requested: &[Period], earliest: Period) -> Vec<Period> {
    requested
        .iter()
        .copied()
        .filter(|p| *p >= earliest)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(y: i32, m: u32) -> Period {
        Period::new(y, m).unwrap()
    }

    #[test]
    fn parses_and_displays_tags() {
        assert_eq!("2022-03".parse::<Period>().unwrap(), p(2022, 3));
        assert_eq!("2022-3".parse::<Period>().unwrap(), p(2022, 3));
        assert_eq!(p(2022, 3).to_string(), "2022-03");
        assert!("2022-13".parse::<Period>().is_err());
        assert!("22-01".parse::<Period>().is_err());
        assert!("2022".parse::<Period>().is_err());
    }

    #[test]
    fn month_names_are_lowercase() {
        assert_eq!(p(2022, 3).month_name(), "march");
        assert_eq!(p(2019, 12).month_name(), "december");
    }

    #[test]
    fn range_crosses_year_boundary() {
        let r = Period::range(p(2021, 11), p(2022, 2));
        assert_eq!(r, vec![p(2021, 11), p(2021, 12), p(2022, 1), p(2022, 2)]);
        assert!(Period::range(p(2022, 2), p(2022, 1)).is_empty());
    }

    #[test]
    fn resolve_drops_early_periods_and_keeps_order() {
        let requested = vec![p(2022, 5), p(2014, 1), p(2015, 7), p(2015, 6), p(2022, 5)];
        let out = resolve_periods(&requested, p(2015, 7));
        assert_eq!(out, vec![p(2022, 5), p(2015, 7), p(2022, 5)]);
    }
}
