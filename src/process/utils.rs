// src/process/utils.rs

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Normalize a raw header label: lowercase, every run of whitespace or
/// punctuation becomes one `_`, no leading or trailing `_`.
///
/// `"Nameplate Capacity (MW)"` → `"nameplate_capacity_mw"`.
pub fn simplify_column_name(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    NON_WORD
        .replace_all(&lower, "_")
        .trim_matches('_')
        .to_string()
}

/// Trim a cell and turn the publisher's "missing" spellings into `None`.
pub fn fix_na(raw: Option<String>) -> Option<String> {
    let s = raw?;
    let t = s.trim();
    match t {
        "" | "." => None,
        _ if t.len() == s.len() => Some(s),
        _ => Some(t.to_string()),
    }
}

/// Parse an integer-like string, accepting whole floats such as `"2022.0"`.
pub fn parse_int_lenient(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(i);
    }
    let f: f64 = s.parse().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        Some(f as i64)
    } else {
        None
    }
}

/// Integer identifiers arrive as `3`, `3.0` or junk. Junk becomes `None`.
pub fn normalize_integer_id(raw: Option<String>) -> Option<String> {
    raw.as_deref()
        .and_then(parse_int_lenient)
        .map(|i| i.to_string())
}

/// Drop leading zeros that upstream formatting adds to purely numeric ids.
///
/// Anything with a non-digit character is returned untouched, and an
/// all-zero id keeps a single `"0"`.
pub fn strip_leading_zeros(id: &str) -> String {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return id.to_string();
    }
    let stripped = id.trim_start_matches('0');
    if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

/// Status cells read either `OP` or `(OP) Operating`; keep just the code.
pub fn status_code(raw: Option<String>) -> Option<String> {
    let s = raw?;
    let t = s.trim();
    let code = match t.strip_prefix('(').and_then(|rest| rest.split_once(')')) {
        Some((code, _)) => code.trim(),
        None => t,
    };
    if code.is_empty() {
        None
    } else {
        Some(code.to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simplifies_headers() {
        assert_eq!(simplify_column_name("Nameplate Capacity (MW)"), "nameplate_capacity_mw");
        assert_eq!(simplify_column_name("  Entity ID "), "entity_id");
        assert_eq!(
            simplify_column_name("Planned Derate of Summer Capacity (MW)"),
            "planned_derate_of_summer_capacity_mw"
        );
        assert_eq!(simplify_column_name("Plant\nState"), "plant_state");
    }

    #[test]
    fn na_spellings_become_none() {
        assert_eq!(fix_na(Some("  ".into())), None);
        assert_eq!(fix_na(Some(".".into())), None);
        assert_eq!(fix_na(None), None);
        assert_eq!(fix_na(Some(" Coal ".into())).as_deref(), Some("Coal"));
        assert_eq!(fix_na(Some("0".into())).as_deref(), Some("0"));
        assert_eq!(fix_na(Some("NA".into())).as_deref(), Some("NA"));
    }

    #[test]
    fn integer_ids_parse_leniently() {
        assert_eq!(normalize_integer_id(Some("3".into())).as_deref(), Some("3"));
        assert_eq!(normalize_integer_id(Some("3.0".into())).as_deref(), Some("3"));
        assert_eq!(normalize_integer_id(Some("abc".into())), None);
        assert_eq!(normalize_integer_id(Some("3.5".into())), None);
        assert_eq!(parse_int_lenient("2022.0"), Some(2022));
    }

    #[test]
    fn leading_zeros_stripped_only_from_numeric_ids() {
        assert_eq!(strip_leading_zeros("0007"), "7");
        assert_eq!(strip_leading_zeros("GEN0A"), "GEN0A");
        assert_eq!(strip_leading_zeros("0A"), "0A");
        assert_eq!(strip_leading_zeros("000"), "0");
        assert_eq!(strip_leading_zeros("10"), "10");
        for id in ["0007", "GEN0A", "000", "ST1", "012"] {
            let once = strip_leading_zeros(id);
            assert_eq!(strip_leading_zeros(&once), once);
        }
    }

    #[test]
    fn status_codes_are_extracted() {
        assert_eq!(status_code(Some("(OP) Operating".into())).as_deref(), Some("OP"));
        assert_eq!(status_code(Some("sb".into())).as_deref(), Some("SB"));
        assert_eq!(status_code(Some("()".into())), None);
    }
}
