use crate::models::CaseRecord;

/// Historical / alternate spellings, each mapping to one canonical country.
///
/// Checked first, exact match only. The source data spans an evolving
/// reporting schema in which country naming drifted over time.
const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("Viet Nam", "Vietnam"),
    ("United Kingdom", "UK"),
    ("Taipei and environs", "Taiwan"),
    ("Taiwan*", "Taiwan"),
    ("Republic of Korea", "South Korea"),
    ("Korea", "South Korea"),
    ("Republic of Moldova", "Moldova"),
    ("Republic of Ireland", "Ireland"),
    ("Iran (Islamic Republic of)", "Iran"),
];

/// Annotation appended to some sub-national labels, removed before the
/// short-code check.
const DIAMOND_PRINCESS_NOTE: &str = "(From Diamond Princess)";

/// Map a raw country / region label to its canonical country name.
///
/// Ordered rule list, first match wins:
///
/// 1. Exact alias table ([`COUNTRY_ALIASES`]).
/// 2. `"Republic of the Congo"` or any `Congo…` prefix → `"Congo"`.
/// 3. Any label containing `"U.S."` or `"D.C."` → `"US"`.
/// 4. Remove the `"(From Diamond Princess)"` annotation, then:
/// 5. a label that is exactly two characters once surrounding quotes and
///    whitespace are stripped is a US state / territory code → `"US"`.
/// 6. Fallback: the stripped label itself.
///
/// Total and deterministic; never returns `None`-like values and has no
/// hidden state.
///
/// # Examples
///
/// ```
/// use trend_core::normalize::canonical_country;
///
/// assert_eq!(canonical_country("Viet Nam"), "Vietnam");
/// assert_eq!(canonical_country("TX"), "US");
/// assert_eq!(canonical_country(" Thailand "), "Thailand");
/// ```
pub fn canonical_country(raw: &str) -> String {
    for (alias, canonical) in COUNTRY_ALIASES {
        if raw == *alias {
            return (*canonical).to_string();
        }
    }

    if raw == "Republic of the Congo" || raw.starts_with("Congo") {
        return "Congo".to_string();
    }

    if raw.contains("U.S.") || raw.contains("D.C.") {
        return "US".to_string();
    }

    let label = raw.replace(DIAMOND_PRINCESS_NOTE, "");
    let stripped = strip_label(&label);

    // Two-character remainders are US state codes, e.g. TX, CA.
    if stripped.chars().count() == 2 {
        return "US".to_string();
    }

    stripped.to_string()
}

/// Apply [`canonical_country`] to every record's country field.
pub fn normalize_records(records: Vec<CaseRecord>) -> Vec<CaseRecord> {
    records
        .into_iter()
        .map(|mut record| {
            record.country = canonical_country(&record.country);
            record
        })
        .collect()
}

/// Strip surrounding whitespace and quote characters from a label.
fn strip_label(label: &str) -> &str {
    label.trim().trim_matches('"').trim()
}
