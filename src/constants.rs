//! Fixed vocabulary of the accident dataset: sentinel literals, the
//! strict time format, and the ordered categorical domains. These are
//! process-wide immutable configuration; nothing registers new domain
//! values at runtime.

use crate::domain::CategoricalDomain;

/// Raw values that mean "missing" rather than data. Matching is exact
/// and case-sensitive; `"Unknowns"` is data, `"Unknown"` is not.
pub const SENTINEL_VALUES: &[&str] = &["Unknown", "unknown", "na", "-1", "Other"];

/// The only accepted time-of-day format. No fallback formats.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Canonical column names the built-in derivations read from.
pub const TIME_COLUMN: &str = "time";
pub const CASUALTIES_COLUMN: &str = "number_of_casualties";

/// Derived column names appended by the pipeline.
pub const HOUR_COLUMN: &str = "hour";
pub const CASUALTY_COUNT_COLUMN: &str = "casualty_count";

pub static SEVERITY_DOMAIN: CategoricalDomain = CategoricalDomain::new(
    "accident_severity",
    &["Slight Injury", "Serious Injury", "Fatal Injury"],
);

pub static AGE_BAND_DOMAIN: CategoricalDomain = CategoricalDomain::new(
    "age_band_of_driver",
    &["Under 18", "18-30", "31-50", "Over 51"],
);

pub static EDUCATION_DOMAIN: CategoricalDomain = CategoricalDomain::new(
    "educational_level",
    &[
        "Illiterate",
        "Elementary school",
        "Junior high school",
        "High school graduate",
        "Above high school",
        "College & above",
    ],
);

pub static DAY_OF_WEEK_DOMAIN: CategoricalDomain = CategoricalDomain::new(
    "day_of_week",
    &[
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ],
);

/// All ordered categorical domains, one tagging derivation each.
pub fn ordered_domains() -> [&'static CategoricalDomain; 4] {
    [
        &SEVERITY_DOMAIN,
        &AGE_BAND_DOMAIN,
        &EDUCATION_DOMAIN,
        &DAY_OF_WEEK_DOMAIN,
    ]
}
