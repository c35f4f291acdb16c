//! Intervalles semi-ouverts [start, end) et dates locales.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Vrai si [a_start, a_end) et [b_start, b_end) se coupent.
///
/// Couvre les trois cas : début pendant l'existant, fin pendant l'existant,
/// englobement. Deux intervalles qui se touchent ne se chevauchent pas, et un
/// intervalle vide ne chevauche rien.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < a_end && b_start < b_end && a_start < b_end && b_start < a_end
}

/// Vrai si la date locale de `instant` est `date`.
pub fn is_on_date(instant: DateTime<Utc>, date: NaiveDate, offset: &FixedOffset) -> bool {
    local_date(instant, offset) == date
}

pub fn local_date(instant: DateTime<Utc>, offset: &FixedOffset) -> NaiveDate {
    instant.with_timezone(offset).date_naive()
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
