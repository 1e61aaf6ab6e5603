pub mod budget;
pub mod debts;
pub mod loans;

use chrono::NaiveDate;

/// The reference date for projections: `--as-of` when given, otherwise the
/// local calendar date. This is the only place the clock is read.
pub fn resolve_as_of(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| chrono::Local::now().date_naive())
}
