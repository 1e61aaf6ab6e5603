//! Summaries over the debts a household is carrying.

pub mod portfolio;
