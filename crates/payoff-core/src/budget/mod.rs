//! Monthly income and expense aggregation over recorded transactions.

pub mod monthly;
