//! The amortization engine: fixed payment quotes, month-by-month schedules,
//! payoff projection and what-if solvers.

pub mod payment;
pub mod payoff;
pub mod schedule;
pub mod what_if;
