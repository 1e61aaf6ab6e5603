//! Request/response contract for the HTTP layer in front of the engine.
//!
//! Requests arrive as camelCase JSON whose numeric fields may be numbers or
//! numeric strings. Every field is validated here, before the engine runs,
//! so a blank or non-numeric value becomes an `InvalidInput` naming the
//! field instead of a silent zero.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::PayoffError;
use crate::loans::payment::{compute_monthly_payment, LoanTerms};
use crate::loans::payoff::project_payoff;
use crate::loans::schedule::{simulate_amortization, AmortizationInput};
use crate::loans::what_if::required_payment;
use crate::time_value::round_currency;
use crate::types::Money;
use crate::PayoffOutcome;

// ---------------------------------------------------------------------------
// Numeric fields
// ---------------------------------------------------------------------------

/// A numeric value as sent by a browser form: a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    Number(serde_json::Number),
    Text(String),
}

impl From<Decimal> for NumericField {
    fn from(value: Decimal) -> Self {
        NumericField::Text(value.to_string())
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Parse a required numeric field into a `Decimal`.
pub fn require_decimal(field: &str, value: Option<&NumericField>) -> PayoffOutcome<Decimal> {
    let value = value.ok_or_else(|| PayoffError::invalid(field, "is required"))?;
    match value {
        NumericField::Number(n) => parse_decimal(&n.to_string())
            .ok_or_else(|| PayoffError::invalid(field, format!("'{n}' is not a finite number"))),
        NumericField::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(PayoffError::invalid(field, "must not be empty"));
            }
            parse_decimal(trimmed)
                .ok_or_else(|| PayoffError::invalid(field, format!("'{trimmed}' is not a number")))
        }
    }
}

/// Parse an optional numeric field; absent or blank means `None`.
pub fn optional_decimal(field: &str, value: Option<&NumericField>) -> PayoffOutcome<Option<Decimal>> {
    match value {
        None => Ok(None),
        Some(NumericField::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => require_decimal(field, Some(v)).map(Some),
    }
}

/// Parse a required whole, positive month count.
pub fn require_months(field: &str, value: Option<&NumericField>) -> PayoffOutcome<u32> {
    let months = require_decimal(field, value)?;
    if !months.fract().is_zero() {
        return Err(PayoffError::invalid(field, "must be a whole number of months"));
    }
    months
        .to_u32()
        .filter(|m| *m >= 1)
        .ok_or_else(|| PayoffError::invalid(field, "must be at least 1"))
}

// ---------------------------------------------------------------------------
// Loan payment quote
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanQuoteRequest {
    pub loan_amount: Option<NumericField>,
    pub interest_rate: Option<NumericField>,
    pub term_months: Option<NumericField>,
}

impl LoanQuoteRequest {
    pub fn to_terms(&self) -> PayoffOutcome<LoanTerms> {
        Ok(LoanTerms::new(
            require_decimal("loanAmount", self.loan_amount.as_ref())?,
            require_decimal("interestRate", self.interest_rate.as_ref())?,
            require_months("termMonths", self.term_months.as_ref())?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanQuoteResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_payment: Money,
}

pub fn quote_loan(request: &LoanQuoteRequest) -> PayoffOutcome<LoanQuoteResponse> {
    let terms = request.to_terms()?;
    Ok(LoanQuoteResponse {
        monthly_payment: compute_monthly_payment(&terms)?,
    })
}

// ---------------------------------------------------------------------------
// Debt amortization chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtChartRequest {
    pub balance: Option<NumericField>,
    pub interest_rate: Option<NumericField>,
    pub min_payment: Option<NumericField>,
}

impl DebtChartRequest {
    pub fn to_input(&self) -> PayoffOutcome<AmortizationInput> {
        Ok(AmortizationInput::new(
            require_decimal("balance", self.balance.as_ref())?,
            require_decimal("interestRate", self.interest_rate.as_ref())?,
            require_decimal("minPayment", self.min_payment.as_ref())?,
        ))
    }
}

/// One point of the amortization chart, rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub month: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub payment: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub principal: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub interest: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_interest: Money,
}

pub fn debt_chart(request: &DebtChartRequest) -> PayoffOutcome<Vec<ChartPoint>> {
    let schedule = simulate_amortization(&request.to_input()?)?;
    Ok(schedule
        .rows
        .iter()
        .map(|row| ChartPoint {
            month: row.month,
            payment: round_currency(row.payment),
            principal: round_currency(row.principal_portion),
            interest: round_currency(row.interest_portion),
            balance: round_currency(row.remaining_balance),
            total_interest: round_currency(row.cumulative_interest),
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Payoff scenario
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffScenarioRequest {
    pub balance: Option<NumericField>,
    pub interest_rate: Option<NumericField>,
    pub payment: Option<NumericField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_rate: Option<NumericField>,
    /// Reference date; the caller's current date when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffScenarioResponse {
    pub payoff_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_interest: Money,
    pub months: u32,
    pub extra_days: u32,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub required_payment: Option<Money>,
}

/// Project the payoff for the request; when `newRate` is present also solve
/// the payment that keeps the same payoff horizon at that rate.
pub fn payoff_scenario(
    request: &PayoffScenarioRequest,
    today: NaiveDate,
) -> PayoffOutcome<PayoffScenarioResponse> {
    let balance = require_decimal("balance", request.balance.as_ref())?;
    let rate = require_decimal("interestRate", request.interest_rate.as_ref())?;
    let payment = require_decimal("payment", request.payment.as_ref())?;
    let new_rate = optional_decimal("newRate", request.new_rate.as_ref())?;
    let as_of = request.as_of.unwrap_or(today);

    let projection = project_payoff(balance, rate, payment, as_of)?;
    let required = match new_rate {
        Some(r) => Some(required_payment(balance, rate, r, payment)?),
        None => None,
    };

    Ok(PayoffScenarioResponse {
        payoff_date: projection.payoff_date,
        total_interest: round_currency(projection.total_interest),
        months: projection.total_months,
        extra_days: projection.extra_days,
        required_payment: required,
    })
}

// ---------------------------------------------------------------------------
// Error payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<&PayoffError> for ErrorPayload {
    fn from(e: &PayoffError) -> Self {
        let field = match e {
            PayoffError::InvalidInput { field, .. } => Some(field.clone()),
            _ => None,
        };
        ErrorPayload {
            error: e.code().to_string(),
            message: e.to_string(),
            field,
        }
    }
}

/// Serialize either the response or its error payload.
pub fn to_json_response<T: Serialize>(result: PayoffOutcome<T>) -> PayoffOutcome<serde_json::Value> {
    match result {
        Ok(body) => Ok(serde_json::to_value(body)?),
        Err(e) => Ok(serde_json::to_value(ErrorPayload::from(&e))?),
    }
}
