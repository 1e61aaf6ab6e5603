use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Web API
//
// Malformed JSON is a thrown error; domain failures come back as an
// `{ error, message }` payload so the HTTP layer can relay them unchanged.
// ---------------------------------------------------------------------------

#[napi]
pub fn quote_loan(request_json: String) -> NapiResult<String> {
    let request: payoff_core::api::LoanQuoteRequest =
        serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let value = payoff_core::api::to_json_response(payoff_core::api::quote_loan(&request))
        .map_err(to_napi_error)?;
    serde_json::to_string(&value).map_err(to_napi_error)
}

#[napi]
pub fn debt_chart(request_json: String) -> NapiResult<String> {
    let request: payoff_core::api::DebtChartRequest =
        serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let value = payoff_core::api::to_json_response(payoff_core::api::debt_chart(&request))
        .map_err(to_napi_error)?;
    serde_json::to_string(&value).map_err(to_napi_error)
}

#[napi]
pub fn payoff_scenario(request_json: String) -> NapiResult<String> {
    let request: payoff_core::api::PayoffScenarioRequest =
        serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let today = chrono::Local::now().date_naive();
    let value = payoff_core::api::to_json_response(payoff_core::api::payoff_scenario(
        &request, today,
    ))
    .map_err(to_napi_error)?;
    serde_json::to_string(&value).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// What-if
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RequiredPaymentInput {
    balance: Decimal,
    old_rate_percent: Decimal,
    new_rate_percent: Decimal,
    current_payment: Decimal,
}

#[napi]
pub fn required_payment(input_json: String) -> NapiResult<String> {
    let input: RequiredPaymentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let payment = payoff_core::loans::what_if::required_payment(
        input.balance,
        input.old_rate_percent,
        input.new_rate_percent,
        input.current_payment,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({ "required_payment": payment }))
        .map_err(to_napi_error)
}

#[napi]
pub fn extra_payment_impact(input_json: String) -> NapiResult<String> {
    let input: payoff_core::loans::what_if::ExtraPaymentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        payoff_core::loans::what_if::extra_payment_impact(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn rate_scenarios(input_json: String) -> NapiResult<String> {
    let input: payoff_core::loans::what_if::RateScenarioInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = payoff_core::loans::what_if::rate_scenarios(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Debts
// ---------------------------------------------------------------------------

#[napi]
pub fn summarize_debts(input_json: String) -> NapiResult<String> {
    let input: payoff_core::debts::portfolio::DebtPortfolioInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        payoff_core::debts::portfolio::summarize_debts(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Budget
// ---------------------------------------------------------------------------

#[napi]
pub fn summarize_month(input_json: String) -> NapiResult<String> {
    let input: payoff_core::budget::monthly::MonthlySummaryInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = payoff_core::budget::monthly::summarize_month(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn monthly_series(input_json: String) -> NapiResult<String> {
    let input: payoff_core::budget::monthly::MonthlySeriesInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = payoff_core::budget::monthly::monthly_series(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
