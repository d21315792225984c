use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Scenario analysis
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_transaction(input_json: String) -> NapiResult<String> {
    let input: saletax_core::analysis::TransactionAnalysisInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        saletax_core::analysis::analyze_transaction(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Single calculations
// ---------------------------------------------------------------------------

#[napi]
pub fn assess_eligibility(input_json: String) -> NapiResult<String> {
    let input: saletax_core::analysis::EligibilityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = saletax_core::analysis::assess_eligibility(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_sale_tax(input_json: String) -> NapiResult<String> {
    let input: saletax_core::analysis::SaleTaxInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = saletax_core::analysis::calculate_sale_tax(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// The rate schedule bundled with the engine, for display or as a template.
#[napi]
pub fn bundled_schedule() -> NapiResult<String> {
    let schedule =
        saletax_core::schedule::TaxRateSchedule::bundled().map_err(to_napi_error)?;
    serde_json::to_string(&schedule).map_err(to_napi_error)
}
