use crate::error::MetabResult;
use crate::metab::fluxes::{CarbonSeries, OxygenSeries};
use crate::metab::schemes::{CarbonInputs, OxygenInputs, Scheme};

/// Common contract for calibratable parameter sets.
///
/// Provides a uniform interface for parameter metadata and array
/// conversion, so fitting code can treat parameter sets generically.
pub trait ModelParams: Sized {
    const N_PARAMS: usize;
    const PARAM_NAMES: &'static [&'static str];
    const PARAM_BOUNDS: &'static [(f64, f64)];

    fn from_array(arr: &[f64]) -> MetabResult<Self>;
    fn to_array(&self) -> Vec<f64>;
}

/// Time-integration scheme for the DO and DIC balances.
///
/// Oxygen is integrated first; the carbon pass reuses the carbon fixed and
/// respired at every step of the oxygen pass.
pub trait Integrator {
    const SCHEME: Scheme;

    /// Integrate DO over the whole series.
    fn integrate_oxygen(inputs: &OxygenInputs) -> MetabResult<OxygenSeries>;

    /// Integrate DIC over the whole series, given a completed oxygen pass.
    fn integrate_carbon(inputs: &CarbonInputs, oxygen: &OxygenSeries) -> MetabResult<CarbonSeries>;
}
