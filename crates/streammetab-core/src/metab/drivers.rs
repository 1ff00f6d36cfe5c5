//! Per-step quantities derived once from the forcing before integrating.

use crate::error::{MetabError, MetabResult};
use crate::forcing::Forcing;
use crate::gas_exchange::Calculators;

/// Step lengths, light and gas-exchange rates at every index.
///
/// Arrays are sized to the forcing. The final index is a sentinel: it has
/// no following step, so its `dt` and `par_avg` are zero.
#[derive(Debug, Clone)]
pub struct StepDrivers {
    pub temp: Vec<f64>,
    pub par: Vec<f64>,
    pub dt: Vec<f64>,
    pub par_avg: Vec<f64>,
    pub sat_do: Vec<f64>,
    pub k_do: Vec<f64>,
    pub k_co2: Vec<f64>,
    /// Light total that daily GPP is distributed over
    pub par_total: f64,
}

/// Trapezoidal integral of `par` over `time`.
pub fn trapezoid_par_total(time: &[f64], par: &[f64]) -> f64 {
    time.windows(2)
        .zip(par.windows(2))
        .map(|(t, p)| 0.5 * (p[0] + p[1]) * (t[1] - t[0]))
        .sum()
}

impl StepDrivers {
    /// Derive the drivers for `forcing`.
    ///
    /// `par_total` is used as given when positive; otherwise it is the
    /// trapezoidal light integral of the series. A series with no light at
    /// all has nothing to distribute GPP over and is rejected.
    pub fn new(
        forcing: &Forcing,
        k600: f64,
        calculators: &Calculators,
        par_total: Option<f64>,
    ) -> MetabResult<Self> {
        let n = forcing.len();
        let mut dt = vec![0.0; n];
        let mut par_avg = vec![0.0; n];
        for i in 0..n - 1 {
            dt[i] = forcing.time[i + 1] - forcing.time[i];
            par_avg[i] = 0.5 * (forcing.par[i] + forcing.par[i + 1]);
        }

        let sat_do = (0..n)
            .map(|i| calculators.saturation(forcing.temp[i], forcing.relative_pressure(i)))
            .collect();
        let k_do = forcing
            .temp
            .iter()
            .map(|&t| (calculators.k_do)(t, k600))
            .collect();
        let k_co2 = forcing
            .temp
            .iter()
            .map(|&t| (calculators.k_co2)(t, k600))
            .collect();

        let par_total = match par_total {
            Some(total) if total > 0.0 => total,
            _ => trapezoid_par_total(&forcing.time, &forcing.par),
        };
        if !(par_total.is_finite() && par_total > 0.0) {
            return Err(MetabError::invalid(format!(
                "total PAR must be positive to distribute GPP, got {par_total}"
            )));
        }

        Ok(Self {
            temp: forcing.temp.clone(),
            par: forcing.par.clone(),
            dt,
            par_avg,
            sat_do,
            k_do,
            k_co2,
            par_total,
        })
    }

    pub fn len(&self) -> usize {
        self.dt.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dt.is_empty()
    }

    /// Mean O2 exchange rate over the step starting at `i`.
    pub fn avg_k_do(&self, i: usize) -> f64 {
        0.5 * (self.k_do[i] + self.k_do[i + 1])
    }

    /// Mean CO2 exchange rate over the step starting at `i`.
    pub fn avg_k_co2(&self, i: usize) -> f64 {
        0.5 * (self.k_co2[i] + self.k_co2[i + 1])
    }
}
