//! Per-index outputs of the time-series model.
//!
//! Fluxes at index `i` describe the step from `i` to `i + 1`; the final
//! index carries the concentrations only, with every flux zero.

use streammetab_macros::Fluxes;

use crate::error::MetabResult;

/// Oxygen-side values at one index.
#[derive(Debug, Clone, Copy, PartialEq, Fluxes)]
#[fluxes(series_name = "OxygenSeries")]
pub struct OxygenFluxes {
    pub dt: f64,
    /// Fraction of daily light received over the step
    pub par_fraction: f64,
    pub sat_do: f64,
    pub k_do: f64,
    pub c_fixation: f64,
    pub c_respiration: f64,
    /// DO concentration [umol/L]
    pub dox: f64,
    pub do_production: f64,
    pub do_consumption: f64,
    pub do_equilibration: f64,
    pub do_groundwater: f64,
}

/// Carbon-side values at one index.
#[derive(Debug, Clone, Copy, PartialEq, Fluxes)]
#[fluxes(series_name = "CarbonSeries")]
pub struct CarbonFluxes {
    /// DIC concentration [umol/L]
    pub dic: f64,
    pub ph: f64,
    /// Water pCO2 [uatm]
    pub pco2: f64,
    pub k_henry: f64,
    pub k_co2: f64,
    pub dic_production: f64,
    pub dic_consumption: f64,
    pub co2_equilibration: f64,
    pub dic_groundwater: f64,
}

impl OxygenFluxes {
    /// Final-index row: state and rates, no fluxes.
    pub fn sentinel(dox: f64, sat_do: f64, k_do: f64) -> Self {
        Self {
            dt: 0.0,
            par_fraction: 0.0,
            sat_do,
            k_do,
            c_fixation: 0.0,
            c_respiration: 0.0,
            dox,
            do_production: 0.0,
            do_consumption: 0.0,
            do_equilibration: 0.0,
            do_groundwater: 0.0,
        }
    }

    /// Net DO change over the step.
    pub fn net_change(&self) -> f64 {
        self.do_production + self.do_consumption + self.do_equilibration + self.do_groundwater
    }
}

impl CarbonFluxes {
    pub fn sentinel(dic: f64, ph: f64, pco2: f64, k_henry: f64, k_co2: f64) -> Self {
        Self {
            dic,
            ph,
            pco2,
            k_henry,
            k_co2,
            dic_production: 0.0,
            dic_consumption: 0.0,
            co2_equilibration: 0.0,
            dic_groundwater: 0.0,
        }
    }

    pub fn net_change(&self) -> f64 {
        self.dic_production + self.dic_consumption + self.co2_equilibration + self.dic_groundwater
    }
}

/// Result of a time-series run.
#[derive(Debug, Clone, PartialEq)]
pub struct MetabolismOutput {
    pub oxygen: OxygenSeries,
    /// Present when the model was given a carbon setup
    pub carbon: Option<CarbonSeries>,
}

impl MetabolismOutput {
    /// Look up an output column by name across both series.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.oxygen
            .column(name)
            .or_else(|| self.carbon.as_ref().and_then(|c| c.column(name)))
    }

    pub fn len(&self) -> usize {
        self.oxygen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oxygen.is_empty()
    }

    /// Score simulated DO against `observed` with one of the
    /// [`crate::objective`] functions.
    pub fn score_do<F>(&self, observed: &[f64], objective: F) -> MetabResult<f64>
    where
        F: Fn(&[f64], &[f64]) -> MetabResult<f64>,
    {
        objective(observed, &self.oxygen.dox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_in_order() {
        assert_eq!(OxygenFluxes::field_names()[6], "dox");
        assert_eq!(CarbonFluxes::field_names()[0], "dic");
        assert_eq!(OxygenFluxes::field_names().len(), 11);
    }

    #[test]
    fn sentinel_has_no_flux() {
        let row = OxygenFluxes::sentinel(290.0, 284.0, 2.1);
        assert_eq!(row.net_change(), 0.0);
        assert_eq!(row.dox, 290.0);
        let row = CarbonFluxes::sentinel(2000.0, 7.9, 600.0, 0.04, 1.9);
        assert_eq!(row.net_change(), 0.0);
    }

    #[test]
    fn output_column_lookup() {
        let mut oxygen = OxygenSeries::with_capacity(1);
        oxygen.push(&OxygenFluxes::sentinel(300.0, 284.0, 2.1));
        let mut carbon = CarbonSeries::with_capacity(1);
        carbon.push(&CarbonFluxes::sentinel(2000.0, 7.9, 600.0, 0.04, 1.9));
        let out = MetabolismOutput {
            oxygen,
            carbon: Some(carbon),
        };
        assert_eq!(out.column("dox"), Some(&[300.0][..]));
        assert_eq!(out.column("ph"), Some(&[7.9][..]));
        assert_eq!(out.column("nope"), None);
        assert_eq!(out.len(), 1);
    }
}
