//! Per-parcel outputs of the Lagrangian model.

use streammetab_macros::Fluxes;

/// Oxygen-side values for one parcel, over its whole travel time.
#[derive(Debug, Clone, Copy, PartialEq, Fluxes)]
#[fluxes(series_name = "ParcelOxygenSeries")]
pub struct ParcelOxygenFluxes {
    pub travel_time: f64,
    pub par_fraction: f64,
    pub up_sat_do: f64,
    pub down_sat_do: f64,
    pub avg_k_do: f64,
    pub c_fixation: f64,
    pub c_respiration: f64,
    /// DO leaving the reach [umol/L]
    pub dox: f64,
    pub do_production: f64,
    pub do_consumption: f64,
    pub do_equilibration: f64,
    pub do_groundwater: f64,
}

/// Carbon-side values for one parcel.
#[derive(Debug, Clone, Copy, PartialEq, Fluxes)]
#[fluxes(series_name = "ParcelCarbonSeries")]
pub struct ParcelCarbonFluxes {
    pub up_ph: f64,
    pub up_pco2: f64,
    pub up_k_henry: f64,
    pub down_k_henry: f64,
    pub avg_k_co2: f64,
    /// DIC leaving the reach [umol/L]
    pub dic: f64,
    pub ph: f64,
    pub pco2: f64,
    pub dic_production: f64,
    pub dic_consumption: f64,
    pub co2_equilibration: f64,
    pub dic_groundwater: f64,
}

/// Result of a parcel run, one entry per parcel.
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelOutput {
    pub oxygen: ParcelOxygenSeries,
    pub carbon: Option<ParcelCarbonSeries>,
}

impl ParcelOutput {
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
}
