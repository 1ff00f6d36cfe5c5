use log::warn;

use super::constants::*;
use crate::optimize::{accuracy, brent_fmin};
use crate::settings::SolverSettings;

/// Solved carbonate speciation at one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equilibrium {
    pub ph: f64,
    /// Partial pressure of CO2 in equilibrium with the water [uatm]
    pub pco2: f64,
}

/// Temperature- and ionic-strength-dependent carbonate constants.
///
/// Built for one (temperature, conductivity) pair and rebuilt with
/// [`reset`](Self::reset) whenever either changes. A model run owns its own
/// instance; nothing is shared between runs.
#[derive(Debug, Clone, PartialEq)]
pub struct CarbonateSystem {
    temp_k: f64,
    ionic_strength: f64,
    davies_exponent: f64,
    activity_h: f64,
    activity_oh: f64,
    activity_hco3: f64,
    activity_co3: f64,
    k_h2co3: f64,
    k_hco3: f64,
    k_h2o: f64,
    k_henry: f64,
}

fn dissociation(coef: &[f64; 3], temp_k: f64) -> f64 {
    (coef[0] + coef[1] / temp_k + coef[2] * temp_k.ln()).exp()
}

impl CarbonateSystem {
    /// Create the system at `temp_c` [C] and specific conductance `conductivity` [mS/cm].
    pub fn new(temp_c: f64, conductivity: f64) -> Self {
        let mut system = Self {
            temp_k: 0.0,
            ionic_strength: 0.0,
            davies_exponent: 0.0,
            activity_h: 1.0,
            activity_oh: 1.0,
            activity_hco3: 1.0,
            activity_co3: 1.0,
            k_h2co3: 0.0,
            k_hco3: 0.0,
            k_h2o: 0.0,
            k_henry: 0.0,
        };
        system.reset(temp_c, conductivity);
        system
    }

    /// Recompute every derived constant for new water conditions.
    pub fn reset(&mut self, temp_c: f64, conductivity: f64) {
        self.temp_k = temp_c + KELVIN_OFFSET;
        self.ionic_strength = IONIC_STRENGTH_PER_CONDUCTIVITY * conductivity;

        let davies_a = DAVIES_A_25C + (temp_c - 25.0) * DAVIES_A_SLOPE;
        let sqrt_i = self.ionic_strength.sqrt();
        self.davies_exponent =
            -davies_a * (sqrt_i / (1.0 + sqrt_i) - DAVIES_LINEAR * self.ionic_strength);

        // monovalent ions share one coefficient; the divalent one scales with z^2
        let monovalent = 10f64.powf(self.davies_exponent);
        self.activity_h = monovalent;
        self.activity_oh = monovalent;
        self.activity_hco3 = monovalent;
        self.activity_co3 = 10f64.powf(4.0 * self.davies_exponent);

        self.k_h2co3 =
            dissociation(&K_H2CO3, self.temp_k) / (self.activity_h * self.activity_hco3);
        self.k_hco3 = dissociation(&K_HCO3, self.temp_k)
            / (self.activity_h * (self.activity_co3 / self.activity_hco3));
        self.k_h2o = dissociation(&K_H2O, self.temp_k) / (self.activity_h * self.activity_oh);

        let [a, b, c] = K_HENRY_CO2;
        self.k_henry = (a + b * (100.0 / self.temp_k) + c * (self.temp_k / 100.0).ln()).exp();
    }

    pub fn temp_k(&self) -> f64 {
        self.temp_k
    }

    pub fn ionic_strength(&self) -> f64 {
        self.ionic_strength
    }

    pub fn davies_exponent(&self) -> f64 {
        self.davies_exponent
    }

    /// Activity coefficients of (H+, OH-, HCO3-, CO3--).
    pub fn activity_coefficients(&self) -> (f64, f64, f64, f64) {
        (
            self.activity_h,
            self.activity_oh,
            self.activity_hco3,
            self.activity_co3,
        )
    }

    /// Apparent first dissociation constant of carbonic acid.
    pub fn k_h2co3(&self) -> f64 {
        self.k_h2co3
    }

    /// Apparent dissociation constant of bicarbonate.
    pub fn k_hco3(&self) -> f64 {
        self.k_hco3
    }

    /// Apparent ion product of water.
    pub fn k_h2o(&self) -> f64 {
        self.k_h2o
    }

    /// Henry's constant for CO2 [mol/L/atm].
    pub fn k_henry(&self) -> f64 {
        self.k_henry
    }

    /// Total alkalinity [eq/L] implied by `dic` [mol/L] at `ph`.
    pub fn total_alkalinity_from_dic_ph(&self, dic: f64, ph: f64) -> f64 {
        let h = 10f64.powf(-ph);
        let oh = self.k_h2o / h;
        let co2 = dic * h * h / (h * h + self.k_h2co3 * h + self.k_h2co3 * self.k_hco3);
        let hco3 = co2 * self.k_h2co3 / h;
        let co3 = hco3 * self.k_hco3 / h;
        hco3 + 2.0 * co3 + oh - h
    }

    /// Equilibrium pCO2 [uatm] of water holding `dic` [mol/L] at `ph`.
    pub fn pco2_from_dic_ph(&self, dic: f64, ph: f64) -> f64 {
        let h = 10f64.powf(-ph);
        let a6 = 10f64.powf(6.0 * self.davies_exponent);
        let a4 = 10f64.powf(4.0 * self.davies_exponent);
        let h2 = h * h * a6;
        let co2 = dic * h2 / (h2 + self.k_h2co3 * h * a4 + self.k_h2co3 * self.k_hco3);
        UATM_PER_ATM * co2 / self.k_henry
    }

    /// Solve pH from `dic` and `alkalinity` (both molar), then pCO2 at that pH.
    ///
    /// The pH is searched in `[ph_min, ph_max]`; when the true pH lies
    /// outside, the result sits on the bracket edge and a warning is logged.
    pub fn solve_ph_pco2(
        &self,
        dic: f64,
        alkalinity: f64,
        tolerance: f64,
        ph_min: f64,
        ph_max: f64,
    ) -> Equilibrium {
        let ph = brent_fmin(
            ph_min,
            ph_max,
            |ph| (alkalinity - self.total_alkalinity_from_dic_ph(dic, ph)).abs(),
            tolerance,
        );
        let margin = accuracy(ph, tolerance);
        if ph - ph_min <= margin || ph_max - ph <= margin {
            warn!(
                "pH solve for DIC={dic:e} alkalinity={alkalinity:e} ended at bracket edge \
                 (pH={ph:.5}, bracket=[{ph_min}, {ph_max}])"
            );
        }
        Equilibrium {
            ph,
            pco2: self.pco2_from_dic_ph(dic, ph),
        }
    }

    /// Equilibrium for micromolar `dic_um` and `alkalinity_um`, using the
    /// pH bracket and tolerance from `settings`.
    pub fn equilibrium_um(
        &self,
        dic_um: f64,
        alkalinity_um: f64,
        settings: &SolverSettings,
    ) -> Equilibrium {
        self.solve_ph_pco2(
            dic_um * MOL_PER_UMOL,
            alkalinity_um * MOL_PER_UMOL,
            settings.ph_tolerance,
            settings.ph_min,
            settings.ph_max,
        )
    }

    /// Dissolved CO2 [umol/L] of water holding `dic_um` at `alkalinity_um`.
    pub fn aqueous_co2_um(&self, dic_um: f64, alkalinity_um: f64, settings: &SolverSettings) -> f64 {
        self.k_henry * self.equilibrium_um(dic_um, alkalinity_um, settings).pco2
    }
}
