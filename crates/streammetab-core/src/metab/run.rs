//! Metabolism model orchestration.
//!
//! - `Metabolism::new()` plus `with_*` builders: assemble and validate a model
//! - `Metabolism::run()`: derive step drivers and integrate DO, then DIC

use log::debug;

use super::drivers::StepDrivers;
use super::fluxes::MetabolismOutput;
use super::params::{DicParameters, Parameters};
use super::schemes::{CarbonInputs, CrankNicolson, ForwardEuler, OxygenInputs, Scheme};
use crate::error::{MetabError, MetabResult};
use crate::forcing::{CarbonForcing, Forcing, GroundwaterInflow};
use crate::gas_exchange::Calculators;
use crate::settings::SolverSettings;
use crate::traits::Integrator;

/// What a carbon-aware run needs on top of the oxygen model.
#[derive(Debug, Clone)]
pub struct CarbonSetup {
    pub ratios: DicParameters,
    pub forcing: CarbonForcing,
    /// DIC at the first index [umol/L]
    pub initial_dic: f64,
}

/// A stream metabolism model over one sensor time series.
#[derive(Debug, Clone)]
pub struct Metabolism {
    params: Parameters,
    forcing: Forcing,
    initial_do: f64,
    scheme: Scheme,
    par_total: Option<f64>,
    calculators: Calculators,
    settings: SolverSettings,
    carbon: Option<CarbonSetup>,
    groundwater: Option<GroundwaterInflow>,
}

impl Metabolism {
    pub fn new(
        params: Parameters,
        forcing: Forcing,
        initial_do: f64,
        scheme: Scheme,
    ) -> MetabResult<Self> {
        if !initial_do.is_finite() {
            return Err(MetabError::invalid(format!(
                "initial DO must be finite, got {initial_do}"
            )));
        }
        Ok(Self {
            params,
            forcing,
            initial_do,
            scheme,
            par_total: None,
            calculators: Calculators::default(),
            settings: SolverSettings::default(),
            carbon: None,
            groundwater: None,
        })
    }

    /// Model DIC alongside DO.
    pub fn with_carbon(
        mut self,
        ratios: DicParameters,
        forcing: CarbonForcing,
        initial_dic: f64,
    ) -> MetabResult<Self> {
        if forcing.len() != self.forcing.len() {
            return Err(MetabError::length_mismatch(
                "carbon forcing",
                forcing.len(),
                "time",
                self.forcing.len(),
            ));
        }
        if !(initial_dic.is_finite() && initial_dic >= 0.0) {
            return Err(MetabError::invalid(format!(
                "initial DIC must be a non-negative number, got {initial_dic}"
            )));
        }
        self.carbon = Some(CarbonSetup {
            ratios,
            forcing,
            initial_dic,
        });
        Ok(self)
    }

    /// Exchange channel water with groundwater at every step.
    pub fn with_groundwater(mut self, groundwater: GroundwaterInflow) -> MetabResult<Self> {
        if groundwater.len() != self.forcing.len() {
            return Err(MetabError::length_mismatch(
                "groundwater",
                groundwater.len(),
                "time",
                self.forcing.len(),
            ));
        }
        self.groundwater = Some(groundwater);
        Ok(self)
    }

    pub fn with_settings(mut self, settings: SolverSettings) -> MetabResult<Self> {
        settings.validate()?;
        self.settings = settings;
        Ok(self)
    }

    pub fn with_calculators(mut self, calculators: Calculators) -> Self {
        self.calculators = calculators;
        self
    }

    /// Light total for GPP allocation; non-positive means "integrate the series".
    pub fn with_par_total(mut self, par_total: f64) -> Self {
        self.par_total = Some(par_total);
        self
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn forcing(&self) -> &Forcing {
        &self.forcing
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    pub fn carbon(&self) -> Option<&CarbonSetup> {
        self.carbon.as_ref()
    }

    // -- Coefficient setters, each returning the previous value --

    pub fn set_daily_gpp(&mut self, value: f64) -> f64 {
        std::mem::replace(&mut self.params.daily_gpp, value)
    }

    pub fn set_daily_er(&mut self, value: f64) -> f64 {
        std::mem::replace(&mut self.params.daily_er, value)
    }

    pub fn set_k600(&mut self, value: f64) -> f64 {
        std::mem::replace(&mut self.params.k600, value)
    }

    pub fn set_ratio_do_c_fix(&mut self, value: f64) -> f64 {
        std::mem::replace(&mut self.params.ratio_do_c_fix, value)
    }

    pub fn set_ratio_do_c_resp(&mut self, value: f64) -> f64 {
        std::mem::replace(&mut self.params.ratio_do_c_resp, value)
    }

    /// Returns `None` when the model has no carbon setup.
    pub fn set_ratio_dic_c_fix(&mut self, value: f64) -> Option<f64> {
        self.carbon
            .as_mut()
            .map(|c| std::mem::replace(&mut c.ratios.ratio_dic_c_fix, value))
    }

    pub fn set_ratio_dic_c_resp(&mut self, value: f64) -> Option<f64> {
        self.carbon
            .as_mut()
            .map(|c| std::mem::replace(&mut c.ratios.ratio_dic_c_resp, value))
    }

    /// Step drivers for the current parameters.
    pub fn drivers(&self) -> MetabResult<StepDrivers> {
        StepDrivers::new(
            &self.forcing,
            self.params.k600,
            &self.calculators,
            self.par_total,
        )
    }

    /// Integrate the model over the whole series.
    pub fn run(&self) -> MetabResult<MetabolismOutput> {
        match self.scheme {
            Scheme::ForwardEuler => self.run_with::<ForwardEuler>(),
            Scheme::CrankNicolson => self.run_with::<CrankNicolson>(),
        }
    }

    fn run_with<I: Integrator>(&self) -> MetabResult<MetabolismOutput> {
        let drivers = self.drivers()?;
        debug!(
            "{} run: {} steps, total PAR {:.4}, carbon {}",
            I::SCHEME,
            drivers.len(),
            drivers.par_total,
            self.carbon.is_some()
        );

        let oxygen = I::integrate_oxygen(&OxygenInputs {
            params: &self.params,
            drivers: &drivers,
            initial_do: self.initial_do,
            groundwater: self.groundwater.as_ref(),
            settings: &self.settings,
        })?;

        let carbon = self
            .carbon
            .as_ref()
            .map(|setup| {
                I::integrate_carbon(
                    &CarbonInputs {
                        ratios: &setup.ratios,
                        drivers: &drivers,
                        carbon: &setup.forcing,
                        initial_dic: setup.initial_dic,
                        groundwater: self.groundwater.as_ref(),
                        settings: &self.settings,
                    },
                    &oxygen,
                )
            })
            .transpose()?;

        Ok(MetabolismOutput { oxygen, carbon })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn forcing() -> Forcing {
        Forcing::new(
            vec![0.0, 0.5, 1.0],
            vec![20.0; 3],
            vec![0.0, 500.0, 0.0],
            vec![760.0; 3],
            760.0,
        )
        .unwrap()
    }

    fn params() -> Parameters {
        Parameters::new(10.0, 1.0, -8.0, 1.0, 2.0).unwrap()
    }

    #[test]
    fn oxygen_only_run() {
        let model = Metabolism::new(params(), forcing(), 300.0, Scheme::CrankNicolson).unwrap();
        let out = model.run().unwrap();
        assert!(out.carbon.is_none());
        assert_eq!(out.len(), 3);
        assert_relative_eq!(out.oxygen.dox[1], 289.6419433333472, max_relative = 1e-10);
    }

    #[test]
    fn rejects_non_finite_initial_do() {
        assert!(Metabolism::new(params(), forcing(), f64::NAN, Scheme::ForwardEuler).is_err());
    }

    #[test]
    fn carbon_length_must_match() {
        let model = Metabolism::new(params(), forcing(), 300.0, Scheme::ForwardEuler).unwrap();
        let carbon = CarbonForcing::new(vec![400.0; 2], vec![2000.0; 2]).unwrap();
        let ratios = DicParameters::new(-1.0, -1.0).unwrap();
        let err = model.with_carbon(ratios, carbon, 2000.0).unwrap_err();
        assert!(err.to_string().contains("carbon forcing length 2"));
    }

    #[test]
    fn groundwater_length_must_match() {
        let model = Metabolism::new(params(), forcing(), 300.0, Scheme::ForwardEuler).unwrap();
        let gw = GroundwaterInflow::new(vec![0.1; 4], vec![200.0; 4]).unwrap();
        assert!(model.with_groundwater(gw).is_err());
    }

    #[test]
    fn invalid_settings_rejected() {
        let model = Metabolism::new(params(), forcing(), 300.0, Scheme::ForwardEuler).unwrap();
        let settings = SolverSettings {
            dic_min: 10.0,
            dic_max: 1.0,
            ..Default::default()
        };
        assert!(model.with_settings(settings).is_err());
    }

    #[test]
    fn setters_return_previous_value() {
        let mut model = Metabolism::new(params(), forcing(), 300.0, Scheme::ForwardEuler).unwrap();
        assert_eq!(model.set_daily_gpp(12.0), 10.0);
        assert_eq!(model.set_daily_er(-5.0), -8.0);
        assert_eq!(model.set_k600(4.0), 2.0);
        assert_eq!(model.set_ratio_do_c_fix(1.2), 1.0);
        assert_eq!(model.set_ratio_do_c_resp(0.9), 1.0);
        assert_eq!(model.params().k600, 4.0);
        assert_eq!(model.set_ratio_dic_c_fix(-1.0), None);
    }

    #[test]
    fn k600_setter_changes_next_run() {
        let mut model = Metabolism::new(params(), forcing(), 300.0, Scheme::CrankNicolson).unwrap();
        let before = model.run().unwrap();
        model.set_k600(0.0);
        let after = model.run().unwrap();
        assert_eq!(after.oxygen.do_equilibration[0], 0.0);
        assert_ne!(before.oxygen.dox[2], after.oxygen.dox[2]);
        // no exchange: DO follows biology alone
        assert_relative_eq!(after.oxygen.dox[1], 301.0, max_relative = 1e-12);
    }

    #[test]
    fn par_total_override() {
        let model = Metabolism::new(params(), forcing(), 300.0, Scheme::CrankNicolson)
            .unwrap()
            .with_par_total(125.0);
        let out = model.run().unwrap();
        assert_relative_eq!(out.oxygen.dox[1], 292.9061484921689, max_relative = 1e-10);
    }

    #[test]
    fn high_k600_and_gpp_build_and_run() {
        let params = Parameters::new(1500.0, 1.0, -8.0, 1.0, 150.0).unwrap();
        let model = Metabolism::new(params, forcing(), 300.0, Scheme::CrankNicolson).unwrap();
        let out = model.run().unwrap();
        assert_relative_eq!(out.oxygen.dox[1], 287.3060727650091, max_relative = 1e-10);

        // same result through the setters
        let mut model = Metabolism::new(self::params(), forcing(), 300.0, Scheme::CrankNicolson).unwrap();
        model.set_k600(150.0);
        model.set_daily_gpp(1500.0);
        assert_eq!(model.run().unwrap(), out);
    }

    #[test]
    fn carbon_run_shares_biology() {
        let carbon = CarbonForcing::new(vec![410.0; 3], vec![2000.0; 3]).unwrap();
        let ratios = DicParameters::new(-1.0, -1.0).unwrap();
        let mut model = Metabolism::new(params(), forcing(), 300.0, Scheme::ForwardEuler)
            .unwrap()
            .with_carbon(ratios, carbon, 2100.0)
            .unwrap();
        assert_eq!(model.set_ratio_dic_c_resp(-0.8), Some(-1.0));

        let out = model.run().unwrap();
        let carbon = out.carbon.as_ref().unwrap();
        assert_eq!(carbon.len(), 3);
        assert_relative_eq!(carbon.dic_production[0], -0.8 * out.oxygen.c_respiration[0]);
        assert!(out.column("ph").is_some());
        assert!(out.column("dox").is_some());
    }

    #[test]
    fn runs_are_repeatable() {
        let carbon = CarbonForcing::new(vec![410.0; 3], vec![2000.0; 3]).unwrap();
        let ratios = DicParameters::new(-1.0, -1.0).unwrap();
        let model = Metabolism::new(params(), forcing(), 300.0, Scheme::CrankNicolson)
            .unwrap()
            .with_carbon(ratios, carbon, 2100.0)
            .unwrap();
        assert_eq!(model.run().unwrap(), model.run().unwrap());
    }

    fn groundwater_carbon_model(scheme: Scheme, gw_dic: Option<f64>) -> Metabolism {
        let params = Parameters::new(0.0, 1.0, 0.0, 1.0, 0.0).unwrap();
        let carbon = CarbonForcing::new(vec![410.0; 3], vec![2000.0; 3]).unwrap();
        let mut gw = GroundwaterInflow::new(vec![0.4; 3], vec![280.0; 3]).unwrap();
        if let Some(dic) = gw_dic {
            gw = gw.with_dic(vec![dic; 3]).unwrap();
        }
        Metabolism::new(params, forcing(), 300.0, scheme)
            .unwrap()
            .with_carbon(DicParameters::new(-1.0, -1.0).unwrap(), carbon, 2000.0)
            .unwrap()
            .with_groundwater(gw)
            .unwrap()
    }

    #[test]
    fn forward_euler_groundwater_dic() {
        let out = groundwater_carbon_model(Scheme::ForwardEuler, Some(4000.0))
            .run()
            .unwrap();
        let carbon = out.carbon.as_ref().unwrap();
        // no biology or exchange: DIC moves by dt * alpha * (gw - DIC)
        assert_relative_eq!(carbon.dic[1], 2400.0, max_relative = 1e-12);
        assert_relative_eq!(carbon.dic[2], 2720.0, max_relative = 1e-12);
        assert_relative_eq!(carbon.dic_groundwater[0], 400.0, max_relative = 1e-12);
        assert_relative_eq!(carbon.dic_groundwater[1], 320.0, max_relative = 1e-12);
        assert_eq!(carbon.dic_groundwater[2], 0.0);
        assert_eq!(carbon.co2_equilibration[0], 0.0);
    }

    #[test]
    fn crank_nicolson_groundwater_dic() {
        let out = groundwater_carbon_model(Scheme::CrankNicolson, Some(4000.0))
            .run()
            .unwrap();
        let carbon = out.carbon.as_ref().unwrap();
        // trapezoid: (DIC + dt*alpha*(gw - DIC/2)) / (1 + dt*alpha/2)
        let dic1 = (2000.0 + 0.2 * (4000.0 - 1000.0)) / 1.1;
        let dic2 = (dic1 + 0.2 * (4000.0 - 0.5 * dic1)) / 1.1;
        assert!((carbon.dic[1] - dic1).abs() < 1e-3, "DIC[1] = {}", carbon.dic[1]);
        assert!((carbon.dic[2] - dic2).abs() < 1e-3, "DIC[2] = {}", carbon.dic[2]);
        assert!((carbon.dic_groundwater[0] - (dic1 - 2000.0)).abs() < 1e-3);
    }

    #[test]
    fn groundwater_without_dic_leaves_carbon_alone() {
        let out = groundwater_carbon_model(Scheme::ForwardEuler, None)
            .run()
            .unwrap();
        let carbon = out.carbon.as_ref().unwrap();
        assert!(carbon.dic_groundwater.iter().all(|&g| g == 0.0));
        assert_eq!(carbon.dic, vec![2000.0; 3]);
        assert!(out.oxygen.do_groundwater[0] < 0.0);
    }

    #[test]
    fn scores_against_observed_do() {
        use crate::objective::{gaussian_nll, nse, rmse};

        let model = Metabolism::new(params(), forcing(), 300.0, Scheme::CrankNicolson).unwrap();
        let out = model.run().unwrap();
        let observed = out.oxygen.dox.clone();
        assert_eq!(out.score_do(&observed, rmse).unwrap(), 0.0);
        assert_relative_eq!(out.score_do(&observed, nse).unwrap(), 1.0);

        // a sensor gap and a 2 umol/L offset
        let shifted = [f64::NAN, observed[1] + 2.0, observed[2] + 2.0];
        assert_relative_eq!(out.score_do(&shifted, rmse).unwrap(), 2.0, max_relative = 1e-12);
        let nll = out
            .score_do(&shifted, |o, s| gaussian_nll(o, s, 1.0))
            .unwrap();
        assert_relative_eq!(nll, (2.0 * std::f64::consts::PI).ln() + 4.0, max_relative = 1e-12);
        assert!(out.score_do(&observed[..2], rmse).is_err());
    }
}
