//! Parcel model orchestration.
//!
//! - one-step: a single trapezoidal step over each parcel's travel time
//! - multi-step: the parcel's travel is split into substeps with linearly
//!   interpolated temperature and light, then marched with a time-series scheme

use log::debug;

use super::fluxes::{
    ParcelCarbonFluxes, ParcelCarbonSeries, ParcelOutput, ParcelOxygenFluxes, ParcelOxygenSeries,
};
use crate::carbonate::CarbonateSystem;
use crate::error::{MetabError, MetabResult};
use crate::forcing::{CarbonForcing, Forcing, GroundwaterInflow, ParcelCarbonForcing, ParcelForcing};
use crate::gas_exchange::{Calculators, ParDist};
use crate::metab::drivers::{trapezoid_par_total, StepDrivers};
use crate::metab::fluxes::{CarbonSeries, OxygenSeries};
use crate::metab::params::{DicParameters, Parameters};
use crate::metab::processes;
use crate::metab::schemes::{CarbonInputs, CrankNicolson, ForwardEuler, OxygenInputs, Scheme};
use crate::settings::SolverSettings;
use crate::traits::Integrator;

/// How each parcel's travel is integrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParcelMode {
    /// One semi-implicit step from upstream to downstream.
    OneStep,
    /// `substeps` equal steps of a time-series scheme.
    MultiStep { substeps: usize, scheme: Scheme },
}

#[derive(Debug, Clone)]
struct ParcelCarbonSetup {
    ratios: DicParameters,
    forcing: ParcelCarbonForcing,
}

/// Metabolism along tracked water parcels.
#[derive(Debug, Clone)]
pub struct ParcelModel {
    params: Parameters,
    forcing: ParcelForcing,
    mode: ParcelMode,
    par_total: Option<f64>,
    calculators: Calculators,
    settings: SolverSettings,
    carbon: Option<ParcelCarbonSetup>,
    groundwater: Option<GroundwaterInflow>,
}

/// Light total over parcels: the mean of the upstream and downstream
/// trapezoidal integrals across consecutive parcels.
pub fn parcel_par_total(forcing: &ParcelForcing) -> f64 {
    0.5 * (trapezoid_par_total(&forcing.up_time, &forcing.up_par)
        + trapezoid_par_total(&forcing.down_time, &forcing.down_par))
}

fn lerp(a: f64, b: f64, frac: f64) -> f64 {
    a + (b - a) * frac
}

impl ParcelModel {
    pub fn new(params: Parameters, forcing: ParcelForcing, mode: ParcelMode) -> MetabResult<Self> {
        if let ParcelMode::MultiStep { substeps: 0, .. } = mode {
            return Err(MetabError::invalid("multi-step parcels need at least one substep"));
        }
        Ok(Self {
            params,
            forcing,
            mode,
            par_total: None,
            calculators: Calculators::default(),
            settings: SolverSettings::default(),
            carbon: None,
            groundwater: None,
        })
    }

    pub fn with_carbon(mut self, ratios: DicParameters, forcing: ParcelCarbonForcing) -> MetabResult<Self> {
        if forcing.len() != self.forcing.len() {
            return Err(MetabError::length_mismatch(
                "parcel carbon forcing",
                forcing.len(),
                "parcels",
                self.forcing.len(),
            ));
        }
        self.carbon = Some(ParcelCarbonSetup { ratios, forcing });
        Ok(self)
    }

    pub fn with_groundwater(mut self, groundwater: GroundwaterInflow) -> MetabResult<Self> {
        if groundwater.len() != self.forcing.len() {
            return Err(MetabError::length_mismatch(
                "groundwater",
                groundwater.len(),
                "parcels",
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

    pub fn with_par_total(mut self, par_total: f64) -> Self {
        self.par_total = Some(par_total);
        self
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn mode(&self) -> ParcelMode {
        self.mode
    }

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

    /// Light total used for GPP allocation.
    ///
    /// A supplied positive total wins; otherwise it is integrated across
    /// parcels, which needs at least two of them.
    pub fn resolve_par_total(&self) -> MetabResult<f64> {
        if let Some(total) = self.par_total.filter(|t| *t > 0.0) {
            return Ok(total);
        }
        if self.forcing.len() < 2 {
            return Err(MetabError::invalid(
                "total PAR cannot be integrated from a single parcel; supply it explicitly",
            ));
        }
        let total = parcel_par_total(&self.forcing);
        if !(total.is_finite() && total > 0.0) {
            return Err(MetabError::invalid(format!(
                "total PAR must be positive to distribute GPP, got {total}"
            )));
        }
        Ok(total)
    }

    /// Integrate every parcel.
    pub fn run(&self) -> MetabResult<ParcelOutput> {
        let par_total = self.resolve_par_total()?;
        debug!(
            "parcel run: {} parcels, mode {:?}, total PAR {par_total:.4}",
            self.forcing.len(),
            self.mode
        );
        match self.mode {
            ParcelMode::OneStep => self.run_one_step(par_total),
            ParcelMode::MultiStep { substeps, scheme } => match scheme {
                Scheme::ForwardEuler => self.run_multi_step::<ForwardEuler>(par_total, substeps),
                Scheme::CrankNicolson => self.run_multi_step::<CrankNicolson>(par_total, substeps),
            },
        }
    }

    // -- One-step --

    fn run_one_step(&self, par_total: f64) -> MetabResult<ParcelOutput> {
        let f = &self.forcing;
        let p = &self.params;
        let n = f.len();
        let dist = ParDist::new(par_total);
        let mut oxygen = ParcelOxygenSeries::with_capacity(n);

        for i in 0..n {
            let travel = f.travel_time(i);
            let par_fraction = dist.fraction(travel, 0.5 * (f.up_par[i] + f.down_par[i]));
            let bio = processes::biology(
                p.daily_gpp,
                p.daily_er,
                p.ratio_do_c_fix,
                p.ratio_do_c_resp,
                par_fraction,
                travel,
            );

            let rel_p = f.relative_pressure(i);
            let up_sat = self.calculators.saturation(f.up_temp[i], rel_p);
            let down_sat = self.calculators.saturation(f.down_temp[i], rel_p);
            let avg_k = 0.5
                * ((self.calculators.k_do)(f.up_temp[i], p.k600)
                    + (self.calculators.k_do)(f.down_temp[i], p.k600));
            let equil =
                processes::trapezoid_equilibration(travel, avg_k, up_sat, f.up_do[i], down_sat);
            let (gw_known, gw_implicit) = self.groundwater.as_ref().map_or((0.0, 0.0), |g| {
                processes::trapezoid_groundwater(travel, g.alpha[i], g.dox[i], f.up_do[i])
            });

            let numerator = f.up_do[i] + bio.do_production + bio.do_consumption + equil + gw_known;
            let denominator = 1.0 + 0.5 * travel * avg_k + gw_implicit;
            let dox =
                processes::implicit_update(i, numerator, denominator, self.settings.min_denominator)?;

            oxygen.push(&ParcelOxygenFluxes {
                travel_time: travel,
                par_fraction,
                up_sat_do: up_sat,
                down_sat_do: down_sat,
                avg_k_do: avg_k,
                c_fixation: bio.c_fixation,
                c_respiration: bio.c_respiration,
                dox,
                do_production: bio.do_production,
                do_consumption: bio.do_consumption,
                do_equilibration: equil,
                do_groundwater: gw_known - gw_implicit * dox,
            });
        }

        let carbon = self
            .carbon
            .as_ref()
            .map(|setup| self.one_step_carbon(setup, &oxygen));
        Ok(ParcelOutput { oxygen, carbon })
    }

    fn one_step_carbon(&self, setup: &ParcelCarbonSetup, oxygen: &ParcelOxygenSeries) -> ParcelCarbonSeries {
        let f = &self.forcing;
        let c = &setup.forcing;
        let k600 = self.params.k600;
        let settings = &self.settings;
        let n = f.len();
        let mut system = CarbonateSystem::new(f.up_temp[0], c.up_conductivity[0]);
        let mut series = ParcelCarbonSeries::with_capacity(n);

        for i in 0..n {
            let travel = f.travel_time(i);

            system.reset(f.up_temp[i], c.up_conductivity[i]);
            let up = system.equilibrium_um(c.up_dic[i], c.up_alkalinity[i], settings);
            let up_k_henry = system.k_henry();
            let deficit = up_k_henry * (c.pco2_air[i] - up.pco2);

            system.reset(f.down_temp[i], c.down_conductivity[i]);
            let down_k_henry = system.k_henry();
            let down_sat = down_k_henry * c.pco2_air[i];

            let avg_k = 0.5
                * ((self.calculators.k_co2)(f.up_temp[i], k600)
                    + (self.calculators.k_co2)(f.down_temp[i], k600));
            let equil = processes::trapezoid_co2_equilibration(travel, avg_k, deficit, down_sat);
            let (production, consumption) = processes::dic_biology(
                oxygen.c_fixation[i],
                oxygen.c_respiration[i],
                setup.ratios.ratio_dic_c_fix,
                setup.ratios.ratio_dic_c_resp,
            );
            let (gw_known, gw_implicit) = self
                .groundwater
                .as_ref()
                .and_then(|g| g.dic_at(i).map(|gw_dic| (g.alpha[i], gw_dic)))
                .map_or((0.0, 0.0), |(alpha, gw_dic)| {
                    processes::trapezoid_groundwater(travel, alpha, gw_dic, c.up_dic[i])
                });

            let target = c.up_dic[i] + production + consumption + equil + gw_known;
            let dic = processes::solve_implicit_dic(
                &system,
                i,
                target,
                c.down_alkalinity[i],
                0.5 * avg_k * travel,
                gw_implicit,
                settings,
            );
            let down = system.equilibrium_um(dic, c.down_alkalinity[i], settings);

            series.push(&ParcelCarbonFluxes {
                up_ph: up.ph,
                up_pco2: up.pco2,
                up_k_henry,
                down_k_henry,
                avg_k_co2: avg_k,
                dic,
                ph: down.ph,
                pco2: down.pco2,
                dic_production: production,
                dic_consumption: consumption,
                co2_equilibration: equil,
                dic_groundwater: gw_known - gw_implicit * dic,
            });
        }
        series
    }

    // -- Multi-step --

    /// Substep forcing for parcel `i`, interpolated between its two ends.
    fn parcel_forcing(&self, i: usize, substeps: usize) -> MetabResult<Forcing> {
        let f = &self.forcing;
        let fracs: Vec<f64> = (0..=substeps).map(|s| s as f64 / substeps as f64).collect();
        let interp = |a: f64, b: f64| fracs.iter().map(|&t| lerp(a, b, t)).collect::<Vec<_>>();
        Forcing::new(
            interp(f.up_time[i], f.down_time[i]),
            interp(f.up_temp[i], f.down_temp[i]),
            interp(f.up_par[i], f.down_par[i]),
            vec![f.air_pressure[i]; substeps + 1],
            f.std_air_pressure,
        )
    }

    fn parcel_groundwater(&self, i: usize, len: usize) -> MetabResult<Option<GroundwaterInflow>> {
        self.groundwater
            .as_ref()
            .map(|g| {
                let gw = GroundwaterInflow::new(vec![g.alpha[i]; len], vec![g.dox[i]; len])?;
                match g.dic_at(i) {
                    Some(dic) => gw.with_dic(vec![dic; len]),
                    None => Ok(gw),
                }
            })
            .transpose()
    }

    fn run_multi_step<I: Integrator>(&self, par_total: f64, substeps: usize) -> MetabResult<ParcelOutput> {
        let f = &self.forcing;
        let n = f.len();
        let mut oxygen = ParcelOxygenSeries::with_capacity(n);
        let mut carbon = self
            .carbon
            .as_ref()
            .map(|_| ParcelCarbonSeries::with_capacity(n));

        for i in 0..n {
            let sub = self.parcel_forcing(i, substeps)?;
            let drivers =
                StepDrivers::new(&sub, self.params.k600, &self.calculators, Some(par_total))?;
            let groundwater = self.parcel_groundwater(i, sub.len())?;

            let ox = I::integrate_oxygen(&OxygenInputs {
                params: &self.params,
                drivers: &drivers,
                initial_do: f.up_do[i],
                groundwater: groundwater.as_ref(),
                settings: &self.settings,
            })?;
            oxygen.push(&summarize_oxygen(&ox, &drivers));

            if let (Some(setup), Some(series)) = (self.carbon.as_ref(), carbon.as_mut()) {
                let c = &setup.forcing;
                let fracs = (0..=substeps).map(|s| s as f64 / substeps as f64);
                let sub_carbon = CarbonForcing::new(
                    vec![c.pco2_air[i]; substeps + 1],
                    fracs
                        .clone()
                        .map(|t| lerp(c.up_alkalinity[i], c.down_alkalinity[i], t))
                        .collect(),
                )?
                .with_conductivity(
                    fracs
                        .map(|t| lerp(c.up_conductivity[i], c.down_conductivity[i], t))
                        .collect(),
                )?;
                let dic = I::integrate_carbon(
                    &CarbonInputs {
                        ratios: &setup.ratios,
                        drivers: &drivers,
                        carbon: &sub_carbon,
                        initial_dic: c.up_dic[i],
                        groundwater: groundwater.as_ref(),
                        settings: &self.settings,
                    },
                    &ox,
                )?;
                series.push(&summarize_carbon(&dic, &drivers));
            }
        }

        Ok(ParcelOutput { oxygen, carbon })
    }
}

/// Collapse a substep oxygen series into one parcel row.
fn summarize_oxygen(series: &OxygenSeries, drivers: &StepDrivers) -> ParcelOxygenFluxes {
    let last = series.len() - 1;
    let sum = |col: &[f64]| col.iter().sum::<f64>();
    ParcelOxygenFluxes {
        travel_time: sum(&series.dt),
        par_fraction: sum(&series.par_fraction),
        up_sat_do: series.sat_do[0],
        down_sat_do: series.sat_do[last],
        avg_k_do: 0.5 * (drivers.k_do[0] + drivers.k_do[last]),
        c_fixation: sum(&series.c_fixation),
        c_respiration: sum(&series.c_respiration),
        dox: series.dox[last],
        do_production: sum(&series.do_production),
        do_consumption: sum(&series.do_consumption),
        do_equilibration: sum(&series.do_equilibration),
        do_groundwater: sum(&series.do_groundwater),
    }
}

fn summarize_carbon(series: &CarbonSeries, drivers: &StepDrivers) -> ParcelCarbonFluxes {
    let last = series.len() - 1;
    let sum = |col: &[f64]| col.iter().sum::<f64>();
    ParcelCarbonFluxes {
        up_ph: series.ph[0],
        up_pco2: series.pco2[0],
        up_k_henry: series.k_henry[0],
        down_k_henry: series.k_henry[last],
        avg_k_co2: 0.5 * (drivers.k_co2[0] + drivers.k_co2[last]),
        dic: series.dic[last],
        ph: series.ph[last],
        pco2: series.pco2[last],
        dic_production: sum(&series.dic_production),
        dic_consumption: sum(&series.dic_consumption),
        co2_equilibration: sum(&series.co2_equilibration),
        dic_groundwater: sum(&series.dic_groundwater),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parcels() -> ParcelForcing {
        ParcelForcing::new(
            vec![0.0, 0.5],
            vec![0.2, 0.7],
            vec![18.0, 19.0],
            vec![19.0, 20.0],
            vec![100.0, 300.0],
            vec![200.0, 400.0],
            vec![270.0, 290.0],
            vec![1.0, 1.0],
            1.0,
        )
        .unwrap()
    }

    fn params() -> Parameters {
        Parameters::new(10.0, 1.0, -8.0, 1.0, 2.0).unwrap()
    }

    fn carbon() -> ParcelCarbonForcing {
        ParcelCarbonForcing::new(
            vec![2100.0, 2050.0],
            vec![410.0, 410.0],
            vec![2000.0, 2000.0],
            vec![2010.0, 1990.0],
        )
        .unwrap()
    }

    #[test]
    fn par_total_from_parcels() {
        // upstream trapezoid 100, downstream 150
        assert_relative_eq!(parcel_par_total(&parcels()), 125.0, max_relative = 1e-12);
        let model = ParcelModel::new(params(), parcels(), ParcelMode::OneStep).unwrap();
        assert_relative_eq!(model.resolve_par_total().unwrap(), 125.0, max_relative = 1e-12);
        let model = model.with_par_total(400.0);
        assert_eq!(model.resolve_par_total().unwrap(), 400.0);
    }

    #[test]
    fn single_parcel_needs_par_total() {
        let single = ParcelForcing::new(
            vec![0.0],
            vec![0.2],
            vec![18.0],
            vec![19.0],
            vec![100.0],
            vec![200.0],
            vec![270.0],
            vec![1.0],
            1.0,
        )
        .unwrap();
        let model = ParcelModel::new(params(), single, ParcelMode::OneStep).unwrap();
        assert!(model.run().is_err());
        let out = model.with_par_total(100.0).run().unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn one_step_oxygen_formula() {
        let f = parcels();
        let model = ParcelModel::new(params(), f.clone(), ParcelMode::OneStep).unwrap();
        let out = model.run().unwrap();
        let calc = Calculators::default();

        let travel = 0.2;
        let frac = 150.0 * travel / 125.0;
        let up_sat = calc.saturation(18.0, 1.0);
        let down_sat = calc.saturation(19.0, 1.0);
        let avg_k = 0.5 * ((calc.k_do)(18.0, 2.0) + (calc.k_do)(19.0, 2.0));
        let expected = (270.0 + 10.0 * frac - 8.0 * travel
            + travel * avg_k * 0.5 * (up_sat - 270.0 + down_sat))
            / (1.0 + 0.5 * travel * avg_k);

        assert_relative_eq!(out.oxygen.travel_time[0], travel, max_relative = 1e-12);
        assert_relative_eq!(out.oxygen.par_fraction[0], frac, max_relative = 1e-12);
        assert_relative_eq!(out.oxygen.dox[0], expected, max_relative = 1e-12);
        assert!(out.carbon.is_none());
    }

    #[test]
    fn parcels_are_independent() {
        let both = ParcelModel::new(params(), parcels(), ParcelMode::OneStep)
            .unwrap()
            .run()
            .unwrap();
        let mut f = parcels();
        f.up_do[0] = 200.0;
        let changed = ParcelModel::new(params(), f, ParcelMode::OneStep)
            .unwrap()
            .run()
            .unwrap();
        assert_ne!(both.oxygen.dox[0], changed.oxygen.dox[0]);
        assert_eq!(both.oxygen.dox[1], changed.oxygen.dox[1]);
    }

    #[test]
    fn one_step_dic_satisfies_balance() {
        let model = ParcelModel::new(params(), parcels(), ParcelMode::OneStep)
            .unwrap()
            .with_carbon(DicParameters::new(-1.0, -1.0).unwrap(), carbon())
            .unwrap();
        let out = model.run().unwrap();
        let dic = out.carbon.as_ref().unwrap();
        let c = carbon();
        let settings = SolverSettings::default();

        for i in 0..2 {
            let row = dic.row(i).unwrap();
            let target = c.up_dic[i] + row.dic_production + row.dic_consumption + row.co2_equilibration;
            let system = CarbonateSystem::new(parcels().down_temp[i], 0.0);
            let travel = out.oxygen.travel_time[i];
            let implicit = 0.5 * row.avg_k_co2 * travel
                * system.aqueous_co2_um(row.dic, c.down_alkalinity[i], &settings);
            let residual = row.dic + implicit - target;
            assert!(residual.abs() < 1e-3, "parcel {i}: residual {residual}");
            assert_relative_eq!(row.down_k_henry, system.k_henry());
            assert!(row.ph > 6.0 && row.ph < 9.5);
        }
        assert!(out.column("up_ph").is_some());
    }

    #[test]
    fn single_substep_crank_nicolson_matches_one_step() {
        let ratios = DicParameters::new(-1.0, -1.0).unwrap();
        let one = ParcelModel::new(params(), parcels(), ParcelMode::OneStep)
            .unwrap()
            .with_carbon(ratios, carbon())
            .unwrap()
            .run()
            .unwrap();
        let multi = ParcelModel::new(
            params(),
            parcels(),
            ParcelMode::MultiStep {
                substeps: 1,
                scheme: Scheme::CrankNicolson,
            },
        )
        .unwrap()
        .with_carbon(ratios, carbon())
        .unwrap()
        .run()
        .unwrap();

        for i in 0..2 {
            assert_relative_eq!(one.oxygen.dox[i], multi.oxygen.dox[i], max_relative = 1e-12);
            assert_relative_eq!(
                one.oxygen.do_equilibration[i],
                multi.oxygen.do_equilibration[i],
                max_relative = 1e-12
            );
            let (a, b) = (
                one.carbon.as_ref().unwrap().dic[i],
                multi.carbon.as_ref().unwrap().dic[i],
            );
            assert!((a - b).abs() < 1e-3, "parcel {i}: {a} vs {b}");
        }
    }

    #[test]
    fn substeps_converge() {
        let run = |substeps| {
            ParcelModel::new(
                params(),
                parcels(),
                ParcelMode::MultiStep {
                    substeps,
                    scheme: Scheme::ForwardEuler,
                },
            )
            .unwrap()
            .run()
            .unwrap()
            .oxygen
            .dox[0]
        };
        let coarse = run(4);
        let fine = run(64);
        let finer = run(256);
        assert!((finer - fine).abs() < (fine - coarse).abs());
    }

    #[test]
    fn multi_step_totals_cover_travel() {
        let model = ParcelModel::new(
            params(),
            parcels(),
            ParcelMode::MultiStep {
                substeps: 8,
                scheme: Scheme::CrankNicolson,
            },
        )
        .unwrap();
        let out = model.run().unwrap();
        assert_relative_eq!(out.oxygen.travel_time[1], 0.2, max_relative = 1e-12);
        assert_relative_eq!(out.oxygen.c_respiration[1], -8.0 * 0.2, max_relative = 1e-12);
        // linear light along the parcel: step averages integrate it exactly
        assert_relative_eq!(out.oxygen.par_fraction[1], 350.0 * 0.2 / 125.0, max_relative = 1e-12);
    }

    #[test]
    fn groundwater_applies_per_parcel() {
        let gw = GroundwaterInflow::new(vec![0.0, 5.0], vec![100.0, 100.0]).unwrap();
        let plain = ParcelModel::new(params(), parcels(), ParcelMode::OneStep)
            .unwrap()
            .run()
            .unwrap();
        let with_gw = ParcelModel::new(params(), parcels(), ParcelMode::OneStep)
            .unwrap()
            .with_groundwater(gw)
            .unwrap()
            .run()
            .unwrap();
        assert_relative_eq!(plain.oxygen.dox[0], with_gw.oxygen.dox[0], max_relative = 1e-14);
        assert!(with_gw.oxygen.dox[1] < plain.oxygen.dox[1]);
        assert!(with_gw.oxygen.do_groundwater[1] < 0.0);
    }

    #[test]
    fn rejects_zero_substeps() {
        let mode = ParcelMode::MultiStep {
            substeps: 0,
            scheme: Scheme::ForwardEuler,
        };
        assert!(ParcelModel::new(params(), parcels(), mode).is_err());
    }

    #[test]
    fn carbon_length_must_match() {
        let short = ParcelCarbonForcing::new(vec![2100.0], vec![410.0], vec![2000.0], vec![2000.0])
            .unwrap();
        let model = ParcelModel::new(params(), parcels(), ParcelMode::OneStep).unwrap();
        assert!(model
            .with_carbon(DicParameters::new(-1.0, -1.0).unwrap(), short)
            .is_err());
    }

    #[test]
    fn setters_return_previous_value() {
        let mut model = ParcelModel::new(params(), parcels(), ParcelMode::OneStep).unwrap();
        assert_eq!(model.set_ratio_do_c_fix(1.2), 1.0);
        assert_eq!(model.set_ratio_do_c_resp(0.9), 1.0);
        assert_eq!(model.params().ratio_do_c_fix, 1.2);
        assert_eq!(model.set_ratio_dic_c_fix(-0.8), None);
        assert_eq!(model.set_ratio_dic_c_resp(-0.8), None);

        let mut model = model
            .with_carbon(DicParameters::new(-1.0, -1.0).unwrap(), carbon())
            .unwrap();
        assert_eq!(model.set_ratio_dic_c_fix(-0.8), Some(-1.0));
        assert_eq!(model.set_ratio_dic_c_resp(-0.5), Some(-1.0));

        let out = model.run().unwrap();
        let oxygen = &out.oxygen;
        let carbon = out.carbon.as_ref().unwrap();
        assert_relative_eq!(oxygen.do_production[0], 1.2 * oxygen.c_fixation[0]);
        assert_relative_eq!(oxygen.do_consumption[0], 0.9 * oxygen.c_respiration[0]);
        assert_relative_eq!(carbon.dic_production[0], -0.5 * oxygen.c_respiration[0]);
        assert_relative_eq!(carbon.dic_consumption[0], -0.8 * oxygen.c_fixation[0]);
    }

    #[test]
    fn one_step_groundwater_dic() {
        let params = Parameters::new(0.0, 1.0, 0.0, 1.0, 0.0).unwrap();
        let gw = GroundwaterInflow::new(vec![0.4; 2], vec![280.0; 2])
            .unwrap()
            .with_dic(vec![4000.0; 2])
            .unwrap();
        let out = ParcelModel::new(params, parcels(), ParcelMode::OneStep)
            .unwrap()
            .with_carbon(DicParameters::new(-1.0, -1.0).unwrap(), carbon())
            .unwrap()
            .with_groundwater(gw)
            .unwrap()
            .run()
            .unwrap();
        let dic = out.carbon.as_ref().unwrap();
        // travel 0.2: (up + 0.08 * (4000 - up/2)) / 1.04
        for (i, expected) in [(0, 2336.0 / 1.04), (1, 2200.0)] {
            assert!((dic.dic[i] - expected).abs() < 1e-3, "parcel {i}: {}", dic.dic[i]);
            let up = carbon().up_dic[i];
            assert!((dic.dic_groundwater[i] - (dic.dic[i] - up)).abs() < 1e-3);
        }
        assert_eq!(dic.co2_equilibration[0], 0.0);
    }
}
