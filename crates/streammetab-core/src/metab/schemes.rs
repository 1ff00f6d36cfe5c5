//! Forward-Euler and Crank-Nicolson integration of the DO and DIC balances.

use std::fmt;

use log::debug;

use super::drivers::StepDrivers;
use super::fluxes::{CarbonFluxes, CarbonSeries, OxygenFluxes, OxygenSeries};
use super::params::{DicParameters, Parameters};
use super::processes;
use crate::carbonate::CarbonateSystem;
use crate::error::MetabResult;
use crate::forcing::{CarbonForcing, GroundwaterInflow};
use crate::gas_exchange::ParDist;
use crate::settings::SolverSettings;
use crate::traits::Integrator;

/// Available time-integration schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scheme {
    /// Explicit: every flux evaluated at the start of the step.
    ForwardEuler,
    /// Semi-implicit: exchange averaged over both ends of the step.
    CrankNicolson,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::ForwardEuler => write!(f, "forward-euler"),
            Scheme::CrankNicolson => write!(f, "crank-nicolson"),
        }
    }
}

/// Everything an oxygen pass reads.
#[derive(Debug, Clone, Copy)]
pub struct OxygenInputs<'a> {
    pub params: &'a Parameters,
    pub drivers: &'a StepDrivers,
    pub initial_do: f64,
    pub groundwater: Option<&'a GroundwaterInflow>,
    pub settings: &'a SolverSettings,
}

/// Everything a carbon pass reads beyond the oxygen output.
#[derive(Debug, Clone, Copy)]
pub struct CarbonInputs<'a> {
    pub ratios: &'a DicParameters,
    pub drivers: &'a StepDrivers,
    pub carbon: &'a CarbonForcing,
    pub initial_dic: f64,
    pub groundwater: Option<&'a GroundwaterInflow>,
    pub settings: &'a SolverSettings,
}

impl CarbonInputs<'_> {
    /// Groundwater (alpha, DIC) at `i` when groundwater carries DIC.
    fn groundwater_dic(&self, i: usize) -> Option<(f64, f64)> {
        self.groundwater
            .and_then(|gw| gw.dic_at(i).map(|dic| (gw.alpha[i], dic)))
    }
}

/// Explicit stepping with instantaneous light.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardEuler;

/// Trapezoidal exchange with step-averaged light.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrankNicolson;

impl Integrator for ForwardEuler {
    const SCHEME: Scheme = Scheme::ForwardEuler;

    fn integrate_oxygen(inputs: &OxygenInputs) -> MetabResult<OxygenSeries> {
        let d = inputs.drivers;
        let p = inputs.params;
        let n = d.len();
        let dist = ParDist::new(d.par_total);
        let mut series = OxygenSeries::with_capacity(n);
        let mut dox = inputs.initial_do;

        for i in 0..n - 1 {
            let dt = d.dt[i];
            let par_fraction = dist.fraction(dt, d.par[i]);
            let bio = processes::biology(
                p.daily_gpp,
                p.daily_er,
                p.ratio_do_c_fix,
                p.ratio_do_c_resp,
                par_fraction,
                dt,
            );
            let equil = processes::explicit_equilibration(dt, d.k_do[i], d.sat_do[i], dox);
            let gw = inputs.groundwater.map_or(0.0, |g| {
                processes::explicit_groundwater(dt, g.alpha[i], g.dox[i], dox)
            });

            let row = OxygenFluxes {
                dt,
                par_fraction,
                sat_do: d.sat_do[i],
                k_do: d.k_do[i],
                c_fixation: bio.c_fixation,
                c_respiration: bio.c_respiration,
                dox,
                do_production: bio.do_production,
                do_consumption: bio.do_consumption,
                do_equilibration: equil,
                do_groundwater: gw,
            };
            series.push(&row);
            dox += row.net_change();
        }
        series.push(&OxygenFluxes::sentinel(dox, d.sat_do[n - 1], d.k_do[n - 1]));

        debug!("{} oxygen pass: {n} steps, final DO {dox:.4}", Self::SCHEME);
        Ok(series)
    }

    fn integrate_carbon(inputs: &CarbonInputs, oxygen: &OxygenSeries) -> MetabResult<CarbonSeries> {
        let d = inputs.drivers;
        let c = inputs.carbon;
        let r = inputs.ratios;
        let n = d.len();
        let mut system = CarbonateSystem::new(d.temp[0], c.conductivity[0]);
        let mut series = CarbonSeries::with_capacity(n);
        let mut dic = inputs.initial_dic;

        for i in 0..n {
            system.reset(d.temp[i], c.conductivity[i]);
            let eq = system.equilibrium_um(dic, c.alkalinity[i], inputs.settings);
            let k_henry = system.k_henry();

            if i == n - 1 {
                series.push(&CarbonFluxes::sentinel(dic, eq.ph, eq.pco2, k_henry, d.k_co2[i]));
                break;
            }

            let dt = d.dt[i];
            let (production, consumption) = processes::dic_biology(
                oxygen.c_fixation[i],
                oxygen.c_respiration[i],
                r.ratio_dic_c_fix,
                r.ratio_dic_c_resp,
            );
            let equil =
                processes::explicit_co2_equilibration(dt, d.k_co2[i], k_henry, c.pco2_air[i], eq.pco2);
            let gw = inputs.groundwater_dic(i).map_or(0.0, |(alpha, gw_dic)| {
                processes::explicit_groundwater(dt, alpha, gw_dic, dic)
            });

            let row = CarbonFluxes {
                dic,
                ph: eq.ph,
                pco2: eq.pco2,
                k_henry,
                k_co2: d.k_co2[i],
                dic_production: production,
                dic_consumption: consumption,
                co2_equilibration: equil,
                dic_groundwater: gw,
            };
            series.push(&row);
            dic += row.net_change();
        }

        debug!("{} carbon pass: {n} steps, final DIC {dic:.4}", Self::SCHEME);
        Ok(series)
    }
}

impl Integrator for CrankNicolson {
    const SCHEME: Scheme = Scheme::CrankNicolson;

    fn integrate_oxygen(inputs: &OxygenInputs) -> MetabResult<OxygenSeries> {
        let d = inputs.drivers;
        let p = inputs.params;
        let n = d.len();
        let dist = ParDist::new(d.par_total);
        let mut series = OxygenSeries::with_capacity(n);
        let mut dox = inputs.initial_do;

        for i in 0..n - 1 {
            let dt = d.dt[i];
            let par_fraction = dist.fraction(dt, d.par_avg[i]);
            let bio = processes::biology(
                p.daily_gpp,
                p.daily_er,
                p.ratio_do_c_fix,
                p.ratio_do_c_resp,
                par_fraction,
                dt,
            );
            let avg_k = d.avg_k_do(i);
            let equil =
                processes::trapezoid_equilibration(dt, avg_k, d.sat_do[i], dox, d.sat_do[i + 1]);
            let (gw_known, gw_implicit) = inputs.groundwater.map_or((0.0, 0.0), |g| {
                processes::trapezoid_groundwater(dt, g.alpha[i], g.dox[i], dox)
            });

            let numerator = dox + bio.do_production + bio.do_consumption + equil + gw_known;
            let denominator = 1.0 + 0.5 * dt * avg_k + gw_implicit;
            let next =
                processes::implicit_update(i, numerator, denominator, inputs.settings.min_denominator)?;

            series.push(&OxygenFluxes {
                dt,
                par_fraction,
                sat_do: d.sat_do[i],
                k_do: d.k_do[i],
                c_fixation: bio.c_fixation,
                c_respiration: bio.c_respiration,
                dox,
                do_production: bio.do_production,
                do_consumption: bio.do_consumption,
                do_equilibration: equil,
                do_groundwater: gw_known - gw_implicit * next,
            });
            dox = next;
        }
        series.push(&OxygenFluxes::sentinel(dox, d.sat_do[n - 1], d.k_do[n - 1]));

        debug!("{} oxygen pass: {n} steps, final DO {dox:.4}", Self::SCHEME);
        Ok(series)
    }

    fn integrate_carbon(inputs: &CarbonInputs, oxygen: &OxygenSeries) -> MetabResult<CarbonSeries> {
        let d = inputs.drivers;
        let c = inputs.carbon;
        let r = inputs.ratios;
        let settings = inputs.settings;
        let n = d.len();
        let mut system = CarbonateSystem::new(d.temp[0], c.conductivity[0]);
        let mut series = CarbonSeries::with_capacity(n);
        let mut dic = inputs.initial_dic;
        let mut eq = system.equilibrium_um(dic, c.alkalinity[0], settings);

        for i in 0..n - 1 {
            // system is at the conditions of index i here
            let k_henry = system.k_henry();
            let deficit = k_henry * (c.pco2_air[i] - eq.pco2);

            system.reset(d.temp[i + 1], c.conductivity[i + 1]);
            let next_saturation = system.k_henry() * c.pco2_air[i + 1];

            let dt = d.dt[i];
            let avg_k = d.avg_k_co2(i);
            let equil = processes::trapezoid_co2_equilibration(dt, avg_k, deficit, next_saturation);
            let (production, consumption) = processes::dic_biology(
                oxygen.c_fixation[i],
                oxygen.c_respiration[i],
                r.ratio_dic_c_fix,
                r.ratio_dic_c_resp,
            );
            let (gw_known, gw_implicit) = inputs
                .groundwater_dic(i)
                .map_or((0.0, 0.0), |(alpha, gw_dic)| {
                    processes::trapezoid_groundwater(dt, alpha, gw_dic, dic)
                });

            let target = dic + production + consumption + equil + gw_known;
            let next = processes::solve_implicit_dic(
                &system,
                i,
                target,
                c.alkalinity[i + 1],
                0.5 * avg_k * dt,
                gw_implicit,
                settings,
            );

            series.push(&CarbonFluxes {
                dic,
                ph: eq.ph,
                pco2: eq.pco2,
                k_henry,
                k_co2: d.k_co2[i],
                dic_production: production,
                dic_consumption: consumption,
                co2_equilibration: equil,
                dic_groundwater: gw_known - gw_implicit * next,
            });

            dic = next;
            eq = system.equilibrium_um(dic, c.alkalinity[i + 1], settings);
        }
        series.push(&CarbonFluxes::sentinel(
            dic,
            eq.ph,
            eq.pco2,
            system.k_henry(),
            d.k_co2[n - 1],
        ));

        debug!("{} carbon pass: {n} steps, final DIC {dic:.4}", Self::SCHEME);
        Ok(series)
    }
}
