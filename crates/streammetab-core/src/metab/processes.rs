//! Metabolism process functions.
//!
//! Pure functions for the biological, gas-exchange and groundwater terms of
//! the DO and DIC balances, plus the implicit solves that close a
//! semi-implicit step.

use log::{trace, warn};

use crate::carbonate::CarbonateSystem;
use crate::error::{MetabError, MetabResult};
use crate::optimize::{accuracy, solve_for};
use crate::settings::SolverSettings;

/// Carbon fixed and respired over one step, and the matching DO changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biology {
    pub c_fixation: f64,
    pub c_respiration: f64,
    pub do_production: f64,
    pub do_consumption: f64,
}

/// Split daily rates over a step of length `dt` receiving `par_fraction` of the light.
pub fn biology(
    daily_gpp: f64,
    daily_er: f64,
    ratio_do_c_fix: f64,
    ratio_do_c_resp: f64,
    par_fraction: f64,
    dt: f64,
) -> Biology {
    let c_fixation = daily_gpp * par_fraction;
    let c_respiration = daily_er * dt;
    Biology {
        c_fixation,
        c_respiration,
        do_production: c_fixation * ratio_do_c_fix,
        do_consumption: c_respiration * ratio_do_c_resp,
    }
}

/// DIC (production, consumption) from the carbon a step fixed and respired.
pub fn dic_biology(
    c_fixation: f64,
    c_respiration: f64,
    ratio_dic_c_fix: f64,
    ratio_dic_c_resp: f64,
) -> (f64, f64) {
    (c_respiration * ratio_dic_c_resp, c_fixation * ratio_dic_c_fix)
}

/// Explicit air-water exchange toward saturation.
pub fn explicit_equilibration(dt: f64, k: f64, saturation: f64, concentration: f64) -> f64 {
    dt * k * (saturation - concentration)
}

/// Known part of a trapezoidal exchange step.
///
/// The unknown end-of-step concentration enters through the implicit
/// denominator `1 + dt * avg_k / 2`.
pub fn trapezoid_equilibration(
    dt: f64,
    avg_k: f64,
    saturation: f64,
    concentration: f64,
    next_saturation: f64,
) -> f64 {
    dt * avg_k * 0.5 * (saturation - concentration + next_saturation)
}

/// Explicit CO2 exchange, from the pCO2 gradient.
pub fn explicit_co2_equilibration(dt: f64, k_co2: f64, k_henry: f64, pco2_air: f64, pco2: f64) -> f64 {
    dt * k_co2 * k_henry * (pco2_air - pco2)
}

/// Known part of a trapezoidal CO2 exchange step, from the current CO2
/// deficit and the next saturation concentration.
pub fn trapezoid_co2_equilibration(dt: f64, avg_k: f64, deficit: f64, next_saturation: f64) -> f64 {
    dt * avg_k * 0.5 * (deficit + next_saturation)
}

/// Explicit groundwater exchange.
pub fn explicit_groundwater(dt: f64, alpha: f64, groundwater: f64, concentration: f64) -> f64 {
    dt * alpha * (groundwater - concentration)
}

/// Trapezoidal groundwater exchange as (known part, implicit coefficient).
pub fn trapezoid_groundwater(dt: f64, alpha: f64, groundwater: f64, concentration: f64) -> (f64, f64) {
    (
        dt * alpha * (groundwater - 0.5 * concentration),
        0.5 * dt * alpha,
    )
}

/// Divide a semi-implicit numerator by its denominator, refusing
/// denominators at or below `min_denominator`.
pub fn implicit_update(
    step: usize,
    numerator: f64,
    denominator: f64,
    min_denominator: f64,
) -> MetabResult<f64> {
    if denominator.is_nan() || denominator <= min_denominator {
        return Err(MetabError::NumericalInstability { step, denominator });
    }
    Ok(numerator / denominator)
}

/// Solve the implicit DIC balance for the end-of-step DIC [umol/L].
///
/// Finds `x` with `x + implicit_k * co2(x) + implicit_gw * x = target`,
/// where `co2(x)` is the dissolved CO2 of water holding `x` DIC at
/// `alkalinity`. `system` must already be at end-of-step conditions.
pub fn solve_implicit_dic(
    system: &CarbonateSystem,
    step: usize,
    target: f64,
    alkalinity: f64,
    implicit_k: f64,
    implicit_gw: f64,
    settings: &SolverSettings,
) -> f64 {
    let proposed = |x: f64| {
        x + implicit_k * system.aqueous_co2_um(x, alkalinity, settings) + implicit_gw * x
    };
    let dic = solve_for(
        settings.dic_min,
        settings.dic_max,
        target,
        proposed,
        settings.dic_tolerance,
    );
    trace!("step {step}: implicit DIC target={target:.6} solution={dic:.6}");

    let margin = accuracy(dic, settings.dic_tolerance);
    if dic - settings.dic_min <= margin || settings.dic_max - dic <= margin {
        warn!(
            "step {step}: DIC solve ended at bracket edge (DIC={dic:.6}, bracket=[{}, {}])",
            settings.dic_min, settings.dic_max
        );
    }
    dic
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gas_exchange::k_schmidt_co2;
    use approx::assert_relative_eq;

    #[test]
    fn biology_splits_daily_rates() {
        let b = biology(10.0, -8.0, 1.0, 1.0, 0.5, 0.5);
        assert_eq!(b.c_fixation, 5.0);
        assert_eq!(b.c_respiration, -4.0);
        assert_eq!(b.do_production, 5.0);
        assert_eq!(b.do_consumption, -4.0);
    }

    #[test]
    fn dic_biology_uses_crossed_ratios() {
        let (prod, cons) = dic_biology(5.0, -4.0, -1.0, -1.0);
        assert_eq!(prod, 4.0);
        assert_eq!(cons, -5.0);
    }

    #[test]
    fn equilibration_signs() {
        assert!(explicit_equilibration(0.5, 2.0, 280.0, 300.0) < 0.0);
        assert!(explicit_equilibration(0.5, 2.0, 280.0, 260.0) > 0.0);
        assert_eq!(explicit_equilibration(0.5, 2.0, 280.0, 280.0), 0.0);
        assert!(explicit_co2_equilibration(0.5, 2.0, 0.04, 400.0, 800.0) < 0.0);
    }

    #[test]
    fn trapezoid_at_saturation_is_fixed_point() {
        let (dt, k, sat) = (0.25, 3.0, 284.0);
        let numerator = sat + trapezoid_equilibration(dt, k, sat, sat, sat);
        let next = implicit_update(0, numerator, 1.0 + 0.5 * dt * k, 1e-9).unwrap();
        assert_relative_eq!(next, sat, max_relative = 1e-14);
    }

    #[test]
    fn groundwater_terms() {
        assert_eq!(explicit_groundwater(0.5, 0.2, 250.0, 300.0), -5.0);
        let (known, implicit) = trapezoid_groundwater(0.5, 0.2, 250.0, 300.0);
        assert_relative_eq!(known, 0.1 * (250.0 - 150.0));
        assert_relative_eq!(implicit, 0.05);
    }

    #[test]
    fn implicit_update_rejects_small_denominator() {
        assert!(implicit_update(3, 1.0, 1e-12, 1e-9).is_err());
        assert!(implicit_update(3, 1.0, -2.0, 1e-9).is_err());
        let err = implicit_update(3, 1.0, f64::NAN, 1e-9).unwrap_err();
        assert!(matches!(err, MetabError::NumericalInstability { step: 3, .. }));
        assert_eq!(implicit_update(0, 3.0, 2.0, 1e-9).unwrap(), 1.5);
    }

    #[test]
    fn implicit_dic_satisfies_balance() {
        let system = CarbonateSystem::new(20.0, 0.0);
        let settings = SolverSettings::default();
        let implicit_k = 0.5 * k_schmidt_co2(20.0, 2.0) * 0.5;
        let target = 2100.0;
        let dic = solve_implicit_dic(&system, 0, target, 2000.0, implicit_k, 0.0, &settings);
        assert_relative_eq!(dic, 2065.1275802, max_relative = 1e-6);

        let residual = dic + implicit_k * system.aqueous_co2_um(dic, 2000.0, &settings) - target;
        // minimizer accuracy in x, times a local slope just above one
        assert!(residual.abs() < 2.0 * accuracy(dic, settings.dic_tolerance));
    }

    #[test]
    fn implicit_dic_without_exchange_is_target() {
        let system = CarbonateSystem::new(15.0, 0.0);
        let settings = SolverSettings::default();
        let dic = solve_implicit_dic(&system, 0, 1800.0, 2000.0, 0.0, 0.0, &settings);
        assert!((dic - 1800.0).abs() < accuracy(1800.0, settings.dic_tolerance));
    }
}
