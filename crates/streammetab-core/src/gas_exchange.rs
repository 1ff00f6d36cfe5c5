//! Physical-property calculators for air-water gas exchange.
//!
//! Pure functions of water temperature. Models receive them through
//! [`Calculators`], so any of them can be swapped for an alternative
//! formulation without touching the integrators.

/// Schmidt number the gas-exchange velocity k600 is normalized to.
pub const SCHMIDT_REFERENCE: f64 = 600.0;

/// Exponent of the Schmidt-number scaling (smooth to wavy surfaces).
pub const SCHMIDT_EXPONENT: f64 = -0.5;

/// Density of fresh water [kg/L] at `temp` [C].
pub fn density_water(temp: f64) -> f64 {
    0.999842 + 6.7940e-5 * temp - 9.0953e-6 * temp.powi(2) + 1.0017e-7 * temp.powi(3)
        - 1.1201e-9 * temp.powi(4)
        + 6.5363e-12 * temp.powi(5)
}

/// Oxygen saturation concentration [umol/L] (Garcia and Gordon).
///
/// `relative_pressure` is the barometric pressure divided by standard
/// pressure, in whatever units the two share.
pub fn sat_do(temp: f64, density: f64, relative_pressure: f64) -> f64 {
    let n = ((298.15 - temp) / (273.15 + temp)).ln();
    relative_pressure
        * density
        * (5.80871
            + 3.20291 * n
            + 4.17887 * n.powi(2)
            + 5.10006 * n.powi(3)
            - 0.0986643 * n.powi(4)
            + 3.80369 * n.powi(5))
        .exp()
}

/// Schmidt number of O2 in fresh water.
pub fn schmidt_o2(temp: f64) -> f64 {
    1800.6 - 120.1 * temp + 3.7818 * temp.powi(2) - 0.047608 * temp.powi(3)
}

/// Schmidt number of CO2 in fresh water.
pub fn schmidt_co2(temp: f64) -> f64 {
    1742.0 - 91.24 * temp + 2.208 * temp.powi(2) - 0.0219 * temp.powi(3)
}

/// Scale k600 to a gas with Schmidt number `schmidt`.
pub fn k_from_k600(k600: f64, schmidt: f64) -> f64 {
    k600 * (schmidt / SCHMIDT_REFERENCE).powf(SCHMIDT_EXPONENT)
}

/// O2 gas-exchange rate [1/d] at `temp` for the given k600.
pub fn k_schmidt_o2(temp: f64, k600: f64) -> f64 {
    k_from_k600(k600, schmidt_o2(temp))
}

/// CO2 gas-exchange rate [1/d] at `temp` for the given k600.
pub fn k_schmidt_co2(temp: f64, k600: f64) -> f64 {
    k_from_k600(k600, schmidt_co2(temp))
}

/// Share of daily PAR received over an interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParDist {
    total: f64,
}

impl ParDist {
    pub fn new(total: f64) -> Self {
        Self { total }
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Fraction of the total received at `par` over `duration`.
    pub fn fraction(&self, duration: f64, par: f64) -> f64 {
        par * duration / self.total
    }
}

/// Pluggable temperature-dependent calculators used by every model.
#[derive(Debug, Clone, Copy)]
pub struct Calculators {
    pub density: fn(f64) -> f64,
    pub sat_do: fn(f64, f64, f64) -> f64,
    pub k_do: fn(f64, f64) -> f64,
    pub k_co2: fn(f64, f64) -> f64,
}

impl Default for Calculators {
    fn default() -> Self {
        Self {
            density: density_water,
            sat_do,
            k_do: k_schmidt_o2,
            k_co2: k_schmidt_co2,
        }
    }
}

impl Calculators {
    pub fn with_density(mut self, f: fn(f64) -> f64) -> Self {
        self.density = f;
        self
    }

    pub fn with_sat_do(mut self, f: fn(f64, f64, f64) -> f64) -> Self {
        self.sat_do = f;
        self
    }

    pub fn with_k_do(mut self, f: fn(f64, f64) -> f64) -> Self {
        self.k_do = f;
        self
    }

    pub fn with_k_co2(mut self, f: fn(f64, f64) -> f64) -> Self {
        self.k_co2 = f;
        self
    }

    /// Saturation DO at `temp` and pressure ratio, via the density calculator.
    pub fn saturation(&self, temp: f64, relative_pressure: f64) -> f64 {
        (self.sat_do)(temp, (self.density)(temp), relative_pressure)
    }
}
