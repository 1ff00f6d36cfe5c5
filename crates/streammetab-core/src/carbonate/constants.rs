//! Coefficients of the carbonate equilibrium model.
//!
//! Dissociation constants are `exp(a + b / T + c * ln T)` with T in Kelvin.

/// Offset from Celsius to Kelvin.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Ionic strength per unit specific conductance.
pub const IONIC_STRENGTH_PER_CONDUCTIVITY: f64 = 0.013;

// -- Davies equation --

/// Davies `A` parameter at 25 C.
pub const DAVIES_A_25C: f64 = 0.5092;

/// Change of the Davies `A` parameter per degree C.
pub const DAVIES_A_SLOPE: f64 = 0.00085;

/// Linear ionic strength term of the Davies equation.
pub const DAVIES_LINEAR: f64 = 0.3;

// -- Dissociation constants --

/// First dissociation of carbonic acid, H2CO3 <-> H+ + HCO3-.
pub const K_H2CO3: [f64; 3] = [290.9097, -14554.21, -45.0575];

/// Second dissociation, HCO3- <-> H+ + CO3--.
pub const K_HCO3: [f64; 3] = [207.6548, -11843.79, -33.6485];

/// Dissociation of water.
pub const K_H2O: [f64; 3] = [148.9802, -13847.26, -23.6521];

// -- Henry's law --

/// Henry's constant for CO2: `exp(a + b * (100 / T) + c * ln(T / 100))`.
pub const K_HENRY_CO2: [f64; 3] = [-60.2409, 93.4517, 23.3585];

/// Micro-atmospheres per atmosphere.
pub const UATM_PER_ATM: f64 = 1e6;

/// Moles per micromole.
pub const MOL_PER_UMOL: f64 = 1e-6;
