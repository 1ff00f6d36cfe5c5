/// Carbonate chemistry of stream water.
///
/// Apparent dissociation constants with Davies activity corrections, and
/// the alkalinity / pH / pCO2 relations used to close the DIC balance.
pub mod constants;
pub mod system;

pub use system::{CarbonateSystem, Equilibrium};
