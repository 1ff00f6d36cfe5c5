/// Time-series metabolism model.
///
/// Daily GPP is distributed over the day in proportion to light, daily ER
/// is spread evenly, and air-water exchange relaxes DO (and optionally DIC)
/// toward saturation. Two integration schemes share one model aggregate.
pub mod constants;
pub mod drivers;
pub mod fluxes;
pub mod params;
pub mod processes;
pub mod run;
pub mod schemes;

pub use fluxes::MetabolismOutput;
pub use run::Metabolism;
pub use schemes::Scheme;
