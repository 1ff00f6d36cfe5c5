/// Lagrangian (parcel-tracking) metabolism.
///
/// Each parcel is observed entering and leaving a reach; DO and DIC are
/// integrated along its travel time, independently of every other parcel.
pub mod fluxes;
pub mod run;

pub use fluxes::ParcelOutput;
pub use run::{ParcelMode, ParcelModel};
