//! Stream metabolism engine.
//!
//! Simulates how gross primary production and ecosystem respiration move
//! dissolved oxygen and, optionally, dissolved inorganic carbon in a stream,
//! coupled to air-water gas exchange. Two model families share the same
//! chemistry and process functions:
//!
//! - [`metab::Metabolism`]: a sensor time series at one station
//! - [`lagrange::ParcelModel`]: water parcels tracked through a reach
//!
//! The library logs through the `log` facade and never installs a logger.

pub mod carbonate;
pub mod error;
pub mod forcing;
pub mod gas_exchange;
pub mod lagrange;
pub mod metab;
pub mod objective;
pub mod optimize;
pub mod settings;
pub mod traits;

pub use error::{MetabError, MetabResult};
