//! Numerical settings for the root-finding steps of a run.
//!
//! All fields carry defaults matching the values the model has always used,
//! so a partially specified configuration deserializes to a usable one.

use crate::error::{MetabError, MetabResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Brackets and tolerances for the pH and DIC solves.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverSettings {
    /// pH solve tolerance
    #[cfg_attr(feature = "serde", serde(default = "default_ph_tolerance"))]
    pub ph_tolerance: f64,

    /// Lower pH bracket
    #[cfg_attr(feature = "serde", serde(default = "default_ph_min"))]
    pub ph_min: f64,

    /// Upper pH bracket
    #[cfg_attr(feature = "serde", serde(default = "default_ph_max"))]
    pub ph_max: f64,

    /// Lower DIC bracket for implicit updates [umol/L]
    #[cfg_attr(feature = "serde", serde(default = "default_dic_min"))]
    pub dic_min: f64,

    /// Upper DIC bracket for implicit updates [umol/L]
    #[cfg_attr(feature = "serde", serde(default = "default_dic_max"))]
    pub dic_max: f64,

    /// DIC solve tolerance [umol/L]
    #[cfg_attr(feature = "serde", serde(default = "default_dic_tolerance"))]
    pub dic_tolerance: f64,

    /// Smallest accepted denominator of a semi-implicit update
    #[cfg_attr(feature = "serde", serde(default = "default_min_denominator"))]
    pub min_denominator: f64,
}

fn default_ph_tolerance() -> f64 { 1e-5 }
fn default_ph_min() -> f64 { 2.0 }
fn default_ph_max() -> f64 { 12.0 }
fn default_dic_min() -> f64 { 0.0 }
fn default_dic_max() -> f64 { 1e6 }
fn default_dic_tolerance() -> f64 { 1e-5 }
fn default_min_denominator() -> f64 { 1e-9 }

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            ph_tolerance: default_ph_tolerance(),
            ph_min: default_ph_min(),
            ph_max: default_ph_max(),
            dic_min: default_dic_min(),
            dic_max: default_dic_max(),
            dic_tolerance: default_dic_tolerance(),
            min_denominator: default_min_denominator(),
        }
    }
}

impl SolverSettings {
    /// Check bracket ordering and tolerance signs.
    pub fn validate(&self) -> MetabResult<()> {
        let values = [
            ("ph_tolerance", self.ph_tolerance),
            ("ph_min", self.ph_min),
            ("ph_max", self.ph_max),
            ("dic_min", self.dic_min),
            ("dic_max", self.dic_max),
            ("dic_tolerance", self.dic_tolerance),
            ("min_denominator", self.min_denominator),
        ];
        if let Some((name, value)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(MetabError::invalid(format!("{name} = {value} is not finite")));
        }
        if self.ph_min >= self.ph_max {
            return Err(MetabError::invalid(format!(
                "pH bracket [{}, {}] is empty",
                self.ph_min, self.ph_max
            )));
        }
        if self.dic_min >= self.dic_max {
            return Err(MetabError::invalid(format!(
                "DIC bracket [{}, {}] is empty",
                self.dic_min, self.dic_max
            )));
        }
        if self.ph_tolerance < 0.0 || self.dic_tolerance < 0.0 {
            return Err(MetabError::invalid("solver tolerances must be non-negative"));
        }
        if self.min_denominator < 0.0 {
            return Err(MetabError::invalid("min_denominator must be non-negative"));
        }
        Ok(())
    }
}
