//! Metabolism parameters.
//!
//! Five coefficients drive DO; two more stoichiometry ratios drive DIC.
use super::constants::{
    DIC_PARAM_BOUNDS, DIC_PARAM_NAMES, N_DIC_PARAMS, N_PARAMS, PARAM_BOUNDS, PARAM_NAMES,
};
use crate::error::{MetabError, MetabResult};
use crate::traits::ModelParams;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    pub daily_gpp: f64,
    pub ratio_do_c_fix: f64,
    pub daily_er: f64,
    pub ratio_do_c_resp: f64,
    pub k600: f64,
}

/// Reject NaN and infinite coefficients. Calibration ranges are not enforced.
fn check_finite(names: &[&str], values: &[f64]) -> MetabResult<()> {
    match names.iter().zip(values).find(|(_, v)| !v.is_finite()) {
        Some((name, val)) => Err(MetabError::invalid(format!("{name} = {val} must be finite"))),
        None => Ok(()),
    }
}

impl Parameters {
    /// Create new Parameters, returning an error if any value is not finite.
    pub fn new(
        daily_gpp: f64,
        ratio_do_c_fix: f64,
        daily_er: f64,
        ratio_do_c_resp: f64,
        k600: f64,
    ) -> MetabResult<Self> {
        check_finite(
            PARAM_NAMES,
            &[daily_gpp, ratio_do_c_fix, daily_er, ratio_do_c_resp, k600],
        )?;
        Ok(Self {
            daily_gpp,
            ratio_do_c_fix,
            daily_er,
            ratio_do_c_resp,
            k600,
        })
    }
}

impl ModelParams for Parameters {
    const N_PARAMS: usize = N_PARAMS;
    const PARAM_NAMES: &'static [&'static str] = PARAM_NAMES;
    const PARAM_BOUNDS: &'static [(f64, f64)] = PARAM_BOUNDS;

    fn from_array(arr: &[f64]) -> MetabResult<Self> {
        if arr.len() != N_PARAMS {
            return Err(MetabError::invalid(format!(
                "expected {} parameters, got {}",
                N_PARAMS,
                arr.len()
            )));
        }
        Self::new(arr[0], arr[1], arr[2], arr[3], arr[4])
    }

    fn to_array(&self) -> Vec<f64> {
        vec![
            self.daily_gpp,
            self.ratio_do_c_fix,
            self.daily_er,
            self.ratio_do_c_resp,
            self.k600,
        ]
    }
}

/// Stoichiometry linking carbon fixed and respired to DIC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DicParameters {
    pub ratio_dic_c_fix: f64,
    pub ratio_dic_c_resp: f64,
}

impl DicParameters {
    pub fn new(ratio_dic_c_fix: f64, ratio_dic_c_resp: f64) -> MetabResult<Self> {
        check_finite(DIC_PARAM_NAMES, &[ratio_dic_c_fix, ratio_dic_c_resp])?;
        Ok(Self {
            ratio_dic_c_fix,
            ratio_dic_c_resp,
        })
    }
}

impl ModelParams for DicParameters {
    const N_PARAMS: usize = N_DIC_PARAMS;
    const PARAM_NAMES: &'static [&'static str] = DIC_PARAM_NAMES;
    const PARAM_BOUNDS: &'static [(f64, f64)] = DIC_PARAM_BOUNDS;

    fn from_array(arr: &[f64]) -> MetabResult<Self> {
        if arr.len() != N_DIC_PARAMS {
            return Err(MetabError::invalid(format!(
                "expected {} parameters, got {}",
                N_DIC_PARAMS,
                arr.len()
            )));
        }
        Self::new(arr[0], arr[1])
    }

    fn to_array(&self) -> Vec<f64> {
        vec![self.ratio_dic_c_fix, self.ratio_dic_c_resp]
    }
}
