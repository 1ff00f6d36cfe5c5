//! Parameter contract and calibration ranges of the metabolism model.

/// Parameter names in canonical order.
pub const PARAM_NAMES: &[&str] = &[
    "daily_gpp",
    "ratio_do_c_fix",
    "daily_er",
    "ratio_do_c_resp",
    "k600",
];

/// Number of parameters.
pub const N_PARAMS: usize = 5;

/// Names of the DIC stoichiometry ratios.
pub const DIC_PARAM_NAMES: &[&str] = &["ratio_dic_c_fix", "ratio_dic_c_resp"];

pub const N_DIC_PARAMS: usize = 2;

// -- Calibration ranges --
//
// Search ranges for fitting. Models accept any finite value.

/// Parameter bounds for calibration.
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

/// Daily gross primary production [umol C/L/d].
pub const DAILY_GPP_BOUNDS: Bounds = Bounds {
    min: 0.0,
    max: 1000.0,
};

/// O2 released per C fixed.
pub const RATIO_DO_C_FIX_BOUNDS: Bounds = Bounds { min: 0.0, max: 2.0 };

/// Daily ecosystem respiration [umol C/L/d], negative when consuming.
pub const DAILY_ER_BOUNDS: Bounds = Bounds {
    min: -1000.0,
    max: 1000.0,
};

/// O2 change per C respired.
pub const RATIO_DO_C_RESP_BOUNDS: Bounds = Bounds { min: -2.0, max: 2.0 };

/// Gas-exchange velocity normalized to Schmidt number 600 [1/d].
pub const K600_BOUNDS: Bounds = Bounds {
    min: 0.0,
    max: 100.0,
};

/// DIC change per C fixed or respired.
pub const RATIO_DIC_BOUNDS: Bounds = Bounds { min: -2.0, max: 2.0 };

/// Bounds as (min, max) tuples, in `PARAM_NAMES` order.
pub const PARAM_BOUNDS: &[(f64, f64)] = &[
    (DAILY_GPP_BOUNDS.min, DAILY_GPP_BOUNDS.max),
    (RATIO_DO_C_FIX_BOUNDS.min, RATIO_DO_C_FIX_BOUNDS.max),
    (DAILY_ER_BOUNDS.min, DAILY_ER_BOUNDS.max),
    (RATIO_DO_C_RESP_BOUNDS.min, RATIO_DO_C_RESP_BOUNDS.max),
    (K600_BOUNDS.min, K600_BOUNDS.max),
];

pub const DIC_PARAM_BOUNDS: &[(f64, f64)] = &[
    (RATIO_DIC_BOUNDS.min, RATIO_DIC_BOUNDS.max),
    (RATIO_DIC_BOUNDS.min, RATIO_DIC_BOUNDS.max),
];
