//! Validated driving data for the time-series and parcel models.
//!
//! All arrays in one forcing struct must have the same length and contain
//! only finite values. Cross-struct lengths (e.g. carbon data against the
//! time series) are checked when a model is assembled.
use crate::error::{MetabError, MetabResult};

/// Reject non-finite values and, if given, a length other than `expected`.
pub(crate) fn check_series(name: &str, values: &[f64], expected: Option<(&str, usize)>) -> MetabResult<()> {
    if let Some((expected_name, len)) = expected {
        if values.len() != len {
            return Err(MetabError::length_mismatch(name, values.len(), expected_name, len));
        }
    }
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(MetabError::invalid(format!(
            "{name} contains a non-finite value at index {i}"
        )));
    }
    Ok(())
}

/// Sensor series driving a time-series model.
#[derive(Debug, Clone)]
pub struct Forcing {
    /// Time [d], strictly increasing
    pub time: Vec<f64>,
    /// Water temperature [C]
    pub temp: Vec<f64>,
    /// Photosynthetically active radiation
    pub par: Vec<f64>,
    /// Barometric pressure
    pub air_pressure: Vec<f64>,
    /// Standard pressure in the units of `air_pressure`
    pub std_air_pressure: f64,
}

impl Forcing {
    /// Create new Forcing with validation.
    ///
    /// Validates:
    /// - at least two time steps
    /// - all arrays have the same length
    /// - no NaN or infinite values
    /// - time strictly increasing
    /// - standard pressure positive
    pub fn new(
        time: Vec<f64>,
        temp: Vec<f64>,
        par: Vec<f64>,
        air_pressure: Vec<f64>,
        std_air_pressure: f64,
    ) -> MetabResult<Self> {
        if time.len() < 2 {
            return Err(MetabError::invalid(format!(
                "time series needs at least 2 steps, got {}",
                time.len()
            )));
        }
        let n = time.len();
        check_series("time", &time, None)?;
        check_series("temp", &temp, Some(("time", n)))?;
        check_series("par", &par, Some(("time", n)))?;
        check_series("air_pressure", &air_pressure, Some(("time", n)))?;
        if let Some(i) = time.windows(2).position(|w| w[1] <= w[0]) {
            return Err(MetabError::invalid(format!(
                "time must be strictly increasing (time[{}] = {}, time[{}] = {})",
                i,
                time[i],
                i + 1,
                time[i + 1]
            )));
        }
        if !(std_air_pressure.is_finite() && std_air_pressure > 0.0) {
            return Err(MetabError::invalid(format!(
                "std_air_pressure = {std_air_pressure} must be positive"
            )));
        }
        Ok(Self {
            time,
            temp,
            par,
            air_pressure,
            std_air_pressure,
        })
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Always `false`: construction requires two or more steps.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Barometric pressure at `i` relative to standard pressure.
    pub fn relative_pressure(&self, i: usize) -> f64 {
        self.air_pressure[i] / self.std_air_pressure
    }
}

/// Carbon-side series accompanying a [`Forcing`].
#[derive(Debug, Clone)]
pub struct CarbonForcing {
    /// pCO2 of the overlying air [uatm]
    pub pco2_air: Vec<f64>,
    /// Total alkalinity [ueq/L]
    pub alkalinity: Vec<f64>,
    /// Specific conductance [mS/cm], zero unless supplied
    pub conductivity: Vec<f64>,
}

impl CarbonForcing {
    pub fn new(pco2_air: Vec<f64>, alkalinity: Vec<f64>) -> MetabResult<Self> {
        check_series("pco2_air", &pco2_air, None)?;
        check_series("alkalinity", &alkalinity, Some(("pco2_air", pco2_air.len())))?;
        let conductivity = vec![0.0; pco2_air.len()];
        Ok(Self {
            pco2_air,
            alkalinity,
            conductivity,
        })
    }

    /// Replace the default zero conductivity.
    pub fn with_conductivity(mut self, conductivity: Vec<f64>) -> MetabResult<Self> {
        check_series("conductivity", &conductivity, Some(("pco2_air", self.len())))?;
        self.conductivity = conductivity;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.pco2_air.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pco2_air.is_empty()
    }
}

/// Groundwater exchange with the channel, per step or per parcel.
///
/// `alpha` is the turnover rate [1/d] at which channel water is replaced by
/// groundwater carrying `dox` and, for carbon runs, `dic`.
#[derive(Debug, Clone)]
pub struct GroundwaterInflow {
    pub alpha: Vec<f64>,
    pub dox: Vec<f64>,
    pub dic: Option<Vec<f64>>,
}

impl GroundwaterInflow {
    pub fn new(alpha: Vec<f64>, dox: Vec<f64>) -> MetabResult<Self> {
        check_series("alpha", &alpha, None)?;
        check_series("groundwater dox", &dox, Some(("alpha", alpha.len())))?;
        if let Some(i) = alpha.iter().position(|&a| a < 0.0) {
            return Err(MetabError::invalid(format!(
                "alpha must be non-negative, got {} at index {i}",
                alpha[i]
            )));
        }
        Ok(Self {
            alpha,
            dox,
            dic: None,
        })
    }

    pub fn with_dic(mut self, dic: Vec<f64>) -> MetabResult<Self> {
        check_series("groundwater dic", &dic, Some(("alpha", self.alpha.len())))?;
        self.dic = Some(dic);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.alpha.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alpha.is_empty()
    }

    /// Groundwater DIC at `i`, if supplied; carbon runs skip the exchange otherwise.
    pub fn dic_at(&self, i: usize) -> Option<f64> {
        self.dic.as_ref().map(|d| d[i])
    }
}

/// Upstream/downstream observations bounding each tracked parcel.
#[derive(Debug, Clone)]
pub struct ParcelForcing {
    pub up_time: Vec<f64>,
    pub down_time: Vec<f64>,
    pub up_temp: Vec<f64>,
    pub down_temp: Vec<f64>,
    pub up_par: Vec<f64>,
    pub down_par: Vec<f64>,
    /// DO entering the reach [umol/L]
    pub up_do: Vec<f64>,
    pub air_pressure: Vec<f64>,
    pub std_air_pressure: f64,
}

impl ParcelForcing {
    /// Create new ParcelForcing with validation.
    ///
    /// Every parcel must take positive time to travel the reach.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        up_time: Vec<f64>,
        down_time: Vec<f64>,
        up_temp: Vec<f64>,
        down_temp: Vec<f64>,
        up_par: Vec<f64>,
        down_par: Vec<f64>,
        up_do: Vec<f64>,
        air_pressure: Vec<f64>,
        std_air_pressure: f64,
    ) -> MetabResult<Self> {
        if up_time.is_empty() {
            return Err(MetabError::invalid("no parcels supplied"));
        }
        let n = up_time.len();
        check_series("up_time", &up_time, None)?;
        check_series("down_time", &down_time, Some(("up_time", n)))?;
        check_series("up_temp", &up_temp, Some(("up_time", n)))?;
        check_series("down_temp", &down_temp, Some(("up_time", n)))?;
        check_series("up_par", &up_par, Some(("up_time", n)))?;
        check_series("down_par", &down_par, Some(("up_time", n)))?;
        check_series("up_do", &up_do, Some(("up_time", n)))?;
        check_series("air_pressure", &air_pressure, Some(("up_time", n)))?;
        if let Some(i) = up_time
            .iter()
            .zip(&down_time)
            .position(|(up, down)| down <= up)
        {
            return Err(MetabError::invalid(format!(
                "parcel {i} has non-positive travel time ({} -> {})",
                up_time[i], down_time[i]
            )));
        }
        if !(std_air_pressure.is_finite() && std_air_pressure > 0.0) {
            return Err(MetabError::invalid(format!(
                "std_air_pressure = {std_air_pressure} must be positive"
            )));
        }
        Ok(Self {
            up_time,
            down_time,
            up_temp,
            down_temp,
            up_par,
            down_par,
            up_do,
            air_pressure,
            std_air_pressure,
        })
    }

    /// Number of parcels.
    pub fn len(&self) -> usize {
        self.up_time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.up_time.is_empty()
    }

    pub fn travel_time(&self, i: usize) -> f64 {
        self.down_time[i] - self.up_time[i]
    }

    pub fn relative_pressure(&self, i: usize) -> f64 {
        self.air_pressure[i] / self.std_air_pressure
    }
}

/// Carbon-side parcel observations.
#[derive(Debug, Clone)]
pub struct ParcelCarbonForcing {
    /// DIC entering the reach [umol/L]
    pub up_dic: Vec<f64>,
    pub pco2_air: Vec<f64>,
    pub up_alkalinity: Vec<f64>,
    pub down_alkalinity: Vec<f64>,
    pub up_conductivity: Vec<f64>,
    pub down_conductivity: Vec<f64>,
}

impl ParcelCarbonForcing {
    pub fn new(
        up_dic: Vec<f64>,
        pco2_air: Vec<f64>,
        up_alkalinity: Vec<f64>,
        down_alkalinity: Vec<f64>,
    ) -> MetabResult<Self> {
        let n = up_dic.len();
        check_series("up_dic", &up_dic, None)?;
        check_series("pco2_air", &pco2_air, Some(("up_dic", n)))?;
        check_series("up_alkalinity", &up_alkalinity, Some(("up_dic", n)))?;
        check_series("down_alkalinity", &down_alkalinity, Some(("up_dic", n)))?;
        Ok(Self {
            up_dic,
            pco2_air,
            up_alkalinity,
            down_alkalinity,
            up_conductivity: vec![0.0; n],
            down_conductivity: vec![0.0; n],
        })
    }

    pub fn with_conductivity(mut self, up: Vec<f64>, down: Vec<f64>) -> MetabResult<Self> {
        let n = self.len();
        check_series("up_conductivity", &up, Some(("up_dic", n)))?;
        check_series("down_conductivity", &down, Some(("up_dic", n)))?;
        self.up_conductivity = up;
        self.down_conductivity = down;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.up_dic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.up_dic.is_empty()
    }
}
