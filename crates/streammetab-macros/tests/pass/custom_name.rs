use streammetab_macros::Fluxes;

#[derive(Debug, Clone, Copy, Fluxes)]
#[fluxes(series_name = "CarbonSeries")]
pub struct CarbonFluxes {
    pub dic: f64,
    pub ph: f64,
}

fn main() {
    let f = CarbonFluxes { dic: 2000.0, ph: 7.8 };
    let mut ts = CarbonSeries::with_capacity(5);
    ts.push(&f);
    assert_eq!(ts.len(), 1);
    assert_eq!(CarbonFluxes::field_names(), &["dic", "ph"]);
}
