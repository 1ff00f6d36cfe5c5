use streammetab_macros::Fluxes;

#[derive(Debug, Clone, Copy, Fluxes)]
pub struct OxygenFluxes {
    pub dox: f64,
    pub do_production: f64,
    pub do_equilibration: f64,
}

fn main() {
    let f = OxygenFluxes { dox: 300.0, do_production: 5.0, do_equilibration: -1.5 };
    let mut ts = OxygenFluxesSeries::with_capacity(10);
    ts.push(&f);
    assert_eq!(ts.len(), 1);
    assert!(!ts.is_empty());
    assert_eq!(OxygenFluxes::field_names(), &["dox", "do_production", "do_equilibration"]);
}
