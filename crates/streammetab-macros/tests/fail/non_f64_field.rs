use streammetab_macros::Fluxes;

#[derive(Fluxes)]
pub struct StepFluxes {
    pub dox: f64,
    pub step: usize,
}

fn main() {
    let _ = StepFluxes { dox: 300.0, step: 0 };
}
