use streammetab_macros::Fluxes;

#[derive(Debug, Clone, Copy, PartialEq, Fluxes)]
pub struct ParcelFluxes {
    pub travel_time: f64,
    pub dox: f64,
}

fn main() {
    let mut ts = ParcelFluxesSeries::default();
    assert!(ts.is_empty());
    ts.push(&ParcelFluxes { travel_time: 0.1, dox: 280.0 });
    ts.push(&ParcelFluxes { travel_time: 0.2, dox: 290.0 });

    assert_eq!(ts.row(1), Some(ParcelFluxes { travel_time: 0.2, dox: 290.0 }));
    assert_eq!(ts.row(2), None);
    assert_eq!(ts.column("dox"), Some(&[280.0, 290.0][..]));
    assert_eq!(ts.column("missing"), None);
}
