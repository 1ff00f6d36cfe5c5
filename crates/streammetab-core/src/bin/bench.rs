/// Pure Rust benchmarks for the streammetab integrators.
///
/// Uses std::time::Instant for timing, a deterministic LCG PRNG for data generation,
/// and std::hint::black_box to prevent dead-code elimination. Set RUST_LOG=debug
/// to see per-run diagnostics from the library.
use std::f64::consts::PI;
use std::hint::black_box;
use std::time::{Duration, Instant};

use streammetab_core::forcing::{CarbonForcing, Forcing, ParcelCarbonForcing, ParcelForcing};
use streammetab_core::lagrange::{ParcelMode, ParcelModel};
use streammetab_core::metab::params::{DicParameters, Parameters};
use streammetab_core::metab::{Metabolism, Scheme};
use streammetab_core::MetabResult;

const REPEATS: usize = 7;

type BenchRows = Vec<(&'static str, usize, Duration)>;

/// Steps per day of the synthetic logger (15-minute interval).
const STEPS_PER_DAY: usize = 96;

/// Simple LCG PRNG for deterministic data generation.
fn make_data(n: usize, seed: u64) -> MetabResult<Forcing> {
    let mut state = seed;
    let mut next_f64 = || -> f64 {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as f64 / (1u64 << 31) as f64
    };

    let time: Vec<f64> = (0..n).map(|i| i as f64 / STEPS_PER_DAY as f64).collect();
    let temp: Vec<f64> = time
        .iter()
        .map(|t| 15.0 + 3.0 * (2.0 * PI * (t - 0.375)).sin() + 0.2 * next_f64())
        .collect();
    let par: Vec<f64> = time
        .iter()
        .map(|t| {
            let light = (2.0 * PI * (t - 0.25)).sin();
            if light > 0.0 {
                1500.0 * light * (0.7 + 0.3 * next_f64())
            } else {
                0.0
            }
        })
        .collect();
    let pressure: Vec<f64> = (0..n).map(|_| 755.0 + 10.0 * next_f64()).collect();
    Forcing::new(time, temp, par, pressure, 760.0)
}

/// Run a closure `REPEATS` times, return the median duration.
fn median_time<F: FnMut()>(mut f: F) -> Duration {
    let mut times: Vec<Duration> = (0..REPEATS)
        .map(|_| {
            let start = Instant::now();
            f();
            start.elapsed()
        })
        .collect();
    times.sort();
    times[REPEATS / 2]
}

fn params() -> MetabResult<Parameters> {
    Parameters::new(120.0, 1.0, -90.0, 1.0, 8.0)
}

fn bench_oxygen(scheme: Scheme, name: &'static str, sizes: &[usize]) -> MetabResult<BenchRows> {
    let mut results = Vec::new();

    for &n in sizes {
        let model = Metabolism::new(params()?, make_data(n, 42)?, 280.0, scheme)?;

        // Warmup
        black_box(model.run()?);

        let dur = median_time(|| {
            black_box(model.run().ok());
        });
        results.push((name, n, dur));
    }
    Ok(results)
}

fn bench_carbon(scheme: Scheme, name: &'static str, sizes: &[usize]) -> MetabResult<BenchRows> {
    let mut results = Vec::new();

    for &n in sizes {
        let carbon = CarbonForcing::new(vec![415.0; n], vec![2200.0; n])?;
        let model = Metabolism::new(params()?, make_data(n, 42)?, 280.0, scheme)?
            .with_carbon(DicParameters::new(-1.0, -1.0)?, carbon, 2300.0)?;

        // Warmup
        black_box(model.run()?);

        let dur = median_time(|| {
            black_box(model.run().ok());
        });
        results.push((name, n, dur));
    }
    Ok(results)
}

fn bench_parcels(mode: ParcelMode, name: &'static str, sizes: &[usize]) -> MetabResult<BenchRows> {
    let mut results = Vec::new();
    let travel = 0.05;

    for &n in sizes {
        let up = make_data(n + 5, 7)?;
        // downstream observations lag the upstream ones by the travel time
        let lag = (travel * STEPS_PER_DAY as f64).round() as usize;
        let forcing = ParcelForcing::new(
            up.time[..n].to_vec(),
            up.time[..n].iter().map(|t| t + travel).collect(),
            up.temp[..n].to_vec(),
            up.temp[lag..n + lag].to_vec(),
            up.par[..n].to_vec(),
            up.par[lag..n + lag].to_vec(),
            vec![280.0; n],
            up.air_pressure[..n].to_vec(),
            up.std_air_pressure,
        )?;
        let carbon = ParcelCarbonForcing::new(
            vec![2300.0; n],
            vec![415.0; n],
            vec![2200.0; n],
            vec![2200.0; n],
        )?;
        let model = ParcelModel::new(params()?, forcing, mode)?
            .with_carbon(DicParameters::new(-1.0, -1.0)?, carbon)?;

        // Warmup
        black_box(model.run()?);

        let dur = median_time(|| {
            black_box(model.run().ok());
        });
        results.push((name, n, dur));
    }
    Ok(results)
}

fn main() -> MetabResult<()> {
    env_logger::init();

    println!("streammetab Core Benchmarks");
    println!("============================================================");
    println!("{:<18} {:>6}   {:>12}", "Model", "N", "Median (ms)");
    println!("--------------------------------------------");

    let day = STEPS_PER_DAY;
    let mut all_results: BenchRows = Vec::new();

    let long = [30 * day, 365 * day];
    let short = [day, 7 * day];
    all_results.extend(bench_oxygen(Scheme::ForwardEuler, "do-euler", &long)?);
    all_results.extend(bench_oxygen(Scheme::CrankNicolson, "do-cn", &long)?);
    all_results.extend(bench_carbon(Scheme::ForwardEuler, "dic-euler", &short)?);
    all_results.extend(bench_carbon(Scheme::CrankNicolson, "dic-cn", &short)?);
    all_results.extend(bench_parcels(ParcelMode::OneStep, "parcel-one", &short)?);
    all_results.extend(bench_parcels(
        ParcelMode::MultiStep {
            substeps: 10,
            scheme: Scheme::CrankNicolson,
        },
        "parcel-multi",
        &[day],
    )?);

    for (model, n, dur) in &all_results {
        let ms = dur.as_secs_f64() * 1000.0;
        println!("{:<18} {:>6}      {:>8.2}", model, n, ms);
    }

    println!("============================================================");
    Ok(())
}
