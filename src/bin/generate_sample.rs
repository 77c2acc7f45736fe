use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

use covidash::data::model::{DISEASE_COLUMNS, REQUIRED_COLUMNS};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `[0, n)`.
    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One synthetic patient row, in `REQUIRED_COLUMNS` order.
fn generate_patient(rng: &mut SimpleRng, epidemic_start: NaiveDate) -> Vec<String> {
    let age = rng.gauss(45.0, 18.0).round().clamp(0.0, 110.0) as i64;
    let sex = 1 + rng.below(2); // 1 = female, 2 = male

    // Comorbidity odds rise with age.
    let age_factor = (age as f64 / 100.0).min(1.0);
    let base_rates = [0.12, 0.04, 0.05, 0.02, 0.18, 0.05, 0.15, 0.03, 0.10];
    let diseases: Vec<i64> = base_rates
        .iter()
        .map(|base| {
            let p = base * (0.5 + 1.5 * age_factor);
            if rng.chance(p) {
                1
            } else {
                2 // coded "no"
            }
        })
        .collect();
    let disease_count = diseases.iter().filter(|&&d| d == 1).count() as f64;

    let icu = if rng.chance(0.05 + 0.05 * disease_count + 0.1 * age_factor) {
        1
    } else {
        2
    };
    let intubated = if icu == 1 {
        if rng.chance(0.6) {
            1
        } else {
            2
        }
    } else {
        97 // not applicable, never in intensive care
    };
    let deceased = rng.chance(0.02 + 0.08 * age_factor + if icu == 1 { 0.25 } else { 0.0 });
    let outcome = if deceased { 1 } else { 0 };

    let first_symptom = epidemic_start + Duration::days(rng.below(120) as i64);
    let admission = first_symptom + Duration::days(1 + rng.below(7) as i64);
    let death = if deceased {
        (admission + Duration::days(1 + rng.below(21) as i64))
            .format("%Y-%m-%d")
            .to_string()
    } else {
        // The convention in the source registries for "still alive".
        "9999-99-99".to_string()
    };

    let mut row = vec![
        age.to_string(),
        sex.to_string(),
        intubated.to_string(),
        outcome.to_string(),
        icu.to_string(),
    ];
    row.extend(diseases.iter().map(|d| d.to_string()));
    row.push(admission.format("%Y-%m-%d").to_string());
    row.push(first_symptom.format("%Y-%m-%d").to_string());
    row.push(death);
    debug_assert_eq!(row.len(), 5 + DISEASE_COLUMNS.len() + 3);
    row
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let n_patients = 500;
    let epidemic_start =
        NaiveDate::from_ymd_opt(2020, 3, 1).expect("valid hard-coded date");

    let output_path = "dataset.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;

    writer
        .write_record(REQUIRED_COLUMNS)
        .context("writing header")?;
    for _ in 0..n_patients {
        writer
            .write_record(generate_patient(&mut rng, epidemic_start))
            .context("writing patient row")?;
    }
    writer.flush().context("flushing output")?;

    println!("Wrote {n_patients} synthetic patient records to {output_path}");
    Ok(())
}
