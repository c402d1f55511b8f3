use anyhow::{Context, Result};
use serde::Serialize;

use peak_labeler::annotation::glycan::{GlycanComposition, OxoniumMarkers, N_CORE_LADDER};
use peak_labeler::annotation::ion::{mz_for, WATER_MASS};
use peak_labeler::Precursor;

const PEPTIDE_MASS: f64 = 1_585.7615;
const COMPOSITION: &str = "HexNAc(2)Hex(5)";
const PRECURSOR_CHARGE: u32 = 3;

#[derive(Serialize)]
struct PeakFile {
    precursor: Precursor,
    peaks: Vec<(f64, f64)>,
}

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

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }
}

/// Observed m/z: theoretical value shifted by a few ppm.
fn jitter(rng: &mut SimpleRng, mz: f64) -> f64 {
    mz * (1.0 + rng.uniform(-3.0, 3.0) / 1e6)
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let glycan: GlycanComposition = COMPOSITION.parse().context("parsing sample composition")?;
    let precursor_mass = PEPTIDE_MASS + glycan.mass();

    let mut peaks: Vec<(f64, f64)> = Vec::new();

    // Oxonium ions dominate the low-mass region
    for marker in OxoniumMarkers::builtin().as_slice() {
        if rng.next_f64() < 0.7 {
            peaks.push((jitter(&mut rng, marker.mz), rng.uniform(2e4, 1e5)));
        }
    }

    // Core ladder at charges 1 and 2, some with a water loss
    let mut mass = PEPTIDE_MASS;
    for step in 0..=N_CORE_LADDER.len() {
        if step > 0 {
            mass += N_CORE_LADDER[step - 1].mass();
        }
        for charge in 1..=2 {
            peaks.push((
                jitter(&mut rng, mz_for(mass, charge)),
                rng.uniform(5e3, 6e4),
            ));
            if rng.next_f64() < 0.3 {
                peaks.push((
                    jitter(&mut rng, mz_for(mass - WATER_MASS, charge)),
                    rng.uniform(1e3, 1e4),
                ));
            }
        }
    }

    // Precursor and its water loss
    for charge in 1..=PRECURSOR_CHARGE {
        peaks.push((
            jitter(&mut rng, mz_for(precursor_mass, charge)),
            rng.uniform(1e3, 3e4),
        ));
        peaks.push((
            jitter(&mut rng, mz_for(precursor_mass - WATER_MASS, charge)),
            rng.uniform(5e2, 5e3),
        ));
    }

    // Unexplained noise
    for _ in 0..150 {
        peaks.push((rng.uniform(100.0, 2_500.0), rng.uniform(50.0, 3e3)));
    }

    let file = PeakFile {
        precursor: Precursor {
            mass: precursor_mass,
            charge: PRECURSOR_CHARGE,
        },
        peaks,
    };

    let output_path = "sample_peaks.json";
    let json = serde_json::to_string_pretty(&file).context("serializing sample")?;
    std::fs::write(output_path, json).context("writing sample file")?;

    println!(
        "Wrote {} peaks to {output_path} (try --peptide-mass {PEPTIDE_MASS} --composition '{COMPOSITION}')",
        file.peaks.len()
    );
    Ok(())
}
