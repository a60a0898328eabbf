//! Writes a synthetic quasar-like spectrum with a handful of cosmic-ray hits,
//! for trying out `bpm`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;

/// Generate a noisy test spectrum with injected cosmic rays.
#[derive(Parser)]
#[command(name = "generate_sample")]
#[command(about, long_about = None)]
struct Args {
    /// Where to write the ASCII table
    #[arg(default_value = "sample_spectrum.ascii")]
    output: PathBuf,

    /// Seed for the noise and cosmic-ray positions
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
}

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Power-law continuum with broad emission lines and narrow absorbers.
fn model_flux(
    wavelength: f64,
    emission: &[(f64, f64, f64)],
    absorption: &[(f64, f64, f64)],
) -> f64 {
    let continuum = 2.0 * (wavelength / 1450.0).powf(-1.5);
    let lines: f64 = emission
        .iter()
        .map(|&(mu, sigma, amp)| gaussian(wavelength, mu, sigma, amp))
        .sum();
    let transmission: f64 = absorption
        .iter()
        .map(|&(mu, sigma, depth)| 1.0 - gaussian(wavelength, mu, sigma, depth))
        .product();
    (continuum + lines) * transmission
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    // Observed frame, 0.5 Å sampling.
    let wavelengths: Vec<f64> = (0..4000).map(|i| 3800.0 + i as f64 * 0.5).collect();

    // (centre, sigma, amplitude) of C IV and C III] at z ≈ 1.6.
    let emission = [(4026.0, 18.0, 1.6), (4962.0, 22.0, 0.9)];
    // (centre, sigma, depth) of narrow absorbers.
    let absorption = [(4410.2, 0.8, 0.6), (4417.6, 0.8, 0.45), (5120.0, 1.1, 0.7)];

    let mut flux: Vec<f64> = Vec::with_capacity(wavelengths.len());
    let mut flux_err: Vec<f64> = Vec::with_capacity(wavelengths.len());
    for &w in &wavelengths {
        let model = model_flux(w, &emission, &absorption);
        let sigma = 0.03 + 0.02 * model.abs().sqrt();
        flux.push(model + rng.gauss(0.0, sigma));
        flux_err.push(sigma);
    }

    // Cosmic rays: one to three adjacent samples shot far above the model.
    let mut hits = Vec::new();
    for _ in 0..12 {
        let start = 20 + (rng.next_u64() % (wavelengths.len() as u64 - 40)) as usize;
        let width = 1 + (rng.next_u64() % 3) as usize;
        let height = 5.0 + 20.0 * rng.next_f64();
        for f in &mut flux[start..start + width] {
            *f += height;
        }
        hits.push((wavelengths[start], wavelengths[start + width - 1]));
    }

    let mut out = BufWriter::new(File::create(&args.output)?);
    writeln!(out, "# wavelength flux flux_err")?;
    for ((w, f), e) in wavelengths.iter().zip(&flux).zip(&flux_err) {
        writeln!(out, "{w} {f} {e}")?;
    }
    out.flush()?;

    println!(
        "Wrote {} samples to {}",
        wavelengths.len(),
        args.output.display()
    );
    println!("Injected cosmic rays (wavelength ranges):");
    for (lo, hi) in hits {
        println!("  {lo},{hi}");
    }
    Ok(())
}
