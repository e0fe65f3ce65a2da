use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

/// Write a synthetic cube (a bright blob with a drifting emission line) as a
/// long-format parquet table.
#[derive(Debug, Parser)]
#[command(name = "generate_sample")]
struct Args {
    /// Output file
    #[arg(short, long, default_value = "sample_cube.parquet")]
    output: PathBuf,

    /// Cube shape
    #[arg(long, num_args = 3, value_names = ["NX", "NY", "NZ"], default_values_t = [48, 48, 64])]
    shape: Vec<usize>,

    /// Noise standard deviation
    #[arg(long, default_value_t = 0.02)]
    noise: f64,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Deterministic Gaussian noise from a SplitMix64 stream.
struct Noise {
    counter: u64,
    spare: Option<f64>,
}

impl Noise {
    fn seeded(seed: u64) -> Self {
        Noise {
            counter: seed,
            spare: None,
        }
    }

    fn uniform(&mut self) -> f64 {
        self.counter = self.counter.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.counter;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        // 53 high bits → [0, 1)
        (z >> 11) as f64 * f64::EPSILON / 2.0
    }

    /// Box-Muller, keeping the second variate for the next call.
    fn normal(&mut self, std_dev: f64) -> f64 {
        if let Some(z) = self.spare.take() {
            return std_dev * z;
        }
        let radius = (-2.0 * self.uniform().max(f64::MIN_POSITIVE).ln()).sqrt();
        let angle = std::f64::consts::TAU * self.uniform();
        self.spare = Some(radius * angle.sin());
        std_dev * radius * angle.cos()
    }
}

/// Sample value at 1-based voxel `(i, j, k)`.
///
/// Continuum falls off from the cube centre; an emission line centred at a
/// `k` that shifts with `i` gives the spectra some structure.
fn voxel_value(
    (i, j, k): (usize, usize, usize),
    shape: [usize; 3],
    noise_source: &mut Noise,
    noise: f64,
) -> f64 {
    let [nx, ny, nz] = shape.map(|n| n as f64);
    let (x, y, z) = (i as f64, j as f64, k as f64);
    let spatial = gaussian(x, nx / 2.0, nx / 6.0, 1.0) * gaussian(y, ny / 2.0, ny / 6.0, 1.0);
    let line_centre = nz * (0.35 + 0.3 * x / nx);
    let line = gaussian(z, line_centre, nz / 20.0, 4.0);
    let continuum = 0.2 + 0.1 * z / nz;
    spatial * (continuum + line) + 0.01 + noise_source.normal(noise)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let shape: [usize; 3] = args
        .shape
        .as_slice()
        .try_into()
        .context("shape needs three values")?;
    let [nx, ny, nz] = shape;
    let mut noise = Noise::seeded(args.seed);

    let total = nx * ny * nz;
    let mut i_col = Vec::with_capacity(total);
    let mut j_col = Vec::with_capacity(total);
    let mut k_col = Vec::with_capacity(total);
    let mut values = Vec::with_capacity(total);

    for i in 1..=nx {
        for j in 1..=ny {
            for k in 1..=nz {
                i_col.push(i32::try_from(i)?);
                j_col.push(i32::try_from(j)?);
                k_col.push(i32::try_from(k)?);
                values.push(voxel_value((i, j, k), shape, &mut noise, args.noise));
            }
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("i", DataType::Int32, false),
        Field::new("j", DataType::Int32, false),
        Field::new("k", DataType::Int32, false),
        Field::new("value", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int32Array::from(i_col)),
            Arc::new(Int32Array::from(j_col)),
            Arc::new(Int32Array::from(k_col)),
            Arc::new(Float64Array::from(values)),
        ],
    )
    .context("Failed to create RecordBatch")?;

    // Write Parquet
    let file = std::fs::File::create(&args.output).context("Failed to create output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("Failed to create writer")?;
    writer.write(&batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;

    println!(
        "Wrote {nx}×{ny}×{nz} cube ({total} voxels) to {}",
        args.output.display()
    );
    Ok(())
}
