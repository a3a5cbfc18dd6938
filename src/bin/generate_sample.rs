//! Writes demo inputs for the viewer:
//!
//! * `sample_survey.json` – a two-sheet workbook (`main` + `auxiliary`)
//! * `sample_main.parquet` – the main sheet alone, as a single-sheet file

use std::sync::Arc;

use anyhow::Context;
use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use rusty_compass::data::model::{SurveyRecord, SurveyTable, FIELDS};
use rusty_compass::diagnostics::LogSink;
use rusty_compass::pipeline::format_vector;
use rusty_compass::Orchestrator;

/// Field strength at the site, nT (north, east, down).
const AMBIENT_FIELD: [f64; 3] = [27_500.0, -1_800.0, 44_200.0];

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

/// Stations down a slightly deviated borehole. Casing interference grows
/// with depth, so the main vectors drift away from the ambient field.
fn borehole_stations(rng: &mut SimpleRng, count: usize) -> Vec<SurveyRecord> {
    (0..count)
        .map(|i| {
            let depth = 100.0 + 50.0 * i as f64;
            let drift = depth / 2_000.0;
            SurveyRecord::from_values([
                Some(116.3912 + 0.00002 * i as f64),
                Some(39.9075 - 0.00001 * i as f64),
                Some(depth),
                Some(45.0),
                Some(rng.gauss(AMBIENT_FIELD[0] + 900.0 * drift, 40.0)),
                Some(rng.gauss(AMBIENT_FIELD[1] - 600.0 * drift, 40.0)),
                Some(rng.gauss(AMBIENT_FIELD[2] + 1_500.0 * drift, 40.0)),
            ])
        })
        .collect()
}

/// Surface reference stations around the well, with a few spikes and one
/// blank reading.
fn reference_stations(rng: &mut SimpleRng, count: usize) -> Vec<SurveyRecord> {
    let mut records: Vec<SurveyRecord> = (0..count)
        .map(|_| {
            SurveyRecord::from_values([
                Some(rng.gauss(116.3912, 0.002)),
                Some(rng.gauss(39.9075, 0.002)),
                Some(0.0),
                Some(rng.gauss(45.0, 2.0)),
                Some(rng.gauss(AMBIENT_FIELD[0], 15.0)),
                Some(rng.gauss(AMBIENT_FIELD[1], 15.0)),
                Some(rng.gauss(AMBIENT_FIELD[2], 15.0)),
            ])
        })
        .collect();

    // Injected outliers: a power line and a parked truck.
    if let Some(r) = records.get_mut(3) {
        r.y = r.y.map(|v| v + 4_000.0);
    }
    if let Some(r) = records.get_mut(11) {
        r.x = r.x.map(|v| v - 6_500.0);
        r.z = r.z.map(|v| v + 3_000.0);
    }
    // Incomplete row, ignored by the correction.
    if let Some(r) = records.get_mut(7) {
        r.elevation = None;
    }
    records
}

fn write_parquet(path: &str, records: &[SurveyRecord]) -> anyhow::Result<()> {
    let fields: Vec<Field> = FIELDS
        .iter()
        .map(|name| Field::new(*name, DataType::Float64, true))
        .collect();
    let columns: Vec<ArrayRef> = (0..FIELDS.len())
        .map(|col| {
            let values: Vec<Option<f64>> = records.iter().map(|r| r.values()[col]).collect();
            Arc::new(Float64Array::from(values)) as ArrayRef
        })
        .collect();

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns)
        .context("Failed to create RecordBatch")?;

    let file = std::fs::File::create(path).with_context(|| format!("Failed to create {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut rng = SimpleRng::new(42);

    let main_records = borehole_stations(&mut rng, 24);
    let aux_records = reference_stations(&mut rng, 30);

    let json_path = "sample_survey.json";
    let doc = serde_json::json!({
        "main": main_records,
        "auxiliary": aux_records,
    });
    std::fs::write(json_path, serde_json::to_string_pretty(&doc)?)
        .with_context(|| format!("Failed to write {json_path}"))?;
    println!(
        "Wrote {} main and {} auxiliary stations to {json_path}",
        main_records.len(),
        aux_records.len()
    );

    let parquet_path = "sample_main.parquet";
    write_parquet(parquet_path, &main_records)?;
    println!("Wrote {} main stations to {parquet_path}", main_records.len());

    // Dry run so the sample is known to correct cleanly.
    let report = Orchestrator::default()
        .run(
            &SurveyTable::new(main_records),
            &SurveyTable::new(aux_records),
            &mut LogSink,
        )
        .context("sample data does not correct cleanly")?;
    println!(
        "Auxiliary reference {} from {} stations",
        format_vector(&report.auxiliary_mean),
        report.fields.auxiliary.len()
    );

    Ok(())
}
