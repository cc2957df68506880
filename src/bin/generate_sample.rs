use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// One synthetic vehicle, serialised with the dashboard's header names.
#[derive(Debug, Serialize)]
struct Car {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "MPG")]
    mpg: f64,
    #[serde(rename = "Cylinders")]
    cylinders: i64,
    #[serde(rename = "Horsepower")]
    horsepower: f64,
    #[serde(rename = "Weight")]
    weight: f64,
    #[serde(rename = "Model Year")]
    model_year: i64,
    #[serde(rename = "Origin")]
    origin: &'static str,
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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // (origin, makes, cylinder options, baseline mpg in 1970)
    let regions: [(&str, &[&str], &[i64], f64); 3] = [
        ("American", &["chevrolet", "ford", "plymouth", "amc", "dodge"], &[4, 6, 8, 8], 15.0),
        ("European", &["volkswagen", "peugeot", "audi", "volvo", "fiat"], &[4, 4, 5, 6], 23.0),
        ("Japanese", &["toyota", "datsun", "honda", "mazda", "subaru"], &[3, 4, 4, 6], 25.0),
    ];

    let mut cars = Vec::new();
    for year in 1970..=1982i64 {
        for &(origin, makes, cylinder_options, base_mpg) in &regions {
            let n = if origin == "American" { 16 } else { 7 };
            for i in 0..n {
                let cylinders = *rng.pick(cylinder_options);
                let horsepower = (22.0 * cylinders as f64 + rng.gauss(0.0, 12.0)).max(46.0).round();
                let weight = (1400.0 + 6.5 * horsepower + rng.gauss(0.0, 180.0)).round();
                let trend = 0.8 * (year - 1970) as f64;
                let mpg = (base_mpg + trend - 0.9 * (cylinders - 4) as f64 + rng.gauss(0.0, 2.5))
                    .clamp(9.0, 46.6);
                cars.push(Car {
                    name: format!("{} model-{}{:02}", rng.pick(makes), year % 100, i),
                    mpg: (mpg * 10.0).round() / 10.0,
                    cylinders,
                    horsepower,
                    weight,
                    model_year: year,
                    origin,
                });
            }
        }
    }

    // Write CSV
    let csv_path = "sample_cars.csv";
    let mut writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    for car in &cars {
        writer.serialize(car).expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV file");

    // Build Arrow arrays
    let schema = Arc::new(Schema::new(vec![
        Field::new("Name", DataType::Utf8, false),
        Field::new("MPG", DataType::Float64, false),
        Field::new("Cylinders", DataType::Int64, false),
        Field::new("Horsepower", DataType::Float64, false),
        Field::new("Weight", DataType::Float64, false),
        Field::new("Model Year", DataType::Int64, false),
        Field::new("Origin", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                cars.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(cars.iter().map(|c| c.mpg).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(cars.iter().map(|c| c.cylinders).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(
                cars.iter().map(|c| c.horsepower).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(cars.iter().map(|c| c.weight).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(
                cars.iter().map(|c| c.model_year).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                cars.iter().map(|c| c.origin).collect::<Vec<_>>(),
            )),
        ],
    )
    .expect("Failed to create RecordBatch");

    // Write Parquet
    let parquet_path = "sample_cars.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!("Wrote {} cars to {csv_path} and {parquet_path}", cars.len());
}
