use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// (neighbourhood, centre latitude, centre longitude, price multiplier)
const NEIGHBOURHOODS: &[(&str, f64, f64, f64)] = &[
    ("Mission", 37.7599, -122.4148, 1.0),
    ("Castro/Upper Market", 37.7609, -122.4350, 1.1),
    ("Nob Hill", 37.7930, -122.4161, 1.2),
    ("Marina", 37.8037, -122.4368, 1.4),
    ("South of Market", 37.7785, -122.4056, 1.1),
    ("Haight Ashbury", 37.7692, -122.4481, 0.9),
    ("Noe Valley", 37.7502, -122.4337, 1.2),
    ("Bernal Heights", 37.7389, -122.4152, 0.9),
    ("Outer Sunset", 37.7550, -122.4940, 0.8),
    ("Western Addition", 37.7813, -122.4321, 1.0),
    ("Downtown/Civic Center", 37.7813, -122.4167, 0.9),
    ("Chinatown", 37.7941, -122.4078, 0.8),
    ("Pacific Heights", 37.7925, -122.4382, 1.6),
    ("Excelsior", 37.7244, -122.4272, 0.7),
];

/// (room type, relative weight, base nightly price)
const ROOM_TYPES: &[(&str, f64, f64)] = &[
    ("Entire home/apt", 0.6, 220.0),
    ("Private room", 0.3, 110.0),
    ("Hotel room", 0.05, 180.0),
    ("Shared room", 0.05, 55.0),
];

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// One output row, with the same loose formatting as the public exports.
#[derive(Debug, Serialize)]
struct Row {
    id: i64,
    name: String,
    neighbourhood_cleansed: String,
    room_type: String,
    price: String,
    estimated_revenue_l365d: String,
    availability_365: i64,
    number_of_reviews: i64,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

fn pick_room(rng: &mut SimpleRng) -> (&'static str, f64) {
    let mut roll = rng.next_f64();
    for &(name, weight, base) in ROOM_TYPES {
        if roll < weight {
            return (name, base);
        }
        roll -= weight;
    }
    (ROOM_TYPES[0].0, ROOM_TYPES[0].2)
}

fn format_dollars(v: f64) -> String {
    let cents = (v * 100.0).round() as i64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${grouped}.{:02}", cents % 100)
}

fn generate(n: usize, rng: &mut SimpleRng) -> Vec<Row> {
    (0..n)
        .map(|id| {
            let (hood, lat, lon, mult) = NEIGHBOURHOODS[rng.below(NEIGHBOURHOODS.len())];
            let (room, base) = pick_room(rng);

            let price = (base * mult * rng.gauss(0.0, 0.45).exp()).max(25.0).round();
            let availability = rng.below(366) as i64;
            let occupancy = (1.0 - availability as f64 / 365.0).clamp(0.05, 0.95);
            let revenue = price * 365.0 * occupancy * rng.gauss(0.6, 0.1).clamp(0.2, 1.0);
            let reviews = (rng.gauss(0.0, 1.2).exp() * 20.0 * occupancy) as i64;

            let has_coords = !rng.chance(0.03);
            Row {
                id: id as i64 + 1,
                name: format!("{room} in {hood}"),
                neighbourhood_cleansed: hood.to_string(),
                room_type: room.to_string(),
                price: format_dollars(price),
                estimated_revenue_l365d: if rng.chance(0.05) {
                    "N/A".to_string()
                } else {
                    format!("{revenue:.0}")
                },
                availability_365: availability,
                number_of_reviews: reviews,
                latitude: has_coords.then(|| lat + rng.gauss(0.0, 0.004)),
                longitude: has_coords.then(|| lon + rng.gauss(0.0, 0.004)),
            }
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating output file")?;
    for row in rows {
        writer.serialize(row).context("writing row")?;
    }
    writer.flush().context("flushing output")?;
    Ok(())
}

fn string_column(rows: &[Row], f: fn(&Row) -> &str) -> ArrayRef {
    Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("neighbourhood_cleansed", DataType::Utf8, false),
        Field::new("room_type", DataType::Utf8, false),
        Field::new("price", DataType::Utf8, false),
        Field::new("estimated_revenue_l365d", DataType::Utf8, false),
        Field::new("availability_365", DataType::Int64, false),
        Field::new("number_of_reviews", DataType::Int64, false),
        Field::new("latitude", DataType::Float64, true),
        Field::new("longitude", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(rows.iter().map(|r| r.id).collect::<Vec<_>>())),
            string_column(rows, |r| r.name.as_str()),
            string_column(rows, |r| r.neighbourhood_cleansed.as_str()),
            string_column(rows, |r| r.room_type.as_str()),
            string_column(rows, |r| r.price.as_str()),
            string_column(rows, |r| r.estimated_revenue_l365d.as_str()),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.availability_365).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.number_of_reviews).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.latitude).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.longitude).collect::<Vec<_>>(),
            )),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let output = std::env::args().nth(1).unwrap_or_else(|| "listings.csv".to_string());
    let path = Path::new(&output);

    let mut rng = SimpleRng::new(42);
    let rows = generate(2500, &mut rng);

    match path.extension().and_then(|e| e.to_str()) {
        Some("parquet") | Some("pq") => write_parquet(path, &rows)?,
        _ => write_csv(path, &rows)?,
    }

    println!("Wrote {} listings to {output}", rows.len());
    Ok(())
}
