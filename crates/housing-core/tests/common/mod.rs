#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Value, json};

use housing_model::Record;

pub const OCEAN: [&str; 4] = ["<1H OCEAN", "INLAND", "NEAR BAY", "NEAR OCEAN"];

pub struct Row {
    pub longitude: f64,
    pub latitude: f64,
    pub housing_median_age: f64,
    pub total_rooms: f64,
    pub total_bedrooms: Option<f64>,
    pub population: f64,
    pub households: f64,
    pub median_income: f64,
    pub ocean_proximity: &'static str,
    pub median_house_value: f64,
}

/// Synthetic rows whose value depends mostly on income and location class.
pub fn housing_rows(n: usize, seed: u64) -> Vec<Row> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|idx| {
            let median_income = rng.gen_range(0.5..9.5);
            let households = rng.gen_range(100.0..800.0);
            let total_rooms = households * rng.gen_range(3.0..7.0);
            let population = households * rng.gen_range(2.0..4.0);
            let ocean_proximity = OCEAN[idx % OCEAN.len()];
            let location_bonus = match ocean_proximity {
                "INLAND" => -40_000.0,
                "NEAR BAY" => 30_000.0,
                _ => 10_000.0,
            };
            Row {
                longitude: rng.gen_range(-124.0..-114.0),
                latitude: rng.gen_range(32.0..42.0),
                housing_median_age: rng.gen_range(1.0..52.0),
                total_rooms,
                total_bedrooms: (idx % 25 != 0).then(|| total_rooms * 0.2),
                population,
                households,
                median_income,
                ocean_proximity,
                median_house_value: 40_000.0
                    + 45_000.0 * median_income
                    + location_bonus
                    + rng.gen_range(-5_000.0..5_000.0),
            }
        })
        .collect()
}

pub fn write_csv(path: &Path, rows: &[Row]) {
    let mut text = String::from(
        "longitude,latitude,housing_median_age,total_rooms,total_bedrooms,population,households,median_income,median_house_value,ocean_proximity\n",
    );
    for row in rows {
        let bedrooms = row
            .total_bedrooms
            .map(|value| value.to_string())
            .unwrap_or_default();
        writeln!(
            text,
            "{},{},{},{},{},{},{},{},{},{}",
            row.longitude,
            row.latitude,
            row.housing_median_age,
            row.total_rooms,
            bedrooms,
            row.population,
            row.households,
            row.median_income,
            row.median_house_value,
            row.ocean_proximity
        )
        .unwrap();
    }
    fs::write(path, text).unwrap();
}

pub fn record(row: &Row) -> Record {
    let value = json!({
        "longitude": row.longitude,
        "latitude": row.latitude,
        "housing_median_age": row.housing_median_age,
        "total_rooms": row.total_rooms,
        "total_bedrooms": row.total_bedrooms,
        "population": row.population,
        "households": row.households,
        "median_income": row.median_income,
        "ocean_proximity": row.ocean_proximity,
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}
