//! Report sources: JSON-lines files and a synthetic generator.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use contracts::{GeoPoint, ParkBlueprint, RawReport, ReporterInfo};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

const FALLBACK_SPECIES: &[&str] = &["elephant", "deer", "monkey"];

/// `{Species}` is replaced with the capitalised species name
const TEMPLATES: &[&str] = &[
    "{Species} observed limping near riverbank.",
    "{Species} trapped in a snare by the forest edge.",
    "{Species} collapsed beside the jeep track.",
    "{Species} stranded on a sandbar after heavy rain.",
    "{Species} with a visible wound near the waterhole.",
];

/// Parse one report per non-empty line
pub fn read_reports(path: &Path) -> Result<Vec<RawReport>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read reports from {}", path.display()))?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("{}:{}: invalid report", path.display(), idx + 1))
        })
        .collect()
}

/// Reports scattered around the blueprint's hotspots (or the park centre)
pub fn synthetic_reports(blueprint: &ParkBlueprint, count: usize, seed: Option<u64>) -> Vec<RawReport> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    (0..count)
        .map(|_| {
            let (origin, species) = match blueprint.hotspots.choose(&mut rng) {
                Some(hotspot) => {
                    let species = hotspot
                        .common_species
                        .choose(&mut rng)
                        .cloned()
                        .unwrap_or_else(|| random_species(&mut rng));
                    (hotspot.location, species)
                }
                None => (blueprint.park.center, random_species(&mut rng)),
            };

            let gps = GeoPoint::new(
                origin.lat + rng.random_range(-0.02..0.02),
                origin.lon + rng.random_range(-0.02..0.02),
            );
            let template = TEMPLATES.choose(&mut rng).copied().unwrap_or(TEMPLATES[0]);
            let reliability: f64 = rng.random_range(0.6..0.95);

            RawReport {
                text: template.replace("{Species}", &capitalise(&species)),
                gps,
                reporter: ReporterInfo {
                    kind: "ranger".to_string(),
                    reliability: (reliability * 100.0).round() / 100.0,
                },
            }
        })
        .collect()
}

fn random_species(rng: &mut StdRng) -> String {
    FALLBACK_SPECIES
        .choose(rng)
        .copied()
        .unwrap_or("elephant")
        .to_string()
}

fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
