//! Plant record generator.
//!
//! # Responsibility
//! - Produce `count` schema-consistent records plus the sentinel.
//! - Keep every random decision behind the injected [`RandomSource`].
//!
//! # Invariants
//! - Output length is always `count + 1`; the sentinel is last.
//! - Polygons of generated records always have four points.
//! - Gene codes are ten symbols over `A/T/G/C`.

use super::lexicon::{
    pick, DNA_BASES, FAMILIES, HABITATS, PLANT_NAMES, SCIENTIFIC_PREFIXES, SCIENTIFIC_SUFFIXES,
    TRAITS,
};
use crate::model::plant::{GeoPoint, IucnStatus, PlantRecord, SoilComposition};
use crate::rng::RandomSource;

/// Id of the record that forces the critical failure path.
pub const SENTINEL_ID: &str = "T-404S";
/// Name of the sentinel record; a query containing it is critical.
pub const SENTINEL_NAME: &str = "CRITICAL_ERROR_TRIGGER";
/// Query token that is critical when matched exactly (case-insensitive).
pub const TRIGGER_TOKEN: &str = "404S";

const GENE_CODE_LEN: usize = 10;
const LAT_BAND: (f64, f64) = (37.0, 42.0);
const LON_BAND: (f64, f64) = (27.0, 42.0);
const POLYGON_OFFSETS: [(f64, f64); 4] = [(0.1, 0.1), (0.2, -0.1), (-0.1, -0.2), (-0.2, 0.2)];
/// Names beyond this index get an id suffix so they stay distinguishable.
const NAME_SUFFIX_AFTER: usize = 15;
const TRAIT_KEEP_ABOVE: f64 = 0.4;

// Draw order matters for the cumulative sum; weights add up to 1.
const IUCN_WEIGHTS: [(IucnStatus, f64); 6] = [
    (IucnStatus::Cr, 0.10),
    (IucnStatus::En, 0.15),
    (IucnStatus::Vu, 0.25),
    (IucnStatus::Nt, 0.25),
    (IucnStatus::Lc, 0.20),
    (IucnStatus::Ex, 0.05),
];

/// Generates `count` records followed by [`sentinel_record`].
pub fn generate(count: usize, rng: &mut dyn RandomSource) -> Vec<PlantRecord> {
    let mut records = (0..count)
        .map(|index| generate_record(index, rng))
        .collect::<Vec<_>>();
    records.push(sentinel_record());
    log::debug!(
        "event=dataset_generated module=dataset status=ok records={}",
        records.len()
    );
    records
}

/// The fixed error-trigger record.
pub fn sentinel_record() -> PlantRecord {
    PlantRecord {
        id: SENTINEL_ID.to_string(),
        name: SENTINEL_NAME.to_string(),
        scientific_name: "Simulatio errorus".to_string(),
        family: "Fatalaceae".to_string(),
        habitat: "System Memory".to_string(),
        iucn_status: IucnStatus::Ex,
        coordinates: GeoPoint::new(0.0, 0.0),
        distribution_polygon: Vec::new(),
        elevation_m: 0,
        gene_code: "DEADBEEF".to_string(),
        dna_segments: "ERR-404-S".to_string(),
        rna_signature: "FATAL".to_string(),
        traits: vec!["System Lockout".to_string()],
        protein_folding_score: 0.01,
        anomaly_index: 1.0,
        gene_mutations: 999,
        soil: SoilComposition {
            ph: 1.0,
            nitrogen: 0.0,
            phosphorus: 0.0,
        },
    }
}

/// Weighted IUCN draw; falls back to LC when rounding leaves no match.
pub fn draw_iucn_status(rng: &mut dyn RandomSource) -> IucnStatus {
    let roll = rng.next_f64();
    let mut cumulative = 0.0;
    for (status, weight) in IUCN_WEIGHTS {
        cumulative += weight;
        if roll <= cumulative {
            return status;
        }
    }
    IucnStatus::Lc
}

/// Ten random symbols over `A/T/G/C`.
pub fn draw_gene_code(rng: &mut dyn RandomSource) -> String {
    (0..GENE_CODE_LEN)
        .map(|_| DNA_BASES[rng.next_below(DNA_BASES.len() as u64) as usize])
        .collect()
}

fn generate_record(index: usize, rng: &mut dyn RandomSource) -> PlantRecord {
    let number = format!("{:03}", index + 1);
    let base_name = pick(PLANT_NAMES, index);
    let name = if index > NAME_SUFFIX_AFTER {
        format!("{base_name} T{number}")
    } else {
        base_name.to_string()
    };

    let lat = round_to(rng.next_range_f64(LAT_BAND.0, LAT_BAND.1), 4);
    let lon = round_to(rng.next_range_f64(LON_BAND.0, LON_BAND.1), 4);
    let distribution_polygon = POLYGON_OFFSETS
        .iter()
        .map(|(dlat, dlon)| GeoPoint::new(lat + dlat, lon + dlon))
        .collect();

    let gene_code = draw_gene_code(rng);
    let dna_segments = format!(
        "{}-{}-{}",
        &gene_code[0..3],
        &gene_code[3..6],
        &gene_code[6..10]
    );

    PlantRecord {
        id: format!("T-{number}"),
        name,
        scientific_name: format!(
            "{} {}",
            pick(SCIENTIFIC_PREFIXES, index),
            pick(SCIENTIFIC_SUFFIXES, index)
        ),
        family: pick(FAMILIES, index).to_string(),
        habitat: pick(HABITATS, index).to_string(),
        iucn_status: draw_iucn_status(rng),
        coordinates: GeoPoint::new(lat, lon),
        distribution_polygon,
        elevation_m: 100 + rng.next_below(2500) as u32,
        gene_code,
        dna_segments,
        rna_signature: format!("R{}S{}", rng.next_below(99), rng.next_below(99)),
        traits: TRAITS
            .iter()
            .filter(|_| rng.next_f64() > TRAIT_KEEP_ABOVE)
            .map(|value| (*value).to_string())
            .collect(),
        protein_folding_score: round_to(rng.next_f64(), 2),
        anomaly_index: round_to(rng.next_f64(), 3),
        gene_mutations: rng.next_below(20) as u32,
        soil: SoilComposition {
            ph: round_to(rng.next_range_f64(6.0, 8.0), 1),
            nitrogen: round_to(rng.next_range_f64(0.0, 0.5), 2),
            phosphorus: round_to(rng.next_range_f64(0.0, 0.3), 2),
        },
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::{draw_gene_code, draw_iucn_status, generate, round_to, SENTINEL_ID};
    use crate::model::plant::IucnStatus;
    use crate::rng::{ScriptedRandom, StdRandom};

    #[test]
    fn iucn_draw_uses_cumulative_weights() {
        let cases = [
            (0.0, IucnStatus::Cr),
            (0.10, IucnStatus::Cr),
            (0.11, IucnStatus::En),
            (0.30, IucnStatus::Vu),
            (0.70, IucnStatus::Nt),
            (0.90, IucnStatus::Lc),
            (0.97, IucnStatus::Ex),
        ];
        for (roll, expected) in cases {
            let mut rng = ScriptedRandom::constant(roll);
            assert_eq!(draw_iucn_status(&mut rng), expected, "roll {roll}");
        }
    }

    #[test]
    fn gene_code_uses_four_symbol_alphabet() {
        let mut rng = ScriptedRandom::new([0.0, 0.3, 0.6, 0.9], 0.0);
        let code = draw_gene_code(&mut rng);
        assert_eq!(code, "ATGCAAAAAA");
    }

    #[test]
    fn names_past_fifteen_carry_id_suffix() {
        let mut rng = StdRandom::seeded(3);
        let records = generate(17, &mut rng);
        assert_eq!(records[15].name, "Purple Violet");
        assert_eq!(records[16].name, "Anatolian Lily T017");
        assert_eq!(records.last().map(|r| r.id.as_str()), Some(SENTINEL_ID));
    }

    #[test]
    fn round_to_truncates_precision() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(0.9996, 3), 1.0);
    }
}
