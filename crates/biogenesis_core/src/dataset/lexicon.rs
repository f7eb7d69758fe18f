//! Fixed vocabularies indexed by `i mod len`.

pub(crate) const PLANT_NAMES: &[&str] = &[
    "Purple Violet",
    "Anatolian Lily",
    "Red Hill Thyme",
    "Sea Rose",
    "Rock Mint",
    "Golden Orchid",
    "Taurus Cedar",
    "Caucasus Tulip",
    "Ultra Geranium",
    "Caspian Hyacinth",
    "Aegean Daisy",
    "Quantum Alga",
    "Bio Sapling",
    "Genetic Rose",
    "Delta Grass",
];

pub(crate) const SCIENTIFIC_PREFIXES: &[&str] = &[
    "Viola", "Lilium", "Thymus", "Rosa", "Pinus", "Tulipa", "Quercus", "Algae", "Ficus",
    "Geranium",
];

pub(crate) const SCIENTIFIC_SUFFIXES: &[&str] = &[
    "alpina",
    "anatolica",
    "rubellus",
    "maritima",
    "montana",
    "aurea",
    "taurica",
    "caucasica",
    "quantum",
    "delta",
];

pub(crate) const FAMILIES: &[&str] = &[
    "Violaceae",
    "Liliaceae",
    "Lamiaceae",
    "Rosaceae",
    "Pinaceae",
    "Tulipaceae",
    "Fagaceae",
    "Algaesidae",
];

pub(crate) const HABITATS: &[&str] = &[
    "High Altitude Rock",
    "Humid Forest",
    "Red Soil Steppe",
    "Coastal Dunes",
    "Pine Woodland",
    "Lakeshore",
    "Volcanic Zone",
    "Mineral Deposit",
    "Simulated Habitat",
];

pub(crate) const TRAITS: &[&str] = &["Frost Hardy", "Drought Tolerant", "Fast Growing"];

pub(crate) const DNA_BASES: [char; 4] = ['A', 'T', 'G', 'C'];

/// Picks `items[index % len]`.
pub(crate) fn pick(items: &[&'static str], index: usize) -> &'static str {
    items[index % items.len()]
}
