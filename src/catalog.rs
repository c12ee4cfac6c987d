//! Garment catalog
//!
//! Static lookup of garment types and their standard measure labels.
//! The order form offers these labels when a garment type is selected;
//! free-text labels are still accepted by the store.

/// Standard measures per garment type, in the order the form presents them.
pub const MEASURES_BY_TYPE: &[(&str, &[&str])] = &[
    ("Chemise", &["Poitrine", "Manche", "Longueur"]),
    ("Pantalon", &["Taille", "Hanche", "Longueur"]),
    ("Robe", &["Poitrine", "Taille", "Hanche", "Longueur"]),
    ("Veste", &["Poitrine", "Taille", "Longueur", "Épaules"]),
];

/// All known garment types.
pub fn garment_types() -> impl Iterator<Item = &'static str> {
    MEASURES_BY_TYPE.iter().map(|(t, _)| *t)
}

/// Standard measure labels for a garment type, if it is a known one.
pub fn measures_for(cloth_type: &str) -> Option<&'static [&'static str]> {
    MEASURES_BY_TYPE
        .iter()
        .find(|(t, _)| t.eq_ignore_ascii_case(cloth_type))
        .map(|(_, measures)| *measures)
}
