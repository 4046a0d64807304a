//! WHO 2006 velocity tables compiled into the binary.

macro_rules! who2006 {
    ($($stem:literal),+ $(,)?) => {
        &[$(($stem, include_str!(concat!("../../../data/who2006/", $stem, ".csv")))),+]
    };
}

/// `(file stem, CSV source)` pairs; the stem encodes `{kind}_{sex}_{interval}`.
pub(crate) const WHO_2006_TABLES: &[(&str, &str)] = who2006![
    "weight_male_1mo",
    "weight_male_2mo",
    "weight_male_3mo",
    "weight_male_4mo",
    "weight_male_6mo",
    "weight_female_1mo",
    "weight_female_2mo",
    "weight_female_3mo",
    "weight_female_4mo",
    "weight_female_6mo",
    "length_male_2mo",
    "length_male_3mo",
    "length_male_4mo",
    "length_male_6mo",
    "length_female_2mo",
    "length_female_3mo",
    "length_female_4mo",
    "length_female_6mo",
];
