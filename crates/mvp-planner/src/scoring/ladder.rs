/// Fallback ladder used when no benchmark row matches. Always scored as a
/// normal (higher is better) measure and never interpolated.
const DEFAULT_LADDER: &[(f64, u8)] = &[
    (95.0, 10),
    (90.0, 9),
    (85.0, 8),
    (80.0, 7),
    (75.0, 6),
    (70.0, 5),
    (60.0, 4),
    (50.0, 3),
    (40.0, 2),
];

pub(crate) fn default_decile(rate: f64) -> u8 {
    DEFAULT_LADDER
        .iter()
        .find(|(minimum, _)| rate >= *minimum)
        .map(|(_, decile)| *decile)
        .unwrap_or(1)
}
