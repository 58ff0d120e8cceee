//! Coordinate mapping from screen space to pitch
//!
//! Linear interpolation between ranges, plus the frequency ranges used
//! by each hand. Out-of-range inputs extrapolate; nothing is clamped.

/// A closed frequency interval in Hertz
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyRange {
    pub low: f64,
    pub high: f64,
}

impl FrequencyRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

/// C3..C4, followed live by the right wrist's horizontal position
pub const RIGHT_LIVE: FrequencyRange = FrequencyRange::new(130.81, 261.63);

/// Range used when a right-hand marker is recorded.
///
/// The upper bound differs from [`RIGHT_LIVE`]; recorded pitches have always
/// been tuned against 261.31 and existing compositions depend on it.
pub const RIGHT_TUNED: FrequencyRange = FrequencyRange::new(130.81, 261.31);

/// C4..C5, followed by the left wrist's vertical position
pub const LEFT: FrequencyRange = FrequencyRange::new(261.63, 523.25);

/// Map `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// `in_min` must differ from `in_max`.
pub fn map_range(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    debug_assert!(
        in_min != in_max,
        "degenerate input range [{in_min}, {in_max}]"
    );
    (value - in_min) / (in_max - in_min) * (out_max - out_min) + out_min
}

/// Map a screen coordinate in `[0, extent]` onto a frequency range
pub fn to_frequency(coordinate: f64, extent: f64, range: FrequencyRange) -> f64 {
    map_range(coordinate, 0.0, extent, range.low, range.high)
}
