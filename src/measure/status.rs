//! User-facing status line.

use std::fmt;

/// Status shown to the user. Rendered with [`fmt::Display`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    /// No session yet.
    Initializing,
    /// Session active, waiting for the first surface and tap.
    DetectSurfaces,
    /// First point recorded.
    TapSecondPoint,
    /// Both points recorded; distance in meters.
    Distance(f64),
    /// Tap arrived while no surface was under the reticle.
    NoSurfaceDetected,
    /// Measurement cleared.
    Reset,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => f.write_str("Initializing AR session..."),
            Self::DetectSurfaces => {
                f.write_str("Move your device to detect surfaces, then tap first point.")
            }
            Self::TapSecondPoint => f.write_str("Tap second point to measure distance."),
            Self::Distance(meters) => write!(f, "Distance: {} m", format_distance(*meters)),
            Self::NoSurfaceDetected => {
                f.write_str("No surface detected. Move your device to find a surface.")
            }
            Self::Reset => f.write_str("Tap first point on a surface."),
        }
    }
}

/// Meters with two decimals, exact ties rounded away from zero. Rust float
/// formatting ignores locale, so the decimal separator is always '.'.
pub fn format_distance(meters: f64) -> String {
    // `{:.2}` alone rounds ties to even (0.125 -> "0.12").
    format!("{:.2}", (meters * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_format() {
        assert_eq!(Status::Distance(1.0).to_string(), "Distance: 1.00 m");
        assert_eq!(Status::Distance(5.0).to_string(), "Distance: 5.00 m");
        assert_eq!(Status::Distance(0.123).to_string(), "Distance: 0.12 m");
        assert_eq!(Status::Distance(2.0 / 3.0).to_string(), "Distance: 0.67 m");
    }

    #[test]
    fn test_distance_ties_round_up() {
        assert_eq!(format_distance(0.125), "0.13");
        assert_eq!(format_distance(1.125), "1.13");
        assert_eq!(format_distance(0.375), "0.38");
        // 1.005 is stored just below the tie.
        assert_eq!(format_distance(1.005), "1.00");
    }

    #[test]
    fn test_messages_are_distinct() {
        let all = [
            Status::Initializing,
            Status::DetectSurfaces,
            Status::TapSecondPoint,
            Status::Distance(0.0),
            Status::NoSurfaceDetected,
            Status::Reset,
        ];
        let texts: std::collections::HashSet<String> = all.iter().map(|s| s.to_string()).collect();
        assert_eq!(texts.len(), all.len());
    }
}
