//! GPA presentation helpers (4.0 scale).

/// Top of the grading scale.
pub const GPA_SCALE: f64 = 4.0;

/// Coarse GPA bands used to colour indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpaBand {
    Excellent,
    Good,
    Fair,
    Weak,
    Poor,
}

impl GpaBand {
    pub fn from_gpa(gpa: f64) -> Self {
        if gpa >= 3.5 {
            GpaBand::Excellent
        } else if gpa >= 3.0 {
            GpaBand::Good
        } else if gpa >= 2.5 {
            GpaBand::Fair
        } else if gpa >= 2.0 {
            GpaBand::Weak
        } else {
            GpaBand::Poor
        }
    }

    /// Hex colour for the band.
    pub fn color(self) -> &'static str {
        match self {
            GpaBand::Excellent => "#4CAF50",
            GpaBand::Good => "#8BC34A",
            GpaBand::Fair => "#FFC107",
            GpaBand::Weak => "#FF9800",
            GpaBand::Poor => "#F44336",
        }
    }
}

/// Colour for a raw GPA value.
pub fn gpa_color(gpa: f64) -> &'static str {
    GpaBand::from_gpa(gpa).color()
}

/// GPA as a percentage of the scale, clamped to `0..=100`.
pub fn gpa_percentage(gpa: f64) -> f64 {
    (gpa / GPA_SCALE * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries_are_inclusive() {
        assert_eq!(GpaBand::from_gpa(3.5), GpaBand::Excellent);
        assert_eq!(GpaBand::from_gpa(3.49), GpaBand::Good);
        assert_eq!(GpaBand::from_gpa(3.0), GpaBand::Good);
        assert_eq!(GpaBand::from_gpa(2.5), GpaBand::Fair);
        assert_eq!(GpaBand::from_gpa(2.0), GpaBand::Weak);
        assert_eq!(GpaBand::from_gpa(1.99), GpaBand::Poor);
    }

    #[test]
    fn colors_match_bands() {
        assert_eq!(gpa_color(4.0), "#4CAF50");
        assert_eq!(gpa_color(0.0), "#F44336");
    }

    #[test]
    fn percentage_is_clamped() {
        assert_eq!(gpa_percentage(2.0), 50.0);
        assert_eq!(gpa_percentage(5.0), 100.0);
        assert_eq!(gpa_percentage(-1.0), 0.0);
    }
}
