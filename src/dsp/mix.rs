//! Dry/wet mixer

/// Linear crossfade: `dry·(1 − amount) + wet·amount`
///
/// `amount` is expected in `[0, 1]`; 0 is fully dry, 1 fully wet.
#[inline]
pub fn mix(dry: f32, wet: f32, amount: f32) -> f32 {
    dry * (1.0 - amount) + wet * amount
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_endpoints_are_exact() {
        for (dry, wet) in [(0.3_f32, -0.9_f32), (-1.7, 4.2), (1e-8, 0.5)] {
            assert_eq!(mix(dry, wet, 0.0), dry);
            assert_eq!(mix(dry, wet, 1.0), wet);
        }
    }

    #[test]
    fn test_midpoint() {
        assert_relative_eq!(mix(0.2, 0.6, 0.5), 0.4);
        assert_relative_eq!(mix(1.0, 0.0, 0.25), 0.75);
    }
}
