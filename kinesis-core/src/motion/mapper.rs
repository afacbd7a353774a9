//! Amplitude to drive level mapping
//!
//! Anything at or below the exit threshold maps to 0 so the motor does not
//! buzz on the idle noise floor. Above it, amplitude is interpolated into
//! `[min_drive, max_drive]`; `min_drive` keeps a weak signal above the
//! motor's stall duty.

use crate::config::ControlConfig;

/// Pure amplitude → target drive mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionMapper {
    exit_threshold: u16,
    max_amplitude: u16,
    min_drive: u16,
    max_drive: u16,
    max_drive_hw: u16,
}

impl MotionMapper {
    /// Build a mapper from the control configuration
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            exit_threshold: config.active_exit_threshold,
            max_amplitude: config.max_amplitude,
            min_drive: config.min_drive,
            max_drive: config.max_drive,
            max_drive_hw: config.max_drive_hw,
        }
    }

    /// Target drive level for an amplitude
    pub fn map_to_target(&self, amplitude: u16) -> u16 {
        if amplitude <= self.exit_threshold {
            return 0;
        }

        let a = amplitude.clamp(self.exit_threshold, self.max_amplitude) as u32;
        let in_min = self.exit_threshold as u32;
        let in_span = (self.max_amplitude as u32).saturating_sub(in_min).max(1);
        let out_span = self.max_drive.saturating_sub(self.min_drive) as u32;

        let target = (a - in_min) * out_span / in_span + self.min_drive as u32;
        target.min(self.max_drive_hw as u32) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mapper() -> MotionMapper {
        MotionMapper::new(&ControlConfig::default())
    }

    #[test]
    fn test_noise_floor_maps_to_zero() {
        let m = mapper();
        assert_eq!(m.map_to_target(0), 0);
        assert_eq!(m.map_to_target(8), 0);
    }

    #[test]
    fn test_just_above_floor_hits_min_drive() {
        // (9 - 8) * 175 / 504 = 0, so the first non-trivial level is min_drive
        assert_eq!(mapper().map_to_target(9), 80);
    }

    #[test]
    fn test_midpoint() {
        // (260 - 8) * 175 / 504 + 80 = 87 + 80
        assert_eq!(mapper().map_to_target(260), 167);
    }

    #[test]
    fn test_saturates_at_max() {
        let m = mapper();
        assert_eq!(m.map_to_target(512), 255);
        assert_eq!(m.map_to_target(1023), 255);
        assert_eq!(m.map_to_target(u16::MAX), 255);
    }

    #[test]
    fn test_hardware_ceiling_clamps() {
        let config = ControlConfig {
            max_drive: 255,
            max_drive_hw: 255,
            min_drive: 0,
            ..Default::default()
        };
        let m = MotionMapper {
            max_drive_hw: 200,
            ..MotionMapper::new(&config)
        };
        assert_eq!(m.map_to_target(512), 200);
    }

    proptest! {
        #[test]
        fn prop_target_in_range(amplitude in any::<u16>()) {
            let m = mapper();
            let target = m.map_to_target(amplitude);
            if amplitude <= 8 {
                prop_assert_eq!(target, 0);
            } else {
                prop_assert!((80..=255).contains(&target));
            }
        }

        #[test]
        fn prop_monotonic(a in any::<u16>(), b in any::<u16>()) {
            let m = mapper();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(m.map_to_target(lo) <= m.map_to_target(hi));
        }
    }
}
