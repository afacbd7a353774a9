//! PWM motor driver
//!
//! Maps the control core's integer drive level onto a PWM channel's duty
//! cycle. Level `max_level` (the hardware ceiling) is full duty; level 0
//! switches the channel fully off.
//!
//! Ramping is not done here. The supervisor already slew-limits every
//! level it writes, so the driver applies each level as-is.
//!
//! ```ignore
//! let pwm = Pwm::new_output_a(p.PWM_SLICE1, p.PIN_2, cfg);
//! let (out, _) = pwm.split();
//! let mut motor = PwmMotor::new(out.unwrap(), 255);
//! motor.set_drive(128); // ~50% duty
//! ```

use embedded_hal::pwm::{Error as _, ErrorKind, SetDutyCycle};
use kinesis_core::traits::MotorOutput;

/// Motor driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// The PWM peripheral rejected a duty cycle write
    Pwm(ErrorKind),
}

/// A motor on a single PWM channel
pub struct PwmMotor<P> {
    pwm: P,
    /// Drive level that maps to full duty
    max_level: u16,
    /// Last level successfully applied
    level: u16,
    /// Failed writes since construction
    errors: u32,
    last_error: Option<MotorError>,
}

impl<P: SetDutyCycle> PwmMotor<P> {
    /// Wrap a PWM channel; the motor starts switched off
    pub fn new(mut pwm: P, max_level: u16) -> Self {
        let errors = match pwm.set_duty_cycle_fully_off() {
            Ok(()) => 0,
            Err(_) => 1,
        };
        Self {
            pwm,
            max_level: max_level.max(1),
            level: 0,
            errors,
            last_error: None,
        }
    }

    /// Scale a drive level to a duty value for this channel
    ///
    /// Levels above `max_level` saturate at full duty.
    pub fn scale_duty(&self, level: u16) -> u16 {
        let level = level.min(self.max_level) as u32;
        let max_duty = self.pwm.max_duty_cycle() as u32;
        (level * max_duty / self.max_level as u32) as u16
    }

    /// Apply a drive level, reporting PWM failures
    pub fn try_set(&mut self, level: u16) -> Result<(), MotorError> {
        let result = if level == 0 {
            self.pwm.set_duty_cycle_fully_off()
        } else {
            let duty = self.scale_duty(level);
            self.pwm.set_duty_cycle(duty)
        };
        result.map_err(|e| MotorError::Pwm(e.kind()))?;

        self.level = level.min(self.max_level);
        Ok(())
    }

    /// Last level successfully applied
    pub fn level(&self) -> u16 {
        self.level
    }

    /// Number of failed writes
    pub fn error_count(&self) -> u32 {
        self.errors
    }

    /// Most recent write failure
    pub fn last_error(&self) -> Option<MotorError> {
        self.last_error
    }

    /// Give back the PWM channel
    pub fn release(self) -> P {
        self.pwm
    }
}

impl<P: SetDutyCycle> MotorOutput for PwmMotor<P> {
    fn set_drive(&mut self, level: u16) {
        // The control loop cannot act on a failed write; it is counted here
        // and the next write retries
        if let Err(e) = self.try_set(level) {
            self.errors = self.errors.wrapping_add(1);
            self.last_error = Some(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::pwm::{Error, ErrorType};
    use proptest::prelude::*;

    #[derive(Debug)]
    struct MockError;

    impl Error for MockError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    struct MockPwm {
        max: u16,
        duty: u16,
        fail: bool,
    }

    impl MockPwm {
        fn new(max: u16) -> Self {
            Self {
                max,
                duty: 0xBEEF,
                fail: false,
            }
        }
    }

    impl ErrorType for MockPwm {
        type Error = MockError;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            self.max
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), MockError> {
            if self.fail {
                return Err(MockError);
            }
            self.duty = duty;
            Ok(())
        }
    }

    #[test]
    fn test_starts_off() {
        let motor = PwmMotor::new(MockPwm::new(1000), 255);
        assert_eq!(motor.release().duty, 0);
    }

    #[test]
    fn test_full_scale() {
        let mut motor = PwmMotor::new(MockPwm::new(1000), 255);
        motor.set_drive(255);
        assert_eq!(motor.level(), 255);
        assert_eq!(motor.release().duty, 1000);
    }

    #[test]
    fn test_proportional_duty() {
        let motor = PwmMotor::new(MockPwm::new(1000), 255);
        assert_eq!(motor.scale_duty(0), 0);
        assert_eq!(motor.scale_duty(80), 313);
        assert_eq!(motor.scale_duty(128), 501);
    }

    #[test]
    fn test_saturates_above_max_level() {
        let mut motor = PwmMotor::new(MockPwm::new(1000), 200);
        motor.set_drive(255);
        assert_eq!(motor.level(), 200);
        assert_eq!(motor.release().duty, 1000);
    }

    #[test]
    fn test_force_off() {
        let mut motor = PwmMotor::new(MockPwm::new(1000), 255);
        motor.set_drive(100);
        motor.force_off();
        assert_eq!(motor.level(), 0);
        assert_eq!(motor.release().duty, 0);
    }

    #[test]
    fn test_write_failure_is_counted() {
        let mut motor = PwmMotor::new(MockPwm::new(1000), 255);
        motor.set_drive(50);

        motor.pwm.fail = true;
        motor.set_drive(100);

        assert_eq!(motor.error_count(), 1);
        assert_eq!(motor.last_error(), Some(MotorError::Pwm(ErrorKind::Other)));
        // Level reflects what actually reached the hardware
        assert_eq!(motor.level(), 50);
        assert_eq!(
            motor.try_set(0),
            Err(MotorError::Pwm(ErrorKind::Other))
        );
    }

    proptest! {
        #[test]
        fn prop_duty_within_range_and_monotonic(max in 1u16..=u16::MAX, a in any::<u16>(), b in any::<u16>()) {
            let motor = PwmMotor::new(MockPwm::new(max), 255);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(motor.scale_duty(hi) <= max);
            prop_assert!(motor.scale_duty(lo) <= motor.scale_duty(hi));
        }
    }
}
