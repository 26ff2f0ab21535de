//! Daily alarm scheduler
//!
//! Up to four alarms, each firing at most once per day when the daily Tic
//! reaches the threshold held in its register (alarm `n` reads register `n`).
//! A "still to fire" bit per alarm is reloaded from the enable flags at
//! midnight and cleared the first time the alarm is seen due, whether or not
//! it was still enabled by then.

use core::cell::Cell;
use core::marker::PhantomData;

use critical_section::{CriticalSection, Mutex};

use crate::config::NodeConfig;
use crate::error::{RingError, RingResult};
use crate::registers::{Register, RegisterAccess};
use crate::traits::AlarmAction;

/// Maximum number of alarms
pub const MAX_ALARMS: usize = 4;

/// Alarm scheduler bound to a node configuration
///
/// # Example
/// ```rust
/// use core::cell::Cell;
/// use critical_section::Mutex;
/// use ticring::configs::GenericNodeConfig;
/// use ticring::registers::{Register, RegisterAccess, RegisterFile};
/// use ticring::scheduler::Scheduler;
///
/// let file = Mutex::new(Cell::new(RegisterFile::new()));
/// let registers = RegisterAccess::new(&file);
/// registers.write(Register::new(1)?, 100);
/// registers.update_control(|c| c.set_alarm_enabled(1, true));
///
/// let noop = |_: u8, _: &RegisterAccess<'_>| {};
/// let scheduler = Scheduler::<GenericNodeConfig>::new().with_action(1, &noop)?;
/// critical_section::with(|cs| scheduler.reload(cs, registers.control().alarm_mask()));
///
/// assert_eq!(scheduler.tick(99, &registers), 0);
/// assert_eq!(scheduler.tick(100, &registers), 0b0001);
/// assert_eq!(scheduler.tick(101, &registers), 0);
/// # Ok::<(), ticring::error::RingError>(())
/// ```
pub struct Scheduler<'a, C: NodeConfig> {
    pending: Mutex<Cell<u8>>,
    actions: [Option<&'a dyn AlarmAction>; MAX_ALARMS],
    _config: PhantomData<fn() -> C>,
}

impl<C: NodeConfig> Default for Scheduler<'_, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, C: NodeConfig> Scheduler<'a, C> {
    /// Creates a scheduler with nothing pending and no actions
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(Cell::new(0)),
            actions: [None; MAX_ALARMS],
            _config: PhantomData,
        }
    }

    /// Registers the action for alarm `ordinal` (1..=ALARMS)
    pub const fn register(&mut self, ordinal: u8, action: &'a dyn AlarmAction) -> RingResult<()> {
        match Self::slot(ordinal) {
            Ok(slot) => {
                self.actions[slot] = Some(action);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Builder form of [`register`](Self::register)
    pub const fn with_action(mut self, ordinal: u8, action: &'a dyn AlarmAction) -> RingResult<Self> {
        match self.register(ordinal, action) {
            Ok(()) => Ok(self),
            Err(err) => {
                core::mem::forget(self);
                Err(err)
            }
        }
    }

    /// Midnight processing: every enabled alarm may fire again
    pub fn reload(&self, cs: CriticalSection<'_>, enabled: u8) {
        self.pending.borrow(cs).set(enabled & C::alarm_mask());
    }

    /// Mask of alarms still to fire today, alarm 1 in bit 0
    pub fn pending(&self) -> u8 {
        critical_section::with(|cs| self.pending.borrow(cs).get())
    }

    /// Returns true if any alarm may still fire today
    pub fn has_pending(&self) -> bool {
        self.pending() != 0
    }

    /// Returns true if alarm `ordinal` has an action
    pub fn has_action(&self, ordinal: u8) -> bool {
        Self::slot(ordinal)
            .map(|slot| self.actions[slot].is_some())
            .unwrap_or(false)
    }

    /// Runs every alarm that is due at `now`, alarm 1 first
    ///
    /// Returns a mask of the alarms whose action ran.
    pub fn tick(&self, now: u16, registers: &RegisterAccess<'_>) -> u8 {
        let mut fired = 0;
        for slot in 0..C::ALARMS.min(MAX_ALARMS) {
            let bit = 1u8 << slot;
            let ordinal = slot as u8 + 1;

            let due = critical_section::with(|cs| {
                let pending = self.pending.borrow(cs);
                if pending.get() & bit == 0 {
                    return None;
                }
                let file = registers.snapshot();
                if now < file.get(Register::from_bits(ordinal)) {
                    return None;
                }
                pending.set(pending.get() & !bit);
                Some(file.control().alarm_enabled(ordinal))
            });

            match due {
                Some(true) => {
                    if let Some(action) = self.actions[slot] {
                        debug!("alarm {} fired at tic {}", ordinal, now);
                        action.fire(ordinal, registers);
                        fired |= bit;
                    }
                }
                Some(false) => trace!("alarm {} skipped, disabled", ordinal),
                None => {}
            }
        }
        fired
    }

    const fn slot(ordinal: u8) -> RingResult<usize> {
        let slot = (ordinal as usize).wrapping_sub(1);
        if slot < C::ALARMS && slot < MAX_ALARMS {
            Ok(slot)
        } else {
            Err(RingError::InvalidAlarm)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::{MeterNodeConfig, TestingMinimalConfig};
    use crate::registers::RegisterFile;
    use core::sync::atomic::{AtomicU8, Ordering};

    struct Recorder {
        calls: AtomicU8,
        last: AtomicU8,
    }

    impl Recorder {
        const fn new() -> Self {
            Self {
                calls: AtomicU8::new(0),
                last: AtomicU8::new(0),
            }
        }
    }

    impl AlarmAction for Recorder {
        fn fire(&self, ordinal: u8, _registers: &RegisterAccess<'_>) {
            self.calls.store(self.calls.load(Ordering::Relaxed) + 1, Ordering::Relaxed);
            self.last.store(ordinal, Ordering::Relaxed);
        }
    }

    fn armed(file: &Mutex<Cell<RegisterFile>>, thresholds: [u16; 2]) -> RegisterAccess<'_> {
        let registers = RegisterAccess::new(file);
        registers.write(Register::from_bits(1), thresholds[0]);
        registers.write(Register::from_bits(2), thresholds[1]);
        registers.update_control(|c| {
            c.set_alarm_enabled(1, true);
            c.set_alarm_enabled(2, true);
        });
        registers
    }

    static STATIC_ACTION: Recorder = Recorder::new();
    static STATIC_SCHEDULER: Scheduler<'static, MeterNodeConfig> =
        match Scheduler::new().with_action(2, &STATIC_ACTION) {
            Ok(scheduler) => scheduler,
            Err(_) => panic!("alarm 2 is configured"),
        };

    #[test]
    fn test_static_registration() {
        assert!(STATIC_SCHEDULER.has_action(2));
        assert!(!STATIC_SCHEDULER.has_action(1));

        let file = Mutex::new(Cell::new(RegisterFile::new()));
        let registers = armed(&file, [10, 20]);
        critical_section::with(|cs| STATIC_SCHEDULER.reload(cs, 0b0011));
        assert_eq!(STATIC_SCHEDULER.tick(20, &registers), 0b0010);
        assert_eq!(STATIC_ACTION.last.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_ordinal_bounds() {
        let action = Recorder::new();
        let mut scheduler = Scheduler::<MeterNodeConfig>::new();
        assert!(scheduler.register(1, &action).is_ok());
        assert!(scheduler.register(2, &action).is_ok());
        assert_eq!(scheduler.register(0, &action), Err(RingError::InvalidAlarm));
        assert_eq!(scheduler.register(3, &action), Err(RingError::InvalidAlarm));
        assert!(scheduler.has_action(2));
        assert!(!scheduler.has_action(3));

        let mut none = Scheduler::<TestingMinimalConfig>::new();
        assert_eq!(none.register(1, &action), Err(RingError::InvalidAlarm));
    }

    #[test]
    fn test_reload_masks_unused_alarms() {
        let scheduler = Scheduler::<MeterNodeConfig>::new();
        critical_section::with(|cs| scheduler.reload(cs, 0xFF));
        assert_eq!(scheduler.pending(), 0b0011);
    }

    #[test]
    fn test_late_alarm_fires_once() {
        let file = Mutex::new(Cell::new(RegisterFile::new()));
        let registers = armed(&file, [10, 20]);
        let action = Recorder::new();
        let scheduler = Scheduler::<MeterNodeConfig>::new()
            .with_action(2, &action)
            .unwrap();
        critical_section::with(|cs| scheduler.reload(cs, 0b0011));

        assert_eq!(scheduler.tick(500, &registers), 0b0010);
        assert_eq!(scheduler.tick(501, &registers), 0);
        assert_eq!(action.calls.load(Ordering::Relaxed), 1);
        assert_eq!(action.last.load(Ordering::Relaxed), 2);
        assert!(!scheduler.has_pending());
    }

    #[test]
    fn test_disabled_alarm_is_consumed() {
        let file = Mutex::new(Cell::new(RegisterFile::new()));
        let registers = armed(&file, [10, 20]);
        let action = Recorder::new();
        let scheduler = Scheduler::<MeterNodeConfig>::new()
            .with_action(1, &action)
            .unwrap();
        critical_section::with(|cs| scheduler.reload(cs, 0b0011));

        registers.update_control(|c| c.set_alarm_enabled(1, false));
        assert_eq!(scheduler.tick(10, &registers), 0);
        assert_eq!(scheduler.pending(), 0b0010);

        registers.update_control(|c| c.set_alarm_enabled(1, true));
        assert_eq!(scheduler.tick(11, &registers), 0);
        assert_eq!(action.calls.load(Ordering::Relaxed), 0);
    }
}
