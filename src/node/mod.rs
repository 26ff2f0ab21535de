//! Ring node
//!
//! Ties the clock, the alarm scheduler, the protocol engine, the debounced
//! counters and the register file of one node together. The board support code
//! calls the three interrupt entry points from its handlers and
//! [`Node::service`] from its main loop; everything else is the application's
//! API.

use core::cell::Cell;

use critical_section::{CriticalSection, Mutex};

use crate::clock::{ClockEngine, Debouncer, TickOutcome};
use crate::config::{ConfigValidator, NodeConfig};
use crate::error::{LineError, RingError, RingResult};
use crate::protocol::{Disposition, FrameState, NodeId, RingEngine};
use crate::registers::{Register, RegisterAccess, RegisterFile};
use crate::scheduler::Scheduler;
use crate::traits::{AlarmAction, LinePort, NoLines, NodeAction};

/// One node on the ring
///
/// # Example
/// ```rust
/// use ticring::prelude::*;
///
/// define_node_config! {
///     name: PumpNode,
///     node_id: 0x20,
///     baud: 9600,
///     alarms: 1,
/// }
///
/// let pump_on = |_: u8, registers: &RegisterAccess<'_>| {
///     registers.update_control(|c| c.post_status(0x01));
/// };
///
/// let node = Node::<PumpNode>::new(NoLines).with_alarm(1, &pump_on)?;
/// node.set_alarm(1, 0)?;
/// node.enable_alarm(1, true)?;
/// node.start();
///
/// node.service();
/// assert!(node.registers().control().new_status);
/// # Ok::<(), ticring::error::RingError>(())
/// ```
///
/// Interrupt handlers reach the node through a `static`, so the builders are
/// `const`:
///
/// ```rust
/// use ticring::prelude::*;
///
/// define_node_config! {
///     name: ValveNode,
///     node_id: 0x40,
///     baud: 9600,
///     alarms: 2,
/// }
///
/// fn close_valve(_: u8, registers: &RegisterAccess<'_>) {
///     registers.update_control(|c| c.post_status(0x02));
/// }
///
/// static NODE: Node<'static, ValveNode> = match Node::new(NoLines).with_alarm(2, &close_valve) {
///     Ok(node) => node,
///     Err(_) => panic!("ValveNode runs two alarms"),
/// };
///
/// NODE.set_alarm(2, 0)?;
/// NODE.enable_alarm(2, true)?;
/// NODE.start();
/// NODE.service();
/// assert_eq!(NODE.registers().control().command_status, 0x02);
/// # Ok::<(), ticring::error::RingError>(())
/// ```
///
/// A configuration that does not validate does not build:
///
/// ```compile_fail
/// use ticring::prelude::*;
///
/// define_node_config! {
///     name: OffGridNode,
///     node_id: 0x12,
///     baud: 9600,
/// }
///
/// let node = Node::<OffGridNode>::new(NoLines);
/// ```
pub struct Node<'a, C: NodeConfig, P: LinePort = NoLines> {
    clock: ClockEngine<C>,
    scheduler: Scheduler<'a, C>,
    ring: RingEngine<C>,
    debouncer: Debouncer<C>,
    registers: Mutex<Cell<RegisterFile>>,
    node_action: Option<&'a dyn NodeAction>,
    port: P,
}

impl<'a, C: NodeConfig, P: LinePort> Node<'a, C, P> {
    /// Creates a node reading its debounced lines from `port`
    ///
    /// An inconsistent configuration is rejected when `new` is instantiated,
    /// so it fails the build rather than the node.
    pub const fn new(port: P) -> Self {
        const {
            if let Err(RingError::InvalidConfiguration(reason)) = ConfigValidator::validate::<C>() {
                panic!("{}", reason);
            }
        }
        Self {
            clock: ClockEngine::new(),
            scheduler: Scheduler::new(),
            ring: RingEngine::new(),
            debouncer: Debouncer::new(),
            registers: Mutex::new(Cell::new(RegisterFile::new())),
            node_action: None,
            port,
        }
    }

    /// Attaches the action of alarm `ordinal` (1..=ALARMS)
    ///
    /// Usable in a `static` initializer, which is where interrupt handlers
    /// find their node.
    pub const fn with_alarm(mut self, ordinal: u8, action: &'a dyn AlarmAction) -> RingResult<Self> {
        match self.scheduler.register(ordinal, action) {
            Ok(()) => Ok(self),
            Err(err) => {
                // Destructors cannot run in const context.
                core::mem::forget(self);
                Err(err)
            }
        }
    }

    /// Attaches the action run after frames for this node were served
    pub const fn with_node_action(mut self, action: &'a dyn NodeAction) -> Self {
        self.node_action = Some(action);
        self
    }

    /// This node's bus address
    pub fn id(&self) -> NodeId {
        C::node_id()
    }

    /// Brings the node up: takes the line baseline, mirrors the clock and the
    /// line 0 count into their registers and arms every enabled alarm for today
    pub fn start(&self) {
        self.debouncer.prime(self.port.sample());
        let registers = self.registers();
        critical_section::with(|cs| {
            if let Some(register) = Self::time_register() {
                let tic = self.clock.snapshot().tic;
                registers.modify_in(cs, |file| file.set(register, tic));
            }
            self.mirror_counter(cs);
        });
        self.rearm_alarms();
        debug!("node {} started", C::NODE_ID);
    }

    /// Timer interrupt entry point
    pub fn on_timer_interrupt(&self) -> TickOutcome {
        critical_section::with(|cs| {
            let outcome = self.clock.advance(cs);
            if !outcome.milli_advanced {
                return outcome;
            }

            if C::debounce_mask() != 0 && outcome.milli & C::DEBOUNCE_INTERVAL == 0 {
                let counted = self.debouncer.sample(cs, self.port.sample());
                if counted & 0x01 != 0 {
                    self.mirror_counter(cs);
                }
            }

            if outcome.tic_advanced {
                let registers = self.registers();
                if let Some(register) = Self::time_register() {
                    registers.modify_in(cs, |file| file.set(register, outcome.tic));
                }
                if outcome.midnight {
                    let enabled = registers.snapshot_in(cs).control().alarm_mask();
                    self.scheduler.reload(cs, enabled);
                    debug!("midnight rollover, alarms {}", enabled);
                }
            }

            self.ring.tick_dead_time(cs);
            outcome
        })
    }

    /// Serial receive interrupt entry point
    pub fn on_receive(&self, byte: u8, line: LineError) -> FrameState {
        self.ring.receive(byte, line)
    }

    /// Serial transmit-ready interrupt entry point; `None` means disable the interrupt
    pub fn on_transmit_ready(&self) -> Option<u8> {
        self.ring.transmit()
    }

    /// Cooperative step: processes a ready frame, then runs due alarms
    pub fn service(&self) -> Option<Disposition> {
        let registers = self.registers();
        let disposition = self.ring.process(&registers);

        if let Some(disposition) = disposition {
            if let Some((address, value)) = disposition.written() {
                if Some(address.register) == Self::time_register() {
                    critical_section::with(|cs| {
                        self.clock.set_now_in(cs, value);
                        registers.modify_in(cs, |file| file.set(address.register, value));
                    });
                    debug!("time hack to tic {}", value);
                }
                if Some(address.register) == Self::counter_register() {
                    critical_section::with(|cs| {
                        // Line 0 is configured, or there would be no counter register.
                        let _ = self.debouncer.set_in(cs, 0, value);
                        registers.modify_in(cs, |file| file.set(address.register, value));
                    });
                    debug!("counter preset to {}", value);
                }
            }
            if let (Some(address), Some(action)) = (disposition.local_address(), self.node_action) {
                action.on_addressed(address, &registers);
            }
        }

        if self.scheduler.has_pending() {
            self.scheduler.tick(self.clock.now(), &registers);
        }

        disposition
    }

    /// Handle to the register file
    pub fn registers(&self) -> RegisterAccess<'_> {
        RegisterAccess::new(&self.registers)
    }

    /// Current daily Tic
    pub fn now(&self) -> u16 {
        self.clock.now()
    }

    /// Current milli-tick counter
    pub fn milli_now(&self) -> u16 {
        self.clock.milli_now()
    }

    /// Fine counter in microseconds; fine clocks only
    pub fn fine_now(&self) -> RingResult<u16> {
        self.clock.fine_now()
    }

    /// Day of week, `1..=7`
    pub fn day_of_week(&self) -> u8 {
        self.clock.day_of_week()
    }

    /// Sets the day of week
    pub fn set_day_of_week(&self, day: u8) -> RingResult<()> {
        self.clock.set_day_of_week(day)
    }

    /// Local time hack; keeps the time register in step
    pub fn set_now(&self, tic: u16) {
        let registers = self.registers();
        critical_section::with(|cs| {
            self.clock.set_now_in(cs, tic);
            if let Some(register) = Self::time_register() {
                registers.modify_in(cs, |file| file.set(register, tic));
            }
        });
    }

    /// Waits `milli` milli-ticks, servicing the ring on every advance
    pub fn wait_milli(&self, milli: u16) {
        self.clock.wait_milli(milli, || {
            self.service();
        });
    }

    /// Busy-waits about `micros` microseconds; fine clocks only
    pub fn delay_fine(&self, micros: u16) -> RingResult<()> {
        self.clock.delay_fine(micros)
    }

    /// Edge count of debounced line `line`
    pub fn counter(&self, line: usize) -> RingResult<u16> {
        self.debouncer.counter(line)
    }

    /// Zeroes the edge count of debounced line `line`
    pub fn reset_counter(&self, line: usize) -> RingResult<()> {
        self.take_counter(line).map(|_| ())
    }

    /// Reads and zeroes the edge count of debounced line `line`
    pub fn take_counter(&self, line: usize) -> RingResult<u16> {
        critical_section::with(|cs| {
            let count = self.debouncer.take_in(cs, line)?;
            if line == 0 {
                self.mirror_counter(cs);
            }
            Ok(count)
        })
    }

    /// Sets the Tic at which alarm `ordinal` fires
    pub fn set_alarm(&self, ordinal: u8, at: u16) -> RingResult<()> {
        let register = Self::alarm_register(ordinal)?;
        self.registers().write(register, at);
        Ok(())
    }

    /// Sets the enable flag of alarm `ordinal`
    ///
    /// Takes effect for alarms still pending today; a disabled alarm becomes
    /// pending again at midnight or on [`rearm_alarms`](Self::rearm_alarms).
    pub fn enable_alarm(&self, ordinal: u8, enabled: bool) -> RingResult<()> {
        Self::alarm_register(ordinal)?;
        self.registers()
            .update_control(|control| control.set_alarm_enabled(ordinal, enabled));
        Ok(())
    }

    /// Makes every enabled alarm pending again, as at midnight
    pub fn rearm_alarms(&self) {
        let registers = self.registers();
        critical_section::with(|cs| {
            let enabled = registers.snapshot_in(cs).control().alarm_mask();
            self.scheduler.reload(cs, enabled);
        });
    }

    /// The protocol engine
    pub fn ring(&self) -> &RingEngine<C> {
        &self.ring
    }

    /// The alarm scheduler
    pub fn scheduler(&self) -> &Scheduler<'a, C> {
        &self.scheduler
    }

    /// The clock
    pub fn clock(&self) -> &ClockEngine<C> {
        &self.clock
    }

    fn time_register() -> Option<Register> {
        C::TIME_REGISTER.and_then(|index| Register::new(index).ok())
    }

    fn counter_register() -> Option<Register> {
        match C::DEBOUNCE[0] {
            Some(_) => C::COUNTER_REGISTER.and_then(|index| Register::new(index).ok()),
            None => None,
        }
    }

    fn mirror_counter(&self, cs: CriticalSection<'_>) {
        if let (Some(register), Ok(count)) = (Self::counter_register(), self.debouncer.counter_in(cs, 0)) {
            self.registers().modify_in(cs, |file| file.set(register, count));
        }
    }

    fn alarm_register(ordinal: u8) -> RingResult<Register> {
        if ordinal == 0 || ordinal as usize > C::ALARMS {
            return Err(RingError::InvalidAlarm);
        }
        Register::new(ordinal as usize)
    }
}
