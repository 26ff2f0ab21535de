//! Callback hooks
//!
//! Application logic plugs into the node through these traits. Both run in the
//! cooperative mainline slot, never in interrupt context, and both are handed
//! the register file so they can read parameters and post results.

use crate::protocol::Address;
use crate::registers::RegisterAccess;

/// Action run when a daily alarm comes due
///
/// Plain closures implement this trait, which covers most uses:
///
/// ```rust
/// use ticring::registers::RegisterAccess;
/// use ticring::traits::AlarmAction;
///
/// let water_on = |_ordinal: u8, registers: &RegisterAccess<'_>| {
///     registers.update_control(|c| c.post_status(0x01));
/// };
/// let action: &dyn AlarmAction = &water_on;
/// # let _ = action;
/// ```
pub trait AlarmAction: Sync {
    /// Runs the action for alarm `ordinal` (1..=4)
    ///
    /// Must return promptly: the ring is not serviced while it runs.
    fn fire(&self, ordinal: u8, registers: &RegisterAccess<'_>);
}

impl<F> AlarmAction for F
where
    F: Fn(u8, &RegisterAccess<'_>) + Sync,
{
    fn fire(&self, ordinal: u8, registers: &RegisterAccess<'_>) {
        self(ordinal, registers)
    }
}

/// Action run after a frame addressed to this node (or broadcast) was served
///
/// Called with the frame's decoded address once the reply is already on its
/// way, so the time spent here does not delay the ring.
pub trait NodeAction: Sync {
    /// Reacts to a served frame
    fn on_addressed(&self, address: Address, registers: &RegisterAccess<'_>);
}

impl<F> NodeAction for F
where
    F: Fn(Address, &RegisterAccess<'_>) + Sync,
{
    fn on_addressed(&self, address: Address, registers: &RegisterAccess<'_>) {
        self(address, registers)
    }
}
