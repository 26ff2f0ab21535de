//! Tests for the Tic clock driven through its timer interrupt
//!
//! This module tests:
//! - Exactly one Tic per 1024 milli-ticks, wrapping without skips
//! - Midnight processing: weekday wrap and alarm reload
//! - Waits that observe a clock advanced by another context

#![allow(special_module_name)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use proptest::prelude::*;
use ticring::clock::ClockEngine;
use ticring::configs::{FineClockNodeConfig, GenericNodeConfig};
use ticring::prelude::*;

mod lib;
use lib::*;

fn advance<C: NodeConfig>(clock: &ClockEngine<C>, interrupts: u32) {
    critical_section::with(|cs| {
        for _ in 0..interrupts {
            clock.advance(cs);
        }
    });
}

/// Runs `f` while another thread plays the timer interrupt
fn with_running_timer<C, P, F>(node: &Node<'_, C, P>, f: F)
where
    C: NodeConfig,
    P: LinePort + Sync,
    F: FnOnce(),
{
    let stop = AtomicBool::new(false);
    thread::scope(|s| {
        s.spawn(|| {
            while !stop.load(Ordering::Relaxed) {
                node.on_timer_interrupt();
                thread::yield_now();
            }
        });
        f();
        stop.store(true, Ordering::Relaxed);
    });
}

proptest! {
    #![proptest_config(clock_config())]

    /// The Tic moves once per 1024 milli-ticks, wrapping modulo 2^16
    #[test]
    fn tic_follows_milli_ticks(start in any::<u16>(), interrupts in 0u32..5000) {
        let clock = ClockEngine::<GenericNodeConfig>::new();
        clock.set_now(start);
        advance(&clock, interrupts);

        prop_assert_eq!(clock.milli_now() as u32, interrupts);
        prop_assert_eq!(clock.now(), start.wrapping_add((interrupts / 1024) as u16));
    }

    /// Midnight reloads the pending mask from the enable flags, whatever it was
    #[test]
    fn midnight_reloads_pending_alarms(before in 0u8..16, enabled in 0u8..16) {
        let node = Node::<IdConfig<0x10>>::new(NoLines);
        for ordinal in 1..=4u8 {
            node.enable_alarm(ordinal, before & (1 << (ordinal - 1)) != 0).unwrap();
            node.set_alarm(ordinal, u16::MAX).unwrap();
        }
        node.start();
        prop_assert_eq!(node.scheduler().pending(), before);

        for ordinal in 1..=4u8 {
            node.enable_alarm(ordinal, enabled & (1 << (ordinal - 1)) != 0).unwrap();
        }
        node.set_day_of_week(7).unwrap();
        node.set_now(u16::MAX);
        to_tic_boundary(&node);
        let outcome = node.on_timer_interrupt();

        prop_assert!(outcome.midnight);
        prop_assert_eq!(node.now(), 0);
        prop_assert_eq!(node.day_of_week(), 1);
        prop_assert_eq!(node.scheduler().pending(), enabled);
    }
}

#[test]
fn test_wrap_without_skipping() {
    let clock = ClockEngine::<GenericNodeConfig>::new();
    clock.set_now(0xFFFE);
    let mut seen = Vec::new();
    critical_section::with(|cs| {
        for _ in 0..3 * 1024 {
            let outcome = clock.advance(cs);
            if outcome.tic_advanced {
                seen.push((outcome.tic, outcome.midnight));
            }
        }
    });
    assert_eq!(seen, vec![(0xFFFF, false), (0x0000, true), (0x0001, false)]);
    assert_eq!(clock.day_of_week(), 2);
}

#[test]
fn test_weekday_cycle() {
    let clock = ClockEngine::<GenericNodeConfig>::new();
    let mut days = Vec::new();
    for _ in 0..8 {
        clock.set_now(u16::MAX);
        while clock.milli_now() & 0x3FF != 0x3FF {
            advance(&clock, 1);
        }
        advance(&clock, 1);
        days.push(clock.day_of_week());
    }
    assert_eq!(days, vec![2, 3, 4, 5, 6, 7, 1, 2]);
}

#[test]
fn test_wait_observes_other_context() {
    let node = Node::<IdConfig<0x10>>::new(NoLines);
    let start = node.milli_now();
    with_running_timer(&node, || node.wait_milli(20));
    assert!(node.milli_now().wrapping_sub(start) >= 20);
}

#[test]
fn test_wait_services_the_ring() {
    let node = Node::<IdConfig<0x10>>::new(NoLines);
    node.registers().write(Register::from_bits(5), 0x0F0F);
    idle(&node);
    feed(&node, Frame::read(node.id(), Register::from_bits(5)).as_bytes());
    assert!(node.ring().is_ready());

    with_running_timer(&node, || node.wait_milli(2));

    assert!(node.ring().tx_pending());
    let reply = drain(&node);
    assert_eq!(reply[..2], [0x0F, 0x0F]);
}

#[test]
fn test_long_wait_counts_skipped_milli_ticks() {
    let clock = ClockEngine::<GenericNodeConfig>::new();
    let kick = AtomicBool::new(true);
    let mut yields = 0u32;

    thread::scope(|s| {
        // Another context gets the wait going, then the yield step does the rest
        s.spawn(|| {
            while kick.load(Ordering::Relaxed) {
                advance(&clock, 1);
                thread::yield_now();
            }
        });
        clock.wait_milli(u16::MAX, || {
            kick.store(false, Ordering::Relaxed);
            advance(&clock, 3);
            yields += 1;
        });
        kick.store(false, Ordering::Relaxed);
    });

    // Three milli-ticks per yield; a wait that lost track of the wrap would
    // need twice as many.
    assert!(yields <= u16::MAX as u32 / 3 + 1, "yielded {yields} times");
}

#[test]
fn test_wait_with_several_ticks_per_yield() {
    let node = Node::<IdConfig<0x10>>::new(NoLines);
    let start = node.milli_now();
    let mut yields = 0;
    with_running_timer(&node, || {
        node.clock().wait_milli(10, || {
            run_interrupts(&node, 4);
            yields += 1;
        })
    });
    assert!(yields <= 4);
    assert!(node.milli_now().wrapping_sub(start) >= 10);
}

#[test]
fn test_zero_wait_is_noop() {
    let node = Node::<IdConfig<0x10>>::new(NoLines);
    node.wait_milli(0);
    assert_eq!(node.milli_now(), 0);
}

#[test]
fn test_fine_delay_waits_for_fine_ticks() {
    let node = Node::<FineClockNodeConfig>::new(NoLines);
    with_running_timer(&node, || {
        assert_eq!(node.delay_fine(500), Ok(()));
    });
    assert!(node.fine_now().is_ok());
}

#[test]
fn test_fine_api_needs_fine_clock() {
    let node = Node::<IdConfig<0x10>>::new(NoLines);
    assert_eq!(node.fine_now(), Err(RingError::ClockModeMismatch));
    assert_eq!(node.delay_fine(100), Err(RingError::ClockModeMismatch));
}
