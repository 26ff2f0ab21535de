#![allow(unused_mut)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ticring::configs::{GenericNodeConfig, MeterNodeConfig};
use ticring::prelude::*;
use ticring::protocol::checksum;

fn benchmark_checksum(c: &mut Criterion) {
    let mut group = c.benchmark_group("Checksum");

    group.bench_function("frame", |b| {
        b.iter(|| black_box(checksum(black_box(&[0x34, 0x12, 0x33]))));
    });

    group.bench_function("is_intact", |b| {
        let frame = Frame::write(NodeId::from_address_byte(0x30), Register::from_bits(3), 0x1234);
        b.iter(|| black_box(black_box(&frame).is_intact()));
    });

    group.finish();
}

fn deliver<C: NodeConfig>(node: &Node<'_, C>, frame: &Frame) -> Option<Disposition> {
    for byte in frame.as_bytes() {
        node.on_receive(*byte, LineError::NONE);
    }
    let disposition = node.service();
    while node.on_transmit_ready().is_some() {}
    for _ in 0..C::DEAD_TIME {
        node.on_timer_interrupt();
    }
    disposition
}

fn benchmark_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("Frame");
    let own = NodeId::from_address_byte(0x10);
    let other = NodeId::from_address_byte(0x70);

    let cases = [
        ("read_own", Frame::read(own, Register::from_bits(3))),
        ("write_own", Frame::write(own, Register::from_bits(3), 0xBEEF)),
        ("relay", Frame::write(other, Register::from_bits(3), 0xBEEF)),
        ("broadcast", Frame::write(NodeId::BROADCAST, Register::from_bits(5), 1)),
        ("corrupt", Frame::from_bytes([1, 2, 0x13, 0])),
    ];

    for (name, frame) in cases.iter() {
        group.bench_with_input(BenchmarkId::new("round_trip", name), frame, |b, frame| {
            let node = Node::<GenericNodeConfig>::new(NoLines);
            node.start();
            b.iter(|| black_box(deliver(&node, black_box(frame))));
        });
    }

    group.finish();
}

fn benchmark_timer_interrupt(c: &mut Criterion) {
    let mut group = c.benchmark_group("TimerInterrupt");

    group.bench_function("coarse", |b| {
        let node = Node::<GenericNodeConfig>::new(NoLines);
        node.start();
        b.iter(|| black_box(node.on_timer_interrupt()));
    });

    group.bench_function("debounced", |b| {
        let node = Node::<MeterNodeConfig, _>::new(|| 0b0101u8);
        node.start();
        b.iter(|| black_box(node.on_timer_interrupt()));
    });

    for interrupts in [1024u32, 4096].iter() {
        group.bench_with_input(BenchmarkId::new("tics", interrupts), interrupts, |b, &interrupts| {
            let node = Node::<GenericNodeConfig>::new(NoLines);
            b.iter(|| {
                for _ in 0..interrupts {
                    node.on_timer_interrupt();
                }
                black_box(node.now())
            });
        });
    }

    group.finish();
}

fn benchmark_scheduler(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scheduler");

    group.bench_function("tick_all_pending", |b| {
        let node = Node::<GenericNodeConfig>::new(NoLines);
        for ordinal in 1..=4u8 {
            let _ = node.set_alarm(ordinal, u16::MAX);
            let _ = node.enable_alarm(ordinal, true);
        }
        node.start();
        b.iter(|| black_box(node.scheduler().tick(black_box(100), &node.registers())));
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_checksum,
    benchmark_frames,
    benchmark_timer_interrupt,
    benchmark_scheduler
);
criterion_main!(benches);
