//! Benchmarks for packet dispatch and projection building
//!
//! Covers the per-packet hot path and the documents built on every broadcast tick:
//! - Lap data dispatch for a full 22-car grid
//! - Full race replay through a fresh router
//! - Race table and post-race dump builds over a populated store

use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use paddock::config::Settings;
use paddock::dispatch::PacketRouter;
use paddock::messages::Outbox;
use paddock::projection::{PostRaceDump, RaceTableDocument};
use paddock::test_utils::{frame, lap_data, lap_row, participants, race_weekend, session};
use paddock::types::{MAX_CARS, Packet, SessionType};
use std::hint::black_box;

const UID: u64 = 0xBEEF;

fn grid_names() -> Vec<String> {
    (0..MAX_CARS).map(|idx| format!("DRIVER {}", idx)).collect()
}

fn populated_router() -> PacketRouter {
    let (outbox, receivers) = Outbox::channel();
    // Outbound messages are dropped; only dispatch cost matters here
    drop(receivers);
    let mut router = PacketRouter::new(&Settings::default(), outbox);

    let names = grid_names();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    router.dispatch(&frame(Packet::Session(session(UID, SessionType::Race, 3600))));
    router.dispatch(&frame(Packet::Participants(participants(UID, &names))));
    router
}

fn bench_lap_data_dispatch(c: &mut Criterion) {
    let mut router = populated_router();
    let frames: Vec<_> = (1..=50u8)
        .map(|lap| {
            let rows = (0..MAX_CARS).map(|idx| lap_row(idx as u8 + 1, lap)).collect();
            frame(Packet::LapData(lap_data(UID, rows)))
        })
        .collect();

    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(frames.len() as u64));
    group.bench_function("lap_data_full_grid", |b| {
        b.iter(|| {
            for frame in &frames {
                router.dispatch(black_box(frame));
            }
        })
    });
    group.finish();
}

fn bench_race_replay(c: &mut Criterion) {
    let names = grid_names();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let frames = race_weekend(UID, &names);

    let mut group = c.benchmark_group("replay");
    group.throughput(Throughput::Elements(frames.len() as u64));
    group.bench_function("race_weekend_full_grid", |b| {
        b.iter_batched(
            || {
                let (outbox, receivers) = Outbox::channel();
                (PacketRouter::new(&Settings::default(), outbox), receivers)
            },
            |(mut router, receivers)| {
                for frame in &frames {
                    router.dispatch(frame);
                }
                black_box((router, receivers))
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_projections(c: &mut Criterion) {
    let mut router = populated_router();
    for lap in 1..=10u8 {
        let rows = (0..MAX_CARS).map(|idx| lap_row(idx as u8 + 1, lap)).collect();
        router.dispatch(&frame(Packet::LapData(lap_data(UID, rows))));
    }

    c.bench_function("race_table_build", |b| {
        b.iter(|| black_box(RaceTableDocument::build(black_box(router.state()))))
    });

    c.bench_function("post_race_dump_build", |b| {
        b.iter(|| black_box(PostRaceDump::build(black_box(router.state()))))
    });
}

criterion_group!(benches, bench_lap_data_dispatch, bench_race_replay, bench_projections);
criterion_main!(benches);
