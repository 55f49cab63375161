//! Cost of resimulating the full snapshot window after a late input.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use boss_arena::{
    InputFrame, InputReconciler, PlayerId, SimConfig, WorldCommand, SNAPSHOT_WINDOW,
};
use boss_arena::game::weapon::WeaponKind;

const PLAYERS: [PlayerId; 2] = [PlayerId::new([1; 16]), PlayerId::new([2; 16])];

/// A reconciler that has run one full window of random input.
fn primed() -> InputReconciler {
    let config = SimConfig::default();
    let mut reconciler = InputReconciler::new(config.new_world(7), config, SNAPSHOT_WINDOW, 120);
    reconciler.queue_command(WorldCommand::Join { player_id: PLAYERS[0], weapon: WeaponKind::Longsword });
    reconciler.queue_command(WorldCommand::Join { player_id: PLAYERS[1], weapon: WeaponKind::Scythe });

    let mut rng = StdRng::seed_from_u64(0xBE7C);
    for _ in 0..SNAPSHOT_WINDOW {
        let tick = reconciler.current_tick();
        for player in PLAYERS {
            let buttons: u16 = rng.gen_range(0..1024);
            let _ = reconciler.submit_input(player, tick, InputFrame::with_buttons(buttons));
        }
        reconciler.advance();
    }
    reconciler
}

fn bench_rollback(c: &mut Criterion) {
    let base = primed();
    let oldest = base.oldest_tick();

    c.bench_function("rollback_full_window", |b| {
        b.iter_batched(
            || base.clone(),
            |mut reconciler| {
                let frame = InputFrame::with_buttons(InputFrame::FLAG_HEAVY | InputFrame::FLAG_JUMP);
                black_box(reconciler.submit_input(PLAYERS[0], oldest, frame))
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("step_tick", |b| {
        b.iter_batched(
            || base.clone(),
            |mut reconciler| black_box(reconciler.advance()),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("replay_window", |b| {
        b.iter(|| black_box(base.replay_from(oldest)))
    });
}

criterion_group!(benches, bench_rollback);
criterion_main!(benches);
