#[macro_use]
extern crate criterion;

extern crate sokoban_solver;

use criterion::{Benchmark, Criterion};

use sokoban_solver::{parse_level, solve, Level, SolverOptions};

// allowing unused so i can bench just one or a few
// and still notice other warnings if there are any
#[allow(unused)]
fn bench_compile_detour_room(c: &mut Criterion) {
    // most of the time for a level this small is spent building the
    // push-distance matrix, not searching.
    bench_compile(c, "detour_room", DETOUR_ROOM, 50);
}

#[allow(unused)]
fn bench_solve_detour_room_single_thread(c: &mut Criterion) {
    bench_solve(c, "detour_room/single_thread", DETOUR_ROOM, true, 30);
}

#[allow(unused)]
fn bench_solve_detour_room_parallel(c: &mut Criterion) {
    bench_solve(c, "detour_room/parallel", DETOUR_ROOM, false, 30);
}

#[allow(unused)]
fn bench_solve_goal_room_single_thread(c: &mut Criterion) {
    bench_solve(c, "goal_room/single_thread", GOAL_ROOM, true, 15);
}

const DETOUR_ROOM: &str = "#######\n#@    #\n#  $ .#\n#     #\n#######";

const GOAL_ROOM: &str = "\
########
#@ $  .#
# $  . #
#  $.  #
########";

fn bench_compile(c: &mut Criterion, name: &str, level_text: &str, samples: usize) {
    let env = parse_level(level_text).unwrap();
    c.bench(
        "compile",
        Benchmark::new(name, move |b| {
            b.iter(|| criterion::black_box(Level::compile(criterion::black_box(&env)).unwrap()))
        })
        .sample_size(samples),
    );
}

fn bench_solve(c: &mut Criterion, name: &str, level_text: &str, single_thread: bool, samples: usize) {
    let env = parse_level(level_text).unwrap();
    let level = Level::compile(&env).unwrap();
    let options = SolverOptions { single_thread, ..SolverOptions::default() };

    c.bench(
        "solve",
        Benchmark::new(name, move |b| {
            b.iter(|| criterion::black_box(solve(criterion::black_box(level.clone()), options)))
        })
        .sample_size(samples),
    );
}

criterion_group!(
    benches,
    bench_compile_detour_room,
    bench_solve_detour_room_single_thread,
    bench_solve_detour_room_parallel,
    bench_solve_goal_room_single_thread,
);
criterion_main!(benches);
