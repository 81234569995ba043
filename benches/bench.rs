use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rush_hour_solver::{parse_layout, reachable_states, Algorithm, HeuristicKind};

const SIMPLE_INPUT: &str = "
......
....B.
..PPB.K
......
......
......";

const HARDER_INPUT: &str = "
AA...O
B..C.O
BPPC.OK
B..C..
D...EE
D.FFF.";

fn criterion_bench(c: &mut Criterion) {
    let simple = parse_layout(SIMPLE_INPUT).unwrap();
    let harder = parse_layout(HARDER_INPUT).unwrap();

    for algorithm in Algorithm::ALL {
        let solver = algorithm.solver(HeuristicKind::BlockingPieces.build());

        c.bench_function(&format!("simple {algorithm}"), |b| {
            b.iter(|| solver.solve(black_box(&simple)))
        });

        c.bench_function(&format!("harder {algorithm}"), |b| {
            b.iter(|| solver.solve(black_box(&harder)))
        });
    }

    for kind in HeuristicKind::ALL {
        let solver = Algorithm::AStar.solver(kind.build());
        c.bench_function(&format!("harder A* {kind}"), |b| {
            b.iter(|| solver.solve(black_box(&harder)))
        });
    }

    c.bench_function("harder reachable", |b| {
        b.iter(|| reachable_states(black_box(&harder)))
    });
}

criterion_group!(benches, criterion_bench);
criterion_main!(benches);
