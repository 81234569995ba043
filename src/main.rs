use std::error::Error;

use rush_hour_solver::{parse_layout, Algorithm, HeuristicKind, SearchOutcome};

// Format:
// `.` is an empty cell, any other letter is part of the piece with that label,
// `P` is the piece that has to leave, and `K` marks the exit just outside the
// board (its own line above or below, or at either end of a row). A layout
// may start with its size (`rows cols`) and the number of other pieces.
const EXAMPLES: &[(&str, &str)] = &[
    (
        "one blocker",
        "
......
....B.
..PPB.K
......
......
......
",
    ),
    (
        "left exit",
        "
 A...
KA.PP
 ....
 ....
",
    ),
    (
        "top exit",
        "
  K
....
.BB.
..P.
..P.
",
    ),
    (
        "rush hour",
        "
AA...O
B..C.O
BPPC.OK
B..C..
D...EE
D.FFF.
",
    ),
    (
        "declared size",
        "
6 6
11
AAB..F
..BCDF
GPPCDFK
GH.III
GHJ...
LLJMM.
",
    ),
    (
        "no way out",
        "
..A.
PPA.K
..A.
....
",
    ),
];

fn report(outcome: &SearchOutcome) {
    match outcome {
        SearchOutcome::Solved { path, stats } => {
            println!("Found a solution in {} moves:", path.len() - 1);
            for (i, node) in path.iter().enumerate().skip(1) {
                println!("{:>3}. {}", i, node.description());
            }
            if let Some(last) = path.last() {
                println!("{}", last.state());
            }
            println!("{stats}");
        }
        SearchOutcome::Unsolved { stats } => {
            println!("No solution found");
            println!("{stats}");
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();

    let mut args = std::env::args().skip(1);
    let algorithms = match args.next() {
        Some(name) => vec![name.parse::<Algorithm>()?],
        None => Algorithm::ALL.to_vec(),
    };
    let heuristic = match args.next() {
        Some(name) => name.parse::<HeuristicKind>()?,
        None => HeuristicKind::BlockingPieces,
    };

    for (name, layout) in EXAMPLES {
        let state = parse_layout(layout)?;

        println!("----");
        println!("{name}:");
        println!("{state}");

        for &algorithm in &algorithms {
            println!("-- {algorithm}");
            if algorithm.is_informed() {
                println!("   heuristic: {heuristic}");
            }

            let solver = algorithm.solver(heuristic.build());
            report(&solver.solve(&state));
            println!();
        }
    }

    Ok(())
}
