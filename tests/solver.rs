use itertools::Itertools;
use log::info;
use pathfinding::directed::bfs::{bfs, bfs_reach};
use rush_hour_solver::{
    parse_layout, reachable_states, successors, AStar, Algorithm, BlockingPieces, BoardShape,
    BranchAndBound, DistanceToExit, ExitSide, GreedyBestFirst, Heuristic, HeuristicKind,
    ManhattanDistance, Orientation, PieceSpec, Position, SearchNode, SearchOutcome, Solver, State,
    UniformCost, COMBINED_CLAMP, UNREACHABLE,
};

const ONE_BLOCKER: &str = "
......
....B.
..PPB.K
......
......
......
";

const RUSH_HOUR: &str = "
AA...O
B..C.O
BPPC.OK
B..C..
D...EE
D.FFF.
";

const LEFT_EXIT: &str = "
 A...
KA.PP
 ....
 ....
";

const TOP_EXIT: &str = "
  K
....
.BB.
..P.
..P.
";

const BOTTOM_EXIT: &str = "
.P..
.P..
CC..
....
 K
";

const ALREADY_SOLVED: &str = "
....
..PPK
....
";

const NO_WAY_OUT: &str = "
..A.
PPA.K
..A.
....
";

const DETOUR: &str = "
......
....B.
..PPB.K
......
......
CC....
";

// rates goals that leave `C` where it started far above everything else, so
// in `g + h` order a three-move goal that shifts `C` on the way comes first
struct GoalDecoy;

impl Heuristic for GoalDecoy {
    fn calculate(&self, state: &State) -> u32 {
        if state.is_goal() && state.piece('C').anchor == Position::new(0, 5) {
            5
        } else {
            0
        }
    }

    fn name(&self) -> &str {
        "Goal Decoy"
    }
}

fn optimal_solvers() -> Vec<Box<dyn Solver>> {
    vec![
        Box::new(UniformCost),
        Box::new(AStar::new(BlockingPieces)),
        Box::new(BranchAndBound::new(BlockingPieces)),
    ]
}

// each step is one legal move from the step before, and the last is a goal
fn check_path(initial: &State, path: &[SearchNode]) {
    assert_eq!(path[0].state(), initial);
    assert!(path[0].last_move().is_none());

    for (i, (prev, next)) in path.iter().tuple_windows().enumerate() {
        assert_eq!(next.path_cost() as usize, i + 1);
        let found = successors(prev.state())
            .into_iter()
            .any(|(mv, state)| &state == next.state() && Some(&mv) == next.last_move());
        assert!(found, "step {} is not a legal move: {}", i + 1, next.description());
    }

    let last = path.last().unwrap();
    assert!(last.state().is_goal());
}

fn shortest(initial: &State) -> Option<usize> {
    bfs(
        initial,
        |state| successors(state).into_iter().map(|(_, next)| next),
        State::is_goal,
    )
    .map(|path| path.len() - 1)
}

#[test_log::test]
fn one_blocker_end_to_end() {
    let state = parse_layout(ONE_BLOCKER).unwrap();
    assert_eq!(BlockingPieces.calculate(&state), 1);
    assert_eq!(reachable_states(&state), 26);

    let outcome = UniformCost.solve(&state);
    let path = outcome.path().unwrap();
    check_path(&state, path);

    assert_eq!(outcome.move_count(), Some(2));
    assert_eq!(
        outcome.moves().iter().map(|mv| mv.to_string()).collect_vec(),
        vec!["Move B up to (4,0)", "Move P right to (4,2)"]
    );

    let stats = outcome.stats();
    info!("{stats}");
    assert_eq!(stats.nodes_explored, 11);
    assert!(stats.nodes_explored <= 26);
    assert!(stats.nodes_generated >= stats.nodes_explored);
    assert!(stats.max_frontier_size > 0);
}

#[test_log::test]
fn every_exit_side_solves_in_two_moves() {
    for layout in [ONE_BLOCKER, LEFT_EXIT, TOP_EXIT, BOTTOM_EXIT] {
        let state = parse_layout(layout).unwrap();
        assert_eq!(shortest(&state), Some(2));

        for solver in optimal_solvers() {
            let outcome = solver.solve(&state);
            check_path(&state, outcome.path().unwrap());
            assert_eq!(outcome.move_count(), Some(2), "{} on\n{state}", solver.name());
        }

        let greedy = GreedyBestFirst::default().solve(&state);
        check_path(&state, greedy.path().unwrap());
    }
}

#[test_log::test]
fn optimal_solvers_agree_with_breadth_first() {
    let state = parse_layout(RUSH_HOUR).unwrap();
    assert_eq!(DistanceToExit.calculate(&state), 3);
    assert_eq!(BlockingPieces.calculate(&state), 2);

    let optimum = shortest(&state).unwrap();
    assert_eq!(optimum, 8);
    let reachable = reachable_states(&state);

    for solver in optimal_solvers() {
        let outcome = solver.solve(&state);
        check_path(&state, outcome.path().unwrap());
        assert_eq!(outcome.move_count(), Some(optimum), "{}", solver.name());
        info!("{}: {}", solver.name(), outcome.stats());
    }

    let ucs = UniformCost.solve(&state);
    assert!(ucs.stats().nodes_explored <= reachable);

    for kind in HeuristicKind::ALL {
        let outcome = Algorithm::GreedyBestFirst.solver(kind.build()).solve(&state);
        check_path(&state, outcome.path().unwrap());
        assert!(outcome.move_count().unwrap() >= optimum, "{kind}");
    }
}

#[test_log::test]
fn branch_and_bound_replaces_a_longer_first_goal() {
    let state = parse_layout(DETOUR).unwrap();
    assert_eq!(shortest(&state), Some(2));

    let astar = AStar::new(GoalDecoy).solve(&state);
    check_path(&state, astar.path().unwrap());
    assert_eq!(astar.move_count(), Some(3));
    assert!(astar.moves().iter().any(|mv| mv.label == 'C'));

    let bnb = BranchAndBound::new(GoalDecoy).solve(&state);
    check_path(&state, bnb.path().unwrap());
    assert_eq!(bnb.move_count(), Some(2));
    assert!(bnb.moves().iter().all(|mv| mv.label != 'C'));
    assert!(bnb.stats().nodes_explored > astar.stats().nodes_explored);
}

#[test_log::test]
fn already_solved() {
    let state = parse_layout(ALREADY_SOLVED).unwrap();
    assert!(state.is_goal());

    for algorithm in Algorithm::ALL {
        let outcome = algorithm.solver(HeuristicKind::Combined.build()).solve(&state);
        let path = outcome.path().unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].description(), "Initial state");
        assert!(outcome.moves().is_empty());
        assert_eq!(outcome.stats().nodes_explored, 1);
    }
}

#[test_log::test]
fn no_way_out() {
    let state = parse_layout(NO_WAY_OUT).unwrap();
    assert_eq!(ManhattanDistance.calculate(&state), UNREACHABLE);
    assert_eq!(shortest(&state), None);

    let reachable = reachable_states(&state);
    assert_eq!(reachable, 2);

    for algorithm in Algorithm::ALL {
        for kind in HeuristicKind::ALL {
            let outcome = algorithm.solver(kind.build()).solve(&state);
            assert!(matches!(outcome, SearchOutcome::Unsolved { .. }));
            assert_eq!(outcome.move_count(), None);
            assert_eq!(outcome.stats().nodes_explored, reachable, "{algorithm} / {kind}");
        }
    }
}

#[test_log::test]
fn misaligned_primary_scores_unreachable_everywhere() {
    let state = State::new(
        BoardShape::new(4, 4, ExitSide::Right, 1).unwrap(),
        [
            PieceSpec::primary('P', 2, Orientation::Vertical).at(0, 0),
            PieceSpec::new('A', 2, Orientation::Horizontal).at(2, 3),
        ],
    )
    .unwrap();

    let states = bfs_reach(state.clone(), |s| {
        successors(s).into_iter().map(|(_, next)| next)
    })
    .collect_vec();
    assert_eq!(states.len(), reachable_states(&state));

    for s in &states {
        assert!(!s.is_goal());
        for kind in HeuristicKind::ALL {
            let expected = match kind {
                HeuristicKind::Combined => COMBINED_CLAMP,
                _ => UNREACHABLE,
            };
            assert_eq!(kind.build().calculate(s), expected, "{kind} at\n{s}");
        }
    }

    let outcome = BranchAndBound::new(HeuristicKind::Combined.build()).solve(&state);
    assert!(!outcome.is_solved());
    assert_eq!(outcome.stats().nodes_explored, states.len());
}

#[test_log::test]
fn solvers_run_in_parallel() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<State>();
    assert_send_sync::<SearchOutcome>();
    assert_send_sync::<Box<dyn Solver>>();

    let state = parse_layout(RUSH_HOUR).unwrap();
    let lengths = std::thread::scope(|scope| {
        let handles = optimal_solvers()
            .into_iter()
            .map(|solver| {
                let state = &state;
                scope.spawn(move || solver.solve(state).move_count())
            })
            .collect_vec();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect_vec()
    });

    assert_eq!(lengths, vec![Some(8); 3]);
}
