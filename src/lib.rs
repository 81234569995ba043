//! Solver for Rush Hour style sliding-block puzzles.
//!
//! A puzzle is a rectangular board with one exit on its border and a set of
//! straight pieces that each slide along their own axis. The goal is to bring
//! the primary piece to the exit. [`parse_layout`] builds the initial
//! [`State`] from a text grid, and any [`Solver`] searches from it:
//!
//! ```
//! use rush_hour_solver::{parse_layout, Algorithm, HeuristicKind, Solver};
//!
//! let state = parse_layout(
//!     "
//! ......
//! ....B.
//! ..PPB.K
//! ......
//! ",
//! )
//! .unwrap();
//!
//! let solver = Algorithm::AStar.solver(HeuristicKind::BlockingPieces.build());
//! let outcome = solver.solve(&state);
//! assert_eq!(outcome.move_count(), Some(2));
//! ```

mod board;
mod error;
mod heuristic;
mod layout;
mod moves;
mod search;
mod state;

pub use board::{BoardShape, Direction, ExitSide, Orientation, PieceSpec, PlacedPiece, Position};
pub use error::{PuzzleError, UnknownName};
pub use heuristic::{
    BlockingPieces, Combined, CombinedWeights, DistanceToExit, Heuristic, HeuristicKind,
    ManhattanDistance, PieceDensity, COMBINED_CLAMP, UNREACHABLE,
};
pub use layout::{parse_layout, PRIMARY_LABEL};
pub use moves::{perform_moves, successors, Move};
pub use search::{
    reachable_states, AStar, Algorithm, BranchAndBound, GreedyBestFirst, SearchNode,
    SearchOutcome, SearchStats, Solver, UniformCost,
};
pub use state::{State, EMPTY, EXIT_MARKER};
