//! Estimates of the remaining cost from a state, used to order the frontier of
//! the informed searches.
//!
//! A heuristic that cannot say anything useful about a state (the primary
//! piece has the wrong orientation for the exit, or sits outside the exit's
//! row or column) returns [`UNREACHABLE`]. Since a piece never leaves its own
//! axis, such a state has no solution at all; the value is finite so that
//! `g + h` and weighted sums stay well defined.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use itertools::Itertools;

use crate::board::{Direction, Orientation, Position};
use crate::error::UnknownName;
use crate::state::State;

/// Returned when the primary piece cannot reach the exit from where it is.
pub const UNREACHABLE: u32 = 1_000_000;

/// What [`Combined`] substitutes for an [`UNREACHABLE`] component.
pub const COMBINED_CLAMP: u32 = 1000;

/// Rows (or columns) inspected by [`PieceDensity`], centred on the primary.
const DENSITY_BAND: i32 = 3;

/// An estimate of the moves still needed to solve a state. `calculate` returns
/// [`UNREACHABLE`] when the primary piece is not lined up with the exit.
pub trait Heuristic: Send + Sync {
    fn calculate(&self, state: &State) -> u32;
    fn name(&self) -> &str;
}

impl Heuristic for Box<dyn Heuristic> {
    fn calculate(&self, state: &State) -> u32 {
        (**self).calculate(state)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// The straight run of cells between the primary piece's leading edge and the
/// exit edge of the board.
struct Corridor {
    edge: Position,
    travel: Direction,
    len: i32,
}

impl Corridor {
    /// `None` when the primary is not lined up with the exit.
    fn of(state: &State) -> Option<Corridor> {
        let shape = state.shape();
        let primary = state.primary();
        if !shape.is_aligned(&primary) {
            return None;
        }

        let travel = shape.exit_side().travel();
        let edge = match travel {
            Direction::Up | Direction::Left => primary.anchor,
            Direction::Down | Direction::Right => primary.anchor.shift(travel, primary.length() - 1),
        };
        let len = match travel {
            Direction::Up => edge.y,
            Direction::Down => shape.rows() - 1 - edge.y,
            Direction::Left => edge.x,
            Direction::Right => shape.cols() - 1 - edge.x,
        };

        Some(Corridor {
            edge,
            travel,
            len: len.max(0),
        })
    }

    fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (1..=self.len).map(move |i| self.edge.shift(self.travel, i))
    }

    fn is_horizontal(&self) -> bool {
        matches!(self.travel, Direction::Left | Direction::Right)
    }
}

/// Cells between the primary piece and the exit edge, ignoring whatever is in
/// the way.
#[derive(Copy, Clone, Debug, Default)]
pub struct DistanceToExit;

impl Heuristic for DistanceToExit {
    fn calculate(&self, state: &State) -> u32 {
        match Corridor::of(state) {
            Some(corridor) => corridor.len as u32,
            None => UNREACHABLE,
        }
    }

    fn name(&self) -> &str {
        "Distance to Exit"
    }
}

/// Occupied cells between the primary piece and the exit edge.
#[derive(Copy, Clone, Debug, Default)]
pub struct BlockingPieces;

impl Heuristic for BlockingPieces {
    fn calculate(&self, state: &State) -> u32 {
        let Some(corridor) = Corridor::of(state) else {
            return UNREACHABLE;
        };

        corridor
            .cells()
            .filter(|c| state.is_cell_occupied(c.x, c.y))
            .count() as u32
    }

    fn name(&self) -> &str {
        "Blocking Pieces"
    }
}

/// For every piece in the corridor, the fewest cells it has to shift sideways
/// to clear it, plus one for the primary's own final slide.
#[derive(Copy, Clone, Debug, Default)]
pub struct ManhattanDistance;

impl ManhattanDistance {
    // shortest sideways shift that takes `blocker` off the corridor cell
    // `at`, staying on the board
    fn clearance(state: &State, corridor: &Corridor, blocker: char, at: Position) -> Option<u32> {
        let piece = state.piece(blocker);
        let crossing = if corridor.is_horizontal() {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        };
        if piece.spec.orientation != crossing {
            return None;
        }

        let len = piece.length();
        let (line, start, extent) = if corridor.is_horizontal() {
            (at.y, piece.anchor.y, state.shape().rows())
        } else {
            (at.x, piece.anchor.x, state.shape().cols())
        };

        let before = (line - len >= 0).then(|| start + len - line);
        let after = (line + 1 + len <= extent).then(|| line + 1 - start);
        before.into_iter().chain(after).min().map(|d| d as u32)
    }
}

impl Heuristic for ManhattanDistance {
    fn calculate(&self, state: &State) -> u32 {
        let Some(corridor) = Corridor::of(state) else {
            return UNREACHABLE;
        };
        if state.is_goal() {
            return 0;
        }

        let blockers = corridor
            .cells()
            .filter_map(|c| state.occupant(c.x, c.y).map(|label| (label, c)))
            .unique_by(|&(label, _)| label);

        let mut total = 1;
        for (label, at) in blockers {
            match Self::clearance(state, &corridor, label, at) {
                Some(d) => total += d,
                None => return UNREACHABLE,
            }
        }
        total.min(UNREACHABLE)
    }

    fn name(&self) -> &str {
        "Manhattan Distance"
    }
}

/// How crowded the band of cells between the primary piece and the exit edge
/// is, as a percentage. The band is three cells wide, clipped to the board.
#[derive(Copy, Clone, Debug, Default)]
pub struct PieceDensity;

impl Heuristic for PieceDensity {
    fn calculate(&self, state: &State) -> u32 {
        let shape = state.shape();
        let primary = state.primary();
        let side = shape.exit_side();
        if primary.spec.orientation != side.orientation() {
            return UNREACHABLE;
        }

        let a = primary.anchor;
        let half = DENSITY_BAND / 2;
        let (xs, ys) = match side.travel() {
            Direction::Right => (
                a.x + primary.length()..shape.cols(),
                (a.y - half).max(0)..(a.y + half + 1).min(shape.rows()),
            ),
            Direction::Left => (0..a.x, (a.y - half).max(0)..(a.y + half + 1).min(shape.rows())),
            Direction::Up => ((a.x - half).max(0)..(a.x + half + 1).min(shape.cols()), 0..a.y),
            Direction::Down => (
                (a.x - half).max(0)..(a.x + half + 1).min(shape.cols()),
                a.y + primary.length()..shape.rows(),
            ),
        };

        let cells = ys.cartesian_product(xs).collect_vec();
        if cells.is_empty() {
            return 0;
        }

        let blocked = cells
            .iter()
            .filter(|&&(y, x)| state.is_cell_occupied(x, y))
            .count();
        (blocked * 100 / cells.len()) as u32
    }

    fn name(&self) -> &str {
        "Piece Density"
    }
}

/// Weights for [`Combined`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CombinedWeights {
    pub distance: f64,
    pub blocking: f64,
    pub manhattan: f64,
    pub density: f64,
}

impl Default for CombinedWeights {
    fn default() -> Self {
        Self {
            distance: 1.0,
            blocking: 1.0,
            manhattan: 1.0,
            density: 0.5,
        }
    }
}

/// Weighted average of the four other heuristics. An [`UNREACHABLE`]
/// component counts as [`COMBINED_CLAMP`].
#[derive(Copy, Clone, Debug, Default)]
pub struct Combined {
    weights: CombinedWeights,
}

impl Combined {
    pub fn new(weights: CombinedWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> CombinedWeights {
        self.weights
    }
}

impl Heuristic for Combined {
    fn calculate(&self, state: &State) -> u32 {
        let w = self.weights;
        let parts = [
            (DistanceToExit.calculate(state), w.distance),
            (BlockingPieces.calculate(state), w.blocking),
            (ManhattanDistance.calculate(state), w.manhattan),
            (PieceDensity.calculate(state), w.density),
        ];

        let total_weight: f64 = parts.iter().map(|&(_, w)| w.max(0.0)).sum();
        if total_weight <= 0.0 {
            return 0;
        }

        let weighted: f64 = parts
            .iter()
            .map(|&(h, w)| {
                let h = if h >= UNREACHABLE { COMBINED_CLAMP } else { h };
                f64::from(h) * w.max(0.0)
            })
            .sum();
        (weighted / total_weight).round() as u32
    }

    fn name(&self) -> &str {
        "Combined"
    }
}

/// The heuristics, selectable by name.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HeuristicKind {
    DistanceToExit,
    BlockingPieces,
    ManhattanDistance,
    PieceDensity,
    Combined,
}

impl HeuristicKind {
    pub const ALL: [HeuristicKind; 5] = [
        HeuristicKind::DistanceToExit,
        HeuristicKind::BlockingPieces,
        HeuristicKind::ManhattanDistance,
        HeuristicKind::PieceDensity,
        HeuristicKind::Combined,
    ];

    /// A fresh instance, with default weights for [`HeuristicKind::Combined`].
    pub fn build(self) -> Box<dyn Heuristic> {
        match self {
            HeuristicKind::DistanceToExit => Box::new(DistanceToExit),
            HeuristicKind::BlockingPieces => Box::new(BlockingPieces),
            HeuristicKind::ManhattanDistance => Box::new(ManhattanDistance),
            HeuristicKind::PieceDensity => Box::new(PieceDensity),
            HeuristicKind::Combined => Box::new(Combined::default()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HeuristicKind::DistanceToExit => "Distance to Exit",
            HeuristicKind::BlockingPieces => "Blocking Pieces",
            HeuristicKind::ManhattanDistance => "Manhattan Distance",
            HeuristicKind::PieceDensity => "Piece Density",
            HeuristicKind::Combined => "Combined",
        }
    }

    fn alias(self) -> &'static str {
        match self {
            HeuristicKind::DistanceToExit => "distance",
            HeuristicKind::BlockingPieces => "blocking",
            HeuristicKind::ManhattanDistance => "manhattan",
            HeuristicKind::PieceDensity => "density",
            HeuristicKind::Combined => "combined",
        }
    }
}

impl Display for HeuristicKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HeuristicKind {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        HeuristicKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(wanted) || k.alias().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownName {
                kind: "heuristic",
                name: s.to_owned(),
                expected: HeuristicKind::ALL.iter().map(|k| k.alias()).join(", "),
            })
    }
}
