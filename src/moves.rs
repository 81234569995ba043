use std::fmt::{Display, Formatter};

use smallvec::{Array, SmallVec};

use crate::board::{Direction, Position};
use crate::state::State;

/// One slide of one piece, any number of cells along its own axis.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Move {
    pub label: char,
    pub direction: Direction,
    /// The piece's anchor after the slide.
    pub to: Position,
    /// Set when the primary piece slides through the exit.
    pub exits: bool,
}

impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Move {} {} to {}", self.label, self.direction, self.to)
    }
}

// slide one piece cell by cell in `dir`, emitting every anchor it can stop at
fn slide<const N: usize>(
    state: &State,
    index: usize,
    dir: Direction,
    out: &mut SmallVec<[(Move, State); N]>,
) where
    [(Move, State); N]: Array<Item = (Move, State)>,
{
    let shape = state.shape();
    let mut piece = state.piece_at(index);

    loop {
        let to = piece.anchor.shift(dir, 1);
        let mv = |exits| Move {
            label: piece.label(),
            direction: dir,
            to,
            exits,
        };

        // the exit step is the only one allowed to leave the grid, and the
        // piece is gone after it
        if shape.is_exit_step(&piece, dir) {
            out.push((mv(true), state.with_moved_at(index, to)));
            return;
        }

        let candidate = piece.moved_to(to);
        if !shape.fits(&candidate) || state.would_collide_at(index, to) {
            return;
        }

        out.push((mv(false), state.with_moved_at(index, to)));
        piece = candidate;
    }
}

/// Push every state reachable from `state` in one move onto `out`.
///
/// Pieces are taken in label order, each in its two directions
/// (left then right, or up then down), nearer targets first.
pub fn perform_moves<const N: usize>(state: &State, out: &mut SmallVec<[(Move, State); N]>)
where
    [(Move, State); N]: Array<Item = (Move, State)>,
{
    for index in 0..state.piece_count() {
        let piece = state.piece_at(index);
        for dir in piece.spec.orientation.directions() {
            slide(state, index, dir, out);
        }
    }
}

/// Every `(move, resulting state)` pair one move away from `state`.
pub fn successors(state: &State) -> Vec<(Move, State)> {
    let mut buffer = SmallVec::<[(Move, State); 32]>::new();
    perform_moves(state, &mut buffer);
    buffer.into_vec()
}
