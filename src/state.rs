use std::fmt::{Display, Formatter, Write};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use fxhash::FxHashMap;
use itertools::Itertools;
use smallvec::SmallVec;

use crate::board::{BoardShape, ExitSide, PieceSpec, PlacedPiece, Position};
use crate::error::PuzzleError;

/// Marks an empty cell in a derived grid.
pub const EMPTY: char = '.';
/// Marks the exit in a grid literal.
pub const EXIT_MARKER: char = 'K';

/// One configuration of a puzzle.
///
/// The board shape and the piece descriptions are shared between every state
/// derived from the same initial state; a state owns nothing but the anchor of
/// each piece. Pieces are kept sorted by label, so two states with the same
/// `(label, x, y)` placements compare and hash equal no matter how they were
/// built or reached.
#[derive(Clone, Debug)]
pub struct State {
    shape: Arc<BoardShape>,
    specs: Arc<[PieceSpec]>,
    anchors: SmallVec<[Position; 16]>,
    primary: usize,
}

impl State {
    /// Build a state from a board and a set of placed pieces, checking that
    /// exactly one piece is primary, labels are unique and usable, and every
    /// piece sits on the board without overlapping another.
    ///
    /// The primary's orientation is not checked against the exit side: such a
    /// state is well formed, it just has no solution.
    pub fn new<I>(shape: BoardShape, pieces: I) -> Result<State, PuzzleError>
    where
        I: IntoIterator<Item = PlacedPiece>,
    {
        let pieces = pieces
            .into_iter()
            .sorted_by_key(|p| p.label())
            .collect_vec();

        for (a, b) in pieces.iter().tuple_windows() {
            if a.label() == b.label() {
                return Err(PuzzleError::DuplicateLabel(a.label()));
            }
        }

        let mut owners = FxHashMap::default();
        for piece in &pieces {
            let label = piece.label();
            if label == EMPTY || label == EXIT_MARKER || label.is_whitespace() {
                return Err(PuzzleError::ReservedLabel(label));
            }
            if piece.spec.length < 2 {
                return Err(PuzzleError::PieceTooShort {
                    label,
                    length: usize::from(piece.spec.length),
                });
            }
            if !shape.fits(piece) {
                return Err(PuzzleError::OutOfBounds(label));
            }
            for cell in piece.cells() {
                if let Some(other) = owners.insert(cell, label) {
                    return Err(PuzzleError::Overlap(other, label));
                }
            }
        }

        let primaries = pieces.iter().positions(|p| p.spec.primary).collect_vec();
        let primary = match primaries[..] {
            [index] => index,
            _ => return Err(PuzzleError::PrimaryCount(primaries.len())),
        };

        Ok(State {
            shape: Arc::new(shape),
            specs: pieces.iter().map(|p| p.spec).collect(),
            anchors: pieces.iter().map(|p| p.anchor).collect(),
            primary,
        })
    }

    pub fn shape(&self) -> &BoardShape {
        &self.shape
    }

    pub fn piece_count(&self) -> usize {
        self.specs.len()
    }

    /// Every piece, in label order.
    pub fn pieces(&self) -> impl Iterator<Item = PlacedPiece> + '_ {
        (0..self.specs.len()).map(move |index| self.piece_at(index))
    }

    pub fn labels(&self) -> impl Iterator<Item = char> + '_ {
        self.specs.iter().map(|s| s.label)
    }

    /// The named piece.
    ///
    /// # Panics
    ///
    /// If no piece carries `label`.
    pub fn piece(&self, label: char) -> PlacedPiece {
        self.piece_at(self.index_of(label))
    }

    pub fn primary(&self) -> PlacedPiece {
        self.piece_at(self.primary)
    }

    pub fn occupies(&self, label: char, x: i32, y: i32) -> bool {
        self.piece(label).occupies(x, y)
    }

    pub fn is_cell_occupied(&self, x: i32, y: i32) -> bool {
        self.occupant(x, y).is_some()
    }

    /// The label of the piece covering `(x, y)`, if any.
    pub fn occupant(&self, x: i32, y: i32) -> Option<char> {
        self.pieces().find(|p| p.occupies(x, y)).map(|p| p.label())
    }

    /// Whether moving the named piece to `(new_x, new_y)` would put it on a
    /// cell held by another piece. Cells the piece already covers never count.
    pub fn would_collide(&self, label: char, new_x: i32, new_y: i32) -> bool {
        self.would_collide_at(self.index_of(label), Position::new(new_x, new_y))
    }

    /// The same state with the named piece's anchor moved to `(new_x, new_y)`.
    /// Neither bounds nor collisions are checked.
    pub fn with_moved(&self, label: char, new_x: i32, new_y: i32) -> State {
        self.with_moved_at(self.index_of(label), Position::new(new_x, new_y))
    }

    /// Whether the primary piece has reached the exit.
    pub fn is_goal(&self) -> bool {
        self.shape.is_through_exit(&self.primary())
    }

    /// The board as rows of cells, computed from the piece positions. Cells of
    /// a primary piece that has left the board are dropped.
    pub fn grid(&self) -> Vec<Vec<char>> {
        let (rows, cols) = (self.shape.rows(), self.shape.cols());
        let mut grid = vec![vec![EMPTY; cols as usize]; rows as usize];
        for piece in self.pieces() {
            for cell in piece.cells().filter(|&c| self.shape.contains(c)) {
                grid[cell.y as usize][cell.x as usize] = piece.label();
            }
        }
        grid
    }

    pub(crate) fn piece_at(&self, index: usize) -> PlacedPiece {
        PlacedPiece {
            spec: self.specs[index],
            anchor: self.anchors[index],
        }
    }

    pub(crate) fn index_of(&self, label: char) -> usize {
        self.specs
            .iter()
            .position(|s| s.label == label)
            .unwrap_or_else(|| panic!("no piece labelled {label:?} in this state"))
    }

    pub(crate) fn would_collide_at(&self, index: usize, to: Position) -> bool {
        let current = self.piece_at(index);
        current
            .moved_to(to)
            .cells()
            .filter(|c| !current.occupies(c.x, c.y))
            .any(|c| {
                self.pieces()
                    .enumerate()
                    .any(|(other, p)| other != index && p.occupies(c.x, c.y))
            })
    }

    pub(crate) fn with_moved_at(&self, index: usize, to: Position) -> State {
        let mut next = self.clone();
        next.anchors[index] = to;
        next
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.anchors == other.anchors
            && (Arc::ptr_eq(&self.specs, &other.specs) || self.labels().eq(other.labels()))
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for (spec, anchor) in self.specs.iter().zip(&self.anchors) {
            spec.label.hash(state);
            anchor.hash(state);
        }
    }
}

/// Renders the grid with the exit marker placed outside it, in the form the
/// layout loader reads back.
impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let side = self.shape.exit_side();
        let lane = self.shape.lane() as usize;
        let marker_line = |f: &mut Formatter<'_>| -> std::fmt::Result {
            writeln!(f, "{}{}", " ".repeat(lane), EXIT_MARKER)
        };

        if side == ExitSide::Top {
            marker_line(f)?;
        }

        for (y, row) in self.grid().into_iter().enumerate() {
            if side == ExitSide::Left {
                f.write_char(if y == lane { EXIT_MARKER } else { ' ' })?;
            }
            for c in row {
                f.write_char(c)?;
            }
            if side == ExitSide::Right && y == lane {
                f.write_char(EXIT_MARKER)?;
            }
            f.write_char('\n')?;
        }

        if side == ExitSide::Bottom {
            marker_line(f)?;
        }

        Ok(())
    }
}
