//! The static description of a puzzle: pieces, their orientations, and the
//! shape of the board with its single exit.

use std::fmt::{Display, Formatter};
use std::ops::Neg;

use crate::error::PuzzleError;

/// The axis a piece lies along. A piece only ever slides along this axis.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// The two directions a piece with this orientation can slide in, in the
    /// order moves are generated.
    pub fn directions(self) -> [Direction; 2] {
        match self {
            Orientation::Horizontal => [Direction::Left, Direction::Right],
            Orientation::Vertical => [Direction::Up, Direction::Down],
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        })
    }
}

/// A direction for a slide. A direction may be flipped with [`Neg`] (i.e. `-`).
#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step as `(dx, dy)`, with `y` growing downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        })
    }
}

impl Neg for Direction {
    type Output = Self;

    fn neg(self) -> Self::Output {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// The edge of the board the exit opening sits on.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ExitSide {
    Top,
    Right,
    Bottom,
    Left,
}

impl ExitSide {
    /// The orientation the primary piece needs to be able to leave through
    /// this side.
    pub fn orientation(self) -> Orientation {
        match self {
            ExitSide::Top | ExitSide::Bottom => Orientation::Vertical,
            ExitSide::Left | ExitSide::Right => Orientation::Horizontal,
        }
    }

    /// The direction the primary piece travels to leave through this side.
    pub fn travel(self) -> Direction {
        match self {
            ExitSide::Top => Direction::Up,
            ExitSide::Right => Direction::Right,
            ExitSide::Bottom => Direction::Down,
            ExitSide::Left => Direction::Left,
        }
    }
}

impl Display for ExitSide {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ExitSide::Top => "top",
            ExitSide::Right => "right",
            ExitSide::Bottom => "bottom",
            ExitSide::Left => "left",
        })
    }
}

/// A cell coordinate. `x` is the column and `y` the row; both may be negative
/// or past the far edge for the exit cell and for a primary piece that has
/// slid through it.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The position `by` cells away in direction `dir`.
    pub fn shift(self, dir: Direction, by: i32) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx * by, self.y + dy * by)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// The immutable description of one piece.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PieceSpec {
    pub label: char,
    pub length: u8,
    pub orientation: Orientation,
    pub primary: bool,
}

impl PieceSpec {
    pub fn new(label: char, length: u8, orientation: Orientation) -> Self {
        Self {
            label,
            length,
            orientation,
            primary: false,
        }
    }

    /// The piece that has to reach the exit.
    pub fn primary(label: char, length: u8, orientation: Orientation) -> Self {
        Self {
            primary: true,
            ..Self::new(label, length, orientation)
        }
    }

    /// Place this piece with its top-left cell at `(x, y)`.
    pub fn at(self, x: i32, y: i32) -> PlacedPiece {
        PlacedPiece {
            spec: self,
            anchor: Position::new(x, y),
        }
    }
}

/// A piece together with its top-left anchor.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PlacedPiece {
    pub spec: PieceSpec,
    pub anchor: Position,
}

impl PlacedPiece {
    pub fn label(&self) -> char {
        self.spec.label
    }

    pub fn length(&self) -> i32 {
        i32::from(self.spec.length)
    }

    pub fn is_horizontal(&self) -> bool {
        self.spec.orientation == Orientation::Horizontal
    }

    /// Every cell this piece covers, starting at the anchor.
    #[auto_enums::auto_enum(Iterator)]
    pub fn cells(&self) -> impl Iterator<Item = Position> {
        let Position { x, y } = self.anchor;
        let len = self.length();
        match self.spec.orientation {
            Orientation::Horizontal => (x..x + len).map(move |x| Position::new(x, y)),
            Orientation::Vertical => (y..y + len).map(move |y| Position::new(x, y)),
        }
    }

    pub fn occupies(&self, x: i32, y: i32) -> bool {
        let a = self.anchor;
        if self.is_horizontal() {
            y == a.y && x >= a.x && x < a.x + self.length()
        } else {
            x == a.x && y >= a.y && y < a.y + self.length()
        }
    }

    /// The same piece with its anchor moved to `to`.
    pub fn moved_to(&self, to: Position) -> Self {
        Self {
            spec: self.spec,
            anchor: to,
        }
    }
}

/// Board dimensions and exit, shared by every state of one puzzle.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct BoardShape {
    rows: i32,
    cols: i32,
    exit_side: ExitSide,
    exit: Position,
}

impl BoardShape {
    /// A `rows` x `cols` board whose exit sits on `exit_side`, in row `lane`
    /// for a left/right exit or column `lane` for a top/bottom exit.
    pub fn new(rows: i32, cols: i32, exit_side: ExitSide, lane: i32) -> Result<Self, PuzzleError> {
        if rows <= 1 || cols <= 1 {
            return Err(PuzzleError::BoardTooSmall { rows, cols });
        }

        let (lanes, exit) = match exit_side {
            ExitSide::Top => (cols, Position::new(lane, -1)),
            ExitSide::Right => (rows, Position::new(cols, lane)),
            ExitSide::Bottom => (cols, Position::new(lane, rows)),
            ExitSide::Left => (rows, Position::new(-1, lane)),
        };
        if lane < 0 || lane >= lanes {
            return Err(PuzzleError::ExitOutOfRange {
                side: exit_side,
                lane,
            });
        }

        Ok(Self {
            rows,
            cols,
            exit_side,
            exit,
        })
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn exit_side(&self) -> ExitSide {
        self.exit_side
    }

    /// The exit cell, one step outside the grid.
    pub fn exit(&self) -> Position {
        self.exit
    }

    /// The row (left/right exit) or column (top/bottom exit) of the exit.
    pub fn lane(&self) -> i32 {
        match self.exit_side {
            ExitSide::Top | ExitSide::Bottom => self.exit.x,
            ExitSide::Left | ExitSide::Right => self.exit.y,
        }
    }

    pub fn contains(&self, p: Position) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.cols && p.y < self.rows
    }

    /// Whether every cell of `piece` lies on the board.
    pub fn fits(&self, piece: &PlacedPiece) -> bool {
        piece.cells().all(|c| self.contains(c))
    }

    /// Whether `piece` is lined up with the exit: the right orientation, in
    /// the exit's row or column.
    pub fn is_aligned(&self, piece: &PlacedPiece) -> bool {
        piece.spec.orientation == self.exit_side.orientation()
            && match self.exit_side {
                ExitSide::Top | ExitSide::Bottom => piece.anchor.x == self.exit.x,
                ExitSide::Left | ExitSide::Right => piece.anchor.y == self.exit.y,
            }
    }

    /// Whether sliding the primary `piece` one cell in `dir` from where it is
    /// now carries it into the exit. Such a step skips the bounds and
    /// collision checks every other step is subject to.
    pub fn is_exit_step(&self, piece: &PlacedPiece, dir: Direction) -> bool {
        if !piece.spec.primary || dir != self.exit_side.travel() || !self.is_aligned(piece) {
            return false;
        }

        let a = piece.anchor;
        match self.exit_side {
            ExitSide::Top => a.y == 0,
            ExitSide::Right => a.x + piece.length() == self.cols,
            ExitSide::Bottom => a.y + piece.length() == self.rows,
            ExitSide::Left => a.x == 0,
        }
    }

    /// Whether the primary `piece` has reached the exit edge or gone through
    /// it. This is the goal test, and it holds for every state an exit step
    /// produces.
    pub fn is_through_exit(&self, piece: &PlacedPiece) -> bool {
        if !self.is_aligned(piece) {
            return false;
        }

        let a = piece.anchor;
        match self.exit_side {
            ExitSide::Top => a.y <= 0,
            ExitSide::Right => a.x + piece.length() - 1 >= self.cols - 1,
            ExitSide::Bottom => a.y + piece.length() - 1 >= self.rows - 1,
            ExitSide::Left => a.x <= 0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cells_follow_orientation() {
        let h = PieceSpec::new('A', 3, Orientation::Horizontal).at(1, 2);
        let v = PieceSpec::new('B', 2, Orientation::Vertical).at(4, 0);

        assert_eq!(
            h.cells().collect::<Vec<_>>(),
            vec![Position::new(1, 2), Position::new(2, 2), Position::new(3, 2)]
        );
        assert_eq!(
            v.cells().collect::<Vec<_>>(),
            vec![Position::new(4, 0), Position::new(4, 1)]
        );
        assert!(h.occupies(3, 2));
        assert!(!h.occupies(4, 2));
        assert!(v.occupies(4, 1));
        assert!(!v.occupies(3, 1));
    }

    #[test]
    fn exit_cell_sits_outside_the_grid() {
        let shape = |side, lane| BoardShape::new(4, 5, side, lane).unwrap().exit();

        assert_eq!(shape(ExitSide::Top, 2), Position::new(2, -1));
        assert_eq!(shape(ExitSide::Right, 1), Position::new(5, 1));
        assert_eq!(shape(ExitSide::Bottom, 4), Position::new(4, 4));
        assert_eq!(shape(ExitSide::Left, 3), Position::new(-1, 3));
    }

    #[test]
    fn rejects_degenerate_shapes() {
        assert_eq!(
            BoardShape::new(1, 6, ExitSide::Right, 0),
            Err(PuzzleError::BoardTooSmall { rows: 1, cols: 6 })
        );
        assert_eq!(
            BoardShape::new(6, 6, ExitSide::Top, 6),
            Err(PuzzleError::ExitOutOfRange {
                side: ExitSide::Top,
                lane: 6
            })
        );
    }

    #[test]
    fn exit_step_and_goal_agree() {
        let shape = BoardShape::new(6, 6, ExitSide::Right, 2).unwrap();
        let primary = PieceSpec::primary('P', 2, Orientation::Horizontal);

        let flush = primary.at(4, 2);
        assert!(shape.is_exit_step(&flush, Direction::Right));
        assert!(!shape.is_exit_step(&flush, Direction::Left));
        assert!(shape.is_through_exit(&flush));
        assert!(shape.is_through_exit(&flush.moved_to(Position::new(5, 2))));

        let short = primary.at(3, 2);
        assert!(!shape.is_exit_step(&short, Direction::Right));
        assert!(!shape.is_through_exit(&short));

        let wrong_row = primary.at(4, 3);
        assert!(!shape.is_exit_step(&wrong_row, Direction::Right));
        assert!(!shape.is_through_exit(&wrong_row));

        let ordinary = PieceSpec::new('A', 2, Orientation::Horizontal).at(4, 2);
        assert!(!shape.is_exit_step(&ordinary, Direction::Right));
    }

    #[test]
    fn vertical_exits() {
        let top = BoardShape::new(5, 5, ExitSide::Top, 1).unwrap();
        let bottom = BoardShape::new(5, 5, ExitSide::Bottom, 1).unwrap();
        let primary = PieceSpec::primary('P', 3, Orientation::Vertical);

        assert!(top.is_exit_step(&primary.at(1, 0), Direction::Up));
        assert!(top.is_through_exit(&primary.at(1, -1)));
        assert!(!top.is_through_exit(&primary.at(2, 0)));

        assert!(bottom.is_exit_step(&primary.at(1, 2), Direction::Down));
        assert!(bottom.is_through_exit(&primary.at(1, 2)));
        assert!(!bottom.is_through_exit(&primary.at(1, 1)));
    }
}
