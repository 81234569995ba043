//! Text grid literals.
//!
//! A layout is the board drawn row by row: `.` (or a space) is an empty
//! cell, any other character is one cell of the piece with that label, and a
//! single `K` outside the grid marks the exit. The exit goes on its own line
//! above or below the grid for a top or bottom exit, at the start of a row for
//! a left exit (every other row then starts with a space), or just past the
//! end of a row for a right exit:
//!
//! ```text
//! ......
//! ....B.
//! ..PPB.K
//! ......
//! ```
//!
//! The primary piece is always labelled `P`.
//!
//! A layout may also start with a header giving the board size and the number
//! of pieces besides the primary, one line each:
//!
//! ```text
//! 3 4
//! 1
//! ....
//! .PP.K
//! AA..
//! ```

use fxhash::FxHashMap;
use itertools::Itertools;

use crate::board::{BoardShape, ExitSide, Orientation, PieceSpec, PlacedPiece, Position};
use crate::error::PuzzleError;
use crate::state::{State, EMPTY, EXIT_MARKER};

pub const PRIMARY_LABEL: char = 'P';

fn is_marker_line(line: &str) -> bool {
    line.trim_start_matches(' ') == "K"
}

// only plain spaces are accepted as indentation, one column each
fn indent(line: &str) -> i32 {
    line.chars().take_while(|&c| c == ' ').count() as i32
}

fn is_empty_cell(c: char) -> bool {
    c == EMPTY || c == ' '
}

// trailing whitespace never matters; blank lines are dropped around the grid
// but kept inside it as rows of empty cells
fn content_lines(text: &str) -> Vec<&str> {
    let lines = text.lines().map(str::trim_end).collect_vec();
    match (
        lines.iter().position(|l| !l.is_empty()),
        lines.iter().rposition(|l| !l.is_empty()),
    ) {
        (Some(first), Some(last)) => lines[first..=last].to_vec(),
        _ => Vec::new(),
    }
}

/// Board size and number of non-primary pieces, declared ahead of the grid.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct Header {
    rows: i32,
    cols: i32,
    pieces: usize,
}

// `rows cols` on the first line and the piece count on the second. A first
// line that is not two integers means the layout has no header.
fn parse_header(lines: &[&str]) -> Result<Option<Header>, PuzzleError> {
    let Some((rows, cols)) = lines
        .first()
        .and_then(|l| l.split_whitespace().collect_tuple::<(&str, &str)>())
        .and_then(|(r, c)| Some((r.parse::<i32>().ok()?, c.parse::<i32>().ok()?)))
    else {
        return Ok(None);
    };
    if rows <= 1 || cols <= 1 {
        return Err(PuzzleError::BoardTooSmall { rows, cols });
    }

    let count_line = lines.get(1).copied().unwrap_or_default();
    let count = count_line
        .trim()
        .parse::<i64>()
        .map_err(|_| PuzzleError::MalformedHeader(count_line.to_owned()))?;
    let pieces = usize::try_from(count).map_err(|_| PuzzleError::NegativePieceCount(count))?;

    Ok(Some(Header { rows, cols, pieces }))
}

/// Parse a layout into its initial state.
///
/// The grid may be preceded by a header of two lines, `rows cols` and the
/// number of non-primary pieces. With a header the grid is read
/// case-insensitively and must match the declared size and piece count.
pub fn parse_layout(text: &str) -> Result<State, PuzzleError> {
    let lines = content_lines(text);
    let Some(header) = parse_header(&lines)? else {
        return parse_grid(lines, None);
    };

    let body = lines[2..].join("\n").to_uppercase();
    let state = parse_grid(content_lines(&body), Some(header))?;

    let found = state.piece_count() - 1;
    if found != header.pieces {
        return Err(PuzzleError::PieceCountMismatch {
            expected: header.pieces,
            found,
        });
    }
    Ok(state)
}

fn parse_grid(mut lines: Vec<&str>, header: Option<Header>) -> Result<State, PuzzleError> {
    match lines.iter().map(|l| l.matches(EXIT_MARKER).count()).sum::<usize>() {
        0 => return Err(PuzzleError::MissingExit),
        1 => {}
        n => return Err(PuzzleError::MultipleExits(n)),
    }

    let mut exit = None;
    if lines.first().map_or(false, |l| is_marker_line(l)) {
        exit = Some((ExitSide::Top, indent(lines.remove(0))));
    } else if let Some(line) = lines.last().copied().filter(|l| is_marker_line(l)) {
        lines.pop();
        exit = Some((ExitSide::Bottom, indent(line)));
    }

    let mut rows = lines.iter().map(|l| l.chars().collect_vec()).collect_vec();

    let (exit_side, lane) = match exit {
        Some(exit) => exit,
        None => locate_side_exit(&mut rows)?,
    };

    let height = rows.len() as i32;
    let width = rows.iter().map(Vec::len).max().unwrap_or(0) as i32;
    if let Some(header) = header {
        if (height, width) != (header.rows, header.cols) {
            return Err(PuzzleError::DimensionMismatch {
                rows: header.rows,
                cols: header.cols,
                found_rows: height,
                found_cols: width,
            });
        }
    }
    let shape = BoardShape::new(height, width, exit_side, lane)?;

    let mut cells: FxHashMap<char, Vec<Position>> = FxHashMap::default();
    for (y, row) in rows.iter().enumerate() {
        for (x, &c) in row.iter().enumerate() {
            if !is_empty_cell(c) {
                cells
                    .entry(c)
                    .or_default()
                    .push(Position::new(x as i32, y as i32));
            }
        }
    }

    let pieces = cells
        .into_iter()
        .sorted_by_key(|(label, _)| *label)
        .map(|(label, cells)| piece_from_cells(label, &cells))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(primary) = pieces.iter().find(|p| p.spec.primary) {
        if primary.spec.orientation != exit_side.orientation() {
            return Err(PuzzleError::IncompatiblePrimary {
                orientation: primary.spec.orientation,
                side: exit_side,
            });
        }
    }

    State::new(shape, pieces)
}

// find the marker inside the grid rows, check it sits on the left or right
// edge, and strip it (plus the left margin) from the rows
fn locate_side_exit(rows: &mut [Vec<char>]) -> Result<(ExitSide, i32), PuzzleError> {
    let (row, col) = rows
        .iter()
        .enumerate()
        .find_map(|(y, r)| r.iter().position(|&c| c == EXIT_MARKER).map(|x| (y, x)))
        .ok_or(PuzzleError::MissingExit)?;

    if col == 0 {
        for (y, r) in rows.iter_mut().enumerate() {
            if r.is_empty() {
                continue;
            }
            if y != row && r[0] != ' ' {
                return Err(PuzzleError::MissingLeftMargin(y));
            }
            r.remove(0);
        }
        return Ok((ExitSide::Left, row as i32));
    }

    if col + 1 != rows[row].len() {
        return Err(PuzzleError::ExitInsideBoard { row, col });
    }
    rows[row].pop();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if col != width {
        return Err(PuzzleError::ExitInsideBoard { row, col });
    }
    Ok((ExitSide::Right, row as i32))
}

// cells arrive in row-major order
fn piece_from_cells(label: char, cells: &[Position]) -> Result<PlacedPiece, PuzzleError> {
    if cells.len() < 2 {
        return Err(PuzzleError::PieceTooShort {
            label,
            length: cells.len(),
        });
    }

    let orientation = if cells.iter().map(|c| c.y).all_equal() {
        Orientation::Horizontal
    } else if cells.iter().map(|c| c.x).all_equal() {
        Orientation::Vertical
    } else {
        return Err(PuzzleError::DisconnectedPiece(label));
    };

    let contiguous = cells.iter().tuple_windows().all(|(a, b)| match orientation {
        Orientation::Horizontal => b.x == a.x + 1,
        Orientation::Vertical => b.y == a.y + 1,
    });
    if !contiguous {
        return Err(PuzzleError::DisconnectedPiece(label));
    }

    let length = u8::try_from(cells.len()).map_err(|_| PuzzleError::OutOfBounds(label))?;
    let spec = if label == PRIMARY_LABEL {
        PieceSpec::primary(label, length, orientation)
    } else {
        PieceSpec::new(label, length, orientation)
    };
    Ok(spec.at(cells[0].x, cells[0].y))
}
