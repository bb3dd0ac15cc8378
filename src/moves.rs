//! Cromwell moves: commutation, stabilization and destabilization.
//!
//! Every move is available as a predicate, as a raw mutation that only
//! range-checks its indices, and as an apply-if-valid convenience. The raw
//! form trusts the caller to have checked validity first; applying an
//! invalid commutation or destabilization leaves a diagram of a different
//! link type (or, for destabilization, an inconsistent one).
//!
//! Rows and columns are handled by the same generic code: a move on a row
//! acts on `(rows, cols)` exactly as the same move on a column acts on
//! `(cols, rows)`.

use std::fmt;

use tracing::{debug, trace};

use crate::diagram::GridDiagram;
use crate::error::GridError;
use crate::strand::Strand;

/// The axis a move acts along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Row,
    Column,
}

/// The four ways of inserting a new row and column.
///
/// The `Column` kinds split the row that ends up just below the new row;
/// the `Row` kinds split the column that ends up just right of the new
/// column. `Xo` kinds move the split strand's O marker onto the new strand,
/// `Ox` kinds its X marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StabilizationKind {
    InsertXoColumn,
    InsertOxColumn,
    InsertXoRow,
    InsertOxRow,
}

/// Which marker of the split strand is handed to the new strand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker {
    X,
    O,
}

impl StabilizationKind {
    pub const ALL: [Self; 4] = [
        Self::InsertXoColumn,
        Self::InsertOxColumn,
        Self::InsertXoRow,
        Self::InsertOxRow,
    ];

    /// Axis of the existing strand that is split. Its index must be below
    /// the grid size while the other coordinate may equal it.
    pub fn split_axis(self) -> Axis {
        match self {
            Self::InsertXoColumn | Self::InsertOxColumn => Axis::Row,
            Self::InsertXoRow | Self::InsertOxRow => Axis::Column,
        }
    }

    pub(crate) fn split_marker(self) -> Marker {
        match self {
            Self::InsertXoColumn | Self::InsertXoRow => Marker::O,
            Self::InsertOxColumn | Self::InsertOxRow => Marker::X,
        }
    }
}

/// Untagged move category, used for size deltas and integer encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveType {
    Commutation = 0,
    Stabilization = 1,
    Destabilization = 2,
}

impl TryFrom<i32> for MoveType {
    type Error = GridError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Commutation),
            1 => Ok(Self::Stabilization),
            2 => Ok(Self::Destabilization),
            other => Err(GridError::InvalidArgument(format!(
                "unknown move type {other}"
            ))),
        }
    }
}

/// A single Cromwell move on a grid diagram of size `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    /// Swap strand `index` with strand `(index + 1) % n` on `axis`.
    Commutation { axis: Axis, index: usize },
    /// Insert a new row at `row` and a new column at `col`.
    Stabilization {
        row: usize,
        col: usize,
        kind: StabilizationKind,
    },
    /// Remove strand `index` on `axis`, whose markers must be adjacent.
    Destabilization { axis: Axis, index: usize },
}

impl Move {
    pub fn move_type(&self) -> MoveType {
        match self {
            Self::Commutation { .. } => MoveType::Commutation,
            Self::Stabilization { .. } => MoveType::Stabilization,
            Self::Destabilization { .. } => MoveType::Destabilization,
        }
    }

    /// Decodes a move from its integer encoding.
    ///
    /// `move_type` is 0 (commutation), 1 (stabilization) or 2
    /// (destabilization). Commutation and destabilization take
    /// `[index, subtype]` with subtype 1 for a column and 2 for a row.
    /// Stabilization takes `[row, col, kind]` with kind 0..=3 in the order
    /// XO column, OX column, XO row, OX row.
    pub fn from_codes(move_type: i32, args: &[i64]) -> Result<Self, GridError> {
        let arg = |i: usize| -> Result<i64, GridError> {
            args.get(i).copied().ok_or_else(|| {
                GridError::InvalidArgument(format!(
                    "move type {move_type} needs argument {i}, got {} arguments",
                    args.len()
                ))
            })
        };
        let index = |i: usize| -> Result<usize, GridError> {
            let value = arg(i)?;
            usize::try_from(value)
                .map_err(|_| GridError::InvalidArgument(format!("negative index {value}")))
        };
        let axis = |i: usize| -> Result<Axis, GridError> {
            match arg(i)? {
                1 => Ok(Axis::Column),
                2 => Ok(Axis::Row),
                other => Err(GridError::InvalidArgument(format!(
                    "unknown move subtype {other}"
                ))),
            }
        };

        Ok(match MoveType::try_from(move_type)? {
            MoveType::Commutation => Self::Commutation {
                axis: axis(1)?,
                index: index(0)?,
            },
            MoveType::Destabilization => Self::Destabilization {
                axis: axis(1)?,
                index: index(0)?,
            },
            MoveType::Stabilization => Self::Stabilization {
                row: index(0)?,
                col: index(1)?,
                kind: match arg(2)? {
                    0 => StabilizationKind::InsertXoColumn,
                    1 => StabilizationKind::InsertOxColumn,
                    2 => StabilizationKind::InsertXoRow,
                    3 => StabilizationKind::InsertOxRow,
                    other => {
                        return Err(GridError::InvalidArgument(format!(
                            "unknown stabilization kind {other}"
                        )));
                    }
                },
            },
        })
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Row => "row",
            Self::Column => "column",
        })
    }
}

impl fmt::Display for StabilizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InsertXoColumn => "insert-xo-column",
            Self::InsertOxColumn => "insert-ox-column",
            Self::InsertXoRow => "insert-xo-row",
            Self::InsertOxRow => "insert-ox-row",
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Commutation { axis, index } => write!(f, "commute {axis} {index}"),
            Self::Stabilization { row, col, kind } => {
                write!(f, "stabilize ({row}, {col}) {kind}")
            }
            Self::Destabilization { axis, index } => write!(f, "destabilize {axis} {index}"),
        }
    }
}

impl GridDiagram {
    /// Returns whether `mv` may be applied to this diagram.
    ///
    /// Fails with [`GridError::IndexOutOfRange`] if the move's indices do not
    /// fit this diagram.
    pub fn is_valid(&self, mv: Move) -> Result<bool, GridError> {
        self.check_move(mv)?;
        Ok(match mv {
            Move::Commutation { axis, index } => match axis {
                Axis::Row => commutes(&self.rows, index),
                Axis::Column => commutes(&self.cols, index),
            },
            // Any in-range insertion point is a stabilization.
            Move::Stabilization { .. } => true,
            Move::Destabilization { axis, index } => match axis {
                Axis::Row => destabilizes(&self.rows, &self.cols, index),
                Axis::Column => destabilizes(&self.cols, &self.rows, index),
            },
        })
    }

    /// Applies `mv` without checking [`GridDiagram::is_valid`].
    ///
    /// Indices are still range-checked.
    pub fn apply(&mut self, mv: Move) -> Result<(), GridError> {
        self.check_move(mv)?;
        match mv {
            Move::Commutation { axis, index } => match axis {
                Axis::Row => commute(&mut self.rows, &mut self.cols, index),
                Axis::Column => commute(&mut self.cols, &mut self.rows, index),
            },
            Move::Stabilization { row, col, kind } => {
                let split = kind.split_marker();
                match kind.split_axis() {
                    Axis::Row => stabilize(&mut self.rows, &mut self.cols, row, col, split),
                    Axis::Column => stabilize(&mut self.cols, &mut self.rows, col, row, split),
                }
            }
            Move::Destabilization { axis, index } => match axis {
                Axis::Row => destabilize(&mut self.rows, &mut self.cols, index),
                Axis::Column => destabilize(&mut self.cols, &mut self.rows, index),
            },
        }
        trace!(%mv, size = self.size(), "applied move");
        debug_assert!(self.is_consistent(), "{mv} broke the grid");
        Ok(())
    }

    /// Applies `mv` if it is valid, reporting whether it was applied.
    pub fn apply_if_valid(&mut self, mv: Move) -> Result<bool, GridError> {
        if !self.is_valid(mv)? {
            debug!(%mv, "rejected invalid move");
            return Ok(false);
        }
        self.apply(mv)?;
        Ok(true)
    }

    /// Returns whether strands `index` and `(index + 1) % n` on `axis` can be
    /// swapped, i.e. their extents do not interleave.
    pub fn is_commutation_valid(&self, axis: Axis, index: usize) -> Result<bool, GridError> {
        self.is_valid(Move::Commutation { axis, index })
    }

    /// Swaps strands `index` and `(index + 1) % n` on `axis` without
    /// checking validity.
    pub fn commute(&mut self, axis: Axis, index: usize) -> Result<(), GridError> {
        self.apply(Move::Commutation { axis, index })
    }

    pub fn commute_if_valid(&mut self, axis: Axis, index: usize) -> Result<bool, GridError> {
        self.apply_if_valid(Move::Commutation { axis, index })
    }

    /// Returns whether a stabilization fits at `(row, col)`.
    ///
    /// Column kinds need `row < n` and `col <= n`; row kinds need `col < n`
    /// and `row <= n`. Out-of-range positions are an error, not `false`.
    pub fn is_stabilization_valid(
        &self,
        row: usize,
        col: usize,
        kind: StabilizationKind,
    ) -> Result<bool, GridError> {
        self.is_valid(Move::Stabilization { row, col, kind })
    }

    /// Inserts a new row at `row` and a new column at `col`, growing the
    /// diagram by one.
    pub fn stabilize(
        &mut self,
        row: usize,
        col: usize,
        kind: StabilizationKind,
    ) -> Result<(), GridError> {
        self.apply(Move::Stabilization { row, col, kind })
    }

    pub fn stabilize_if_valid(
        &mut self,
        row: usize,
        col: usize,
        kind: StabilizationKind,
    ) -> Result<bool, GridError> {
        self.apply_if_valid(Move::Stabilization { row, col, kind })
    }

    /// Returns whether strand `index` on `axis` has adjacent markers and the
    /// diagram is larger than 2.
    pub fn is_destabilization_valid(&self, axis: Axis, index: usize) -> Result<bool, GridError> {
        self.is_valid(Move::Destabilization { axis, index })
    }

    /// Removes strand `index` on `axis` without checking validity.
    pub fn destabilize(&mut self, axis: Axis, index: usize) -> Result<(), GridError> {
        self.apply(Move::Destabilization { axis, index })
    }

    /// Destabilizes column `col` if possible, otherwise row `row`. Returns
    /// the move that was applied.
    pub fn destabilize_if_valid(
        &mut self,
        row: usize,
        col: usize,
    ) -> Result<Option<Move>, GridError> {
        for mv in [
            Move::Destabilization {
                axis: Axis::Column,
                index: col,
            },
            Move::Destabilization {
                axis: Axis::Row,
                index: row,
            },
        ] {
            if self.apply_if_valid(mv)? {
                return Ok(Some(mv));
            }
        }
        Ok(None)
    }

    fn check_move(&self, mv: Move) -> Result<(), GridError> {
        let n = self.size();
        match mv {
            Move::Commutation { index, .. } | Move::Destabilization { index, .. } => {
                self.check_index(index)
            }
            Move::Stabilization { row, col, kind } => {
                // The split strand must exist; the other index is an
                // insertion point and may equal n.
                let (existing, insertion) = match kind.split_axis() {
                    Axis::Row => (row, col),
                    Axis::Column => (col, row),
                };
                self.check_index(existing)?;
                if insertion > n {
                    return Err(GridError::out_of_range(insertion, n));
                }
                Ok(())
            }
        }
    }
}

/// True if the extents of `a` and `b` overlap without one containing the
/// other, with `a` reaching further on both sides.
fn interleaves<A: Strand>(a: &A, b: &A) -> bool {
    a.max() > b.max() && b.max() > a.min() && a.min() > b.min()
}

fn commutes<A: Strand>(along: &[A], index: usize) -> bool {
    let this = &along[index];
    let next = &along[(index + 1) % along.len()];
    !(interleaves(this, next) || interleaves(next, this))
}

fn commute<A: Strand, B: Strand>(along: &mut [A], across: &mut [B], index: usize) {
    let next = (index + 1) % along.len();
    along.swap(index, next);
    for i in [index, next] {
        let strand = along[i];
        across[strand.x()].set_x(i);
        across[strand.o()].set_o(i);
    }
}

/// Inserts a new strand at `at` along the split axis and a new
/// perpendicular strand at `cross_at`.
///
/// The strand previously at `at` moves to `at + 1` and hands its `split`
/// marker to the new strand at `at`; the new perpendicular strand joins the
/// two with markers in rows (or columns) `at` and `at + 1`.
fn stabilize<A: Strand, B: Strand>(
    along: &mut Vec<A>,
    across: &mut Vec<B>,
    at: usize,
    cross_at: usize,
    split: Marker,
) {
    for strand in along.iter_mut() {
        strand.reindex(|v| if v >= cross_at { v + 1 } else { v });
    }
    for strand in across.iter_mut() {
        strand.reindex(|v| if v >= at { v + 1 } else { v });
    }

    let old = at + 1;
    let split_strand = along[at];
    match split {
        Marker::O => {
            let target = split_strand.o();
            along.insert(at, A::from_markers(cross_at, target));
            across.insert(cross_at, B::from_markers(at, old));
            along[old].set_o(cross_at);
            across[target].set_o(at);
        }
        Marker::X => {
            let target = split_strand.x();
            along.insert(at, A::from_markers(target, cross_at));
            across.insert(cross_at, B::from_markers(old, at));
            along[old].set_x(cross_at);
            across[target].set_x(at);
        }
    }
}

/// The strand must have adjacent markers, and its two perpendicular strands
/// must not close up through a single other strand. That 2x2 loop is a
/// separate unknot component, which a destabilization cannot remove.
fn destabilizes<A: Strand, B: Strand>(along: &[A], across: &[B], index: usize) -> bool {
    let strand = along[index];
    along.len() > 2 && strand.len() == 1 && across[strand.o()].x() != across[strand.x()].o()
}

/// Removes strand `index` and the perpendicular strand at its larger
/// marker, merging the markers of the two perpendicular strands into the
/// one that remains.
fn destabilize<A: Strand, B: Strand>(along: &mut Vec<A>, across: &mut Vec<B>, index: usize) {
    let strand = along[index];
    let removed = strand.max();
    let keep = removed - 1;
    let x_target = across[strand.o()].x();
    let o_target = across[strand.x()].o();

    across[keep] = B::from_markers(x_target, o_target);
    along[x_target].set_x(keep);
    along[o_target].set_o(keep);

    along.remove(index);
    across.remove(removed);
    for s in along.iter_mut() {
        s.reindex(|v| if v > removed { v - 1 } else { v });
    }
    for s in across.iter_mut() {
        s.reindex(|v| if v > index { v - 1 } else { v });
    }
}
