//! Writhe and size of a grid diagram, absolute and per move.
//!
//! The writhe of a grid diagram sums, over every crossing of a row segment
//! with a column segment, `-dir(column) * dir(row)`. Vertical segments are
//! drawn over horizontal ones, so every interior intersection is a crossing.
//!
//! The incremental formulas below examine only the strands a move touches.
//! They are written once for an "along" axis (the axis the move acts on)
//! and an "across" axis, in terms of each strand's orientation
//! `sign(o - x)`. In that form the writhe and every formula are unchanged
//! by transposing the grid, so a row move on `(rows, cols)` and a column
//! move on `(cols, rows)` share the same code.

use crate::diagram::GridDiagram;
use crate::error::GridError;
use crate::moves::{Axis, Marker, Move, MoveType};
use crate::strand::Strand;

/// Change in grid size caused by a move of the given type.
pub fn delta_size(move_type: MoveType) -> i64 {
    match move_type {
        MoveType::Stabilization => 1,
        MoveType::Destabilization => -1,
        MoveType::Commutation => 0,
    }
}

impl GridDiagram {
    /// Computes the writhe by visiting every crossing. O(n²).
    pub fn writhe(&self) -> i64 {
        let n = self.size();
        let mut total = 0;
        // The first and last rows cannot lie strictly inside a column.
        for i in 1..n.saturating_sub(1) {
            let row = &self.rows[i];
            for col in &self.cols[row.min_col() + 1..row.max_col()] {
                if col.straddles(i) {
                    total -= col.direction() * row.direction();
                }
            }
        }
        total
    }

    /// Returns by how much [`GridDiagram::writhe`] changes when `mv` is
    /// applied, without applying it.
    ///
    /// Fails with [`GridError::InvalidArgument`] if `mv` is not valid for
    /// this diagram.
    pub fn delta_writhe(&self, mv: Move) -> Result<i64, GridError> {
        if !self.is_valid(mv)? {
            return Err(GridError::InvalidArgument(format!(
                "{mv} is not a valid move for this diagram"
            )));
        }
        Ok(self.delta_writhe_unchecked(mv))
    }

    /// Writhe delta for a move already known to be valid.
    pub(crate) fn delta_writhe_unchecked(&self, mv: Move) -> i64 {
        match mv {
            Move::Commutation { axis, index } => match axis {
                Axis::Row => commutation_delta(&self.rows, &self.cols, index),
                Axis::Column => commutation_delta(&self.cols, &self.rows, index),
            },
            Move::Stabilization { row, col, kind } => {
                let split = kind.split_marker();
                match kind.split_axis() {
                    Axis::Row => stabilization_delta(&self.rows, &self.cols, row, col, split),
                    Axis::Column => stabilization_delta(&self.cols, &self.rows, col, row, split),
                }
            }
            Move::Destabilization { axis, index } => match axis {
                Axis::Row => destabilization_delta(&self.rows, &self.cols, index),
                Axis::Column => destabilization_delta(&self.cols, &self.rows, index),
            },
        }
    }
}

/// Swapping strands `index` and `index + 1`.
///
/// Away from the wrap only a shared endpoint between oppositely oriented
/// strands gains or loses a crossing. Swapping the last strand with the
/// first moves each of them across the whole grid, so every endpoint
/// contributes according to the orientation of the strand it continues
/// into.
fn commutation_delta<A: Strand, B: Strand>(along: &[A], across: &[B], index: usize) -> i64 {
    let n = along.len();
    let this = along[index];
    let next = along[(index + 1) % n];

    if index + 1 < n {
        if this.orientation() != -next.orientation() {
            return 0;
        }
        let s = this.orientation();
        let shorter = if this.len() < next.len() { 1 } else { -1 };
        let mut delta = 0;
        if this.x() == next.o() {
            delta -= shorter * s;
        }
        if this.o() == next.x() {
            delta += shorter * s;
        }
        return delta;
    }

    let mut delta = 0;
    if this.x() == next.o() {
        delta += shared_endpoint_delta(this, next, -1);
    } else {
        delta -= aligned(along[across[this.x()].o()], this);
        delta -= aligned(along[across[next.o()].x()], next);
    }
    if this.o() == next.x() {
        delta += shared_endpoint_delta(this, next, 1);
    } else {
        delta += aligned(along[across[this.o()].x()], this);
        delta += aligned(along[across[next.x()].o()], next);
    }
    delta
}

/// `strand`'s orientation if `neighbour` runs the same way, else 0.
fn aligned<A: Strand>(neighbour: A, strand: A) -> i64 {
    if neighbour.orientation() == strand.orientation() {
        strand.orientation()
    } else {
        0
    }
}

/// Wrap-around swap of two strands joined at one endpoint.
fn shared_endpoint_delta<A: Strand>(this: A, next: A, sign: i64) -> i64 {
    if this.orientation() == next.orientation() {
        2 * sign * this.orientation()
    } else if next.len() < this.len() {
        sign * next.orientation()
    } else {
        -sign * next.orientation()
    }
}

/// Removing strand `index`, whose markers are adjacent.
///
/// The two perpendicular strands at its ends merge into one. If they run the
/// same way no crossing changes. Otherwise the shorter one is absorbed, and
/// the strand it continued into loses its crossing with the other one if it
/// straddled the removed strand's far end.
fn destabilization_delta<A: Strand, B: Strand>(along: &[A], across: &[B], index: usize) -> i64 {
    let strand = along[index];
    let x_end = across[strand.x()];
    let o_end = across[strand.o()];
    if x_end.orientation() == o_end.orientation() {
        return 0;
    }

    let (crossing, endpoint, other) = if x_end.len() < o_end.len() {
        (along[x_end.o()], strand.o(), o_end)
    } else {
        (along[o_end.x()], strand.x(), x_end)
    };
    if crossing.straddles(endpoint) {
        -crossing.orientation() * other.orientation()
    } else {
        0
    }
}

/// Splitting strand `split_index` with a new perpendicular strand inserted
/// at `insert_at`.
///
/// Inserting inside the strand's extent only shortens it. Inserting beyond
/// one end creates a kink whose single crossing, if any, depends on which
/// side it is on, which way the end strand turns, and which marker moves.
fn stabilization_delta<A: Strand, B: Strand>(
    along: &[A],
    across: &[B],
    split_index: usize,
    insert_at: usize,
    split: Marker,
) -> i64 {
    let strand = along[split_index];
    let (side, end) = if insert_at <= strand.min() {
        (-1, strand.min())
    } else if strand.max() < insert_at {
        (1, strand.max())
    } else {
        return 0;
    };
    let turn = if across[end].min() == split_index { 1 } else { -1 };
    let sense = match split {
        Marker::O => strand.orientation(),
        Marker::X => -strand.orientation(),
    };
    if side * turn == sense { -sense } else { 0 }
}
