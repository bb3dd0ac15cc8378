use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::strand::{Column, Row, Strand};

/// A grid diagram of size `n`.
///
/// An `n x n` grid with exactly one X and one O marker in every row and
/// every column. The diagram is stored twice, as rows (which columns hold
/// the row's markers) and as columns (which rows hold the column's markers),
/// and every operation keeps the two views in agreement:
///
/// `cols[rows[i].x_col()].x_row() == i` and `cols[rows[i].o_col()].o_row() == i`
/// for every row `i`.
///
/// `Clone` produces a fully independent copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GridDiagram {
    pub(crate) rows: Vec<Row>,
    pub(crate) cols: Vec<Column>,
}

/// Persisted form of a grid diagram: for each column, the row of its X
/// marker and the row of its O marker.
///
/// Serializes as a pair of arrays, `[[x_rows...], [o_rows...]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[Vec<usize>; 2]", into = "[Vec<usize>; 2]")]
pub struct SavedGrid {
    pub x_rows: Vec<usize>,
    pub o_rows: Vec<usize>,
}

impl From<[Vec<usize>; 2]> for SavedGrid {
    fn from([x_rows, o_rows]: [Vec<usize>; 2]) -> Self {
        Self { x_rows, o_rows }
    }
}

impl From<SavedGrid> for [Vec<usize>; 2] {
    fn from(saved: SavedGrid) -> Self {
        [saved.x_rows, saved.o_rows]
    }
}

impl GridDiagram {
    /// Builds a diagram from per-column marker rows.
    ///
    /// `x_rows[j]` is the row of the X marker in column `j`, `o_rows[j]` the
    /// row of its O marker. Both must be permutations of `0..n` with
    /// `x_rows[j] != o_rows[j]`, and `n >= 2`.
    pub fn new(x_rows: &[usize], o_rows: &[usize]) -> Result<Self, GridError> {
        let n = x_rows.len();
        if o_rows.len() != n {
            return Err(GridError::InvalidInput(format!(
                "x_rows has {} entries but o_rows has {}",
                n,
                o_rows.len()
            )));
        }
        if n < 2 {
            return Err(GridError::InvalidInput(
                "a grid diagram needs at least 2 columns".to_string(),
            ));
        }

        const EMPTY: usize = usize::MAX;
        let mut x_cols = vec![EMPTY; n];
        let mut o_cols = vec![EMPTY; n];
        for (col, (&x, &o)) in x_rows.iter().zip(o_rows).enumerate() {
            if x >= n || o >= n {
                return Err(GridError::InvalidInput(format!(
                    "column {} refers to row {} outside [0, {})",
                    col,
                    x.max(o),
                    n
                )));
            }
            if x == o {
                return Err(GridError::InvalidInput(format!(
                    "column {col} has its X and O markers in the same row"
                )));
            }
            if x_cols[x] != EMPTY {
                return Err(GridError::InvalidInput(format!(
                    "row {x} holds more than one X marker"
                )));
            }
            if o_cols[o] != EMPTY {
                return Err(GridError::InvalidInput(format!(
                    "row {o} holds more than one O marker"
                )));
            }
            x_cols[x] = col;
            o_cols[o] = col;
        }

        Ok(Self {
            rows: x_cols
                .into_iter()
                .zip(o_cols)
                .map(|(x, o)| Row::new(x, o))
                .collect(),
            cols: x_rows
                .iter()
                .zip(o_rows)
                .map(|(&x, &o)| Column::new(x, o))
                .collect(),
        })
    }

    /// Builds a diagram from explicit row and column arrays, which must
    /// already agree with each other.
    pub fn from_strands(rows: Vec<Row>, cols: Vec<Column>) -> Result<Self, GridError> {
        if rows.len() != cols.len() {
            return Err(GridError::InvalidInput(format!(
                "{} rows but {} columns",
                rows.len(),
                cols.len()
            )));
        }
        if rows.len() < 2 {
            return Err(GridError::InvalidInput(
                "a grid diagram needs at least 2 rows".to_string(),
            ));
        }
        if let Some((j, _)) = cols.iter().enumerate().find(|(_, c)| c.x_row() == c.o_row()) {
            return Err(GridError::InvalidInput(format!(
                "column {j} has its X and O markers in the same row"
            )));
        }
        let diagram = Self { rows, cols };
        if !diagram.is_consistent() {
            return Err(GridError::InvalidInput(
                "rows and columns do not describe the same markers".to_string(),
            ));
        }
        Ok(diagram)
    }

    /// Builds a diagram from its persisted form.
    pub fn from_saved(saved: &SavedGrid) -> Result<Self, GridError> {
        Self::new(&saved.x_rows, &saved.o_rows)
    }

    /// Draws a uniformly random grid diagram of size `n`.
    ///
    /// The X markers form a random permutation and the O markers a random
    /// permutation that never shares a cell with an X. The link type of the
    /// result is arbitrary.
    pub fn random<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<Self, GridError> {
        if n < 2 {
            return Err(GridError::InvalidInput(
                "a grid diagram needs at least 2 columns".to_string(),
            ));
        }
        let mut x_rows: Vec<usize> = (0..n).collect();
        x_rows.shuffle(rng);
        let mut o_rows = x_rows.clone();
        // Rejection sampling; a random permutation is a derangement of
        // another with probability about 1/e.
        loop {
            o_rows.shuffle(rng);
            if o_rows.iter().zip(&x_rows).all(|(o, x)| o != x) {
                break;
            }
        }
        Self::new(&x_rows, &o_rows)
    }

    /// Returns the size `n` of the `n x n` grid.
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Returns row `i`, counting from the top.
    pub fn row(&self, i: usize) -> Result<&Row, GridError> {
        self.rows
            .get(i)
            .ok_or_else(|| GridError::out_of_range(i, self.size()))
    }

    /// Returns column `j`, counting from the left.
    pub fn column(&self, j: usize) -> Result<&Column, GridError> {
        self.cols
            .get(j)
            .ok_or_else(|| GridError::out_of_range(j, self.size()))
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.cols
    }

    /// Returns the persisted form of this diagram.
    pub fn saved(&self) -> SavedGrid {
        SavedGrid {
            x_rows: self.cols.iter().map(Column::x_row).collect(),
            o_rows: self.cols.iter().map(Column::o_row).collect(),
        }
    }

    /// Returns true if the row and column views describe the same markers
    /// and no strand holds its X and O in the same cell.
    ///
    /// Holds for every diagram reachable through the public API; exposed
    /// for tests and debug assertions.
    pub fn is_consistent(&self) -> bool {
        let n = self.size();
        if self.cols.len() != n {
            return false;
        }
        let rows_agree = self.rows.iter().enumerate().all(|(i, row)| {
            row.x_col() < n
                && row.o_col() < n
                && row.x_col() != row.o_col()
                && self.cols[row.x_col()].x_row() == i
                && self.cols[row.o_col()].o_row() == i
        });
        let cols_agree = self.cols.iter().enumerate().all(|(j, col)| {
            col.x_row() < n
                && col.o_row() < n
                && col.x_row() != col.o_row()
                && self.rows[col.x_row()].x_col() == j
                && self.rows[col.o_row()].o_col() == j
        });
        rows_agree && cols_agree
    }

    /// Turns this diagram into its mirror image: columns are reversed and
    /// every row is reflected left to right.
    pub fn mirror(&mut self) -> &mut Self {
        let last = self.size() - 1;
        self.cols.reverse();
        for row in &mut self.rows {
            row.reindex(|c| last - c);
        }
        debug_assert!(self.is_consistent());
        self
    }

    /// Cyclically shifts the diagram `horizontal` columns to the right and
    /// `vertical` rows down, wrapping around the edges.
    pub fn translate(&mut self, horizontal: i64, vertical: i64) -> &mut Self {
        let n = self.size();
        let h = horizontal.rem_euclid(n as i64) as usize;
        let v = vertical.rem_euclid(n as i64) as usize;
        self.rows.rotate_right(v);
        self.cols.rotate_right(h);
        for row in &mut self.rows {
            row.reindex(|c| (c + h) % n);
        }
        for col in &mut self.cols {
            col.reindex(|r| (r + v) % n);
        }
        debug_assert!(self.is_consistent());
        self
    }

    /// Turns this diagram into the connected sum of itself and `other`.
    ///
    /// The last column of `self` is removed; `other`'s columns and rows
    /// (except its first row) are appended with indices offset by `n - 1`,
    /// and the removed column's markers are joined to the markers of
    /// `other`'s first row. The result has size `n + m - 1`.
    pub fn concatenate(&mut self, other: &GridDiagram) -> &mut Self {
        let offset = self.size() - 1;
        let last = self.cols[offset];
        let first = other.rows[0];
        self.cols.truncate(offset);

        self.cols.extend(
            other
                .cols
                .iter()
                .map(|c| Column::new(c.x_row() + offset, c.o_row() + offset)),
        );
        self.rows.extend(
            other.rows[1..]
                .iter()
                .map(|r| Row::new(r.x_col() + offset, r.o_col() + offset)),
        );

        let x_col = first.x_col() + offset;
        let o_col = first.o_col() + offset;
        self.rows[last.x_row()].set_x(x_col);
        self.rows[last.o_row()].set_o(o_col);
        self.cols[x_col].set_x(last.x_row());
        self.cols[o_col].set_o(last.o_row());

        debug_assert!(self.is_consistent());
        self
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<(), GridError> {
        if index < self.size() {
            Ok(())
        } else {
            Err(GridError::out_of_range(index, self.size()))
        }
    }
}

/// Renders one line per row, each preceded by a newline: `X` and `O` at the
/// row's markers, `-` elsewhere.
impl fmt::Display for GridDiagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.size();
        let mut line = String::with_capacity(n + 1);
        for row in &self.rows {
            line.clear();
            line.push('\n');
            line.extend((0..n).map(|j| {
                if j == row.x_col() {
                    'X'
                } else if j == row.o_col() {
                    'O'
                } else {
                    '-'
                }
            }));
            f.write_str(&line)?;
        }
        f.write_str("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn unknot() -> GridDiagram {
        GridDiagram::new(&[0, 1], &[1, 0]).unwrap()
    }

    fn trefoil() -> GridDiagram {
        GridDiagram::new(&[0, 1, 2, 3, 4], &[2, 3, 4, 0, 1]).unwrap()
    }

    #[test]
    fn unknot_builds_both_views() {
        let g = unknot();
        assert_eq!(g.size(), 2);
        assert!(g.is_consistent());
        assert_eq!(g.row(0).unwrap().x_col(), 0);
        assert_eq!(g.row(0).unwrap().o_col(), 1);
        assert_eq!(g.column(1).unwrap().x_row(), 1);
        assert_eq!(g.column(1).unwrap().o_row(), 0);
    }

    #[test]
    fn renders_one_line_per_row() {
        assert_eq!(unknot().to_string(), "\nXO\nOX\n");
        assert_eq!(
            trefoil().to_string(),
            "\nX--O-\n-X--O\nO-X--\n-O-X-\n--O-X\n"
        );
    }

    #[test]
    fn rejects_malformed_input() {
        let cases: [(&[usize], &[usize]); 5] = [
            (&[0, 1], &[1]),
            (&[0], &[0]),
            (&[0, 2], &[1, 0]),
            (&[0, 1], &[0, 1]),
            (&[0, 0, 1], &[1, 2, 0]),
        ];
        for (x, o) in cases {
            assert!(
                matches!(GridDiagram::new(x, o), Err(GridError::InvalidInput(_))),
                "x={:?} o={:?} should be rejected",
                x,
                o
            );
        }
    }

    #[test]
    fn from_strands_checks_agreement() {
        let g = trefoil();
        let rebuilt = GridDiagram::from_strands(g.rows().to_vec(), g.columns().to_vec()).unwrap();
        assert_eq!(rebuilt, g);

        let mut rows = g.rows().to_vec();
        rows.swap(0, 1);
        assert!(matches!(
            GridDiagram::from_strands(rows, g.columns().to_vec()),
            Err(GridError::InvalidInput(_))
        ));
    }

    #[test]
    fn out_of_range_queries_are_rejected() {
        let g = unknot();
        assert_eq!(
            g.row(2).unwrap_err(),
            GridError::IndexOutOfRange { index: 2, size: 2 }
        );
        assert!(g.column(7).is_err());
    }

    #[test]
    fn saved_form_round_trips() {
        let g = trefoil();
        let saved = g.saved();
        assert_eq!(saved.x_rows, vec![0, 1, 2, 3, 4]);
        assert_eq!(saved.o_rows, vec![2, 3, 4, 0, 1]);
        assert_eq!(GridDiagram::from_saved(&saved).unwrap(), g);

        let json = serde_json::to_string(&saved).unwrap();
        assert_eq!(json, "[[0,1,2,3,4],[2,3,4,0,1]]");
    }

    #[test]
    fn clone_is_independent() {
        let original = trefoil();
        let mut copy = original.clone();
        copy.mirror();
        assert_ne!(copy, original);
        assert_eq!(original, trefoil());
    }

    #[test]
    fn mirror_is_an_involution() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        for n in 2..=9 {
            let g = GridDiagram::random(n, &mut rng).unwrap();
            let mut m = g.clone();
            m.mirror();
            assert!(m.is_consistent());
            m.mirror();
            assert_eq!(m, g, "mirror twice should restore n={}", n);
        }
    }

    #[test]
    fn translate_wraps_and_inverts() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        for n in 2..=9 {
            let g = GridDiagram::random(n, &mut rng).unwrap();
            for (h, v) in [(1, 0), (0, 1), (3, -2), (-17, 23)] {
                let mut t = g.clone();
                t.translate(h, v);
                assert!(t.is_consistent());
                t.translate(-h, -v);
                assert_eq!(t, g);
            }
            let mut full = g.clone();
            full.translate(n as i64, -(n as i64));
            assert_eq!(full, g);
        }
    }

    #[test]
    fn translate_moves_markers() {
        let mut g = unknot();
        g.translate(1, 0);
        assert_eq!(g.to_string(), "\nOX\nXO\n");
    }

    #[test]
    fn concatenate_grows_and_stays_consistent() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        for _ in 0..50 {
            let n = rng.random_range(2..8);
            let m = rng.random_range(2..8);
            let mut g = GridDiagram::random(n, &mut rng).unwrap();
            let other = GridDiagram::random(m, &mut rng).unwrap();
            g.concatenate(&other);
            assert_eq!(g.size(), n + m - 1);
            assert!(g.is_consistent(), "connected sum broke the grid:{}", g);
        }
    }

    #[test]
    fn concatenate_with_unknot_adds_one() {
        let mut g = trefoil();
        g.concatenate(&unknot());
        assert_eq!(g.size(), 6);
        assert!(g.is_consistent());
    }

    #[test]
    fn random_diagrams_are_valid() {
        let mut rng = ChaCha20Rng::from_seed([42u8; 32]);
        for n in 2..=12 {
            let g = GridDiagram::random(n, &mut rng).unwrap();
            assert_eq!(g.size(), n);
            assert!(g.is_consistent());
        }
        assert!(GridDiagram::random(1, &mut rng).is_err());
    }

    #[test]
    fn consistency_rejects_strand_with_both_markers_in_one_cell() {
        // Row 1 and column 3 each hold X and O at the same place, while the
        // two views still point at each other.
        let g = GridDiagram {
            rows: vec![
                Row::new(4, 1),
                Row::new(3, 3),
                Row::new(1, 4),
                Row::new(2, 0),
                Row::new(0, 2),
            ],
            cols: vec![
                Column::new(4, 3),
                Column::new(2, 0),
                Column::new(3, 4),
                Column::new(1, 1),
                Column::new(0, 2),
            ],
        };
        assert!(!g.is_consistent());
        assert!(matches!(
            GridDiagram::from_strands(g.rows.clone(), g.cols.clone()),
            Err(GridError::InvalidInput(_))
        ));
    }
}
