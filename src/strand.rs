//! Rows and columns of a grid diagram.
//!
//! Both store the positions of their X and O markers along the perpendicular
//! axis and cache the derived extent. They differ only in the sign
//! convention of [`Row::direction`] and [`Column::direction`].

use std::fmt;

/// Marker positions plus the values derived from them.
///
/// `orientation` is `sign(o - x)`; the derived fields are rebuilt by
/// [`Markers::new`] on every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Markers {
    x: usize,
    o: usize,
    min: usize,
    max: usize,
    length: usize,
    orientation: i8,
}

impl Markers {
    fn new(x: usize, o: usize) -> Self {
        let (min, max) = if x < o { (x, o) } else { (o, x) };
        let orientation = match o.cmp(&x) {
            std::cmp::Ordering::Greater => 1,
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => 0,
        };
        Self {
            x,
            o,
            min,
            max,
            length: max - min,
            orientation,
        }
    }
}

/// Common access to rows and columns so that moves and writhe deltas can be
/// written once for both axes.
///
/// Orientation is measured as `sign(o - x)` on both axes. With that
/// convention every move and every writhe formula is unchanged by
/// transposing the grid.
pub(crate) trait Strand: Copy {
    fn from_markers(x: usize, o: usize) -> Self;
    fn markers(&self) -> &Markers;
    fn markers_mut(&mut self) -> &mut Markers;

    #[inline]
    fn x(&self) -> usize {
        self.markers().x
    }

    #[inline]
    fn o(&self) -> usize {
        self.markers().o
    }

    #[inline]
    fn min(&self) -> usize {
        self.markers().min
    }

    #[inline]
    fn max(&self) -> usize {
        self.markers().max
    }

    #[inline]
    fn len(&self) -> usize {
        self.markers().length
    }

    #[inline]
    fn orientation(&self) -> i64 {
        self.markers().orientation as i64
    }

    /// True if `i` lies strictly inside this strand's extent.
    #[inline]
    fn straddles(&self, i: usize) -> bool {
        self.min() < i && i < self.max()
    }

    fn set_x(&mut self, x: usize) {
        let o = self.o();
        *self.markers_mut() = Markers::new(x, o);
    }

    fn set_o(&mut self, o: usize) {
        let x = self.x();
        *self.markers_mut() = Markers::new(x, o);
    }

    /// Maps both marker positions through `f`.
    fn reindex(&mut self, f: impl Fn(usize) -> usize) {
        let (x, o) = (f(self.x()), f(self.o()));
        *self.markers_mut() = Markers::new(x, o);
    }
}

/// A row: the columns holding its X and O markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Row(Markers);

impl Row {
    pub fn new(x_col: usize, o_col: usize) -> Self {
        Self(Markers::new(x_col, o_col))
    }

    pub fn x_col(&self) -> usize {
        self.0.x
    }

    pub fn o_col(&self) -> usize {
        self.0.o
    }

    pub fn min_col(&self) -> usize {
        self.0.min
    }

    pub fn max_col(&self) -> usize {
        self.0.max
    }

    /// Sign of `x_col - o_col`: `1` when the X marker is right of the O.
    pub fn direction(&self) -> i64 {
        -(self.0.orientation as i64)
    }

    /// Distance between the two markers.
    pub fn length(&self) -> usize {
        self.0.length
    }
}

impl Strand for Row {
    fn from_markers(x: usize, o: usize) -> Self {
        Self::new(x, o)
    }

    fn markers(&self) -> &Markers {
        &self.0
    }

    fn markers_mut(&mut self) -> &mut Markers {
        &mut self.0
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X: {} O: {}", self.x_col(), self.o_col())
    }
}

/// A column: the rows holding its X and O markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column(Markers);

impl Column {
    pub fn new(x_row: usize, o_row: usize) -> Self {
        Self(Markers::new(x_row, o_row))
    }

    pub fn x_row(&self) -> usize {
        self.0.x
    }

    pub fn o_row(&self) -> usize {
        self.0.o
    }

    pub fn min_row(&self) -> usize {
        self.0.min
    }

    pub fn max_row(&self) -> usize {
        self.0.max
    }

    /// Sign of `o_row - x_row`: `1` when the O marker is below the X.
    ///
    /// Note the convention is opposite to [`Row::direction`].
    pub fn direction(&self) -> i64 {
        self.0.orientation as i64
    }

    /// Distance between the two markers.
    pub fn length(&self) -> usize {
        self.0.length
    }
}

impl Strand for Column {
    fn from_markers(x: usize, o: usize) -> Self {
        Self::new(x, o)
    }

    fn markers(&self) -> &Markers {
        &self.0
    }

    fn markers_mut(&mut self) -> &mut Markers {
        &mut self.0
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X: {} O: {}", self.x_row(), self.o_row())
    }
}
