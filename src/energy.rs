//! Energy snapshots: tuples of invariants used as Wang-Landau state keys.
//!
//! Which invariants make up an energy is decided by an [`EnergyConfig`]
//! that is passed to every constructor. A config cannot be changed once
//! built, so energies created under it always share its shape.

use std::cell::OnceCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::diagram::GridDiagram;
use crate::error::GridError;
use crate::invariant::delta_size;
use crate::moves::Move;

/// An invariant that can occupy a slot of an [`Energy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvariantKind {
    /// Grid size `n`.
    Size,
    /// Writhe, see [`GridDiagram::writhe`].
    Writhe,
}

impl InvariantKind {
    fn measure(self, diagram: &GridDiagram) -> i64 {
        match self {
            Self::Size => diagram.size() as i64,
            Self::Writhe => diagram.writhe(),
        }
    }

    /// Change caused by `mv`, which the caller has checked is valid.
    fn delta(self, before: &GridDiagram, mv: Move) -> i64 {
        match self {
            Self::Size => delta_size(mv.move_type()),
            Self::Writhe => before.delta_writhe_unchecked(mv),
        }
    }
}

impl FromStr for InvariantKind {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "size" => Ok(Self::Size),
            "writhe" => Ok(Self::Writhe),
            other => Err(GridError::InvalidArgument(format!(
                "unknown invariant kind `{other}`"
            ))),
        }
    }
}

impl fmt::Display for InvariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Size => "size",
            Self::Writhe => "writhe",
        })
    }
}

/// Ordered list of the invariants making up an energy.
///
/// Serialized as `{"invariants": ["size", "writhe"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEnergyConfig")]
pub struct EnergyConfig {
    invariants: Vec<InvariantKind>,
}

#[derive(Deserialize)]
struct RawEnergyConfig {
    invariants: Vec<InvariantKind>,
}

impl TryFrom<RawEnergyConfig> for EnergyConfig {
    type Error = GridError;

    fn try_from(raw: RawEnergyConfig) -> Result<Self, Self::Error> {
        Self::new(raw.invariants)
    }
}

impl EnergyConfig {
    /// Creates a config from a non-empty list of distinct invariants.
    pub fn new(invariants: impl Into<Vec<InvariantKind>>) -> Result<Self, GridError> {
        let invariants = invariants.into();
        if invariants.is_empty() {
            return Err(GridError::InvalidInput(
                "an energy needs at least one invariant".to_string(),
            ));
        }
        for (i, kind) in invariants.iter().enumerate() {
            if invariants[..i].contains(kind) {
                return Err(GridError::InvalidInput(format!(
                    "invariant `{kind}` is listed twice"
                )));
            }
        }
        Ok(Self { invariants })
    }

    /// Parses a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, GridError> {
        serde_json::from_str(json).map_err(|e| GridError::InvalidInput(e.to_string()))
    }

    pub fn invariants(&self) -> &[InvariantKind] {
        &self.invariants
    }

    /// Number of slots in every energy built with this config.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Always false; a config holds at least one invariant.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            invariants: vec![InvariantKind::Size, InvariantKind::Writhe],
        }
    }
}

/// Invariant values of one diagram state, one slot per configured kind.
///
/// Two energies are equal when all their slots are; energies of different
/// lengths are never equal. The hash is computed on first use and cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Energy {
    values: Vec<i64>,
    #[serde(skip)]
    hash: OnceCell<u64>,
}

impl Energy {
    /// Measures every configured invariant of `diagram` from scratch.
    pub fn of(config: &EnergyConfig, diagram: &GridDiagram) -> Self {
        Self::from_values(
            config
                .invariants()
                .iter()
                .map(|kind| kind.measure(diagram))
                .collect(),
        )
    }

    /// Energy of the diagram that results from applying `mv` to `before`,
    /// derived from `previous` (the energy of `before`) without measuring
    /// the result.
    ///
    /// Fails if `mv` is not valid for `before` or `previous` does not have
    /// `config`'s shape.
    pub fn after_move(
        previous: &Energy,
        config: &EnergyConfig,
        before: &GridDiagram,
        mv: Move,
    ) -> Result<Self, GridError> {
        if previous.len() != config.len() {
            return Err(GridError::InvalidArgument(format!(
                "energy has {} slots but the config has {}",
                previous.len(),
                config.len()
            )));
        }
        if !before.is_valid(mv)? {
            return Err(GridError::InvalidArgument(format!(
                "{mv} is not a valid move for this diagram"
            )));
        }
        Ok(Self::from_values(
            config
                .invariants()
                .iter()
                .zip(&previous.values)
                .map(|(kind, value)| value + kind.delta(before, mv))
                .collect(),
        ))
    }

    /// Applies `mv` to `diagram` if it is valid and returns the new energy.
    ///
    /// `self` must be the energy of `diagram`. Returns `Ok(None)`, leaving
    /// the diagram untouched, when the move is not valid.
    pub fn advance(
        &self,
        config: &EnergyConfig,
        diagram: &mut GridDiagram,
        mv: Move,
    ) -> Result<Option<Energy>, GridError> {
        if !diagram.is_valid(mv)? {
            trace!(%mv, "rejected invalid move");
            return Ok(None);
        }
        let next = Self::after_move(self, config, diagram, mv)?;
        diagram.apply(mv)?;
        trace!(%mv, energy = %next, "advanced energy");
        Ok(Some(next))
    }

    pub fn from_values(values: Vec<i64>) -> Self {
        Self {
            values,
            hash: OnceCell::new(),
        }
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Polynomial hash of the slots with multiplier 31, computed once.
    pub fn hash_code(&self) -> u64 {
        *self.hash.get_or_init(|| {
            self.values
                .iter()
                .fold(0u64, |acc, &v| acc.wrapping_mul(31).wrapping_add(v as u64))
        })
    }
}

impl PartialEq for Energy {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for Energy {}

impl Hash for Energy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl fmt::Display for Energy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str(")")
    }
}
