#![doc = include_str!("../README.md")]

mod diagram;
mod energy;
mod error;
mod invariant;
mod moves;
mod registry;
mod strand;
#[cfg(feature = "wasm")]
mod wasm;

pub use diagram::{GridDiagram, SavedGrid};
pub use energy::{Energy, EnergyConfig, InvariantKind};
pub use error::GridError;
pub use invariant::delta_size;
pub use moves::{Axis, Move, MoveType, StabilizationKind};
pub use registry::{JsonRegistry, LinkRegistry, RegistryError};
pub use strand::{Column, Row};
