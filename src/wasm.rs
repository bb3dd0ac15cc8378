use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use wasm_bindgen::prelude::*;

use crate::{Energy, EnergyConfig, GridDiagram, GridError, Move};

fn js_error(err: GridError) -> JsError {
    JsError::new(&err.to_string())
}

/// A grid diagram together with its energy, for driving a walk from
/// JavaScript.
///
/// The energy holds size and writhe and is updated incrementally by
/// `tryMove`.
#[wasm_bindgen]
pub struct WasmGridDiagram {
    diagram: GridDiagram,
    config: EnergyConfig,
    energy: Energy,
}

impl WasmGridDiagram {
    fn wrap(diagram: GridDiagram) -> Self {
        let config = EnergyConfig::default();
        let energy = Energy::of(&config, &diagram);
        Self {
            diagram,
            config,
            energy,
        }
    }
}

#[wasm_bindgen]
impl WasmGridDiagram {
    /// Builds a diagram from the row of each column's X and O marker.
    #[wasm_bindgen(constructor)]
    pub fn new(x_rows: Vec<u32>, o_rows: Vec<u32>) -> Result<WasmGridDiagram, JsError> {
        let x_rows: Vec<usize> = x_rows.into_iter().map(|r| r as usize).collect();
        let o_rows: Vec<usize> = o_rows.into_iter().map(|r| r as usize).collect();
        let diagram = GridDiagram::new(&x_rows, &o_rows).map_err(js_error)?;
        Ok(Self::wrap(diagram))
    }

    /// A random diagram of size `n`, reproducible from `seed`.
    pub fn random(n: u32, seed: u64) -> Result<WasmGridDiagram, JsError> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let diagram = GridDiagram::random(n as usize, &mut rng).map_err(js_error)?;
        Ok(Self::wrap(diagram))
    }

    pub fn size(&self) -> u32 {
        self.diagram.size() as u32
    }

    /// Current energy as an array `[size, writhe]`.
    pub fn energy(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(&self.energy).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Applies a move given as a type code and up to three arguments.
    ///
    /// Returns `false` without changing anything if the move is not valid.
    #[wasm_bindgen(js_name = tryMove)]
    pub fn try_move(&mut self, move_type: i32, a0: i32, a1: i32, a2: i32) -> Result<bool, JsError> {
        let args = [a0 as i64, a1 as i64, a2 as i64];
        let mv = Move::from_codes(move_type, &args).map_err(js_error)?;
        match self
            .energy
            .advance(&self.config, &mut self.diagram, mv)
            .map_err(js_error)?
        {
            Some(next) => {
                self.energy = next;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Text rendering, one line of `X`, `O` and `-` per row.
    pub fn render(&self) -> String {
        self.diagram.to_string()
    }

    /// Persisted form `[[x_rows], [o_rows]]`.
    pub fn saved(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(&self.diagram.saved()).map_err(|e| JsError::new(&e.to_string()))
    }
}
