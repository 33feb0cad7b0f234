use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;

#[wasm_bindgen]
pub struct Engine {
    pub(crate) inner: ontograph::GraphSyncEngine,
}

impl Engine {
    pub fn rs_new() -> Engine {
        Engine {
            inner: ontograph::GraphSyncEngine::default(),
        }
    }
}
