//! Hook-signal executor backed by the browser microtask queue.

use futures::future::LocalFutureObj;
use futures::task::{LocalSpawn, SpawnError};

/// [`LocalSpawn`] that hands futures to `wasm_bindgen_futures::spawn_local`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WasmSpawner;

impl LocalSpawn for WasmSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}
