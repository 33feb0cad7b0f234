use js_sys::{Array, Float64Array, Object, Reflect};
use log::{Level, LevelFilter, Metadata, Record};
use wasm_bindgen::JsValue;

pub fn new_obj() -> Object { Object::new() }
pub fn set_kv(obj: &Object, k: &str, v: &JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(k), v);
}

pub fn arr_str<'a>(ids: impl Iterator<Item = &'a str>) -> Array {
    let arr = Array::new();
    for id in ids {
        arr.push(&JsValue::from_str(id));
    }
    arr
}

/// Flat `[x0, y0, x1, y1, ...]` array into coordinate pairs. The caller has
/// already rejected odd lengths.
pub fn coords_from_flat(flat: &Float64Array) -> Vec<ontograph::geometry::Coordinate> {
    let raw = flat.to_vec();
    raw.chunks_exact(2)
        .map(|pair| ontograph::geometry::Coordinate::new(pair[0], pair[1]))
        .collect()
}

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}", record.target(), record.args());
        let value = JsValue::from_str(&line);
        match record.level() {
            Level::Error => web_sys::console::error_1(&value),
            Level::Warn => web_sys::console::warn_1(&value),
            _ => web_sys::console::log_1(&value),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Routes the core crate's log records to the browser console. Safe to call
/// more than once; only the first install wins.
pub fn install_console_logger() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}
