use js_sys::{Float64Array, Reflect};
use ontograph_wasm::Engine;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn is_err(v: &JsValue, code: &str) -> bool {
    if let Ok(ok) =
        Reflect::get(v, &JsValue::from_str("ok")).and_then(|x| x.as_bool().ok_or(JsValue::NULL))
    {
        if ok {
            return false;
        }
        if let Ok(err) = Reflect::get(v, &JsValue::from_str("error")) {
            if let Ok(c) = Reflect::get(&err, &JsValue::from_str("code")) {
                return c.as_string().map_or(false, |s| s == code);
            }
        }
    }
    false
}

fn is_ok(v: &JsValue) -> bool {
    Reflect::get(v, &JsValue::from_str("ok"))
        .ok()
        .and_then(|x| x.as_bool())
        .unwrap_or(false)
}

#[wasm_bindgen_test]
fn initialize_from_json_builds_the_graph() {
    let mut engine = Engine::new();
    let ok = engine.initialize_json(
        r#"{"classes":[{"id":"http://example.org/A",
             "associations":[{"property":"http://example.org/p",
                              "target":"http://example.org/B"}]}]}"#,
    );
    assert!(ok);
    // A plus the placeholder for B.
    assert_eq!(engine.node_count(), 2);
    assert_eq!(engine.edge_count(), 1);
}

#[wasm_bindgen_test]
fn bad_payloads_return_typed_errors() {
    let mut engine = Engine::new();
    let r = engine.initialize_res(JsValue::from_str("not a snapshot"));
    assert!(is_err(&r, "bad_payload"));

    let r2 = engine.on_node_moved_res("http://example.org/missing", 0.0, 0.0, false);
    assert!(is_err(&r2, "invalid_id"));

    let r3 = engine.on_node_moved_res("http://example.org/missing", f64::NAN, 0.0, false);
    assert!(is_err(&r3, "non_finite"));

    let odd = Float64Array::new_with_length(3);
    let r4 = engine.on_edge_vertices_changed_res("a", "p", odd);
    assert!(is_err(&r4, "odd_vertex_array"));

    let r5 = engine.zoom_start_res("sideways");
    assert!(is_err(&r5, "invalid_direction"));
}

#[wasm_bindgen_test]
fn command_stream_drains() {
    let mut engine = Engine::new();
    engine.initialize_json(r#"{"classes":[{"id":"http://example.org/A"}]}"#);
    let first = engine.take_commands();
    assert!(js_sys::Array::is_array(&first));
    assert!(js_sys::Array::from(&first).length() > 0);
    let second = engine.take_commands();
    assert_eq!(js_sys::Array::from(&second).length(), 0);
}

#[wasm_bindgen_test]
fn save_roundtrip_through_json() {
    let mut engine = Engine::new();
    engine.initialize_json(r#"{"classes":[{"id":"http://example.org/A"}]}"#);
    assert!(engine.positions_dirty());
    let json = engine.position_snapshot_json();
    assert!(json.contains("http://example.org/A"));
    engine.mark_saved();
    assert!(!engine.positions_dirty());
}

#[wasm_bindgen_test]
fn zoom_res_accepts_valid_directions() {
    let mut engine = Engine::new();
    assert!(is_ok(&engine.zoom_start_res("in")));
    engine.zoom_tick();
    engine.zoom_release();
    assert!(is_ok(&engine.zoom_start_res("out")));
}
