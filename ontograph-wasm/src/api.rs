use crate::error;
use crate::Engine;
use js_sys::Float64Array;
use ontograph::geometry::Coordinate;
use ontograph::json::VisualizationSnapshot;
use ontograph::model::{DomainClass, EdgeKey, NodeId, PropertyId};
use ontograph::{DragButton, Viewport, ZoomDirection};
use wasm_bindgen::prelude::*;
type JsValue = wasm_bindgen::JsValue;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Forwards the engine's log output to the browser console.
#[wasm_bindgen]
pub fn init_console_logging() {
    crate::interop::install_console_logger();
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Engine {
        crate::Engine::rs_new()
    }

    // Lifecycle
    pub fn initialize(&mut self, snapshot: JsValue) -> bool {
        match serde_wasm_bindgen::from_value::<VisualizationSnapshot>(snapshot) {
            Ok(snapshot) => {
                self.inner.initialize(snapshot);
                true
            }
            Err(_) => false,
        }
    }
    pub fn initialize_res(&mut self, snapshot: JsValue) -> JsValue {
        match serde_wasm_bindgen::from_value::<VisualizationSnapshot>(snapshot) {
            Ok(snapshot) => {
                self.inner.initialize(snapshot);
                error::ok(JsValue::TRUE)
            }
            Err(e) => error::bad_payload("snapshot", e.to_string()),
        }
    }
    pub fn initialize_json(&mut self, json: &str) -> bool {
        match ontograph::json::snapshot_from_json(json) {
            Ok(snapshot) => {
                self.inner.initialize(snapshot);
                true
            }
            Err(_) => false,
        }
    }

    // Domain entity events
    pub fn on_entity_created_or_updated(
        &mut self,
        class: JsValue,
        previous_id: Option<String>,
    ) -> JsValue {
        match serde_wasm_bindgen::from_value::<DomainClass>(class) {
            Ok(class) => {
                let added = self
                    .inner
                    .on_entity_created_or_updated(class, previous_id.map(NodeId::new));
                crate::interop::arr_str(added.iter().map(|id| id.as_str())).into()
            }
            Err(_) => JsValue::NULL,
        }
    }
    pub fn on_entity_created_or_updated_res(
        &mut self,
        class: JsValue,
        previous_id: Option<String>,
    ) -> JsValue {
        match serde_wasm_bindgen::from_value::<DomainClass>(class) {
            Ok(class) => {
                let added = self
                    .inner
                    .on_entity_created_or_updated(class, previous_id.map(NodeId::new));
                error::ok(crate::interop::arr_str(added.iter().map(|id| id.as_str())).into())
            }
            Err(e) => error::bad_payload("class", e.to_string()),
        }
    }
    pub fn on_entity_assigned(&mut self, class: JsValue) -> JsValue {
        match serde_wasm_bindgen::from_value::<DomainClass>(class) {
            Ok(class) => {
                let added = self.inner.on_entity_assigned(class);
                crate::interop::arr_str(added.iter().map(|id| id.as_str())).into()
            }
            Err(_) => JsValue::NULL,
        }
    }
    pub fn on_entity_deleted(&mut self, class: JsValue) -> bool {
        match serde_wasm_bindgen::from_value::<DomainClass>(class) {
            Ok(class) => {
                self.inner.on_entity_deleted(class);
                true
            }
            Err(_) => false,
        }
    }
    pub fn on_entity_deleted_res(&mut self, class: JsValue) -> JsValue {
        match serde_wasm_bindgen::from_value::<DomainClass>(class) {
            Ok(class) => {
                self.inner.on_entity_deleted(class);
                error::ok(JsValue::TRUE)
            }
            Err(e) => error::bad_payload("class", e.to_string()),
        }
    }

    // Rendering-layer feedback
    pub fn on_node_moved(&mut self, id: &str, x: f64, y: f64, right_button: bool) {
        let button = if right_button { DragButton::Right } else { DragButton::Left };
        self.inner
            .on_node_moved(&NodeId::new(id), Coordinate::new(x, y), button);
    }
    pub fn on_node_moved_res(&mut self, id: &str, x: f64, y: f64, right_button: bool) -> JsValue {
        if !x.is_finite() {
            return error::non_finite("x");
        }
        if !y.is_finite() {
            return error::non_finite("y");
        }
        let node_id = NodeId::new(id);
        if self.inner.diagram().node(&node_id).is_none() {
            return error::invalid_id("node", id);
        }
        let button = if right_button { DragButton::Right } else { DragButton::Left };
        self.inner.on_node_moved(&node_id, Coordinate::new(x, y), button);
        error::ok(JsValue::TRUE)
    }
    pub fn on_edge_vertices_changed(
        &mut self,
        source: &str,
        property: &str,
        flat: Float64Array,
    ) -> bool {
        if flat.length() % 2 != 0 {
            return false;
        }
        let key = EdgeKey::new(NodeId::new(source), PropertyId::new(property));
        let vertices = crate::interop::coords_from_flat(&flat);
        self.inner.on_edge_vertices_changed(&key, vertices).is_ok()
    }
    pub fn on_edge_vertices_changed_res(
        &mut self,
        source: &str,
        property: &str,
        flat: Float64Array,
    ) -> JsValue {
        if flat.length() % 2 != 0 {
            return error::odd_vertex_array(flat.length());
        }
        let key = EdgeKey::new(NodeId::new(source), PropertyId::new(property));
        let vertices = crate::interop::coords_from_flat(&flat);
        match self.inner.on_edge_vertices_changed(&key, vertices) {
            Ok(()) => error::ok(JsValue::TRUE),
            Err(_) => error::invalid_id("edge", &format!("{source}#{property}")),
        }
    }

    // Layout commands
    pub fn relayout_all(&mut self) {
        self.inner.relayout_all();
    }
    pub fn layout_persistent(&mut self) {
        self.inner.layout_persistent();
    }

    // Save flow
    pub fn position_snapshot(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.position_snapshot()).unwrap_or(JsValue::NULL)
    }
    pub fn position_snapshot_json(&self) -> String {
        ontograph::json::positions_to_json(&self.inner.position_snapshot()).unwrap_or_default()
    }
    pub fn positions_dirty(&self) -> bool {
        self.inner.positions_dirty()
    }
    pub fn mark_saved(&mut self) {
        self.inner.mark_saved();
    }
    pub fn save_failed(&mut self) {
        self.inner.save_failed();
    }

    // Visibility gate
    pub fn set_visible(&mut self, visible: bool) {
        self.inner.set_visible(visible);
    }
    pub fn dimension_change_started(&mut self) {
        self.inner.dimension_change_started();
    }
    pub fn dimension_change_settled(&mut self) {
        self.inner.dimension_change_settled();
    }

    // Selection & focus
    pub fn set_selection(&mut self, id: Option<String>) {
        self.inner.set_selection(id.map(NodeId::new));
    }
    pub fn set_root_class(&mut self, id: Option<String>) {
        self.inner.set_root_class(id.map(NodeId::new));
    }
    pub fn focus_in(&mut self) {
        self.inner.focus_in();
    }
    pub fn focus_out(&mut self) {
        self.inner.focus_out();
    }
    pub fn focus_level(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.focus_level()).unwrap_or(JsValue::NULL)
    }
    pub fn fit_to_content(&mut self) {
        self.inner.fit_to_content();
    }
    pub fn visible_nodes(&self) -> JsValue {
        let visible = self.inner.visible_nodes();
        crate::interop::arr_str(visible.iter().map(|id| id.as_str())).into()
    }

    // Camera
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.inner.set_viewport(Viewport { width, height });
    }
    pub fn set_viewport_res(&mut self, width: f64, height: f64) -> JsValue {
        if !width.is_finite() {
            return error::non_finite("width");
        }
        if !height.is_finite() {
            return error::non_finite("height");
        }
        self.inner.set_viewport(Viewport { width, height });
        error::ok(JsValue::TRUE)
    }
    pub fn zoom_start(&mut self, direction: &str) -> bool {
        match direction {
            "in" => self.inner.zoom_start(ZoomDirection::In),
            "out" => self.inner.zoom_start(ZoomDirection::Out),
            _ => return false,
        }
        true
    }
    pub fn zoom_start_res(&mut self, direction: &str) -> JsValue {
        match direction {
            "in" => self.inner.zoom_start(ZoomDirection::In),
            "out" => self.inner.zoom_start(ZoomDirection::Out),
            other => return error::invalid_direction(other),
        }
        error::ok(JsValue::TRUE)
    }
    pub fn zoom_tick(&mut self) {
        self.inner.zoom_tick();
    }
    pub fn zoom_release(&mut self) {
        self.inner.zoom_release();
    }

    // Render command drain
    pub fn take_commands(&mut self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.take_commands()).unwrap_or(JsValue::NULL)
    }

    // Introspection + export
    pub fn node_count(&self) -> u32 {
        self.inner.diagram().node_count() as u32
    }
    pub fn edge_count(&self) -> u32 {
        self.inner.diagram().edge_count() as u32
    }
    pub fn export_svg(&self) -> String {
        ontograph::export::to_svg(self.inner.diagram())
    }
    pub fn export_file_name(&self, model_prefix: &str, extension: &str) -> String {
        ontograph::export::export_file_name(model_prefix, extension)
    }
}
