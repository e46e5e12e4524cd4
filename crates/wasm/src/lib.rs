#![deny(unsafe_code)]
//! Browser binding: runs a [`Simulator`] against a `<canvas>` element.
//!
//! Each animation frame ticks the simulator and replays the resulting display
//! list onto the canvas 2D context. The canvas follows the window size and
//! device pixel ratio.

mod canvas;
mod scheduler;

use std::cell::RefCell;
use std::rc::Rc;

use gradient_field_core::{EngineError, Settings, Simulator, Viewport};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use crate::scheduler::{FrameCallback, RafScheduler};

fn js_error(e: EngineError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn json_error(e: serde_json::Error) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn viewport(window: &Window) -> Result<Viewport, JsValue> {
    let width = window
        .inner_width()?
        .as_f64()
        .ok_or_else(|| JsValue::from_str("innerWidth is not a number"))?;
    let height = window
        .inner_height()?
        .as_f64()
        .ok_or_else(|| JsValue::from_str("innerHeight is not a number"))?;
    Ok(Viewport::new(width, height, window.device_pixel_ratio()))
}

struct Running {
    sim: Simulator,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Running {
    fn on_frame(&mut self) {
        let Some(frame) = self.sim.tick() else {
            return;
        };
        if let Err(e) = canvas::paint_frame(&self.canvas, &self.ctx, &frame) {
            tracing::warn!(error = ?e, "frame paint failed");
        }
    }
}

type Shared = Rc<RefCell<Option<Running>>>;

/// An animated gradient-field background bound to one canvas.
#[wasm_bindgen]
pub struct GradientField {
    window: Window,
    state: Shared,
    frame_cb: FrameCallback,
    resize_cb: Option<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl GradientField {
    /// Starts animating `canvas`. `settings_json` is an optional settings
    /// document; missing keys use defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        settings_json: Option<String>,
        seed: f64,
    ) -> Result<GradientField, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let settings = match settings_json {
            Some(text) => serde_json::from_str::<Settings>(&text).map_err(json_error)?,
            None => Settings::default(),
        };
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context not supported"))?
            .dyn_into()?;

        let state: Shared = Rc::new(RefCell::new(None));
        let frame_cb: FrameCallback = Rc::new(RefCell::new(None));
        {
            let state = state.clone();
            *frame_cb.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                if let Some(running) = state.borrow_mut().as_mut() {
                    running.on_frame();
                }
            }) as Box<dyn FnMut()>));
        }

        let scheduler = RafScheduler::new(window.clone(), frame_cb.clone());
        let sim = Simulator::new(viewport(&window)?, settings, seed as u64, Box::new(scheduler))
            .map_err(js_error)?;
        *state.borrow_mut() = Some(Running { sim, canvas, ctx });

        let resize_cb = {
            let state = state.clone();
            let window = window.clone();
            Closure::wrap(Box::new(move || {
                let Ok(vp) = viewport(&window) else {
                    return;
                };
                if let Some(running) = state.borrow_mut().as_mut() {
                    if let Err(e) = running.sim.resize(vp) {
                        tracing::warn!(error = %e, "resize rejected");
                    }
                }
            }) as Box<dyn FnMut()>)
        };
        window.add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())?;

        Ok(GradientField {
            window,
            state,
            frame_cb,
            resize_cb: Some(resize_cb),
        })
    }

    /// Applies one setting from a controller. `value_json` is the JSON text of
    /// the new value; a rejected update leaves the previous value in place.
    #[wasm_bindgen(js_name = updateSetting)]
    pub fn update_setting(&self, name: &str, value_json: &str) -> Result<(), JsValue> {
        let value: serde_json::Value = serde_json::from_str(value_json).map_err(json_error)?;
        match self.state.borrow_mut().as_mut() {
            Some(running) => running.sim.update_setting_json(name, &value).map_err(js_error),
            None => Err(JsValue::from_str("destroyed")),
        }
    }

    /// JSON text of one setting's current value.
    #[wasm_bindgen(js_name = getSetting)]
    pub fn get_setting(&self, name: &str) -> Result<String, JsValue> {
        match self.state.borrow().as_ref() {
            Some(running) => {
                let value = running.sim.settings().get(name).map_err(js_error)?;
                Ok(value.to_string())
            }
            None => Err(JsValue::from_str("destroyed")),
        }
    }

    /// Recreates every blob with the current settings.
    pub fn regenerate(&self) {
        if let Some(running) = self.state.borrow_mut().as_mut() {
            running.sim.regenerate();
        }
    }

    /// JSON snapshot of the running state, for exporters.
    pub fn snapshot(&self) -> Result<String, JsValue> {
        match self.state.borrow().as_ref() {
            Some(running) => serde_json::to_string(&running.sim.snapshot()).map_err(json_error),
            None => Err(JsValue::from_str("destroyed")),
        }
    }

    /// Stops the animation and releases the callbacks. Idempotent.
    pub fn destroy(&mut self) {
        if let Some(mut running) = self.state.borrow_mut().take() {
            running.sim.destroy();
        }
        if let Some(cb) = self.resize_cb.take() {
            if let Err(e) = self
                .window
                .remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())
            {
                tracing::warn!(error = ?e, "removing resize listener failed");
            }
        }
        self.frame_cb.borrow_mut().take();
    }
}

impl Drop for GradientField {
    fn drop(&mut self) {
        self.destroy();
    }
}
