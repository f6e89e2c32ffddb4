use crate::dom;
use crate::SharedEngine;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

struct Listener {
    target: web::EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

/// Event listeners registered on the canvas. Kept alive here (not
/// `forget`-ed) so teardown can detach them.
#[derive(Default)]
pub struct Listeners {
    active: Vec<Listener>,
}

impl Listeners {
    fn add(
        &mut self,
        target: &web::EventTarget,
        kind: &'static str,
        passive: bool,
        handler: impl FnMut(web::Event) + 'static,
    ) {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        let opts = web::AddEventListenerOptions::new();
        opts.set_passive(passive);
        if let Err(e) = target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            closure.as_ref().unchecked_ref(),
            &opts,
        ) {
            log::warn!("[input] failed to attach {}: {:?}", kind, e);
            return;
        }
        self.active.push(Listener {
            target: target.clone(),
            kind,
            closure,
        });
    }

    pub fn remove_all(&mut self) {
        for l in self.active.drain(..) {
            let _ = l
                .target
                .remove_event_listener_with_callback(l.kind, l.closure.as_ref().unchecked_ref());
        }
    }
}

/// Route pointer and wheel input from the canvas into the engine.
pub fn wire_input_handlers(canvas: &web::HtmlCanvasElement, engine: &SharedEngine) -> Listeners {
    let mut listeners = Listeners::default();
    let target: &web::EventTarget = canvas.as_ref();

    {
        let canvas = canvas.clone();
        let engine = engine.clone();
        listeners.add(target, "pointerdown", false, move |ev| {
            let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
                return;
            };
            let _ = canvas.set_pointer_capture(ev.pointer_id());
            let (x, y) = dom::to_canvas_coords(&canvas, ev.client_x() as f64, ev.client_y() as f64);
            if let Some(e) = engine.borrow_mut().as_mut() {
                e.pointer_down(ev.pointer_id(), x, y);
            }
            ev.prevent_default();
        });
    }
    {
        let canvas = canvas.clone();
        let engine = engine.clone();
        listeners.add(target, "pointermove", true, move |ev| {
            let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
                return;
            };
            let (x, y) = dom::to_canvas_coords(&canvas, ev.client_x() as f64, ev.client_y() as f64);
            if let Some(e) = engine.borrow_mut().as_mut() {
                e.pointer_move(ev.pointer_id(), x, y);
            }
        });
    }
    {
        let canvas = canvas.clone();
        let engine = engine.clone();
        listeners.add(target, "pointerup", true, move |ev| {
            let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
                return;
            };
            let _ = canvas.release_pointer_capture(ev.pointer_id());
            if let Some(e) = engine.borrow_mut().as_mut() {
                e.pointer_up(ev.pointer_id());
            }
        });
    }
    {
        let engine = engine.clone();
        listeners.add(target, "pointercancel", true, move |ev| {
            let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
                return;
            };
            if let Some(e) = engine.borrow_mut().as_mut() {
                e.pointer_cancel(ev.pointer_id());
            }
        });
    }
    {
        let engine = engine.clone();
        // Non-passive so the page does not scroll while zooming.
        listeners.add(target, "wheel", false, move |ev| {
            let Some(ev) = ev.dyn_ref::<web::WheelEvent>() else {
                return;
            };
            if let Some(e) = engine.borrow_mut().as_mut() {
                if e.view_mode() == viewport_core::ViewMode::Isometric {
                    ev.prevent_default();
                }
                e.wheel(ev.delta_y() as f32);
            }
        });
    }

    log::info!("[input] {} canvas listeners attached", listeners.active.len());
    listeners
}
