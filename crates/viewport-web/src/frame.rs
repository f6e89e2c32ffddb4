use crate::SharedEngine;
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type TickClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// requestAnimationFrame loop driving `ViewportEngine::tick`.
#[derive(Default)]
pub struct FrameLoop {
    running: Rc<Cell<bool>>,
    pending: Rc<Cell<Option<i32>>>,
    tick: TickClosure,
}

fn request_frame(tick: &TickClosure, pending: &Cell<Option<i32>>) {
    let Some(w) = web::window() else {
        return;
    };
    if let Some(cb) = tick.borrow().as_ref() {
        pending.set(w.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
    }
}

impl FrameLoop {
    pub fn start(&mut self, engine: SharedEngine) {
        if self.running.replace(true) {
            return;
        }
        let running = self.running.clone();
        let pending = self.pending.clone();
        let tick_clone = self.tick.clone();
        *self.tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            pending.set(None);
            if !running.get() {
                return;
            }
            if let Some(e) = engine.borrow_mut().as_mut() {
                if let Err(err) = e.tick(Instant::now()) {
                    log::error!("[gpu] frame failed, stopping: {}", err);
                    running.set(false);
                    return;
                }
            }
            request_frame(&tick_clone, &pending);
        }) as Box<dyn FnMut()>));
        request_frame(&self.tick, &self.pending);
    }

    /// Stop the loop and release the closure (which also breaks its self
    /// reference).
    pub fn stop(&mut self) {
        self.running.set(false);
        if let (Some(id), Some(w)) = (self.pending.take(), web::window()) {
            let _ = w.cancel_animation_frame(id);
        }
        self.tick.borrow_mut().take();
    }
}
