use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;

/// Drives the map's frame ticks from `requestAnimationFrame`.
///
/// `request()` schedules at most one pending frame. The frame callback
/// returns `true` while it wants to keep ticking (a drag in progress, a
/// tooltip that still has to settle), in which case the next frame is
/// queued without another request.
pub struct FrameLoop {
    inner: Rc<Inner>,
}

struct Inner {
    window: Option<web_sys::Window>,
    pending: Cell<Option<i32>>,
    callback: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl Inner {
    fn schedule(&self) {
        if self.pending.get().is_some() {
            return;
        }
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let callback = self.callback.borrow();
        let Some(cb) = callback.as_ref() else {
            return;
        };
        if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            self.pending.set(Some(id));
        }
    }
}

impl FrameLoop {
    pub fn new(mut frame_fn: impl FnMut() -> bool + 'static) -> Self {
        let inner = Rc::new(Inner {
            window: web_sys::window(),
            pending: Cell::new(None),
            callback: RefCell::new(None),
        });

        // Weak so the closure does not keep its own owner alive.
        let weak = Rc::downgrade(&inner);
        let cb = Closure::<dyn FnMut()>::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.pending.set(None);
            if frame_fn() {
                inner.schedule();
            }
        });
        *inner.callback.borrow_mut() = Some(cb);

        Self { inner }
    }

    pub fn request(&self) {
        self.inner.schedule();
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        if let Some(id) = self.inner.pending.replace(None)
            && let Some(window) = self.inner.window.as_ref()
        {
            let _ = window.cancel_animation_frame(id);
        }
        self.inner.callback.borrow_mut().take();
    }
}
