use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, DragEvent, HtmlCanvasElement, PointerEvent, WheelEvent};

use markermap_shared::{FrameScheduler, TooltipUpdate};

use crate::app::{
    CursorCoords, FrameReadout, HoverTooltip, LoadStatus, Readout, RedrawRequest, Session,
    TooltipView, device_pixel_ratio, load_marker_bytes,
};
use crate::data;
use crate::draw;
use crate::render_loop::FrameLoop;

/// Window `resize` listener. A resize only asks for a frame; the frame itself
/// picks up the new size and marks the view dirty without reframing.
struct ResizeBinding {
    window: web_sys::Window,
    handler: wasm_bindgen::closure::Closure<dyn Fn()>,
}

impl Drop for ResizeBinding {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("resize", self.handler.as_ref().unchecked_ref());
    }
}

thread_local! {
    static RESIZE_BINDING: RefCell<Option<ResizeBinding>> = const { RefCell::new(None) };
}

fn bind_window_resize(frame_loop: Weak<FrameLoop>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    // Release the previous mount's listener before adding ours.
    RESIZE_BINDING.with(|slot| slot.borrow_mut().take());
    let handler = wasm_bindgen::closure::Closure::<dyn Fn()>::new(move || {
        if let Some(frame_loop) = frame_loop.upgrade() {
            frame_loop.request();
        }
    });
    if window
        .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
        .is_ok()
    {
        RESIZE_BINDING.with(|slot| {
            *slot.borrow_mut() = Some(ResizeBinding { window, handler });
        });
    }
}

/// Pointer position relative to the canvas, in CSS pixels.
fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, client_x: f64, client_y: f64) -> (f64, f64) {
    canvas_ref
        .get_untracked()
        .map(|el| {
            let rect = el.get_bounding_client_rect();
            (client_x - rect.left(), client_y - rect.top())
        })
        .unwrap_or((client_x, client_y))
}

/// Single Canvas 2D map surface. All pan/zoom/hover input lands here and is
/// forwarded to the session; painting happens on the next animation frame.
#[component]
pub fn MapCanvas() -> impl IntoView {
    let Session(session) = expect_context();
    let RedrawRequest(redraw) = expect_context();
    let Readout(readout) = expect_context();
    let HoverTooltip(tooltip) = expect_context();
    let CursorCoords(cursor_coords) = expect_context();
    let LoadStatus(status) = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    let frames = Rc::new(RefCell::new(FrameScheduler::new()));
    // Page coordinates of the last pointer sample, for placing the tooltip.
    let page_cursor: Rc<Cell<(f64, f64)>> = Rc::new(Cell::new((0.0, 0.0)));
    let highlighted: Rc<Cell<Option<usize>>> = Rc::new(Cell::new(None));
    // Backing store size in device pixels; a change invalidates the 2D context.
    let device_size: Rc<Cell<(u32, u32)>> = Rc::new(Cell::new((0, 0)));
    let cached_ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));

    let frame_loop = {
        let frames = frames.clone();
        let page_cursor = page_cursor.clone();
        let highlighted = highlighted.clone();
        FrameLoop::new(move || {
            let Some(canvas) = canvas_ref.get_untracked() else {
                return false;
            };
            let canvas: &HtmlCanvasElement = &canvas;
            let Some(parent) = canvas.parent_element() else {
                return false;
            };
            let css_w = parent.client_width().max(0) as f64;
            let css_h = parent.client_height().max(0) as f64;
            if css_w == 0.0 || css_h == 0.0 {
                return false;
            }

            let ratio = device_pixel_ratio();
            let size = (
                (css_w * ratio).round() as u32,
                (css_h * ratio).round() as u32,
            );
            if device_size.get() != size {
                device_size.set(size);
                canvas.set_width(size.0);
                canvas.set_height(size.1);
                cached_ctx.borrow_mut().take();
                session.update_value(|s| {
                    s.resize(css_w, css_h);
                    s.view.set_pixel_ratio(ratio);
                });
            }

            let ctx = {
                let mut cache = cached_ctx.borrow_mut();
                if cache.is_none() {
                    *cache = canvas
                        .get_context("2d")
                        .ok()
                        .flatten()
                        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok());
                }
                let Some(ctx) = cache.clone() else {
                    return false;
                };
                ctx
            };

            let Some(outcome) = session.try_update_value(|s| frames.borrow_mut().tick(s)) else {
                return false;
            };

            let mut repaint = outcome.redrawn.is_some();
            match outcome.tooltip {
                TooltipUpdate::Unchanged => {}
                TooltipUpdate::Hide => {
                    if tooltip.get_untracked().is_some() {
                        tooltip.set(None);
                    }
                    repaint |= highlighted.replace(None).is_some();
                }
                TooltipUpdate::Show(hit) => {
                    let (x, y) = page_cursor.get();
                    tooltip.set(Some(TooltipView {
                        text: hit.tooltip.unwrap_or_default(),
                        clipboard: hit.clipboard,
                        x,
                        y,
                    }));
                    repaint |= highlighted.replace(Some(hit.index)) != Some(hit.index);
                }
            }

            if repaint {
                session.with_value(|s| {
                    draw::paint(&ctx, s);
                    if let Some(index) = highlighted.get() {
                        draw::highlight(&ctx, s, index);
                    }
                });
            }
            if outcome.redrawn.is_some() {
                readout.set(session.with_value(FrameReadout::from_session));
            }
            false
        })
    };
    let frame_loop = Rc::new(frame_loop);
    bind_window_resize(Rc::downgrade(&frame_loop));

    // Anything outside the canvas that touched the session asks for a frame here.
    {
        let frame_loop = frame_loop.clone();
        Effect::new(move || {
            redraw.track();
            frame_loop.request();
        });
    }

    // --- Input handlers ---

    let on_pointer_down = {
        let frame_loop = frame_loop.clone();
        move |e: PointerEvent| {
            let (x, y) = local_point(canvas_ref, e.client_x() as f64, e.client_y() as f64);
            let id = e.pointer_id();
            let button = e.button();
            session.update_value(|s| s.navigation.pointer_down(id, x, y, button, &s.view));

            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(id).ok();
                el.style().set_property("cursor", "grabbing").ok();
            }
            frame_loop.request();
        }
    };

    let on_pointer_move = {
        let frame_loop = frame_loop.clone();
        let frames = frames.clone();
        let page_cursor = page_cursor.clone();
        move |e: PointerEvent| {
            let (cx, cy) = (e.client_x() as f64, e.client_y() as f64);
            let (x, y) = local_point(canvas_ref, cx, cy);
            page_cursor.set((cx, cy));
            frames.borrow_mut().cursor_moved(x, y);

            let id = e.pointer_id();
            let coords = session.try_update_value(|s| {
                s.navigation.pointer_move(id, x, y, &mut s.view);
                s.cursor_source_coords(x, y)
            });
            cursor_coords.set(coords);
            frame_loop.request();
        }
    };

    let on_pointer_up = {
        let frame_loop = frame_loop.clone();
        move |e: PointerEvent| {
            let id = e.pointer_id();
            session.update_value(|s| s.navigation.pointer_up(id));
            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.release_pointer_capture(id).ok();
                el.style().set_property("cursor", "grab").ok();
            }
            frame_loop.request();
        }
    };

    let on_pointer_leave = {
        let frame_loop = frame_loop.clone();
        let frames = frames.clone();
        move |_: PointerEvent| {
            frames.borrow_mut().cursor_left();
            cursor_coords.set(None);
            frame_loop.request();
        }
    };

    let on_wheel = {
        let frame_loop = frame_loop.clone();
        move |e: WheelEvent| {
            e.prevent_default();
            let (x, y) = local_point(canvas_ref, e.client_x() as f64, e.client_y() as f64);
            let delta = e.delta_y();
            session.update_value(|s| {
                s.navigation.wheel(delta, x, y, &mut s.view);
            });
            frame_loop.request();
        }
    };

    let on_drag_over = move |e: DragEvent| {
        e.prevent_default();
    };

    let on_drop = move |e: DragEvent| {
        e.prevent_default();
        let Some(file) = data::first_dropped_file(&e) else {
            return;
        };
        let name = file.name();
        wasm_bindgen_futures::spawn_local(async move {
            match data::read_dropped_file(file).await {
                Ok(bytes) => load_marker_bytes(session, redraw, status, &name, &bytes),
                Err(e) => {
                    web_sys::console::warn_1(&format!("failed to read {name}: {e}").into());
                    status.set(Some(format!("{name}: {e}")));
                }
            }
        });
    };

    view! {
        <canvas
            node_ref=canvas_ref
            style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none; cursor: grab;"
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up.clone()
            on:pointercancel=on_pointer_up
            on:pointerleave=on_pointer_leave
            on:wheel=on_wheel
            on:dragover=on_drag_over
            on:drop=on_drop
        />
    }
}
