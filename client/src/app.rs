use leptos::prelude::*;
use wasm_bindgen::JsCast;

use std::cell::RefCell;

use markermap_shared::layers::{
    CHUNKS, COMPONENTS, ENTITIES, ENTITIES_ASLEEP, ENTITIES_AWAKE, ENTITIES_FROZEN, MARKERS,
};
use markermap_shared::{
    ImpactLevel, LayerFlags, MapConfig, MapSession, OwnerCount, ZoomButton, format_elapsed,
};

use crate::canvas::MapCanvas;
use crate::colors::{owner_color, rgba_css};
use crate::data;

const TOP_OWNERS: usize = 10;
const TOOLTIP_OFFSET: f64 = 5.0;

pub(crate) fn canvas_dimensions() -> (f64, f64) {
    let Some(window) = web_sys::window() else {
        return (1200.0, 800.0);
    };
    let w = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1200.0);
    let h = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0);
    (w, h)
}

pub(crate) fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .filter(|r| r.is_finite() && *r > 0.0)
        .unwrap_or(1.0)
}

struct CopyBinding {
    document: web_sys::Document,
    handler: wasm_bindgen::closure::Closure<dyn Fn(web_sys::ClipboardEvent)>,
}

impl Drop for CopyBinding {
    fn drop(&mut self) {
        let _ = self
            .document
            .remove_event_listener_with_callback("copy", self.handler.as_ref().unchecked_ref());
    }
}

thread_local! {
    static COPY_BINDING: RefCell<Option<CopyBinding>> = const { RefCell::new(None) };
}

/// Newtype wrappers so each signal gets a distinct context type.
#[derive(Clone, Copy)]
pub(crate) struct Session(pub StoredValue<MapSession>);
#[derive(Clone, Copy)]
pub(crate) struct RedrawRequest(pub RwSignal<u64>);
#[derive(Clone, Copy)]
pub(crate) struct Layers(pub RwSignal<LayerFlags>);
#[derive(Clone, Copy)]
pub(crate) struct OwnerFilterInput(pub RwSignal<String>);
#[derive(Clone, Copy)]
pub(crate) struct FilterInvalid(pub RwSignal<bool>);
#[derive(Clone, Copy)]
pub(crate) struct Readout(pub RwSignal<FrameReadout>);
#[derive(Clone, Copy)]
pub(crate) struct HoverTooltip(pub RwSignal<Option<TooltipView>>);
#[derive(Clone, Copy)]
pub(crate) struct CursorCoords(pub RwSignal<Option<(f64, f64)>>);
#[derive(Clone, Copy)]
pub(crate) struct LoadStatus(pub RwSignal<Option<String>>);

/// Numbers shown in the stats panel, refreshed after every visibility pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct FrameReadout {
    pub markers: usize,
    pub visible: usize,
    pub chunks: usize,
    pub zoom: f64,
    pub units_per_pixel: f64,
    pub owners: Vec<OwnerCount>,
}

impl FrameReadout {
    pub fn from_session(session: &MapSession) -> Self {
        let frame = session.last_frame();
        let mut owners = frame.owners.ranked();
        owners.truncate(TOP_OWNERS);
        Self {
            markers: session.store.len(),
            visible: frame.markers_visible,
            chunks: frame.chunks_visible,
            zoom: session.view.zoom_display(),
            units_per_pixel: session.view.units_per_pixel(session.config().coord_scale),
            owners,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TooltipView {
    pub text: String,
    pub clipboard: Option<String>,
    pub x: f64,
    pub y: f64,
}

pub(crate) fn request_redraw(redraw: RwSignal<u64>) {
    redraw.update(|n| *n = n.wrapping_add(1));
}

/// Replace the map contents with a marker file. A bad file leaves the
/// current markers alone and reports through the status line.
pub(crate) fn load_marker_bytes(
    session: StoredValue<MapSession>,
    redraw: RwSignal<u64>,
    status: RwSignal<Option<String>>,
    source: &str,
    bytes: &[u8],
) {
    let result = session.try_update_value(|s| {
        // The frame loop sizes the view from the canvas parent. Before the
        // first frame there is nothing measured yet, so use the window.
        let (w, h) = s.view.viewport_size();
        if w <= 0.0 || h <= 0.0 {
            let (w, h) = canvas_dimensions();
            s.resize(w, h);
            s.view.set_pixel_ratio(device_pixel_ratio());
        }
        s.load_json(bytes)
    });
    match result {
        Some(Ok(summary)) => {
            let age = summary
                .generated_at
                .map(|at| format!(", generated {} ago", format_elapsed(at, chrono::Utc::now())))
                .unwrap_or_default();
            status.set(Some(format!("{source}: {} markers{age}", summary.markers)));
            request_redraw(redraw);
        }
        Some(Err(e)) => {
            web_sys::console::warn_1(&format!("failed to load {source}: {e}").into());
            status.set(Some(format!("{source}: {e}")));
        }
        None => {}
    }
}

#[component]
pub fn App() -> impl IntoView {
    let session: StoredValue<MapSession> = StoredValue::new(MapSession::new(MapConfig::default()));
    let redraw: RwSignal<u64> = RwSignal::new(0);
    let layers: RwSignal<LayerFlags> = RwSignal::new(LayerFlags::default());
    let filter_text: RwSignal<String> = RwSignal::new(String::new());
    let filter_invalid: RwSignal<bool> = RwSignal::new(false);
    let readout: RwSignal<FrameReadout> = RwSignal::new(FrameReadout::default());
    let tooltip: RwSignal<Option<TooltipView>> = RwSignal::new(None);
    let cursor_coords: RwSignal<Option<(f64, f64)>> = RwSignal::new(None);
    let status: RwSignal<Option<String>> = RwSignal::new(None);

    provide_context(Session(session));
    provide_context(RedrawRequest(redraw));
    provide_context(Layers(layers));
    provide_context(OwnerFilterInput(filter_text));
    provide_context(FilterInvalid(filter_invalid));
    provide_context(Readout(readout));
    provide_context(HoverTooltip(tooltip));
    provide_context(CursorCoords(cursor_coords));
    provide_context(LoadStatus(status));

    wasm_bindgen_futures::spawn_local(async move {
        match data::fetch_marker_file(data::DEFAULT_MARKER_URL).await {
            Ok(bytes) => {
                load_marker_bytes(session, redraw, status, data::DEFAULT_MARKER_URL, &bytes)
            }
            Err(e) => {
                web_sys::console::warn_1(
                    &format!("no marker file at {}: {e}", data::DEFAULT_MARKER_URL).into(),
                );
                status.set(Some("Drop a marker file onto the map".to_string()));
            }
        }
    });

    // Copy puts the hovered marker's clipboard text on the clipboard.
    Effect::new(move || {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let handler = wasm_bindgen::closure::Closure::<dyn Fn(web_sys::ClipboardEvent)>::new(
            move |e: web_sys::ClipboardEvent| {
                let Some(text) = tooltip
                    .get_untracked()
                    .and_then(|t| t.clipboard)
                    .filter(|t| !t.is_empty())
                else {
                    return;
                };
                if let Some(data) = e.clipboard_data()
                    && data.set_data("text/plain", &text).is_ok()
                {
                    e.prevent_default();
                }
            },
        );
        if document
            .add_event_listener_with_callback("copy", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            COPY_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(CopyBinding { document, handler });
            });
        }
    });

    view! {
        <div style="width: 100%; height: 100%; position: relative; overflow: hidden; background: #0c0e17;">
            <MapCanvas />
            <ZoomControls />
            <Legend />
            <StatsPanel />
            <StatusLine />
        </div>
        <Tooltip />
    }
}

#[component]
fn ZoomControls() -> impl IntoView {
    let Session(session) = expect_context();
    let RedrawRequest(redraw) = expect_context();

    let zoom = move |button: ZoomButton| {
        session.update_value(|s| {
            s.navigation.zoom_button(button, &mut s.view);
        });
        request_redraw(redraw);
    };

    view! {
        <div style="position: absolute; left: 16px; bottom: 16px; z-index: 10; display: flex; flex-direction: column; gap: 4px;">
            <button class="map-button" title="Zoom in" on:click=move |_| zoom(ZoomButton::In)>"+"</button>
            <button class="map-button" title="Zoom out" on:click=move |_| zoom(ZoomButton::Out)>"\u{2212}"</button>
        </div>
    }
}

const LAYER_TOGGLES: [(&str, &str); 7] = [
    (MARKERS, "Markers"),
    (ENTITIES, "Entities"),
    (ENTITIES_AWAKE, "Awake"),
    (ENTITIES_ASLEEP, "Asleep"),
    (ENTITIES_FROZEN, "Frozen"),
    (COMPONENTS, "Components"),
    (CHUNKS, "Bricked chunks"),
];

/// Layer toggles, component impact levels and the owner filter box.
#[component]
fn Legend() -> impl IntoView {
    let Session(session) = expect_context();
    let RedrawRequest(redraw) = expect_context();
    let Layers(layers) = expect_context();
    let OwnerFilterInput(filter_text) = expect_context();
    let FilterInvalid(filter_invalid) = expect_context();

    let toggle_layer = move |name: &'static str, on: bool| {
        layers.update(|l| {
            l.set(name, on);
        });
        session.update_value(|s| s.set_layer(name, on));
        request_redraw(redraw);
    };

    let toggle_impact = move |level: ImpactLevel, on: bool| {
        layers.update(|l| {
            l.set_impact(level, on);
        });
        session.update_value(|s| s.set_impact(level, on));
        request_redraw(redraw);
    };

    let on_filter_input = move |ev: web_sys::Event| {
        let text = event_target_value(&ev);
        filter_text.set(text.clone());
        match session.try_update_value(|s| s.set_owner_filter(&text)) {
            Some(Err(e)) => {
                web_sys::console::warn_1(&format!("owner filter rejected: {e}").into());
                filter_invalid.set(true);
            }
            Some(Ok(())) => {
                filter_invalid.set(false);
                request_redraw(redraw);
            }
            None => {}
        }
    };

    let layer_rows = LAYER_TOGGLES
        .into_iter()
        .map(|(name, label)| {
            view! {
                <label style="display: flex; align-items: center; gap: 6px; cursor: pointer;">
                    <input
                        type="checkbox"
                        prop:checked=move || layers.with(|l| l.get(name))
                        on:change=move |ev| toggle_layer(name, event_target_checked(&ev))
                    />
                    {label}
                </label>
            }
        })
        .collect_view();

    let impact_boxes = (0..=ImpactLevel::MAX)
        .map(ImpactLevel::new)
        .map(|level| {
            view! {
                <label title=format!("Impact {}", level.get()) style="display: flex; flex-direction: column; align-items: center; font-size: 0.6rem;">
                    <input
                        type="checkbox"
                        prop:checked=move || layers.with(|l| l.impact_enabled(level))
                        on:change=move |ev| toggle_impact(level, event_target_checked(&ev))
                    />
                    {level.get()}
                </label>
            }
        })
        .collect_view();

    view! {
        <div class="panel" style="position: absolute; top: 16px; left: 16px; z-index: 10; display: flex; flex-direction: column; gap: 4px; font-size: 0.75rem; color: #e2e0d8;">
            {layer_rows}
            <div
                style="display: flex; gap: 4px; padding-top: 4px;"
                style:display=move || if layers.with(|l| l.get(COMPONENTS)) { "flex" } else { "none" }
            >
                {impact_boxes}
            </div>
            <input
                type="text"
                placeholder="Owner filter (name, id or /regex/)"
                prop:value=move || filter_text.get()
                on:input=on_filter_input
                style:border-color=move || if filter_invalid.get() { "#d94a4a" } else { "#282c3e" }
                style="margin-top: 6px; background: #13161f; border: 1px solid #282c3e; border-radius: 4px; color: #e2e0d8; padding: 4px 6px;"
            />
        </div>
    }
}

#[component]
fn StatsPanel() -> impl IntoView {
    let Readout(readout) = expect_context();
    let CursorCoords(cursor_coords) = expect_context();

    view! {
        <div class="panel" style="position: absolute; top: 16px; right: 16px; z-index: 10; min-width: 180px; font-size: 0.72rem; color: #9a9590; font-family: 'JetBrains Mono', monospace;">
            {move || {
                let r = readout.get();
                view! {
                    <div>{format!("{} / {} markers", r.visible, r.markers)}</div>
                    <div>{format!("{} chunks", r.chunks)}</div>
                    <div>{format!("zoom {:.3}", r.zoom)}</div>
                    <div>{format!("{:.2} units/px", r.units_per_pixel)}</div>
                }
            }}
            {move || cursor_coords.get().map(|(x, y)| view! {
                <div style="color: #e2e0d8;">{format!("{x:.1}, {y:.1}")}</div>
            })}
            <div style="margin-top: 6px; border-top: 1px solid rgba(40,44,62,0.5); padding-top: 4px;">
                {move || readout.with(|r| r.owners.iter().map(owner_row).collect_view())}
            </div>
        </div>
    }
}

fn owner_row(owner: &OwnerCount) -> impl IntoView + use<> {
    let (r, g, b) = owner_color(&owner.user_id);
    let name = if owner.display_name.is_empty() {
        owner.user_id.clone()
    } else {
        owner.display_name.clone()
    };
    let title = format!("{} ({})", owner.user_name, owner.user_id);
    view! {
        <div title=title style="display: flex; justify-content: space-between; gap: 8px;">
            <span style={format!("color: {};", rgba_css(r, g, b, 1.0))}>{name}</span>
            <span style="color: #e2e0d8;">{owner.count}</span>
        </div>
    }
}

#[component]
fn StatusLine() -> impl IntoView {
    let LoadStatus(status) = expect_context();

    view! {
        {move || status.get().map(|text| view! {
            <div style="position: absolute; bottom: 16px; right: 16px; z-index: 10; font-size: 0.7rem; color: #5a5860; font-family: 'JetBrains Mono', monospace;">
                {text}
            </div>
        })}
    }
}

/// Tooltip that follows the cursor while it rests on a marker.
#[component]
fn Tooltip() -> impl IntoView {
    let HoverTooltip(tooltip) = expect_context();

    view! {
        {move || {
            let Some(info) = tooltip.get() else {
                return view! { <div style="display:none;" /> }.into_any();
            };
            let (vw, vh) = canvas_dimensions();
            // Flip to the other side of the cursor near the right and bottom edges.
            let horizontal = if info.x > vw * 0.75 {
                format!("right: {}px;", vw - info.x + TOOLTIP_OFFSET)
            } else {
                format!("left: {}px;", info.x + TOOLTIP_OFFSET)
            };
            let vertical = if info.y > vh * 0.75 {
                format!("bottom: {}px;", vh - info.y + TOOLTIP_OFFSET)
            } else {
                format!("top: {}px;", info.y + TOOLTIP_OFFSET)
            };
            view! {
                <div
                    class="tooltip-animate"
                    style={format!(
                        "position: fixed; {horizontal} {vertical} pointer-events: none; z-index: 100; background: #161921; border: 1px solid #282c3e; border-radius: 6px; padding: 6px 8px; max-width: 320px; white-space: pre-line; font-size: 0.72rem; color: #e2e0d8; font-family: 'JetBrains Mono', monospace; box-shadow: 0 4px 16px rgba(0,0,0,0.5);"
                    )}
                >
                    {info.text}
                </div>
            }.into_any()
        }}
    }
}
