use std::f64::consts::TAU;

use markermap_shared::{HitZone, MapSession, Marker, MarkerKind};
use web_sys::CanvasRenderingContext2d;

use crate::colors::{activity_color, impact_color, owner_color, rgba_css};

const BACKGROUND: &str = "#0c0e17";
const GRID_LINE: &str = "rgba(255,255,255,0.05)";
const HIGHLIGHT: &str = "rgba(245,197,66,0.9)";
const ENTITY_RADIUS_PX: f64 = 4.0;
const GENERIC_RADIUS_PX: f64 = 5.0;

/// Paint every visible marker at its cached screen anchor, in store order.
/// Everything is in device pixels; CSS sizes are scaled by the pixel ratio.
pub fn paint(ctx: &CanvasRenderingContext2d, session: &MapSession) {
    let view = &session.view;
    let (w, h) = view.canvas_size();
    let ratio = view.pixel_ratio;

    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, w, h);
    paint_grid(ctx, session, w, h);

    for marker in session.store.iter().filter(|m| m.visible) {
        let Some(anchor) = marker.screen_anchor else {
            continue;
        };
        match &marker.kind {
            MarkerKind::Chunk(_) => {
                let size = zone_width(marker) * ratio;
                let (r, g, b) = marker_tint(marker).unwrap_or((200, 170, 90));
                ctx.set_fill_style_str(&rgba_css(r, g, b, 0.35));
                ctx.fill_rect(anchor.x, anchor.y, size, size);
                ctx.set_stroke_style_str(&rgba_css(r, g, b, 0.8));
                ctx.set_line_width(ratio);
                ctx.stroke_rect(anchor.x, anchor.y, size, size);
            }
            MarkerKind::Component(info) => {
                let size = zone_width(marker) * ratio;
                let (r, g, b) = impact_color(info.impact, info.active);
                ctx.set_fill_style_str(&rgba_css(r, g, b, 0.9));
                ctx.fill_rect(anchor.x - size * 0.5, anchor.y - size * 0.5, size, size);
            }
            MarkerKind::Entity(state) => {
                let (r, g, b) = activity_color(state.activity());
                dot(ctx, anchor.x, anchor.y, ENTITY_RADIUS_PX * ratio, (r, g, b));
                if let Some(tint) = marker_tint(marker) {
                    ctx.set_stroke_style_str(&rgba_css(tint.0, tint.1, tint.2, 0.9));
                    ctx.set_line_width(1.5 * ratio);
                    ctx.stroke();
                }
            }
            MarkerKind::Generic => {
                let color = marker_tint(marker).unwrap_or((235, 232, 220));
                dot(ctx, anchor.x, anchor.y, GENERIC_RADIUS_PX * ratio, color);
            }
        }
    }
}

fn dot(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64, (r, g, b): (u8, u8, u8)) {
    ctx.begin_path();
    if ctx.arc(x, y, radius, 0.0, TAU).is_err() {
        return;
    }
    ctx.set_fill_style_str(&rgba_css(r, g, b, 0.95));
    ctx.fill();
}

fn marker_tint(marker: &Marker) -> Option<(u8, u8, u8)> {
    marker.owner_id().map(owner_color)
}

fn zone_width(marker: &Marker) -> f64 {
    match marker.hit_zone {
        HitZone::Rect { width, .. } => width,
        HitZone::Circle { radius } => radius.unwrap_or(GENERIC_RADIUS_PX) * 2.0,
        HitZone::Custom(_) => GENERIC_RADIUS_PX * 2.0,
    }
}

/// Faint chunk grid once chunks are large enough to tell apart.
fn paint_grid(ctx: &CanvasRenderingContext2d, session: &MapSession, w: f64, h: f64) {
    let view = &session.view;
    let step = session.config().chunk_world_size * view.scale * view.pixel_ratio;
    if step < 12.0 {
        return;
    }
    let origin_x = view.world_to_screen_x(0.0, 0.0).rem_euclid(step);
    let origin_y = view.world_to_screen_y(0.0, 0.0).rem_euclid(step);

    ctx.set_stroke_style_str(GRID_LINE);
    ctx.set_line_width(1.0);
    ctx.begin_path();
    let mut x = origin_x;
    while x < w {
        ctx.move_to(x, 0.0);
        ctx.line_to(x, h);
        x += step;
    }
    let mut y = origin_y;
    while y < h {
        ctx.move_to(0.0, y);
        ctx.line_to(w, y);
        y += step;
    }
    ctx.stroke();
}

/// Border highlight around the marker under the tooltip.
pub fn highlight(ctx: &CanvasRenderingContext2d, session: &MapSession, index: usize) {
    let Some(marker) = session.store.get(index) else {
        return;
    };
    let Some(anchor) = marker.screen_anchor else {
        return;
    };
    let ratio = session.view.pixel_ratio;
    ctx.set_stroke_style_str(HIGHLIGHT);
    ctx.set_line_width(2.0 * ratio);
    match marker.kind {
        MarkerKind::Chunk(_) => {
            let size = zone_width(marker) * ratio;
            ctx.stroke_rect(anchor.x, anchor.y, size, size);
        }
        _ => {
            let radius = (zone_width(marker) * 0.5 + 3.0) * ratio;
            ctx.begin_path();
            if ctx.arc(anchor.x, anchor.y, radius, 0.0, TAU).is_ok() {
                ctx.stroke();
            }
        }
    }
}
