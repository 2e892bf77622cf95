use markermap_shared::{EntityActivity, ImpactLevel};

/// Format RGBA as a CSS color string.
pub fn rgba_css(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({r},{g},{b},{a})")
}

/// Deterministic owner color from a CRC32 of the user id.
pub fn owner_color(user_id: &str) -> (u8, u8, u8) {
    let hash = crc32fast::hash(user_id.as_bytes());
    let [r, g, b, _] = hash.to_be_bytes();
    // Keep owner tints away from near-black so they read on the dark background.
    (r.max(64), g.max(64), b.max(64))
}

pub fn activity_color(activity: EntityActivity) -> (u8, u8, u8) {
    match activity {
        EntityActivity::Awake => (96, 214, 120),
        EntityActivity::Asleep => (120, 150, 230),
        EntityActivity::Frozen => (150, 220, 245),
    }
}

/// Components shade from cool to hot as impact rises.
pub fn impact_color(impact: ImpactLevel, active: bool) -> (u8, u8, u8) {
    let t = impact.get() as f64 / ImpactLevel::MAX as f64;
    let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    let base = (lerp(90.0, 245.0), lerp(200.0, 80.0), lerp(230.0, 60.0));
    if active { base } else { dim(base, 0.55) }
}

pub fn dim((r, g, b): (u8, u8, u8), factor: f64) -> (u8, u8, u8) {
    (
        (r as f64 * factor).min(255.0) as u8,
        (g as f64 * factor).min(255.0) as u8,
        (b as f64 * factor).min(255.0) as u8,
    )
}
