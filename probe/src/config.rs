pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 720.0;
pub const DEFAULT_PIXEL_RATIO: f64 = 1.0;
pub const DEFAULT_TOP_OWNERS: usize = 10;

fn positive_f64(key: &str) -> Option<f64> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value > 0.0)
}

pub fn viewport_width() -> f64 {
    positive_f64("MARKERMAP_VIEWPORT_WIDTH").unwrap_or(DEFAULT_VIEWPORT_WIDTH)
}

pub fn viewport_height() -> f64 {
    positive_f64("MARKERMAP_VIEWPORT_HEIGHT").unwrap_or(DEFAULT_VIEWPORT_HEIGHT)
}

pub fn pixel_ratio() -> f64 {
    positive_f64("MARKERMAP_PIXEL_RATIO").unwrap_or(DEFAULT_PIXEL_RATIO)
}

/// Owner filter text applied before the first redraw. Blank means no filter.
pub fn owner_filter() -> Option<String> {
    std::env::var("MARKERMAP_OWNER_FILTER")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn top_owners() -> usize {
    std::env::var("MARKERMAP_TOP_OWNERS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(DEFAULT_TOP_OWNERS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_defaults_when_unset() {
        temp_env::with_vars_unset(
            ["MARKERMAP_VIEWPORT_WIDTH", "MARKERMAP_VIEWPORT_HEIGHT"],
            || {
                assert_eq!(viewport_width(), DEFAULT_VIEWPORT_WIDTH);
                assert_eq!(viewport_height(), DEFAULT_VIEWPORT_HEIGHT);
            },
        );
    }

    #[test]
    fn viewport_reads_positive_values() {
        temp_env::with_vars(
            [
                ("MARKERMAP_VIEWPORT_WIDTH", Some("1920")),
                ("MARKERMAP_VIEWPORT_HEIGHT", Some(" 1080 ")),
            ],
            || {
                assert_eq!(viewport_width(), 1920.0);
                assert_eq!(viewport_height(), 1080.0);
            },
        );
    }

    #[test]
    fn invalid_or_non_positive_values_fall_back() {
        temp_env::with_vars(
            [
                ("MARKERMAP_VIEWPORT_WIDTH", Some("wide")),
                ("MARKERMAP_VIEWPORT_HEIGHT", Some("-5")),
                ("MARKERMAP_PIXEL_RATIO", Some("0")),
            ],
            || {
                assert_eq!(viewport_width(), DEFAULT_VIEWPORT_WIDTH);
                assert_eq!(viewport_height(), DEFAULT_VIEWPORT_HEIGHT);
                assert_eq!(pixel_ratio(), DEFAULT_PIXEL_RATIO);
            },
        );
    }

    #[test]
    fn blank_owner_filter_is_none() {
        temp_env::with_var("MARKERMAP_OWNER_FILTER", Some("   "), || {
            assert_eq!(owner_filter(), None);
        });
        temp_env::with_var("MARKERMAP_OWNER_FILTER", Some("/^al/i"), || {
            assert_eq!(owner_filter().as_deref(), Some("/^al/i"));
        });
    }

    #[test]
    fn top_owners_accepts_zero() {
        temp_env::with_var("MARKERMAP_TOP_OWNERS", Some("0"), || {
            assert_eq!(top_owners(), 0);
        });
        temp_env::with_var_unset("MARKERMAP_TOP_OWNERS", || {
            assert_eq!(top_owners(), DEFAULT_TOP_OWNERS);
        });
    }
}
