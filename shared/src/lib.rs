pub mod config;
pub mod extent;
pub mod hit_test;
pub mod ingest;
pub mod layers;
pub mod marker;
pub mod navigation;
pub mod owner_filter;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod store;
pub mod time_format;
pub mod view;
pub mod visibility;

pub use config::{MapConfig, ZoomLimits};
pub use extent::Extent;
pub use hit_test::TooltipHit;
pub use ingest::{IngestError, MarkerFile, parse_marker_file};
pub use layers::LayerFlags;
pub use marker::*;
pub use navigation::{GestureState, PointerTracker, ZoomButton};
pub use owner_filter::{FilterError, OwnerFilter};
pub use scheduler::{FrameOutcome, FrameScheduler, TooltipUpdate};
pub use session::{LoadSummary, MapSession};
pub use stats::{OwnerCount, OwnerStats};
pub use store::MarkerStore;
pub use time_format::format_elapsed;
pub use view::View;
pub use visibility::FrameStats;
