mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use markermap_shared::{
    FilterError, IngestError, MapConfig, MapSession, OwnerCount, format_elapsed,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum ProbeError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid map config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("invalid layer toggle `{0}`; expected name=on|off")]
    LayerToggle(String),
    #[error("failed to encode report: {0}")]
    Report(serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(
    name = "markermap-probe",
    about = "Frame a marker file, run one visibility pass and report what is on screen"
)]
struct Cli {
    /// Marker file (JSON) to load.
    file: PathBuf,

    /// Optional JSON map config; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<f64>,

    #[arg(long)]
    height: Option<f64>,

    #[arg(long)]
    pixel_ratio: Option<f64>,

    /// Owner filter: plain text, a user id, or /pattern/flags.
    #[arg(long)]
    filter: Option<String>,

    /// Layer toggle such as `components=on`. Repeatable.
    #[arg(long = "layer", value_name = "NAME=on|off")]
    layers: Vec<String>,

    /// Hit-test at a client pixel position, e.g. `--at 640,360`.
    #[arg(long, value_parser = parse_point, value_name = "X,Y")]
    at: Option<(f64, f64)>,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    markers: usize,
    markers_visible: usize,
    chunks_visible: usize,
    scale: f64,
    units_per_pixel: f64,
    data_age: Option<String>,
    owners: Vec<OwnerCount>,
    hit: Option<HitReport>,
}

#[derive(Debug, Serialize)]
struct HitReport {
    index: usize,
    kind: &'static str,
    world: (f64, f64),
    tooltip: Option<String>,
    clipboard: Option<String>,
}

fn parse_point(raw: &str) -> Result<(f64, f64), String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got `{raw}`"))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("bad x: {e}"))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("bad y: {e}"))?;
    Ok((x, y))
}

fn parse_layer_toggle(raw: &str) -> Result<(String, bool), ProbeError> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| ProbeError::LayerToggle(raw.to_string()))?;
    let on = match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => return Err(ProbeError::LayerToggle(raw.to_string())),
    };
    Ok((name.trim().to_string(), on))
}

async fn load_config(path: Option<&PathBuf>) -> Result<MapConfig, ProbeError> {
    let Some(path) = path else {
        return Ok(MapConfig::default());
    };
    let bytes = tokio::fs::read(path).await.map_err(|source| ProbeError::Read {
        path: path.clone(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ProbeError::Config {
        path: path.clone(),
        source,
    })
}

async fn run(cli: Cli) -> Result<Report, ProbeError> {
    let map_config = load_config(cli.config.as_ref()).await?;
    let width = cli.width.unwrap_or_else(config::viewport_width);
    let height = cli.height.unwrap_or_else(config::viewport_height);
    let pixel_ratio = cli.pixel_ratio.unwrap_or_else(config::pixel_ratio);

    let mut session = MapSession::new(map_config);
    session.resize(width, height);
    session.view.set_pixel_ratio(pixel_ratio);

    for raw in &cli.layers {
        let (name, on) = parse_layer_toggle(raw)?;
        session.set_layer(&name, on);
    }
    if let Some(filter) = cli.filter.or_else(config::owner_filter) {
        session.set_owner_filter(&filter)?;
        tracing::info!(%filter, "owner filter applied");
    }

    let bytes = tokio::fs::read(&cli.file).await.map_err(|source| ProbeError::Read {
        path: cli.file.clone(),
        source,
    })?;
    let summary = session.load_json(&bytes)?;
    tracing::info!(
        markers = summary.markers,
        width,
        height,
        scale = session.view.scale,
        "marker file framed"
    );

    let stats = session.redraw().clone();
    tracing::info!(
        visible = stats.markers_visible,
        chunks = stats.chunks_visible,
        owners = stats.owners.owner_count(),
        "visibility pass complete"
    );

    let hit = cli.at.and_then(|(x, y)| {
        let marker = session.query(x, y)?;
        let hit = session.tooltip_at(x, y)?;
        Some(HitReport {
            index: hit.index,
            kind: marker.kind.label(),
            world: session.cursor_source_coords(x, y),
            tooltip: hit.tooltip,
            clipboard: hit.clipboard,
        })
    });
    if cli.at.is_some() && hit.is_none() {
        tracing::info!("no marker under the query point");
    }

    let mut owners = stats.owners.ranked();
    owners.truncate(config::top_owners());

    Ok(Report {
        markers: summary.markers,
        markers_visible: stats.markers_visible,
        chunks_visible: stats.chunks_visible,
        scale: session.view.zoom_display(),
        units_per_pixel: session.view.units_per_pixel(session.config().coord_scale),
        data_age: summary
            .generated_at
            .map(|generated_at| format_elapsed(generated_at, Utc::now())),
        owners,
        hit,
    })
}

fn print_report(report: &Report, json: bool) -> Result<(), ProbeError> {
    if json {
        let encoded = serde_json::to_string_pretty(report).map_err(ProbeError::Report)?;
        println!("{encoded}");
        return Ok(());
    }

    println!("markers:         {}", report.markers);
    println!("visible:         {}", report.markers_visible);
    println!("chunks visible:  {}", report.chunks_visible);
    println!("zoom:            {:.4} px/unit", report.scale);
    println!("units per pixel: {:.3}", report.units_per_pixel);
    if let Some(age) = &report.data_age {
        println!("data age:        {age}");
    }
    if !report.owners.is_empty() {
        println!("owners:");
        for owner in &report.owners {
            let name = if owner.display_name.is_empty() {
                &owner.user_id
            } else {
                &owner.display_name
            };
            println!("  {:>6}  {name}", owner.count);
        }
    }
    if let Some(hit) = &report.hit {
        println!(
            "hit:             #{} {} at ({:.1}, {:.1}) {}",
            hit.index,
            hit.kind,
            hit.world.0,
            hit.world.1,
            hit.tooltip.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;
    match run(cli).await.and_then(|report| print_report(&report, json)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "probe failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_query_point() {
        assert_eq!(parse_point("640,360"), Ok((640.0, 360.0)));
        assert_eq!(parse_point(" 1.5 , -2 "), Ok((1.5, -2.0)));
        assert!(parse_point("640").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn parses_layer_toggles() {
        assert_eq!(
            parse_layer_toggle("components=on").unwrap(),
            ("components".to_string(), true)
        );
        assert_eq!(
            parse_layer_toggle("brickedchunks = off").unwrap(),
            ("brickedchunks".to_string(), false)
        );
        assert!(matches!(
            parse_layer_toggle("components"),
            Err(ProbeError::LayerToggle(_))
        ));
        assert!(matches!(
            parse_layer_toggle("components=maybe"),
            Err(ProbeError::LayerToggle(_))
        ));
    }

    #[test]
    fn cli_accepts_repeated_layers() {
        let cli = Cli::try_parse_from([
            "markermap-probe",
            "dump.json",
            "--layer",
            "components=on",
            "--layer",
            "entities_frozen=off",
            "--at",
            "10,20",
        ])
        .unwrap();
        assert_eq!(cli.layers.len(), 2);
        assert_eq!(cli.at, Some((10.0, 20.0)));
        assert!(!cli.json);
    }

    #[tokio::test]
    async fn missing_config_path_uses_defaults() {
        let config = load_config(None).await.unwrap();
        assert_eq!(config, MapConfig::default());
    }

    #[tokio::test]
    async fn unreadable_file_is_reported() {
        let cli = Cli::try_parse_from(["markermap-probe", "/nonexistent/markers.json"]).unwrap();
        assert!(matches!(run(cli).await, Err(ProbeError::Read { .. })));
    }
}
