use std::time::Duration;

use quakemap::prelude::*;

const DEFAULT_DATASET: &str = "data/earthquakes_4326_cali.geojson";
const DEFAULT_OUTPUT: &str = "quakemap.svg";

/// Renders the earthquake map headlessly and writes the scene as SVG.
///
/// Usage: `quakemap-app [dataset] [output.svg] [config.json]`
fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    quakemap::init_logging();

    let mut args = std::env::args().skip(1);
    let dataset = args.next().unwrap_or_else(|| DEFAULT_DATASET.to_string());
    let output = args.next().unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    let config = match args.next() {
        Some(path) => MapConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => MapConfig::default(),
    };

    // Tile workers use a blocking HTTP client, which must be created outside
    // the async runtime.
    let mut map = InteractionController::with_http_tiles(config, SceneGraph::default())?;

    let runtime = tokio::runtime::Runtime::new()?;
    let source = source_for(&dataset);
    let initial = runtime.block_on(map.load(source.as_ref()))?;
    log::info!(
        "placed view at k={} with {} points over {} tiles",
        initial.transform.k,
        initial.paths,
        initial.visible_tiles
    );

    run_script(&mut map);

    let applied = map.wait_for_tiles(Duration::from_secs(20));
    log::info!(
        "{} tile loads applied, {} still pending",
        applied,
        map.raster().pending_count()
    );

    std::fs::write(&output, map.surface().to_svg())?;
    println!("wrote {}", output);
    Ok(())
}

/// Zooms in on the center, pans east, then zooms back out.
fn run_script(map: &mut InteractionController<SceneGraph>) {
    let zoom = map.zoom_behavior();
    let focal = map.size().center();
    let Some(mut current) = map.transform() else {
        return;
    };

    let mut steps = Vec::new();
    for _ in 0..4 {
        current = zoom.scale_by(&current, 2f64.sqrt(), focal);
        steps.push(current);
    }
    for _ in 0..3 {
        current = zoom.pan_by(&current, -120.0, 0.0);
        steps.push(current);
    }
    for _ in 0..2 {
        current = zoom.scale_by(&current, 0.5, focal);
        steps.push(current);
    }

    for event in zoom.gesture(&steps) {
        if let Some(summary) = map.on_gesture(event) {
            log::debug!(
                "k={:.0} z{}: {} tiles (+{} -{})",
                summary.transform.k,
                summary.zoom,
                summary.visible_tiles,
                summary.tiles_added,
                summary.tiles_removed
            );
        }
        map.poll_tile_loads();
    }
}
