use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use tilemap::{generate_tiles, read_region, write_json, write_svg_preview, Matching, TilingConfig, WorkingCrs};
use tracing::info;

use crate::cli::{Cli, CrsArg, GenerateArgs, MatchingArg};

/// Error unless the file is absent or `force` is set.
fn check_writable(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("Output file already exists (use --force to overwrite): {}", path.display());
    }
    Ok(())
}

/// Merge the optional config file with command-line overrides.
fn build_config(args: &GenerateArgs) -> Result<TilingConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let bytes = fs::read(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_slice::<TilingConfig>(&bytes)
                .with_context(|| format!("Invalid config file: {}", path.display()))?
        }
        None => TilingConfig::default(),
    };

    if let Some(shape) = args.shape { config.shape = shape }
    if let Some(scale) = args.scale { config.scale = scale }
    if let Some(max_attempts) = args.max_attempts { config.max_attempts = max_attempts }
    if let Some(crs) = args.crs {
        config.working_crs = match crs {
            CrsArg::WebMercator => WorkingCrs::WebMercator,
            CrsArg::Utm => WorkingCrs::Utm,
        };
    }
    if let Some(matching) = args.matching {
        config.matching = match matching {
            MatchingArg::Scan => Matching::Scan,
            MatchingArg::Indexed => Matching::Indexed,
        };
    }
    if let Some(label) = &args.label { config.label = Some(label.clone()) }

    // "None" is the no-label sentinel of the upload form.
    if config.label.as_deref() == Some("None") { config.label = None }

    Ok(config)
}

pub fn run(_cli: &Cli, args: &GenerateArgs) -> Result<()> {
    for path in [&args.output, &args.tiles, &args.svg].into_iter().flatten() {
        check_writable(path, args.force)?;
    }

    let config = build_config(args)?;
    let region = read_region(&args.input, config.label.as_deref(), args.epsg)?;

    info!("[generate] tiling {} polygons with {} tiles, scale {}", region.len(), config.shape, config.scale);
    let result = generate_tiles(&region, &config)
        .with_context(|| format!("Failed to tile {}", args.input.display()))?;

    let stats = result.stats();
    info!("[generate] total_polygons    {}", stats.total_polygons);
    info!("[generate] generated_tiles   {}", stats.generated_tiles);
    info!("[generate] coverage_pct      {}", stats.coverage_pct);
    info!("[generate] rms_offset_m      {}", stats.rms_offset_m);
    info!("[generate] tile_width_m      {}", stats.tile_width_m);
    info!("[generate] tile_height_m     {}", stats.tile_height_m);
    info!("[generate] covered_area_m2   {}", stats.covered_area_m2);
    info!("[generate] uncovered_area_m2 {}", stats.uncovered_area_m2);
    info!("[generate] combined_metric   {}", stats.combined_metric);

    let document = result.to_json();
    match &args.output {
        Some(path) => {
            info!("[generate] writing result to {}", path.display());
            write_json(path, &document)?;
        }
        None => println!("{}", serde_json::to_string_pretty(&document)?),
    }

    if let Some(path) = &args.tiles {
        info!("[generate] writing tiles to {}", path.display());
        write_json(path, &result.tiles_geojson())?;
    }

    if let Some(path) = &args.svg {
        info!("[generate] writing preview to {}", path.display());
        write_svg_preview(path, &result, args.svg_width)?;
    }

    Ok(())
}
