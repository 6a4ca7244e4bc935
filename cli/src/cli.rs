use std::path::PathBuf;

use tilemap::TileShape;

/// Tile map generator CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "tilemap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Replace the polygons of a region with a regular tiling and score it
    Generate(GenerateArgs),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, clap::ValueEnum)]
pub enum CrsArg { WebMercator, Utm }

#[derive(Copy, Clone, Eq, PartialEq, Debug, clap::ValueEnum)]
pub enum MatchingArg { Scan, Indexed }

/// Accept the exact tokens plus lowercase English names.
fn parse_shape(s: &str) -> Result<TileShape, String> {
    match s {
        "rectangle" => Ok(TileShape::Rectangle),
        "hexagon" => Ok(TileShape::Hexagon),
        other => other.parse().map_err(|e: tilemap::TilingError| e.to_string()),
    }
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Input region (.geojson, .json or .shp)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Tile shape: "Rechteck" or "Hexagon" [default: Rechteck]
    #[arg(short, long, value_parser = parse_shape)]
    pub shape: Option<TileShape>,

    /// Factor applied to the tile size on every sizing attempt [default: 1.0]
    #[arg(long)]
    pub scale: Option<f64>,

    /// Attribute copied onto output features ("None" for no label)
    #[arg(short, long)]
    pub label: Option<String>,

    /// EPSG code of the input, overriding what the file declares
    #[arg(long)]
    pub epsg: Option<u32>,

    /// Planar CRS to compute in [default: web-mercator]
    #[arg(long, value_enum)]
    pub crs: Option<CrsArg>,

    /// Nearest-tile search strategy [default: indexed]
    #[arg(long, value_enum)]
    pub matching: Option<MatchingArg>,

    /// Maximum number of grid sizes to try [default: 15]
    #[arg(long)]
    pub max_attempts: Option<usize>,

    /// JSON file with tiling parameters; flags override it
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Output result file (JSON); stdout if omitted
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Also write the tiles alone as a GeoJSON FeatureCollection
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub tiles: Option<PathBuf>,

    /// Also write an SVG preview of region and tiles
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub svg: Option<PathBuf>,

    /// Width of the SVG preview in pixels
    #[arg(long, default_value_t = 1200.0)]
    pub svg_width: f64,

    /// Overwrite output files that already exist
    #[arg(long)]
    pub force: bool,
}
