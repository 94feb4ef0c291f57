use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use foundation::math::{self, PathType};
use foundation::{Angle, LatLon, Position, Sector};
use globe::{Globe, Projection};
use grid::{GridConfig, GridLayer, Hemisphere, MgrsCoord, UtmCoord, ZoneIndex};
use paths::interpolate;
use runtime::Frame;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use view::{DrawContext, OrbitParams, OrbitView};

#[derive(Debug, Parser)]
#[command(name = "gridtool", about = "UTM/MGRS conversions and grid selection")]
struct Cli {
    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,
    /// Grid config file (JSON).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert a latitude/longitude to UTM.
    Utm {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Project into this zone instead of the one covering the location.
        #[arg(long)]
        zone: Option<u8>,
    },
    /// Convert a latitude/longitude to MGRS.
    Mgrs {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, default_value_t = grid::MAX_PRECISION)]
        precision: u8,
    },
    /// Parse an MGRS string back to latitude/longitude.
    MgrsParse { text: String },
    /// Describe the grid zone covering a location.
    Zone {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
    /// Project a position to model coordinates and back.
    Project {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        elevation: f64,
        #[arg(long, default_value = "ellipsoidal")]
        projection: Projection,
    },
    /// Sample a path between locations given as `lat,lon`.
    Path {
        #[arg(required = true, num_args = 2.., allow_hyphen_values = true, value_parser = parse_location)]
        points: Vec<LatLon>,
        #[arg(long, default_value = "great-circle")]
        path_type: PathType,
        #[arg(long, default_value_t = 10)]
        steps: usize,
    },
    /// Run one grid selection for an orbit view.
    Select {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Eye distance from the centre in meters.
        #[arg(long)]
        range: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        heading: f64,
        #[arg(long, default_value_t = 0.0)]
        pitch: f64,
        #[arg(long, default_value = "ellipsoidal")]
        projection: Projection,
        /// List every label in the selection.
        #[arg(long)]
        labels: bool,
    },
}

fn parse_location(s: &str) -> Result<LatLon, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `lat,lon`, got `{s}`"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("latitude `{lat}`: {e}"))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("longitude `{lon}`: {e}"))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("`{s}` is not a valid location"));
    }
    Ok(LatLon::from_degrees(lat, lon))
}

#[derive(Debug, Serialize)]
struct UtmOut {
    zone: u8,
    hemisphere: Hemisphere,
    easting: f64,
    northing: f64,
    text: String,
}

impl From<&UtmCoord> for UtmOut {
    fn from(utm: &UtmCoord) -> Self {
        Self {
            zone: utm.zone,
            hemisphere: utm.hemisphere,
            easting: utm.easting,
            northing: utm.northing,
            text: utm.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MgrsOut {
    mgrs: String,
    grid_zone: String,
    square: String,
    precision: u8,
    latitude: f64,
    longitude: f64,
    dms: String,
    utm: UtmOut,
}

impl From<&MgrsCoord> for MgrsOut {
    fn from(mgrs: &MgrsCoord) -> Self {
        Self {
            mgrs: mgrs.to_string(),
            grid_zone: mgrs.grid_zone_designator(),
            square: mgrs.square.clone(),
            precision: mgrs.precision,
            latitude: mgrs.latitude().degrees(),
            longitude: mgrs.longitude().degrees(),
            dms: dms(mgrs.latitude(), mgrs.longitude()),
            utm: UtmOut::from(&mgrs.utm),
        }
    }
}

fn dms(lat: Angle, lon: Angle) -> String {
    format!("{} {}", lat.to_dms_string(), lon.to_dms_string())
}

#[derive(Debug, Serialize)]
struct SectorOut {
    min_latitude: f64,
    max_latitude: f64,
    min_longitude: f64,
    max_longitude: f64,
}

impl From<&Sector> for SectorOut {
    fn from(s: &Sector) -> Self {
        Self {
            min_latitude: s.min_latitude().degrees(),
            max_latitude: s.max_latitude().degrees(),
            min_longitude: s.min_longitude().degrees(),
            max_longitude: s.max_longitude().degrees(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ZoneOut {
    name: String,
    row: usize,
    col: usize,
    sector: SectorOut,
    north_neighbors: Vec<String>,
    east_neighbor: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProjectOut {
    projection: &'static str,
    point: [f64; 3],
    latitude: f64,
    longitude: f64,
    elevation: f64,
}

#[derive(Debug, Serialize)]
struct PathOut {
    path_type: String,
    length_m: f64,
    samples: Vec<[f64; 2]>,
}

#[derive(Debug, Serialize)]
struct SelectOut {
    frame: u64,
    renderables: usize,
    by_style: BTreeMap<String, usize>,
    by_kind: BTreeMap<String, usize>,
    labels: Vec<String>,
    counters: BTreeMap<&'static str, u64>,
}

fn serde_name<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => GridConfig::load(path)
            .with_context(|| format!("loading grid config {}", path.display()))?,
        None => GridConfig::default(),
    };
    debug!(?config, "grid config");
    let globe = Globe::wgs84();

    match cli.command {
        Command::Utm { lat, lon, zone } => {
            let (lat, lon) = (Angle::from_degrees(lat), Angle::from_degrees(lon));
            let utm = match zone {
                Some(zone) => UtmCoord::from_lat_lon_in_zone(
                    lat,
                    lon,
                    zone,
                    Hemisphere::from_latitude(lat),
                    &globe,
                )?,
                None => UtmCoord::from_lat_lon(lat, lon, &globe)?,
            };
            emit(cli.json, &UtmOut::from(&utm), |o| o.text.clone())
        }
        Command::Mgrs {
            lat,
            lon,
            precision,
        } => {
            let mgrs = MgrsCoord::from_lat_lon_with_precision(
                Angle::from_degrees(lat),
                Angle::from_degrees(lon),
                precision,
                &globe,
            )?;
            emit(cli.json, &MgrsOut::from(&mgrs), |o| o.mgrs.clone())
        }
        Command::MgrsParse { text } => {
            let mgrs = MgrsCoord::from_string(&text, &globe)
                .with_context(|| format!("parsing `{text}`"))?;
            emit(cli.json, &MgrsOut::from(&mgrs), |o| {
                format!("{:.6} {:.6} {} ({})", o.latitude, o.longitude, o.dms, o.utm.text)
            })
        }
        Command::Zone { lat, lon } => {
            let Some(index) =
                ZoneIndex::for_location(Angle::from_degrees(lat), Angle::from_degrees(lon))
            else {
                bail!("({lat}, {lon}) is outside the UTM zones");
            };
            let out = ZoneOut {
                name: index.name(),
                row: index.row,
                col: index.col,
                sector: SectorOut::from(&index.sector()),
                north_neighbors: index.north_neighbors().into_iter().map(ZoneIndex::name).collect(),
                east_neighbor: index.east_neighbor().map(ZoneIndex::name),
            };
            emit(cli.json, &out, |o| {
                format!(
                    "{} lat {}..{} lon {}..{}",
                    o.name,
                    o.sector.min_latitude,
                    o.sector.max_latitude,
                    o.sector.min_longitude,
                    o.sector.max_longitude
                )
            })
        }
        Command::Project {
            lat,
            lon,
            elevation,
            projection,
        } => {
            let globe = globe.with_projection(projection);
            let point =
                globe.point_from_position(Angle::from_degrees(lat), Angle::from_degrees(lon), elevation);
            let back = globe.compute_position_from_point(point);
            let out = ProjectOut {
                projection: projection.name(),
                point: [point.x, point.y, point.z],
                latitude: back.latitude.degrees(),
                longitude: back.longitude.degrees(),
                elevation: back.elevation,
            };
            emit(cli.json, &out, |o| {
                format!(
                    "{} ({:.3}, {:.3}, {:.3}) -> {:.9} {:.9} {:.3}",
                    o.projection, o.point[0], o.point[1], o.point[2], o.latitude, o.longitude, o.elevation
                )
            })
        }
        Command::Path {
            points,
            path_type,
            steps,
        } => {
            let out = sample_path(&globe, &points, path_type, steps);
            emit(cli.json, &out, |o| {
                let mut text = format!("{} {:.1} m", o.path_type, o.length_m);
                for [lat, lon] in &o.samples {
                    text.push_str(&format!("\n{lat:.6} {lon:.6}"));
                }
                text
            })
        }
        Command::Select {
            lat,
            lon,
            range,
            heading,
            pitch,
            projection,
            labels,
        } => {
            if range.is_nan() || range <= 0.0 {
                bail!("range must be positive, got {range}");
            }
            let globe = globe.with_projection(projection);
            let params = OrbitParams::looking_at(Position::from_degrees(lat, lon, 0.0), range)
                .with_heading(Angle::from_degrees(heading))
                .with_pitch(Angle::from_degrees(pitch));
            let out = select(&globe, params, config, labels);
            emit(cli.json, &out, |o| {
                let mut text = format!("frame {} renderables {}", o.frame, o.renderables);
                for (style, count) in &o.by_style {
                    text.push_str(&format!("\n  {style}: {count}"));
                }
                for label in &o.labels {
                    text.push_str(&format!("\n  label {label}"));
                }
                text
            })
        }
    }
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text(value));
    }
    Ok(())
}

fn sample_path(globe: &Globe, points: &[LatLon], path_type: PathType, steps: usize) -> PathOut {
    let steps = steps.max(1);
    let positions: Vec<Position> = points.iter().map(|ll| ll.with_elevation(0.0)).collect();
    let mut samples = Vec::new();
    let mut length_m = 0.0;
    for (i, pair) in positions.windows(2).enumerate() {
        let (a, b) = (&pair[0], &pair[1]);
        length_m += math::distance(path_type, a.lat_lon(), b.lat_lon()).radians()
            * globe.equatorial_radius();
        let first = usize::from(i > 0);
        for step in first..=steps {
            let p = interpolate(step as f64 / steps as f64, a, b, path_type);
            samples.push([p.latitude.degrees(), p.longitude.degrees()]);
        }
    }
    PathOut {
        path_type: format!("{path_type:?}"),
        length_m,
        samples,
    }
}

fn select(globe: &Globe, params: OrbitParams, config: GridConfig, with_labels: bool) -> SelectOut {
    let view = OrbitView::new(globe, params);
    let dc = DrawContext::new(globe, &view, 1.0, Frame::first());
    let mut layer = GridLayer::new(config);
    let selection = layer.select_visible(&dc);
    layer.metrics().log("gridtool");
    info!(renderables = selection.len(), "selection done");

    let mut by_style = BTreeMap::new();
    let mut by_kind = BTreeMap::new();
    for r in &selection.renderables {
        *by_style.entry(serde_name(&r.style)).or_insert(0) += 1;
        *by_kind.entry(serde_name(&r.element.kind)).or_insert(0) += 1;
    }
    SelectOut {
        frame: selection.frame,
        renderables: selection.len(),
        by_style,
        by_kind,
        labels: if with_labels {
            selection.labels().map(str::to_string).collect()
        } else {
            Vec::new()
        },
        counters: layer.metrics().snapshot().counters.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, dms, parse_location, sample_path, select};
    use clap::Parser;
    use foundation::math::PathType;
    use foundation::{Angle, Position};
    use globe::Globe;
    use grid::GridConfig;
    use pretty_assertions::assert_eq;
    use view::OrbitParams;

    #[test]
    fn dms_pairs_latitude_and_longitude() {
        let text = dms(Angle::from_degrees(-45.51), Angle::from_degrees(10.25));
        assert_eq!(text, "-45\u{00b0} 30\u{2019} 36.00\u{201d} 10\u{00b0} 15\u{2019} 0.00\u{201d}");
    }

    #[test]
    fn locations_parse() {
        let ll = parse_location("-33.5, 151").unwrap();
        assert_eq!(ll.latitude.degrees(), -33.5);
        assert_eq!(ll.longitude.degrees(), 151.0);
        assert!(parse_location("91,0").is_err());
        assert!(parse_location("12").is_err());
    }

    #[test]
    fn cli_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["gridtool", "--json", "utm", "--lat", "-33.9", "--lon", "18.4"]);
        assert!(cli.is_ok(), "{cli:?}");
        let cli = Cli::try_parse_from(["gridtool", "path", "--path-type", "rhumb", "0,0", "-10,20"]);
        assert!(cli.is_ok(), "{cli:?}");
    }

    #[test]
    fn path_samples_hit_endpoints() {
        let globe = Globe::wgs84();
        let points = [parse_location("0,0").unwrap(), parse_location("0,10").unwrap()];
        let out = sample_path(&globe, &points, PathType::Linear, 4);
        assert_eq!(out.samples.len(), 5);
        assert_eq!(out.samples[0], [0.0, 0.0]);
        assert_eq!(out.samples[4], [0.0, 10.0]);
        assert_eq!(out.samples[2], [0.0, 5.0]);
        assert!(out.length_m > 1_100_000.0 && out.length_m < 1_120_000.0);
    }

    #[test]
    fn select_reports_zone_labels() {
        let globe = Globe::wgs84();
        let params = OrbitParams::looking_at(Position::from_degrees(4.0, 3.0, 0.0), 4_000_000.0);
        let out = select(&globe, params, GridConfig::default(), true);
        assert!(out.renderables > 0);
        assert!(out.labels.iter().any(|l| l == "31N"));
        assert_eq!(out.by_style.get("grid-zone").copied(), Some(out.renderables));
        assert_eq!(out.counters.get("grid.selections").copied(), Some(1));
    }
}
