//! District assignment for Freifunk nodes.json files.
//!
//! Reads node locations and district polygons (GeoJSON), writes the matching
//! district into every node, and optionally emits migrate files and a GeoJSON
//! collection of nodes outside all districts.

mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use nodedistricts::naming::Whitelist;
use nodedistricts::pip::{load_districts, DEFAULT_NAME_PROPERTY};
use nodedistricts::{AssignOptions, Assigner, DistrictResolver, NodesFile};

use crate::config::Config;

const DEFAULT_DISTRICT: &str = "Default";

#[derive(Parser, Debug)]
#[command(name = "assign")]
#[command(about = "Add districts to a Freifunk nodes.json using a GeoJSON file of district polygons")]
struct Args {
    /// Path to the nodes.json file (may be gzipped)
    nodes_json: PathBuf,

    /// Path to the GeoJSON file containing the districts
    geojson: PathBuf,

    /// Used if a node isn't in any district [default: Default]
    #[arg(long)]
    default_district: Option<String>,

    /// Output nodes.json file
    #[arg(short = 'n', long)]
    output_nodes_json: Option<PathBuf>,

    /// Output folder for per-node migrate files
    #[arg(short = 'm', long)]
    output_migrate_folder: Option<PathBuf>,

    /// Output GeoJSON file listing only nodes that are in no district
    #[arg(short = 'x', long)]
    output_outsiders_json: Option<PathBuf>,

    /// Whitelist of district names, one per line; other names use the default
    #[arg(short = 'w', long)]
    whitelist_file: Option<PathBuf>,

    /// Lowercase district names and strip spaces, dashes and umlauts
    #[arg(short = 's', long)]
    sanitize_districts: bool,

    /// GeoJSON feature property holding the district name [default: STADTTLNAM]
    #[arg(long)]
    name_property: Option<String>,

    /// Optional TOML config file with an [assign] table
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter (e.g. "info", "nodedistricts=debug")
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    info!("Node district assignment");

    let config = match &args.config {
        Some(path) => {
            info!("Using config file {}", path.display());
            Config::load_from_file(path)?
        }
        None => Config::default(),
    };

    // CLI flags win over the config file
    let default_district = args
        .default_district
        .or(config.assign.default_district)
        .unwrap_or_else(|| DEFAULT_DISTRICT.to_string());
    let name_property = args
        .name_property
        .or(config.assign.name_property)
        .unwrap_or_else(|| DEFAULT_NAME_PROPERTY.to_string());
    let whitelist_file = args.whitelist_file.or(config.assign.whitelist_file);
    let migrate_folder = args.output_migrate_folder.or(config.assign.migrate_folder);
    let sanitize = args.sanitize_districts || config.assign.sanitize;

    let districts = load_districts(&args.geojson, &name_property)?;
    if districts.is_empty() {
        warn!("No districts found; every node gets '{}'", default_district);
    }
    let resolver = DistrictResolver::new(districts, default_district);

    let whitelist = whitelist_file
        .as_deref()
        .map(Whitelist::load)
        .transpose()?;
    if whitelist.as_ref().map_or(false, Whitelist::is_empty) {
        warn!("Whitelist is empty; district names are not filtered");
    }

    let mut nodes = NodesFile::load(&args.nodes_json)?;

    let options = AssignOptions {
        sanitize,
        whitelist,
        migrate_folder,
        collect_outsiders: args.output_outsiders_json.is_some(),
    };
    let mut assigner = Assigner::new(resolver, options)?;

    let pb = ProgressBar::new(nodes.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );

    for mut record in nodes.iter_mut() {
        assigner.assign_node(&mut record)?;
        pb.inc(1);
    }
    pb.finish_with_message("Assignment complete");

    let report = assigner.report();
    info!(
        "Assigned {} nodes: {} in a district, {} default ({} without location), {} not whitelisted",
        report.total(),
        report.matched,
        report.defaulted,
        report.without_location,
        report.whitelisted_out
    );

    if let Some(path) = &args.output_nodes_json {
        nodes.write(path)?;
    }

    if let Some(path) = &args.output_outsiders_json {
        info!("{} outsiders", assigner.outsiders().len());
        assigner.outsiders().write(path)?;
    }

    Ok(())
}
