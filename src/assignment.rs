//! Per-node district assignment.
//!
//! Resolves each node's location to a district, then applies the optional
//! post-processing steps: outsider collection, name sanitization, whitelist
//! filtering, and per-node migrate files.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::models::{NodeLocation, NodeRecord, NodesFile, OutsiderCollection};
use crate::naming::{sanitize_district, Whitelist};
use crate::pip::DistrictResolver;

/// Location used for nodes that report none
const FALLBACK_LOCATION: NodeLocation = NodeLocation { lon: 0.0, lat: 0.0 };

#[derive(Debug, Clone, Default)]
pub struct AssignOptions {
    /// Lowercase and strip separators/umlauts from district names
    pub sanitize: bool,
    /// Names outside this list fall back to the default district
    pub whitelist: Option<Whitelist>,
    /// Folder receiving one `<node_id>` file per node
    pub migrate_folder: Option<PathBuf>,
    /// Record located nodes that matched no district
    pub collect_outsiders: bool,
}

/// Counters for a finished (or running) assignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignReport {
    pub matched: usize,
    pub defaulted: usize,
    pub without_location: usize,
    pub whitelisted_out: usize,
}

impl AssignReport {
    pub fn total(&self) -> usize {
        self.matched + self.defaulted
    }
}

pub struct Assigner {
    resolver: DistrictResolver,
    options: AssignOptions,
    outsiders: OutsiderCollection,
    report: AssignReport,
}

impl Assigner {
    /// Create an assigner. The migrate folder is created if missing.
    pub fn new(resolver: DistrictResolver, options: AssignOptions) -> Result<Self> {
        if let Some(folder) = &options.migrate_folder {
            fs::create_dir_all(folder).with_context(|| {
                format!("Failed to create migrate folder: {}", folder.display())
            })?;
        }

        Ok(Self {
            resolver,
            options,
            outsiders: OutsiderCollection::default(),
            report: AssignReport::default(),
        })
    }

    /// Assign a district to one node and return the name written to it.
    pub fn assign_node(&mut self, record: &mut NodeRecord<'_>) -> Result<String> {
        let node_id = record.id();
        let location = record.location()?;
        if location.is_none() {
            self.report.without_location += 1;
        }

        let NodeLocation { lon, lat } = location.unwrap_or(FALLBACK_LOCATION);
        let resolved = self.resolver.lookup(lon, lat);
        let is_default = self.resolver.is_default(resolved);

        if is_default {
            self.report.defaulted += 1;
            if let (true, Some(location)) = (self.options.collect_outsiders, location) {
                self.outsiders.push(node_id, location);
            }
        } else {
            self.report.matched += 1;
        }

        let mut district = if self.options.sanitize {
            sanitize_district(resolved)
        } else {
            resolved.to_string()
        };

        if let Some(whitelist) = &self.options.whitelist {
            let filtered = whitelist
                .filter(&district, self.resolver.default_district())
                .to_string();
            if filtered != district {
                debug!("Node {}: '{}' is not whitelisted", node_id, district);
                self.report.whitelisted_out += 1;
                district = filtered;
            }
        }

        record.set_district(&district)?;

        if let Some(folder) = &self.options.migrate_folder {
            if is_safe_file_name(node_id) {
                let path = folder.join(node_id);
                fs::write(&path, format!("{}\n", district))
                    .with_context(|| format!("Failed to write migrate file: {}", path.display()))?;
            } else {
                warn!("Node id '{}' is not a valid file name, no migrate file written", node_id);
            }
        }

        Ok(district)
    }

    /// Assign districts to every node in the file
    pub fn assign_all(&mut self, nodes: &mut NodesFile) -> Result<()> {
        for mut record in nodes.iter_mut() {
            self.assign_node(&mut record)?;
        }
        Ok(())
    }

    pub fn report(&self) -> AssignReport {
        self.report
    }

    pub fn outsiders(&self) -> &OutsiderCollection {
        &self.outsiders
    }

    pub fn resolver(&self) -> &DistrictResolver {
        &self.resolver
    }
}

fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}
