/// Service catalog: the 234 names painted on the tower's platforms.
///
/// File format (JSON):
///
/// ```json
/// { "nodes": [ { "name": "EC2", "category": "Compute", "description": "..." },
///              { "name": "AWS", "isCentral": true } ] }
/// ```
///
/// Loading normalizes whatever the file holds into exactly `TOWER_HEIGHT`
/// entries: central nodes are dropped, missing fields get defaults, short
/// lists are padded (S3 feature names first, then numbered fillers) and long
/// lists are truncated.

use std::path::Path;

use serde::Deserialize;

use crate::error::{GameError, Result};

/// Number of catalog-backed platforms (and the index of the final one).
pub const TOWER_HEIGHT: usize = 234;

const S3_EXTRAS: [&str; 6] = [
    "S3 Express One Zone",
    "S3 Transfer Acceleration",
    "S3 Cross-Region Replication",
    "S3 Same-Region Replication",
    "S3 Inventory",
    "S3 Analytics",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogItem {
    pub name: String,
    pub description: String,
    pub category: String,
}

/// Exactly `TOWER_HEIGHT` items; entry `i` labels platform `i + 1`.
#[derive(Clone, Debug)]
pub struct Catalog(Vec<CatalogItem>);

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Result<Self> {
        if items.len() != TOWER_HEIGHT {
            return Err(GameError::CatalogSize { expected: TOWER_HEIGHT, actual: items.len() });
        }
        Ok(Catalog(items))
    }

    /// Catalog entry for a platform index (1..=TOWER_HEIGHT).
    pub fn for_platform(&self, index: usize) -> Option<&CatalogItem> {
        index.checked_sub(1).and_then(|i| self.0.get(i))
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn items(&self) -> &[CatalogItem] {
        &self.0
    }
}

// ── JSON Schema ──

#[derive(Deserialize, Debug)]
struct CatalogFile {
    nodes: Vec<CatalogNode>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CatalogNode {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    is_central: bool,
}

// ── Loading ──

/// Read and normalize a catalog file. A missing or malformed file is an error.
pub fn load(path: &Path) -> Result<Catalog> {
    if !path.is_file() {
        return Err(GameError::CatalogMissing(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    let catalog = parse(&text)?;
    tracing::info!("catalog loaded from {}", path.display());
    Ok(catalog)
}

pub fn parse(text: &str) -> Result<Catalog> {
    let file: CatalogFile = serde_json::from_str(text)?;
    let real = file.nodes.iter().filter(|n| !n.is_central).count();
    if real < TOWER_HEIGHT {
        tracing::debug!("catalog has {real} services, padding to {TOWER_HEIGHT}");
    }
    Catalog::new(normalize(file.nodes))
}

fn normalize(nodes: Vec<CatalogNode>) -> Vec<CatalogItem> {
    let mut items: Vec<CatalogItem> = nodes
        .into_iter()
        .filter(|n| !n.is_central)
        .map(|n| CatalogItem {
            name: n.name,
            description: n.description.unwrap_or_default(),
            category: n.category.unwrap_or_else(|| "AWS".into()),
        })
        .collect();

    for extra in S3_EXTRAS {
        if items.len() >= TOWER_HEIGHT {
            break;
        }
        items.push(CatalogItem {
            name: extra.into(),
            description: format!("S3 feature: {extra}"),
            category: "S3 Services".into(),
        });
    }

    while items.len() < TOWER_HEIGHT {
        items.push(CatalogItem {
            name: format!("AWS Advanced Service {}", items.len() + 1),
            description: "AWS service".into(),
            category: "AWS".into(),
        });
    }

    items.truncate(TOWER_HEIGHT);
    items
}

/// Deterministic full catalog for tests.
#[cfg(test)]
pub fn sample_catalog() -> Catalog {
    let items = (1..=TOWER_HEIGHT)
        .map(|i| CatalogItem {
            name: format!("Service {i}"),
            description: String::new(),
            category: if i % 2 == 0 { "Compute".into() } else { "Storage".into() },
        })
        .collect();
    match Catalog::new(items) {
        Ok(c) => c,
        Err(e) => panic!("sample catalog: {e}"),
    }
}
