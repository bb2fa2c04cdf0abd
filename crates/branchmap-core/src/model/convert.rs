// crates/branchmap-core/src/model/convert.rs
use super::dataset::{Branch, Dataset, Region};
use super::raw::{BranchRaw, DocumentRaw, RegionRaw};
use crate::error::{Result, SelectorError};
use crate::text::slugify;
use serde_json::{Map, Value};
use std::collections::HashSet;

const DEFAULT_COUNTRY: &str = "India";

impl Dataset {
    /// Parse a dataset from JSON text. Accepts both the document form and the
    /// compact `{ region: { branch: address } }` form.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_json_value(value)
    }

    pub fn from_json_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) if map.get("regions").is_some_and(Value::is_array) => {
                let doc: DocumentRaw = serde_json::from_value(Value::Object(map))?;
                from_raw(doc)
            }
            Value::Object(map) => from_compact(map),
            other => Err(SelectorError::InvalidData(format!(
                "dataset must be a JSON object, got {}",
                kind_of(&other)
            ))),
        }
    }
}

/// **Standard Converter:** Raw document -> Flat, validating every branch.
///
/// Any integrity problem aborts the whole conversion; a partially valid
/// dataset is never returned.
pub fn from_raw(doc: DocumentRaw) -> Result<Dataset> {
    let DocumentRaw {
        country,
        mut regions,
        branches,
    } = doc;

    // Fold the flat `branches` list into its parent regions first.
    for flat in branches {
        let parent = regions
            .iter_mut()
            .find(|r| r.name == flat.region)
            .ok_or_else(|| {
                SelectorError::DataIntegrity(format!(
                    "branch '{}' references unknown region '{}'",
                    flat.name, flat.region
                ))
            })?;
        parent.branches.push(BranchRaw {
            name: flat.name,
            address: flat.address,
        });
    }

    build(country.unwrap_or_else(|| DEFAULT_COUNTRY.to_owned()), regions)
}

/// **Compact Converter:** `{ "Rajasthan": { "Ajmer": "addr1" } }` -> Flat.
pub fn from_compact(map: Map<String, Value>) -> Result<Dataset> {
    let mut regions = Vec::with_capacity(map.len());
    for (region_name, branches) in map {
        let branches = match branches {
            Value::Object(b) => b,
            Value::Null => Map::new(),
            other => {
                return Err(SelectorError::InvalidData(format!(
                    "region '{region_name}' must map branch names to addresses, got {}",
                    kind_of(&other)
                )))
            }
        };

        let branches = branches
            .into_iter()
            .map(|(name, address)| match address {
                Value::String(a) => Ok(BranchRaw {
                    name,
                    address: Some(a),
                }),
                Value::Null => Ok(BranchRaw {
                    name,
                    address: None,
                }),
                other => Err(SelectorError::InvalidData(format!(
                    "address of '{name}' in '{region_name}' must be a string, got {}",
                    kind_of(&other)
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        regions.push(RegionRaw {
            name: region_name,
            boundary_key: None,
            branches,
        });
    }

    build(DEFAULT_COUNTRY.to_owned(), regions)
}

fn build(country: String, raw_regions: Vec<RegionRaw>) -> Result<Dataset> {
    if raw_regions.len() > u16::MAX as usize {
        return Err(SelectorError::InvalidData(format!(
            "too many regions: {}",
            raw_regions.len()
        )));
    }

    let mut db = Dataset {
        country,
        regions: Vec::with_capacity(raw_regions.len()),
        branches: Vec::new(),
    };
    let mut seen_regions = HashSet::new();

    for r_raw in raw_regions {
        let region_name = r_raw.name.trim().to_owned();
        if region_name.is_empty() {
            return Err(SelectorError::DataIntegrity("region with empty name".into()));
        }
        if !seen_regions.insert(region_name.clone()) {
            return Err(SelectorError::DataIntegrity(format!(
                "duplicate region '{region_name}'"
            )));
        }

        let r_id = db.regions.len() as u16;
        let branches_start = db.branches.len();
        let mut seen_branches = HashSet::new();

        for b_raw in r_raw.branches {
            let name = b_raw.name.trim().to_owned();
            if name.is_empty() {
                return Err(SelectorError::DataIntegrity(format!(
                    "branch with empty name in region '{region_name}'"
                )));
            }
            if !seen_branches.insert(name.clone()) {
                return Err(SelectorError::DataIntegrity(format!(
                    "duplicate branch '{name}' in region '{region_name}'"
                )));
            }
            let address = match b_raw.address.map(|a| a.trim().to_owned()) {
                Some(a) if !a.is_empty() => a,
                _ => {
                    return Err(SelectorError::DataIntegrity(format!(
                        "branch '{name}' in region '{region_name}' has no address"
                    )))
                }
            };
            db.branches.push(Branch {
                region_id: r_id,
                name,
                address,
            });
        }

        let boundary_key = r_raw
            .boundary_key
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| slugify(&region_name));

        db.regions.push(Region {
            id: r_id,
            name: region_name,
            boundary_key,
            branches_start,
            branches_len: db.branches.len() - branches_start,
        });
    }

    Ok(db)
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
