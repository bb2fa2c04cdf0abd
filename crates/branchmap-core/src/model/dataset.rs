// crates/branchmap-core/src/model/dataset.rs
use crate::error::{Result, SelectorError};
use crate::text::equals_folded;
use std::collections::HashSet;
use serde::{Deserialize, Serialize};

/// # The Flat Model
///
/// Regions and branches live in two contiguous vectors. A region owns the
/// range `branches[branches_start .. branches_start + branches_len]` and every
/// branch points back at its parent through `region_id`.
///
/// **Structure:** `Dataset` -> `Vec<Region>` + `Vec<Branch>`

/// A branch office in the normalized dataset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub region_id: u16,
    pub name: String,
    pub address: String,
}

/// A region / state with its branch range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: u16,
    pub name: String,
    /// File slug used to address per-region topology (`"tamilnadu"`).
    pub boundary_key: String,
    pub branches_start: usize,
    pub branches_len: usize,
}

/// Top-level dataset structure. Read-only once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub country: String,
    pub regions: Vec<Region>,
    pub branches: Vec<Branch>,
}

/// Simple aggregate statistics for a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub regions: usize,
    pub operational_regions: usize,
    pub branches: usize,
}

impl Region {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn boundary_key(&self) -> &str {
        &self.boundary_key
    }

    pub fn branch_count(&self) -> usize {
        self.branches_len
    }

    /// A region is operational when it has at least one branch.
    pub fn is_operational(&self) -> bool {
        self.branches_len > 0
    }
}

impl Branch {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl Dataset {
    pub fn country(&self) -> &str {
        &self.country
    }

    /// All regions, in dataset order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Regions with at least one branch.
    pub fn operational_regions(&self) -> impl Iterator<Item = &Region> + '_ {
        self.regions.iter().filter(|r| r.is_operational())
    }

    /// Looks a region up by its exact name, falling back to a folded match
    /// (`"tamil nadu"` finds `"Tamil Nadu"`).
    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions
            .iter()
            .find(|r| r.name == name)
            .or_else(|| self.regions.iter().find(|r| equals_folded(&r.name, name)))
    }

    /// Branches of `region`, in dataset order.
    pub fn branches_for_region<'a>(&'a self, region: &Region) -> &'a [Branch] {
        let end = region.branches_start + region.branches_len;
        &self.branches[region.branches_start..end]
    }

    /// The parent region of `branch`.
    pub fn region_of(&self, branch: &Branch) -> &Region {
        &self.regions[branch.region_id as usize]
    }

    /// Branch lookup by exact name within a region. Branch names are only
    /// unique per region, so the region is part of the key.
    pub fn branch(&self, region: &str, name: &str) -> Option<&Branch> {
        let region = self.region(region)?;
        self.branches_for_region(region)
            .iter()
            .find(|b| b.name == name)
    }

    /// Postal address of a branch.
    pub fn address_of(&self, region: &str, name: &str) -> Option<&str> {
        self.branch(region, name).map(Branch::address)
    }

    /// Check the flat invariants: contiguous in-bounds branch ranges,
    /// matching parent ids, non-blank unique names and non-blank addresses.
    ///
    /// JSON input is checked while it is converted; this covers datasets
    /// that arrive already flat, such as compiled bundles.
    pub fn validate(&self) -> Result<()> {
        let mut region_names = HashSet::new();
        let mut next_start = 0;

        for (idx, region) in self.regions.iter().enumerate() {
            if region.name.trim().is_empty() {
                return Err(integrity(format!("region #{idx} has an empty name")));
            }
            if !region_names.insert(region.name.as_str()) {
                return Err(integrity(format!("duplicate region '{}'", region.name)));
            }
            if usize::from(region.id) != idx {
                return Err(integrity(format!(
                    "region '{}' has id {} at position {idx}",
                    region.name, region.id
                )));
            }
            if region.branches_start != next_start {
                return Err(integrity(format!(
                    "branch range of '{}' starts at {}, expected {next_start}",
                    region.name, region.branches_start
                )));
            }
            let end = region
                .branches_start
                .checked_add(region.branches_len)
                .filter(|&end| end <= self.branches.len())
                .ok_or_else(|| {
                    integrity(format!(
                        "branch range of '{}' exceeds {} branches",
                        region.name,
                        self.branches.len()
                    ))
                })?;

            let mut branch_names = HashSet::new();
            for branch in &self.branches[region.branches_start..end] {
                if usize::from(branch.region_id) != idx {
                    return Err(integrity(format!(
                        "branch '{}' in range of '{}' points at region #{}",
                        branch.name, region.name, branch.region_id
                    )));
                }
                if branch.name.trim().is_empty() {
                    return Err(integrity(format!("empty branch name in '{}'", region.name)));
                }
                if !branch_names.insert(branch.name.as_str()) {
                    return Err(integrity(format!(
                        "duplicate branch '{}' in '{}'",
                        branch.name, region.name
                    )));
                }
                if branch.address.trim().is_empty() {
                    return Err(integrity(format!(
                        "branch '{}' in '{}' has no address",
                        branch.name, region.name
                    )));
                }
            }
            next_start = end;
        }

        if next_start != self.branches.len() {
            return Err(integrity(format!(
                "{} branches belong to no region",
                self.branches.len() - next_start
            )));
        }
        Ok(())
    }

    pub fn stats(&self) -> DatasetStats {
        DatasetStats {
            regions: self.regions.len(),
            operational_regions: self.operational_regions().count(),
            branches: self.branches.len(),
        }
    }
}

fn integrity(message: String) -> SelectorError {
    SelectorError::DataIntegrity(message)
}

#[cfg(test)]
mod tests {
    use crate::model::Dataset;

    fn sample() -> Dataset {
        Dataset::from_json_str(
            r#"{ "Rajasthan": {"Ajmer":"addr1","Jaipur":"addr2"}, "Kerala": {} }"#,
        )
        .unwrap()
    }

    #[test]
    fn ranges_point_at_own_branches() {
        let db = sample();
        let raj = db.region("Rajasthan").unwrap();
        let names: Vec<_> = db.branches_for_region(raj).iter().map(|b| b.name()).collect();
        assert_eq!(names, ["Ajmer", "Jaipur"]);
        assert_eq!(db.region_of(&db.branches[1]).name(), "Rajasthan");
    }

    #[test]
    fn operational_flag_follows_branch_count() {
        let db = sample();
        assert!(db.region("Rajasthan").unwrap().is_operational());
        assert!(!db.region("Kerala").unwrap().is_operational());
        let stats = db.stats();
        assert_eq!(stats.regions, 2);
        assert_eq!(stats.operational_regions, 1);
        assert_eq!(stats.branches, 2);
    }

    #[test]
    fn address_lookup_is_keyed_by_region() {
        let db = sample();
        assert_eq!(db.address_of("Rajasthan", "Jaipur"), Some("addr2"));
        assert_eq!(db.address_of("Kerala", "Jaipur"), None);
        assert_eq!(db.address_of("rajasthan", "Ajmer"), Some("addr1"));
    }

    #[test]
    fn converted_datasets_validate() {
        sample().validate().unwrap();
        Dataset::bundled().unwrap().validate().unwrap();
    }

    #[test]
    fn mismatched_parent_id_is_rejected() {
        let mut db = sample();
        db.branches[0].region_id = 1;
        assert!(db.validate().is_err());
    }

    #[test]
    fn orphan_branches_are_rejected() {
        let mut db = sample();
        db.regions[0].branches_len = 1;
        db.regions[1].branches_start = 1;
        assert!(db.validate().is_err());
    }
}
