// crates/branchmap-core/src/search.rs
use crate::model::{Dataset, DatasetStats, Region};
use crate::text::fold_key;
use crate::traits::{BranchContext, BranchSearch};

impl BranchSearch for Dataset {
    fn stats(&self) -> DatasetStats {
        Dataset::stats(self)
    }

    fn find_regions(&self, query: &str) -> Vec<&Region> {
        let q = fold_key(query);
        if q.is_empty() {
            return Vec::new();
        }
        self.regions
            .iter()
            .filter(|r| fold_key(&r.name).contains(&q))
            .collect()
    }

    fn find_branches(&self, query: &str) -> Vec<BranchContext<'_>> {
        let q = fold_key(query);
        if q.is_empty() {
            return Vec::new();
        }

        // Linear scan over the flat branch vector; the parent is one index away.
        self.branches
            .iter()
            .filter(|b| fold_key(&b.name).contains(&q))
            .map(|b| (b, self.region_of(b)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Dataset {
        Dataset::from_json_str(
            r#"{
                "Rajasthan": {"Nagaur":"a","Jaipur":"b"},
                "Maharashtra": {"Nagpur":"c"},
                "Kerala": {}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn branches_across_regions() {
        let db = db();
        let hits: Vec<_> = db
            .find_branches("NAG")
            .into_iter()
            .map(|(b, r)| (r.name(), b.name()))
            .collect();
        assert_eq!(hits, [("Rajasthan", "Nagaur"), ("Maharashtra", "Nagpur")]);
    }

    #[test]
    fn empty_query_finds_nothing() {
        let db = db();
        assert!(db.find_branches("  ").is_empty());
        assert!(db.find_regions("").is_empty());
    }

    #[test]
    fn regions_by_substring() {
        let db = db();
        let names: Vec<_> = db.find_regions("ra").iter().map(|r| r.name()).collect();
        assert_eq!(names, ["Rajasthan", "Maharashtra", "Kerala"]);
    }
}
