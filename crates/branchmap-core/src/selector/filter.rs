// crates/branchmap-core/src/selector/filter.rs
use crate::model::Branch;
use crate::text::fold_key;

/// Result of filtering one region's branch list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome<'a> {
    pub visible: Vec<&'a Branch>,
    pub total: usize,
    /// `false` when the trimmed filter text is empty.
    pub filtering: bool,
}

impl FilterOutcome<'_> {
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn visible_names(&self) -> Vec<&str> {
        self.visible.iter().map(|b| b.name()).collect()
    }

    /// The count line shown above the branch grid.
    pub fn summary(&self) -> String {
        if self.visible.is_empty() {
            "No branches found".to_owned()
        } else if self.filtering {
            format!("Showing {} of {} branches", self.visible.len(), self.total)
        } else {
            format!("Showing all {} branches", self.total)
        }
    }
}

/// Case- and accent-insensitive substring filter over branch names.
/// Surrounding whitespace in `text` is ignored; empty text keeps everything.
pub fn filter_branches<'a>(branches: &'a [Branch], text: &str) -> FilterOutcome<'a> {
    let query = fold_key(text);
    let visible = if query.is_empty() {
        branches.iter().collect()
    } else {
        branches
            .iter()
            .filter(|b| fold_key(&b.name).contains(&query))
            .collect()
    };
    FilterOutcome {
        visible,
        total: branches.len(),
        filtering: !query.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branches(names: &[&str]) -> Vec<Branch> {
        names
            .iter()
            .map(|n| Branch {
                region_id: 0,
                name: (*n).to_owned(),
                address: format!("{n} office"),
            })
            .collect()
    }

    #[test]
    fn substring_is_case_insensitive() {
        let list = branches(&["Ajmer", "Beawar", "Sojat"]);
        let out = filter_branches(&list, "AW");
        assert_eq!(out.visible_names(), ["Beawar"]);
        assert_eq!(out.summary(), "Showing 1 of 3 branches");
    }

    #[test]
    fn whitespace_only_means_no_filter() {
        let list = branches(&["Ajmer", "Beawar", "Sojat"]);
        let out = filter_branches(&list, "   ");
        assert!(!out.filtering);
        assert_eq!(out.visible.len(), 3);
        assert_eq!(out.summary(), "Showing all 3 branches");
    }

    #[test]
    fn trims_before_matching() {
        let list = branches(&["Neem Ka Thana", "Nokha"]);
        assert_eq!(filter_branches(&list, "  ka th ").visible_names(), ["Neem Ka Thana"]);
    }

    #[test]
    fn no_match_reports_empty() {
        let list = branches(&["Ajmer"]);
        let out = filter_branches(&list, "xyz");
        assert!(out.is_empty());
        assert_eq!(out.summary(), "No branches found");
    }
}
