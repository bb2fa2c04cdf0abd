// crates/branchmap-core/src/traits.rs
use crate::model::{Branch, DatasetStats, Region};
use crate::text::fold_key;

/// Name-based matching helpers for types that expose a canonical display name.
///
/// Comparisons go through [`fold_key`], so they ignore case, accents and
/// surrounding whitespace.
///
/// # Examples
/// ```rust
/// use branchmap_core::traits::NameMatch;
///
/// struct Office(&'static str);
/// impl NameMatch for Office {
///     fn name_str(&self) -> &str { self.0 }
/// }
///
/// assert!(Office("Belagavi").is_named("BELAGAVI"));
/// assert!(Office("Hubballi-Dharwad").is_named(" hubballi-dharwad "));
/// ```
pub trait NameMatch {
    /// Returns the canonical display name used for matching.
    fn name_str(&self) -> &str;

    /// Folded equality.
    #[inline]
    fn is_named(&self, q: &str) -> bool {
        fold_key(self.name_str()) == fold_key(q)
    }
}

impl NameMatch for Region {
    fn name_str(&self) -> &str {
        &self.name
    }
}

impl NameMatch for Branch {
    fn name_str(&self) -> &str {
        &self.name
    }
}

/// A branch together with its parent region.
pub type BranchContext<'a> = (&'a Branch, &'a Region);

/// Read-only queries across the whole dataset. Implemented in `search.rs`.
pub trait BranchSearch {
    fn stats(&self) -> DatasetStats;

    /// Regions whose name contains `query` (folded). Empty query ⇒ none.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use branchmap_core::{BranchSearch, Dataset};
    ///
    /// let db = Dataset::load().unwrap();
    /// for region in db.find_regions("pradesh") {
    ///     println!("{} ({} branches)", region.name(), region.branch_count());
    /// }
    /// ```
    fn find_regions(&self, query: &str) -> Vec<&Region>;

    /// Branches in any region whose name contains `query` (folded), with
    /// their parent region. Empty query ⇒ none.
    fn find_branches(&self, query: &str) -> Vec<BranchContext<'_>>;
}
