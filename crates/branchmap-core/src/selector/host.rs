// crates/branchmap-core/src/selector/host.rs
use serde::Serialize;

/// Callbacks into the page (or whatever embeds the selector).
///
/// Only successful selections reach the host; declined selections and load
/// failures are handled inside the selector.
pub trait SelectorHost {
    fn on_region_select(&mut self, region: &str);
    fn on_branch_select(&mut self, region: &str, branch: &str, address: &str);
    fn on_view_reset(&mut self) {}
}

/// Host that ignores every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl SelectorHost for NoopHost {
    fn on_region_select(&mut self, _region: &str) {}
    fn on_branch_select(&mut self, _region: &str, _branch: &str, _address: &str) {}
}

type RegionFn = Box<dyn FnMut(&str)>;
type BranchFn = Box<dyn FnMut(&str, &str, &str)>;
type ResetFn = Box<dyn FnMut()>;

/// Host built from closures; unset callbacks are no-ops.
#[derive(Default)]
pub struct CallbackHost {
    region: Option<RegionFn>,
    branch: Option<BranchFn>,
    reset: Option<ResetFn>,
}

impl CallbackHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_region(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.region = Some(Box::new(f));
        self
    }

    pub fn on_branch(mut self, f: impl FnMut(&str, &str, &str) + 'static) -> Self {
        self.branch = Some(Box::new(f));
        self
    }

    pub fn on_reset(mut self, f: impl FnMut() + 'static) -> Self {
        self.reset = Some(Box::new(f));
        self
    }
}

impl SelectorHost for CallbackHost {
    fn on_region_select(&mut self, region: &str) {
        if let Some(f) = self.region.as_mut() {
            f(region);
        }
    }

    fn on_branch_select(&mut self, region: &str, branch: &str, address: &str) {
        if let Some(f) = self.branch.as_mut() {
            f(region, branch, address);
        }
    }

    fn on_view_reset(&mut self) {
        if let Some(f) = self.reset.as_mut() {
            f();
        }
    }
}

/// One callback invocation, as recorded by [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    RegionSelected {
        region: String,
    },
    BranchSelected {
        region: String,
        branch: String,
        address: String,
    },
    ViewReset,
}

/// Host that keeps every callback in order. Used by the CLI and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    pub events: Vec<HostEvent>,
}

impl RecordingHost {
    pub fn region_selections(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, HostEvent::RegionSelected { .. }))
            .count()
    }
}

impl SelectorHost for RecordingHost {
    fn on_region_select(&mut self, region: &str) {
        self.events.push(HostEvent::RegionSelected {
            region: region.to_owned(),
        });
    }

    fn on_branch_select(&mut self, region: &str, branch: &str, address: &str) {
        self.events.push(HostEvent::BranchSelected {
            region: region.to_owned(),
            branch: branch.to_owned(),
            address: address.to_owned(),
        });
    }

    fn on_view_reset(&mut self) {
        self.events.push(HostEvent::ViewReset);
    }
}
