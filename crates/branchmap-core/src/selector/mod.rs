// crates/branchmap-core/src/selector/mod.rs

//! The region/branch selector state machine.
//!
//! A [`Selector`] owns one dataset, one [`SelectionState`] and the geometry
//! lifecycle. Every user trigger is a method returning an [`Outcome`]; host
//! callbacks fire only for transitions that actually happened.

pub mod fetch;
pub mod filter;
pub mod host;
pub mod state;

pub use fetch::{FetchGuard, FetchTicket};
pub use filter::{filter_branches, FilterOutcome};
pub use host::{CallbackHost, HostEvent, NoopHost, RecordingHost, SelectorHost};
pub use state::{Notice, Selection, SelectionState, View};

use crate::config::{NonOperationalPolicy, SelectorConfig};
use crate::error::{Result, SelectorError};
use crate::geometry::{GeometryRequest, MapLayer, REGION_NAME_KEYS};
use crate::loader::GeometrySource;
use crate::model::{Branch, Dataset, Region};
use crate::render::{self, RenderInput, ViewTree};
use crate::traits::NameMatch;
use std::fmt;
use tracing::{debug, info, warn};

/// Lifecycle of the overview geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GeometryState {
    /// No fetch started (or the selector was destroyed).
    #[default]
    Idle,
    Loading,
    Ready(MapLayer),
    /// Load failed; the message is shown next to the retry control.
    Failed(String),
}

/// Result of a user trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Changed,
    Unchanged,
    Declined(Decline),
}

impl Outcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, Outcome::Changed)
    }
}

/// Why a trigger was refused. Never forwarded to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decline {
    NoBranches { region: String },
    UnknownRegion { region: String },
    UnknownBranch { region: String, branch: String },
    /// The trigger does not apply to the current view.
    WrongView,
    Destroyed,
}

impl fmt::Display for Decline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decline::NoBranches { region } => write!(f, "{region} has no branches available"),
            Decline::UnknownRegion { region } => write!(f, "unknown region '{region}'"),
            Decline::UnknownBranch { region, branch } => {
                write!(f, "'{branch}' is not a branch of {region}")
            }
            Decline::WrongView => f.write_str("not available in the current view"),
            Decline::Destroyed => f.write_str("selector has been destroyed"),
        }
    }
}

impl From<Decline> for SelectorError {
    fn from(d: Decline) -> Self {
        SelectorError::InvalidSelection(d.to_string())
    }
}

/// Result of settling a geometry fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Failed(String),
    /// Stale or post-destroy response; nothing was touched.
    Discarded,
    /// No fetch was started (one is pending, geometry is ready, or the
    /// selector is destroyed).
    Skipped,
}

/// One selector instance. Frontends keep it behind whatever handle they use
/// for listeners; there is no global instance.
pub struct Selector<H: SelectorHost = NoopHost> {
    dataset: Dataset,
    config: SelectorConfig,
    host: H,
    state: SelectionState,
    geometry: GeometryState,
    fetch: FetchGuard,
}

impl<H: SelectorHost> fmt::Debug for Selector<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("country", &self.dataset.country)
            .field("state", &self.state)
            .field("geometry", &self.geometry)
            .finish_non_exhaustive()
    }
}

impl Selector<NoopHost> {
    /// Selector over the bundled dataset with default config and no callbacks.
    pub fn bundled() -> Result<Self> {
        Ok(Self::new(
            Dataset::bundled()?.clone(),
            SelectorConfig::default(),
            NoopHost,
        ))
    }
}

impl<H: SelectorHost> Selector<H> {
    pub fn new(dataset: Dataset, config: SelectorConfig, host: H) -> Self {
        Self {
            dataset,
            config,
            host,
            state: SelectionState::default(),
            geometry: GeometryState::Idle,
            fetch: FetchGuard::default(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn view(&self) -> View {
        self.state.view()
    }

    pub fn geometry(&self) -> &GeometryState {
        &self.geometry
    }

    pub fn layer(&self) -> Option<&MapLayer> {
        match &self.geometry {
            GeometryState::Ready(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.fetch.is_closed()
    }

    /// `{ region, branch }` as currently selected. Pure read.
    pub fn selection(&self) -> Selection {
        self.state.selection()
    }

    /// The region shown in `RegionDetail`, if any.
    pub fn current_region(&self) -> Option<&Region> {
        self.state
            .selected_region()
            .and_then(|name| self.dataset.region(name))
    }

    // ------------------------------------------------------------------
    // Geometry lifecycle
    // ------------------------------------------------------------------

    /// Request for the overview topology.
    pub fn geometry_request(&self) -> GeometryRequest {
        GeometryRequest::Country(self.config.country_key.clone())
    }

    /// Request for one region's district topology.
    pub fn region_geometry_request(&self, region: &str) -> Option<GeometryRequest> {
        self.dataset
            .region(region)
            .map(|r| GeometryRequest::Region(r.boundary_key().to_owned()))
    }

    /// Start the overview fetch. `None` while one is pending or after
    /// [`Selector::destroy`].
    pub fn begin_geometry_load(&mut self) -> Option<FetchTicket> {
        let ticket = self.fetch.begin()?;
        debug!(generation = ticket.generation(), "geometry fetch started");
        self.geometry = GeometryState::Loading;
        Some(ticket)
    }

    /// Settle the fetch identified by `ticket`. Stale tickets are dropped
    /// without touching state.
    pub fn finish_geometry_load(
        &mut self,
        ticket: FetchTicket,
        response: Result<Vec<u8>>,
    ) -> LoadOutcome {
        if !self.fetch.finish(ticket) {
            debug!(generation = ticket.generation(), "discarding stale geometry response");
            return LoadOutcome::Discarded;
        }

        let layer = response.and_then(|bytes| {
            MapLayer::from_topology_bytes(
                &bytes,
                Some(&self.config.topology_object),
                REGION_NAME_KEYS,
                self.config.width,
                self.config.height,
            )
        });

        match layer {
            Ok(layer) => {
                info!(shapes = layer.shapes.len(), "geometry ready");
                self.geometry = GeometryState::Ready(layer);
                LoadOutcome::Applied
            }
            Err(e) => {
                warn!(error = %e, "geometry load failed");
                let message = e.to_string();
                self.geometry = GeometryState::Failed(message.clone());
                LoadOutcome::Failed(message)
            }
        }
    }

    /// Fetch and apply the overview geometry synchronously.
    pub fn load_geometry(&mut self, source: &dyn GeometrySource) -> LoadOutcome {
        let Some(ticket) = self.begin_geometry_load() else {
            return LoadOutcome::Skipped;
        };
        let request = self.geometry_request();
        let response = source.fetch(&request);
        self.finish_geometry_load(ticket, response)
    }

    /// Put the selector into `Overview` and load the map.
    ///
    /// A load failure is returned to the caller, but the selector stays
    /// usable and renders the retry affordance.
    pub fn initialize(&mut self, source: &dyn GeometrySource) -> Result<()> {
        if self.is_destroyed() {
            return Err(Decline::Destroyed.into());
        }
        self.state.reset();
        match self.load_geometry(source) {
            LoadOutcome::Failed(message) => Err(SelectorError::DatasetLoad(message)),
            _ => Ok(()),
        }
    }

    /// `true` when a retry would start a new fetch.
    pub fn can_retry(&self) -> bool {
        !self.is_destroyed()
            && !self.fetch.is_pending()
            && matches!(self.geometry, GeometryState::Failed(_) | GeometryState::Idle)
    }

    /// Re-run the overview fetch after a failure. No-op otherwise.
    pub fn retry(&mut self, source: &dyn GeometrySource) -> LoadOutcome {
        if !self.can_retry() {
            return LoadOutcome::Skipped;
        }
        info!("retrying geometry load");
        self.load_geometry(source)
    }

    /// Tear down: late responses are dropped and no further fetch starts.
    /// No host callback fires.
    pub fn destroy(&mut self) {
        self.fetch.close();
        self.state.reset();
        self.geometry = GeometryState::Idle;
        info!("selector destroyed");
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// User picked a region on the map.
    pub fn select_region(&mut self, name: &str) -> Outcome {
        if self.is_destroyed() {
            return Outcome::Declined(Decline::Destroyed);
        }
        let Some(region) = self.dataset.region(name) else {
            debug!(region = name, "declined unknown region");
            return Outcome::Declined(Decline::UnknownRegion {
                region: name.to_owned(),
            });
        };
        let canonical = region.name().to_owned();

        if !region.is_operational() {
            debug!(region = %canonical, "declined region without branches");
            if self.config.non_operational == NonOperationalPolicy::Notice {
                self.state.set_notice(Some(Notice::NoBranches {
                    region: canonical.clone(),
                }));
            }
            return Outcome::Declined(Decline::NoBranches { region: canonical });
        }

        if self.state.view() == View::RegionDetail {
            self.reset_to_overview();
        }

        self.state.enter_region(&canonical);
        info!(region = %canonical, "region selected");
        self.host.on_region_select(&canonical);
        Outcome::Changed
    }

    /// User picked a branch card in the current region.
    pub fn select_branch(&mut self, region: &str, name: &str) -> Outcome {
        if self.is_destroyed() {
            return Outcome::Declined(Decline::Destroyed);
        }
        if self.state.view() != View::RegionDetail {
            return Outcome::Declined(Decline::WrongView);
        }

        let found = self
            .current_region()
            .filter(|current| current.name() == region || current.is_named(region))
            .and_then(|current| find_branch(self.dataset.branches_for_region(current), name))
            .map(|b| {
                (
                    self.dataset.region_of(b).name().to_owned(),
                    b.name().to_owned(),
                    b.address().to_owned(),
                )
            });

        let Some((region, branch, address)) = found else {
            debug!(region, branch = name, "declined branch outside current region");
            return Outcome::Declined(Decline::UnknownBranch {
                region: region.to_owned(),
                branch: name.to_owned(),
            });
        };

        self.state.mark_branch(&branch);
        info!(region = %region, branch = %branch, "branch selected");
        self.host.on_branch_select(&region, &branch, &address);
        Outcome::Changed
    }

    /// User typed into the branch search box. Ignored outside `RegionDetail`.
    pub fn filter_branches(&mut self, text: &str) -> Outcome {
        if self.is_destroyed() {
            return Outcome::Declined(Decline::Destroyed);
        }
        if self.state.view() != View::RegionDetail || self.state.filter() == text {
            return Outcome::Unchanged;
        }
        self.state.set_filter(text);
        Outcome::Changed
    }

    /// Back button in `RegionDetail`.
    pub fn back(&mut self) -> Outcome {
        if self.state.view() == View::Overview {
            return Outcome::Unchanged;
        }
        self.reset_to_overview()
    }

    /// Force `Overview` from any state. The host hears `on_view_reset` only
    /// when a region was open.
    pub fn reset_to_overview(&mut self) -> Outcome {
        let was_detail = self.state.view() == View::RegionDetail;
        if !self.state.reset() {
            return Outcome::Unchanged;
        }
        if was_detail {
            debug!("back to overview");
            self.host.on_view_reset();
        }
        Outcome::Changed
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    /// Filtered branch list of the open region.
    pub fn visible_branches(&self) -> Option<FilterOutcome<'_>> {
        let region = self.current_region()?;
        Some(filter_branches(
            self.dataset.branches_for_region(region),
            self.state.filter(),
        ))
    }

    /// Hover text for a region on the map.
    pub fn tooltip(&self, region: &str) -> Option<String> {
        self.dataset.region(region).map(render::tooltip_text)
    }

    pub fn render(&self) -> ViewTree {
        render::render(&RenderInput {
            state: &self.state,
            dataset: &self.dataset,
            geometry: &self.geometry,
            config: &self.config,
        })
    }
}

/// Exact name first, then the folded match.
fn find_branch<'a>(branches: &'a [Branch], name: &str) -> Option<&'a Branch> {
    branches
        .iter()
        .find(|b| b.name() == name)
        .or_else(|| branches.iter().find(|b| b.is_named(name)))
}
