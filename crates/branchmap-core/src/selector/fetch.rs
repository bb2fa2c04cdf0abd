// crates/branchmap-core/src/selector/fetch.rs

/// Identifies one geometry fetch. Handed out by [`FetchGuard::begin`] and
/// handed back with the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Single-flight guard for the geometry fetch.
///
/// At most one ticket is outstanding. A response is applied only if its
/// ticket is the outstanding one and the guard has not been closed; anything
/// else is stale and must be dropped without touching state.
#[derive(Debug, Default)]
pub struct FetchGuard {
    generation: u64,
    pending: Option<u64>,
    closed: bool,
}

impl FetchGuard {
    /// Start a fetch. `None` while another one is pending or after close.
    pub fn begin(&mut self) -> Option<FetchTicket> {
        if self.closed || self.pending.is_some() {
            return None;
        }
        self.generation = self.generation.wrapping_add(1);
        self.pending = Some(self.generation);
        Some(FetchTicket {
            generation: self.generation,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        !self.closed && self.pending == Some(ticket.generation)
    }

    /// Settle `ticket`. Returns `true` when the response should be applied.
    pub fn finish(&mut self, ticket: FetchTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.pending = None;
        true
    }

    /// Invalidate the outstanding ticket and refuse new ones.
    pub fn close(&mut self) {
        self.closed = true;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_fetch_in_flight() {
        let mut g = FetchGuard::default();
        let t = g.begin().unwrap();
        assert!(g.begin().is_none());
        assert!(g.finish(t));
        assert!(g.begin().is_some());
    }

    #[test]
    fn settled_ticket_cannot_apply_twice() {
        let mut g = FetchGuard::default();
        let t = g.begin().unwrap();
        assert!(g.finish(t));
        assert!(!g.finish(t));
    }

    #[test]
    fn closing_discards_late_responses() {
        let mut g = FetchGuard::default();
        let t = g.begin().unwrap();
        g.close();
        assert!(!g.finish(t));
        assert!(g.begin().is_none());
    }

    #[test]
    fn old_generation_is_stale() {
        let mut g = FetchGuard::default();
        let first = g.begin().unwrap();
        assert!(g.finish(first));
        let second = g.begin().unwrap();
        assert!(!g.is_current(first));
        assert!(g.is_current(second));
    }
}
