//! Event semantics and the running event tally.

/// Semantic type of the event a bond type represents.
///
/// Only retained vertices of `Infection` or `Recovery` bonds are counted
/// by the pruners; `Neutral` covers pure bookkeeping bonds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A susceptible site catches the infection.
    Infection,
    /// An infected site recovers.
    Recovery,
    /// Not counted.
    #[default]
    Neutral,
}

/// Running totals of infection and recovery events seen by the pruners.
///
/// Passed by `&mut` into every pruner call. The totals only grow; call
/// [`reset`](EventCounters::reset) at an explicit checkpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventCounters {
    /// Retained infection vertices observed so far.
    pub infections: u64,
    /// Retained recovery vertices observed so far.
    pub recoveries: u64,
}

impl EventCounters {
    /// Zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one retained vertex of the given kind.
    #[inline]
    pub fn record(&mut self, kind: EventKind) {
        match kind {
            EventKind::Infection => self.infections += 1,
            EventKind::Recovery => self.recoveries += 1,
            EventKind::Neutral => {}
        }
    }

    /// Add another tally into this one.
    pub fn merge(&mut self, other: &EventCounters) {
        self.infections += other.infections;
        self.recoveries += other.recoveries;
    }

    /// Zero both totals.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
