//! Cache lifetimes per result kind.

use std::time::Duration;

use crate::query::EndpointKind;

/// How long each kind of result stays cached.
///
/// Lifetimes follow how volatile a result is: a distance matrix is costly and
/// changes only with the road network, a snapped point is cheap to recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub route: Duration,
    pub table: Duration,
    pub trip: Duration,
    pub matching: Duration,
    pub nearest: Duration,
    pub reachability: Duration,
}

impl TtlPolicy {
    pub fn for_kind(&self, kind: EndpointKind) -> Duration {
        match kind {
            EndpointKind::Route => self.route,
            EndpointKind::Table => self.table,
            EndpointKind::Trip => self.trip,
            EndpointKind::Match => self.matching,
            EndpointKind::Nearest => self.nearest,
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            route: Duration::from_secs(300),
            table: Duration::from_secs(600),
            trip: Duration::from_secs(300),
            matching: Duration::from_secs(300),
            nearest: Duration::from_secs(300),
            reachability: Duration::from_secs(900),
        }
    }
}
