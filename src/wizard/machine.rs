use thiserror::Error;

use crate::domain::{GeoPoint, IncompletePolygon, Polygon, VERTEX_COUNT};
use crate::geometry::contains;

/// Recoverable wizard-level failures.
///
/// Every variant leaves the session in the valid state it held before the
/// offending event.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WizardError {
    /// The geocoder answered with zero candidates; retry is the recovery.
    #[error("address not found")]
    AddressNotFound,
    /// Finalize or verify attempted without a complete vertex selection.
    #[error("delivery range needs {VERTEX_COUNT} vertices, {collected} selected")]
    IncompleteSelection { collected: usize },
    /// A vertex or finalize action arrived before the store was placed.
    #[error("the store must be placed on the map first")]
    StoreNotPlaced,
}

/// The two geocoding roles a session can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodeRole {
    Store,
    Verify,
}

impl GeocodeRole {
    fn index(self) -> usize {
        match self {
            GeocodeRole::Store => 0,
            GeocodeRole::Verify => 1,
        }
    }
}

/// Handle for one outstanding geocode request.
///
/// Tickets are generation-stamped per role: beginning a new request for a
/// role supersedes any older ticket for it, and resolving a superseded
/// ticket is dropped without touching session state. This keeps at most
/// one live request per role and rules out interleaved results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeocodeTicket {
    role: GeocodeRole,
    generation: u64,
}

/// Outcome of one verification: the geocoded address and whether it fell
/// inside the delivery range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeCheck {
    pub address: GeoPoint,
    pub inside: bool,
}

/// What the session did with a finished geocode request.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeResolution {
    /// The store is placed; vertex collection may begin.
    StorePlaced(GeoPoint),
    /// Verification ran against the polygon.
    Checked(RangeCheck),
    /// The ticket was superseded by a newer request for the same role, or
    /// the session moved past the phase that wanted it. The result is
    /// dropped and state is unchanged.
    Dropped,
}

/// Result of feeding one vertex-pick event to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexPick {
    /// Accepted as vertex `slot` (1-based, matching the v1..v4 link
    /// parameters).
    Added { slot: usize },
    /// Selection is already complete; the pick is dropped silently.
    Ignored,
}

/// Wizard phase. `VerifyOnly` is never reached by transitions; it is the
/// entry phase of a session resumed from a share link and behaves like
/// `Ready` for verification.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    AwaitingStore,
    CollectingVertices {
        store: GeoPoint,
        vertices: Vec<GeoPoint>,
    },
    Ready {
        store: GeoPoint,
        polygon: Polygon,
    },
    VerifyOnly {
        store: GeoPoint,
        polygon: Polygon,
    },
}

/// One delivery-zone wizard session.
///
/// Owns all per-session state and is driven by discrete events: geocode
/// results, vertex picks, finalize and reset actions. Each event runs to
/// completion; there is no shared or global state.
#[derive(Debug)]
pub struct WizardSession {
    phase: Phase,
    /// Ephemeral marker for the most recent verification, cleared by
    /// `reset_verification`; never affects `store` or the polygon.
    last_check: Option<RangeCheck>,
    /// Generation of the live ticket per role, if one is outstanding.
    pending: [Option<u64>; 2],
    next_generation: u64,
}

impl WizardSession {
    /// Fresh session at the start of the wizard flow.
    pub fn new() -> Self {
        Self {
            phase: Phase::AwaitingStore,
            last_check: None,
            pending: [None, None],
            next_generation: 0,
        }
    }

    /// Session resumed from a decoded share link, entering `VerifyOnly`
    /// directly and skipping the store and vertex steps.
    pub fn resume(store: GeoPoint, polygon: Polygon) -> Self {
        Self {
            phase: Phase::VerifyOnly { store, polygon },
            last_check: None,
            pending: [None, None],
            next_generation: 0,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn last_check(&self) -> Option<&RangeCheck> {
        self.last_check.as_ref()
    }

    /// Store location, once placed.
    pub fn store(&self) -> Option<GeoPoint> {
        match &self.phase {
            Phase::AwaitingStore => None,
            Phase::CollectingVertices { store, .. }
            | Phase::Ready { store, .. }
            | Phase::VerifyOnly { store, .. } => Some(*store),
        }
    }

    /// The finalized polygon, once the session is verifiable.
    pub fn polygon(&self) -> Option<&Polygon> {
        match &self.phase {
            Phase::Ready { polygon, .. } | Phase::VerifyOnly { polygon, .. } => Some(polygon),
            _ => None,
        }
    }

    /// Register an outgoing geocode request for `role`.
    ///
    /// Any previously issued ticket for the same role is superseded from
    /// this moment: its eventual result will be dropped, never applied.
    pub fn begin_geocode(&mut self, role: GeocodeRole) -> GeocodeTicket {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.pending[role.index()] = Some(generation);
        GeocodeTicket { role, generation }
    }

    /// Feed the result of a geocode request back into the session.
    ///
    /// `candidate` is `None` when the service returned zero candidates,
    /// which surfaces as [`WizardError::AddressNotFound`] with no state
    /// change. Stale tickets resolve to [`GeocodeResolution::Dropped`].
    pub fn resolve_geocode(
        &mut self,
        ticket: GeocodeTicket,
        candidate: Option<GeoPoint>,
    ) -> Result<GeocodeResolution, WizardError> {
        if self.pending[ticket.role.index()] != Some(ticket.generation) {
            return Ok(GeocodeResolution::Dropped);
        }
        self.pending[ticket.role.index()] = None;

        let Some(point) = candidate else {
            return Err(WizardError::AddressNotFound);
        };

        match ticket.role {
            GeocodeRole::Store => self.place_store(point),
            GeocodeRole::Verify => self.check_address(point).map(GeocodeResolution::Checked),
        }
    }

    /// One user map click while collecting vertices.
    ///
    /// Picks beyond the fourth are ignored rather than overflowing the
    /// selection, and picks after finalization are ignored the same way
    /// (the pick source stays attached; its events just stop mattering).
    pub fn pick_vertex(&mut self, point: GeoPoint) -> Result<VertexPick, WizardError> {
        match &mut self.phase {
            Phase::AwaitingStore => Err(WizardError::StoreNotPlaced),
            Phase::CollectingVertices { vertices, .. } => {
                if vertices.len() >= VERTEX_COUNT {
                    return Ok(VertexPick::Ignored);
                }
                vertices.push(point);
                Ok(VertexPick::Added {
                    slot: vertices.len(),
                })
            }
            Phase::Ready { .. } | Phase::VerifyOnly { .. } => Ok(VertexPick::Ignored),
        }
    }

    /// Explicit "finalize" action closing the vertex selection.
    ///
    /// Requires all four vertices; otherwise the selection is left intact
    /// behind [`WizardError::IncompleteSelection`]. Finalizing an already
    /// verifiable session is a no-op.
    pub fn finalize(&mut self) -> Result<(), WizardError> {
        match &self.phase {
            Phase::AwaitingStore => Err(WizardError::StoreNotPlaced),
            Phase::CollectingVertices { store, vertices } => {
                let polygon = Polygon::new(vertices.clone()).map_err(
                    |IncompletePolygon(collected)| WizardError::IncompleteSelection { collected },
                )?;
                self.phase = Phase::Ready {
                    store: *store,
                    polygon,
                };
                Ok(())
            }
            Phase::Ready { .. } | Phase::VerifyOnly { .. } => Ok(()),
        }
    }

    /// Discard the marker left by the last verification.
    ///
    /// The session stays verifiable with the same store and polygon; this
    /// is a sub-transition within the verifiable phase, not a phase change.
    pub fn reset_verification(&mut self) {
        self.last_check = None;
    }

    fn place_store(&mut self, point: GeoPoint) -> Result<GeocodeResolution, WizardError> {
        match self.phase {
            Phase::AwaitingStore => {
                self.phase = Phase::CollectingVertices {
                    store: point,
                    vertices: Vec::with_capacity(VERTEX_COUNT),
                };
                Ok(GeocodeResolution::StorePlaced(point))
            }
            // Store already placed; a late duplicate result changes nothing.
            _ => Ok(GeocodeResolution::Dropped),
        }
    }

    fn check_address(&mut self, address: GeoPoint) -> Result<RangeCheck, WizardError> {
        let polygon = match &self.phase {
            Phase::Ready { polygon, .. } | Phase::VerifyOnly { polygon, .. } => polygon,
            Phase::AwaitingStore => {
                return Err(WizardError::IncompleteSelection { collected: 0 });
            }
            Phase::CollectingVertices { vertices, .. } => {
                return Err(WizardError::IncompleteSelection {
                    collected: vertices.len(),
                });
            }
        };

        let check = RangeCheck {
            address,
            inside: contains(address, polygon),
        };
        self.last_check = Some(check);
        Ok(check)
    }
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    fn square_picks() -> Vec<GeoPoint> {
        vec![
            point(0.0, 0.0),
            point(0.0, 1.0),
            point(1.0, 1.0),
            point(1.0, 0.0),
        ]
    }

    fn ready_session() -> WizardSession {
        let mut session = WizardSession::new();
        let ticket = session.begin_geocode(GeocodeRole::Store);
        session
            .resolve_geocode(ticket, Some(point(0.5, 0.5)))
            .unwrap();
        for pick in square_picks() {
            session.pick_vertex(pick).unwrap();
        }
        session.finalize().unwrap();
        session
    }

    #[test]
    fn test_store_geocode_starts_vertex_collection() {
        let mut session = WizardSession::new();
        let ticket = session.begin_geocode(GeocodeRole::Store);
        let resolution = session
            .resolve_geocode(ticket, Some(point(-34.6, -58.4)))
            .unwrap();

        assert_eq!(
            resolution,
            GeocodeResolution::StorePlaced(point(-34.6, -58.4))
        );
        assert!(matches!(
            session.phase(),
            Phase::CollectingVertices { vertices, .. } if vertices.is_empty()
        ));
    }

    #[test]
    fn test_store_not_found_leaves_state_unchanged() {
        let mut session = WizardSession::new();
        let ticket = session.begin_geocode(GeocodeRole::Store);
        let err = session.resolve_geocode(ticket, None).unwrap_err();

        assert_eq!(err, WizardError::AddressNotFound);
        assert_eq!(*session.phase(), Phase::AwaitingStore);

        // Retry succeeds from the same state
        let retry = session.begin_geocode(GeocodeRole::Store);
        session.resolve_geocode(retry, Some(point(1.0, 1.0))).unwrap();
        assert!(matches!(session.phase(), Phase::CollectingVertices { .. }));
    }

    #[test]
    fn test_vertex_pick_before_store_is_rejected() {
        let mut session = WizardSession::new();
        let err = session.pick_vertex(point(0.0, 0.0)).unwrap_err();

        assert_eq!(err, WizardError::StoreNotPlaced);
        assert_eq!(*session.phase(), Phase::AwaitingStore);
    }

    #[test]
    fn test_fifth_pick_is_ignored() {
        let mut session = WizardSession::new();
        let ticket = session.begin_geocode(GeocodeRole::Store);
        session
            .resolve_geocode(ticket, Some(point(0.5, 0.5)))
            .unwrap();
        for pick in square_picks() {
            assert!(matches!(
                session.pick_vertex(pick),
                Ok(VertexPick::Added { .. })
            ));
        }

        let extra = session.pick_vertex(point(9.0, 9.0)).unwrap();
        assert_eq!(extra, VertexPick::Ignored);

        match session.phase() {
            Phase::CollectingVertices { vertices, .. } => {
                assert_eq!(vertices.as_slice(), square_picks().as_slice());
            }
            other => panic!("unexpected phase: {:?}", other),
        }
    }

    #[test]
    fn test_finalize_with_three_vertices_keeps_selection() {
        let mut session = WizardSession::new();
        let ticket = session.begin_geocode(GeocodeRole::Store);
        session
            .resolve_geocode(ticket, Some(point(0.5, 0.5)))
            .unwrap();
        for pick in square_picks().into_iter().take(3) {
            session.pick_vertex(pick).unwrap();
        }

        let err = session.finalize().unwrap_err();
        assert_eq!(err, WizardError::IncompleteSelection { collected: 3 });

        match session.phase() {
            Phase::CollectingVertices { vertices, .. } => assert_eq!(vertices.len(), 3),
            other => panic!("unexpected phase: {:?}", other),
        }
    }

    #[test]
    fn test_finalize_before_store_is_rejected() {
        let mut session = WizardSession::new();
        assert_eq!(session.finalize().unwrap_err(), WizardError::StoreNotPlaced);
    }

    #[test]
    fn test_verification_is_repeatable_and_does_not_mutate() {
        let mut session = ready_session();
        let polygon_before = session.polygon().cloned();
        let store_before = session.store();

        let first = {
            let ticket = session.begin_geocode(GeocodeRole::Verify);
            session
                .resolve_geocode(ticket, Some(point(0.5, 0.5)))
                .unwrap()
        };
        let second = {
            let ticket = session.begin_geocode(GeocodeRole::Verify);
            session
                .resolve_geocode(ticket, Some(point(0.5, 0.5)))
                .unwrap()
        };

        assert_eq!(first, second);
        assert!(matches!(
            first,
            GeocodeResolution::Checked(RangeCheck { inside: true, .. })
        ));
        assert_eq!(session.polygon().cloned(), polygon_before);
        assert_eq!(session.store(), store_before);
    }

    #[test]
    fn test_verify_outside_reports_false() {
        let mut session = ready_session();
        let ticket = session.begin_geocode(GeocodeRole::Verify);
        let resolution = session
            .resolve_geocode(ticket, Some(point(2.0, 2.0)))
            .unwrap();

        assert!(matches!(
            resolution,
            GeocodeResolution::Checked(RangeCheck { inside: false, .. })
        ));
    }

    #[test]
    fn test_verify_before_ready_is_incomplete_selection() {
        let mut session = WizardSession::new();
        let store = session.begin_geocode(GeocodeRole::Store);
        session
            .resolve_geocode(store, Some(point(0.5, 0.5)))
            .unwrap();
        session.pick_vertex(point(0.0, 0.0)).unwrap();

        let ticket = session.begin_geocode(GeocodeRole::Verify);
        let err = session
            .resolve_geocode(ticket, Some(point(0.5, 0.5)))
            .unwrap_err();
        assert_eq!(err, WizardError::IncompleteSelection { collected: 1 });
    }

    #[test]
    fn test_superseded_ticket_is_dropped() {
        let mut session = WizardSession::new();
        let stale = session.begin_geocode(GeocodeRole::Store);
        let fresh = session.begin_geocode(GeocodeRole::Store);

        // The stale result arrives first and must not place the store
        let resolution = session
            .resolve_geocode(stale, Some(point(1.0, 1.0)))
            .unwrap();
        assert_eq!(resolution, GeocodeResolution::Dropped);
        assert_eq!(*session.phase(), Phase::AwaitingStore);

        let resolution = session
            .resolve_geocode(fresh, Some(point(2.0, 2.0)))
            .unwrap();
        assert_eq!(resolution, GeocodeResolution::StorePlaced(point(2.0, 2.0)));
    }

    #[test]
    fn test_roles_supersede_independently() {
        let mut session = ready_session();
        let verify = session.begin_geocode(GeocodeRole::Verify);

        // A store-role request does not invalidate the verify ticket
        let _store = session.begin_geocode(GeocodeRole::Store);

        let resolution = session
            .resolve_geocode(verify, Some(point(0.5, 0.5)))
            .unwrap();
        assert!(matches!(resolution, GeocodeResolution::Checked(_)));
    }

    #[test]
    fn test_reset_clears_only_the_marker() {
        let mut session = ready_session();
        let ticket = session.begin_geocode(GeocodeRole::Verify);
        session
            .resolve_geocode(ticket, Some(point(0.5, 0.5)))
            .unwrap();
        assert!(session.last_check().is_some());

        let polygon_before = session.polygon().cloned();
        session.reset_verification();

        assert!(session.last_check().is_none());
        assert_eq!(session.polygon().cloned(), polygon_before);
        assert!(matches!(session.phase(), Phase::Ready { .. }));
    }

    #[test]
    fn test_resumed_session_verifies_without_collection() {
        let polygon = Polygon::new(square_picks()).unwrap();
        let mut session = WizardSession::resume(point(0.5, 0.5), polygon);
        assert!(matches!(session.phase(), Phase::VerifyOnly { .. }));

        let ticket = session.begin_geocode(GeocodeRole::Verify);
        let resolution = session
            .resolve_geocode(ticket, Some(point(0.5, 0.5)))
            .unwrap();
        assert!(matches!(
            resolution,
            GeocodeResolution::Checked(RangeCheck { inside: true, .. })
        ));
    }

    #[test]
    fn test_picks_after_finalize_are_ignored() {
        let mut session = ready_session();
        let pick = session.pick_vertex(point(5.0, 5.0)).unwrap();
        assert_eq!(pick, VertexPick::Ignored);
        assert!(matches!(session.phase(), Phase::Ready { .. }));
    }
}
