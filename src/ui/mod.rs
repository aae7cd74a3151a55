use std::collections::HashMap;
use std::time::Instant;

use thiserror::Error;

/// Closed set of render surfaces the wizard addresses.
///
/// Frontends bind each role to a concrete handle (a form, a panel, a
/// console label) through [`RoleMap`]; the wizard side only ever speaks in
/// roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiRole {
    StoreForm,
    VerticesForm,
    AddressForm,
    VerifyBanner,
    LinkPanel,
}

impl UiRole {
    pub const ALL: [UiRole; 5] = [
        UiRole::StoreForm,
        UiRole::VerticesForm,
        UiRole::AddressForm,
        UiRole::VerifyBanner,
        UiRole::LinkPanel,
    ];
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RoleMapError {
    #[error("no handle bound for UI role {0:?}")]
    Missing(UiRole),
    #[error("UI role {0:?} bound twice")]
    Duplicate(UiRole),
}

/// Typed mapping from every [`UiRole`] to a frontend handle.
///
/// Construction checks the full role set, so a missing binding fails fast
/// instead of surfacing later as a silent no-op lookup.
#[derive(Debug)]
pub struct RoleMap<H> {
    handles: HashMap<UiRole, H>,
}

impl<H> RoleMap<H> {
    pub fn new(bindings: impl IntoIterator<Item = (UiRole, H)>) -> Result<Self, RoleMapError> {
        let mut handles = HashMap::new();
        for (role, handle) in bindings {
            if handles.insert(role, handle).is_some() {
                return Err(RoleMapError::Duplicate(role));
            }
        }
        for role in UiRole::ALL {
            if !handles.contains_key(&role) {
                return Err(RoleMapError::Missing(role));
            }
        }
        Ok(Self { handles })
    }

    /// Infallible: construction guarantees every role is bound.
    pub fn get(&self, role: UiRole) -> &H {
        &self.handles[&role]
    }
}

/// Scheduled dismissal of transient per-role messages.
///
/// Each role holds at most one "armed until" deadline. Re-arming replaces
/// the previous deadline and cancelling clears the entry; there is no
/// timer list to scan.
#[derive(Debug, Default)]
pub struct DismissSchedule {
    armed: HashMap<UiRole, Instant>,
}

impl DismissSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) dismissal of `role`'s message at `until`.
    pub fn arm(&mut self, role: UiRole, until: Instant) {
        self.armed.insert(role, until);
    }

    /// Cancel a pending dismissal. Returns whether one was armed.
    pub fn cancel(&mut self, role: UiRole) -> bool {
        self.armed.remove(&role).is_some()
    }

    pub fn armed_until(&self, role: UiRole) -> Option<Instant> {
        self.armed.get(&role).copied()
    }

    /// Pop every role whose deadline has passed as of `now`.
    pub fn drain_due(&mut self, now: Instant) -> Vec<UiRole> {
        let due: Vec<UiRole> = self
            .armed
            .iter()
            .filter(|(_, until)| **until <= now)
            .map(|(role, _)| *role)
            .collect();
        for role in &due {
            self.armed.remove(role);
        }
        due
    }
}
