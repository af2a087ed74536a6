//! Slot reports and debug dumps.
//!
//! The dump methods log one line per slot at `debug` level. They are no-ops
//! in release builds.

use std::fmt;

use tracing::debug;

use crate::component::{ComponentHeader, ComponentId};
use crate::entity::Entity;
use crate::registry::ComponentRegistry;

/// What a storage slot currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Empty,
    Live { header: ComponentHeader, refs: usize },
    /// Deleted while still referenced; the id is not yet reusable.
    Retired { header: ComponentHeader, refs: usize },
}

/// Snapshot of one storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotReport {
    pub id: ComponentId,
    pub state: SlotState,
}

impl fmt::Display for SlotReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (header, refs, retired) = match self.state {
            SlotState::Empty => return write!(f, "{} empty", self.id.id()),
            SlotState::Live { header, refs } => (header, refs, false),
            SlotState::Retired { header, refs } => (header, refs, true),
        };
        write!(
            f,
            " UID({})  EID({})  FID({})  RefCount({})",
            header.unique_id.id(),
            header.entity.id(),
            header.family.id(),
            refs
        )?;
        if retired {
            write!(f, "  retired")?;
        }
        Ok(())
    }
}

impl ComponentRegistry {
    /// Log every storage slot.
    pub fn dump(&self) {
        if cfg!(debug_assertions) {
            debug!(
                slots = self.slot_count(),
                recycled = self.recycled_count(),
                retired = self.retired_count(),
                "component registry"
            );
            for report in self.slot_reports() {
                debug!("{report}");
            }
        }
    }

    /// Log the components owned by `entity`.
    pub fn dump_entity(&self, entity: Entity) {
        if cfg!(debug_assertions) {
            debug!(%entity, "components");
            for &id in self.component_ids_by_entity(entity) {
                if let Some(report) = self.slot_report(id) {
                    debug!("{report}");
                }
            }
        }
    }

    /// Log a single slot.
    pub fn dump_component(&self, id: ComponentId) {
        if cfg!(debug_assertions) {
            match self.slot_report(id) {
                Some(report) => debug!("{report}"),
                None => debug!(%id, "out of range"),
            }
        }
    }
}
