//! Search result group bookkeeping

use super::{Sidebar, lock_unpoisoned};
use crate::render::SearchGroupId;
use std::sync::atomic::Ordering;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct GroupState {
    pub active: bool,
    pub len: usize,
}

/// Activation state and entry counts for the four fixed groups. The widgets
/// themselves live in the renderer; this is the controller's view of them.
#[derive(Debug, Default)]
pub(crate) struct GroupTable {
    slots: [GroupState; 4],
}

impl GroupTable {
    fn index(group: SearchGroupId) -> usize {
        match group {
            SearchGroupId::Contacts => 0,
            SearchGroupId::GlobalContacts => 1,
            SearchGroupId::GlobalMessages => 2,
            SearchGroupId::PrivateMessages => 3,
        }
    }

    pub fn get(&self, group: SearchGroupId) -> GroupState {
        self.slots[Self::index(group)]
    }

    pub fn slot_mut(&mut self, group: SearchGroupId) -> &mut GroupState {
        &mut self.slots[Self::index(group)]
    }

    pub fn reset(&mut self) {
        self.slots = [GroupState::default(); 4];
    }
}

impl Sidebar {
    /// Empty and hide every search group. The session lock is held across
    /// the renderer clears, so a merge from a superseded response cannot
    /// slip a write in between the reset and the clears.
    pub(crate) fn clear_groups(&self) {
        let mut state = lock_unpoisoned(&self.search);
        state.groups.reset();
        for group in SearchGroupId::ALL {
            self.renderer.clear_group(group);
        }
    }

    /// Record `added` newly rendered entries in a group. The group becomes
    /// visible on its first non-empty batch; an empty batch changes nothing.
    /// A no-op when `generation` is no longer the live session.
    pub(crate) fn note_group_entries(&self, group: SearchGroupId, added: usize, generation: u64) {
        if added == 0 {
            return;
        }
        let mut state = lock_unpoisoned(&self.search);
        if self.search_generation.load(Ordering::SeqCst) != generation {
            return;
        }
        let slot = state.groups.slot_mut(group);
        slot.len += added;
        let newly_active = !slot.active;
        slot.active = true;
        if newly_active {
            self.renderer.set_group_visible(group, true);
        }
    }

    /// Whether a group is currently shown.
    pub fn group_active(&self, group: SearchGroupId) -> bool {
        lock_unpoisoned(&self.search).groups.get(group).active
    }

    /// Number of entries rendered into a group this session.
    pub fn group_len(&self, group: SearchGroupId) -> usize {
        lock_unpoisoned(&self.search).groups.get(group).len
    }
}
