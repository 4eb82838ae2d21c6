use indexmap::IndexMap;

use crate::renderer::system::SystemEventKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// The set of input routes currently open into the controller.
///
/// Events whose kind has no attached listener are dropped before they reach
/// any state, which is what makes a torn-down controller inert.
#[derive(Debug, Default)]
pub struct Listeners {
    next_id: u64,
    attached: IndexMap<ListenerId, SystemEventKind>,
}

impl Listeners {
    /// Attaches one listener per event kind, skipping kinds already
    /// attached, so calling it twice never doubles up.
    pub fn attach_all(&mut self) {
        for kind in SystemEventKind::ALL {
            if !self.is_attached(kind) {
                let id = ListenerId(self.next_id);
                self.next_id += 1;

                self.attached.insert(id, kind);
            }
        }
    }

    /// Returns how many listeners were removed.
    pub fn detach_all(&mut self) -> usize {
        let count = self.attached.len();
        self.attached.clear();
        count
    }

    pub fn is_attached(&self, kind: SystemEventKind) -> bool {
        self.attached.values().any(|k| *k == kind)
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }
}
