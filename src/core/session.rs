use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

/// Shared token naming the subtitle that currently owns the screen.
///
/// Asynchronous work captures the id of the subtitle it was started for and
/// checks it against this token before committing. Once another subtitle is
/// activated the older work still runs to completion but its results are
/// discarded.
#[derive(Debug, Clone, Default)]
pub struct ActiveSubtitle {
    current: Arc<RwLock<Option<Uuid>>>,
}

impl ActiveSubtitle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&self, id: Uuid) {
        *self.current.write() = Some(id);
    }

    pub fn clear(&self) {
        *self.current.write() = None;
    }

    pub fn current(&self) -> Option<Uuid> {
        *self.current.read()
    }

    pub fn is_current(&self, id: Uuid) -> bool {
        self.current() == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_supersedes_previous() {
        let active = ActiveSubtitle::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        assert!(!active.is_current(first));
        active.activate(first);
        assert!(active.is_current(first));

        let shared = active.clone();
        shared.activate(second);
        assert!(!active.is_current(first));
        assert!(active.is_current(second));

        active.clear();
        assert_eq!(shared.current(), None);
    }
}
