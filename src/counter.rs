use crate::common::Id;

/// Issues identifiers for binders.
///
/// Resolution draws ascending positive ids, one per binder in the source.
/// Reduction draws descending negative ids, one per parameter or declaration
/// it renames. The two ranges never meet.
#[derive(Debug, Default, Clone)]
pub struct HashCounter {
    binders: Id,
    runtime: Id,
}

impl HashCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_binder(&mut self) -> Id {
        self.binders += 1;
        self.binders
    }

    pub fn next_runtime(&mut self) -> Id {
        self.runtime -= 1;
        self.runtime
    }
}
