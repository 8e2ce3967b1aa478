#![no_std]

extern crate alloc;

pub use error::*;
pub use field::*;
pub use minefield::*;
pub use tile::*;
pub use types::*;

mod error;
mod field;
mod minefield;
mod tile;
mod types;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_changed_marks_need_update() {
        assert!(MarkOutcome::Changed.has_update());
        assert!(!MarkOutcome::NoChange.has_update());
    }
}
