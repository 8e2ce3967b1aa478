use serde::{Deserialize, Serialize};

/// Player-visible state of a single cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellStatus {
    Covered,
    Flagged,
    Questioned,
    /// Revealed safe cell showing its adjacent mine count.
    Revealed(u8),
    // these are only set when a lost game is finalized:
    Mine,
    IncorrectFlag,
    ExplodedMine,
}

impl CellStatus {
    /// Whether the cell has been opened by the player.
    pub const fn is_uncovered(self) -> bool {
        matches!(self, Self::Revealed(_))
    }

    /// Whether the cell still hides what is underneath.
    ///
    /// End-of-game reclassifications count as shown, wrong flags included.
    pub const fn is_covered(self) -> bool {
        use CellStatus::*;
        match self {
            Covered => true,
            Flagged => true,
            Questioned => true,
            Revealed(_) => false,
            Mine => false,
            IncorrectFlag => false,
            ExplodedMine => false,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Mine | Self::IncorrectFlag | Self::ExplodedMine)
    }
}

impl Default for CellStatus {
    fn default() -> Self {
        Self::Covered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_revealed_counts_as_uncovered() {
        use CellStatus::*;

        for status in [Covered, Flagged, Questioned, Mine, IncorrectFlag, ExplodedMine] {
            assert!(!status.is_uncovered(), "{status:?}");
        }
        for count in 0..=8 {
            assert!(Revealed(count).is_uncovered());
        }
    }

    #[test]
    fn only_player_marks_count_as_covered() {
        use CellStatus::*;

        for status in [Covered, Flagged, Questioned] {
            assert!(status.is_covered(), "{status:?}");
            assert!(!status.is_terminal(), "{status:?}");
        }
        for status in [Mine, IncorrectFlag, ExplodedMine] {
            assert!(!status.is_covered(), "{status:?}");
            assert!(status.is_terminal(), "{status:?}");
        }
        assert!(!Revealed(0).is_covered());
    }

    #[test]
    fn serializes_with_count_payload() {
        let json = serde_json::to_string(&CellStatus::Revealed(3)).unwrap();
        assert_eq!(json, r#"{"Revealed":3}"#);

        let back: CellStatus = serde_json::from_str(r#""Flagged""#).unwrap();
        assert_eq!(back, CellStatus::Flagged);
    }
}
