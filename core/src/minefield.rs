use alloc::vec::Vec;
use core::ops::Index;
use core::str::FromStr;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Read-only view of where the mines are.
///
/// Coordinates are `(row, col)`. Implementations must be immutable for the lifetime of any
/// [`VisibleField`] borrowing them.
pub trait Minefield {
    /// Board size as `(rows, cols)`.
    fn size(&self) -> Coord2;

    fn mine_count(&self) -> CellCount;

    fn contains_mine(&self, coords: Coord2) -> bool;

    /// Number of mines among the (up to 8) cells surrounding `coords`.
    fn adjacent_mine_count(&self, coords: Coord2) -> u8;

    fn num_rows(&self) -> Coord {
        self.size().0
    }

    fn num_cols(&self) -> Coord {
        self.size().1
    }

    fn in_range(&self, (row, col): Coord2) -> bool {
        let (rows, cols) = self.size();
        row < rows && col < cols
    }

    fn total_cells(&self) -> CellCount {
        let (rows, cols) = self.size();
        mult(rows, cols)
    }

    fn safe_cell_count(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mine_count())
    }
}

/// Fixed mine placement backed by a boolean mask.
///
/// Holds at least one mine and at least one safe cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMineLayout")]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

/// Unchecked wire form, validated on the way into a [`MineLayout`].
#[derive(Deserialize)]
struct RawMineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl TryFrom<RawMineLayout> for MineLayout {
    type Error = GameError;

    fn try_from(raw: RawMineLayout) -> Result<Self> {
        let layout = Self::from_mine_mask(raw.mine_mask)?;
        if layout.mine_count != raw.mine_count {
            return Err(GameError::MineCountMismatch);
        }
        Ok(layout)
    }
}

impl MineLayout {
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Result<Self> {
        let (rows, cols) = mine_mask.dim();
        let max_side = usize::from(Coord::MAX);
        if rows == 0 || cols == 0 || rows > max_side || cols > max_side {
            return Err(GameError::InvalidBoardShape);
        }

        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count();
        if mine_count == 0 {
            return Err(GameError::NoMines);
        }
        if mine_count >= mine_mask.len() {
            return Err(GameError::TooManyMines);
        }

        Ok(Self {
            mine_mask,
            mine_count: mine_count
                .try_into()
                .map_err(|_| GameError::TooManyMines)?,
        })
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Self::from_mine_mask(mine_mask)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.in_range(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.mine_mask.iter_neighbors(coords)
    }
}

impl Minefield for MineLayout {
    fn size(&self) -> Coord2 {
        grid_size(&self.mine_mask)
    }

    fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        let mut count = 0;
        for pos in self.iter_neighbors(coords) {
            if self[pos] {
                count += 1;
            }
        }
        count
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mine_mask[coords.to_nd_index()]
    }
}

/// Parses one row per line, `*` for a mine and `.` for a safe cell.
impl FromStr for MineLayout {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        let mut cells = Vec::new();
        let mut rows = 0;
        let mut cols = None;

        for line in s.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let row_start = cells.len();
            for ch in line.chars() {
                cells.push(match ch {
                    '*' => true,
                    '.' => false,
                    _ => return Err(GameError::InvalidBoardShape),
                });
            }
            let width = cells.len() - row_start;
            match cols {
                None => cols = Some(width),
                Some(expected) if expected != width => return Err(GameError::InvalidBoardShape),
                Some(_) => {}
            }
            rows += 1;
        }

        let mine_mask = Array2::from_shape_vec((rows, cols.unwrap_or(0)), cells)
            .map_err(|_| GameError::InvalidBoardShape)?;
        Self::from_mine_mask(mine_mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn adjacency_counts_surrounding_mines() {
        let layout: MineLayout = "
            *..
            .*.
            ...
        "
        .parse()
        .unwrap();

        assert_eq!(layout.size(), (3, 3));
        assert_eq!(layout.mine_count(), 2);
        assert_eq!(layout.adjacent_mine_count((0, 1)), 2);
        assert_eq!(layout.adjacent_mine_count((2, 2)), 1);
        assert_eq!(layout.adjacent_mine_count((2, 0)), 1);
        assert_eq!(layout.adjacent_mine_count((0, 2)), 1);
        assert!(layout.contains_mine((1, 1)));
        assert!(!layout.contains_mine((1, 0)));
    }

    #[test]
    fn rows_and_cols_follow_text_layout() {
        let layout: MineLayout = "*...\n....".parse().unwrap();

        assert_eq!(layout.num_rows(), 2);
        assert_eq!(layout.num_cols(), 4);
        assert_eq!(layout.total_cells(), 8);
        assert_eq!(layout.safe_cell_count(), 7);
        assert!(layout.in_range((1, 3)));
        assert!(!layout.in_range((2, 0)));
        assert!(!layout.in_range((0, 4)));
    }

    #[test]
    fn from_mine_coords_rejects_out_of_range() {
        assert_eq!(
            MineLayout::from_mine_coords((2, 2), &[(2, 0)]),
            Err(GameError::InvalidCoords)
        );
    }

    #[test]
    fn from_mine_coords_counts_duplicates_once() {
        let layout = MineLayout::from_mine_coords((2, 3), &[(1, 2), (1, 2)]).unwrap();

        assert_eq!(layout.mine_count(), 1);
        assert_eq!(layout.safe_cell_count(), 5);
    }

    #[test]
    fn full_board_is_rejected() {
        assert_eq!(
            MineLayout::from_mine_coords((1, 2), &[(0, 0), (0, 1)]),
            Err(GameError::TooManyMines)
        );
    }

    #[test]
    fn mine_free_board_is_rejected() {
        assert_eq!("...\n...".parse::<MineLayout>(), Err(GameError::NoMines));
        assert_eq!(
            MineLayout::from_mine_coords((3, 3), &[]),
            Err(GameError::NoMines)
        );
    }

    #[test]
    fn malformed_text_is_rejected() {
        assert_eq!("*.\n.".parse::<MineLayout>(), Err(GameError::InvalidBoardShape));
        assert_eq!("*x".parse::<MineLayout>(), Err(GameError::InvalidBoardShape));
        assert_eq!("".parse::<MineLayout>(), Err(GameError::InvalidBoardShape));
    }

    #[test]
    fn validate_coords_checks_bounds() {
        let layout: MineLayout = "*.".parse().unwrap();

        assert_eq!(layout.validate_coords((0, 1)), Ok((0, 1)));
        assert_eq!(layout.validate_coords((1, 0)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn layout_round_trips_through_json() {
        let layout: MineLayout = ".*\n..".parse().unwrap();

        let json = serde_json::to_string(&layout).unwrap();
        let back: MineLayout = serde_json::from_str(&json).unwrap();

        assert_eq!(back, layout);
    }

    #[test]
    fn json_with_wrong_mine_count_is_rejected() {
        let json = r#"{"mine_mask":{"v":1,"dim":[1,3],"data":[true,false,false]},"mine_count":2}"#;

        let err = serde_json::from_str::<MineLayout>(json).unwrap_err();

        assert!(err.to_string().contains("mine count"), "{err}");
    }

    #[test]
    fn json_with_full_board_is_rejected() {
        let json = r#"{"mine_mask":{"v":1,"dim":[1,2],"data":[true,true]},"mine_count":2}"#;

        assert!(serde_json::from_str::<MineLayout>(json).is_err());
    }
}
