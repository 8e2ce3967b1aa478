use alloc::vec::Vec;
use ndarray::Array2;

use crate::*;

/// What the player currently sees of a [`Minefield`].
///
/// The minefield is borrowed and only ever queried, so several fields may share one layout.
/// Per-cell methods take `(row, col)` coordinates that must be in range; passing anything
/// else is a caller bug and panics.
#[derive(Clone, Debug)]
pub struct VisibleField<'a, M: Minefield + ?Sized = MineLayout> {
    minefield: &'a M,
    grid: Array2<CellStatus>,
    size: Coord2,
    mine_count: CellCount,
    revealed_count: CellCount,
    flagged_count: CellCount,
    exploded: Option<Coord2>,
}

impl<'a, M: Minefield + ?Sized> VisibleField<'a, M> {
    /// Creates a field with every cell covered and no guesses made.
    pub fn new(minefield: &'a M) -> Self {
        let size = minefield.size();
        Self {
            minefield,
            grid: Array2::default(size.to_nd_index()),
            size,
            mine_count: minefield.mine_count(),
            revealed_count: 0,
            flagged_count: 0,
            exploded: None,
        }
    }

    /// Covers every cell again, keeping the same minefield.
    pub fn reset(&mut self) {
        self.grid.fill(CellStatus::Covered);
        self.revealed_count = 0;
        self.flagged_count = 0;
        self.exploded = None;
        log::debug!("Reset {:?} field", self.size);
    }

    pub fn minefield(&self) -> &'a M {
        self.minefield
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    pub fn total_mines(&self) -> CellCount {
        self.mine_count
    }

    pub fn status(&self, coords: Coord2) -> CellStatus {
        self.check_coords(coords);
        self.grid[coords.to_nd_index()]
    }

    pub fn is_uncovered(&self, coords: Coord2) -> bool {
        self.status(coords).is_uncovered()
    }

    /// How many mines have not been flagged yet, negative when over-flagged.
    ///
    /// Says nothing about whether the flags are correct.
    pub fn mines_left(&self) -> isize {
        (self.mine_count as isize) - (self.flagged_count as isize)
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    /// The mine the player set off, if any.
    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.exploded
    }

    /// Every cell with its status, in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Coord2, CellStatus)> + '_ {
        self.iter_coords().zip(self.grid.iter().copied())
    }

    /// Cycles a covered cell through flagged, questioned, and back to covered.
    ///
    /// Any other cell is left alone.
    pub fn cycle_guess(&mut self, coords: Coord2) -> MarkOutcome {
        use CellStatus::*;

        let next = match self.status(coords) {
            Covered => Flagged,
            Flagged => Questioned,
            Questioned => Covered,
            _ => return MarkOutcome::NoChange,
        };
        self.set_status(coords, next);
        MarkOutcome::Changed
    }

    /// Uncovers a cell, returning `false` iff it holds a mine.
    ///
    /// A cell with no adjacent mines also opens its whole zero region along with the numbered
    /// cells bordering it. Flagged cells are neither opened nor searched through.
    pub fn uncover(&mut self, coords: Coord2) -> bool {
        self.check_coords(coords);

        if self.minefield.contains_mine(coords) {
            log::debug!("Uncovered mine at {:?}", coords);
            self.set_status(coords, CellStatus::ExplodedMine);
            return false;
        }

        match self.minefield.adjacent_mine_count(coords) {
            0 => self.flood_fill(coords),
            count => {
                log::debug!("Uncovered cell at {:?}, mine count: {}", coords, count);
                self.set_status(coords, CellStatus::Revealed(count));
            }
        }
        true
    }

    /// Checks for a win or a loss, finalizing the display when the game is over.
    ///
    /// After a loss every wrong flag becomes [`CellStatus::IncorrectFlag`] and every unmarked
    /// mine [`CellStatus::Mine`]; after a win every remaining cell gets flagged. Calling this
    /// again once the game is over changes nothing.
    pub fn is_game_over(&mut self) -> bool {
        if let Some(exploded) = self.exploded {
            log::debug!("Game lost, mine exploded at {:?}", exploded);
            self.finalize_loss();
            true
        } else if self.revealed_count == self.safe_cell_count() {
            log::debug!("Game won, {} cells revealed", self.revealed_count);
            self.finalize_win();
            true
        } else {
            false
        }
    }

    fn flood_fill(&mut self, start: Coord2) {
        let mut to_visit = Vec::from([start]);
        log::trace!("Starting flood-fill from {:?}", start);

        while let Some(visit_coords) = to_visit.pop() {
            match self.grid[visit_coords.to_nd_index()] {
                CellStatus::Flagged => {
                    log::trace!("Skipping flagged cell at {:?}", visit_coords);
                    continue;
                }
                CellStatus::Revealed(_) => continue,
                _ => {}
            }

            let count = self.minefield.adjacent_mine_count(visit_coords);
            self.set_status(visit_coords, CellStatus::Revealed(count));
            log::trace!(
                "Flood opened cell at {:?}, mine count: {}",
                visit_coords,
                count
            );

            // only zero cells keep spreading, numbered ones form the boundary
            if count == 0 {
                to_visit.extend(
                    NeighborIter::new(visit_coords, self.size)
                        .filter(|&pos| !self.grid[pos.to_nd_index()].is_uncovered()),
                );
            }
        }
    }

    fn finalize_loss(&mut self) {
        use CellStatus::*;

        for coords in self.iter_coords() {
            let has_mine = self.minefield.contains_mine(coords);
            match (self.grid[coords.to_nd_index()], has_mine) {
                (Flagged, false) => self.set_status(coords, IncorrectFlag),
                (Covered | Questioned, true) => self.set_status(coords, Mine),
                _ => {}
            }
        }
    }

    fn finalize_win(&mut self) {
        for coords in self.iter_coords() {
            if !self.grid[coords.to_nd_index()].is_uncovered() {
                self.set_status(coords, CellStatus::Flagged);
            }
        }
    }

    /// Single write path for the grid, keeps the counters in step with the cells.
    fn set_status(&mut self, coords: Coord2, status: CellStatus) {
        let cell = &mut self.grid[coords.to_nd_index()];
        let previous = core::mem::replace(cell, status);

        if previous == CellStatus::Flagged {
            self.flagged_count -= 1;
        }
        if previous.is_uncovered() {
            self.revealed_count -= 1;
        }

        if status == CellStatus::Flagged {
            self.flagged_count += 1;
        }
        if status.is_uncovered() {
            self.revealed_count += 1;
        }
        if status == CellStatus::ExplodedMine && self.exploded.is_none() {
            self.exploded = Some(coords);
        }
    }

    fn safe_cell_count(&self) -> CellCount {
        mult(self.size.0, self.size.1).saturating_sub(self.mine_count)
    }

    fn iter_coords(&self) -> impl Iterator<Item = Coord2> + use<'a, M> {
        let (rows, cols) = self.size;
        (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
    }

    fn check_coords(&self, coords: Coord2) {
        debug_assert!(
            self.minefield.in_range(coords),
            "coordinates {:?} out of range for {:?} board",
            coords,
            self.size
        );
    }
}
