use tracing::{debug, trace};

use crate::{Cave, Cell, Point, SOURCE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Down,
    DownLeft,
    DownRight,
}

impl Direction {
    /// Tried in this order; the first open cell wins.
    pub const PRIORITY: [Direction; 3] =
        [Direction::Down, Direction::DownLeft, Direction::DownRight];

    fn apply(self, p: Point) -> Point {
        match self {
            Direction::Down => Point::new(p.x, p.y + 1),
            Direction::DownLeft => Point::new(p.x - 1, p.y + 1),
            Direction::DownRight => Point::new(p.x + 1, p.y + 1),
        }
    }
}

/// How many moves of each kind a single unit made on its way down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Moves {
    pub down: usize,
    pub down_left: usize,
    pub down_right: usize,
}

impl Moves {
    fn record(&mut self, direction: Direction) {
        match direction {
            Direction::Down => self.down += 1,
            Direction::DownLeft => self.down_left += 1,
            Direction::DownRight => self.down_right += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.down + self.down_left + self.down_right
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    Rested(Point),
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fall {
    pub landing: Landing,
    pub moves: Moves,
}

#[derive(Debug, Clone)]
pub struct Simulation {
    cave: Cave,
    rested: usize,
    done: bool,
}

impl Simulation {
    pub fn new(cave: Cave) -> Self {
        Self {
            cave,
            rested: 0,
            done: false,
        }
    }

    pub fn cave(&self) -> &Cave {
        &self.cave
    }

    /// Units that have come to rest so far.
    pub fn rested(&self) -> usize {
        self.rested
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    fn is_open(&self, p: Point) -> bool {
        match self.cave.get(p) {
            Some(cell) => !cell.is_filled(),
            None => panic!("sand reached {p}, outside the cave"),
        }
    }

    /// Follows one unit down from `from` until it can't move or drops into the void.
    fn fall(&self, from: Point) -> Fall {
        let mut pos = from;
        let mut moves = Moves::default();

        loop {
            // nothing below the lowest rock can ever stop it
            if self.cave.floor().is_none() && pos.y >= self.cave.bottom() {
                return Fall {
                    landing: Landing::Void,
                    moves,
                };
            }

            match Direction::PRIORITY
                .into_iter()
                .map(|d| (d, d.apply(pos)))
                .find(|&(_, to)| self.is_open(to))
            {
                Some((direction, to)) => {
                    moves.record(direction);
                    pos = to;
                }
                None => {
                    return Fall {
                        landing: Landing::Rested(pos),
                        moves,
                    }
                }
            }
        }
    }

    /// Drops one unit from the source.
    ///
    /// Returns `None` once the simulation is over: either a unit fell into
    /// the void, or the source itself is filled and nothing more can spawn.
    pub fn step(&mut self) -> Option<Fall> {
        if self.done {
            return None;
        }

        if self.cave.get(SOURCE).map_or(true, Cell::is_filled) {
            debug!("source blocked after {} units", self.rested);
            self.done = true;
            return None;
        }

        let fall = self.fall(SOURCE);
        trace!(
            "unit {}: {:?} after {} down, {} left, {} right",
            self.rested + 1,
            fall.landing,
            fall.moves.down,
            fall.moves.down_left,
            fall.moves.down_right
        );

        match fall.landing {
            Landing::Rested(p) => {
                self.cave.rest_sand(p);
                self.rested += 1;
            }
            Landing::Void => {
                debug!("unit {} fell into the void", self.rested + 1);
                self.done = true;
            }
        }

        Some(fall)
    }

    /// Drops units until the simulation is over and returns how many came to rest.
    pub fn run(&mut self) -> usize {
        while self.step().is_some() {}
        self.rested
    }
}
