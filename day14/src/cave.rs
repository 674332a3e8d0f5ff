use std::fmt;

use tracing::debug;

use crate::{Error, Path, Point, SOURCE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Air,
    Rock,
    Sand,
}

impl Cell {
    pub fn is_filled(self) -> bool {
        match self {
            Cell::Air => false,
            Cell::Rock | Cell::Sand => true,
        }
    }

    fn symbol(self) -> char {
        match self {
            Cell::Air => '.',
            Cell::Rock => '#',
            Cell::Sand => 'o',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Floor {
    /// Sand that gets below the lowest rock falls forever.
    Open,
    /// A rock floor runs the full width two rows below the lowest rock.
    Closed,
}

/// Most cells a cave may hold.
pub const MAX_CELLS: i64 = 1 << 24;

/// Smallest and largest of `first` and `rest`.
fn span<T: Ord + Copy>(first: T, rest: impl Iterator<Item = T>) -> (T, T) {
    rest.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// The scanned slice of cave, row-major, sized so sand can never leave it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cave {
    cells: Vec<Cell>,
    // top-left corner
    origin: Point,
    width: usize,
    height: usize,
    bottom: i32,
    floor: Option<i32>,
}

impl Cave {
    pub fn from_paths(paths: &[Path], floor: Floor) -> Result<Self, Error> {
        let points = || paths.iter().flat_map(|path| path.points().iter().copied());

        let (top, bottom) = span(SOURCE.y, points().map(|p| p.y));
        // sized in i64 so no scan can overflow it
        let (top, bottom) = (i64::from(top), i64::from(bottom));
        let floor_y = bottom + 2;
        // a pile resting on the floor is never wider than it is tall
        let spread = floor_y - i64::from(SOURCE.y);
        let (left, right) = span(
            i64::from(SOURCE.x),
            points()
                .map(|p| i64::from(p.x))
                .chain([i64::from(SOURCE.x) - spread, i64::from(SOURCE.x) + spread]),
        );

        let (width, height) = (right - left + 1, floor_y - top + 1);
        if width.checked_mul(height).map_or(true, |cells| cells > MAX_CELLS) {
            return Err(Error::CaveTooLarge { width, height });
        }

        let narrow = |v: i64| i32::try_from(v).map_err(|_| Error::CaveTooLarge { width, height });
        let origin = Point::new(narrow(left)?, narrow(top)?);
        let (bottom, floor_y, right) = (narrow(bottom)?, narrow(floor_y)?, narrow(right)?);
        let (width, height) = (width as usize, height as usize);

        let mut cave = Self {
            cells: vec![Cell::Air; width * height],
            origin,
            width,
            height,
            bottom,
            floor: None,
        };

        for (from, to) in paths.iter().flat_map(Path::segments) {
            cave.draw_rock(from, to);
        }

        if floor == Floor::Closed {
            cave.draw_rock(Point::new(origin.x, floor_y), Point::new(right, floor_y));
            cave.floor = Some(floor_y);
        }

        debug!(
            "cave spans {} to {},{}, lowest rock at {}, floor {:?}",
            origin, right, floor_y, bottom, cave.floor
        );

        Ok(cave)
    }

    fn index(&self, p: Point) -> Option<usize> {
        let col = usize::try_from(p.x - self.origin.x).ok()?;
        let row = usize::try_from(p.y - self.origin.y).ok()?;
        (col < self.width && row < self.height).then(|| row * self.width + col)
    }

    pub fn get(&self, p: Point) -> Option<Cell> {
        self.index(p).map(|i| self.cells[i])
    }

    fn set(&mut self, p: Point, cell: Cell) {
        let Some(i) = self.index(p) else {
            panic!("{p} is outside the cave, it was sized wrong");
        };
        self.cells[i] = cell;
    }

    fn draw_rock(&mut self, from: Point, to: Point) {
        for y in from.y.min(to.y)..=from.y.max(to.y) {
            for x in from.x.min(to.x)..=from.x.max(to.x) {
                self.set(Point::new(x, y), Cell::Rock);
            }
        }
    }

    pub(crate) fn rest_sand(&mut self, p: Point) {
        self.set(p, Cell::Sand);
    }

    /// Lowest row holding rock (or the source, when there is no rock below it).
    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    pub fn floor(&self) -> Option<i32> {
        self.floor
    }

    fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.height).flat_map(move |row| {
            (0..self.width).map(move |col| {
                Point::new(self.origin.x + col as i32, self.origin.y + row as i32)
            })
        })
    }

    pub fn cells_of(&self, kind: Cell) -> impl Iterator<Item = Point> + '_ {
        self.points()
            .zip(self.cells.iter())
            .filter_map(move |(p, &cell)| (cell == kind).then_some(p))
    }
}

impl fmt::Display for Cave {
    /// Draws everything but the floor's far reaches: the box around the
    /// source and every filled cell off the floor row.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = self
            .points()
            .zip(self.cells.iter())
            .filter(|(p, cell)| cell.is_filled() && Some(p.y) != self.floor)
            .map(|(p, _)| p)
            .collect::<Vec<_>>();

        let (x_start, x_end) = span(SOURCE.x, shown.iter().map(|p| p.x));
        let (y_start, y_end) = span(SOURCE.y, shown.iter().map(|p| p.y));
        let y_end = self.floor.unwrap_or(y_end);

        for y in y_start..=y_end {
            for x in x_start..=x_end {
                let p = Point::new(x, y);
                let c = if p == SOURCE {
                    '+'
                } else {
                    self.get(p).unwrap_or(Cell::Air).symbol()
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::get_paths;

    const TEST_INPUT: &str = include_str!("../data/test_input");

    fn sample_paths() -> Vec<Path> {
        get_paths(TEST_INPUT.lines().map(|l| l.to_string())).unwrap()
    }

    #[test]
    fn rocks_drawn() {
        let cave = Cave::from_paths(&sample_paths(), Floor::Open).unwrap();
        let rocks = cave.cells_of(Cell::Rock).collect::<Vec<_>>();
        // 5 in the first path, 2 + 5 + 8 in the second
        assert_eq!(rocks.len(), 20);
        for p in [(498, 4), (498, 6), (496, 6), (503, 4), (502, 7), (494, 9)] {
            assert_eq!(cave.get(Point::new(p.0, p.1)), Some(Cell::Rock));
        }
        assert_eq!(cave.get(Point::new(497, 5)), Some(Cell::Air));
        assert_eq!(cave.bottom(), 9);
        assert_eq!(cave.floor(), None);
    }

    #[test]
    fn construction_is_idempotent() {
        let paths = sample_paths();
        for floor in [Floor::Open, Floor::Closed] {
            let a = Cave::from_paths(&paths, floor).unwrap();
            let b = Cave::from_paths(&paths, floor).unwrap();
            assert_eq!(a, b);
            assert_eq!(
                a.cells_of(Cell::Rock).collect::<Vec<_>>(),
                b.cells_of(Cell::Rock).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn floor_spans_cave() {
        let cave = Cave::from_paths(&sample_paths(), Floor::Closed).unwrap();
        assert_eq!(cave.floor(), Some(11));
        // the widest pile reaches 10 either side of the source
        for x in 490..=510 {
            assert_eq!(cave.get(Point::new(x, 11)), Some(Cell::Rock));
        }
        assert_eq!(cave.get(Point::new(500, 12)), None);
    }

    #[test]
    fn empty_cave() {
        let cave = Cave::from_paths(&[], Floor::Open).unwrap();
        assert_eq!(cave.bottom(), 0);
        assert_eq!(cave.cells_of(Cell::Rock).count(), 0);
        assert_eq!(cave.get(SOURCE), Some(Cell::Air));
    }

    #[test]
    fn rocks_only_render() {
        let cave = Cave::from_paths(&sample_paths(), Floor::Open).unwrap();
        let expected = "\
......+...
..........
..........
..........
....#...##
....#...#.
..###...#.
........#.
........#.
#########.
";
        assert_eq!(cave.to_string(), expected);
    }

    #[test]
    #[should_panic]
    fn resting_outside_panics() {
        let mut cave = Cave::from_paths(&[], Floor::Open).unwrap();
        cave.rest_sand(Point::new(500, 50));
    }
}
