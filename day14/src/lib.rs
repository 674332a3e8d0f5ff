mod cave;
mod parse;
mod simulation;

use anyhow::{Context, Result};
use tracing::debug;

pub use cave::{Cave, Cell, Floor, MAX_CELLS};
pub use parse::{get_paths, Error, Path, Point, MAX_COORD};
pub use simulation::{Direction, Fall, Landing, Moves, Simulation};

/// Where every unit of sand starts falling from.
pub const SOURCE: Point = Point::new(500, 0);

pub fn get_num_sand_rest(input: impl Iterator<Item = String>, floor: Floor) -> Result<usize> {
    let paths = get_paths(input).context("Couldn't read the rock scan")?;
    let mut simulation = Simulation::new(Cave::from_paths(&paths, floor)?);
    let rested = simulation.run();
    debug!("cave after {rested} units:\n{}", simulation.cave());
    Ok(rested)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_INPUT: &str = include_str!("../data/test_input");

    #[test]
    fn part1() {
        let res = get_num_sand_rest(TEST_INPUT.lines().map(|l| l.to_string()), Floor::Open);
        assert!(res.is_ok());
        assert_eq!(res.unwrap(), 24);
    }

    #[test]
    fn part2() {
        let res = get_num_sand_rest(TEST_INPUT.lines().map(|l| l.to_string()), Floor::Closed);
        assert!(res.is_ok());
        assert_eq!(res.unwrap(), 93);
    }

    #[test]
    fn empty_scan() {
        let res = get_num_sand_rest(std::iter::empty(), Floor::Open);
        assert_eq!(res.unwrap(), 0);
    }

    #[test]
    fn bad_scan() {
        let res = get_num_sand_rest(["498,4 -> 498,x".to_string()].into_iter(), Floor::Open);
        let err = res.unwrap_err();
        let bad = err
            .chain()
            .find_map(|e| e.downcast_ref::<util::BadInput>())
            .unwrap();
        assert_eq!(bad.offset(), 5);
    }

    #[test]
    fn huge_coordinates_are_errors() {
        for line in ["500,2147483647", "-2147483000,3 -> -2147483000,3"] {
            for floor in [Floor::Open, Floor::Closed] {
                let res = get_num_sand_rest([line.to_string()].into_iter(), floor);
                let err = res.unwrap_err();
                assert!(matches!(
                    err.downcast_ref::<Error>(),
                    Some(Error::OutOfRange { line: 1, .. })
                ));
            }
        }
    }
}
