use std::{fmt, num::ParseIntError};

use itertools::Itertools;
use nom::{
    bytes::complete::tag,
    character::complete::{char, space0},
    combinator::map,
    error::{FromExternalError, ParseError},
    multi::separated_list1,
    sequence::{delimited, separated_pair},
    IResult,
};
use util::{parse_nice, parse_number, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("couldn't parse line {line}")]
    BadInput {
        line: usize,
        #[source]
        source: util::BadInput,
    },
    #[error("rock on line {line} runs diagonally from {from} to {to}")]
    DiagonalSegment { line: usize, from: Point, to: Point },
    #[error("rock on line {line} at {point} is outside 0..={}", MAX_COORD)]
    OutOfRange { line: usize, point: Point },
    #[error("a cave of {width} by {height} cells is too large to simulate")]
    CaveTooLarge { width: i64, height: i64 },
}

/// Largest coordinate accepted on either axis.
pub const MAX_COORD: i32 = 2_000;

/// One line of the scan: a wall of rock traced point to point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    points: Vec<Point>,
}

impl Path {
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.iter().copied().tuple_windows()
    }
}

fn parse_point<'a, E>(i: Span<'a>) -> IResult<Span<'a>, Point, E>
where
    E: ParseError<Span<'a>> + FromExternalError<Span<'a>, ParseIntError>,
{
    map(
        separated_pair(parse_number, char(','), parse_number),
        |(x, y)| Point { x, y },
    )(i)
}

fn parse_path<'a, E>(i: Span<'a>) -> IResult<Span<'a>, Path, E>
where
    E: ParseError<Span<'a>> + FromExternalError<Span<'a>, ParseIntError>,
{
    map(
        separated_list1(delimited(space0, tag("->"), space0), parse_point),
        |points| Path { points },
    )(i)
}

/// Parses every non-blank line into a [`Path`], failing on the first bad line.
pub fn get_paths(input: impl Iterator<Item = String>) -> Result<Vec<Path>, Error> {
    input
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(n, l)| {
            let line = n + 1;
            let path = parse_nice(l.trim_end(), parse_path)
                .map_err(|source| Error::BadInput { line, source })?;

            let in_range = 0..=MAX_COORD;
            if let Some(&point) = path
                .points()
                .iter()
                .find(|p| !in_range.contains(&p.x) || !in_range.contains(&p.y))
            {
                return Err(Error::OutOfRange { line, point });
            }

            if let Some((from, to)) = path
                .segments()
                .find(|(from, to)| from.x != to.x && from.y != to.y)
            {
                return Err(Error::DiagonalSegment { line, from, to });
            }

            Ok(path)
        })
        .collect()
}
