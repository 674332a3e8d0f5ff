use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    num::ParseIntError,
    path::Path,
    str::FromStr,
};

use anyhow::{Context, Result};
use miette::{GraphicalReportHandler, GraphicalTheme};
use nom::{
    character::complete::{char, digit1},
    combinator::{map_res, opt, recognize},
    error::{FromExternalError, ParseError},
    sequence::tuple,
    IResult,
};
use nom_locate::LocatedSpan;
use nom_supreme::{
    error::{ErrorTree, GenericErrorTree},
    final_parser::final_parser,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Thanks to FasterThanLime! https://fasterthanli.me/series/advent-of-code-2022/part-11

pub type Span<'a> = LocatedSpan<&'a str>;

/// A line that didn't parse, with the offset where the parser gave up.
#[derive(thiserror::Error, Debug, miette::Diagnostic)]
#[error("bad input: {kind}")]
pub struct BadInput {
    #[source_code]
    src: String,

    #[label("{kind}")]
    bad_bit: miette::SourceSpan,

    kind: String,
}

impl BadInput {
    pub fn line(&self) -> &str {
        &self.src
    }

    pub fn offset(&self) -> usize {
        self.bad_bit.offset()
    }

    /// Renders the line with the failing position underlined.
    pub fn render(&self) -> String {
        let mut s = String::new();
        let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
        match handler.render_report(&mut s, self) {
            Ok(()) => s,
            Err(_) => self.to_string(),
        }
    }
}

pub fn parse_number<'a, N, E>(i: Span<'a>) -> IResult<Span<'a>, N, E>
where
    N: FromStr<Err = ParseIntError>,
    E: ParseError<Span<'a>> + FromExternalError<Span<'a>, ParseIntError>,
{
    map_res(recognize(tuple((opt(char('-')), digit1))), |i: Span<'a>| {
        N::from_str(i.fragment())
    })(i)
}

fn first_failure(tree: &ErrorTree<Span>) -> (usize, String) {
    match tree {
        GenericErrorTree::Base { location, kind } => (location.location_offset(), kind.to_string()),
        GenericErrorTree::Stack { base, .. } => first_failure(base),
        // the branch that got furthest is the most useful one to show
        GenericErrorTree::Alt(alternatives) => alternatives
            .iter()
            .map(first_failure)
            .max_by_key(|(offset, _)| *offset)
            .unwrap_or_else(|| (0, "no alternative matched".to_string())),
    }
}

/// Runs `parse_fun` over the whole of `l`; anything left unconsumed is an error.
pub fn parse_nice<'a, T, F>(l: &'a str, parse_fun: F) -> Result<T, BadInput>
where
    F: FnMut(Span<'a>) -> IResult<Span<'a>, T, ErrorTree<Span<'a>>>,
{
    let line_span = Span::new(l);
    let line: Result<_, ErrorTree<Span>> = final_parser(parse_fun)(line_span);
    line.map_err(|e| {
        let (offset, kind) = first_failure(&e);
        let err = BadInput {
            src: l.to_string(),
            bad_bit: miette::SourceSpan::new(offset.into(), 0.into()),
            kind,
        };
        tracing::error!("\n{}", err.render());
        err
    })
}

/// Reads puzzle input from `path`, or from stdin when no path is given.
pub fn read_input_lines(path: Option<impl AsRef<Path>>) -> Result<Vec<String>> {
    match path {
        Some(path) => {
            let path = path.as_ref();
            let file = File::open(path)
                .with_context(|| format!("Couldn't open input file {}", path.display()))?;
            BufReader::new(file)
                .lines()
                .collect::<io::Result<Vec<_>>>()
                .with_context(|| format!("Couldn't read input file {}", path.display()))
        }
        None => io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<Vec<_>>>()
            .context("Couldn't read stdin"),
    }
}

/// Sets up logging to stderr, filtered by `RUST_LOG` (`warn` when unset).
///
/// Stdout is left for the answer.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).compact())
        .init();
}
