use day14::{get_num_sand_rest, Floor};

use std::env;

use anyhow::Result;

fn main() -> Result<()> {
    util::init_tracing();

    let input = util::read_input_lines(env::args().nth(1))?;

    let res = get_num_sand_rest(input.into_iter(), Floor::Open)?;

    println!("{res}");

    Ok(())
}
