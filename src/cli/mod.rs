pub mod args;

pub use args::{Arguments, LogLevel};
use clap::Parser;

pub fn parse() -> Arguments {
    Arguments::parse()
}
