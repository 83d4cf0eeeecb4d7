use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "tilawa",
    version,
    about = "Read and listen to the Quran verse by verse from the terminal.",
    long_about = None
)]
pub struct Cli {
    /// Print recently opened chapters and exit
    #[clap(short = 'r', long)]
    pub history: bool,

    /// Print saved bookmarks and exit
    #[clap(short = 'b', long)]
    pub bookmarks: bool,

    /// Use a specific configuration file
    #[clap(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[clap(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Enable debug output
    #[clap(long)]
    pub debug: bool,

    /// Open chapter N (1-114) on start
    #[clap(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=114))]
    pub chapter: Option<u32>,
}
