//! bandvault CLI entry point.

use bandvault::cli::{handle_command, Cli};
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    if cli.version {
        println!("bandvault {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    if let Some(command) = cli.command {
        if let Err(code) = handle_command(command) {
            std::process::exit(code);
        }
    } else {
        println!("bandvault - local music-collection indexing service");
        println!();
        println!("Usage: bandvault [OPTIONS] <COMMAND>");
        println!();
        println!("Commands:");
        println!("  scan      Scan the music root and update the collection index");
        println!("  list      List bands from the collection index");
        println!("  validate  Validate a prospective metadata change");
        println!("  search    Search albums across the collection");
        println!("  analyze   Compute collection-wide analytics");
        println!();
        println!("Options:");
        println!("  -v, --version  Show version information");
        println!("  -h, --help     Print help");
    }
}
