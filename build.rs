//! Renders the `segwire(1)` man page from the clap definition.

use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli.rs"]
#[expect(dead_code, reason = "the build script only needs the command definition")]
mod cli;

fn render_man_page(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)?;
    let mut page = Vec::new();
    Man::new(cli::Cli::command()).render(&mut page)?;
    fs::write(dir.join("segwire.1"), page)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");
    render_man_page(&PathBuf::from("target/generated-man"))
}
