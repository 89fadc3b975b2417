//! Renders robot-flasher man pages
//!
//! Writes `robot-flasher.1` plus one `robot-flasher-<command>.1` page per
//! subcommand into the directory given as the first argument (default `man`).

use std::io;
use std::path::{Path, PathBuf};

use clap::{Command, CommandFactory};

#[path = "../cli.rs"]
#[allow(dead_code)]
mod cli;

fn render(cmd: Command, dir: &Path, file: &str) -> io::Result<PathBuf> {
    let mut page = Vec::new();
    clap_mangen::Man::new(cmd).render(&mut page)?;
    let path = dir.join(file);
    std::fs::write(&path, page)?;
    Ok(path)
}

/// Write all pages into `dir`, root page first
fn generate(dir: &Path) -> io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let root = cli::Cli::command();
    let name = root.get_name().to_string();

    let mut written = Vec::new();
    for sub in root.get_subcommands().filter(|s| s.get_name() != "help") {
        let file = format!("{}-{}.1", name, sub.get_name());
        written.push(render(sub.clone(), dir, &file)?);
    }
    written.insert(0, render(root, dir, &format!("{}.1", name))?);
    Ok(written)
}

fn main() -> io::Result<()> {
    let dir = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from("man"), PathBuf::from);

    for path in generate(&dir)? {
        println!("{}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_root_and_subcommand_pages() {
        let dir = tempfile::tempdir().unwrap();
        let pages = generate(dir.path()).unwrap();

        let names: Vec<_> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            [
                "robot-flasher.1",
                "robot-flasher-flash.1",
                "robot-flasher-download.1",
                "robot-flasher-list-models.1",
                "robot-flasher-list-ports.1",
            ]
        );

        let root = std::fs::read_to_string(&pages[0]).unwrap();
        assert!(root.contains(".TH"));
        assert!(root.contains("list"));
        let flash = std::fs::read_to_string(&pages[1]).unwrap();
        assert!(flash.contains(".TH"));
        assert!(flash.contains("usb"));
    }
}
