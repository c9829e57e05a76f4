//! Output destinations
//!
//! File output is staged in a temporary file next to the destination and
//! renamed into place only after the whole payload is written. If writing
//! fails the temporary file is dropped, which deletes it.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// Where a table goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl Destination {
    /// `-` means stdout; no argument means `default_name` in the current
    /// directory.
    pub fn resolve(arg: Option<&Path>, default_name: &str) -> Self {
        match arg {
            Some(p) if p == Path::new("-") => Self::Stdout,
            Some(p) => Self::File(p.to_path_buf()),
            None => Self::File(PathBuf::from(default_name)),
        }
    }
}

/// Run `write` against the destination.
pub fn emit<F>(dest: &Destination, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> bom_graph_core::Result<()>,
{
    match dest {
        Destination::Stdout => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            write(&mut out)?;
            out.flush().context("Failed to flush stdout")?;
        }
        Destination::File(path) => {
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;

            let staged = NamedTempFile::new_in(dir)
                .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
            {
                let mut out = BufWriter::new(staged.as_file());
                write(&mut out)?;
                out.flush()
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
            staged
                .persist(path)
                .with_context(|| format!("Failed to save {}", path.display()))?;
            tracing::info!(path = %path.display(), "Wrote output");
        }
    }
    Ok(())
}
