//! Execution of a single lclip operation against an open store.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use eyre::WrapErr;

use lclip_core::LabelStore;

use crate::cli::Operation;

/// An operation with all of its input already gathered, ready to run while
/// the store is open.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Get(String),
    Set { label: String, value: Vec<u8> },
    Labels,
    Delete(Vec<String>),
}

impl Command {
    /// Resolve `operation` into a runnable command. For `--set` this reads
    /// the input files (or `stdin`) up front, so the store is never held
    /// open while waiting on input.
    pub(crate) fn prepare(operation: Operation, stdin: impl Read) -> eyre::Result<Self> {
        Ok(match operation {
            Operation::Get(label) => Self::Get(label),
            Operation::Set { label, files } => Self::Set {
                label,
                value: read_input(&files, stdin)?,
            },
            Operation::Labels => Self::Labels,
            Operation::Delete(labels) => Self::Delete(labels),
        })
    }

    pub(crate) fn run(self, store: &mut LabelStore, out: &mut impl Write) -> eyre::Result<()> {
        match self {
            Self::Get(label) => {
                out.write_all(store.get(&label))
                    .and_then(|()| out.flush())
                    .wrap_err("write value to standard output")?;
            }
            Self::Set { label, value } => {
                tracing::info!(label = %label, bytes = value.len(), "storing value");
                store.set(label, value);
            }
            Self::Labels => {
                let mut labels = store.labels();
                labels.sort_unstable();
                for label in labels {
                    writeln!(out, "{label}").wrap_err("write label list")?;
                }
                out.flush().wrap_err("write label list")?;
            }
            Self::Delete(labels) => {
                for label in &labels {
                    if !store.contains(label) {
                        tracing::debug!(label = %label, "label not present; nothing to delete");
                    }
                    store.delete(label);
                }
            }
        }
        Ok(())
    }
}

/// Concatenate `files` in order, or read all of `stdin` when no files are
/// given. A file named `-` also stands for standard input.
fn read_input(files: &[PathBuf], mut stdin: impl Read) -> eyre::Result<Vec<u8>> {
    let mut buf = Vec::new();

    if files.is_empty() {
        stdin
            .read_to_end(&mut buf)
            .wrap_err("read standard input")?;
        return Ok(buf);
    }

    for file in files {
        if file.as_path() == Path::new("-") {
            stdin
                .read_to_end(&mut buf)
                .wrap_err("read standard input")?;
            continue;
        }
        File::open(file)
            .and_then(|mut f| f.read_to_end(&mut buf))
            .wrap_err_with(|| format!("read input file {}", file.display()))?;
    }
    Ok(buf)
}
