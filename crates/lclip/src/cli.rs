use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{ArgGroup, CommandFactory, Parser};

/// lclip — labeled clipboard: copy text or bytes to named labels and paste
/// them back later.
#[derive(Parser)]
#[command(version, about, disable_version_flag = true)]
#[command(group(ArgGroup::new("operation").required(true).multiple(false)))]
pub struct Cli {
    /// Print the version.
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    pub version: Option<bool>,

    /// Paste the value stored under LABEL to standard output.
    #[arg(short, long, value_name = "LABEL", group = "operation")]
    pub get: Option<String>,

    /// Copy the given files (or standard input) to LABEL.
    #[arg(short, long, value_name = "LABEL", group = "operation")]
    pub set: Option<String>,

    /// List all labels, sorted.
    #[arg(short, long, group = "operation")]
    pub labels: bool,

    /// Delete one or more labels.
    #[arg(short, long, value_name = "LABEL", num_args = 1.., group = "operation")]
    pub delete: Vec<String>,

    /// Input files for --set, concatenated in order. `-` reads standard input.
    #[arg(value_name = "FILE", requires = "set", conflicts_with_all = ["get", "labels", "delete"])]
    pub files: Vec<PathBuf>,

    /// Store file. Defaults to $LCLIP_PATH, then ~/.lclip.json.
    #[arg(short, long, value_name = "FILE")]
    pub path: Option<PathBuf>,
}

/// The single operation requested on the command line.
#[derive(Debug, PartialEq, Eq)]
pub enum Operation {
    Get(String),
    Set { label: String, files: Vec<PathBuf> },
    Labels,
    Delete(Vec<String>),
}

impl Cli {
    /// Split the parsed arguments into the store path override and the
    /// requested operation. Input files given to anything but `--set` are
    /// a usage error.
    pub fn into_parts(self) -> Result<(Option<PathBuf>, Operation), clap::Error> {
        if self.set.is_none() && !self.files.is_empty() {
            return Err(Self::command().error(
                ErrorKind::ArgumentConflict,
                "input files are only accepted with --set",
            ));
        }

        let operation = if let Some(label) = self.get {
            Operation::Get(label)
        } else if let Some(label) = self.set {
            Operation::Set {
                label,
                files: self.files,
            }
        } else if self.labels {
            Operation::Labels
        } else {
            Operation::Delete(self.delete)
        };
        Ok((self.path, operation))
    }
}
