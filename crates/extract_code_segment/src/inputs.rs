// crates/extract_code_segment/src/inputs.rs

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use code_segment::DocumentSet;

/// Display name used for a document read from stdin.
pub const STDIN_NAME: &str = "<stdin>";

/// Where one document's content comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    pub fn display_name(&self) -> String {
        match self {
            InputSource::Stdin => STDIN_NAME.to_string(),
            InputSource::File(path) => path.display().to_string(),
        }
    }
}

/// Expands the command-line inputs into the ordered list of documents to scan.
///
/// Files are kept in the order given. A directory is walked recursively and
/// contributes its files with an allowed extension, sorted by path. A file
/// listed more than once is only scanned the first time.
pub fn collect_inputs(inputs: &[PathBuf], extensions: &[String]) -> Result<Vec<InputSource>> {
    let mut sources: Vec<InputSource> = Vec::new();
    let mut push = |source: InputSource| {
        if !sources.contains(&source) {
            sources.push(source);
        }
    };

    for input in inputs {
        if input.as_os_str() == "-" {
            push(InputSource::Stdin);
        } else if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| has_allowed_extension(path, extensions))
                .collect();
            found.sort();
            log::debug!("{} matching file(s) under {}", found.len(), input.display());
            found.into_iter().map(InputSource::File).for_each(&mut push);
        } else if input.is_file() {
            push(InputSource::File(input.clone()));
        } else {
            bail!("Input {} does not exist", input.display());
        }
    }
    Ok(sources)
}

fn has_allowed_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| extensions.iter().any(|allowed| allowed == ext))
        .unwrap_or(false)
}

/// Reads every source into a `DocumentSet`, in order.
pub fn load_documents(sources: &[InputSource]) -> Result<DocumentSet> {
    let mut documents = DocumentSet::new();
    for source in sources {
        let content = match source {
            InputSource::Stdin => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read stdin")?;
                buf
            }
            InputSource::File(path) => fs::read_to_string(path)
                .with_context(|| format!("Error reading {}", path.display()))?,
        };
        documents.add(source.display_name(), content);
    }
    Ok(documents)
}
