//! JSON artifacts consumed by the engine, and how they reach the disk.
//!
//! Every artifact is keyed by piece name (`"bishop"`, `"rook"`) and lists squares
//! 0..63 in board order. Attack table slots no occupancy hashes to are `null`.
//!
//! Files are staged next to their destination as `<name>.tmp` and renamed into
//! place only once every artifact has been written and synced. Existing files are
//! moved aside to `<name>.bak` first and put back if a later rename fails, so a
//! failed run never leaves a half-written or mismatched set behind.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::OutputPaths;
use crate::error::GenError;
use crate::table::MagicTables;
use crate::types::{Bitboard, PerPiece};

/// `{"bishop": [64 magics], "rook": [64 magics]}`
pub type MagicArtifact = PerPiece<Vec<u64>>;
/// `{"bishop": [64 x 512 slots], "rook": [64 x 4096 slots]}`
pub type AttackArtifact = PerPiece<Vec<Vec<Option<Bitboard>>>>;
/// `{"bishop": [64 masks], "rook": [64 masks]}`
pub type BlockerArtifact = PerPiece<Vec<Bitboard>>;

/// Record of how a table set was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub generated_at: String,
    pub generator: String,
    pub seed: u64,
    pub attempt_budget: u64,
    pub index_bits: PerPiece<u8>,
    pub attempts: PerPiece<Vec<u64>>,
}

/// Everything one run writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub magics: MagicArtifact,
    pub attacks: AttackArtifact,
    pub blockers: BlockerArtifact,
    pub manifest: Manifest,
}

impl Artifacts {
    pub fn from_tables(tables: &MagicTables) -> Self {
        Artifacts {
            magics: tables.magics.clone(),
            attacks: tables.attacks.clone(),
            blockers: tables.masks.clone(),
            manifest: Manifest {
                generated_at: chrono::Utc::now().to_rfc3339(),
                generator: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
                seed: tables.seed,
                attempt_budget: tables.attempt_budget,
                index_bits: tables.bits.clone(),
                attempts: tables.attempts.clone(),
            },
        }
    }
}

fn staging_path(path: &Path) -> PathBuf {
    sibling_path(path, ".tmp")
}

/// Write `value` as JSON to the staging path for `path`, flushed and synced.
/// The staged file is removed again if any step fails.
fn stage_json<T: Serialize>(path: &Path, value: &T) -> Result<PathBuf, GenError> {
    let staged = staging_path(path);
    write_synced(&staged, value).map_err(|source| {
        let _ = fs::remove_file(&staged);
        GenError::Serialization { path: staged.clone(), source }
    })?;
    Ok(staged)
}

fn write_synced<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error())?.sync_all()
}

fn stage_all<'p>(
    artifacts: &Artifacts,
    paths: &'p OutputPaths,
    staged: &mut Vec<(PathBuf, &'p Path)>,
) -> Result<(), GenError> {
    staged.push((stage_json(&paths.magics, &artifacts.magics)?, &paths.magics));
    staged.push((stage_json(&paths.attacks, &artifacts.attacks)?, &paths.attacks));
    staged.push((stage_json(&paths.blockers, &artifacts.blockers)?, &paths.blockers));
    if let Some(manifest) = paths.manifest.as_deref() {
        staged.push((stage_json(manifest, &artifacts.manifest)?, manifest));
    }
    Ok(())
}

fn discard(staged: &[(PathBuf, &Path)]) {
    for (tmp, _) in staged {
        let _ = fs::remove_file(tmp);
    }
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// A destination that now holds a new artifact, and where its previous file went.
struct Placed<'p> {
    dest: &'p Path,
    backup: Option<PathBuf>,
}

/// Move an existing destination file aside. Anything that is not a regular file
/// is left for the rename to reject.
fn set_aside(dest: &Path) -> std::io::Result<Option<PathBuf>> {
    match fs::symlink_metadata(dest) {
        Ok(meta) if meta.is_file() => {
            let backup = sibling_path(dest, ".bak");
            fs::rename(dest, &backup)?;
            Ok(Some(backup))
        }
        _ => Ok(None),
    }
}

fn restore(placed: &Placed) {
    let undone = match &placed.backup {
        Some(backup) => fs::rename(backup, placed.dest),
        None => fs::remove_file(placed.dest),
    };
    if let Err(e) = undone {
        error!(path = %placed.dest.display(), error = %e, "could not restore previous artifact");
    }
}

/// Rename every staged file over its destination. On failure the destinations
/// already replaced get their previous contents back.
fn commit<'p>(staged: &[(PathBuf, &'p Path)]) -> Result<Vec<Placed<'p>>, GenError> {
    let mut placed: Vec<Placed<'p>> = Vec::with_capacity(staged.len());
    for (i, (tmp, dest)) in staged.iter().enumerate() {
        let result = set_aside(dest).and_then(|backup| match fs::rename(tmp, dest) {
            Ok(()) => Ok(backup),
            Err(e) => {
                if let Some(backup) = &backup {
                    let _ = fs::rename(backup, dest);
                }
                Err(e)
            }
        });
        match result {
            Ok(backup) => placed.push(Placed { dest: *dest, backup }),
            Err(source) => {
                error!(path = %dest.display(), error = %source, "artifact rename failed, rolling back");
                placed.iter().rev().for_each(restore);
                discard(&staged[i..]);
                return Err(GenError::Serialization { path: dest.to_path_buf(), source });
            }
        }
    }
    Ok(placed)
}

/// Write all artifacts, or none of them.
pub fn write_artifacts(artifacts: &Artifacts, paths: &OutputPaths) -> Result<(), GenError> {
    let mut staged = Vec::with_capacity(4);
    if let Err(e) = stage_all(artifacts, paths, &mut staged) {
        error!(error = %e, "artifact write failed, discarding staged files");
        discard(&staged);
        return Err(e);
    }

    for placed in commit(&staged)? {
        if let Some(backup) = &placed.backup {
            let _ = fs::remove_file(backup);
        }
        info!(path = %placed.dest.display(), "wrote artifact");
    }
    Ok(())
}

/// Read a JSON artifact back
pub fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, GenError> {
    let file = File::open(path).map_err(|source| GenError::Serialization {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| GenError::Json {
        path: path.to_path_buf(),
        source,
    })
}
