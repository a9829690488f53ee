//! Resolution and lifecycle of reference ("expected output") artifacts.
//!
//! References live under a single root, addressed by a relative path derived
//! from the scenario name (plus an optional device suffix) and the artifact
//! file name. Under normal runs they are immutable; they are only created or
//! overwritten under an explicit regeneration [`Policy`].
//!
//! A reference is still created when it is missing under the strict default —
//! the comparison needs something concrete to run against, and the freshly
//! copied artifact is the best diagnostic available. The creation is recorded
//! and [`ReferenceStore::check_created`] turns it into a hard failure at case
//! teardown. Under an opt-in policy the same creations are only warned about.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::policy::Policy;

/// Resolves, creates, and validates reference artifacts under a content root.
pub struct ReferenceStore<'a> {
    root: PathBuf,
    policy: &'a Policy,
    created: Vec<PathBuf>,
}

impl<'a> ReferenceStore<'a> {
    pub fn new(root: impl Into<PathBuf>, policy: &'a Policy) -> Self {
        Self {
            root: root.into(),
            policy,
            created: Vec::new(),
        }
    }

    /// The expected-outputs root this store serves.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative reference name to its on-disk path.
    ///
    /// With `required`, a missing path is a [`Error::MissingInput`] failure.
    pub fn resolve(&self, relative: impl AsRef<Path>, required: bool) -> Result<PathBuf> {
        let path = self.root.join(relative.as_ref());
        if required && !path.exists() {
            return Err(Error::missing(path));
        }
        Ok(path)
    }

    /// Whether a reference already exists at the given relative name.
    pub fn exists(&self, relative: impl AsRef<Path>) -> bool {
        self.root.join(relative.as_ref()).exists()
    }

    /// Ensure a reference exists for a generated artifact, materializing it
    /// from the generated file or tree when absent (or always, under
    /// `regenerate_all`). Returns the reference path and whether it was
    /// created by this call.
    pub fn ensure_reference(
        &mut self,
        generated: &Path,
        relative: impl AsRef<Path>,
    ) -> Result<(PathBuf, bool)> {
        let reference = self.root.join(relative.as_ref());

        if reference.exists() && !self.policy.regenerate_all {
            return Ok((reference, false));
        }

        if !generated.exists() {
            return Err(Error::missing(generated));
        }

        materialize(generated, &reference)?;
        info!(reference = %reference.display(), "created reference");
        self.created.push(reference.clone());
        Ok((reference, true))
    }

    /// References created by this store so far.
    pub fn created(&self) -> &[PathBuf] {
        &self.created
    }

    /// End-of-case policy check.
    ///
    /// Under the strict default, any created reference fails the case with
    /// the full list of created paths; under an opt-in regeneration policy
    /// the same list is only warned about.
    pub fn check_created(&self) -> Result<()> {
        if self.created.is_empty() {
            return Ok(());
        }
        if self.policy.is_opt_in() {
            warn!(
                references = %self
                    .created
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
                "created references"
            );
            return Ok(());
        }
        Err(Error::UnexpectedReferenceCreation {
            references: self.created.clone(),
        })
    }
}

/// Copy a generated file or tree to the reference location.
///
/// Written to a temporary sibling first, then renamed into place, so a crash
/// mid-copy never leaves a half-written reference that later runs would treat
/// as accepted. The temporary lives in the destination's parent directory to
/// keep the final rename on the same filesystem.
fn materialize(source: &Path, destination: &Path) -> Result<()> {
    let parent = destination
        .parent()
        .ok_or_else(|| Error::msg(format!("reference path {} has no parent", destination.display())))?;
    fs::create_dir_all(parent)?;

    if source.is_file() {
        let tmp = tempfile::NamedTempFile::new_in(parent)?;
        fs::copy(source, tmp.path())?;
        tmp.persist(destination)
            .map_err(|err| Error::msg(format!("persisting {}: {err}", destination.display())))?;
    } else {
        let tmp = tempfile::tempdir_in(parent)?;
        let staged = tmp.path().join("staged");
        copy_tree(source, &staged)?;
        // Overwrite semantics for regenerate-all: clear the old tree first.
        if destination.exists() {
            fs::remove_dir_all(destination)?;
        }
        fs::rename(&staged, destination)?;
    }
    Ok(())
}

fn copy_tree(source: &Path, destination: &Path) -> Result<()> {
    fs::create_dir_all(destination)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let target = destination.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
