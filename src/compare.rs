//! Comparison of generated artifacts against their references.
//!
//! Two shapes are supported:
//! - a single file, compared directly
//! - a directory tree, where every file must exist on *both* sides at the
//!   same relative path before its contents are compared
//!
//! Per-file comparison routes on the file name: anything ending in `.json`
//! is parsed and compared under loosened equality (see [`crate::approx`]);
//! everything else compares as an ordered sequence of lines with exact string
//! equality — no newline or trailing-whitespace normalization. Subtitle
//! output is deterministic once timestamps are rendered, so strictness there
//! costs nothing and catches formatting regressions.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::approx::{Mismatch, approx_diff};
use crate::error::{Error, Result};

/// A single discrepancy between a generated tree and its reference.
#[derive(Debug, Clone)]
pub enum Discrepancy {
    /// Present under the reference, absent from the generated output.
    MissingFile(PathBuf),

    /// Present in the generated output, absent from the reference.
    ExtraFile(PathBuf),

    /// Both sides have the file but the contents differ.
    ContentMismatch {
        file: PathBuf,
        details: Vec<String>,
    },
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::MissingFile(path) => write!(f, "missing file: {}", path.display()),
            Discrepancy::ExtraFile(path) => {
                write!(f, "extra file (no reference): {}", path.display())
            }
            Discrepancy::ContentMismatch { file, details } => {
                writeln!(f, "content mismatch in {}:", file.display())?;
                for detail in details {
                    writeln!(f, "  {detail}")?;
                }
                Ok(())
            }
        }
    }
}

/// Compare a generated artifact against its reference.
///
/// Routes on shape: file against file, or directory tree against directory
/// tree. Every discrepancy found is collected into a single
/// [`Error::ComparisonMismatch`] so one run reports the whole damage, not
/// just the first difference.
pub fn compare_artifact(generated: &Path, reference: &Path) -> Result<()> {
    if !generated.exists() {
        return Err(Error::missing(generated));
    }

    let discrepancies = if generated.is_file() {
        match compare_files(generated, reference)? {
            Some(details) => vec![Discrepancy::ContentMismatch {
                file: generated.to_path_buf(),
                details,
            }],
            None => Vec::new(),
        }
    } else {
        compare_trees(generated, reference)?
    };

    if discrepancies.is_empty() {
        return Ok(());
    }

    let report = discrepancies
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    Err(Error::ComparisonMismatch {
        artifact: generated.to_path_buf(),
        report,
    })
}

/// Compare two directory trees file-by-file.
///
/// Walks the generated side first so content mismatches surface in generated
/// order, then sweeps the reference side for files the tool failed to emit.
pub fn compare_trees(generated: &Path, reference: &Path) -> Result<Vec<Discrepancy>> {
    let mut discrepancies = Vec::new();

    for relative in walk_files(generated)? {
        let ref_file = reference.join(&relative);
        if !ref_file.is_file() {
            discrepancies.push(Discrepancy::ExtraFile(relative));
            continue;
        }
        if let Some(details) = compare_files(&generated.join(&relative), &ref_file)? {
            discrepancies.push(Discrepancy::ContentMismatch {
                file: relative,
                details,
            });
        }
    }

    for relative in walk_files(reference)? {
        if !generated.join(&relative).is_file() {
            discrepancies.push(Discrepancy::MissingFile(relative));
        }
    }

    Ok(discrepancies)
}

/// Compare two files, returning `None` on a match or the list of
/// human-readable differences on a mismatch.
///
/// `.json` files are parsed and compared under loosened equality; everything
/// else compares line-by-line, exactly.
pub fn compare_files(generated: &Path, reference: &Path) -> Result<Option<Vec<String>>> {
    if is_structured(generated) {
        let gen_value: serde_json::Value = serde_json::from_str(&read(generated)?)?;
        let ref_value: serde_json::Value = serde_json::from_str(&read(reference)?)?;
        let diff = approx_diff(&ref_value, &gen_value);
        if diff.is_empty() {
            return Ok(None);
        }
        return Ok(Some(diff.iter().map(Mismatch::to_string).collect()));
    }

    let gen_text = read(generated)?;
    let ref_text = read(reference)?;
    if gen_text == ref_text {
        return Ok(None);
    }

    let mut details = Vec::new();
    let gen_lines: Vec<&str> = gen_text.split_inclusive('\n').collect();
    let ref_lines: Vec<&str> = ref_text.split_inclusive('\n').collect();
    for (idx, (gen_line, ref_line)) in gen_lines.iter().zip(&ref_lines).enumerate() {
        if gen_line != ref_line {
            details.push(format!(
                "line {}: expected {:?}, got {:?}",
                idx + 1,
                ref_line,
                gen_line
            ));
        }
    }
    if gen_lines.len() != ref_lines.len() {
        details.push(format!(
            "expected {} lines, got {}",
            ref_lines.len(),
            gen_lines.len()
        ));
    }
    Ok(Some(details))
}

fn is_structured(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

fn read(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(Error::missing(path));
    }
    Ok(fs::read_to_string(path)?)
}

/// List every file under `root`, as paths relative to `root`, sorted by name
/// so reports (and comparisons) are deterministic across platforms.
fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|err| Error::msg(format!("walking {}: {err}", root.display())))?;
        if entry.file_type().is_file() {
            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|err| Error::msg(format!("stripping {}: {err}", root.display())))?;
            files.push(relative.to_path_buf());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn identical_trees_compare_clean() -> anyhow::Result<()> {
        let generated = tempfile::tempdir()?;
        let reference = tempfile::tempdir()?;
        for dir in [generated.path(), reference.path()] {
            write(dir, "video.srt", "1\n00:00:00,000 --> 00:00:01,000\nhi\n");
            write(dir, "video.words.json", r#"{"start": 0.11}"#);
        }
        // The json sides differ within tolerance on purpose.
        write(reference.path(), "video.words.json", r#"{"start": 0.14}"#);

        compare_artifact(generated.path(), reference.path())?;
        Ok(())
    }

    #[test]
    fn missing_file_is_named_explicitly() -> anyhow::Result<()> {
        let generated = tempfile::tempdir()?;
        let reference = tempfile::tempdir()?;
        write(reference.path(), "video.srt", "1\n");

        let err = compare_artifact(generated.path(), reference.path()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("missing file: video.srt"), "{message}");
        assert!(!message.contains("content mismatch"), "{message}");
        Ok(())
    }

    #[test]
    fn extra_file_is_distinguished_from_missing() -> anyhow::Result<()> {
        let generated = tempfile::tempdir()?;
        let reference = tempfile::tempdir()?;
        write(generated.path(), "stray.txt", "oops\n");

        let discrepancies = compare_trees(generated.path(), reference.path())?;
        assert_eq!(discrepancies.len(), 1);
        assert!(matches!(&discrepancies[0], Discrepancy::ExtraFile(p) if p == Path::new("stray.txt")));
        Ok(())
    }

    #[test]
    fn text_comparison_is_strict_about_whitespace() -> anyhow::Result<()> {
        let generated = tempfile::tempdir()?;
        let reference = tempfile::tempdir()?;
        write(generated.path(), "out.txt", "bonjour \n");
        write(reference.path(), "out.txt", "bonjour\n");

        let err = compare_artifact(generated.path(), reference.path()).unwrap_err();
        assert!(err.to_string().contains("line 1"), "{err}");
        Ok(())
    }

    #[test]
    fn trailing_line_count_mismatch_is_reported() -> anyhow::Result<()> {
        let generated = tempfile::tempdir()?;
        let reference = tempfile::tempdir()?;
        write(generated.path(), "out.txt", "a\n");
        write(reference.path(), "out.txt", "a\nb\n");

        let details = compare_files(
            &generated.path().join("out.txt"),
            &reference.path().join("out.txt"),
        )?
        .expect("must differ");
        assert!(details.iter().any(|d| d.contains("expected 2 lines, got 1")));
        Ok(())
    }

    #[test]
    fn json_files_compare_under_tolerance() -> anyhow::Result<()> {
        let generated = tempfile::tempdir()?;
        let reference = tempfile::tempdir()?;
        write(
            generated.path(),
            "a.words.json",
            r#"{"segments": [{"start": 1.23, "text": "hi"}]}"#,
        );
        write(
            reference.path(),
            "a.words.json",
            r#"{"segments": [{"start": 1.18, "text": "hi"}]}"#,
        );

        compare_artifact(generated.path(), reference.path())?;

        // Now push the drift beyond a decimal place.
        write(
            generated.path(),
            "a.words.json",
            r#"{"segments": [{"start": 1.43, "text": "hi"}]}"#,
        );
        let err = compare_artifact(generated.path(), reference.path()).unwrap_err();
        assert!(err.to_string().contains("/segments/0/start"), "{err}");
        Ok(())
    }

    #[test]
    fn single_file_comparison_skips_tree_walk() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        write(dir.path(), "gen.txt", "same\n");
        write(dir.path(), "ref.txt", "same\n");
        compare_artifact(&dir.path().join("gen.txt"), &dir.path().join("ref.txt"))?;
        Ok(())
    }

    #[test]
    fn absent_generated_artifact_is_a_missing_input() {
        let err = compare_artifact(Path::new("/nonexistent/gen"), Path::new("/nonexistent/ref"))
            .unwrap_err();
        assert!(matches!(err, Error::MissingInput { .. }));
    }
}
