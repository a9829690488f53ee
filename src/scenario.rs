//! End-to-end scenario orchestration.
//!
//! A scenario is one named configuration of the transcription tool (its CLI
//! options) run against every input audio file. For each input the driver:
//! 1. probes the WAV duration to decide whether results are device-dependent
//!    (long inputs drift between compute backends, so their references are
//!    stored under a device-suffixed subtree)
//! 2. under `regenerate_new_only`, skips the input entirely when all of its
//!    reference artifacts already exist
//! 3. otherwise runs the tool and checks each generated artifact against its
//!    reference via the store and the tree comparator
//!
//! The scenario's scratch output directory is removed at teardown regardless
//! of the outcome, and the end-of-case created-references policy check runs
//! last so cleanup never masks the original failure.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::compare::compare_artifact;
use crate::config::Config;
use crate::device;
use crate::error::{Error, Result};
use crate::policy::Policy;
use crate::process::ProcessRunner;
use crate::store::ReferenceStore;
use crate::wav;

/// The extensions the tool writes for every input, as `<basename>.<ext>`.
pub const GENERATED_EXTENSIONS: [&str; 6] =
    ["txt", "srt", "vtt", "words.srt", "words.vtt", "words.json"];

/// Results longer than this are device-dependent for every scenario.
const ALWAYS_DEVICE_DEPENDENT_SECS: f64 = 60.0;

/// Results longer than this are device-dependent for sensitive scenarios.
const SENSITIVE_DEVICE_DEPENDENT_SECS: f64 = 30.0;

/// One named test case: a fixed set of tool options against the data set.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Logical case name; also the reference subtree and scratch dir name.
    pub name: String,

    /// Extra CLI options passed to the tool (after input and output args).
    pub options: Vec<String>,

    /// Explicit input file names (relative to the data dir). `None` runs the
    /// whole data directory, sorted by name.
    pub files: Option<Vec<String>>,

    /// Whether results drift across backends already past the 30s mark.
    ///
    /// Most configurations only drift past 60s; language-forced tiny-model
    /// runs are known to diverge earlier.
    pub device_sensitive_over_30s: bool,
}

impl Scenario {
    pub fn new(name: impl Into<String>, options: &[&str]) -> Self {
        Self {
            name: name.into(),
            options: options.iter().map(|s| s.to_string()).collect(),
            files: None,
            device_sensitive_over_30s: false,
        }
    }

    /// Mark this scenario as device-sensitive past 30 seconds.
    pub fn device_sensitive(mut self) -> Self {
        self.device_sensitive_over_30s = true;
        self
    }

    /// Restrict this scenario to an explicit input subset.
    pub fn with_files(mut self, files: &[&str]) -> Self {
        self.files = Some(files.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Whether results for an input of the given duration depend on the
    /// compute backend.
    pub fn is_device_dependent(&self, duration_secs: f64) -> bool {
        duration_secs > ALWAYS_DEVICE_DEPENDENT_SECS
            || (self.device_sensitive_over_30s && duration_secs > SENSITIVE_DEVICE_DEPENDENT_SECS)
    }

    /// The reference subtree name for an input of the given duration:
    /// the bare scenario name, or `<name>.<device>` when device-dependent.
    pub fn reference_prefix(&self, duration_secs: f64, device: &str) -> String {
        if self.is_device_dependent(duration_secs) {
            format!("{}.{}", self.name, device)
        } else {
            self.name.clone()
        }
    }
}

/// The built-in scenario set for the transcription tool under test.
pub fn builtin_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("tiny_auto", &["--model", "tiny"]),
        Scenario::new("tiny_fr", &["--model", "tiny", "--language", "fr"]).device_sensitive(),
        Scenario::new("medium_auto", &["--model", "medium"]),
        Scenario::new("medium_fr", &["--model", "medium", "--language", "fr"]),
    ]
}

/// The artifact file names the tool must produce for one input.
pub fn generated_artifacts(input: &Path) -> Vec<String> {
    let base = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    GENERATED_EXTENSIONS
        .iter()
        .map(|ext| format!("{base}.{ext}"))
        .collect()
}

/// Drives scenarios end to end against a shared configuration and policy.
pub struct Driver<'a> {
    config: &'a Config,
    policy: &'a Policy,
    device: String,
}

impl<'a> Driver<'a> {
    pub fn new(config: &'a Config, policy: &'a Policy) -> Self {
        Self {
            config,
            policy,
            device: device::detect(),
        }
    }

    /// Override the detected compute-backend identifier.
    ///
    /// Useful when the identifier must be pinned regardless of the machine
    /// the harness happens to run on.
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    /// Run one scenario against every selected input.
    ///
    /// The scratch directory is removed after all inputs regardless of the
    /// outcome; removal failures never mask a prior error.
    pub fn run_scenario(&self, scenario: &Scenario) -> Result<()> {
        let output_dir = self.config.output_root.join(&scenario.name);
        fs::create_dir_all(&output_dir)?;

        let mut store = ReferenceStore::new(&self.config.expected_dir, self.policy);
        let result = self.run_inputs(scenario, &output_dir, &mut store);

        let _ = fs::remove_dir_all(&output_dir);

        result?;
        store.check_created()
    }

    fn run_inputs(
        &self,
        scenario: &Scenario,
        output_dir: &Path,
        store: &mut ReferenceStore<'_>,
    ) -> Result<()> {
        for input in self.input_files(scenario)? {
            let duration = wav::duration_seconds(&input)?;
            let prefix = scenario.reference_prefix(duration, &self.device);
            let artifacts = generated_artifacts(&input);

            if self.policy.regenerate_new_only
                && artifacts
                    .iter()
                    .all(|name| store.exists(format!("{prefix}/{name}")))
            {
                info!(input = %input.display(), "references already exist, skipping");
                continue;
            }

            self.run_tool(scenario, &input, output_dir)?;

            for name in &artifacts {
                let generated = output_dir.join(name);
                if !generated.exists() {
                    return Err(Error::missing(generated));
                }
                let (reference, _) = store.ensure_reference(&generated, format!("{prefix}/{name}"))?;
                compare_artifact(&generated, &reference)?;
            }
        }
        Ok(())
    }

    fn run_tool(&self, scenario: &Scenario, input: &Path, output_dir: &Path) -> Result<()> {
        let mut tokens = self.config.tool.clone();
        tokens.push(input.display().to_string());
        tokens.push("--output_dir".into());
        tokens.push(output_dir.display().to_string());
        tokens.push("--json".into());
        tokens.push("True".into());
        tokens.extend(scenario.options.iter().cloned());

        let mut runner = ProcessRunner::new(output_dir);
        for (key, value) in &self.config.extra_env {
            runner = runner.env(key, value);
        }
        if let Some(interpreter) = &self.config.interpreter {
            runner = runner.interpreter(interpreter);
        }

        let output = runner.run(&tokens)?;
        info!(input = %input.display(), stdout = %output.stdout, "tool finished");
        Ok(())
    }

    /// The scenario's input files: its explicit subset, or every file in the
    /// data directory sorted by name.
    fn input_files(&self, scenario: &Scenario) -> Result<Vec<PathBuf>> {
        if let Some(files) = &scenario.files {
            return files
                .iter()
                .map(|name| {
                    let path = self.config.data_dir.join(name);
                    if path.is_file() {
                        Ok(path)
                    } else {
                        Err(Error::missing(path))
                    }
                })
                .collect();
        }

        if !self.config.data_dir.is_dir() {
            return Err(Error::missing(&self.config.data_dir));
        }
        let mut inputs = Vec::new();
        for entry in fs::read_dir(&self.config.data_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                inputs.push(entry.path());
            }
        }
        inputs.sort();
        Ok(inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_inputs_use_the_bare_scenario_name() {
        let scenario = Scenario::new("tiny_auto", &["--model", "tiny"]);
        assert_eq!(scenario.reference_prefix(3.0, "cpu"), "tiny_auto");
        assert_eq!(scenario.reference_prefix(30.0, "cuda"), "tiny_auto");
    }

    #[test]
    fn long_inputs_are_device_dependent_for_every_scenario() {
        let scenario = Scenario::new("tiny_fr", &["--model", "tiny", "--language", "fr"]);
        assert_eq!(scenario.reference_prefix(75.0, "cpu"), "tiny_fr.cpu");
        assert_eq!(scenario.reference_prefix(75.0, "cuda"), "tiny_fr.cuda");
    }

    #[test]
    fn sensitive_scenarios_split_references_past_thirty_seconds() {
        let sensitive =
            Scenario::new("tiny_fr", &["--model", "tiny", "--language", "fr"]).device_sensitive();
        let ordinary = Scenario::new("medium_fr", &["--model", "medium", "--language", "fr"]);

        assert_eq!(sensitive.reference_prefix(45.0, "cpu"), "tiny_fr.cpu");
        assert_eq!(ordinary.reference_prefix(45.0, "cpu"), "medium_fr");
    }

    #[test]
    fn six_artifacts_per_input() {
        let names = generated_artifacts(Path::new("/data/bonjour.wav"));
        assert_eq!(
            names,
            [
                "bonjour.wav.txt",
                "bonjour.wav.srt",
                "bonjour.wav.vtt",
                "bonjour.wav.words.srt",
                "bonjour.wav.words.vtt",
                "bonjour.wav.words.json",
            ]
        );
    }

    #[test]
    fn builtin_set_matches_the_tool_matrix() {
        let scenarios = builtin_scenarios();
        let names: Vec<_> = scenarios.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["tiny_auto", "tiny_fr", "medium_auto", "medium_fr"]);
        assert!(scenarios[1].device_sensitive_over_30s);
        assert!(!scenarios[3].device_sensitive_over_30s);
    }
}
