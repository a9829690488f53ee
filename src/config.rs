use std::path::PathBuf;

/// Harness configuration shared across scenarios.
///
/// This struct represents *library-level configuration*, not CLI flags
/// directly. The CLI is responsible for mapping user input into this type so
/// that:
/// - the library remains reusable outside of a CLI context
/// - test suites can construct configurations programmatically
#[derive(Debug, Clone)]
pub struct Config {
    /// Command tokens invoking the transcription tool (program + fixed args).
    ///
    /// The scenario driver appends the input path, `--output_dir`, `--json
    /// True` and the scenario options after these.
    pub tool: Vec<String>,

    /// Directory of input audio files. Scenarios without an explicit file
    /// subset run against every file here, sorted by name.
    pub data_dir: PathBuf,

    /// Root of the expected-outputs tree.
    pub expected_dir: PathBuf,

    /// Root for per-scenario scratch output directories.
    ///
    /// Each scenario owns `output_root/<scenario name>`, created before the
    /// tool runs and removed best-effort at teardown.
    pub output_root: PathBuf,

    /// Extra environment variables passed to every tool invocation.
    ///
    /// This is how an interpreted tool is pointed at the same library search
    /// path the harness was launched with (e.g. `PYTHONPATH`).
    pub extra_env: Vec<(String, String)>,

    /// Interpreter prepended when the tool is a `.py` script.
    pub interpreter: Option<String>,
}

impl Config {
    /// A configuration with conventional defaults rooted at `base`:
    /// data under `base/tests/data`, references under `base/tests/expected`,
    /// scratch output under the system temp directory.
    pub fn rooted_at(tool: Vec<String>, base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            tool,
            data_dir: base.join("tests/data"),
            expected_dir: base.join("tests/expected"),
            output_root: std::env::temp_dir(),
            extra_env: Vec::new(),
            interpreter: None,
        }
    }
}
