use anyhow::Result;
use clap::Parser;

use std::path::PathBuf;

use goldenear::config::Config;
use goldenear::logging;
use goldenear::policy::Policy;
use goldenear::scenario::{Driver, builtin_scenarios};

fn main() -> Result<()> {
    logging::init();
    let params = Params::parse();
    let policy = params.policy()?;
    let config = params.config()?;

    let scenarios: Vec<_> = builtin_scenarios()
        .into_iter()
        .filter(|s| params.scenario.is_empty() || params.scenario.contains(&s.name))
        .collect();
    anyhow::ensure!(!scenarios.is_empty(), "no scenario matches the selection");

    let driver = Driver::new(&config, &policy);
    let mut failures = 0usize;
    for scenario in &scenarios {
        match driver.run_scenario(scenario) {
            Ok(()) => println!("PASS {}", scenario.name),
            Err(err) => {
                failures += 1;
                eprintln!("FAIL {}\n{err}", scenario.name);
            }
        }
    }

    if failures > 0 {
        eprintln!("{failures} of {} scenarios failed", scenarios.len());
        std::process::exit(1);
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "goldenear")]
#[command(about = "Golden-master regression tests for a transcription CLI")]
struct Params {
    /// Command tokens invoking the tool under test (repeat for each token).
    #[arg(long = "tool", required = true, num_args = 1..)]
    pub tool: Vec<String>,

    /// Directory of input audio files.
    #[arg(long = "data-dir", default_value = "tests/data")]
    pub data_dir: PathBuf,

    /// Root of the expected-outputs tree.
    #[arg(long = "expected-dir", default_value = "tests/expected")]
    pub expected_dir: PathBuf,

    /// Root for scratch output directories (defaults to the system tempdir).
    #[arg(long = "output-root")]
    pub output_root: Option<PathBuf>,

    /// Run only the named scenarios (repeatable; default: all built-ins).
    #[arg(long = "scenario")]
    pub scenario: Vec<String>,

    /// Allow creation of missing references; warn instead of fail.
    #[arg(long = "generate", default_value_t = false)]
    pub generate: bool,

    /// As --generate, but skip inputs whose references already fully exist.
    #[arg(long = "generate-new", alias = "generate_new", default_value_t = false)]
    pub generate_new: bool,

    /// Force recreation of every reference, present or not.
    #[arg(long = "generate-all", alias = "generate_all", default_value_t = false)]
    pub generate_all: bool,

    /// Extra KEY=VALUE environment variables for the tool (repeatable).
    #[arg(long = "env")]
    pub env: Vec<String>,

    /// Interpreter prepended when the tool is a .py script.
    #[arg(long = "interpreter")]
    pub interpreter: Option<String>,
}

impl Params {
    fn policy(&self) -> Result<Policy> {
        // --generate-all dominates; --generate-new adds skipping on top of
        // --generate. All three clear the strict default.
        Ok(match (self.generate_all, self.generate_new, self.generate) {
            (true, _, _) => Policy::generate_all(),
            (false, true, _) => Policy::generate_new(),
            (false, false, true) => Policy::generate(),
            (false, false, false) => Policy::strict(),
        })
    }

    fn config(&self) -> Result<Config> {
        let mut extra_env = Vec::new();
        for pair in &self.env {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("--env expects KEY=VALUE, got `{pair}`"))?;
            extra_env.push((key.to_string(), value.to_string()));
        }
        Ok(Config {
            tool: self.tool.clone(),
            data_dir: self.data_dir.clone(),
            expected_dir: self.expected_dir.clone(),
            output_root: self
                .output_root
                .clone()
                .unwrap_or_else(std::env::temp_dir),
            extra_env,
            interpreter: self.interpreter.clone(),
        })
    }
}
