/// Run-wide reference regeneration policy.
///
/// This struct represents *run-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping its switches into this type so that:
/// - the library remains reusable outside of a CLI context
/// - other frontends (test suites, batch jobs) can construct a policy programmatically
///
/// The policy is built once at the start of a run and passed by reference
/// into every component that needs it. It is never mutated mid-run.
#[derive(Debug, Clone)]
pub struct Policy {
    /// Whether a missing reference fails the case.
    ///
    /// Under the strict default, a reference is still created so that the
    /// comparison can run against something concrete, but the case fails at
    /// teardown with the full list of created paths.
    pub fail_if_reference_missing: bool,

    /// Skip re-running inputs whose references already fully exist.
    ///
    /// Used to fill gaps in the reference tree without recomputing results
    /// that are already accepted.
    pub regenerate_new_only: bool,

    /// Recreate every reference, even those that already exist.
    ///
    /// Dominates creation decisions: when set, `regenerate_new_only` never
    /// causes a skip to matter because every reference is rewritten anyway.
    pub regenerate_all: bool,
}

impl Policy {
    /// The strict default: references must pre-exist; any creation fails the case.
    pub fn strict() -> Self {
        Self {
            fail_if_reference_missing: true,
            regenerate_new_only: false,
            regenerate_all: false,
        }
    }

    /// Allow creation of missing references; warn instead of fail.
    pub fn generate() -> Self {
        Self {
            fail_if_reference_missing: false,
            regenerate_new_only: false,
            regenerate_all: false,
        }
    }

    /// As [`Policy::generate`], but additionally skip inputs whose references
    /// already fully exist.
    pub fn generate_new() -> Self {
        Self {
            fail_if_reference_missing: false,
            regenerate_new_only: true,
            regenerate_all: false,
        }
    }

    /// Force recreation of every reference, present or not.
    pub fn generate_all() -> Self {
        Self {
            fail_if_reference_missing: false,
            regenerate_new_only: false,
            regenerate_all: true,
        }
    }

    /// Whether any regeneration mode was explicitly opted into.
    pub fn is_opt_in(&self) -> bool {
        !self.fail_if_reference_missing || self.regenerate_new_only || self.regenerate_all
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::strict()
    }
}
