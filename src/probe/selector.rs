//! The probe loop.
//!
//! Candidates are tried in order against one shared [`Environment`]. Each
//! probe runs between a snapshot and either a commit or a rollback, so a
//! failed probe leaves no trace and the first success wins.

use serde::Serialize;

use crate::core::{EnvDelta, Environment, Key, Language};
use crate::util::shell::Shell;

use super::errors::ConfigureError;
use super::loader::{Host, LoaderRegistry, ProbeContext, ProbeOutcome};

/// How a single probe ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "detail", rename_all = "kebab-case")]
pub enum Verdict {
    /// The probe succeeded and was committed.
    Committed {
        identity: String,
        /// Keys the probe added, changed or removed
        delta: EnvDelta,
    },
    /// The loader reported failure; its writes were discarded.
    Failed(String),
    /// The loader claimed success without setting the compiler key.
    NoIdentity,
}

/// Record of one probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub candidate: String,
    #[serde(flatten)]
    pub verdict: Verdict,
}

/// The committed choice for a language.
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    pub language: Language,
    /// Name of the winning candidate
    pub candidate: String,
    /// `TOOLCHAIN_IDENTITY` written at commit
    pub identity: String,
    /// Number of keys the winning probe touched
    pub changed_keys: usize,
    /// Every probe in order, the last one being the commit
    pub reports: Vec<ProbeReport>,
}

/// Runs candidates against an environment until one commits.
pub struct ToolchainSelector<'a> {
    loaders: &'a LoaderRegistry,
    host: &'a Host,
}

impl<'a> ToolchainSelector<'a> {
    pub fn new(loaders: &'a LoaderRegistry, host: &'a Host) -> Self {
        ToolchainSelector { loaders, host }
    }

    /// Select a toolchain for `language` from `candidates`, in order.
    ///
    /// On success the environment holds exactly the winning probe's writes
    /// plus the selection keys. On failure it is left as it was on entry.
    pub fn select(
        &self,
        env: &mut Environment,
        language: Language,
        candidates: &[String],
        shell: &Shell,
    ) -> Result<Selection, ConfigureError> {
        let mut reports = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let subject = format!("'{}' ({})", candidate, language.describe());
            let snapshot = env.snapshot();
            clear_stale_compiler(env, language, candidate);

            let outcome = match self.loaders.get(candidate) {
                Some(loader) => {
                    let mut ctx = ProbeContext::new(env, self.host, language);
                    loader.load(&mut ctx)
                }
                None => ProbeOutcome::failure(format!("no loader registered for `{}`", candidate)),
            };

            let verdict = match outcome {
                ProbeOutcome::Failure(reason) => {
                    env.restore(snapshot);
                    tracing::debug!("probe `{}` failed: {}", candidate, reason);
                    shell.check(&subject, "not found");
                    Verdict::Failed(reason)
                }
                ProbeOutcome::Success if !env.is_set(language.compiler_key()) => {
                    env.restore(snapshot);
                    tracing::debug!(
                        "probe `{}` succeeded without setting {}",
                        candidate,
                        language.compiler_key()
                    );
                    shell.check(&subject, "not found");
                    Verdict::NoIdentity
                }
                ProbeOutcome::Success => {
                    let delta = env.diff(&snapshot);
                    let identity = identity_of(env, language, candidate);

                    env.set(language.selection_key(), candidate.as_str());
                    env.set(Key::ToolchainName, candidate.as_str());
                    env.set(Key::ToolchainIdentity, identity.as_str());

                    tracing::info!("selected {} `{}` ({})", language, candidate, identity);
                    shell.check(&subject, env.get_flat(language.compiler_key()));

                    let changed_keys = delta.len();
                    let report = ProbeReport {
                        candidate: candidate.clone(),
                        verdict: Verdict::Committed {
                            identity: identity.clone(),
                            delta,
                        },
                    };
                    self.emit_json(shell, language, &report);
                    reports.push(report);

                    return Ok(Selection {
                        language,
                        candidate: candidate.clone(),
                        identity,
                        changed_keys,
                        reports,
                    });
                }
            };

            let report = ProbeReport {
                candidate: candidate.clone(),
                verdict,
            };
            self.emit_json(shell, language, &report);
            reports.push(report);
        }

        Err(ConfigureError::NoUsableToolchain {
            language,
            tried: candidates.to_vec(),
        })
    }

    fn emit_json(&self, shell: &Shell, language: Language, report: &ProbeReport) {
        if !shell.is_json() {
            return;
        }
        let mut event = serde_json::json!({
            "reason": "probe",
            "language": language,
        });
        if let (Some(obj), Ok(serde_json::Value::Object(fields))) =
            (event.as_object_mut(), serde_json::to_value(report))
        {
            obj.extend(fields);
        }
        shell.json_event(&event);
    }
}

/// Drop the compiler keys a previous run committed for `language`, unless
/// that run selected `candidate` too. The candidate's snapshot brings them
/// back if it fails.
fn clear_stale_compiler(env: &mut Environment, language: Language, candidate: &str) {
    if !env.contains(language.compiler_key())
        || env.get_str(language.selection_key()) == Some(candidate)
    {
        return;
    }
    tracing::debug!(
        "ignoring cached {} from a previous selection",
        language.compiler_key()
    );
    for key in [
        language.compiler_key(),
        language.name_key(),
        language.version_key(),
        language.link_key(),
    ] {
        env.unset(key);
    }
    if let Some(key) = language.secondary_name_key() {
        env.unset(key);
    }
}

/// Identity string for a committed probe.
///
/// A secondary name (`clang` for clang-cl) replaces the family name when set.
fn identity_of(env: &Environment, language: Language, candidate: &str) -> String {
    let secondary = language
        .secondary_name_key()
        .map(|key| env.get_flat(key))
        .unwrap_or_default();
    let family = if secondary.is_empty() {
        env.get_flat(language.name_key())
    } else {
        secondary
    };
    let version = env.get_flat(language.version_key());

    match (family.is_empty(), version.is_empty()) {
        (false, false) => format!("{}-{}", family, version),
        (true, false) => format!("{}-{}", candidate, version),
        _ => env.get_flat(language.compiler_key()),
    }
}
