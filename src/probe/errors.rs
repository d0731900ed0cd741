//! Fatal configuration errors.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::{Key, Language};
use crate::util::diagnostic::{suggestions, Diagnostic};

/// An error that aborts the whole configuration run.
///
/// A single candidate failing is never one of these; the probe loop
/// rolls it back and moves on.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ConfigureError {
    #[error("no usable {} found (tried: {})", .language.describe(), display_tried(.tried))]
    #[diagnostic(
        code(berth::probe::no_usable_toolchain),
        help("install one of the candidates or point the override variable at a compiler")
    )]
    NoUsableToolchain {
        language: Language,
        tried: Vec<String>,
    },

    #[error("unable to find required program `{program}`")]
    #[diagnostic(code(berth::probe::missing_tool))]
    MissingTool { program: String, key: Key },
}

fn display_tried(tried: &[String]) -> String {
    if tried.is_empty() {
        "no candidates".to_string()
    } else {
        tried.join(", ")
    }
}

impl ConfigureError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ConfigureError::NoUsableToolchain { language, tried } => {
                let mut diag = Diagnostic::error(format!("no usable {} found", language.describe()));

                if tried.is_empty() {
                    diag = diag.with_context("the candidate list was empty");
                } else {
                    diag = diag.with_context(format!("tried: {}", tried.join(", ")));
                }

                diag.with_suggestion(suggestions::INSTALL_COMPILER)
                    .with_suggestion(format!(
                        "Set {} to the compiler you want to use",
                        language.override_var()
                    ))
                    .with_suggestion(suggestions::VERBOSE_PROBE)
            }

            ConfigureError::MissingTool { program, key } => {
                Diagnostic::error(format!("unable to find required program `{}`", program))
                    .with_context(format!("needed for {}", key))
                    .with_suggestion(format!(
                        "Set {} to the path of `{}`",
                        key.as_str(),
                        program
                    ))
                    .with_suggestion(suggestions::VERBOSE_PROBE)
            }
        }
    }
}
