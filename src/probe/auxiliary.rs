//! Secondary tools: archiver, manifest tool, resource compiler.
//!
//! These are located after a compiler has been committed. A required tool
//! that is missing aborts the run; an optional one only turns its feature
//! off.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::{
    Environment, Key, RegistryQuery, SearchSources, ToolDescriptor, ToolchainFamily,
};
use crate::util::shell::Shell;

use super::errors::ConfigureError;
use super::locator::ToolLocator;

/// Shown when no resource compiler can be found.
pub const RESOURCE_COMPILER_WARNING: &str =
    "Resource compiler not found. Compiling resource file is disabled";

/// A tool that was located.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundTool {
    pub key: Key,
    pub path: PathBuf,
}

/// Outcome of assembling the secondary tools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuxiliaryReport {
    pub found: Vec<FoundTool>,
    /// Optional tools that were missing, by the key they would have set
    pub disabled: Vec<Key>,
}

/// The secondary tools a toolchain family needs.
///
/// When the committed compiler is clang-cl (`CC_NAME_SECONDARY=clang`), the
/// LLVM flavours of the MSVC tools are preferred.
pub fn tools_for(family: ToolchainFamily, env: &Environment) -> Vec<ToolDescriptor> {
    match family {
        ToolchainFamily::Gnu => vec![
            ToolDescriptor::required("ar", Key::Ar)
                .or_program("llvm-ar")
                .with_flags(Key::ArFlags, &["rcs"]),
            ToolDescriptor::optional("ranlib", Key::Ranlib).or_program("llvm-ranlib"),
        ],
        ToolchainFamily::Msvc => {
            let llvm_first = env.get_str(Key::CcNameSecondary) == Some("clang");
            let pick = |native: &str, llvm: &str| {
                if llvm_first {
                    (llvm.to_string(), native.to_string())
                } else {
                    (native.to_string(), llvm.to_string())
                }
            };

            let (first, second) = pick("lib", "llvm-lib");
            let lib = ToolDescriptor::required(first, Key::Ar)
                .or_program(second)
                .with_flags(Key::ArFlags, &["/nologo"])
                .with_sources(llvm_sources(Key::Ar));

            let (first, second) = pick("mt", "llvm-mt");
            let mt = ToolDescriptor::optional(first, Key::Mt)
                .or_program(second)
                .with_flags(Key::MtFlags, &["/nologo"])
                .with_feature(Key::MsvcManifest)
                .with_sources(llvm_sources(Key::Mt));

            let (first, second) = pick("rc", "llvm-rc");
            let rc = ToolDescriptor::optional(first, Key::WinRc)
                .or_program(second)
                .with_flags(Key::WinRcFlags, &["/nologo"])
                .with_feature(Key::WinRcEnabled)
                .with_warning(RESOURCE_COMPILER_WARNING)
                .with_sources(llvm_sources(Key::WinRc));

            vec![lib, mt, rc]
        }
    }
}

/// Search sources for a tool that may ship with LLVM.
fn llvm_sources(key: Key) -> SearchSources {
    SearchSources::system()
        .with_override(key.as_str())
        .with_cached(key)
        .with_override(Key::LlvmPath.as_str())
        .with_cached(Key::LlvmPath)
        .with_registry(RegistryQuery::llvm())
}

/// Locate every tool in `tools` and record the results in `env`.
pub fn assemble(
    env: &mut Environment,
    locator: &ToolLocator,
    tools: &[ToolDescriptor],
    shell: &Shell,
) -> Result<AuxiliaryReport, ConfigureError> {
    let mut report = AuxiliaryReport::default();

    for tool in tools {
        let located = locator.locate_any(&tool.programs, &tool.sources, env);

        match located.into_path() {
            Some(path) => {
                shell.check(format!("'{}'", tool.name()), path.display());
                env.set(tool.key, path.as_path());
                if let Some((flags_key, flags)) = &tool.flags {
                    if !env.is_set(*flags_key) {
                        env.set(*flags_key, flags.clone());
                    }
                }
                if let Some(feature) = tool.feature {
                    env.set(feature, true);
                }
                report.found.push(FoundTool {
                    key: tool.key,
                    path,
                });
            }
            None if tool.is_required() => {
                shell.check(format!("'{}'", tool.name()), "not found");
                return Err(ConfigureError::MissingTool {
                    program: tool.name().to_string(),
                    key: tool.key,
                });
            }
            None => {
                shell.check(format!("'{}'", tool.name()), "not found");
                env.unset(tool.key);
                if let Some(feature) = tool.feature {
                    env.set(feature, false);
                }
                match &tool.warning {
                    Some(message) => {
                        tracing::warn!("{}", message);
                        shell.warn(message);
                    }
                    None => tracing::warn!("optional program `{}` not found", tool.name()),
                }
                report.disabled.push(tool.key);
            }
        }
    }

    Ok(report)
}
