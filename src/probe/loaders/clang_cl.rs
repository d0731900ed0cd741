//! Loader for LLVM's clang-cl.
//!
//! clang-cl speaks the MSVC command line, so the committed toolchain belongs
//! to the msvc family with `clang` recorded as the secondary name. Off
//! Windows it doubles as a cross compiler and needs `lld-link` in place of
//! the Microsoft linker.

use anyhow::{anyhow, bail, Context, Result};

use crate::core::{Key, Language, RegistryQuery, SearchSources};
use crate::probe::loader::{ProbeContext, ProbeOutcome, ToolchainLoader};

use super::gnu::parse_version;

/// MSVC compiler version clang-cl emulates when no Visual Studio is around.
const EMULATED_MSVC_VERSION: &str = "19";

/// `clang-cl`, located through `LLVM_PATH` and the LLVM install record.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClangClLoader;

/// Where the LLVM tools are searched.
fn llvm_sources() -> SearchSources {
    SearchSources::system()
        .with_override(Key::LlvmPath.as_str())
        .with_cached(Key::LlvmPath)
        .with_registry(RegistryQuery::llvm())
}

impl ClangClLoader {
    fn probe(&self, ctx: &mut ProbeContext<'_>) -> Result<()> {
        let language = ctx.language;
        if language == Language::Fortran {
            bail!("clang-cl is not a {}", language.describe());
        }

        // A compiler cached by an earlier run must not shadow clang-cl
        ctx.env.unset(Key::Cc);
        ctx.env.unset(Key::Cxx);

        let mut sources = llvm_sources();
        sources.overrides.insert(0, language.override_var().to_string());
        let compiler =
            ctx.find_program(&["clang-cl".to_string()], &sources, language.compiler_key())?;

        let output = ctx
            .run(&compiler, &["--version"])
            .with_context(|| format!("failed to run `{}`", compiler.display()))?;
        if !output.success() {
            bail!("`{} --version` exited with status {:?}", compiler.display(), output.status);
        }
        let version = parse_version(&output.combined())
            .ok_or_else(|| anyhow!("no version number in output of `{}`", compiler.display()))?;

        {
            let env = &mut *ctx.env;
            env.set(Key::Cc, compiler.as_path());
            env.set(Key::Cxx, compiler.as_path());
            env.set(Key::CcName, "msvc");
            env.set(Key::CxxName, "msvc");
            env.set(Key::CcNameSecondary, "clang");
            env.set(Key::CxxNameSecondary, "clang");
            env.set(language.version_key(), version);
            env.set(Key::MsvcCompiler, "msvc");
            env.set(Key::MsvcVersion, EMULATED_MSVC_VERSION);
            if let Some(dir) = compiler.parent() {
                env.set(Key::LlvmPath, dir);
            }
            if !env.is_set(Key::DestOs) {
                env.set(Key::DestOs, "win32");
            }
        }

        if !ctx.env.is_set(Key::LinkCxx) {
            let linkers: &[&str] = if ctx.host.platform().is_windows() {
                &["link", "lld-link"]
            } else {
                &["lld-link"]
            };
            let linkers: Vec<String> = linkers.iter().map(|l| l.to_string()).collect();
            ctx.find_program(&linkers, &llvm_sources(), Key::LinkCxx)
                .context("lld-link was not found (linker)")?;
        }
        if !ctx.env.is_set(Key::LinkCc) {
            let link = ctx.env.get_flat(Key::LinkCxx);
            ctx.env.set(Key::LinkCc, link);
        }

        Ok(())
    }
}

impl ToolchainLoader for ClangClLoader {
    fn load(&self, ctx: &mut ProbeContext<'_>) -> ProbeOutcome {
        self.probe(ctx).into()
    }
}
