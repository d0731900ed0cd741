//! Loader for the Microsoft C/C++ compiler.

use std::sync::LazyLock;

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;

use crate::core::{Key, Language, SearchSources};
use crate::probe::loader::{ProbeContext, ProbeOutcome, ToolchainLoader};

static BANNER_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Version\s+(\d+)\.(\d+)(?:\.(\d+))?").expect("valid banner pattern")
});

/// Parse `(full version, major)` from a `cl` banner.
pub fn parse_banner(banner: &str) -> Option<(String, String)> {
    if !banner.contains("Microsoft") {
        return None;
    }
    let caps = BANNER_VERSION.captures(banner)?;
    let major = caps[1].to_string();
    let full = match caps.get(3) {
        Some(build) => format!("{}.{}.{}", major, &caps[2], build.as_str()),
        None => format!("{}.{}", major, &caps[2]),
    };
    Some((full, major))
}

/// `cl.exe`, identified from the banner it prints when run without arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsvcLoader;

impl MsvcLoader {
    fn probe(&self, ctx: &mut ProbeContext<'_>) -> Result<()> {
        let language = ctx.language;
        if language == Language::Fortran {
            bail!("msvc is not a {}", language.describe());
        }

        let sources = SearchSources::system()
            .with_override(language.override_var())
            .with_cached(language.compiler_key());
        let cl = ctx.find_program(&["cl".to_string()], &sources, language.compiler_key())?;

        // cl prints its banner on stderr and exits non-zero without input files
        let output = ctx
            .run(&cl, &[])
            .with_context(|| format!("failed to run `{}`", cl.display()))?;
        let (version, major) = parse_banner(&output.combined())
            .ok_or_else(|| anyhow!("`{}` is not the Microsoft compiler", cl.display()))?;

        let link_sources = SearchSources::system().with_cached(language.link_key());
        ctx.find_program(&["link".to_string()], &link_sources, language.link_key())?;

        let env = &mut *ctx.env;
        env.set(language.name_key(), "msvc");
        env.set(language.version_key(), version);
        env.set(Key::MsvcCompiler, "msvc");
        env.set(Key::MsvcVersion, major);
        if !env.is_set(Key::DestOs) {
            env.set(Key::DestOs, ctx.host.platform().dest_os());
        }

        Ok(())
    }
}

impl ToolchainLoader for MsvcLoader {
    fn load(&self, ctx: &mut ProbeContext<'_>) -> ProbeOutcome {
        self.probe(ctx).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Environment, Overrides, PlatformKey};
    use crate::test_support::{
        bin, compiler_outputs, test_host, MockExecutor, MockFinder, MockProcessOutput,
    };

    #[test]
    fn test_parse_banner() {
        assert_eq!(
            parse_banner("Microsoft (R) C/C++ Optimizing Compiler Version 19.36.32532 for x64"),
            Some(("19.36.32532".to_string(), "19".to_string()))
        );
        assert_eq!(parse_banner("clang version 17.0.1"), None);
    }

    #[test]
    fn test_msvc_probe() {
        let mut exec = MockExecutor::new();
        exec.expect(&bin("cl"), compiler_outputs::msvc_banner());
        let host = test_host(
            PlatformKey::Win32,
            Overrides::new(),
            MockFinder::new()
                .with_program(bin("cl"))
                .with_program(bin("link")),
            exec,
        );

        let mut env = Environment::new();
        let outcome = MsvcLoader.load(&mut ProbeContext::new(&mut env, &host, Language::Cxx));

        assert_eq!(outcome, ProbeOutcome::Success);
        assert_eq!(env.get_str(Key::Cxx), Some("/usr/bin/cl"));
        assert_eq!(env.get_str(Key::CxxName), Some("msvc"));
        assert_eq!(env.get_str(Key::CxxVersion), Some("19.36.32532"));
        assert_eq!(env.get_str(Key::LinkCxx), Some("/usr/bin/link"));
        assert_eq!(env.get_str(Key::MsvcVersion), Some("19"));
        assert_eq!(env.get_str(Key::DestOs), Some("win32"));
    }

    #[test]
    fn test_impostor_cl_fails() {
        let mut exec = MockExecutor::new();
        exec.expect(&bin("cl"), MockProcessOutput::success("cl: command list tool 1.0"));
        let host = test_host(
            PlatformKey::Win32,
            Overrides::new(),
            MockFinder::new().with_program(bin("cl")),
            exec,
        );

        let mut env = Environment::new();
        let outcome = MsvcLoader.load(&mut ProbeContext::new(&mut env, &host, Language::C));
        assert!(matches!(
            outcome,
            ProbeOutcome::Failure(ref r) if r.contains("not the Microsoft compiler")
        ));
    }

    #[test]
    fn test_missing_linker_fails() {
        let mut exec = MockExecutor::new();
        exec.expect(&bin("cl"), compiler_outputs::msvc_banner());
        let host = test_host(
            PlatformKey::Win32,
            Overrides::new(),
            MockFinder::new().with_program(bin("cl")),
            exec,
        );

        let mut env = Environment::new();
        let outcome = MsvcLoader.load(&mut ProbeContext::new(&mut env, &host, Language::C));
        assert_eq!(
            outcome,
            ProbeOutcome::Failure("could not find the program `link`".to_string())
        );
    }
}
