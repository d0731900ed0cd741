//! Loader for gcc-style compiler drivers.
//!
//! Covers gcc, clang, the Intel and IBM compilers, the Sun compilers, the
//! Fortran drivers, and any custom toolchain declared in the configuration.
//! Every one of them is located the same way and identified by running it
//! with a version flag.

use std::sync::LazyLock;

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;

use crate::core::{Key, Language, SearchSources};
use crate::probe::loader::{ProbeContext, ProbeOutcome, ToolchainLoader};

static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+(?:\.\d+)*)").expect("valid version pattern"));

/// Extract the first dotted version number from compiler output.
pub fn parse_version(output: &str) -> Option<String> {
    VERSION.captures(output).map(|c| c[1].to_string())
}

/// A gcc-style driver.
#[derive(Debug, Clone)]
pub struct GnuLoader {
    /// Family name recorded under `CC_NAME` / `CXX_NAME` / `FC_NAME`
    name: String,
    /// Program names, in preference order
    programs: Vec<String>,
    languages: Vec<Language>,
    version_args: Vec<String>,
    /// Lowercase text the version output must contain
    banner: Option<String>,
    /// Lowercase text the version output must not contain
    reject: Option<String>,
    tolerate_exit_status: bool,
}

impl GnuLoader {
    /// A driver named `name` that runs `program` for `languages`.
    pub fn new(name: impl Into<String>, program: impl Into<String>, languages: &[Language]) -> Self {
        GnuLoader {
            name: name.into(),
            programs: vec![program.into()],
            languages: languages.to_vec(),
            version_args: vec!["--version".to_string()],
            banner: None,
            reject: None,
            tolerate_exit_status: false,
        }
    }

    /// Accept another program name if the preferred ones are missing.
    pub fn or_program(mut self, program: impl Into<String>) -> Self {
        self.programs.push(program.into());
        self
    }

    /// Arguments that make the driver print its version.
    pub fn with_version_args(mut self, args: &[&str]) -> Self {
        self.version_args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Require the version output to mention `text` (case-insensitive).
    pub fn expect_banner(mut self, text: &str) -> Self {
        self.banner = Some(text.to_lowercase());
        self
    }

    /// Refuse drivers whose version output mentions `text`.
    pub fn reject_banner(mut self, text: &str) -> Self {
        self.reject = Some(text.to_lowercase());
        self
    }

    /// Accept a non-zero exit from the version query (the Sun compilers
    /// complain about missing input files).
    pub fn tolerate_exit_status(mut self) -> Self {
        self.tolerate_exit_status = true;
        self
    }

    fn probe(&self, ctx: &mut ProbeContext<'_>) -> Result<()> {
        let language = ctx.language;
        if !self.languages.contains(&language) {
            bail!("`{}` is not a {}", self.name, language.describe());
        }

        let sources = SearchSources::system()
            .with_override(language.override_var())
            .with_cached(language.compiler_key());
        let compiler = ctx.find_program(&self.programs, &sources, language.compiler_key())?;

        let args: Vec<&str> = self.version_args.iter().map(String::as_str).collect();
        let output = ctx
            .run(&compiler, &args)
            .with_context(|| format!("failed to run `{}`", compiler.display()))?;

        if !output.success() && !self.tolerate_exit_status {
            bail!(
                "`{} {}` exited with status {:?}",
                compiler.display(),
                args.join(" "),
                output.status
            );
        }

        let text = output.combined();
        let lowered = text.to_lowercase();
        if let Some(banner) = &self.banner {
            if !lowered.contains(banner) {
                bail!("`{}` does not identify as {}", compiler.display(), self.name);
            }
        }
        if let Some(reject) = &self.reject {
            if lowered.contains(reject) {
                bail!("`{}` is {}, not {}", compiler.display(), reject, self.name);
            }
        }

        let version = parse_version(&text)
            .ok_or_else(|| anyhow!("no version number in output of `{}`", compiler.display()))?;
        tracing::debug!("{} {} at {}", self.name, version, compiler.display());

        let env = &mut *ctx.env;
        env.set(language.name_key(), self.name.as_str());
        env.set(language.version_key(), version);
        env.set(language.link_key(), compiler.as_path());
        if !env.is_set(Key::DestOs) {
            env.set(Key::DestOs, ctx.host.platform().dest_os());
        }

        Ok(())
    }
}

impl ToolchainLoader for GnuLoader {
    fn load(&self, ctx: &mut ProbeContext<'_>) -> ProbeOutcome {
        self.probe(ctx).into()
    }
}
