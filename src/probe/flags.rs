//! Flag assembly.
//!
//! After a toolchain is committed, an ordered list of steps derives the
//! command templates and flag lists the build needs. Steps run in declaration
//! order and later steps see what earlier ones wrote. Every built-in step
//! only uses `set`, `append_unique` and `append_flags`, so running the
//! pipeline twice yields the same environment.

use std::fmt;

use crate::core::{Environment, Key, Language, Overrides, PlatformKey, ToolchainFamily};
use crate::util::config::FlagSettings;

/// Inputs shared by every step.
#[derive(Debug, Clone, Copy)]
pub struct FlagContext<'a> {
    pub language: Language,
    pub family: ToolchainFamily,
    pub platform: &'a PlatformKey,
    pub overrides: &'a Overrides,
    /// Flags from the configuration files
    pub extra: &'a FlagSettings,
}

/// One named stage of the pipeline.
pub trait FlagStep {
    fn name(&self) -> &str;

    fn apply(&self, env: &mut Environment, ctx: &FlagContext<'_>);
}

/// A step defined by a closure.
pub struct FnStep<F> {
    name: String,
    f: F,
}

impl<F> FnStep<F>
where
    F: Fn(&mut Environment, &FlagContext<'_>),
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        FnStep {
            name: name.into(),
            f,
        }
    }
}

impl<F> FlagStep for FnStep<F>
where
    F: Fn(&mut Environment, &FlagContext<'_>),
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, env: &mut Environment, ctx: &FlagContext<'_>) {
        (self.f)(env, ctx)
    }
}

/// An ordered list of flag steps.
#[derive(Default)]
pub struct FlagPipeline {
    steps: Vec<Box<dyn FlagStep>>,
}

impl fmt::Debug for FlagPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|s| s.name()))
            .finish()
    }
}

impl FlagPipeline {
    /// An empty pipeline.
    pub fn new() -> Self {
        FlagPipeline { steps: Vec::new() }
    }

    /// The built-in steps: `common`, `language`, `link`, `tooling`.
    pub fn standard() -> Self {
        FlagPipeline::new()
            .step(FnStep::new("common", common_flags))
            .step(FnStep::new("language", language_flags))
            .step(FnStep::new("link", link_flags))
            .step(FnStep::new("tooling", tooling_flags))
    }

    /// Append a step.
    pub fn step(mut self, step: impl FlagStep + 'static) -> Self {
        self.push(step);
        self
    }

    /// Append a step in place.
    pub fn push(&mut self, step: impl FlagStep + 'static) {
        self.steps.push(Box::new(step));
    }

    /// Step names in run order.
    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Apply every step in order, returning the names of the steps run.
    pub fn run(&self, env: &mut Environment, ctx: &FlagContext<'_>) -> Vec<String> {
        self.steps
            .iter()
            .map(|step| {
                tracing::debug!("applying flag step `{}`", step.name());
                step.apply(env, ctx);
                step.name().to_string()
            })
            .collect()
    }
}

/// Command templates and file patterns for the family.
fn common_flags(env: &mut Environment, ctx: &FlagContext<'_>) {
    match ctx.family {
        ToolchainFamily::Gnu => {
            env.set(Key::DefinesSt, "-D%s");
            env.set(Key::IncpathsSt, "-I%s");
            env.set(Key::LibSt, "-l%s");
            env.set(Key::LibpathSt, "-L%s");
            env.set(Key::CcTgtF, &["-c", "-o"][..]);
            env.set(Key::LinkTgtF, &["-o"][..]);
            env.set(Key::StlibPattern, "lib%s.a");

            let (program, shlib) = match ctx.platform {
                PlatformKey::Win32 | PlatformKey::Cygwin => ("%s.exe", "%s.dll"),
                PlatformKey::Darwin => ("%s", "lib%s.dylib"),
                _ => ("%s", "lib%s.so"),
            };
            env.set(Key::ProgramPattern, program);
            env.set(Key::ShlibPattern, shlib);
        }
        ToolchainFamily::Msvc => {
            env.set(Key::DefinesSt, "/D%s");
            env.set(Key::IncpathsSt, "/I%s");
            env.set(Key::LibSt, "%s.lib");
            env.set(Key::LibpathSt, "/LIBPATH:%s");
            env.set(Key::CcTgtF, &["/c", "/Fo"][..]);
            env.set(Key::LinkTgtF, &["/OUT:"][..]);
            env.set(Key::ProgramPattern, "%s.exe");
            env.set(Key::StlibPattern, "%s.lib");
            env.set(Key::ShlibPattern, "%s.dll");
            env.append_unique(ctx.language.flags_key(), ["/nologo"]);
        }
    }

    if !env.is_set(Key::DestOs) {
        env.set(Key::DestOs, ctx.platform.dest_os());
    }
}

/// Preprocessor and compile flags from overrides and configuration.
fn language_flags(env: &mut Environment, ctx: &FlagContext<'_>) {
    let key = ctx.language.flags_key();
    if ctx.language != Language::Fortran {
        env.append_flags(key, ctx.overrides.flags("CPPFLAGS"));
    }
    env.append_flags(key, ctx.overrides.flags(ctx.language.flags_var()));
    env.append_flags(key, ctx.extra.for_language(ctx.language).iter().cloned());
}

/// Link flags from overrides and configuration.
fn link_flags(env: &mut Environment, ctx: &FlagContext<'_>) {
    env.append_flags(Key::LinkFlags, ctx.overrides.flags("LDFLAGS"));
    env.append_flags(Key::LinkFlags, ctx.extra.ldflags.iter().cloned());
}

/// MSVC search paths from the `INCLUDE` and `LIB` variables.
fn tooling_flags(env: &mut Environment, ctx: &FlagContext<'_>) {
    if ctx.family != ToolchainFamily::Msvc {
        return;
    }
    let as_strings = |var: &str| {
        ctx.overrides
            .paths(var)
            .into_iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
    };
    env.append_unique(Key::Includes, as_strings("INCLUDE"));
    env.append_unique(Key::LibPath, as_strings("LIB"));
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        platform: PlatformKey,
        overrides: Overrides,
        extra: FlagSettings,
    }

    impl Fixture {
        fn new(overrides: Overrides) -> Self {
            Fixture {
                platform: PlatformKey::Linux,
                overrides,
                extra: FlagSettings::default(),
            }
        }

        fn ctx(&self, family: ToolchainFamily) -> FlagContext<'_> {
            FlagContext {
                language: Language::C,
                family,
                platform: &self.platform,
                overrides: &self.overrides,
                extra: &self.extra,
            }
        }
    }

    #[test]
    fn test_step_order_matters() {
        let fixture = Fixture::new(Overrides::new());
        let ctx = fixture.ctx(ToolchainFamily::Gnu);

        let a = || FnStep::new("a", |env, _| env.set(Key::CFlags, vec!["1".to_string()]));
        let b = || FnStep::new("b", |env, _| env.append_value(Key::CFlags, ["2"]));

        let mut env = Environment::new();
        let ran = FlagPipeline::new().step(a()).step(b()).run(&mut env, &ctx);
        assert_eq!(ran, vec!["a", "b"]);
        assert_eq!(env.get_list(Key::CFlags), vec!["1", "2"]);

        let mut env = Environment::new();
        FlagPipeline::new().step(b()).step(a()).run(&mut env, &ctx);
        assert_eq!(env.get_list(Key::CFlags), vec!["1"]);
    }

    #[test]
    fn test_standard_pipeline_is_idempotent() {
        let overrides = Overrides::new()
            .with("CPPFLAGS", "-DNDEBUG")
            .with("CFLAGS", "-O2 -g")
            .with("LDFLAGS", "-Wl,--as-needed");
        let mut fixture = Fixture::new(overrides);
        fixture.extra.cflags = vec!["-Wall".to_string(), "-O2".to_string()];
        let ctx = fixture.ctx(ToolchainFamily::Gnu);

        let pipeline = FlagPipeline::standard();
        let mut env = Environment::new();
        let ran = pipeline.run(&mut env, &ctx);
        assert_eq!(ran, vec!["common", "language", "link", "tooling"]);
        assert_eq!(
            env.get_list(Key::CFlags),
            vec!["-DNDEBUG", "-O2", "-g", "-Wall", "-O2"]
        );
        assert_eq!(env.get_list(Key::LinkFlags), vec!["-Wl,--as-needed"]);

        let once = env.clone();
        pipeline.run(&mut env, &ctx);
        assert_eq!(env, once);
    }

    #[test]
    fn test_paired_flags_survive() {
        let overrides = Overrides::new()
            .with("CFLAGS", "-arch x86_64 -arch arm64")
            .with("LDFLAGS", "-Xlinker -rpath -Xlinker /opt/lib");
        let fixture = Fixture::new(overrides);
        let ctx = fixture.ctx(ToolchainFamily::Gnu);

        let pipeline = FlagPipeline::standard();
        let mut env = Environment::new();
        pipeline.run(&mut env, &ctx);
        pipeline.run(&mut env, &ctx);

        assert_eq!(
            env.get_list(Key::CFlags),
            vec!["-arch", "x86_64", "-arch", "arm64"]
        );
        assert_eq!(
            env.get_list(Key::LinkFlags),
            vec!["-Xlinker", "-rpath", "-Xlinker", "/opt/lib"]
        );
    }

    #[test]
    fn test_gnu_templates() {
        let fixture = Fixture::new(Overrides::new());
        let mut env = Environment::new();
        FlagPipeline::standard().run(&mut env, &fixture.ctx(ToolchainFamily::Gnu));

        assert_eq!(env.get_str(Key::DefinesSt), Some("-D%s"));
        assert_eq!(env.get_str(Key::StlibPattern), Some("lib%s.a"));
        assert_eq!(env.get_str(Key::ShlibPattern), Some("lib%s.so"));
        assert_eq!(env.get_list(Key::CcTgtF), vec!["-c", "-o"]);
        assert_eq!(env.get_str(Key::DestOs), Some("linux"));
        assert!(!env.contains(Key::Includes));
    }

    #[test]
    fn test_msvc_templates_and_paths() {
        let include = std::env::join_paths(["/sdk/include", "/vc/include"]).unwrap();
        let overrides = Overrides::new()
            .with("INCLUDE", include.to_string_lossy())
            .with("LIB", "/sdk/lib");
        let fixture = Fixture::new(overrides);
        let mut env = Environment::new();
        env.set(Key::DestOs, "win32");
        FlagPipeline::standard().run(&mut env, &fixture.ctx(ToolchainFamily::Msvc));

        assert_eq!(env.get_str(Key::LibpathSt), Some("/LIBPATH:%s"));
        assert_eq!(env.get_str(Key::ProgramPattern), Some("%s.exe"));
        assert_eq!(env.get_list(Key::CFlags), vec!["/nologo"]);
        assert_eq!(env.get_list(Key::Includes), vec!["/sdk/include", "/vc/include"]);
        assert_eq!(env.get_list(Key::LibPath), vec!["/sdk/lib"]);
        assert_eq!(env.get_str(Key::DestOs), Some("win32"));
    }

    #[test]
    fn test_fortran_ignores_cppflags() {
        let overrides = Overrides::new()
            .with("CPPFLAGS", "-DNDEBUG")
            .with("FCFLAGS", "-ffree-form");
        let fixture = Fixture::new(overrides);
        let ctx = FlagContext {
            language: Language::Fortran,
            ..fixture.ctx(ToolchainFamily::Gnu)
        };

        let mut env = Environment::new();
        FlagPipeline::standard().run(&mut env, &ctx);
        assert_eq!(env.get_list(Key::FcFlags), vec!["-ffree-form"]);
    }
}
