//! Built-in toolchain loaders.

pub mod clang_cl;
pub mod gnu;
pub mod msvc;

use std::collections::BTreeMap;

use crate::core::Language;
use crate::probe::loader::LoaderRegistry;
use crate::util::config::CustomToolchain;

pub use clang_cl::ClangClLoader;
pub use gnu::GnuLoader;
pub use msvc::MsvcLoader;

/// A registry holding every built-in loader.
pub fn builtin() -> LoaderRegistry {
    use Language::{Cxx, Fortran, C};

    let mut loaders = LoaderRegistry::new();

    // C
    loaders.register(
        "gcc",
        GnuLoader::new("gcc", "gcc", &[C]).or_program("cc").reject_banner("clang"),
    );
    loaders.register("clang", GnuLoader::new("clang", "clang", &[C]).expect_banner("clang"));
    loaders.register("icc", GnuLoader::new("icc", "icc", &[C]).expect_banner("icc"));
    loaders.register(
        "xlc",
        GnuLoader::new("xlc", "xlc_r", &[C])
            .or_program("xlc")
            .with_version_args(&["-qversion"])
            .expect_banner("IBM XL"),
    );
    loaders.register(
        "suncc",
        GnuLoader::new("suncc", "suncc", &[C])
            .or_program("cc")
            .with_version_args(&["-V"])
            .expect_banner("Sun C")
            .tolerate_exit_status(),
    );

    // C++
    loaders.register(
        "g++",
        GnuLoader::new("gcc", "g++", &[Cxx]).or_program("c++").reject_banner("clang"),
    );
    loaders.register(
        "clang++",
        GnuLoader::new("clang", "clang++", &[Cxx]).expect_banner("clang"),
    );
    loaders.register("icpc", GnuLoader::new("icc", "icpc", &[Cxx]).expect_banner("icpc"));
    loaders.register(
        "xlc++",
        GnuLoader::new("xlc", "xlc++_r", &[Cxx])
            .or_program("xlc++")
            .with_version_args(&["-qversion"])
            .expect_banner("IBM XL"),
    );
    loaders.register(
        "sunc++",
        GnuLoader::new("suncc", "sunCC", &[Cxx])
            .or_program("CC")
            .with_version_args(&["-V"])
            .expect_banner("Sun C++")
            .tolerate_exit_status(),
    );

    // Fortran
    loaders.register(
        "gfortran",
        GnuLoader::new("gfortran", "gfortran", &[Fortran]).expect_banner("GNU Fortran"),
    );
    loaders.register("g95", GnuLoader::new("g95", "g95", &[Fortran]).expect_banner("g95"));
    loaders.register("ifort", GnuLoader::new("ifort", "ifort", &[Fortran]).expect_banner("ifort"));

    // MSVC command line
    loaders.register("msvc", MsvcLoader);
    loaders.register("clang-cl", ClangClLoader);

    loaders
}

/// Register user-declared toolchains, replacing built-ins of the same name.
pub fn register_custom(loaders: &mut LoaderRegistry, toolchains: &BTreeMap<String, CustomToolchain>) {
    for (name, toolchain) in toolchains {
        tracing::debug!("registering custom toolchain `{}` ({})", name, toolchain.program);
        loaders.register(
            name.as_str(),
            GnuLoader::new(name.as_str(), toolchain.program.as_str(), &toolchain.languages),
        );
    }
}
