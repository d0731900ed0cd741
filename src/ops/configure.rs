//! The configure operation.
//!
//! Selects a compiler for one language, then locates its secondary tools
//! and assembles its flags. The environment is only changed if every stage
//! succeeds.

use anyhow::Result;
use serde::Serialize;

use crate::core::{Environment, Language, ToolchainFamily};
use crate::probe::auxiliary::{self, AuxiliaryReport};
use crate::probe::loaders;
use crate::probe::{
    CandidateRegistry, ConfigureError, FlagContext, FlagPipeline, Host, LoaderRegistry, Selection,
    ToolchainSelector,
};
use crate::util::config::{Config, FlagSettings};
use crate::util::shell::{Shell, Status};

/// Options for a configure run.
#[derive(Debug, Clone, Default)]
pub struct ConfigureOptions {
    /// Language to select a compiler for
    pub language: Language,

    /// Explicit candidate list (replaces the registry's choice)
    pub candidates: Option<Vec<String>>,

    /// Extra flags from configuration
    pub flags: FlagSettings,
}

/// What a successful configure run did.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigureReport {
    pub selection: Selection,
    pub family: String,
    pub auxiliary: AuxiliaryReport,
    /// Flag steps applied, in order
    pub steps: Vec<String>,
}

/// The candidate tables, loaders and flag steps used for configuration.
#[derive(Debug)]
pub struct Configurator {
    candidates: CandidateRegistry,
    loaders: LoaderRegistry,
    pipeline: FlagPipeline,
}

impl Default for Configurator {
    fn default() -> Self {
        Configurator {
            candidates: CandidateRegistry::builtin(),
            loaders: loaders::builtin(),
            pipeline: FlagPipeline::standard(),
        }
    }
}

impl Configurator {
    /// Built-in tables adjusted by a configuration file.
    ///
    /// Configured candidate lists replace the table entry for `host`'s
    /// platform, and custom toolchains are registered as loaders.
    pub fn from_config(config: &Config, host: &Host) -> Self {
        let mut configurator = Configurator::default();
        for language in Language::ALL {
            if let Some(list) = config.candidates.for_language(language) {
                configurator
                    .candidates
                    .set(language, host.platform().as_str(), list.to_vec());
            }
        }
        loaders::register_custom(&mut configurator.loaders, &config.toolchains);
        configurator
    }

    /// Replace the candidate tables.
    pub fn with_candidates(mut self, candidates: CandidateRegistry) -> Self {
        self.candidates = candidates;
        self
    }

    /// Replace the loaders.
    pub fn with_loaders(mut self, loaders: LoaderRegistry) -> Self {
        self.loaders = loaders;
        self
    }

    /// Replace the flag pipeline.
    pub fn with_pipeline(mut self, pipeline: FlagPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn candidates(&self) -> &CandidateRegistry {
        &self.candidates
    }

    pub fn loaders(&self) -> &LoaderRegistry {
        &self.loaders
    }

    /// The candidates a run with `options` would try, in order.
    pub fn candidate_list(&self, host: &Host, options: &ConfigureOptions) -> Vec<String> {
        match &options.candidates {
            Some(list) => list.clone(),
            None => self
                .candidates
                .candidates_for(options.language, host.platform())
                .to_vec(),
        }
    }

    /// Run the full configuration for one language.
    pub fn run(
        &self,
        env: &mut Environment,
        host: &Host,
        options: &ConfigureOptions,
        shell: &Shell,
    ) -> Result<ConfigureReport, ConfigureError> {
        let language = options.language;
        let candidates = self.candidate_list(host, options);
        shell.status(
            Status::Probing,
            format!("{} ({})", language.describe(), candidates.join(", ")),
        );

        let initial = env.snapshot();

        let selection =
            ToolchainSelector::new(&self.loaders, host).select(env, language, &candidates, shell)?;

        let family = ToolchainFamily::from_compiler_name(&env.get_flat(language.name_key()));
        let tools = auxiliary::tools_for(family, env);
        let auxiliary = match auxiliary::assemble(env, host.locator(), &tools, shell) {
            Ok(report) => report,
            Err(e) => {
                env.restore(initial);
                return Err(e);
            }
        };

        let ctx = FlagContext {
            language,
            family,
            platform: host.platform(),
            overrides: host.overrides(),
            extra: &options.flags,
        };
        let steps = self.pipeline.run(env, &ctx);

        shell.status(
            Status::Configured,
            format!("{} `{}` ({})", language.describe(), selection.candidate, selection.identity),
        );

        Ok(ConfigureReport {
            selection,
            family: family.to_string(),
            auxiliary,
            steps,
        })
    }
}

/// Configure `options.language` with the built-in tables.
pub fn configure(
    env: &mut Environment,
    host: &Host,
    options: &ConfigureOptions,
    shell: &Shell,
) -> Result<ConfigureReport> {
    let report = Configurator::default().run(env, host, options, shell)?;
    Ok(report)
}
