//! `berth configure` command

use std::sync::Arc;

use anyhow::Result;

use crate::cli::ConfigureArgs;
use berth::core::{Environment, Overrides, PlatformKey};
use berth::ops::{ConfigureOptions, Configurator};
use berth::probe::registry::split_candidates;
use berth::probe::Host;
use berth::util::config::{env_cache_path, global_config_path, load_config, project_config_path};
use berth::util::shell::{Shell, Status};

pub fn execute(args: ConfigureArgs, shell: &Arc<Shell>) -> Result<()> {
    let root = match args.path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };

    let config = load_config(global_config_path().as_deref(), &project_config_path(&root));

    // Variables set in the process environment win over configured tool paths
    let mut overrides = Overrides::from_process_env();
    overrides.merge_missing(config.overrides());

    let platform = args.platform.unwrap_or_else(PlatformKey::host);
    let host = Host::new(platform, overrides);
    let configurator = Configurator::from_config(&config, &host);

    let cache = env_cache_path(&root);
    let mut env = if !args.fresh && cache.exists() {
        tracing::debug!("reusing environment from {}", cache.display());
        Environment::load(&cache)?
    } else {
        Environment::new()
    };

    let options = ConfigureOptions {
        language: args.lang,
        candidates: args.check_compiler.as_deref().map(split_candidates),
        flags: config.flags.clone(),
    };

    let span = shell.span(Status::Probing, format!("{} toolchain", args.lang));
    let report = configurator.run(&mut env, &host, &options, shell)?;
    span.finish_with_message(format!("configured `{}`", report.selection.identity));

    if shell.is_json() {
        shell.json_event(&serde_json::json!({
            "reason": "configured",
            "report": report,
        }));
    }

    if !args.no_save {
        env.save(&cache)?;
        shell.status(Status::Saved, cache.display());
    }

    Ok(())
}
