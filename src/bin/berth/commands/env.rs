//! `berth env` command

use std::sync::Arc;

use anyhow::{bail, Result};

use crate::cli::EnvArgs;
use berth::core::{Environment, Key};
use berth::util::config::env_cache_path;
use berth::util::diagnostic::suggestions;
use berth::util::shell::Shell;

pub fn execute(args: EnvArgs, shell: &Arc<Shell>) -> Result<()> {
    let root = match args.path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };

    let cache = env_cache_path(&root);
    if !cache.exists() {
        bail!(
            "no recorded environment at {}\n{}",
            cache.display(),
            suggestions::NOT_CONFIGURED
        );
    }
    let env = Environment::load(&cache)?;

    let only: Option<Key> = args.key.as_deref().map(str::parse).transpose()?;

    if shell.is_json() {
        let mut entries = serde_json::Map::new();
        for (key, value) in env.iter() {
            if only.map_or(true, |k| k == key) {
                entries.insert(key.as_str().to_string(), serde_json::to_value(value)?);
            }
        }
        shell.json_event(&serde_json::json!({
            "reason": "environment",
            "entries": entries,
        }));
        return Ok(());
    }

    for (key, value) in env.iter() {
        if only.map_or(true, |k| k == key) {
            println!("{} = {}", key, value);
        }
    }

    Ok(())
}
