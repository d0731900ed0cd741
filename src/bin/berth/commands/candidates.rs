//! `berth candidates` command

use std::sync::Arc;

use anyhow::Result;

use crate::cli::CandidatesArgs;
use berth::core::{Overrides, PlatformKey};
use berth::ops::Configurator;
use berth::probe::Host;
use berth::util::config::{global_config_path, load_config, project_config_path};
use berth::util::shell::Shell;

pub fn execute(args: CandidatesArgs, shell: &Arc<Shell>) -> Result<()> {
    let root = std::env::current_dir()?;
    let config = load_config(global_config_path().as_deref(), &project_config_path(&root));

    let platform = args.platform.unwrap_or_else(PlatformKey::host);
    let host = Host::new(platform, Overrides::new());
    let configurator = Configurator::from_config(&config, &host);
    let registry = configurator.candidates();

    let platforms: Vec<PlatformKey> = if args.all {
        registry
            .platforms(args.lang)
            .into_iter()
            .filter_map(|p| p.parse::<PlatformKey>().ok())
            .collect()
    } else {
        vec![host.platform().clone()]
    };

    for platform in &platforms {
        let candidates = registry.candidates_for(args.lang, platform);

        if shell.is_json() {
            shell.json_event(&serde_json::json!({
                "reason": "candidates",
                "language": args.lang,
                "platform": platform.as_str(),
                "candidates": candidates,
            }));
        } else {
            println!("{} ({}): {}", args.lang.describe(), platform, candidates.join(" "));
        }
    }

    Ok(())
}
