use anyhow::Context;
use gateway_config::{Config, DynamicString, StoreKind};

use crate::args::Args;

/// Reads the configuration file, if any, and applies the command line and environment
/// overrides on top of it.
pub(crate) fn load(args: &Args) -> anyhow::Result<Config> {
    let mut config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?
        .unwrap_or_default();

    apply_overrides(&mut config, args);

    Ok(config)
}

fn apply_overrides(config: &mut Config, args: &Args) {
    let store = &mut config.store;

    let overrides = [
        (&mut store.endpoint, &args.cosmos_url),
        (&mut store.key, &args.cosmos_key),
        (&mut store.database, &args.cosmos_database),
        (&mut store.container, &args.cosmos_container),
        (&mut store.partition_key_field, &args.cosmos_partition_key),
    ];

    for (setting, value) in overrides {
        if let Some(value) = value.as_deref().filter(|value| !value.is_empty()) {
            *setting = Some(DynamicString::from(value));
        }
    }

    if args.in_memory {
        store.kind = StoreKind::Memory;
    }
}
