//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::{Cli, Commands};
use crate::api;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::fixtures::FixtureSet;
use sideload_core::{EntityId, Registry, Renderer, TypeHandle};

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AppError> {
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    if let Some(fixtures) = cli.fixtures {
        config.fixtures = fixtures;
    }

    let registry = FixtureSet::load(&config.fixtures)?.into_registry()?;

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            api::run_server(&config, registry).await
        }
        Some(Commands::Render {
            entity_type,
            id,
            include,
        }) => cmd_render(&config, &registry, &entity_type, &id, include.as_deref()),
        Some(Commands::Types) | None => cmd_types(&registry),
    }
}

// =============================================================================
// RENDER COMMAND
// =============================================================================

/// Render one entity and print the result as pretty JSON.
fn cmd_render(
    config: &AppConfig,
    registry: &Registry,
    entity_type: &str,
    raw_id: &str,
    include: Option<&str>,
) -> Result<(), AppError> {
    let type_handle = TypeHandle::new(entity_type);
    let id = raw_id
        .parse::<i64>()
        .map(EntityId::Int)
        .unwrap_or_else(|_| EntityId::Str(raw_id.to_string()));
    let whitelist = api::parse_include(include);

    let declarator = registry.get(&type_handle).ok_or_else(|| {
        AppError::Fixture(format!("unknown entity type '{type_handle}'"))
    })?;
    let entity = declarator.get_by_id(&id)?.ok_or_else(|| {
        AppError::Fixture(format!("no {type_handle} with id {id}"))
    })?;

    let cache = config.cache_store();
    let renderer = Renderer::new(registry, &cache);
    let rendered = renderer.resolve_single(&type_handle, &entity, &whitelist)?;

    let json = serde_json::to_string_pretty(&rendered)
        .map_err(|e| AppError::Io(format!("cannot serialize output: {e}")))?;
    println!("{json}");
    Ok(())
}

// =============================================================================
// TYPES COMMAND
// =============================================================================

/// List the registered entity types.
fn cmd_types(registry: &Registry) -> Result<(), AppError> {
    for handle in registry.type_names() {
        println!("{handle}");
    }
    Ok(())
}
