// Adaptive path resolution: plugin name + path segments -> next tree level
mod file;
mod relational;

use tracing::warn;

use crate::error::ClientError;
use crate::models::ResolvedNode;
use crate::services::classifier::{classify, PluginFamily};
use crate::services::engine::QueryEngine;

/// Resolves a path under a storage plugin to the next level of the schema
/// tree.
///
/// The plugin is classified once, then one resolver runs per family: file
/// plugins go through the speculative listing machine, everything else
/// through the dialect-aware relational resolver. A plugin that cannot be
/// classified (unknown, disabled, unreachable) yields an empty listing
/// rather than a guessed family.
pub async fn resolve<E: QueryEngine + ?Sized>(
    engine: &E,
    plugin: &str,
    path: &[String],
) -> Result<Vec<ResolvedNode>, ClientError> {
    let segments = normalize_segments(path);

    let plugin_info = match engine.plugin_config(plugin).await {
        Ok(info) => info,
        Err(err) => {
            warn!(plugin, error = %err, "cannot resolve path for unavailable plugin");
            return Ok(Vec::new());
        }
    };

    let descriptor = classify(&plugin_info);

    match descriptor.family {
        PluginFamily::File => file::resolve_file(engine, &descriptor, &segments).await,
        PluginFamily::Jdbc | PluginFamily::Document | PluginFamily::Search => {
            relational::resolve_relational(engine, &descriptor, &segments).await
        }
    }
}

/// A single empty segment means a zero-depth request.
fn normalize_segments(path: &[String]) -> Vec<String> {
    if path.len() == 1 && path[0].is_empty() {
        Vec::new()
    } else {
        path.to_vec()
    }
}
