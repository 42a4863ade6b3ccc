// Speculative path resolution for hierarchical file plugins
//
// File-backed sources give no a-priori signal about where a directory ends
// and a file or nested field begins. A segment might be a directory, a file,
// or the start of a nested-map/sheet path inside a file; the only oracle is
// whether listing a candidate path returns something. The resolver probes
// the deepest reading first and backs off one level per iteration.
use serde_json::Value;
use tracing::debug;

use crate::error::ClientError;
use crate::models::{ColumnNode, ResolvedNode, SchemaNode, TableNode};
use crate::services::classifier::PluginDescriptor;
use crate::services::engine::QueryEngine;
use crate::services::introspect;

/// One entry of a `SHOW FILES` listing.
#[derive(Debug, Clone)]
struct FileEntry {
    name: String,
    is_directory: bool,
}

/// Transient backtracking state, local to one resolution call.
#[derive(Debug)]
struct ProbeState {
    /// How many leading segments are currently treated as resolved path
    /// components. Monotonically decreasing.
    path_limit: usize,
    /// Listing recorded by the last backtrack, restored if the shallower
    /// probe contradicts it.
    previous_results: Option<Vec<FileEntry>>,
    previous_last_segment: Option<String>,
    is_excel_file: bool,
}

pub(crate) async fn resolve_file<E: QueryEngine + ?Sized>(
    engine: &E,
    descriptor: &PluginDescriptor,
    segments: &[String],
) -> Result<Vec<ResolvedNode>, ClientError> {
    if segments.is_empty() {
        // The workspace level comes straight from the plugin configuration
        let mut names: Vec<String> = descriptor.workspaces.iter().cloned().collect();
        names.sort();
        return Ok(names
            .into_iter()
            .map(|name| {
                ResolvedNode::Schema(SchemaNode {
                    plugin: descriptor.name.clone(),
                    name,
                })
            })
            .collect());
    }

    let mut state = ProbeState {
        path_limit: segments.len(),
        previous_results: None,
        previous_last_segment: None,
        is_excel_file: false,
    };

    loop {
        let candidate = build_candidate(descriptor, segments, state.path_limit);
        debug!(candidate = %candidate, path_limit = state.path_limit, "probing file path");
        let listing = list_files(engine, &candidate).await?;
        let last_segment = &segments[state.path_limit - 1];

        // Nothing there: the path may be one level shallower than typed.
        if listing.is_empty() {
            if state.path_limit <= 2 {
                // Workspace+directory floor, nothing left to back off to
                return Ok(Vec::new());
            }
            state.previous_results = Some(listing);
            state.previous_last_segment = Some(last_segment.clone());
            state.path_limit -= 1;
            continue;
        }

        // The shallower listing contradicts the backtracked reading: the
        // original, deeper path was correct after all.
        if let Some(previous) = &state.previous_results {
            let previous_last = state.previous_last_segment.as_deref().unwrap_or_default();
            if listing.len() > 1 || listing[0].name == previous_last {
                let restored = previous.clone();
                return Ok(entries_to_nodes(
                    descriptor,
                    segments,
                    state.path_limit + 1,
                    restored,
                ));
            }
        }

        if listing.len() == 1 && listing[0].name == *last_segment {
            let backtracked = state.previous_results.is_some();
            state.is_excel_file = is_spreadsheet(last_segment);

            if state.is_excel_file {
                debug!(file = %last_segment, "path resolved to a spreadsheet");
                if backtracked {
                    // Everything past the file is a sheet name
                    let sheet = segments[state.path_limit..].join(".");
                    return introspect::excel_sheet_columns(
                        engine,
                        descriptor,
                        &candidate,
                        &sheet,
                        parent_path(segments, state.path_limit).as_deref(),
                        last_segment,
                    )
                    .await;
                }
                let schema = consumed_path(segments, state.path_limit);
                let sheets = introspect::excel_sheet_names(engine, &candidate).await?;
                return Ok(sheets
                    .into_iter()
                    .map(|name| {
                        ResolvedNode::Table(TableNode {
                            schema: schema.clone(),
                            name,
                        })
                    })
                    .collect());
            }

            if backtracked {
                // Everything past the file is a nested map field path
                let field = quote_segments(&segments[state.path_limit..]);
                let schema = parent_path(segments, state.path_limit);
                let pairs = introspect::map_schema(engine, &candidate, &field).await;
                return Ok(pairs
                    .into_iter()
                    .map(|(name, data_type)| {
                        ResolvedNode::Column(ColumnNode {
                            plugin: descriptor.name.clone(),
                            schema: schema.clone(),
                            table: last_segment.clone(),
                            name,
                            data_type,
                            is_nullable: false,
                        })
                    })
                    .collect());
            }

            if state.path_limit >= 2 {
                // A single file with no further nesting requested
                return introspect::file_columns(
                    engine,
                    descriptor,
                    &candidate,
                    parent_path(segments, state.path_limit).as_deref(),
                    last_segment,
                )
                .await;
            }
        }

        // A plain directory listing
        return Ok(entries_to_nodes(
            descriptor,
            segments,
            state.path_limit,
            listing,
        ));
    }
}

/// Quotes `plugin`.`workspace`[.`dir/…`] with everything between the
/// workspace and the path limit folded into one slash-joined component.
fn build_candidate(descriptor: &PluginDescriptor, segments: &[String], path_limit: usize) -> String {
    let mut path = format!("`{}`.`{}`", descriptor.name, segments[0]);
    if path_limit > 1 {
        path.push_str(&format!(".`{}`", segments[1..path_limit].join("/")));
    }
    path
}

async fn list_files<E: QueryEngine + ?Sized>(
    engine: &E,
    quoted_path: &str,
) -> Result<Vec<FileEntry>, ClientError> {
    let sql = format!("SHOW FILES IN {}", quoted_path);
    let result = engine.execute_query(&sql).await?;
    Ok(result
        .rows()
        .iter()
        .map(|row| FileEntry {
            name: row
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            is_directory: row
                .get("isDirectory")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
        .collect())
}

fn entries_to_nodes(
    descriptor: &PluginDescriptor,
    segments: &[String],
    path_limit: usize,
    entries: Vec<FileEntry>,
) -> Vec<ResolvedNode> {
    let schema = consumed_path(segments, path_limit.min(segments.len()));
    entries
        .into_iter()
        .map(|entry| {
            if entry.is_directory {
                ResolvedNode::Schema(SchemaNode {
                    plugin: descriptor.name.clone(),
                    name: entry.name,
                })
            } else {
                ResolvedNode::Table(TableNode {
                    schema: schema.clone(),
                    name: entry.name,
                })
            }
        })
        .collect()
}

fn consumed_path(segments: &[String], path_limit: usize) -> String {
    segments[..path_limit].join(".")
}

/// The directory path above the resolved component, if any.
fn parent_path(segments: &[String], path_limit: usize) -> Option<String> {
    if path_limit < 2 {
        None
    } else {
        Some(segments[..path_limit - 1].join("."))
    }
}

fn quote_segments(segments: &[String]) -> String {
    segments
        .iter()
        .map(|segment| format!("`{}`", segment))
        .collect::<Vec<_>>()
        .join(".")
}

fn is_spreadsheet(name: &str) -> bool {
    let name = name.to_lowercase();
    name.ends_with(".xlsx") || name.ends_with(".xls") || name.ends_with(".xlsm")
}
