// Identifier quoting for dotted schema paths
use crate::services::classifier::{PluginDescriptor, PluginFamily};

/// Backtick-quotes a dotted path for use in a statement.
///
/// Any pre-existing backticks are stripped first, so formatting an already
/// quoted path never double-quotes it.
///
/// For file plugins the path is `plugin[.workspace].rest`: the plugin and an
/// optional leading declared workspace are quoted individually, and the
/// whole remainder becomes one quoted component — file names legitimately
/// contain dots (`data.csv`) and must not split into separate identifiers.
/// Every other family quotes each dot-delimited segment independently
/// (catalog.schema.table).
pub fn format_drill_table(descriptor: &PluginDescriptor, path: &str) -> String {
    let clean = path.replace('`', "");
    let parts: Vec<&str> = clean.split('.').collect();

    if descriptor.family != PluginFamily::File {
        return parts
            .iter()
            .map(|part| format!("`{}`", part))
            .collect::<Vec<_>>()
            .join(".");
    }

    let mut formatted = format!("`{}`", parts[0]);
    let mut rest = &parts[1..];

    if let Some(first) = rest.first() {
        if descriptor.workspaces.contains(*first) {
            formatted.push_str(&format!(".`{}`", first));
            rest = &rest[1..];
        }
    }

    if !rest.is_empty() {
        formatted.push_str(&format!(".`{}`", rest.join(".")));
    }

    formatted
}
