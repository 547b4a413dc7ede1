use crate::types::Report;

/// Renders the full report as pretty JSON for machine use.
pub fn render_json(report: &Report) -> Result<String, String> {
    serde_json::to_string_pretty(report).map_err(|e| format!("JSON serialization failed: {e}"))
}
