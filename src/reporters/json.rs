//! JSON reporter
//!
//! Outputs the report as pretty-printed JSON, tagged with its `kind`.
//! Useful for piping to jq or feeding a plotting script.

use crate::models::Report;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::{gtest_report, summary_report};

    #[test]
    fn test_gtest_json_shape() {
        let json_str = render(&gtest_report()).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["kind"], "g_test");
        assert_eq!(parsed["row_column"], "description");
        let ranked = parsed["ranking"]["ranked"].as_array().expect("ranked array");
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0]["category"], "worm");
        assert_eq!(
            parsed["ranking"]["reduced"]["columns"]
                .as_array()
                .expect("columns")
                .len(),
            1
        );
    }

    #[test]
    fn test_summary_json_flattens_column_summary() {
        let json_str = render(&summary_report()).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["kind"], "summary");
        assert_eq!(parsed["columns"][0]["column"], "description");
        assert_eq!(parsed["columns"][0]["top"], "trojan");
        assert_eq!(parsed["ingest"]["malformed"], 1);
    }
}
