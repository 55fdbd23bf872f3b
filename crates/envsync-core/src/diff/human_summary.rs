//! Human-readable summary renderer for comparisons.

use crate::diff::engine::sort_by_title;
use crate::diff::model::{Comparison, DiffStatus};

/// Render a plain-text summary of a [`Comparison`].
///
/// Entries are listed sorted by title. Informational only; the structured
/// comparison is the source of truth.
pub fn render_summary(comparison: &Comparison) -> String {
    let mut out = String::new();

    out.push_str("## Environment Comparison\n\n");
    out.push_str(&format!(
        "**Entries**: {} new, {} modified, {} deleted  \n**Content types**: {} changed\n\n",
        comparison.count(DiffStatus::New),
        comparison.count(DiffStatus::Modified),
        comparison.count(DiffStatus::Deleted),
        comparison.content_types.len(),
    ));

    if comparison.is_empty() {
        out.push_str("_No differences detected._\n");
        return out;
    }

    if !comparison.content_types.is_empty() {
        out.push_str("### Content Types\n\n");
        for ct in &comparison.content_types {
            out.push_str(&format!(
                "- `{}` {} ({})",
                ct.status.as_str(),
                ct.name,
                ct.content_type_id
            ));
            let mut details = Vec::new();
            if !ct.added_fields.is_empty() {
                details.push(format!("+{}", ct.added_fields.join(", +")));
            }
            if !ct.removed_fields.is_empty() {
                details.push(format!("-{}", ct.removed_fields.join(", -")));
            }
            if !ct.changed_fields.is_empty() {
                details.push(format!("~{}", ct.changed_fields.join(", ~")));
            }
            if !details.is_empty() && ct.status == DiffStatus::Modified {
                out.push_str(&format!(": {}", details.join("; ")));
            }
            out.push('\n');
        }
        out.push('\n');
    }

    if !comparison.entries.is_empty() {
        let mut entries = comparison.entries.clone();
        sort_by_title(&mut entries);

        out.push_str("### Entries\n\n");
        out.push_str("| Status | Title | Content type | State | Changed fields |\n");
        out.push_str("|---|---|---|---|---|\n");
        for item in &entries {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                item.status.as_str(),
                item.title,
                item.content_type_id,
                item.sys_status,
                item.changed_fields.join(", ")
            ));
        }
        out.push('\n');
    }

    if !comparison.available_locales.is_empty() {
        let codes: Vec<&str> = comparison
            .available_locales
            .iter()
            .map(String::as_str)
            .collect();
        out.push_str(&format!("**Locales**: {}\n", codes.join(", ")));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::engine::compare;
    use crate::model::{Entry, Locale, Snapshot};

    #[test]
    fn test_empty_comparison_says_so() {
        let summary = render_summary(&Comparison::default());
        assert!(summary.contains("No differences detected"));
    }

    #[test]
    fn test_summary_lists_entries_by_title() {
        let source = Snapshot {
            locales: vec![Locale::new("en", "English").as_default()],
            entries: vec![
                Entry::new("e2", "post").with_field("title", "en", "Zebra"),
                Entry::new("e1", "post").with_field("title", "en", "Aardvark"),
            ],
            ..Snapshot::default()
        };
        let summary = render_summary(&compare(&source, &Snapshot::default()));

        assert!(summary.contains("2 new, 0 modified, 0 deleted"));
        let a = summary.find("Aardvark").unwrap();
        let z = summary.find("Zebra").unwrap();
        assert!(a < z);
        assert!(summary.contains("**Locales**: en"));
    }
}
