//! Supported-format listing for `docqa formats` and the `/formats` chat command.

use docqa_core::{FileType, LoaderRegistry};

/// Rows of the supported-formats table: `(label, extensions, has loader)`.
pub fn format_rows(loaders: &LoaderRegistry) -> Vec<(&'static str, String, bool)> {
    FileType::ALL
        .iter()
        .map(|ft| {
            (
                ft.label(),
                ft.extensions().join(" "),
                loaders.loader_for(*ft).is_some(),
            )
        })
        .collect()
}

pub fn list_formats(loaders: &LoaderRegistry) {
    println!("{:<8} {:<14} LOADER", "FORMAT", "EXTENSIONS");
    for (label, extensions, available) in format_rows(loaders) {
        let status = if available { "yes" } else { "no" };
        println!("{:<8} {:<14} {}", label, extensions, status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::default_registry;

    #[test]
    fn rows_follow_display_order() {
        let rows = format_rows(&default_registry());
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0], ("PDF", ".pdf".to_string(), true));
        assert_eq!(rows[1], ("Word", ".docx .doc".to_string(), true));
        assert_eq!(rows[4], ("Text", ".txt .md".to_string(), true));
    }

    #[test]
    fn missing_loader_is_reported() {
        let rows = format_rows(&LoaderRegistry::new());
        assert!(rows.iter().all(|(_, _, available)| !available));
    }
}
