//! File-type resolution from file names.
//!
//! The suffix table is fixed and matched case-insensitively. Anything not
//! in the table is unsupported.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Document formats the session knows how to route to a loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Docx,
    Excel,
    Csv,
    Text,
    Json,
}

/// Extension (without the dot) to type table.
const EXTENSION_TABLE: &[(&str, FileType)] = &[
    ("pdf", FileType::Pdf),
    ("docx", FileType::Docx),
    ("doc", FileType::Docx),
    ("xlsx", FileType::Excel),
    ("xls", FileType::Excel),
    ("csv", FileType::Csv),
    ("txt", FileType::Text),
    ("md", FileType::Text),
    ("json", FileType::Json),
];

impl FileType {
    /// Every supported type, in display order.
    pub const ALL: [FileType; 6] = [
        FileType::Pdf,
        FileType::Docx,
        FileType::Excel,
        FileType::Csv,
        FileType::Text,
        FileType::Json,
    ];

    /// Resolve the type of a file from its extension.
    ///
    /// Returns `None` for unknown extensions and for names without one.
    pub fn from_file_name(name: &str) -> Option<FileType> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        EXTENSION_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == ext)
            .map(|(_, ft)| *ft)
    }

    /// Short tag used in listings and logs (`"pdf"`, `"excel"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Docx => "docx",
            FileType::Excel => "excel",
            FileType::Csv => "csv",
            FileType::Text => "text",
            FileType::Json => "json",
        }
    }

    /// Human-facing format name.
    pub fn label(&self) -> &'static str {
        match self {
            FileType::Pdf => "PDF",
            FileType::Docx => "Word",
            FileType::Excel => "Excel",
            FileType::Csv => "CSV",
            FileType::Text => "Text",
            FileType::Json => "JSON",
        }
    }

    /// Extensions (with leading dot) that resolve to this type.
    pub fn extensions(&self) -> Vec<String> {
        EXTENSION_TABLE
            .iter()
            .filter(|(_, ft)| ft == self)
            .map(|(ext, _)| format!(".{}", ext))
            .collect()
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_every_table_entry() {
        assert_eq!(FileType::from_file_name("report.pdf"), Some(FileType::Pdf));
        assert_eq!(FileType::from_file_name("memo.docx"), Some(FileType::Docx));
        assert_eq!(FileType::from_file_name("memo.doc"), Some(FileType::Docx));
        assert_eq!(FileType::from_file_name("q3.xlsx"), Some(FileType::Excel));
        assert_eq!(FileType::from_file_name("q3.xls"), Some(FileType::Excel));
        assert_eq!(FileType::from_file_name("rows.csv"), Some(FileType::Csv));
        assert_eq!(FileType::from_file_name("notes.txt"), Some(FileType::Text));
        assert_eq!(FileType::from_file_name("README.md"), Some(FileType::Text));
        assert_eq!(FileType::from_file_name("data.json"), Some(FileType::Json));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert_eq!(FileType::from_file_name("REPORT.PDF"), Some(FileType::Pdf));
        assert_eq!(FileType::from_file_name("Sheet.XlSx"), Some(FileType::Excel));
    }

    #[test]
    fn unknown_or_missing_extension_is_unsupported() {
        assert_eq!(FileType::from_file_name("image.png"), None);
        assert_eq!(FileType::from_file_name("Makefile"), None);
        assert_eq!(FileType::from_file_name("archive.tar.gz"), None);
        assert_eq!(FileType::from_file_name(".pdf"), None);
    }

    #[test]
    fn only_final_extension_counts() {
        assert_eq!(FileType::from_file_name("report.pdf.txt"), Some(FileType::Text));
        assert_eq!(FileType::from_file_name("notes.txt.exe"), None);
    }

    #[test]
    fn extensions_listed_per_type() {
        assert_eq!(FileType::Excel.extensions(), vec![".xlsx", ".xls"]);
        assert_eq!(FileType::Text.extensions(), vec![".txt", ".md"]);
        assert_eq!(FileType::Json.to_string(), "json");
    }
}
