//! Plain-text extraction for every supported document format.
//!
//! Each function takes the raw bytes of one file and returns UTF-8 text.
//! OOXML containers (docx, xlsx) are read with bounded ZIP entry sizes.
//! Nothing here panics on malformed input; every failure is an
//! [`ExtractError`].

use std::io::Read;

use quick_xml::events::Event;
use serde_json::Value;

/// Maximum sheets to process in an xlsx.
const XLSX_MAX_SHEETS: usize = 100;
/// Maximum cells to process per sheet.
const XLSX_MAX_CELLS_PER_SHEET: usize = 100_000;
/// Maximum decompressed bytes to read from a single ZIP entry.
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("OOXML extraction failed: {0}")]
    Ooxml(String),
    #[error("CSV parse failed: {0}")]
    Csv(String),
    #[error("JSON parse failed: {0}")]
    Json(String),
    #[error("legacy binary .{0} files are not supported; save the file as .{0}x and upload it again")]
    LegacyFormat(&'static str),
    #[error("no extractable text")]
    Empty,
}

/// One extracted piece of a document, e.g. a single worksheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Suffix appended to the document's source name, e.g. `#Sheet1`.
    pub label: Option<String>,
    pub text: String,
}

impl Section {
    fn whole(text: String) -> Self {
        Self { label: None, text }
    }
}

pub fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

/// Text/markdown, decoded lossily.
pub fn extract_plain(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

type Archive<'a> = zip::ZipArchive<std::io::Cursor<&'a [u8]>>;

fn open_archive(bytes: &[u8]) -> Result<Archive<'_>, ExtractError> {
    zip::ZipArchive::new(std::io::Cursor::new(bytes)).map_err(|e| ExtractError::Ooxml(e.to_string()))
}

fn read_zip_entry_bounded(
    archive: &mut Archive<'_>,
    name: &str,
    max_bytes: u64,
) -> Result<Vec<u8>, ExtractError> {
    let entry = archive
        .by_name(name)
        .map_err(|e| ExtractError::Ooxml(format!("{}: {}", name, e)))?;
    let mut out = Vec::new();
    entry
        .take(max_bytes)
        .read_to_end(&mut out)
        .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
    if out.len() as u64 >= max_bytes {
        return Err(ExtractError::Ooxml(format!(
            "ZIP entry {} exceeds size limit ({} bytes)",
            name, max_bytes
        )));
    }
    Ok(out)
}

/// Word document text. Paragraphs (`w:p`) are separated by blank lines so
/// the chunker can split on them.
pub fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = open_archive(bytes)?;
    let xml = read_zip_entry_bounded(&mut archive, "word/document.xml", MAX_XML_ENTRY_BYTES)?;

    let mut out = String::new();
    let mut para = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml.as_slice());
    let mut buf = Vec::new();
    let mut in_t = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_t = true,
            Ok(Event::Text(te)) if in_t => {
                para.push_str(te.unescape().unwrap_or_default().as_ref());
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_t = false,
                b"p" => {
                    let trimmed = para.trim();
                    if !trimmed.is_empty() {
                        if !out.is_empty() {
                            out.push_str("\n\n");
                        }
                        out.push_str(trimmed);
                    }
                    para.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"tab" => para.push('\t'),
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    if !para.trim().is_empty() {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(para.trim());
    }
    Ok(out)
}

/// Worksheet text, one section per sheet labelled `Sheet<N>`. Shared
/// strings, inline strings and literal values are all included; cells of
/// one row are joined with tabs.
pub fn extract_xlsx(bytes: &[u8]) -> Result<Vec<Section>, ExtractError> {
    let mut archive = open_archive(bytes)?;
    let shared_strings = if archive.file_names().any(|n| n == "xl/sharedStrings.xml") {
        read_shared_strings(&mut archive)?
    } else {
        Vec::new()
    };

    let mut sections = Vec::new();
    for (n, name) in list_worksheet_names(&archive)
        .into_iter()
        .take(XLSX_MAX_SHEETS)
    {
        let xml = read_zip_entry_bounded(&mut archive, &name, MAX_XML_ENTRY_BYTES)?;
        let text = extract_sheet_rows(&xml, &shared_strings)?;
        if !text.trim().is_empty() {
            sections.push(Section {
                label: Some(format!("Sheet{}", n)),
                text,
            });
        }
    }
    Ok(sections)
}

fn read_shared_strings(archive: &mut Archive<'_>) -> Result<Vec<String>, ExtractError> {
    let xml = read_zip_entry_bounded(archive, "xl/sharedStrings.xml", MAX_XML_ENTRY_BYTES)?;
    let mut strings = Vec::new();
    let mut reader = quick_xml::Reader::from_reader(xml.as_slice());
    let mut buf = Vec::new();
    let mut current: Option<String> = None;
    let mut in_t = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"t" => in_t = true,
                _ => {}
            },
            Ok(Event::Text(te)) if in_t => {
                if let Some(s) = current.as_mut() {
                    s.push_str(te.unescape().unwrap_or_default().as_ref());
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"si" => strings.extend(current.take()),
                b"t" => in_t = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

/// `(sheet number, entry name)` pairs sorted by sheet number.
fn list_worksheet_names(archive: &Archive<'_>) -> Vec<(u32, String)> {
    let mut names: Vec<(u32, String)> = archive
        .file_names()
        .filter(|n| n.starts_with("xl/worksheets/sheet") && n.ends_with(".xml"))
        .filter_map(|n| {
            n.trim_start_matches("xl/worksheets/sheet")
                .trim_end_matches(".xml")
                .parse::<u32>()
                .ok()
                .map(|i| (i, n.to_string()))
        })
        .collect();
    names.sort();
    names
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Shared,
    Inline,
    Literal,
}

fn extract_sheet_rows(xml: &[u8], shared_strings: &[String]) -> Result<String, ExtractError> {
    let mut lines: Vec<String> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut kind = CellKind::Literal;
    let mut in_value = false;
    let mut cell_count = 0usize;
    loop {
        if cell_count >= XLSX_MAX_CELLS_PER_SHEET {
            break;
        }
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"c" => {
                    kind = CellKind::Literal;
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"t" {
                            kind = match attr.value.as_ref() {
                                b"s" => CellKind::Shared,
                                b"inlineStr" => CellKind::Inline,
                                _ => CellKind::Literal,
                            };
                        }
                    }
                }
                b"v" => in_value = true,
                b"t" if kind == CellKind::Inline => in_value = true,
                _ => {}
            },
            Ok(Event::Text(te)) if in_value => {
                let raw = te.unescape().unwrap_or_default();
                let value = raw.trim();
                let text = match kind {
                    CellKind::Shared => value
                        .parse::<usize>()
                        .ok()
                        .and_then(|i| shared_strings.get(i).cloned()),
                    _ => Some(value.to_string()),
                };
                if let Some(text) = text.filter(|t| !t.is_empty()) {
                    row.push(text);
                    cell_count += 1;
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"row" => {
                    if !row.is_empty() {
                        lines.push(row.join("\t"));
                        row.clear();
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    if !row.is_empty() {
        lines.push(row.join("\t"));
    }
    Ok(lines.join("\n"))
}

/// CSV rows as text lines. With a header row, each data row becomes
/// `header: value` pairs; a header-only file yields the header line.
/// Line breaks inside quoted fields are folded into spaces.
pub fn extract_csv(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ExtractError::Csv(format!("failed to read header: {}", e)))?
        .iter()
        .map(fold_lines)
        .collect();

    let mut lines = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ExtractError::Csv(e.to_string()))?;
        let pairs: Vec<String> = record
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_empty())
            .map(|(i, v)| match headers.get(i).filter(|h| !h.is_empty()) {
                Some(h) => format!("{}: {}", h, fold_lines(v)),
                None => fold_lines(v),
            })
            .collect();
        if !pairs.is_empty() {
            lines.push(pairs.join(", "));
        }
    }
    if lines.is_empty() {
        return Ok(headers.join(", "));
    }
    Ok(lines.join("\n"))
}

fn fold_lines(value: &str) -> String {
    value
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// JSON flattened into `path: value` lines, e.g. `items[0].name: widget`.
pub fn extract_json(bytes: &[u8]) -> Result<String, ExtractError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| ExtractError::Json(e.to_string()))?;
    let mut lines = Vec::new();
    flatten_json("", &value, &mut lines);
    Ok(lines.join("\n"))
}

fn flatten_json(path: &str, value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, v) in map {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                flatten_json(&child, v, out);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten_json(&format!("{}[{}]", path, i), v, out);
            }
        }
        Value::Null => {}
        Value::String(s) => push_leaf(path, s, out),
        other => push_leaf(path, &other.to_string(), out),
    }
}

fn push_leaf(path: &str, value: &str, out: &mut Vec<String>) {
    if path.is_empty() {
        out.push(value.to_string());
    } else {
        out.push(format!("{}: {}", path, value));
    }
}

/// Reject empty extractions; otherwise wrap the text as a single section.
pub(crate) fn non_empty(text: String) -> Result<Vec<Section>, ExtractError> {
    if text.trim().is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(vec![Section::whole(text)])
}
