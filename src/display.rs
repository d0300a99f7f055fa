// Plain-text rendering of stores and documents, shared by the one-shot
// actions and the interactive menu.

use crate::api::{Document, Store};
use comfy_table::{presets, Table};
use std::io::{self, Write};

/// `Display Name | ID (name)` table, one row per store. Columns are sized
/// by display width, so wide characters stay aligned.
pub fn write_store_table(out: &mut dyn Write, stores: &[Store]) -> io::Result<()> {
    writeln!(out, "{}", store_table(stores))
}

fn store_table(stores: &[Store]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::ASCII_NO_BORDERS);
    table.set_header(vec!["Display Name", "ID (name)"]);
    for store in stores {
        table.add_row(vec![store.display_name.as_str(), store.name.as_str()]);
    }
    table
}

/// Full record of a document, including state and timestamps.
pub fn write_document_details(out: &mut dyn Write, doc: &Document) -> io::Result<()> {
    writeln!(out, "  - Display Name: {}", doc.display_name)?;
    writeln!(out, "    Name: {}", doc.name)?;
    writeln!(out, "    State: {}", doc.state)?;
    writeln!(out, "    MIME Type: {}", doc.mime_type)?;
    writeln!(out, "    Size: {} bytes", format_thousands(doc.size_bytes()))?;
    writeln!(out, "    Created: {}", doc.create_time)?;
    writeln!(out, "    Updated: {}", doc.update_time)?;
    writeln!(out)
}

pub fn write_document_summary(out: &mut dyn Write, doc: &Document) -> io::Result<()> {
    writeln!(out, "{}", "-".repeat(40))?;
    writeln!(out, "  Name: {}", doc.display_name)?;
    writeln!(out, "     ID: {}", doc.name)?;
    writeln!(out, "     Type: {}", doc.mime_type)?;
    writeln!(out, "     Size: {} bytes", format_thousands(doc.size_bytes()))
}

/// `1234567` -> `1,234,567`.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicode_width::UnicodeWidthStr;

    #[test]
    fn thousands_separator() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }

    fn store(name: &str, display_name: &str) -> Store {
        Store {
            name: name.into(),
            display_name: display_name.into(),
            ..Default::default()
        }
    }

    fn render(stores: &[Store]) -> String {
        let mut out = Vec::new();
        write_store_table(&mut out, stores).unwrap();
        String::from_utf8(out).unwrap()
    }

    /// Display column of the first `|` on a line.
    fn separator_column(line: &str) -> Option<usize> {
        let byte = line.find('|')?;
        Some(UnicodeWidthStr::width(&line[..byte]))
    }

    #[test]
    fn store_table_aligns_wide_names() {
        let text = render(&[
            store("fileSearchStores/a", "Docs"),
            store("fileSearchStores/b", "資料フォルダ"),
        ]);
        let columns: Vec<_> = text
            .lines()
            .filter(|l| l.contains("fileSearchStores/") || l.contains("Display Name"))
            .map(|l| separator_column(l).expect("separator on row"))
            .collect();
        assert_eq!(columns.len(), 3);
        assert!(columns.iter().all(|c| *c == columns[0]));
    }

    #[test]
    fn store_table_lists_every_store() {
        let text = render(&[
            store("fileSearchStores/docs-1", "Docs"),
            store("fileSearchStores/misc-2", "Misc"),
        ]);
        let header = text.lines().next().unwrap_or_default();
        assert!(header.contains("Display Name") && header.contains("ID (name)"));
        assert!(text
            .lines()
            .any(|l| l.contains("Docs") && l.contains("| fileSearchStores/docs-1")));
        assert!(text.contains("fileSearchStores/misc-2"));
    }

    #[test]
    fn document_details_format_size() {
        let doc: Document = serde_json::from_str(
            r#"{"name":"fileSearchStores/s/documents/d","displayName":"big.pdf","sizeBytes":"1048576","state":"STATE_ACTIVE"}"#,
        )
        .unwrap();
        let mut out = Vec::new();
        write_document_details(&mut out, &doc).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Size: 1,048,576 bytes"));
        assert!(text.contains("State: STATE_ACTIVE"));
    }
}
