//! Hand-written SpreadsheetML (Excel 2003 XML) workbook serializer
//!
//! A [`Workbook`] is an ordered list of named [`Sheet`]s, each a grid of text
//! cells. Rendering is fully deterministic: no timestamps, styles or metadata
//! are emitted, so identical input always yields identical bytes.

/// Grid of text cells
pub type Rows = Vec<Vec<String>>;

/// A named sheet of text rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub rows: Rows,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Rows) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    fn render(&self, out: &mut String) {
        out.push_str("<Worksheet ss:Name=\"");
        out.push_str(&escape_markup(&self.name));
        out.push_str("\"><Table>");
        for row in &self.rows {
            out.push_str("<Row>");
            for cell in row {
                out.push_str("<Cell><Data ss:Type=\"String\">");
                out.push_str(&escape_markup(cell));
                out.push_str("</Data></Cell>");
            }
            out.push_str("</Row>");
        }
        out.push_str("</Table></Worksheet>");
    }
}

/// Ordered collection of sheets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

const WORKBOOK_HEAD: &str = "<?xml version=\"1.0\"?>\n\
<Workbook xmlns=\"urn:schemas-microsoft-com:office:spreadsheet\"\n \
xmlns:o=\"urn:schemas-microsoft-com:office:office\"\n \
xmlns:x=\"urn:schemas-microsoft-com:office:excel\"\n \
xmlns:ss=\"urn:schemas-microsoft-com:office:spreadsheet\">\n";

const WORKBOOK_TAIL: &str = "\n</Workbook>";

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append a sheet
    pub fn sheet(mut self, name: impl Into<String>, rows: Rows) -> Self {
        self.sheets.push(Sheet::new(name, rows));
        self
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Serialize to SpreadsheetML text (sheets joined by newlines)
    pub fn to_xml(&self) -> String {
        let mut out = String::from(WORKBOOK_HEAD);
        for (i, sheet) in self.sheets.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            sheet.render(&mut out);
        }
        out.push_str(WORKBOOK_TAIL);
        out
    }
}

/// Escape the five reserved markup characters
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

/// Place two tables next to each other with `gap` blank cells between them
///
/// Each output row is the left row's own cells, then `gap` empty cells, then
/// the right row's cells. A missing row on either side counts as empty.
pub fn side_by_side(left: &[Vec<String>], right: &[Vec<String>], gap: usize) -> Rows {
    let height = left.len().max(right.len());

    (0..height)
        .map(|i| {
            let mut row: Vec<String> = left.get(i).cloned().unwrap_or_default();
            row.extend(std::iter::repeat(String::new()).take(gap));
            if let Some(r) = right.get(i) {
                row.extend(r.iter().cloned());
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_escape_markup() {
        assert_eq!(
            escape_markup(r#"a&b<c>d"e'f"#),
            "a&amp;b&lt;c&gt;d&quot;e&#039;f"
        );
        assert_eq!(escape_markup("716.50"), "716.50");
        assert_eq!(escape_markup("&amp;"), "&amp;amp;");
    }

    #[test]
    fn test_side_by_side_gap_follows_each_left_row() {
        let left = vec![row(&["L"]), row(&["a", "b"]), row(&["c", "d"])];
        let right = vec![row(&["R"]), row(&["x", "y", "z"])];

        let rows = side_by_side(&left, &right, 3);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], row(&["L", "", "", "", "R"]));
        assert_eq!(rows[1], row(&["a", "b", "", "", "", "x", "y", "z"]));
        assert_eq!(rows[2], row(&["c", "d", "", "", ""]));
    }

    #[test]
    fn test_side_by_side_shorter_left() {
        let left = vec![row(&["a"])];
        let right = vec![row(&["x"]), row(&["y"])];
        let rows = side_by_side(&left, &right, 3);
        assert_eq!(rows[0], row(&["a", "", "", "", "x"]));
        assert_eq!(rows[1], row(&["", "", "", "y"]));
    }

    #[test]
    fn test_workbook_structure() {
        let wb = Workbook::new()
            .sheet("One", vec![row(&["a<b"])])
            .sheet("Two & Three", vec![row(&["x", "y"]), row(&[])]);

        let xml = wb.to_xml();
        assert!(xml.starts_with("<?xml version=\"1.0\"?>\n<Workbook "));
        assert!(xml.ends_with("</Table></Worksheet>\n</Workbook>"));
        assert_eq!(xml.matches("<Worksheet ").count(), 2);
        assert_eq!(xml.matches("<Row>").count(), 3);
        assert_eq!(xml.matches("<Cell>").count(), 3);
        assert!(xml.contains("ss:Name=\"Two &amp; Three\""));
        assert!(xml.contains("<Data ss:Type=\"String\">a&lt;b</Data>"));
        assert!(xml.contains("<Row></Row>"));
    }

    #[test]
    fn test_workbook_is_deterministic() {
        let build = || {
            Workbook::new()
                .sheet("S", vec![row(&["1", "2"]), row(&["3"])])
                .to_xml()
        };
        assert_eq!(build(), build());
    }
}
