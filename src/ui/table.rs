//! ui::table
//!
//! Plain-text column layout for metadata tables.
//!
//! Columns are left-aligned and padded to the widest cell (counted in
//! characters). A rule of dashes separates the header from the rows.
//! Trailing whitespace is trimmed from every line.

/// A table with a fixed header.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing cells render empty; extra cells are dropped.
    pub fn row<I, S>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells: Vec<String> = cells.into_iter().map(Into::into).collect();
        cells.resize(self.headers.len(), String::new());
        self.rows.push(cells);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|col| {
                std::iter::once(&self.headers[col])
                    .chain(self.rows.iter().map(|r| &r[col]))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(render_line(&self.headers, &widths));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("  "),
        );
        for row in &self.rows {
            lines.push(render_line(row, &widths));
        }
        lines.join("\n")
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width - cell.chars().count();
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_columns() {
        let mut table = Table::new(["Property", "Value", "Issues"]);
        table.row(["Title", "Q3", ""]);
        table.row(["Revision", "abc", "Invalid revision number"]);

        let expected = "\
Property  Value  Issues
--------  -----  -----------------------
Title     Q3
Revision  abc    Invalid revision number";
        assert_eq!(table.render(), expected);
    }

    #[test]
    fn short_rows_are_padded() {
        let mut table = Table::new(["Key", "Value"]);
        table.row(["Make"]);
        assert_eq!(table.render(), "Key   Value\n----  -----\nMake");
    }

    #[test]
    fn widths_count_characters() {
        let mut table = Table::new(["A", "B"]);
        table.row(["café", "x"]);
        assert_eq!(table.render(), "A     B\n----  -\ncafé  x");
    }
}
