//! Column-aligned text tables whose cells may carry ANSI styling.
//!
//! Widths are measured on the visible text only, so a green `0*` lines up
//! with a plain `12*`. Output is fully deterministic, which the live renderer
//! relies on to count the lines it has to erase.

use std::fmt;

use console::measure_text_width;

/// String placed between two columns.
pub const SEPARATOR: &str = " | ";

#[derive(Debug, Clone)]
struct Cell {
    content: String,
    width: usize,
}

impl Cell {
    fn new(content: String) -> Self {
        let width = measure_text_width(&content);
        Self { content, width }
    }

    fn write_padded(&self, out: &mut String, width: usize) {
        out.push_str(&self.content);
        pad(out, width.saturating_sub(self.width));
    }
}

fn pad(out: &mut String, count: usize) {
    out.extend(std::iter::repeat(' ').take(count));
}

/// A table built row by row. Rows do not need the same number of cells.
#[derive(Debug, Clone, Default)]
pub struct Table {
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows
            .push(cells.into_iter().map(|c| Cell::new(c.into())).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Display width of every column.
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = Vec::new();
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate() {
                if idx >= widths.len() {
                    widths.push(0);
                }
                widths[idx] = widths[idx].max(cell.width);
            }
        }
        widths
    }

    /// Renders the table, one `\n`-terminated line per row.
    pub fn render(&self) -> String {
        let widths = self.column_widths();
        let cols = widths.len();
        let mut out = String::new();

        for row in &self.rows {
            for (idx, &width) in widths.iter().enumerate() {
                match row.get(idx) {
                    Some(cell) => cell.write_padded(&mut out, width),
                    // Missing trailing cells are blank; the last column needs no fill
                    None if idx + 1 < cols => pad(&mut out, width),
                    None => {}
                }
                if idx + 1 < cols {
                    out.push_str(SEPARATOR);
                }
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console::{strip_ansi_codes, Style};
    use proptest::prelude::*;

    fn green(text: &str) -> String {
        Style::new()
            .green()
            .force_styling(true)
            .apply_to(text)
            .to_string()
    }

    #[test]
    fn test_empty_table_renders_nothing() {
        let table = Table::new();
        assert!(table.is_empty());
        assert_eq!(table.render(), "");
    }

    #[test]
    fn test_columns_are_aligned() {
        let mut table = Table::new();
        table.add_row(["REPOSITORY", "BRANCH", "STATUS"]);
        table.add_row(["a", "main", "0*"]);
        table.add_row(["longer-name", "dev", "3* 1↓"]);

        let expected = concat!(
            "REPOSITORY  | BRANCH | STATUS\n",
            "a           | main   | 0*    \n",
            "longer-name | dev    | 3* 1↓ \n",
        );
        assert_eq!(table.render(), expected);
    }

    #[test]
    fn test_styled_cells_measure_visible_width() {
        let mut table = Table::new();
        table.add_row(["name", "status"]);
        table.add_row([green("repo").as_str(), green("0*").as_str()]);

        let rendered = table.render();
        assert!(rendered.contains("\u{1b}["), "styling must be preserved");

        let plain = strip_ansi_codes(&rendered);
        let lines: Vec<&str> = plain.lines().collect();
        assert_eq!(lines[0], "name | status");
        assert_eq!(lines[1], "repo | 0*    ");
    }

    #[test]
    fn test_ragged_rows() {
        let mut table = Table::new();
        table.add_row(["a", "b", "c"]);
        table.add_row(["long"]);
        table.add_row(["x", "yy"]);

        let expected = concat!(
            "a    | b  | c\n",
            "long |    | \n",
            "x    | yy | \n",
        );
        assert_eq!(table.render(), expected);
        assert_eq!(table.column_widths(), vec![4, 2, 1]);
    }

    #[test]
    fn test_display_matches_render() {
        let mut table = Table::new();
        table.add_row(["one", "two"]);
        assert_eq!(table.to_string(), table.render());
    }

    proptest! {
        /// Property: styling never changes the rendered display width
        #[test]
        fn styled_and_plain_tables_have_equal_width(
            rows in prop::collection::vec(
                prop::collection::vec("[a-z0-9 ↓↑*?]{0,12}", 1..4),
                1..6,
            )
        ) {
            let mut plain = Table::new();
            let mut styled = Table::new();
            for row in &rows {
                plain.add_row(row.iter().cloned());
                styled.add_row(row.iter().map(|c| green(c)));
            }

            let plain_out = plain.render();
            let styled_out = styled.render();
            prop_assert_eq!(strip_ansi_codes(&styled_out).to_string(), plain_out.clone());
            prop_assert_eq!(plain_out.matches('\n').count(), rows.len());
        }

        /// Property: rendering is deterministic
        #[test]
        fn rendering_is_deterministic(
            rows in prop::collection::vec(prop::collection::vec("[a-z]{0,8}", 0..4), 0..6)
        ) {
            let mut table = Table::new();
            for row in &rows {
                table.add_row(row.iter().cloned());
            }
            prop_assert_eq!(table.render(), table.render());
        }
    }
}
