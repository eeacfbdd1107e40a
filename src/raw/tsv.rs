//! Reader for the tab-separated table format.

use super::{DataReader, RawBlock, RawItem, RawRow, Table};
use crate::error::DataError;
use crate::names::normalize;
use camino::Utf8Path;
use std::fs;

const CONTINUATION: &str = "...";
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Reads `.tsv` data sources.
///
/// ```rust
/// use camino::Utf8Path;
/// use kwresolve::raw::{ContentKind, TsvReader};
///
/// let block = TsvReader::parse(
///     Utf8Path::new("suite.tsv"),
///     "*Test Cases*\nExample\tLog\thello\n",
/// );
/// assert_eq!(block.content_kind(), ContentKind::TestCase);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct TsvReader;

fn table_for(header: &str) -> Option<Table> {
    match normalize(header.trim_matches('*'), &[]).as_str() {
        "setting" | "settings" | "metadata" => Some(Table::Setting),
        "variable" | "variables" => Some(Table::Variable),
        "testcase" | "testcases" => Some(Table::TestCase),
        "keyword" | "keywords" | "userkeyword" | "userkeywords" => Some(Table::Keyword),
        _ => None,
    }
}

fn split_cells(line: &str) -> Vec<String> {
    let mut cells: Vec<String> = line
        .split('\t')
        .map(str::trim)
        .take_while(|c| !c.starts_with('#'))
        .map(str::to_owned)
        .collect();
    while cells.last().is_some_and(String::is_empty) {
        cells.pop();
    }
    cells
}

struct TableParser<'a> {
    source: &'a str,
    block: RawBlock,
    table: Option<Table>,
}

impl<'a> TableParser<'a> {
    fn new(path: &'a Utf8Path) -> Self {
        Self {
            source: path.as_str(),
            block: RawBlock::empty(Some(path)),
            table: None,
        }
    }

    fn push_line(&mut self, row: usize, cells: Vec<String>) {
        if cells.first().is_some_and(|c| c.starts_with('*')) {
            self.table = cells.first().and_then(|c| table_for(c));
            return;
        }
        match self.table {
            Some(Table::Setting) => Self::push_flat(&mut self.block.settings, row, cells),
            Some(Table::Variable) => Self::push_flat(&mut self.block.variables, row, cells),
            Some(table @ (Table::TestCase | Table::Keyword)) => self.push_item_row(table, row, cells),
            None => {}
        }
    }

    fn push_flat(rows: &mut Vec<RawRow>, row: usize, cells: Vec<String>) {
        if cells.first().is_some_and(|c| c == CONTINUATION) {
            if let Some(previous) = rows.last_mut() {
                previous.cells.extend(cells.into_iter().skip(1));
            }
            return;
        }
        rows.push(RawRow { row, cells });
    }

    fn items(&mut self, table: Table) -> &mut Vec<RawItem> {
        match table {
            Table::Keyword => &mut self.block.keywords,
            Table::TestCase | Table::Setting | Table::Variable => &mut self.block.testcases,
        }
    }

    fn push_item_row(&mut self, table: Table, row: usize, cells: Vec<String>) {
        let mut iter = cells.into_iter();
        let name = iter.next().unwrap_or_default();
        let body: Vec<String> = iter.collect();
        if !name.is_empty() && name != CONTINUATION {
            let mut item = RawItem::new(name, row, table, self.source);
            if !body.is_empty() {
                item.rows.push(RawRow { row, cells: body });
            }
            self.items(table).push(item);
            return;
        }
        let Some(item) = self.items(table).last_mut() else {
            return;
        };
        let continues = name == CONTINUATION || body.first().is_some_and(|c| c == CONTINUATION);
        if continues {
            let skip = usize::from(name != CONTINUATION);
            if let Some(previous) = item.rows.last_mut() {
                previous.cells.extend(body.into_iter().skip(skip));
            }
        } else if !body.is_empty() {
            item.rows.push(RawRow { row, cells: body });
        }
    }
}

impl TsvReader {
    /// Tokenise TSV `text` read from `path`.
    ///
    /// Rows outside a recognised table are dropped. A leading UTF-8 byte
    /// order mark is ignored.
    #[must_use]
    pub fn parse(path: &Utf8Path, text: &str) -> RawBlock {
        let mut parser = TableParser::new(path);
        let body = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
        for (idx, line) in body.lines().enumerate() {
            let cells = split_cells(line);
            if cells.is_empty() {
                continue;
            }
            parser.push_line(idx + 1, cells);
        }
        parser.block
    }

    /// Read `path` from disk and tokenise it regardless of its extension.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Read`] when the file cannot be read as UTF-8 text.
    pub fn read_any(path: &Utf8Path) -> Result<RawBlock, DataError> {
        let text = fs::read_to_string(path).map_err(|source| DataError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(path, &text))
    }
}

impl DataReader for TsvReader {
    fn read(&self, path: &Utf8Path) -> Result<RawBlock, DataError> {
        let is_tsv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
        if !is_tsv {
            return Err(DataError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
        Self::read_any(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::ContentKind;
    use rstest::rstest;

    const SUITE: &str = concat!(
        "*Settings*\n",
        "Documentation\tExample suite\n",
        "...\tspanning rows\n",
        "Force Tags\tsmoke\n",
        "\n",
        "*Variables*\n",
        "${HOST}\tlocalhost\n",
        "# a comment row\n",
        "*Test Cases*\n",
        "First\t[Tags]\tquick\n",
        "\tLog\tone\n",
        "\t...\ttwo\n",
        "Second\tNo Operation\n",
        "\t\t\n",
        "*Keywords*\n",
        "Helper\t[Arguments]\t${a}\n",
        "\tLog\t${a}\t# trailing comment\n",
    );

    fn parsed() -> RawBlock {
        TsvReader::parse(Utf8Path::new("/data/suite.tsv"), SUITE)
    }

    #[rstest]
    fn settings_rows_and_continuations() {
        let block = parsed();
        assert_eq!(block.settings.len(), 2);
        let doc = block.settings.first().expect("doc row");
        assert_eq!(doc.cells, ["Documentation", "Example suite", "spanning rows"]);
        assert_eq!(doc.row, 2);
    }

    #[rstest]
    fn byte_order_mark_does_not_hide_the_first_header() {
        let block = TsvReader::parse(
            Utf8Path::new("s.tsv"),
            "\u{feff}*Test Cases*\nT\tNo Operation\n",
        );
        assert_eq!(block.content_kind(), ContentKind::TestCase);
        assert_eq!(block.testcases.len(), 1);
        let step = block.testcases.first().and_then(|t| t.rows.first()).expect("step");
        assert_eq!(step.row, 2);
    }

    #[rstest]
    fn comments_and_blank_rows_are_dropped() {
        let block = parsed();
        assert_eq!(block.variables.len(), 1);
        let helper = block.keywords.first().expect("keyword");
        let last = helper.rows.last().expect("step");
        assert_eq!(last.cells, ["Log", "${a}"]);
    }

    #[rstest]
    fn test_case_items_collect_rows() {
        let block = parsed();
        assert_eq!(block.content_kind(), ContentKind::TestCase);
        let names: Vec<_> = block.testcases.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["First", "Second"]);
        let first = block.testcases.first().expect("first");
        assert_eq!(first.rows.len(), 2);
        let log = first.rows.get(1).expect("log row");
        assert_eq!(log.cells, ["Log", "one", "two"]);
        assert_eq!(first.source, "/data/suite.tsv");
    }

    #[rstest]
    #[case("*Setting*", Some(Table::Setting))]
    #[case("***Test Cases***", Some(Table::TestCase))]
    #[case("*User Keywords*", Some(Table::Keyword))]
    #[case("*Unknown*", None)]
    fn table_headers(#[case] header: &str, #[case] expected: Option<Table>) {
        assert_eq!(table_for(header), expected);
    }

    #[rstest]
    fn reader_rejects_other_extensions() {
        let err = TsvReader
            .read(Utf8Path::new("suite.html"))
            .expect_err("html is not read natively");
        assert!(matches!(err, DataError::UnsupportedFormat { .. }));
    }
}
