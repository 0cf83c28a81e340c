use std::{io::Cursor, path::Path};

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::{
    error::{Error, Result},
    tags::split_tag_cell,
};

use super::SourceRow;

pub const SHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Reads the first worksheet into rows of cell text, each paired with its
/// 1-based row number as shown in a spreadsheet application.
pub fn read_sheet(bytes: Vec<u8>, file_name: Option<&str>) -> Result<Vec<(usize, Vec<String>)>> {
    if let Some(file_name) = file_name {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        if !extension.is_some_and(|ext| SHEET_EXTENSIONS.contains(&ext.as_str())) {
            return Err(Error::InvalidFormat(format!("{file_name:?} is not a spreadsheet")));
        }
    }

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|err| Error::InvalidFormat(err.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::InvalidFormat("workbook has no worksheets".to_owned()))?
        .map_err(|err| Error::InvalidFormat(err.to_string()))?;

    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    Ok(range
        .rows()
        .enumerate()
        .map(|(i, cells)| (first_row + i + 1, cells.iter().map(cell_text).collect()))
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // phone numbers typed into a numeric cell
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum TagColumn {
    /// `tags`: one cell, comma-joined.
    Joined(usize),
    /// `tag`, `tag1`, `tag2`, ...: one tag per cell.
    Single(usize),
}

/// Header-name binding of the columns a roster upload understands.
#[derive(Debug, PartialEq, Eq)]
pub struct Columns {
    name: usize,
    contact: usize,
    tags: Vec<TagColumn>,
}

impl Columns {
    /// Binds columns by case-insensitive header name. Unknown headers are ignored.
    pub fn bind(header: &[String]) -> Result<Self> {
        let mut name = None;
        let mut contact = None;
        let mut tags = Vec::new();

        for (i, title) in header.iter().enumerate() {
            let title = title.trim().to_ascii_lowercase();
            match title.as_str() {
                "name" => { name.get_or_insert(i); }
                "contact" => { contact.get_or_insert(i); }
                "tags" => tags.push(TagColumn::Joined(i)),
                "tag" => tags.push(TagColumn::Single(i)),
                _ => {
                    let numbered = title
                        .strip_prefix("tag")
                        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
                    if numbered {
                        tags.push(TagColumn::Single(i));
                    }
                }
            }
        }

        Ok(Self {
            name: name.ok_or_else(|| Error::InvalidFormat("missing required column \"name\"".to_owned()))?,
            contact: contact.ok_or_else(|| Error::InvalidFormat("missing required column \"contact\"".to_owned()))?,
            tags,
        })
    }

    /// Maps a data row onto the row parser's field order: name, contact, tags.
    pub fn fields(&self, cells: &[String]) -> Vec<String> {
        let cell = |i: usize| cells.get(i).map_or("", String::as_str);

        let mut fields = vec![cell(self.name).to_owned(), cell(self.contact).to_owned()];
        for column in &self.tags {
            match *column {
                TagColumn::Joined(i) => fields.extend(split_tag_cell(cell(i))),
                TagColumn::Single(i) => fields.push(cell(i).to_owned()),
            }
        }
        fields
    }
}

/// Binds the header row and turns every non-blank data row into a source row.
pub fn sheet_rows(grid: Vec<(usize, Vec<String>)>) -> Result<Vec<SourceRow>> {
    let mut grid = grid.into_iter();
    let (_, header) = grid
        .next()
        .ok_or_else(|| Error::InvalidFormat("spreadsheet is empty".to_owned()))?;
    let columns = Columns::bind(&header)?;

    Ok(grid
        .filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()))
        .map(|(position, cells)| SourceRow {
            position,
            fields: columns.fields(&cells),
            raw_line: cells.join(", ").trim_end_matches([',', ' ']).to_owned(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn binds_headers_case_insensitively() {
        let columns = Columns::bind(&strings(&["Tag2", " CONTACT ", "Notes", "Name", "Tags", "tag1"])).unwrap();
        assert_eq!(columns, Columns {
            name: 3,
            contact: 1,
            tags: vec![TagColumn::Single(0), TagColumn::Joined(4), TagColumn::Single(5)],
        });
    }

    #[test]
    fn required_headers_must_exist() {
        assert!(matches!(Columns::bind(&strings(&["Name", "Phone"])), Err(Error::InvalidFormat(_))));
        assert!(matches!(Columns::bind(&strings(&["tagline", "Contact"])), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn merges_joined_and_single_tag_columns() {
        let columns = Columns::bind(&strings(&["Name", "Contact", "Tags", "tag1"])).unwrap();
        let fields = columns.fields(&strings(&["Jo", "j@x.com", "A, B", "C"]));
        assert_eq!(fields, ["Jo", "j@x.com", "A", "B", "C"]);

        // short rows read missing cells as empty
        assert_eq!(columns.fields(&strings(&["Jo"])), ["Jo", ""]);
    }

    #[test]
    fn skips_blank_rows_and_keeps_sheet_numbering() {
        let grid = vec![
            (1, strings(&["Name", "Contact"])),
            (2, strings(&["Jo", "j@x.com"])),
            (3, strings(&["", " "])),
            (4, strings(&["", "k@x.com"])),
        ];
        let rows = sheet_rows(grid).unwrap();
        let summary: Vec<_> = rows.iter().map(|r| (r.position, r.raw_line.as_str())).collect();
        assert_eq!(summary, [(2, "Jo, j@x.com"), (4, ", k@x.com")]);
    }

    #[test]
    fn empty_grid_is_invalid() {
        assert!(matches!(sheet_rows(Vec::new()), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn rejects_non_spreadsheets() {
        let err = read_sheet(b"name,contact\nJo,1".to_vec(), Some("roster.csv")).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));

        let err = read_sheet(b"definitely not a workbook".to_vec(), Some("roster.xlsx")).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn whole_numbers_lose_their_decimal_point() {
        assert_eq!(cell_text(&Data::Float(9171234567.0)), "9171234567");
        assert_eq!(cell_text(&Data::String("Jo".to_owned())), "Jo");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
