use super::SourceRow;

/// One row per non-blank line, fields split on commas.
///
/// Positions are 1-based line numbers in the original text, so blank lines
/// still advance the count.
pub fn text_rows(text: &str) -> Vec<SourceRow> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| SourceRow {
            position: i + 1,
            raw_line: line.trim().to_owned(),
            fields: line.split(',').map(str::to_owned).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_lines_but_keeps_numbering() {
        let rows = text_rows("A,1\n\n   \r\nB,2,tagX\r\n,\n");
        let summary: Vec<_> = rows.iter().map(|r| (r.position, r.raw_line.as_str())).collect();
        assert_eq!(summary, [(1, "A,1"), (4, "B,2,tagX"), (5, ",")]);
        assert_eq!(rows[1].fields, ["B", "2", "tagX"]);
    }

    #[test]
    fn empty_text_has_no_rows() {
        assert!(text_rows("").is_empty());
        assert!(text_rows("\n \n").is_empty());
    }
}
