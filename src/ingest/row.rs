use std::fmt;

use crate::model::PersonDraft;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowErrorReason {
    InsufficientFields,
    MissingName,
    MissingContact,
}

impl fmt::Display for RowErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            RowErrorReason::InsufficientFields => "insufficient fields",
            RowErrorReason::MissingName => "missing name",
            RowErrorReason::MissingContact => "missing contact",
        })
    }
}

/// A row that could not become a person. Local to one row, never fatal to a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub reason: RowErrorReason,
    pub raw_line: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({:?})", self.reason, self.raw_line)
    }
}

/// Turns an ordered field list into a draft: name, contact, then tag candidates.
///
/// `raw_line` is only carried into the error for reporting.
pub fn parse_row<S: AsRef<str>>(fields: &[S], raw_line: &str) -> Result<PersonDraft, RowError> {
    let field = |i: usize| fields.get(i).map_or("", |f| f.as_ref().trim());
    let (name, contact) = (field(0), field(1));

    let reason = match (name.is_empty(), contact.is_empty()) {
        (false, false) => {
            let tags = fields.iter().skip(2).map(|f| f.as_ref());
            return Ok(PersonDraft::new(name, contact, tags));
        }
        (true, true) => RowErrorReason::InsufficientFields,
        _ if fields.len() < 2 => RowErrorReason::InsufficientFields,
        (true, false) => RowErrorReason::MissingName,
        (false, true) => RowErrorReason::MissingContact,
    };

    Err(RowError {
        reason,
        raw_line: raw_line.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(fields: &[&str]) -> RowErrorReason {
        parse_row(fields, &fields.join(",")).unwrap_err().reason
    }

    #[test]
    fn name_and_contact_are_enough() {
        let draft = parse_row(&["Ana", " 0917 "], "Ana, 0917 ").unwrap();
        assert_eq!(draft, PersonDraft::new("Ana", "0917", Vec::<String>::new()));
    }

    #[test]
    fn extra_fields_become_normalized_tags() {
        let draft = parse_row(&["Ana", "0917", " IT", "", "IT", "Floor 3"], "").unwrap();
        assert_eq!(draft.tags, ["IT", "Floor 3"]);
    }

    #[test]
    fn tags_named_after_statuses_are_kept() {
        let draft = parse_row(&["Ana", "0917", "safe"], "").unwrap();
        assert_eq!(draft.tags, ["safe"]);
    }

    #[test]
    fn too_few_usable_fields() {
        assert_eq!(reason(&["invalid"]), RowErrorReason::InsufficientFields);
        assert_eq!(reason(&["", ""]), RowErrorReason::InsufficientFields);
        assert_eq!(reason(&[]), RowErrorReason::InsufficientFields);
        assert_eq!(reason(&["  ", " ", "tag"]), RowErrorReason::InsufficientFields);
    }

    #[test]
    fn names_the_missing_field() {
        assert_eq!(reason(&["", "k@x.com"]), RowErrorReason::MissingName);
        assert_eq!(reason(&["Jo", " "]), RowErrorReason::MissingContact);
    }

    #[test]
    fn error_keeps_raw_line() {
        let err = parse_row(&["invalid"], "invalid").unwrap_err();
        assert_eq!(err.to_string(), "insufficient fields (\"invalid\")");
    }
}
