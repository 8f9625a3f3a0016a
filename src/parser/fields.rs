// Field mapping parser
// Format: x: Region, y: "Unit Sales", y2: Cost

use crate::parser::lexer::{bare_name, identifier, string_literal, ws};
use crate::resolve::FieldSelection;
use nom::{
    branch::alt,
    character::complete::char,
    combinator::{all_consuming, verify},
    multi::separated_list1,
    sequence::separated_pair,
    IResult,
};

/// Parse a comma separated list of `slot: column` assignments.
/// Later assignments to the same slot win.
pub fn parse_fields(input: &str) -> IResult<&str, FieldSelection> {
    let (input, args) = separated_list1(
        ws(char(',')),
        separated_pair(ws(slot), char(':'), ws(column_name)),
    )(input)?;

    let mut fields = FieldSelection::default();
    for (slot, column) in args {
        match slot.as_str() {
            "x" => fields.x = Some(column),
            "y" => fields.y = Some(column),
            "y2" => fields.y2 = Some(column),
            _ => {}
        }
    }

    Ok((input, fields))
}

/// Parse a complete field mapping, rejecting trailing input.
pub fn parse_field_mapping(input: &str) -> Result<FieldSelection, String> {
    all_consuming(ws(parse_fields))(input)
        .map(|(_, fields)| fields)
        .map_err(|e| format!("invalid field mapping '{input}': {e:?}"))
}

fn slot(input: &str) -> IResult<&str, String> {
    verify(identifier, |s: &str| matches!(s, "x" | "y" | "y2"))(input)
}

fn column_name(input: &str) -> IResult<&str, String> {
    alt((string_literal, bare_name))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_slots() {
        let fields = parse_field_mapping("x: Region, y: Sales, y2: Cost").unwrap();
        assert_eq!(fields.x.as_deref(), Some("Region"));
        assert_eq!(fields.y.as_deref(), Some("Sales"));
        assert_eq!(fields.y2.as_deref(), Some("Cost"));
    }

    #[test]
    fn test_parse_quoted_and_spaced_names() {
        let fields = parse_field_mapping(r#"y: "Unit Sales, EU" , x: Fiscal Quarter"#).unwrap();
        assert_eq!(fields.y.as_deref(), Some("Unit Sales, EU"));
        assert_eq!(fields.x.as_deref(), Some("Fiscal Quarter"));
        assert!(fields.y2.is_none());
    }

    #[test]
    fn test_later_assignment_wins() {
        let fields = parse_field_mapping("y: a, y: b").unwrap();
        assert_eq!(fields.y.as_deref(), Some("b"));
    }

    #[test]
    fn test_rejects_unknown_slot() {
        assert!(parse_field_mapping("z: a").is_err());
    }

    #[test]
    fn test_rejects_missing_column() {
        assert!(parse_field_mapping("x: , y: b").is_err());
        assert!(parse_field_mapping("").is_err());
    }
}
