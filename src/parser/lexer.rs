// Shared token parsers for the color and field-mapping grammars

use nom::{
    bytes::complete::{is_not, take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::{map, verify},
    number::complete::double,
    sequence::delimited,
    IResult,
};

/// Wrap a parser so it skips surrounding whitespace
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Floating point literal: 1, 0.5, -2.25, 1e3
pub fn number_literal(input: &str) -> IResult<&str, f64> {
    double(input)
}

/// Double-quoted string without escapes: "Unit Sales"
pub fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
        |s: &str| s.to_string(),
    )(input)
}

/// Bare word made of letters, digits and underscores
pub fn identifier(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| c.is_alphanumeric() || c == '_'),
        |s: &str| s.to_string(),
    )(input)
}

/// Unquoted column name: anything up to the next separator, trimmed
pub fn bare_name(input: &str) -> IResult<&str, String> {
    map(
        verify(is_not(",\""), |s: &str| !s.trim().is_empty()),
        |s: &str| s.trim().to_string(),
    )(input)
}
