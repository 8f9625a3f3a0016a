// Color literal parser: #rgb, #rrggbb, #rrggbbaa, rgb(...), rgba(...) and CSS names

use crate::color::Color;
use crate::parser::lexer::{number_literal, ws};
use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::char,
    combinator::{all_consuming, map_opt},
    sequence::preceded,
    IResult,
};

/// Parse a user-entered color string. Returns `None` for anything unrecognized.
pub fn parse_color(input: &str) -> Option<Color> {
    let input = input.trim();
    if let Ok((_, color)) = all_consuming(alt((hex_color, rgba_function, rgb_function)))(input) {
        return Some(color);
    }
    named_color(input)
}

/// #RGB, #RRGGBB or #RRGGBBAA
fn hex_color(input: &str) -> IResult<&str, Color> {
    map_opt(
        preceded(char('#'), take_while1(|c: char| c.is_ascii_hexdigit())),
        parse_hex_digits,
    )(input)
}

fn parse_hex_digits(hex: &str) -> Option<Color> {
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => Some(Color::rgb(
            channel(&hex[0..1])? * 17,
            channel(&hex[1..2])? * 17,
            channel(&hex[2..3])? * 17,
        )),
        6 => Some(Color::rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        8 => Some(
            Color::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )
            .with_alpha(f64::from(channel(&hex[6..8])?) / 255.0),
        ),
        _ => None,
    }
}

/// rgb(255, 99, 71)
fn rgb_function(input: &str) -> IResult<&str, Color> {
    let (input, _) = ws(tag_no_case("rgb"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, r) = ws(channel_value)(input)?;
    let (input, _) = ws(char(','))(input)?;
    let (input, g) = ws(channel_value)(input)?;
    let (input, _) = ws(char(','))(input)?;
    let (input, b) = ws(channel_value)(input)?;
    let (input, _) = ws(char(')'))(input)?;
    Ok((input, Color::rgb(r, g, b)))
}

/// rgba(255, 99, 71, 0.5)
fn rgba_function(input: &str) -> IResult<&str, Color> {
    let (input, _) = ws(tag_no_case("rgba"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, r) = ws(channel_value)(input)?;
    let (input, _) = ws(char(','))(input)?;
    let (input, g) = ws(channel_value)(input)?;
    let (input, _) = ws(char(','))(input)?;
    let (input, b) = ws(channel_value)(input)?;
    let (input, _) = ws(char(','))(input)?;
    let (input, a) = ws(number_literal)(input)?;
    let (input, _) = ws(char(')'))(input)?;
    Ok((input, Color::rgb(r, g, b).with_alpha(a.clamp(0.0, 1.0))))
}

fn channel_value(input: &str) -> IResult<&str, u8> {
    map_opt(number_literal, |v| {
        if (0.0..=255.0).contains(&v) {
            Some(v.round() as u8)
        } else {
            None
        }
    })(input)
}

fn named_color(name: &str) -> Option<Color> {
    let color = match name.to_lowercase().as_str() {
        "white" => Color::rgb(255, 255, 255),
        "black" => Color::rgb(0, 0, 0),
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "cyan" => Color::rgb(0, 255, 255),
        "magenta" => Color::rgb(255, 0, 255),
        "orange" => Color::rgb(255, 165, 0),
        "purple" => Color::rgb(128, 0, 128),
        "pink" => Color::rgb(255, 192, 203),
        "brown" => Color::rgb(139, 69, 19),
        "teal" => Color::rgb(0, 128, 128),
        "navy" => Color::rgb(0, 0, 128),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "darkgray" | "darkgrey" => Color::rgb(64, 64, 64),
        "lightgray" | "lightgrey" => Color::rgb(192, 192, 192),
        _ => return None,
    };
    Some(color)
}
