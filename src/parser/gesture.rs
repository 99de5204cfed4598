// Brush gesture grammar
//
//   script  := gesture ( "|" gesture )*
//   gesture := panel ":" ( point "->" point | "clear" )
//   panel   := "#" digits | "\"" name "\"" | identifier
//   point   := number "," number

use super::ast::{Gesture, GestureAction, PanelRef};
use super::lexer::{identifier, number_literal, string_literal, ws};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1},
    combinator::{eof, map, map_res},
    multi::separated_list1,
    sequence::{preceded, separated_pair},
    IResult,
};

fn parse_panel_ref(input: &str) -> IResult<&str, PanelRef> {
    alt((
        map(
            map_res(preceded(char('#'), digit1), |d: &str| d.parse::<usize>()),
            PanelRef::Index,
        ),
        map(string_literal, PanelRef::Column),
        map(identifier, PanelRef::Column),
    ))(input)
}

fn parse_point(input: &str) -> IResult<&str, (f64, f64)> {
    separated_pair(ws(number_literal), char(','), ws(number_literal))(input)
}

fn parse_action(input: &str) -> IResult<&str, GestureAction> {
    alt((
        map(ws(tag("clear")), |_| GestureAction::Clear),
        map(
            separated_pair(parse_point, ws(tag("->")), parse_point),
            |(from, to)| GestureAction::Drag { from, to },
        ),
    ))(input)
}

/// Parse a single gesture
/// Format: pl: 10,10 -> 60,80  or  #1: clear
pub fn parse_gesture(input: &str) -> IResult<&str, Gesture> {
    let (input, panel) = ws(parse_panel_ref)(input)?;
    let (input, _) = ws(char(':'))(input)?;
    let (input, action) = parse_action(input)?;
    Ok((input, Gesture { panel, action }))
}

/// Parse a complete gesture script
/// Format: gesture | gesture | ...
pub fn parse_gestures(input: &str) -> IResult<&str, Vec<Gesture>> {
    let (input, gestures) = separated_list1(ws(char('|')), parse_gesture)(input)?;
    let (input, _) = ws(eof)(input)?;
    Ok((input, gestures))
}
