//! Parser for Python-style literals
//!
//! Catalog exports often write entity lists with single quotes, e.g.
//! `[{'id': 28, 'name': 'Action'}]`, which is not JSON. This module reads
//! lists, tuples, dicts, quoted strings, numbers, `True`, `False` and `None`
//! into a [`serde_json::Value`].

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{anychar, char, multispace0, satisfy},
    combinator::{all_consuming, map, map_opt, opt, value},
    multi::{fold_many0, separated_list0},
    number::complete::recognize_float,
    sequence::{delimited, preceded, separated_pair, terminated},
    IResult,
};
use serde_json::{Number, Value};

/// Parse a complete literal, surrounding whitespace allowed.
///
/// # Examples
///
/// ```
/// use movierec::literal::parse_literal;
/// use serde_json::json;
///
/// let value = parse_literal("[{'id': 28, 'name': 'Action'}]").unwrap();
/// assert_eq!(value, json!([{"id": 28, "name": "Action"}]));
/// ```
pub fn parse_literal(input: &str) -> Result<Value, String> {
    match all_consuming(delimited(multispace0, literal, multispace0))(input) {
        Ok((_, parsed)) => Ok(parsed),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let rest: String = e.input.chars().take(20).collect();
            Err(format!("invalid literal near '{}'", rest))
        }
        Err(nom::Err::Incomplete(_)) => Err("Incomplete input".to_string()),
    }
}

fn literal(input: &str) -> IResult<&str, Value> {
    alt((
        map(string, Value::String),
        keyword,
        number,
        sequence('[', ']'),
        sequence('(', ')'),
        dict,
    ))(input)
}

fn keyword(input: &str) -> IResult<&str, Value> {
    alt((
        value(Value::Bool(true), tag("True")),
        value(Value::Bool(false), tag("False")),
        value(Value::Null, tag("None")),
    ))(input)
}

fn number(input: &str) -> IResult<&str, Value> {
    map_opt(recognize_float, |text: &str| {
        if let Ok(i) = text.parse::<i64>() {
            return Some(Value::Number(i.into()));
        }
        text.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number)
    })(input)
}

fn string(input: &str) -> IResult<&str, String> {
    alt((quoted('\''), quoted('"')))(input)
}

fn quoted<'a>(quote: char) -> impl FnMut(&'a str) -> IResult<&'a str, String> {
    move |input| {
        delimited(
            char(quote),
            fold_many0(
                alt((
                    preceded(char('\\'), escape),
                    satisfy(move |c| c != '\\' && c != quote),
                )),
                String::new,
                |mut acc, c| {
                    acc.push(c);
                    acc
                },
            ),
            char(quote),
        )(input)
    }
}

/// Character after a backslash. Unknown escapes yield the character itself.
fn escape(input: &str) -> IResult<&str, char> {
    alt((
        value('\n', char('n')),
        value('\t', char('t')),
        value('\r', char('r')),
        value('\0', char('0')),
        anychar,
    ))(input)
}

fn comma(input: &str) -> IResult<&str, char> {
    delimited(multispace0, char(','), multispace0)(input)
}

/// Lists and tuples, trailing comma allowed.
fn sequence<'a>(open: char, close: char) -> impl FnMut(&'a str) -> IResult<&'a str, Value> {
    move |input| {
        map(
            delimited(
                terminated(char(open), multispace0),
                terminated(separated_list0(comma, literal), opt(comma)),
                preceded(multispace0, char(close)),
            ),
            Value::Array,
        )(input)
    }
}

fn dict(input: &str) -> IResult<&str, Value> {
    map(
        delimited(
            terminated(char('{'), multispace0),
            terminated(separated_list0(comma, entry), opt(comma)),
            preceded(multispace0, char('}')),
        ),
        |entries| Value::Object(entries.into_iter().collect()),
    )(input)
}

fn entry(input: &str) -> IResult<&str, (String, Value)> {
    separated_pair(
        map(literal, |key| match key {
            Value::String(s) => s,
            other => other.to_string(),
        }),
        delimited(multispace0, char(':'), multispace0),
        literal,
    )(input)
}
