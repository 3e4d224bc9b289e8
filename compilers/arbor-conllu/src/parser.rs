use nom::{
    bytes::complete::take_while,
    character::complete::{char, space0},
    combinator::{opt, rest},
    multi::separated_list1,
    sequence::{pair, preceded, separated_pair},
    IResult,
};

/// Number of tab-separated columns in a token line.
pub const COLUMNS: usize = 10;

/// Split a token line into its tab-separated columns.
pub fn columns(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(char('\t'), take_while(|c: char| c != '\t'))(input)
}

/// `# key = value` comment. Comments without `=` yield `None`.
pub fn meta_line(input: &str) -> IResult<&str, Option<(&str, &str)>> {
    let (input, _) = preceded(char('#'), space0)(input)?;
    let (input, entry) = opt(separated_pair(
        take_while(|c: char| c != '='),
        char('='),
        rest,
    ))(input)?;
    let entry = entry
        .map(|(key, value): (&str, &str)| (key.trim(), value.trim()))
        .filter(|(key, _)| !key.is_empty());
    Ok((input, entry))
}

/// `Key=Value|Key2=Value2` (FEATS / MISC). Items without `=` get an empty value.
pub fn key_values(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    separated_list1(
        char('|'),
        pair(take_while(|c: char| c != '|' && c != '='), item_value),
    )(input)
}

fn item_value(input: &str) -> IResult<&str, &str> {
    let (input, value) = opt(preceded(char('='), take_while(|c: char| c != '|')))(input)?;
    Ok((input, value.unwrap_or("")))
}

/// `head:relation|head:relation` (DEPS). Relations may themselves contain `:`.
pub fn deps(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    separated_list1(
        char('|'),
        separated_pair(
            take_while(|c: char| c != ':' && c != '|'),
            char(':'),
            take_while(|c: char| c != '|'),
        ),
    )(input)
}
