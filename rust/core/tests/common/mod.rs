// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Test event driver: tokenizes STEP text with nom and replays the events a
//! generated scanner/parser pair would send to the collector.

#![allow(dead_code)]

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace0, one_of, satisfy},
    combinator::{map, opt, recognize},
    multi::many0,
    sequence::{delimited, pair, tuple},
    IResult,
};

use stepfile_core::{ParamType, Result, ScopeSpan, StepReadData};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tok<'a> {
    Hash(&'a str),
    Str(&'a str),
    Enum(&'a str),
    Int(&'a str),
    Real(&'a str),
    Keyword(&'a str),
    ScopeStart,
    ScopeEnd,
    Punct(char),
    Unknown(&'a str),
}

impl<'a> Tok<'a> {
    fn text(self) -> &'a str {
        match self {
            Tok::Hash(t)
            | Tok::Str(t)
            | Tok::Enum(t)
            | Tok::Int(t)
            | Tok::Real(t)
            | Tok::Keyword(t)
            | Tok::Unknown(t) => t,
            Tok::ScopeStart => "&SCOPE",
            Tok::ScopeEnd => "ENDSCOPE",
            Tok::Punct('$') => "$",
            Tok::Punct('*') => "*",
            Tok::Punct(_) => "",
        }
    }

    fn kind(self) -> Option<ParamType> {
        match self {
            Tok::Hash(_) => Some(ParamType::Ident),
            Tok::Str(_) => Some(ParamType::Text),
            Tok::Enum(".T." | ".F." | ".U.") => Some(ParamType::Logical),
            Tok::Enum(_) => Some(ParamType::Enum),
            Tok::Int(_) => Some(ParamType::Integer),
            Tok::Real(_) => Some(ParamType::Real),
            Tok::Punct('$' | '*') => Some(ParamType::Void),
            _ => None,
        }
    }
}

fn hash_ref(input: &str) -> IResult<&str, Tok<'_>> {
    map(recognize(pair(char('#'), digit1)), Tok::Hash)(input)
}

fn string(input: &str) -> IResult<&str, Tok<'_>> {
    map(
        recognize(delimited(
            char('\''),
            many0(alt((tag("''"), is_not("'")))),
            char('\''),
        )),
        Tok::Str,
    )(input)
}

fn enum_value(input: &str) -> IResult<&str, Tok<'_>> {
    map(
        recognize(tuple((
            char('.'),
            take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_'),
            char('.'),
        ))),
        Tok::Enum,
    )(input)
}

fn number(input: &str) -> IResult<&str, Tok<'_>> {
    map(
        recognize(tuple((
            opt(one_of("+-")),
            digit1,
            opt(pair(char('.'), digit0)),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        classify_number,
    )(input)
}

fn classify_number(text: &str) -> Tok<'_> {
    if text.contains(|c: char| matches!(c, '.' | 'E' | 'e')) {
        Tok::Real(text)
    } else {
        Tok::Int(text)
    }
}

fn keyword(input: &str) -> IResult<&str, Tok<'_>> {
    map(
        recognize(pair(
            satisfy(|c| c.is_ascii_alphabetic()),
            take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
        )),
        classify_word,
    )(input)
}

fn classify_word(word: &str) -> Tok<'_> {
    match word {
        "ENDSCOPE" => Tok::ScopeEnd,
        other => Tok::Keyword(other),
    }
}

fn token(input: &str) -> IResult<&str, Tok<'_>> {
    alt((
        map(tag("&SCOPE"), |_| Tok::ScopeStart),
        hash_ref,
        string,
        enum_value,
        number,
        keyword,
        map(one_of("(),=;$*"), Tok::Punct),
        map(take(1usize), Tok::Unknown),
    ))(input)
}

pub fn tokenize(mut input: &str) -> Vec<Tok<'_>> {
    let mut tokens = Vec::new();
    loop {
        let (rest, _) = multispace0::<_, nom::error::Error<&str>>(input).unwrap();
        if rest.is_empty() {
            break;
        }
        let (rest, tok) = token(rest).expect("single-character fallback always matches");
        tokens.push(tok);
        input = rest;
    }
    tokens
}

/// Feed `input` through the collector. Returns the spans of the scopes
/// closed along the way.
pub fn drive(data: &mut StepReadData, input: &str) -> Result<Vec<ScopeSpan>> {
    let tokens = tokenize(input);
    let mut scopes = Vec::new();
    let mut depth = 0usize;
    let mut in_header = false;
    let mut i = 0;

    while i < tokens.len() {
        let next = tokens.get(i + 1).copied();
        match tokens[i] {
            Tok::Hash(label) if depth == 0 && next == Some(Tok::Punct('=')) => {
                data.stage_text(label)?;
                data.begin_ident()?;
                i += 1;
            }
            Tok::Keyword(word) if depth == 0 => match (word, next) {
                (_, Some(Tok::Punct('('))) => {
                    data.stage_text(word)?;
                    data.begin_type()?;
                }
                ("HEADER", _) => in_header = true,
                ("ENDSEC", _) if in_header => {
                    data.end_header();
                    in_header = false;
                }
                _ => {}
            },
            Tok::Keyword(word) if next == Some(Tok::Punct('(')) => {
                data.stage_text(word)?;
                data.begin_list_type();
            }
            Tok::ScopeStart => data.enter_scope(),
            Tok::ScopeEnd => scopes.extend(data.leave_scope()),
            Tok::Punct('(') => {
                data.begin_list()?;
                depth += 1;
            }
            Tok::Punct(')') => {
                data.print_current_record();
                data.close_entity();
                depth = depth.saturating_sub(1);
                if depth > 0 {
                    data.append_arg()?;
                }
            }
            Tok::Punct(',') => data.note_list_boundary(),
            Tok::Punct(';' | '=') => {}
            tok => match tok.kind() {
                Some(kind) if depth > 0 => {
                    data.stage_text(tok.text())?;
                    data.set_arg_type(kind);
                    data.append_arg()?;
                }
                _ => {
                    data.add_error(&format!("unexpected token '{}'", tok.text()))?;
                    if depth > 0 {
                        data.stage_text(tok.text())?;
                        data.append_error_arg()?;
                    }
                }
            },
        }
        i += 1;
    }
    Ok(scopes)
}

/// `(kind, text)` pairs of a record's arguments.
pub fn args_of(record: &stepfile_core::RecordView<'_>) -> Vec<(ParamType, String)> {
    record
        .arguments()
        .map(|arg| (arg.kind(), arg.text_lossy().into_owned()))
        .collect()
}

/// Identifiers of the linked records, in list order.
pub fn idents(data: &StepReadData) -> Vec<String> {
    data.records()
        .map(|record| record.ident_lossy().into_owned())
        .collect()
}
