//! Line grammars for the Visual Studio 2008 solution and project formats.
//!
//! Both formats are read one stripped line at a time, and the few lines whose
//! shape matters are described here with [`chumsky`]:
//!
//! - `Key="value"` attribute lines of a `.vcproj` file
//! - `Name|Platform` configuration identifiers
//! - `Project("{KIND}") = "name", "path", "{GUID}"` solution lines
//! - `{GUID} = {GUID}` project dependency lines
//! - `Name|Platform = Name|Platform` solution configuration lines
//!
//! ## Grammar
//!
//! ```text
//! attribute   = key '=' quoted any*
//! identifier  = [^|]* '|' [^|]*
//! project     = 'Project(' quoted ')' '=' quoted ',' quoted ',' '"' guid '"'
//! dependency  = guid '=' guid
//! mapping     = [^|]* '|' platform '=' [^|]* '|' platform
//! guid        = '{' [0-9A-Fa-f-]+ '}'
//! quoted      = '"' [^"]* '"'
//! ```

use chumsky::prelude::*;

type Extra<'a> = extra::Err<Simple<'a, char>>;

/// A decomposed `Project(...)` line of a solution file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectLine<'a> {
    /// Project kind GUID without braces.
    pub kind: &'a str,
    pub name: &'a str,
    /// Project file path relative to the solution, extension included.
    pub path: &'a str,
    /// Project GUID without braces.
    pub guid: &'a str,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Chumsky parsers
// ═══════════════════════════════════════════════════════════════════════════════

fn quoted<'a>() -> impl Parser<'a, &'a str, &'a str, Extra<'a>> + Clone {
    just('"')
        .ignore_then(none_of('"').repeated().to_slice())
        .then_ignore(just('"'))
}

fn braced_guid<'a>() -> impl Parser<'a, &'a str, &'a str, Extra<'a>> + Clone {
    just('{')
        .ignore_then(
            any()
                .filter(|c: &char| c.is_ascii_hexdigit() || *c == '-')
                .repeated()
                .at_least(1)
                .to_slice(),
        )
        .then_ignore(just('}'))
}

fn attribute_parser<'a>() -> impl Parser<'a, &'a str, (&'a str, &'a str), Extra<'a>> {
    let key = any()
        .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
        .repeated()
        .at_least(1)
        .to_slice();

    key.then_ignore(just('='))
        .then(quoted())
        .then_ignore(any().repeated())
}

fn identifier_parser<'a>() -> impl Parser<'a, &'a str, (&'a str, &'a str), Extra<'a>> {
    let part = any().filter(|c: &char| *c != '|').repeated().to_slice();

    part.clone()
        .then_ignore(just('|'))
        .then(part)
        .then_ignore(end())
}

fn project_parser<'a>() -> impl Parser<'a, &'a str, ProjectLine<'a>, Extra<'a>> {
    let kind = just('"').ignore_then(braced_guid()).then_ignore(just('"'));
    let guid = just('"').ignore_then(braced_guid()).then_ignore(just('"'));
    let comma = just(',').padded();

    just("Project(")
        .ignore_then(kind)
        .then_ignore(just(')'))
        .then_ignore(just('=').padded())
        .then(quoted())
        .then_ignore(comma.clone())
        .then(quoted())
        .then_ignore(comma)
        .then(guid)
        .then_ignore(end())
        .map(|(((kind, name), path), guid)| ProjectLine { kind, name, path, guid })
}

fn dependency_parser<'a>() -> impl Parser<'a, &'a str, (&'a str, &'a str), Extra<'a>> {
    braced_guid()
        .then_ignore(just('=').padded())
        .then(braced_guid())
        .then_ignore(end())
}

fn mapping_parser<'a>()
-> impl Parser<'a, &'a str, ((&'a str, &'a str), (&'a str, &'a str)), Extra<'a>> {
    let name = any().filter(|c: &char| *c != '|').repeated().to_slice();
    let platform = any()
        .filter(|c: &char| !c.is_whitespace() && *c != '=')
        .repeated()
        .at_least(1)
        .to_slice();
    let identifier = name.then_ignore(just('|')).then(platform);

    identifier
        .clone()
        .then_ignore(just('=').padded())
        .then(identifier)
        .then_ignore(end())
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Entry points
// ═══════════════════════════════════════════════════════════════════════════════

/// Split a `Key="value"` line into its key and unquoted value.
///
/// Anything after the closing quote (e.g. a trailing `>`) is ignored.
pub fn parse_attribute(line: &str) -> Option<(&str, &str)> {
    attribute_parser().parse(line).into_result().ok()
}

/// Split a `Name|Platform` identifier. Exactly one `|` is required.
pub fn parse_configuration_identifier(value: &str) -> Option<(&str, &str)> {
    identifier_parser().parse(value).into_result().ok()
}

/// Decompose a solution `Project(...)` line.
pub fn parse_project_line(line: &str) -> Option<ProjectLine<'_>> {
    project_parser().parse(line).into_result().ok()
}

/// Split a `{GUID} = {GUID}` dependency line into both GUIDs.
pub fn parse_dependency_line(line: &str) -> Option<(&str, &str)> {
    dependency_parser().parse(line).into_result().ok()
}

/// Split a `Name|Platform = Name|Platform` line into both identifiers.
pub fn parse_configuration_mapping(line: &str) -> Option<((&str, &str), (&str, &str))> {
    mapping_parser().parse(line).into_result().ok()
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
