use std::borrow::Cow;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use tracing::warn;

use crate::mtree::entry::{Defaults, Keyword, Keywords, ManifestEntry};

/// directive whose arguments may continue on the following lines
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Directive {
    Set,
    Unset,
}

/// state carried from one line to the next
#[derive(Debug, Default)]
struct ParseState {
    defaults: Defaults,
    /// set by a bare `/set` or `/unset` with no arguments on its own line
    pending: Option<Directive>,
}

/// parse mtree text into its file records, in manifest order
///
/// malformed lines, unknown directives and unknown keywords are reported
/// through `tracing` and skipped; parsing itself never fails.
pub fn parse(text: &[u8]) -> Vec<ManifestEntry> {
    let mut entries = Vec::new();
    let mut state = ParseState::default();

    for (index, line) in lines(text).enumerate() {
        state = parse_line(state, line, index + 1, &mut entries);
    }

    entries
}

/// process one line; returns the state in effect for the next one
fn parse_line(
    mut state: ParseState,
    line: &[u8],
    number: usize,
    entries: &mut Vec<ManifestEntry>,
) -> ParseState {
    let words: Vec<Cow<'_, [u8]>> = words(line).map(decode_octal).collect();
    let Some((first, rest)) = words.split_first() else {
        return state;
    };

    let first: &[u8] = first;
    match first {
        [b'#', ..] => {}
        [b'/', directive @ ..] => {
            let directive = match directive {
                b"set" => Some(Directive::Set),
                b"unset" => Some(Directive::Unset),
                _ => {
                    warn!(
                        line = number,
                        directive = %String::from_utf8_lossy(directive),
                        "unknown mtree directive"
                    );
                    None
                }
            };
            state.pending = directive.filter(|_| rest.is_empty());
            if let Some(directive) = directive {
                apply_directive(&mut state.defaults, directive, rest, number);
            }
        }
        [b'.', b'/', ..] => {
            state.pending = None;
            let path = Path::new(OsStr::from_bytes(&first[1..]));
            let mut entry = ManifestEntry::new(path, &state.defaults);
            apply_pairs(&mut entry.keywords, rest, number);
            entries.push(entry);
        }
        _ => match state.pending {
            Some(directive) if continues(directive, &words) => {
                apply_directive(&mut state.defaults, directive, &words, number)
            }
            _ => warn!(
                line = number,
                text = %String::from_utf8_lossy(line),
                "unsupported mtree line"
            ),
        },
    }

    state
}

/// whether a line reads as more arguments of a bare `/set` or `/unset`
///
/// `/set` takes only `keyword=value` words, `/unset` only keyword names.
fn continues(directive: Directive, words: &[Cow<'_, [u8]>]) -> bool {
    match directive {
        Directive::Set => words.iter().all(|word| word.contains(&b'=')),
        Directive::Unset => words.iter().all(|word| {
            let word: &[u8] = word;
            word == b"all" || Keyword::parse(word).is_some()
        }),
    }
}

fn apply_directive(
    defaults: &mut Defaults,
    directive: Directive,
    args: &[Cow<'_, [u8]>],
    number: usize,
) {
    match directive {
        Directive::Set => apply_pairs(&mut defaults.keywords, args, number),
        Directive::Unset => unset_keywords(&mut defaults.keywords, args, number),
    }
}

/// apply `keyword=value` words on top of existing values
fn apply_pairs(keywords: &mut Keywords, pairs: &[Cow<'_, [u8]>], number: usize) {
    for pair in pairs {
        let Some(eq) = pair.iter().position(|&b| b == b'=') else {
            warn!(
                line = number,
                pair = %String::from_utf8_lossy(pair),
                "bad key-value pair"
            );
            continue;
        };

        let (name, value) = (&pair[..eq], &pair[eq + 1..]);
        match Keyword::parse(name) {
            Some(keyword) => keywords.set(keyword, value),
            None => warn!(
                line = number,
                keyword = %String::from_utf8_lossy(name),
                "unknown mtree keyword"
            ),
        }
    }
}

/// `/unset` takes bare keyword names; `all` clears everything
fn unset_keywords(keywords: &mut Keywords, names: &[Cow<'_, [u8]>], number: usize) {
    for name in names {
        let name: &[u8] = name;
        if name == b"all" {
            keywords.clear();
            continue;
        }

        match Keyword::parse(name) {
            Some(keyword) => keywords.unset(keyword),
            None => warn!(
                line = number,
                keyword = %String::from_utf8_lossy(name),
                "unknown mtree keyword"
            ),
        }
    }
}

/// split on CR, LF or CRLF
fn lines<'a>(text: &'a [u8]) -> impl Iterator<Item = &'a [u8]> + 'a {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }

        let end = rest
            .iter()
            .position(|&b| b == b'\r' || b == b'\n')
            .unwrap_or(rest.len());
        let line = &rest[..end];

        let mut next = &rest[end..];
        if let Some(stripped) = next.strip_prefix(b"\r") {
            next = stripped;
        }
        if let Some(stripped) = next.strip_prefix(b"\n") {
            next = stripped;
        }
        rest = next;

        Some(line)
    })
}

/// split on runs of spaces and tabs
fn words<'a>(line: &'a [u8]) -> impl Iterator<Item = &'a [u8]> + 'a {
    line.split(|&b| b == b' ' || b == b'\t')
        .filter(|word| !word.is_empty())
}

/// decode `\NNN` octal escapes in a single pass
///
/// a backslash followed by three digits with a value of at most 255 becomes
/// that byte. any other backslash is kept as-is.
pub fn decode_octal(word: &[u8]) -> Cow<'_, [u8]> {
    if !word.contains(&b'\\') {
        return Cow::Borrowed(word);
    }

    let mut decoded = Vec::with_capacity(word.len());
    let mut i = 0;
    while i < word.len() {
        if word[i] == b'\\' {
            if let Some(byte) = word.get(i + 1..i + 4).and_then(octal_byte) {
                decoded.push(byte);
                i += 4;
                continue;
            }
        }
        decoded.push(word[i]);
        i += 1;
    }

    Cow::Owned(decoded)
}

fn octal_byte(digits: &[u8]) -> Option<u8> {
    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let value = digits
        .iter()
        .fold(0u32, |acc, &d| acc * 8 + u32::from(d - b'0'));
    u8::try_from(value).ok()
}
