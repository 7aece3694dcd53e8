//! CSV line codec: field splitting and the quoting rules of the tool.
//!
//! The codec is deliberately minimal. Fields are quoted on output only when
//! they contain the quote character itself; a field containing the separator
//! but no quote character is emitted unquoted and will not round-trip. This
//! matches the wire format the downstream importer expects byte for byte.

use std::borrow::Cow;

/// Split one line into raw fields on `sep`, honoring `quo`.
///
/// A quoted region suspends separator handling; a doubled quote inside a
/// quoted region is a literal quote. Quote characters are retained in the
/// returned fields, so a quoted field comes back with its surrounding
/// quotes; use [`unquote`] to strip them. The trailing field is always
/// emitted, even when empty.
pub fn split(line: &str, sep: char, quo: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut cur = String::new();
    let mut in_quote = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if !in_quote {
            if c == quo {
                in_quote = true;
                cur.push(c);
            } else if c == sep {
                fields.push(std::mem::take(&mut cur));
            } else {
                cur.push(c);
            }
        } else if c == quo {
            if chars.peek() == Some(&quo) {
                cur.push(c);
                chars.next();
                cur.push(c);
            } else {
                in_quote = false;
                cur.push(c);
            }
        } else {
            cur.push(c);
        }
    }
    fields.push(cur);
    fields
}

/// Strip the quoting from a raw field as produced by [`split`].
///
/// A field without any quote character is returned unchanged. Otherwise
/// parsing starts at the first quote character: doubled quotes collapse to
/// one, characters between two quoted regions are dropped, and anything
/// before the opening quote or after the final closing quote is discarded.
/// This is not a general CSV parser; it is the exact inverse of the quoting
/// that [`quote`] produces, and it intentionally mirrors the historic
/// behavior on partially quoted input (`"a"x"a"` becomes `aa`).
pub fn unquote(s: &str, quo: char) -> Cow<'_, str> {
    let Some(first) = s.find(quo) else {
        return Cow::Borrowed(s);
    };
    let mut res = String::with_capacity(s.len());
    let mut in_quote = true;
    let mut chars = s[first + quo.len_utf8()..].chars().peekable();
    while let Some(c) = chars.next() {
        if in_quote {
            if c == quo {
                if chars.peek() == Some(&quo) {
                    res.push(quo);
                    chars.next();
                } else {
                    in_quote = false;
                }
            } else {
                res.push(c);
            }
        } else if c == quo {
            in_quote = true;
        }
    }
    Cow::Owned(res)
}

/// Quote a field for output.
///
/// A field without any quote character is returned unchanged, even when it
/// contains the separator. Otherwise the field is wrapped in quotes and
/// every interior quote is doubled.
pub fn quote(s: &str, quo: char) -> Cow<'_, str> {
    if !s.contains(quo) {
        return Cow::Borrowed(s);
    }
    let mut res = String::with_capacity(s.len() + 2);
    res.push(quo);
    for c in s.chars() {
        if c == quo {
            res.push(quo);
            res.push(quo);
        } else {
            res.push(c);
        }
    }
    res.push(quo);
    Cow::Owned(res)
}

/// Locate a column by (unquoted) header name.
pub fn find_col(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

/// Join raw fields into an output line.
///
/// Fields are written verbatim: anything that came out of [`split`] still
/// carries its original quoting, and rewritten fields must be passed through
/// [`quote`] before they are stored back.
pub fn join(fields: &[String], sep: char) -> String {
    let mut out = String::new();
    for (i, f) in fields.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        out.push_str(f);
    }
    out
}

/// Join unquoted values (header names) into an output line, quoting each as
/// needed.
pub fn join_quoted(fields: &[String], sep: char, quo: char) -> String {
    let mut out = String::new();
    for (i, f) in fields.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        out.push_str(&quote(f, quo));
    }
    out
}
