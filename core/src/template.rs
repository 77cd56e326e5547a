//! Command templates with `$1`-`$9` argument placeholders

/// A parsed command template: fixed string pieces interleaved with argument
/// indices. `pieces[i]` is emitted before the argument referenced by
/// `indices[i]`; when the template ends with a variable the two vectors have
/// equal length, otherwise `pieces` has one extra trailing element.
///
/// Parsed once per worker; each worker owns its template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Fixed pieces between variables
    pub pieces: Vec<String>,
    /// One-based argument indices for the variables between pieces
    pub indices: Vec<usize>,
}

impl Template {
    /// Parse a template string. Returns `None` for the empty string, which
    /// means "no template configured".
    ///
    /// A `$` followed by an ASCII digit `d` references input column `d`; any
    /// other `$` passes through literally. Indices may repeat and appear in
    /// any order.
    pub fn parse(input: &str) -> Option<Template> {
        if input.is_empty() {
            return None;
        }
        let mut pieces = Vec::new();
        let mut indices = Vec::new();
        let mut fixed = String::new();
        for (i, segment) in input.split('$').enumerate() {
            match segment.as_bytes().first() {
                Some(&digit) if i > 0 && digit.is_ascii_digit() => {
                    pieces.push(std::mem::take(&mut fixed));
                    indices.push(usize::from(digit - b'0'));
                    fixed.push_str(&segment[1..]);
                }
                _ => {
                    if i > 0 {
                        fixed.push('$');
                    }
                    fixed.push_str(segment);
                }
            }
        }
        if !fixed.is_empty() {
            pieces.push(fixed);
        }
        Some(Template { pieces, indices })
    }

    /// Expand the template with one row of arguments.
    ///
    /// A variable whose index points past the end of `args` is silently
    /// omitted; its flanking fixed pieces still appear. Never fails.
    pub fn expand(&self, args: &[String]) -> String {
        let mut out = String::with_capacity(
            self.pieces.iter().map(String::len).sum::<usize>()
                + args.iter().map(String::len).sum::<usize>(),
        );
        for (i, piece) in self.pieces.iter().enumerate() {
            out.push_str(piece);
            if let Some(arg) = self.argument(i, args) {
                out.push_str(arg);
            }
        }
        out
    }

    /// The argument selected by the variable after piece `i`, if any
    pub fn argument<'a>(&self, i: usize, args: &'a [String]) -> Option<&'a str> {
        let index = *self.indices.get(i)?;
        args.get(index.checked_sub(1)?).map(String::as_str)
    }
}
