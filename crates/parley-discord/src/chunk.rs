/// Maximum number of characters in a single Discord message
pub const MESSAGE_CAP: usize = 2000;

/// Split text into pieces of at most `cap` characters
///
/// Each split prefers the last newline in the window, then the last space,
/// and otherwise cuts hard at `cap`. The separator a split lands on is
/// dropped from the remainder.
///
/// # Panics
///
/// Panics if `cap` is zero
pub fn chunk_text(text: &str, cap: usize) -> Vec<&str> {
    assert!(cap > 0, "chunk cap must be positive");

    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        // Byte offset of the first character past the cap
        let Some((limit, _)) = rest.char_indices().nth(cap) else {
            chunks.push(rest);
            break;
        };

        let window = &rest[..limit];
        let boundary = window
            .rfind('\n')
            .filter(|&i| i > 0)
            .or_else(|| window.rfind(' ').filter(|&i| i > 0));

        let (end, on_separator) = match boundary {
            Some(i) => (i, true),
            None => (limit, rest[limit..].starts_with(['\n', ' '])),
        };

        chunks.push(&rest[..end]);
        rest = &rest[end..];

        if on_separator {
            rest = &rest[1..];
        }
    }

    chunks
}
