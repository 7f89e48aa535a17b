/*!
 * Joining streamed caption fragments.
 */

/// Characters that attach to the text before them
const NO_SPACE_BEFORE: &[char] = &[
    '.', ',', '!', '?', ';', ':', ')', ']', '}', '%', '"', '\'', '\u{201d}', '\u{2019}', '\u{2026}',
];

/// Characters that attach to the text after them
const NO_SPACE_AFTER: &[char] = &['(', '[', '{', '<', '"', '\'', '\u{201c}', '\u{2018}'];

/// Join an existing unit text and a newly confirmed fragment.
///
/// A single space separates the two unless the fragment opens with closing
/// punctuation or the base ends with opening punctuation.
pub fn join_stream_text(base: &str, addition: &str) -> String {
    let left = base.trim_end();
    let right = addition.trim_start();

    if left.is_empty() {
        return right.trim_end().to_string();
    }
    if right.is_empty() {
        return left.trim_start().to_string();
    }

    let attaches = right.starts_with(NO_SPACE_BEFORE) || left.ends_with(NO_SPACE_AFTER);

    let mut joined = String::with_capacity(left.len() + right.len() + 1);
    joined.push_str(left);
    if !attaches {
        joined.push(' ');
    }
    joined.push_str(right);
    joined
}
