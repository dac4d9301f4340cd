use memchr::memchr2;

/// Find the end of a quoted literal starting at `i` (which must point to `'`
/// or `"`). Backslash escapes and doubled quotes (`'it''s'`) do not close the
/// literal. Returns the position after the closing quote, or `None` if the
/// literal runs to the end of input.
pub(crate) fn find_string_end(bytes: &[u8], i: usize) -> Option<usize> {
    let quote = bytes[i];
    let mut j = i + 1;
    while j < bytes.len() {
        // Use memchr2 to jump to the next quote or backslash
        let end = j + memchr2(quote, b'\\', &bytes[j..])?;
        if bytes[end] == b'\\' {
            j = end + 2;
            continue;
        }
        if bytes.get(end + 1) == Some(&quote) {
            j = end + 2;
            continue;
        }
        return Some(end + 1);
    }
    None
}
