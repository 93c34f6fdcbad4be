//! Forward-only cursor over an in-memory byte buffer.
//!
//! Every read reports end-of-data as `None` instead of failing, leaving the
//! caller to decide whether running out of bytes is the normal end of the
//! payload or a truncated field.

/// A read position within a borrowed byte slice.
#[derive(Debug, Clone)]
pub(crate) struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Number of bytes consumed so far.
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Look at the next byte without consuming it.
    pub(crate) fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Read up to (not including) the next `delim`, consuming the delimiter.
    ///
    /// Returns `None` and consumes nothing if `delim` does not occur in the
    /// remaining bytes.
    pub(crate) fn read_until(&mut self, delim: u8) -> Option<&'a [u8]> {
        let rest = &self.data[self.pos..];
        let idx = rest.iter().position(|&b| b == delim)?;
        self.pos += idx + 1;
        Some(&rest[..idx])
    }

    /// Read exactly `n` bytes, or `None` (consuming nothing) if fewer remain.
    pub(crate) fn read_exact(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    /// Consume and return everything that is left.
    pub(crate) fn rest(&mut self) -> &'a [u8] {
        let bytes = &self.data[self.pos..];
        self.pos = self.data.len();
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_until_consumes_delimiter() {
        let mut cursor = ByteCursor::new(b"tree 12\0rest");
        assert_eq!(cursor.read_until(b' '), Some(&b"tree"[..]));
        assert_eq!(cursor.read_until(0), Some(&b"12"[..]));
        assert_eq!(cursor.position(), 8);
        assert_eq!(cursor.rest(), b"rest");
        assert_eq!(cursor.peek(), None);
    }

    #[test]
    fn test_read_until_missing_delimiter() {
        let mut cursor = ByteCursor::new(b"no-space");
        assert_eq!(cursor.read_until(b' '), None);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_read_exact_short() {
        let mut cursor = ByteCursor::new(&[1, 2, 3]);
        assert_eq!(cursor.read_exact(2), Some(&[1u8, 2][..]));
        assert_eq!(cursor.read_exact(2), None);
        assert_eq!(cursor.peek(), Some(3));
    }

    #[test]
    fn test_read_exact_allows_null_bytes() {
        let mut cursor = ByteCursor::new(&[0, 0, 7]);
        assert_eq!(cursor.read_exact(3), Some(&[0u8, 0, 7][..]));
        assert_eq!(cursor.peek(), None);
    }
}
