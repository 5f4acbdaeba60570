//! `ResourceStream`: a scoped handle over raw bytes plus the logical name that produced them
//! (`spec.md` §3, §6).

use std::io::Read;

/// An open, scoped handle over a resource's raw bytes.
///
/// Dropping a `ResourceStream` releases any underlying resource (an open file handle, a
/// socket); there is no separate `close()` call to remember, so every exit path — success,
/// parse failure, early return — releases it automatically via `Drop` on the boxed reader.
pub struct ResourceStream {
    name: String,
    reader: Box<dyn Read>,
}

impl ResourceStream {
    /// Wrap `reader` as a resource stream addressed by `name` (the logical resource name, used
    /// by [`crate::registry::StrategyResolver`] to pick a loader by file extension).
    pub fn new(name: impl Into<String>, reader: Box<dyn Read>) -> Self {
        Self {
            name: name.into(),
            reader,
        }
    }

    /// The logical name this stream was resolved for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Borrow the underlying byte source.
    pub fn reader(&mut self) -> &mut dyn Read {
        &mut self.reader
    }

    /// Consume the stream, returning its byte source.
    pub fn into_reader(self) -> Box<dyn Read> {
        self.reader
    }

    /// The file-extension portion of [`ResourceStream::name`], lower-cased, used to resolve a
    /// loader (`spec.md` §4.6.1).
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn extension_is_lower_cased() {
        let stream = ResourceStream::new("application.YAML", Box::new(Cursor::new(Vec::new())));
        assert_eq!(stream.extension().as_deref(), Some("yaml"));
    }

    #[test]
    fn extension_missing_without_dot() {
        let stream = ResourceStream::new("application", Box::new(Cursor::new(Vec::new())));
        assert_eq!(stream.extension(), None);
    }

    #[test]
    fn reads_through_to_underlying_bytes() {
        let mut stream = ResourceStream::new("x.json", Box::new(Cursor::new(b"{}".to_vec())));
        let mut buf = String::new();
        stream.reader().read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "{}");
    }
}
