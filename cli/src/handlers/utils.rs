use core::fmt;
use std::io;

/// Lets the handlers write to any [`io::Write`] through [`fmt::Write`].
pub struct WriteAdapter<W>(pub W);

impl<W> fmt::Write for WriteAdapter<W>
where
    W: io::Write,
{
    fn write_str(&mut self, s: &str) -> Result<(), fmt::Error> {
        self.0.write_all(s.as_bytes()).map_err(|_| fmt::Error)
    }

    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), fmt::Error> {
        self.0.write_fmt(args).map_err(|_| fmt::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn test_write_adapter() {
        let mut out = WriteAdapter(Vec::new());
        write!(out, "{} tracks", 3).unwrap();
        out.write_str(", done").unwrap();
        assert_eq!(String::from_utf8(out.0).unwrap(), "3 tracks, done");
    }
}
