use std::fs::File;
use std::io::{self, BufWriter, Cursor, Read, Write};
use std::path::Path;

use crate::diagnostics::ErrorHandler;
use crate::error::ParseError;
use crate::parser::Parser;

/// Source reading from a file, or stdin when no path is given
pub fn open_source(path: Option<&Path>) -> io::Result<Box<dyn Read>> {
    Ok(match path {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin().lock()),
    })
}

/// Read the whole source as one string.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD instead of failing.
pub fn read_source(path: Option<&Path>) -> io::Result<String> {
    read_lossy(&mut open_source(path)?)
}

fn read_lossy<R: Read + ?Sized>(reader: &mut R) -> io::Result<String> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Buffered sink writing to a file or stdout
pub fn open_sink(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

/// The parse failure carried by an error from [`SpintaxReader`], if any
pub fn parse_error(err: &io::Error) -> Option<&ParseError> {
    err.get_ref()?.downcast_ref::<ParseError>()
}

/// A reader wrapper that yields every permutation of the spintax read from `inner`,
/// one per line.
///
/// Spintax can only be parsed as a whole, so the first read consumes `inner`
/// completely. A parse failure is returned once as [`io::ErrorKind::InvalidData`];
/// later reads see end of input.
pub struct SpintaxReader<R: Read, H: ErrorHandler> {
    inner: R,
    parser: Parser<H>,
    output: Option<Cursor<Vec<u8>>>,
}

impl<R: Read, H: ErrorHandler> SpintaxReader<R, H> {
    pub fn new(inner: R, parser: Parser<H>) -> Self {
        Self {
            inner,
            parser,
            output: None,
        }
    }

    pub fn into_parser(self) -> Parser<H> {
        self.parser
    }

    fn expand(&mut self) -> io::Result<Vec<u8>> {
        let input = read_lossy(&mut self.inner)?;
        let structure = self
            .parser
            .parse(&input)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut expanded = Vec::new();
        structure.write_permutations(&mut expanded)?;
        Ok(expanded)
    }
}

impl<R: Read, H: ErrorHandler> Read for SpintaxReader<R, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.output.is_none() {
            // Left empty if expansion fails
            self.output = Some(Cursor::default());
            let expanded = self.expand()?;
            self.output = Some(Cursor::new(expanded));
        }
        match &mut self.output {
            Some(output) => output.read(buf),
            None => Ok(0),
        }
    }
}
