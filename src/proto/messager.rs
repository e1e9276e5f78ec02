//! Wire framing (spec.md §6, "Two framings exist; the core is
//! agnostic"). Mirrors the teacher's `proto::Format` split between two
//! encodings behind one trait, except the payload format here is always
//! the same ASCII token line — only the delimiter differs.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::TcpStream;

use crate::error::{ProtocolError, Result};

/// One framed message exchange: read a line of whitespace-tokenized
/// ASCII from the referee, or write one back.
pub trait Messager {
    fn read_message(&mut self) -> Result<Option<String>>;
    fn write_message(&mut self, line: &str) -> Result<()>;
}

fn io_err(context: &str, err: io::Error) -> ProtocolError {
    ProtocolError::malformed(format!("{context}: {err}"))
}

/// Newline-terminated framing (spec.md §6's default "line" framing).
pub struct LineMessager<R, W> {
    reader: BufReader<R>,
    writer: W,
}

impl LineMessager<TcpStream, TcpStream> {
    pub fn connect(stream: TcpStream) -> io::Result<Self> {
        let writer = stream.try_clone()?;
        Ok(LineMessager {
            reader: BufReader::new(stream),
            writer,
        })
    }
}

impl<R: Read, W: Write> LineMessager<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        LineMessager {
            reader: BufReader::new(reader),
            writer,
        }
    }
}

impl<R: Read, W: Write> Messager for LineMessager<R, W> {
    fn read_message(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let n = self
            .reader
            .read_line(&mut line)
            .map_err(|e| io_err("reading line", e))?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    fn write_message(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{line}").map_err(|e| io_err("writing line", e))?;
        self.writer.flush().map_err(|e| io_err("flushing", e))
    }
}

/// 4-byte big-endian length prefix plus payload, same token-line body
/// (spec.md §6's "buffered" framing).
pub struct BufferedMessager<R, W> {
    reader: R,
    writer: W,
}

impl BufferedMessager<TcpStream, TcpStream> {
    pub fn connect(stream: TcpStream) -> io::Result<Self> {
        let writer = stream.try_clone()?;
        Ok(BufferedMessager {
            reader: stream,
            writer,
        })
    }
}

impl<R: Read, W: Write> BufferedMessager<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        BufferedMessager { reader, writer }
    }
}

impl<R: Read, W: Write> Messager for BufferedMessager<R, W> {
    fn read_message(&mut self) -> Result<Option<String>> {
        let mut len_buf = [0u8; 4];
        if let Err(e) = self.reader.read_exact(&mut len_buf) {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                return Ok(None);
            }
            return Err(io_err("reading length prefix", e));
        }
        let len = u32::from_be_bytes(len_buf) as usize;
        let mut payload = vec![0u8; len];
        self.reader
            .read_exact(&mut payload)
            .map_err(|e| io_err("reading payload", e))?;
        String::from_utf8(payload)
            .map(Some)
            .map_err(|e| ProtocolError::malformed(format!("payload not valid utf-8: {e}")))
    }

    fn write_message(&mut self, line: &str) -> Result<()> {
        let len = (line.len() as u32).to_be_bytes();
        self.writer.write_all(&len).map_err(|e| io_err("writing length prefix", e))?;
        self.writer
            .write_all(line.as_bytes())
            .map_err(|e| io_err("writing payload", e))?;
        self.writer.flush().map_err(|e| io_err("flushing", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn line_messager_roundtrip() {
        let input = Cursor::new(b"hello world\nfoo\n".to_vec());
        let mut output = Vec::new();
        let mut messager = LineMessager::new(input, &mut output);
        assert_eq!(messager.read_message().unwrap().as_deref(), Some("hello world"));
        assert_eq!(messager.read_message().unwrap().as_deref(), Some("foo"));
        assert_eq!(messager.read_message().unwrap(), None);
    }

    #[test]
    fn line_messager_writes_newline_terminated() {
        let input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let mut messager = LineMessager::new(input, &mut output);
        messager.write_message("ok").unwrap();
        assert_eq!(output, b"ok\n");
    }

    #[test]
    fn buffered_messager_roundtrip() {
        let mut wire = Vec::new();
        wire.extend_from_slice(&5u32.to_be_bytes());
        wire.extend_from_slice(b"hello");
        let input = Cursor::new(wire);
        let mut output = Vec::new();
        let mut messager = BufferedMessager::new(input, &mut output);
        assert_eq!(messager.read_message().unwrap().as_deref(), Some("hello"));
        assert_eq!(messager.read_message().unwrap(), None);
    }

    #[test]
    fn buffered_messager_writes_length_prefix() {
        let input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let mut messager = BufferedMessager::new(input, &mut output);
        messager.write_message("ok").unwrap();
        assert_eq!(&output[..4], &2u32.to_be_bytes());
        assert_eq!(&output[4..], b"ok");
    }
}
