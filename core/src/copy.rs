use std::io::{self, ErrorKind, Read, Write};

/// Default chunk size used when copying file payloads.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Copies `reader` into `writer` one fixed-size chunk at a time.
///
/// Only a single chunk is held in memory, and each chunk is fully written before
/// the next read. Returns the number of bytes transferred.
pub fn copy_stream<R, W>(reader: &mut R, writer: &mut W, chunk_size: usize) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        writer.write_all(&buffer[..n])?;
        total += n as u64;
    }

    writer.flush()?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Sink that records the largest single write it has seen.
    struct ChunkRecorder {
        data: Vec<u8>,
        largest_write: usize,
        writes: usize,
    }

    impl Write for ChunkRecorder {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.largest_write = self.largest_write.max(buf.len());
            self.writes += 1;
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::new(ErrorKind::Other, "disk went away"));
            }
            self.served = true;
            buf[0] = b'x';
            Ok(1)
        }
    }

    #[test]
    fn test_copy_small_payload() {
        let mut reader = Cursor::new(b"hello dirpack".to_vec());
        let mut out = Vec::new();

        let copied = copy_stream(&mut reader, &mut out, 4).unwrap();

        assert_eq!(copied, 13);
        assert_eq!(out, b"hello dirpack");
    }

    #[test]
    fn test_copy_empty_source() {
        let mut reader = io::empty();
        let mut out = Vec::new();

        assert_eq!(copy_stream(&mut reader, &mut out, 16).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_copy_large_stream_is_chunked() {
        let chunk = 1024;
        let total = 8 * 1024 * 1024;
        let mut reader = io::repeat(0xA5).take(total as u64);
        let mut recorder = ChunkRecorder {
            data: Vec::new(),
            largest_write: 0,
            writes: 0,
        };

        let copied = copy_stream(&mut reader, &mut recorder, chunk).unwrap();

        assert_eq!(copied, total as u64);
        assert_eq!(recorder.data.len(), total);
        assert!(recorder.data.iter().all(|b| *b == 0xA5));
        assert!(recorder.largest_write <= chunk);
        assert!(recorder.writes >= total / chunk);
    }

    #[test]
    fn test_copy_propagates_read_error() {
        let mut reader = FailingReader { served: false };
        let mut out = Vec::new();

        let err = copy_stream(&mut reader, &mut out, 8).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(out, b"x");
    }

    #[test]
    fn test_zero_chunk_size_still_progresses() {
        let mut reader = Cursor::new(vec![1u8, 2, 3]);
        let mut out = Vec::new();

        assert_eq!(copy_stream(&mut reader, &mut out, 0).unwrap(), 3);
        assert_eq!(out, vec![1, 2, 3]);
    }
}
