// streamguard/src/utils/fragments.rs
//! Turns a byte reader into text fragments for a stream session.
//!
//! Reads are decoded as UTF-8 incrementally; a character whose bytes straddle
//! two reads is held until it is complete.

use anyhow::{bail, Context, Result};
use std::io::{BufRead, BufReader, Read};

const READ_BLOCK: usize = 8 * 1024;

/// How input is cut into fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragmenting {
    /// Whatever each read returns.
    Blocks,
    /// Fixed-size fragments of this many characters. The last may be shorter.
    Chars(usize),
    /// One line per fragment, newline included.
    Lines,
}

/// Incremental UTF-8 decoder.
#[derive(Debug, Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Appends `bytes` and returns every complete character decoded so far.
    fn push(&mut self, bytes: &[u8]) -> Result<String> {
        self.pending.extend_from_slice(bytes);
        match std::str::from_utf8(&self.pending) {
            Ok(text) => {
                let text = text.to_string();
                self.pending.clear();
                Ok(text)
            }
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();
                let text = String::from_utf8_lossy(&self.pending[..valid]).into_owned();
                self.pending.drain(..valid);
                Ok(text)
            }
            Err(e) => bail!("Input is not valid UTF-8 (at byte offset {})", e.valid_up_to()),
        }
    }

    fn finish(&self) -> Result<()> {
        if !self.pending.is_empty() {
            bail!("Input ends in the middle of a UTF-8 character");
        }
        Ok(())
    }
}

/// Reads `reader` to the end, passing each fragment to `sink`.
///
/// `sink` returns `false` to stop early, e.g. when the consumer has gone away.
pub fn feed_fragments<R, F>(reader: R, mode: Fragmenting, mut sink: F) -> Result<()>
where
    R: Read,
    F: FnMut(String) -> bool,
{
    match mode {
        Fragmenting::Lines => {
            let mut reader = BufReader::new(reader);
            let mut line = String::new();
            loop {
                line.clear();
                let n = reader.read_line(&mut line).context("Failed to read input line")?;
                if n == 0 || !sink(line.clone()) {
                    return Ok(());
                }
            }
        }
        Fragmenting::Blocks => read_blocks(reader, |text| text.is_empty() || sink(text)),
        Fragmenting::Chars(size) => {
            let size = size.max(1);
            let mut carry = String::new();
            let mut carry_len = 0;
            let mut stopped = false;
            read_blocks(reader, |text| {
                for ch in text.chars() {
                    carry.push(ch);
                    carry_len += 1;
                    if carry_len == size {
                        carry_len = 0;
                        if !sink(std::mem::take(&mut carry)) {
                            stopped = true;
                            return false;
                        }
                    }
                }
                true
            })?;
            if !stopped && !carry.is_empty() {
                sink(carry);
            }
            Ok(())
        }
    }
}

fn read_blocks<R: Read, F: FnMut(String) -> bool>(mut reader: R, mut on_text: F) -> Result<()> {
    let mut decoder = Utf8Decoder::default();
    let mut block = vec![0u8; READ_BLOCK];
    loop {
        let n = match reader.read(&mut block) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("Failed to read input"),
        };
        if !on_text(decoder.push(&block[..n])?) {
            return Ok(());
        }
    }
    decoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A reader that hands out at most `step` bytes per call.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    fn collect(data: &[u8], step: usize, mode: Fragmenting) -> Result<Vec<String>> {
        let mut out = Vec::new();
        feed_fragments(Trickle { data, step }, mode, |f| {
            out.push(f);
            true
        })?;
        Ok(out)
    }

    #[test]
    fn test_multibyte_chars_survive_split_reads() {
        let text = "café – ünïcode";
        let out = collect(text.as_bytes(), 1, Fragmenting::Blocks).unwrap();
        assert_eq!(out.concat(), text);
    }

    #[test]
    fn test_fixed_size_fragments() {
        let out = collect("abcdefg".as_bytes(), 2, Fragmenting::Chars(3)).unwrap();
        assert_eq!(out, vec!["abc", "def", "g"]);
    }

    #[test]
    fn test_lines_keep_newlines() {
        let out = collect(b"one\ntwo\nthree", 4, Fragmenting::Lines).unwrap();
        assert_eq!(out, vec!["one\n", "two\n", "three"]);
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        assert!(collect(&[b'a', 0xff, b'b'], 8, Fragmenting::Blocks).is_err());
        assert!(collect(&[b'a', 0xc3], 8, Fragmenting::Blocks).is_err());
    }

    #[test]
    fn test_sink_can_stop_early() {
        let mut seen = Vec::new();
        feed_fragments("abcdef".as_bytes(), Fragmenting::Chars(2), |f| {
            seen.push(f);
            seen.len() < 2
        })
        .unwrap();
        assert_eq!(seen, vec!["ab", "cd"]);
    }
}
