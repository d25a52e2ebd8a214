//! Loads a memory image from standard input: one octal word per line,
//! line N populating byte address `2·N` (§6, §9's resolution of the
//! N-vs-2N ambiguity).

use crate::core::memory::WordMemory;
use crate::core::MEMORY_SIZE;
use std::io::BufRead;

#[derive(Debug)]
pub enum LoadError {
    Parse { line_number: usize, text: String },
    Overlong { line_number: usize },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Parse { line_number, text } => {
                write!(f, "line {line_number}: not a valid octal word: {text:?}")
            }
            LoadError::Overlong { line_number } => {
                write!(f, "line {line_number}: image exceeds the {}-word memory capacity", MEMORY_SIZE / 2)
            }
        }
    }
}

impl std::error::Error for LoadError {}

pub fn load<R: BufRead>(input: R) -> Result<WordMemory, LoadError> {
    let mut memory = WordMemory::new();

    for (line_number, line) in input.lines().enumerate() {
        let line = line.map_err(|_| LoadError::Parse { line_number, text: String::new() })?;
        let trimmed = line.trim();

        let word = u16::from_str_radix(trimmed, 8)
            .map_err(|_| LoadError::Parse { line_number, text: trimmed.to_string() })?;

        memory
            .load_word(line_number, word)
            .map_err(|_| LoadError::Overlong { line_number })?;
    }

    Ok(memory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn loads_sequential_words_at_doubled_addresses() {
        let input = Cursor::new(b"012700\n000005\n000000\n".to_vec());
        let memory = load(input).unwrap();
        assert_eq!(memory.peek_word(0), Some(0o012700));
        assert_eq!(memory.peek_word(2), Some(5));
        assert_eq!(memory.peek_word(4), Some(0));
    }

    #[test]
    fn tolerates_leading_whitespace() {
        let input = Cursor::new(b"  000001\n".to_vec());
        let memory = load(input).unwrap();
        assert_eq!(memory.peek_word(0), Some(1));
    }

    #[test]
    fn blank_line_is_a_parse_error() {
        let input = Cursor::new(b"000001\n\n".to_vec());
        assert!(matches!(load(input), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn rejects_non_octal_line() {
        let input = Cursor::new(b"not-octal\n".to_vec());
        assert!(matches!(load(input), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn rejects_image_longer_than_memory() {
        let mut text = String::new();
        for _ in 0..(MEMORY_SIZE / 2 + 1) {
            text.push_str("000000\n");
        }
        assert!(matches!(load(Cursor::new(text.into_bytes())), Err(LoadError::Overlong { .. })));
    }
}
