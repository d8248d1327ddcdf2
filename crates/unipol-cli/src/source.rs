//! Newline-delimited JSON log source
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::Path;

use unipol_core::{LogDoc, PreprocessError, Result};

/// Reads one [`LogDoc`] per non-blank line
pub struct JsonLines<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: BufRead> JsonLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for JsonLines<R> {
    type Item = Result<LogDoc>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            let line_no = self.line_no;
            return Some(LogDoc::from_json_line(&line).map_err(|err| match err {
                PreprocessError::MalformedDocument(msg) => {
                    PreprocessError::MalformedDocument(format!("line {}: {}", line_no, msg))
                }
                other => other,
            }));
        }
    }
}

/// Open `path`, or stdin when absent
pub fn open_input(path: Option<&Path>) -> io::Result<Box<dyn BufRead>> {
    Ok(match path {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_blank_lines() {
        let input = "{\"timestamp\": 1, \"host\": \"a\"}\n\n   \n{\"timestamp\": 2, \"host\": \"b\"}\n";
        let docs: Vec<LogDoc> = JsonLines::new(input.as_bytes())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].host, "b");
    }

    #[test]
    fn test_reports_line_number() {
        let input = "{\"timestamp\": 1, \"host\": \"a\"}\n\nnot json\n";
        let mut docs = JsonLines::new(input.as_bytes());
        assert!(docs.next().unwrap().is_ok());
        let err = docs.next().unwrap().unwrap_err();
        assert!(err.to_string().contains("line 3"), "{}", err);
        assert!(docs.next().is_none());
    }
}
