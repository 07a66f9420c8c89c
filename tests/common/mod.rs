//! Helpers shared by the integration tests

#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// An in-memory report sink that tests can read back
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .expect("report output is not UTF-8")
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Counts parsed back out of a report line like `A-2 1 [>> 4 >>] 0 1-B`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub idle_a: usize,
    pub queued_a: usize,
    pub occupant: Option<usize>,
    pub queued_b: usize,
    pub idle_b: usize,
}

impl ParsedLine {
    pub fn total(&self) -> usize {
        self.idle_a + self.queued_a + self.queued_b + self.idle_b + usize::from(self.occupant.is_some())
    }
}

pub fn parse_report_line(line: &str) -> Option<ParsedLine> {
    let inner = line.strip_prefix("A-")?.strip_suffix("-B")?;
    let tokens: Vec<&str> = inner.split_whitespace().collect();
    if tokens.len() != 7 {
        return None;
    }
    let occupant = match tokens[3] {
        "x" => None,
        id => Some(id.parse().ok()?),
    };
    Some(ParsedLine {
        idle_a: tokens[0].parse().ok()?,
        queued_a: tokens[1].parse().ok()?,
        occupant,
        queued_b: tokens[5].parse().ok()?,
        idle_b: tokens[6].parse().ok()?,
    })
}
