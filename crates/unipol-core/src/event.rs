//! Event trait: the contract every fact producer implements
use std::fmt::Write;

/// Predicate of the synthetic fact closing every run
pub const END_TEST: &str = "end_test";

/// An event kind bound to its inputs, ready to be rendered as facts
pub trait Event {
    /// Predicate name of the facts this event renders
    fn predicate(&self) -> &'static str;

    /// Render the event as zero or more fact lines
    fn compile(&self) -> Vec<String>;
}

/// Argument of a fact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg<'a> {
    Str(&'a str),
    Int(i64),
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(value: &'a str) -> Self {
        Arg::Str(value)
    }
}

impl<'a> From<&'a String> for Arg<'a> {
    fn from(value: &'a String) -> Self {
        Arg::Str(value.as_str())
    }
}

impl From<i64> for Arg<'_> {
    fn from(value: i64) -> Self {
        Arg::Int(value)
    }
}

/// Render `@<ts> <predicate>(<args>)`
pub fn fact(timestamp: i64, predicate: &str, args: &[Arg<'_>]) -> String {
    let mut out = format!("@{} {}(", timestamp, predicate);
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        match arg {
            Arg::Str(s) => push_quoted(&mut out, s),
            Arg::Int(n) => {
                let _ = write!(out, "{}", n);
            }
        }
    }
    out.push(')');
    out
}

fn push_quoted(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Synthetic event added as the very last event of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalEvent {
    timestamp: i64,
}

impl FinalEvent {
    pub fn new(timestamp: i64) -> Self {
        Self { timestamp }
    }

    pub fn fact(&self) -> String {
        fact(self.timestamp, END_TEST, &[])
    }
}

impl Event for FinalEvent {
    fn predicate(&self) -> &'static str {
        END_TEST
    }

    fn compile(&self) -> Vec<String> {
        vec![self.fact()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_rendering() {
        let line = fact(42, "finalized", &["node-1".into(), Arg::Int(7)]);
        assert_eq!(line, r#"@42 finalized("node-1", 7)"#);
    }

    #[test]
    fn test_fact_escaping() {
        let line = fact(1, "log", &[r#"say "hi" \ bye"#.into(), "a\nb".into()]);
        assert_eq!(line, r#"@1 log("say \"hi\" \\ bye", "a\nb")"#);
    }

    #[test]
    fn test_final_event() {
        let event = FinalEvent::new(1234);
        assert_eq!(event.predicate(), END_TEST);
        assert_eq!(event.compile(), vec!["@1234 end_test()".to_string()]);
    }
}
