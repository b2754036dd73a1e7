//! ServerQuery wire format.
//!
//! Commands: `name key=value -flag ...`
//! Replies:  zero or more data lines, then `error id=N msg=...`
//! Data lines hold `|`-separated records of space-separated `key=value`
//! fields. Values are escaped so they never contain spaces, pipes or
//! line breaks.

use std::collections::HashMap;
use std::str::FromStr;

/// Escape a value for the wire.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '/' => out.push_str("\\/"),
            ' ' => out.push_str("\\s"),
            '|' => out.push_str("\\p"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0B}' => out.push_str("\\v"),
            c => out.push(c),
        }
    }
    out
}

/// Reverse of [`escape`]. Unknown escapes keep the escaped character.
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => out.push(' '),
            Some('p') => out.push('|'),
            Some('a') => out.push('\u{07}'),
            Some('b') => out.push('\u{08}'),
            Some('f') => out.push('\u{0C}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('v') => out.push('\u{0B}'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// One record of a reply: field name to unescaped value. Bare keys map to "".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    pub fn parse(raw: &str) -> Self {
        let fields = raw
            .split(' ')
            .filter(|token| !token.is_empty())
            .map(|token| match token.split_once('=') {
                Some((key, value)) => (key.to_string(), unescape(value)),
                None => (token.to_string(), String::new()),
            })
            .collect();
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn str_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Numeric field, or `None` when missing or malformed.
    pub fn num<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }
}

/// Split a data line into its records.
pub fn parse_records(line: &str) -> Vec<Record> {
    line.split('|').map(Record::parse).collect()
}

/// Terminal `error` line of a reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub id: u32,
    pub msg: String,
}

impl Status {
    /// `database empty result set`: a successful query with no rows.
    pub const EMPTY_RESULT: u32 = 1281;

    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.strip_prefix("error ")?;
        let record = Record::parse(rest);
        Some(Self {
            id: record.num("id")?,
            msg: record.str_or("msg", ""),
        })
    }

    pub fn is_ok(&self) -> bool {
        self.id == 0 || self.id == Self::EMPTY_RESULT
    }
}

/// Server-pushed event line such as `notifycliententerview ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub event: String,
    pub record: Record,
}

impl Notification {
    pub fn parse(line: &str) -> Option<Self> {
        if !line.starts_with("notify") {
            return None;
        }
        let (event, rest) = line.split_once(' ').unwrap_or((line, ""));
        Some(Self {
            event: event.to_string(),
            record: Record::parse(rest),
        })
    }
}

/// An outgoing command.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub name: String,
    params: Vec<(String, String)>,
    flags: Vec<String>,
}

impl Command {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            params: Vec::new(),
            flags: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn flag(mut self, flag: &str) -> Self {
        self.flags.push(flag.to_string());
        self
    }

    /// Wire form without the line terminator.
    pub fn format(&self) -> String {
        let mut out = String::with_capacity(64);
        out.push_str(&self.name);
        for (key, value) in &self.params {
            out.push(' ');
            out.push_str(key);
            out.push('=');
            out.push_str(&escape(value));
        }
        for flag in &self.flags {
            out.push_str(" -");
            out.push_str(flag);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_special_characters() {
        assert_eq!(escape("My Server"), "My\\sServer");
        assert_eq!(escape("a|b/c\\d"), "a\\pb\\/c\\\\d");
        assert_eq!(escape("line\nbreak\r\ttab"), "line\\nbreak\\r\\ttab");
    }

    #[test]
    fn test_unescape_reverses_escape() {
        let raw = "Ä name | with/odd\\chars\t\n";
        assert_eq!(unescape(&escape(raw)), raw);
    }

    #[test]
    fn test_unescape_tolerates_unknown_and_trailing() {
        assert_eq!(unescape("a\\xb"), "axb");
        assert_eq!(unescape("end\\"), "end\\");
    }

    #[test]
    fn test_parse_serverinfo_record() {
        let record = Record::parse(
            "virtualserver_name=Die\\sGilde virtualserver_clientsonline=6 virtualserver_uptime=3725",
        );
        assert_eq!(record.get("virtualserver_name"), Some("Die Gilde"));
        assert_eq!(record.num::<u32>("virtualserver_clientsonline"), Some(6));
        assert_eq!(record.num::<u64>("virtualserver_uptime"), Some(3725));
        assert_eq!(record.num::<u32>("missing"), None);
    }

    #[test]
    fn test_bare_keys_and_equals_in_values() {
        let record = Record::parse("client_away msg=a=b");
        assert!(record.contains("client_away"));
        assert_eq!(record.get("client_away"), Some(""));
        assert_eq!(record.get("msg"), Some("a=b"));
    }

    #[test]
    fn test_parse_records_splits_on_pipe() {
        let records = parse_records("clid=1 client_nickname=a|clid=2 client_nickname=b\\pc");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("client_nickname"), Some("b|c"));
    }

    #[test]
    fn test_parse_status_line() {
        let ok = Status::parse("error id=0 msg=ok").unwrap();
        assert!(ok.is_ok());

        let denied = Status::parse("error id=2568 msg=insufficient\\sclient\\spermissions").unwrap();
        assert_eq!(denied.id, 2568);
        assert_eq!(denied.msg, "insufficient client permissions");
        assert!(!denied.is_ok());

        assert!(Status::parse("error id=1281 msg=database\\sempty\\sresult\\sset").unwrap().is_ok());
        assert_eq!(Status::parse("clid=1"), None);
        assert_eq!(Status::parse("error msg=no\\sid"), None);
    }

    #[test]
    fn test_parse_notification() {
        let n = Notification::parse("notifycliententerview cfid=0 client_nickname=Bob client_type=0").unwrap();
        assert_eq!(n.event, "notifycliententerview");
        assert_eq!(n.record.get("client_nickname"), Some("Bob"));

        let bare = Notification::parse("notifyserveredited").unwrap();
        assert_eq!(bare.event, "notifyserveredited");
        assert!(Notification::parse("error id=0 msg=ok").is_none());
    }

    #[test]
    fn test_format_command() {
        let cmd = Command::new("clientupdate").param("client_nickname", "Banner Bot");
        assert_eq!(cmd.format(), "clientupdate client_nickname=Banner\\sBot");

        let list = Command::new("clientlist").flag("away").flag("times");
        assert_eq!(list.format(), "clientlist -away -times");
    }

    #[test]
    fn test_format_cannot_inject_lines() {
        let cmd = Command::new("login")
            .param("client_login_name", "admin\nquit")
            .param("client_login_password", "p w");
        let wire = cmd.format();
        assert!(!wire.contains('\n'));
        assert_eq!(wire, "login client_login_name=admin\\nquit client_login_password=p\\sw");
    }
}
