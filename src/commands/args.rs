use crate::errors::{ShellError, ShellResult};
use std::collections::HashMap;

/// Flags and positionals of one stage, after the pipeline has expanded
/// combined short flags.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    flags: Vec<String>,
    values: HashMap<String, String>,
    pub positionals: Vec<String>,
}

impl ParsedArgs {
    /// Split `args` (with the command name at index 0) into flags and
    /// positionals. Flags not listed in `known` are a usage error. `-` and
    /// negative numbers are positionals.
    pub fn parse(args: &[String], known: &[&str]) -> ShellResult<Self> {
        let command = args.first().map(String::as_str).unwrap_or_default();
        let mut parsed = ParsedArgs::default();

        for arg in args.iter().skip(1) {
            let flag = if let Some(long) = arg.strip_prefix("--") {
                if long.is_empty() {
                    None
                } else {
                    Some(long)
                }
            } else if is_flag(arg) {
                Some(&arg[1..])
            } else {
                None
            };

            let Some(flag) = flag else {
                parsed.positionals.push(arg.clone());
                continue;
            };

            let (name, value) = match flag.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (flag, None),
            };
            if !known.contains(&name) {
                return Err(ShellError::usage(format!(
                    "{}: invalid option '{}'",
                    command, arg
                )));
            }
            if let Some(value) = value {
                parsed.values.insert(name.to_string(), value.to_string());
            }
            parsed.flags.push(name.to_string());
        }

        Ok(parsed)
    }

    pub fn has(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    /// True if any of `flags` was given.
    pub fn has_any(&self, flags: &[&str]) -> bool {
        flags.iter().any(|f| self.has(f))
    }

    pub fn value(&self, flag: &str) -> Option<&str> {
        self.values.get(flag).map(String::as_str)
    }

    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positionals.get(index).map(String::as_str)
    }
}

/// A single-dash flag: `-x`, but not `-`, `--…` or a negative number.
pub fn is_flag(arg: &str) -> bool {
    arg.len() > 1
        && arg.starts_with('-')
        && !arg.starts_with("--")
        && !arg[1..].starts_with(|c: char| c.is_ascii_digit())
}
