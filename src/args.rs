//! Command-line argument capture
//!
//! Arguments are recorded for `$test$plusargs` / `$value$plusargs` lookups.
//! Arguments starting with `+verilator+` are runtime options that configure
//! the runtime itself when recorded.

use serde::Serialize;

use crate::error::{Result, VerilatedError};

const RUNTIME_PREFIX: &str = "+verilator+";

/// A `+verilator+...` runtime option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeOption {
    /// `+verilator+debug`
    Debug,
    /// `+verilator+debugi+<level>`
    DebugLevel(i32),
    /// `+verilator+error+limit+<n>`
    ErrorLimit(i32),
    /// `+verilator+noassert`
    NoAssert,
    /// `+verilator+rand+reset+<policy>`
    RandReset(i32),
    /// `+verilator+seed+<seed>`
    Seed(i32),
    /// `+verilator+help`
    Help,
    /// `+verilator+V` or `+verilator+version`
    Version,
}

impl RuntimeOption {
    /// Parse one argument; `Ok(None)` when it is not a runtime option
    pub fn parse(arg: &str) -> Result<Option<Self>> {
        let Some(rest) = arg.strip_prefix(RUNTIME_PREFIX) else {
            return Ok(None);
        };

        let number = |value: &str| -> Result<i32> {
            value
                .parse()
                .map_err(|_| VerilatedError::InvalidRuntimeArg(arg.to_string()))
        };

        let option = if rest == "debug" {
            RuntimeOption::Debug
        } else if let Some(v) = rest.strip_prefix("debugi+") {
            RuntimeOption::DebugLevel(number(v)?)
        } else if let Some(v) = rest.strip_prefix("error+limit+") {
            RuntimeOption::ErrorLimit(number(v)?)
        } else if rest == "noassert" {
            RuntimeOption::NoAssert
        } else if let Some(v) = rest.strip_prefix("rand+reset+") {
            RuntimeOption::RandReset(number(v)?)
        } else if let Some(v) = rest.strip_prefix("seed+") {
            RuntimeOption::Seed(number(v)?)
        } else if rest == "help" {
            RuntimeOption::Help
        } else if rest == "V" || rest == "version" {
            RuntimeOption::Version
        } else {
            return Err(VerilatedError::UnknownRuntimeArg(arg.to_string()));
        };
        Ok(Some(option))
    }
}

/// Recorded process arguments
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommandArgs {
    args: Vec<String>,
    loaded: bool,
}

impl CommandArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the recorded arguments
    pub fn record<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.clear();
        self.add(args);
    }

    /// Append to the recorded arguments
    pub fn add<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self.loaded = true;
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Whether arguments were ever recorded (even an empty list)
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// First plusarg whose text after `+` starts with `prefix`
    ///
    /// `prefix` excludes the leading `+`. The whole argument is returned.
    pub fn plus_match(&self, prefix: &str) -> Option<&str> {
        self.args
            .iter()
            .filter_map(|arg| arg.strip_prefix('+').map(|rest| (arg, rest)))
            .find(|(_, rest)| rest.starts_with(prefix))
            .map(|(arg, _)| arg.as_str())
    }

    /// Runtime options among the recorded arguments, in order
    pub fn runtime_options(&self) -> Result<Vec<RuntimeOption>> {
        let mut options = Vec::new();
        for arg in &self.args {
            if let Some(option) = RuntimeOption::parse(arg)? {
                options.push(option);
            }
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plus_match_returns_whole_arg() {
        let mut args = CommandArgs::new();
        args.record(["sim", "+trace", "+seed=42", "-x"]);

        assert_eq!(args.plus_match("seed"), Some("+seed=42"));
        assert_eq!(args.plus_match("trace"), Some("+trace"));
        assert_eq!(args.plus_match("tr"), Some("+trace"));
        assert_eq!(args.plus_match("x"), None);
        assert_eq!(args.plus_match("sim"), None);
        assert_eq!(args.plus_match("missing"), None);
    }

    #[test]
    fn test_record_replaces_add_appends() {
        let mut args = CommandArgs::new();
        assert!(!args.is_loaded());
        args.record(["a", "+one"]);
        args.add(["+two"]);
        assert_eq!(args.args(), ["a", "+one", "+two"]);
        args.record(["b"]);
        assert_eq!(args.args(), ["b"]);
        assert!(args.is_loaded());
    }

    #[test]
    fn test_runtime_options() {
        let mut args = CommandArgs::new();
        args.record([
            "sim",
            "+verilator+debug",
            "+verilator+debugi+7",
            "+verilator+error+limit+3",
            "+verilator+noassert",
            "+verilator+rand+reset+2",
            "+verilator+seed+-5",
            "+verilator+V",
            "+user",
        ]);
        assert_eq!(
            args.runtime_options().unwrap(),
            vec![
                RuntimeOption::Debug,
                RuntimeOption::DebugLevel(7),
                RuntimeOption::ErrorLimit(3),
                RuntimeOption::NoAssert,
                RuntimeOption::RandReset(2),
                RuntimeOption::Seed(-5),
                RuntimeOption::Version,
            ]
        );
    }

    #[test]
    fn test_runtime_option_errors() {
        assert!(matches!(
            RuntimeOption::parse("+verilator+bogus"),
            Err(VerilatedError::UnknownRuntimeArg(_))
        ));
        assert!(matches!(
            RuntimeOption::parse("+verilator+seed+abc"),
            Err(VerilatedError::InvalidRuntimeArg(_))
        ));
        assert_eq!(RuntimeOption::parse("+verilatorish").unwrap(), None);
    }
}
