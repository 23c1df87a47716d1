use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;

struct GoFlag {
    desc: &'static str,
    default: String,
    is_boolean: bool,
    setter: Box<dyn Fn(&str) -> Result<()>>,
}

pub struct FlagValue<T> {
    r: Rc<RefCell<T>>,
}

impl<T: Clone> FlagValue<T> {
    fn new(r: Rc<RefCell<T>>) -> Self {
        Self { r }
    }

    pub fn get(&self) -> T {
        self.r.borrow().clone()
    }
}

/// What the command line asked for, once all flags were consumed.
#[derive(Debug, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed,
    HelpRequested,
}

/// A flag set which accepts the same syntax as Go's `flag` package:
/// `-name value`, `-name=value`, `--name value` and bare `-name` for booleans.
pub struct GoFlagSet {
    flags: HashMap<&'static str, GoFlag>,
    // Registration order, used when rendering the usage text
    order: Vec<&'static str>,
}

impl GoFlagSet {
    pub fn new() -> Self {
        GoFlagSet {
            flags: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn parse_args(&self, mut args: impl Iterator<Item = String>) -> Result<ParseOutcome> {
        let mut parsed_flags = HashSet::new();

        while let Some(arg) = args.next() {
            // Trim dashes at the beginning
            let arg = arg
                .as_str()
                .strip_prefix("--")
                .or_else(|| arg.strip_prefix('-'))
                .ok_or_else(|| anyhow::anyhow!("Expected an option, but got {}", arg))?;

            // Get the name of the flag, and - if it has form '-name=value' - its value
            let (name, maybe_value) = match arg.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (arg, None),
            };

            anyhow::ensure!(!name.is_empty(), "Bad flag syntax: {}", arg);

            // Get the flag object. Like in Go, -h and -help are implicitly
            // defined unless the command registered them itself
            let flag = match self.flags.get(name) {
                Some(flag) => flag,
                None if name == "h" || name == "help" => return Ok(ParseOutcome::HelpRequested),
                None => return Err(anyhow::anyhow!("Unknown flag: {}", name)),
            };

            // Ensure that the flag was not present
            anyhow::ensure!(
                parsed_flags.insert(name.to_owned()),
                "The flag {} was provided twice",
                name,
            );

            // If the flag was not of form '-name=value`, get the value from the next arg
            let value = match maybe_value {
                Some(value) => value.to_owned(),
                None if flag.is_boolean => "1".to_owned(),
                None => args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("Value is missing for flag {}", name))?,
            };

            (flag.setter)(value.as_ref())
                .map_err(|err| anyhow::anyhow!("Invalid value {:?} for flag -{}: {}", value, name, err))?;
        }

        Ok(ParseOutcome::Parsed)
    }

    /// Renders one line per flag, in registration order.
    pub fn usage(&self) -> String {
        let width = self.order.iter().map(|name| name.len()).max().unwrap_or(0);
        let mut out = String::new();
        for name in &self.order {
            let flag = &self.flags[name];
            out.push_str(&format!(" -{:<width$}  {}", name, flag.desc, width = width));
            if !flag.default.is_empty() {
                out.push_str(&format!(" (defaults to {})", flag.default));
            }
            out.push('\n');
        }
        out
    }

    pub fn bool_var(
        &mut self,
        name: &'static str,
        default: bool,
        desc: &'static str,
    ) -> FlagValue<bool> {
        self.add_flag(name, true, default, String::new(), desc, move |s| match s {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            _ => Err(anyhow::anyhow!("Invalid value for bool flag: {}", s)),
        })
    }

    pub fn string_var(
        &mut self,
        name: &'static str,
        default: impl ToString,
        desc: &'static str,
    ) -> FlagValue<String> {
        let default = default.to_string();
        let shown = default.clone();
        self.add_flag(name, false, default, shown, desc, |s| Ok(s.to_string()))
    }

    pub fn i64_var(
        &mut self,
        name: &'static str,
        default: i64,
        desc: &'static str,
    ) -> FlagValue<i64> {
        self.add_flag(name, false, default, default.to_string(), desc, |s| {
            Ok(s.parse()?)
        })
    }

    pub fn duration_var(
        &mut self,
        name: &'static str,
        default: Duration,
        desc: &'static str,
    ) -> FlagValue<Duration> {
        let shown = humantime::format_duration(default).to_string();
        self.add_flag(name, false, default, shown, desc, |s| {
            Ok(humantime::parse_duration(s)?)
        })
    }

    pub fn var<T: Clone + 'static>(
        &mut self,
        name: &'static str,
        default: T,
        shown_default: impl ToString,
        desc: &'static str,
        converter: impl Fn(&str) -> Result<T> + 'static,
    ) -> FlagValue<T> {
        self.add_flag(name, false, default, shown_default.to_string(), desc, converter)
    }

    fn add_flag<T: Clone + 'static>(
        &mut self,
        name: &'static str,
        is_boolean: bool,
        default: T,
        shown_default: String,
        desc: &'static str,
        parser: impl Fn(&str) -> Result<T> + 'static,
    ) -> FlagValue<T> {
        let target = Rc::new(RefCell::new(default));
        let target_for_parser = target.clone();
        let previous = self.flags.insert(
            name,
            GoFlag {
                desc,
                default: shown_default,
                is_boolean,
                setter: Box::new(move |s| {
                    target_for_parser.replace(parser(s)?);
                    Ok(())
                }),
            },
        );
        if previous.is_none() {
            self.order.push(name);
        }
        FlagValue::new(target)
    }
}
