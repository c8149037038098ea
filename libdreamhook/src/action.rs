use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

const SHELL: &str = "sh";

/// An external command run after a certificate changed on disk.
///
/// In the deployment config an action is either a plain string, run
/// through `sh -c`, or a map with an explicit `program` and `args`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    program: String,
    args: Vec<String>,
}

impl Action {
    pub fn new<S: AsRef<str>>(program: S, args: &[&str]) -> Self {
        Self {
            program: program.as_ref().to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn shell<S: AsRef<str>>(command: S) -> Self {
        Self::new(SHELL, &["-c", command.as_ref()])
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.program == SHELL && self.args.len() == 2 && self.args[0] == "-c" {
            return write!(f, "{}", self.args[1]);
        }
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct ActionSpec {
    program: String,
    #[serde(default)]
    args: Vec<String>,
}

struct ActionVisitor;

impl<'de> Visitor<'de> for ActionVisitor {
    type Value = Action;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a shell command or a map with program and args")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        if v.trim().is_empty() {
            return Err(E::custom("empty action"));
        }
        Ok(Action::shell(v))
    }

    fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let spec = ActionSpec::deserialize(de::value::MapAccessDeserializer::new(map))?;
        if spec.program.trim().is_empty() {
            return Err(de::Error::custom("empty program"));
        }
        Ok(Action {
            program: spec.program,
            args: spec.args,
        })
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D>(deserializer: D) -> Result<Action, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ActionVisitor)
    }
}
