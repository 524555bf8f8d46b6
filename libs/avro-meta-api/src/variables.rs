use std::collections::HashMap;

/// Variable substitution port.
///
/// The step metadata stores paths verbatim; hosts resolve them through this
/// trait right before the paths are used.
pub trait VariableSpace {
    fn environment_substitute(&self, text: &str) -> String;
}

/// Map-backed `VariableSpace`.
///
/// Substitutes `${NAME}` and `%%NAME%%`. Unknown variables and unterminated
/// references are left as written.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    values: HashMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Build from the current process environment.
    pub fn from_env() -> Self {
        Self { values: std::env::vars().collect() }
    }
}

impl VariableSpace for Variables {
    fn environment_substitute(&self, text: &str) -> String {
        let braced = substitute(text, "${", "}", &self.values);
        substitute(&braced, "%%", "%%", &self.values)
    }
}

fn substitute(text: &str, open: &str, close: &str, values: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(open) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + open.len()..];
        let Some(end) = after_open.find(close) else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after_open[..end];
        match values.get(name) {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[start..start + open.len() + end + close.len()]),
        }
        rest = &after_open[end + close.len()..];
    }
    out.push_str(rest);
    out
}
