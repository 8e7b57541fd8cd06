//! Command template expansion.
//!
//! An argument that is exactly `{name}` where `name` is a list variable expands into one
//! argument per list element (zero elements drop the argument). Everywhere else `{name}` is
//! replaced by the scalar value (a list joins with spaces). Unknown placeholders are left
//! verbatim so shell snippets and format strings pass through untouched.

use std::collections::BTreeMap;

#[derive(Clone, Debug, Default)]
pub struct TemplateVars {
    scalars: BTreeMap<String, String>,
    lists: BTreeMap<String, Vec<String>>,
}

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scalar(mut self, name: &str, value: impl Into<String>) -> Self {
        self.scalars.insert(name.to_string(), value.into());
        self
    }

    pub fn list(mut self, name: &str, values: Vec<String>) -> Self {
        self.lists.insert(name.to_string(), values);
        self
    }

    fn lookup(&self, name: &str) -> Option<String> {
        if let Some(v) = self.scalars.get(name) {
            return Some(v.clone());
        }
        self.lists.get(name).map(|v| v.join(" "))
    }
}

pub fn expand_args(template: &[String], vars: &TemplateVars) -> Vec<String> {
    let mut out = Vec::with_capacity(template.len());
    for arg in template {
        if let Some(name) = whole_placeholder(arg)
            && let Some(values) = vars.lists.get(name)
        {
            out.extend(values.iter().cloned());
            continue;
        }
        out.push(expand_str(arg, vars));
    }
    out
}

pub fn expand_str(input: &str, vars: &TemplateVars) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match vars.lookup(name) {
                    Some(value) if is_name(name) => out.push_str(&value),
                    _ => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn whole_placeholder(arg: &str) -> Option<&str> {
    let name = arg.strip_prefix('{')?.strip_suffix('}')?;
    is_name(name).then_some(name)
}

fn is_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
