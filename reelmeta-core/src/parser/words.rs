use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// User-supplied title rewrites applied before parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordRules {
    /// Patterns deleted from titles.
    pub ignored: Vec<String>,
    /// Pattern replacements, applied before deletions.
    pub replaced: Vec<Replacement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

impl WordRules {
    pub fn compile(&self) -> Result<CompiledWordRules> {
        let replaced = self
            .replaced
            .iter()
            .map(|r| Ok((Regex::new(&r.from)?, r.to.clone())))
            .collect::<Result<Vec<_>>>()?;
        let ignored = self
            .ignored
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(CompiledWordRules { replaced, ignored })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompiledWordRules {
    replaced: Vec<(Regex, String)>,
    ignored: Vec<Regex>,
}

impl CompiledWordRules {
    pub fn is_empty(&self) -> bool {
        self.replaced.is_empty() && self.ignored.is_empty()
    }

    pub fn apply(&self, title: &str) -> String {
        let mut out = title.to_string();
        for (pattern, to) in &self.replaced {
            out = pattern.replace_all(&out, to.as_str()).into_owned();
        }
        for pattern in &self.ignored {
            out = pattern.replace_all(&out, "").into_owned();
        }
        out.trim().to_string()
    }
}
