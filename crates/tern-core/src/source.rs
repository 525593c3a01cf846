use crate::error::Error;
use std::path::Path;

/// Source text plus the name diagnostics report it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub text: String,
}

impl Source {
    /// Name used for inline snippets.
    pub const EVAL_NAME: &'static str = "<eval>";

    /// Take `eval` verbatim, or read `file` relative to `cwd`.
    pub fn load(cwd: &Path, file: Option<&Path>, eval: Option<&str>) -> Result<Self, Error> {
        if let Some(text) = eval {
            return Ok(Self {
                name: Self::EVAL_NAME.to_string(),
                text: text.to_string(),
            });
        }

        let file = file.ok_or(Error::NoInput)?;
        let path = cwd.join(file);
        let text = std::fs::read_to_string(&path).map_err(move |source| Error::SourceRead { path, source })?;

        Ok(Self {
            name: file.display().to_string(),
            text,
        })
    }
}
