//! Line-oriented reference programs.
//!
//! ```text
//! # greeting
//! 2abz0.2.4.5.12.[8,5] 2abz0.2.4.5.12.[12,12,15]   # "he" "llo"
//! ```
//!
//! Each non-empty line (after stripping `#` comments) is a list of
//! whitespace-separated ranged references to leaf pages. The line's output
//! is the concatenation of the extracted texts, followed by a newline.

use std::sync::Arc;

use thiserror::Error;

use crate::cache::PressureCache;
use crate::content::LeafContent;
use crate::error::LocateError;
use crate::locator::{self, Locator};

/// Soft capacity of the page cache.
pub const PAGE_CACHE_PRESSURE: usize = 1000;

#[derive(Debug, Error)]
pub enum InterpretError {
    #[error("line {line}: `{instruction}` does not select text from a page")]
    NotText { line: usize, instruction: String },

    #[error("line {line}: {source}")]
    Locate {
        line: usize,
        #[source]
        source: LocateError,
    },
}

impl InterpretError {
    pub const fn line(&self) -> usize {
        match self {
            Self::NotText { line, .. } | Self::Locate { line, .. } => *line,
        }
    }
}

/// Runs programs against one locator. Page contents are memoized by their
/// identifier path.
pub struct Interpreter {
    locator: Locator,
    pages: PressureCache<String, Arc<LeafContent>>,
}

impl Interpreter {
    pub fn new(locator: Locator) -> Self {
        Self::with_cache(locator, PressureCache::new(PAGE_CACHE_PRESSURE))
    }

    pub fn with_cache(locator: Locator, pages: PressureCache<String, Arc<LeafContent>>) -> Self {
        Self { locator, pages }
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn pages(&self) -> &PressureCache<String, Arc<LeafContent>> {
        &self.pages
    }

    /// Run `program` and return its output.
    pub fn run(&self, program: &str) -> Result<String, InterpretError> {
        let mut output = String::new();
        for (index, line) in program.lines().enumerate() {
            let code = line.split('#').next().unwrap_or_default().trim();
            if code.is_empty() {
                continue;
            }
            for instruction in code.split_whitespace() {
                output.push_str(&self.instruction(index + 1, instruction)?);
            }
            output.push('\n');
        }
        Ok(output)
    }

    fn instruction(&self, line: usize, instruction: &str) -> Result<String, InterpretError> {
        let locate = |source| InterpretError::Locate { line, source };

        let parsed = self.locator.parse(instruction).map_err(locate)?;
        let Some(ranges) = parsed.ranges else {
            return Err(InterpretError::NotText {
                line,
                instruction: instruction.to_string(),
            });
        };

        let key = parsed.identifiers.join(".");
        let page = self.page(&key, parsed.identifiers).map_err(locate)?;
        locator::select(&key, &page.text, &ranges).map_err(locate)
    }

    /// Leaf content, from the cache when possible. Every use adds pressure.
    fn page(&self, key: &str, identifiers: Vec<String>) -> Result<Arc<LeafContent>, LocateError> {
        let page = match self.pages.get(&key.to_string()) {
            Some(page) => page,
            None => {
                let address = self.locator.address(identifiers)?;
                self.locator.content(&address)?
            }
        };
        self.pages.set(key.to_string(), Arc::clone(&page));
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{MemoryProvider, fixture};
    use crate::hierarchy::Hierarchy;
    use std::sync::Arc;

    fn interpreter(provider: Arc<MemoryProvider>) -> Interpreter {
        Interpreter::new(Locator::new(Hierarchy::babel(), provider).unwrap())
    }

    #[test]
    fn test_run_program() {
        let program = "\
# header comment

2abz0.2.4.5.12[1-3] 2abz0.2.4.5.12.[4]
   2abz0.2.4.5.12.7   # trailing comment
";
        let output = interpreter(fixture::provider()).run(program).unwrap();
        assert_eq!(output, "abcd\ng\n");
    }

    #[test]
    fn test_empty_program() {
        let interpreter = interpreter(fixture::provider());
        assert_eq!(interpreter.run("").unwrap(), "");
        assert_eq!(interpreter.run("# nothing\n\n   \n").unwrap(), "");
    }

    #[test]
    fn test_pages_are_memoized() {
        let provider = fixture::provider();
        let interpreter = interpreter(Arc::clone(&provider));
        interpreter
            .run("2abz0.2.4.5.12[1] 2abz0.2.4.5.12[2]\n2abz0.2.4.5.12[3]")
            .unwrap();

        assert_eq!(interpreter.pages().len(), 1);
        assert_eq!(interpreter.pages().entry_pressure(&"2abz0.2.4.5.12".to_string()), Some(3));
        assert_eq!(provider.fetches(), 1);
    }

    #[test]
    fn test_instruction_without_range() {
        let err = interpreter(fixture::provider())
            .run("2abz0.2.4.5.12[1]\n2abz0.2.4.5.12")
            .unwrap_err();
        assert!(matches!(
            err,
            InterpretError::NotText { line: 2, ref instruction } if instruction == "2abz0.2.4.5.12"
        ));
    }

    #[test]
    fn test_locate_errors_carry_line() {
        let interpreter = interpreter(fixture::provider());

        let err = interpreter.run("# c\n2abz0.2.[1-3]").unwrap_err();
        assert_eq!(err.line(), 2);
        match err {
            InterpretError::Locate { source, .. } => {
                assert!(source.as_address_error().unwrap().is_invalid_hierarchy())
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = interpreter.run("nonsense!").unwrap_err();
        assert!(matches!(
            err,
            InterpretError::Locate { line: 1, ref source } if source.is_invalid_reference()
        ));
    }
}
