//! Read-parse-search-print loop over arbitrary line input.

use std::io::{BufRead, Write};

use tracing::{info, warn};

use crate::RagStore;
use crate::errors::RagError;
use crate::query_parser::parse_line;
use crate::record::{FilterMode, RagQuery};
use crate::render::interactive_block;

const RULE_WIDTH: usize = 60;

/// Counters reported when a session ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Queries that produced a result listing (possibly empty).
    pub searches: usize,
    /// Lines rejected as user input errors.
    pub reprompts: usize,
    /// Queries that failed on the embedder or the store.
    pub failures: usize,
}

/// Interactive search session bound to one [`RagStore`].
pub struct InteractiveSession<'s> {
    rag: &'s RagStore,
    top_k: u64,
    mode: FilterMode,
}

impl<'s> InteractiveSession<'s> {
    /// Uses the store's configured `top_k` and filter mode.
    pub fn new(rag: &'s RagStore) -> Self {
        let cfg = rag.config();
        Self {
            rag,
            top_k: cfg.top_k,
            mode: cfg.filter_mode,
        }
    }

    pub fn top_k(mut self, top_k: u64) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn mode(mut self, mode: FilterMode) -> Self {
        self.mode = mode;
        self
    }

    /// Runs until a blank line or end of input.
    ///
    /// Search failures are printed and the loop goes on with the next line.
    ///
    /// # Errors
    /// Only I/O errors on `input` or `output` end the session early.
    pub async fn run<R: BufRead, W: Write>(
        &self,
        mut input: R,
        mut output: W,
    ) -> Result<SessionStats, RagError> {
        let mut stats = SessionStats::default();
        write_banner(&mut output)?;

        loop {
            write!(output, "Your query: ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                break;
            }

            let parsed = match parse_line(&line) {
                Ok(Some(p)) => p,
                Ok(None) => break,
                Err(e) if e.is_user_input() => {
                    stats.reprompts += 1;
                    writeln!(output, "Please enter a query.\n")?;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let query = RagQuery::new(&parsed.query_text, self.top_k)
                .with_filter(parsed.filter())
                .mode(self.mode);

            match self.rag.search(query).await {
                Ok(results) => {
                    stats.searches += 1;
                    write!(output, "{}", interactive_block(&parsed, &results))?;
                }
                Err(e) if e.is_user_input() => {
                    stats.reprompts += 1;
                    writeln!(output, "{e}. Please enter a query.\n")?;
                }
                Err(e) => {
                    stats.failures += 1;
                    warn!("search failed: {e}");
                    writeln!(output, "Search failed: {e}\n")?;
                }
            }
        }

        writeln!(output, "Goodbye!")?;
        output.flush()?;
        info!(
            searches = stats.searches,
            reprompts = stats.reprompts,
            failures = stats.failures,
            "interactive session ended"
        );
        Ok(stats)
    }
}

fn write_banner<W: Write>(out: &mut W) -> std::io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "\n{rule}")?;
    writeln!(out, "Semantic Document Search")?;
    writeln!(out, "{rule}")?;
    writeln!(out, "Type your query below. Leave blank to exit.")?;
    writeln!(
        out,
        "Add '|category:database' or '|category:ai' at the end to filter results.\n"
    )
}
