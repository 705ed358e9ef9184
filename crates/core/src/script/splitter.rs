//! Line-based splitter turning a raw script into executable statements

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::statement::{MetaCommand, SplitScript, Statement, StatementKind};

const BYTE_ORDER_MARK: char = '\u{feff}';
const LINE_COMMENT: &str = "--";
const META_COMMAND_PREFIX: char = '\\';
const TERMINATOR: char = ';';

/// `DO $$` or `... AS $tag$`: the start of a dollar-quoted body
static BLOCK_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^DO|\bAS)\s*(\$(?:[A-Za-z_][A-Za-z0-9_]*)?\$)").unwrap()
});

/// Trailing `LANGUAGE plpgsql` after a closing delimiter
static LANGUAGE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*\bLANGUAGE\s+[A-Za-z_][A-Za-z0-9_]*\s*$").unwrap());

/// Parser state of the splitter
#[derive(Debug, Clone, PartialEq, Eq)]
enum ParserState {
    Normal,
    /// Inside a dollar-quoted body; only `delimiter` can end it
    InProceduralBlock { delimiter: String },
}

#[derive(Debug)]
struct Splitter {
    state: ParserState,
    buffer: Vec<String>,
    buffer_start: usize,
    output: SplitScript,
}

/// Split a raw script into statements
///
/// Statements end at a line ending in `;`. A dollar-quoted body opened by
/// `DO $$` (or `AS $$` in a function definition) is kept whole, whatever it
/// contains, until the line carrying the matching closing delimiter.
/// Whole-line `--` comments and blank lines between statements are dropped.
/// Backslash meta-commands are removed and reported in
/// [`SplitScript::manual_commands`].
pub fn split(raw: &str) -> SplitScript {
    let text = raw.strip_prefix(BYTE_ORDER_MARK).unwrap_or(raw);

    let mut splitter = Splitter::new();
    for (index, line) in text.lines().enumerate() {
        splitter.feed(index + 1, line);
    }
    splitter.finish()
}

impl Splitter {
    fn new() -> Self {
        Self {
            state: ParserState::Normal,
            buffer: Vec::new(),
            buffer_start: 0,
            output: SplitScript::default(),
        }
    }

    fn feed(&mut self, line_no: usize, line: &str) {
        let closing = match &self.state {
            ParserState::InProceduralBlock { delimiter } => Some(closes_block(line, delimiter)),
            ParserState::Normal => None,
        };

        match closing {
            Some(closes) => {
                self.append(line_no, line.trim_end());
                if closes {
                    self.flush(StatementKind::ProceduralBlock);
                    self.state = ParserState::Normal;
                }
            }
            None => self.feed_normal(line_no, line),
        }
    }

    fn feed_normal(&mut self, line_no: usize, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(LINE_COMMENT) {
            return;
        }

        if trimmed.starts_with(META_COMMAND_PREFIX) {
            warn!(
                line = line_no,
                command = %trimmed,
                "Meta-command requires manual execution, skipping"
            );
            self.output.manual_commands.push(MetaCommand {
                line: line_no,
                text: trimmed.to_string(),
            });
            return;
        }

        if let Some(caps) = BLOCK_OPEN.captures(trimmed) {
            let delimiter = caps[1].to_string();
            let body_start = caps.get(0).map(|m| m.end()).unwrap_or(trimmed.len());
            self.append(line_no, line.trim_end());

            if closes_block(&trimmed[body_start..], &delimiter) {
                self.flush(StatementKind::ProceduralBlock);
            } else {
                debug!(line = line_no, delimiter = %delimiter, "Entering procedural block");
                self.state = ParserState::InProceduralBlock { delimiter };
            }
            return;
        }

        let line = line.trim_end();
        match line.strip_suffix(TERMINATOR) {
            Some(body) => {
                self.append(line_no, body);
                self.flush(StatementKind::Plain);
            }
            None => self.append(line_no, line),
        }
    }

    fn append(&mut self, line_no: usize, line: &str) {
        if self.buffer.is_empty() {
            self.buffer_start = line_no;
        }
        self.buffer.push(line.to_string());
    }

    fn flush(&mut self, kind: StatementKind) {
        let text = self.buffer.join("\n");
        self.buffer.clear();

        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.output
            .statements
            .push(Statement::new(text, kind, self.buffer_start));
    }

    fn finish(mut self) -> SplitScript {
        if !self.buffer.is_empty() {
            let kind = match self.state {
                ParserState::InProceduralBlock { .. } => {
                    warn!(
                        line = self.buffer_start,
                        "Procedural block is never closed, emitting it as-is"
                    );
                    StatementKind::ProceduralBlock
                }
                ParserState::Normal => {
                    debug!(
                        line = self.buffer_start,
                        "Script ends without a terminator, flushing final statement"
                    );
                    StatementKind::Plain
                }
            };
            self.flush(kind);
        }
        self.output
    }
}

/// Whether `line` ends a block delimited by `delimiter`
///
/// Accepts `$$`, `$$;`, `END $$;` and `$$ LANGUAGE plpgsql;`.
fn closes_block(line: &str, delimiter: &str) -> bool {
    let trimmed = line.trim();
    let trimmed = trimmed
        .strip_suffix(TERMINATOR)
        .map(str::trim_end)
        .unwrap_or(trimmed);
    let trimmed = LANGUAGE_SUFFIX.replace(trimmed, "");
    trimmed.ends_with(delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(script: &SplitScript) -> Vec<&str> {
        script.statements.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_block_between_plain_statements() {
        let script = split("A;\nDO $$\nX;\nY;\n$$;\nB;");
        assert_eq!(script.len(), 3);
        assert_eq!(script.statements[0].text, "A");
        assert_eq!(script.statements[0].kind, StatementKind::Plain);

        let block = &script.statements[1];
        assert_eq!(block.kind, StatementKind::ProceduralBlock);
        assert!(block.text.contains("X;"));
        assert!(block.text.contains("Y;"));
        assert_eq!(block.text, "DO $$\nX;\nY;\n$$;");
        assert_eq!(block.line, 2);

        assert_eq!(script.statements[2].text, "B");
        assert_eq!(script.statements[2].line, 6);
    }

    #[test]
    fn test_comment_only_script() {
        let script = split("-- header\n   -- indented\n\n--;\n");
        assert!(script.is_empty());
        assert!(script.manual_commands.is_empty());
    }

    #[test]
    fn test_empty_script() {
        assert!(split("").is_empty());
        assert!(split("\u{feff}").is_empty());
    }

    #[test]
    fn test_byte_order_mark_stripped() {
        let script = split("\u{feff}CREATE TABLE demo (id bigint);");
        assert_eq!(texts(&script), vec!["CREATE TABLE demo (id bigint)"]);
    }

    #[test]
    fn test_multi_line_statement() {
        let script = split("CREATE TABLE demo (\n    primaryid bigint,\n    sex varchar(10)\n);\n");
        assert_eq!(
            texts(&script),
            vec!["CREATE TABLE demo (\n    primaryid bigint,\n    sex varchar(10)\n)"]
        );
        assert_eq!(script.statements[0].line, 1);
    }

    #[test]
    fn test_comments_between_statements_dropped() {
        let script = split("-- create\nCREATE TABLE a (x int);\n\n-- fill\nINSERT INTO a VALUES (1);");
        assert_eq!(
            texts(&script),
            vec!["CREATE TABLE a (x int)", "INSERT INTO a VALUES (1)"]
        );
    }

    #[test]
    fn test_block_body_is_verbatim() {
        let raw = "DO $$\nBEGIN\n  -- keep me\n\n  PERFORM 1;\nEND\n$$;";
        let script = split(raw);
        assert_eq!(script.len(), 1);
        assert_eq!(script.statements[0].text, raw);
    }

    #[test]
    fn test_meta_commands_reported() {
        let script = split(
            "CREATE TABLE demo (id bigint);\n\\copy demo FROM 'demo.txt' WITH DELIMITER '$'\nSELECT 1;",
        );
        assert_eq!(texts(&script), vec!["CREATE TABLE demo (id bigint)", "SELECT 1"]);
        assert_eq!(script.manual_commands.len(), 1);
        assert_eq!(script.manual_commands[0].line, 2);
        assert!(script.manual_commands[0].text.starts_with("\\copy"));
        assert!(script.requires_manual_steps());
    }

    #[test]
    fn test_missing_final_terminator_flushed() {
        let script = split("SELECT 1;\nSELECT 2");
        assert_eq!(texts(&script), vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn test_unclosed_block_flushed_as_block() {
        let script = split("DO $$\nBEGIN\n  PERFORM 1;\nEND;");
        assert_eq!(script.len(), 1);
        assert_eq!(script.statements[0].kind, StatementKind::ProceduralBlock);
    }

    #[test]
    fn test_lower_case_and_tagged_delimiters() {
        let script = split("do $body$\nBEGIN\n  RAISE NOTICE '$$';\nEND\n$body$;\nSELECT 1;");
        assert_eq!(script.len(), 2);
        assert_eq!(script.statements[0].kind, StatementKind::ProceduralBlock);
        assert!(script.statements[0].text.ends_with("$body$;"));
        assert_eq!(script.statements[1].text, "SELECT 1");
    }

    #[test]
    fn test_end_and_delimiter_on_one_line() {
        let script = split("DO $$\nBEGIN\n  PERFORM 1;\nEND $$;\nSELECT 2;");
        assert_eq!(script.len(), 2);
        assert_eq!(script.statements[1].text, "SELECT 2");
    }

    #[test]
    fn test_single_line_block() {
        let script = split("DO $$ BEGIN PERFORM 1; END $$;\nSELECT 2;");
        assert_eq!(
            texts(&script),
            vec!["DO $$ BEGIN PERFORM 1; END $$;", "SELECT 2"]
        );
        assert_eq!(script.statements[0].kind, StatementKind::ProceduralBlock);
    }

    #[test]
    fn test_function_body_kept_whole() {
        let raw = "CREATE OR REPLACE FUNCTION touch() RETURNS trigger AS $$\nBEGIN\n  NEW.updated := now();\n  RETURN NEW;\nEND;\n$$ LANGUAGE plpgsql;\nSELECT 1;";
        let script = split(raw);
        assert_eq!(script.len(), 2);
        assert_eq!(script.statements[0].kind, StatementKind::ProceduralBlock);
        assert!(script.statements[0].text.ends_with("$$ LANGUAGE plpgsql;"));
        assert_eq!(script.statements[1].text, "SELECT 1");
    }

    #[test]
    fn test_windows_line_endings() {
        let script = split("SELECT 1;\r\nSELECT 2;\r\n");
        assert_eq!(texts(&script), vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn test_lone_terminators_discarded() {
        let script = split(";\n;\nSELECT 1;");
        assert_eq!(texts(&script), vec!["SELECT 1"]);
    }
}
