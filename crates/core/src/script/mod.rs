//! SQL script splitting
//!
//! Migration scripts are replayed one statement at a time. This module turns
//! raw script text into an ordered list of [`Statement`]s, keeping
//! dollar-quoted procedural bodies (`DO $$ ... $$;`) intact and setting aside
//! client-only meta-commands such as `\copy`.
//!
//! ```rust
//! use schema_replay_core::script::{StatementKind, split};
//!
//! let script = split("CREATE TABLE demo (id bigint);\nDO $$\nBEGIN\n  PERFORM 1;\nEND\n$$;");
//! assert_eq!(script.statements.len(), 2);
//! assert_eq!(script.statements[1].kind, StatementKind::ProceduralBlock);
//! ```

mod quote;
mod splitter;
mod statement;

pub use quote::{quote_ident, quote_qualified};
pub use splitter::split;
pub use statement::{MetaCommand, SplitScript, Statement, StatementKind};
