//! sql-migrate-parse: annotation-aware splitter for SQL migration scripts
//!
//! This library turns an annotated migration script into ordered statement
//! blocks for its Up and Down directions, with the transaction policy and
//! loop/conditional structure an executor needs. It does not talk to a
//! database: running the statements and tracking which migrations were
//! applied is left to the caller.
//!
//! ```
//! use sql_migrate_parse::parse_migration;
//!
//! let doc = parse_migration(
//!     "-- +migrate Up\nCREATE TABLE t (id int);\n-- +migrate Down\nDROP TABLE t;\n",
//! )
//! .unwrap();
//! assert_eq!(doc.up_statements[0].text, "CREATE TABLE t (id int);\n");
//! assert_eq!(doc.down_statements[0].text, "DROP TABLE t;\n");
//! ```

pub mod config;
pub mod input;
pub mod output;
pub mod parser;

// Re-export commonly used types
pub use config::Config;
pub use input::{MigrationFile, MigrationLoader, MigrationSet};
pub use parser::{
    Direction, MigrationDocument, MigrationParser, ParseError, StatementBlock, parse_migration,
};
