//! Integration tests for loading and parsing fixture migration directories.

use sql_migrate_parse::input::sql::SqlLoader;
use sql_migrate_parse::input::{LoadError, MigrationLoader};
use sql_migrate_parse::{Direction, MigrationParser, ParseError};
use std::path::PathBuf;

fn fixture_dir(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn test_loads_migrations_in_filename_order() {
    let set = SqlLoader::default()
        .load(&[fixture_dir("migrations")])
        .expect("Failed to load fixture");

    let ids: Vec<&str> = set.files.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "1_create_users.sql",
            "2_touch_trigger.sql",
            "3_backfill_domain.sql",
            "4_nothing_to_undo.sql",
        ],
        "README.md should be skipped and scripts sorted by name"
    );
}

#[test]
fn test_create_users_statements() {
    let set = SqlLoader::default()
        .load(&[fixture_dir("migrations")])
        .expect("Failed to load fixture");
    let doc = &set.files[0].document;

    assert_eq!(doc.up_statements.len(), 2);
    assert_eq!(doc.down_statements.len(), 1);
    assert_eq!(
        doc.up_statements[0].text,
        "CREATE TABLE users (\n    id bigserial PRIMARY KEY,\n    email text NOT NULL\n);\n"
    );
    assert_eq!(doc.up_statements[0].line, 3);
    assert_eq!(doc.up_statements[1].line, 7);
    assert!(doc.down_statements[0].text.contains("DROP TABLE users;"));
    assert_eq!(doc.down_statements[0].line, 10);
    assert!(!doc.disable_transaction_up);
    assert!(!doc.disable_transaction_down);
}

#[test]
fn test_statement_block_keeps_function_body_together() {
    let set = SqlLoader::default()
        .load(&[fixture_dir("migrations")])
        .expect("Failed to load fixture");
    let doc = &set.files[1].document;

    assert_eq!(doc.up_statements.len(), 3);
    assert_eq!(doc.down_statements.len(), 3);

    let function = &doc.up_statements[1];
    assert!(!function.is_loop);
    assert_eq!(function.line, 5);
    assert!(function.text.contains("CREATE FUNCTION touch_updated_at()"));
    assert!(function.text.contains("$$ LANGUAGE plpgsql;"));
    assert_eq!(function.text.matches(';').count(), 4);

    assert!(doc.up_statements[2].text.contains("CREATE TRIGGER users_touch"));
    assert_eq!(doc.up_statements[2].line, 13);
}

#[test]
fn test_loop_forces_non_transactional_up() {
    let set = SqlLoader::default()
        .load(&[fixture_dir("migrations")])
        .expect("Failed to load fixture");
    let doc = &set.files[2].document;

    assert_eq!(doc.up_statements.len(), 2);
    assert!(!doc.up_statements[0].is_loop);

    let backfill = &doc.up_statements[1];
    assert!(backfill.is_loop);
    assert_eq!(backfill.line, 5);
    assert!(backfill.text.contains("UPDATE users SET domain"));
    assert!(!backfill.text.contains("-- +migrate"));
    assert_eq!(
        backfill.conditional,
        "SELECT count(*) FROM users WHERE domain IS NULL;\n"
    );

    assert!(doc.disable_transaction(Direction::Up));
    assert!(doc.disable_transaction(Direction::Down));
    assert_eq!(doc.statements(Direction::Down).len(), 1);
}

#[test]
fn test_comment_only_down_section() {
    let set = SqlLoader::default()
        .load(&[fixture_dir("migrations")])
        .expect("Failed to load fixture");
    let doc = &set.files[3].document;

    assert_eq!(doc.up_statements.len(), 1);
    assert!(doc.down_statements.is_empty());
}

#[test]
fn test_separator_fixture_needs_separator() {
    let path = fixture_dir("separator");

    let err = SqlLoader::default()
        .load(&[path.clone()])
        .expect_err("GO lines are plain text without a separator");
    match err {
        LoadError::Parse { source, .. } => {
            assert!(
                matches!(source, ParseError::UnterminatedStatement { line: 11, .. }),
                "Expected UnterminatedStatement at line 11, got: {:?}",
                source
            );
        }
        other => panic!("Expected LoadError::Parse, got: {:?}", other),
    }

    let parser = MigrationParser::new()
        .with_line_separator("GO")
        .expect("valid separator");
    let loader = SqlLoader::new(parser);
    let set = loader.load(&[path]).expect("Failed to load with GO separator");
    let doc = &set.files[0].document;

    assert_eq!(doc.up_statements.len(), 2);
    assert_eq!(
        doc.up_statements[0].text,
        "CREATE TABLE audit (id int, note varchar(100))\n"
    );
    // Inside a statement block the separator is ordinary text.
    assert!(doc.up_statements[1].text.ends_with("SELECT @@ROWCOUNT;\nGO\n"));
    assert_eq!(doc.down_statements.len(), 2);
    assert_eq!(doc.down_statements[1].text, "DROP TABLE audit\n");
}

#[test]
fn test_strict_load_stops_at_first_broken_script() {
    let err = SqlLoader::default()
        .load(&[fixture_dir("broken")])
        .expect_err("broken fixture must fail");

    assert!(err.path().ends_with("2_unterminated.sql"));
    match err {
        LoadError::Parse { source, .. } => {
            assert!(matches!(
                source,
                ParseError::UnterminatedStatement {
                    line: 2,
                    separator: None
                }
            ));
        }
        other => panic!("Expected LoadError::Parse, got: {:?}", other),
    }
}

#[test]
fn test_load_each_reports_every_script() {
    let outcomes = SqlLoader::default()
        .load_each(&[fixture_dir("broken")])
        .expect("collect broken fixture");

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].1.is_ok());

    match &outcomes[2].1 {
        Err(LoadError::Parse { source, .. }) => {
            assert!(matches!(
                source,
                ParseError::ConditionalOutsideLoop { line: 2 }
            ));
        }
        other => panic!("Expected ConditionalOutsideLoop, got: {:?}", other),
    }

    let failed = outcomes.iter().filter(|(_, o)| o.is_err()).count();
    assert_eq!(failed, 2);
}

#[test]
fn test_explicit_file_path_is_loaded() {
    let file = fixture_dir("migrations").join("4_nothing_to_undo.sql");
    let set = SqlLoader::default()
        .load(&[file.clone()])
        .expect("load single file");

    assert_eq!(set.files.len(), 1);
    assert_eq!(set.files[0].source_file, file);
}

#[test]
fn test_missing_directory_is_an_io_error() {
    let err = SqlLoader::default()
        .load(&[fixture_dir("does-not-exist")])
        .expect_err("missing path must fail");
    assert!(matches!(err, LoadError::Io { .. }));
}
