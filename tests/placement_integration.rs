// Import placement against real files
use std::path::PathBuf;
use tempfile::TempDir;
use importpick::editing::{add_import, symbol_at_path, InsertOutcome, TargetSpec};

const HEADER_FILE: &str = "/*\n * Copyright\n */\nimport { Foo } from '@lib/foo';\n\nexport const x = Foo();\n";

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_insert_lands_before_existing_import() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(&temp_dir, "a.ts", HEADER_FILE);

    let outcome = add_import(&path, "import { Baz } from '@lib/baz';", false).unwrap();
    assert_eq!(outcome, InsertOutcome::Inserted { index: 3 });

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "/*\n * Copyright\n */\nimport { Baz } from '@lib/baz';\nimport { Foo } from '@lib/foo';\n\nexport const x = Foo();\n"
    );
}

#[test]
fn test_duplicate_is_rejected_without_write() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(&temp_dir, "a.ts", HEADER_FILE);

    let outcome = add_import(&path, "   import { Foo } from '@lib/foo';", false).unwrap();
    assert_eq!(outcome, InsertOutcome::AlreadyPresent);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), HEADER_FILE);
}

#[test]
fn test_second_insert_is_noop() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(&temp_dir, "a.ts", HEADER_FILE);
    let line = "import { Baz } from '@lib/baz';";

    add_import(&path, line, false).unwrap();
    let after_first = std::fs::read_to_string(&path).unwrap();

    assert_eq!(add_import(&path, line, false).unwrap(), InsertOutcome::AlreadyPresent);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), after_first);
}

#[test]
fn test_dry_run_leaves_file_alone() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(&temp_dir, "a.ts", HEADER_FILE);

    let outcome = add_import(&path, "import { Baz } from '@lib/baz';", true).unwrap();
    assert_eq!(outcome, InsertOutcome::Inserted { index: 3 });
    assert_eq!(std::fs::read_to_string(&path).unwrap(), HEADER_FILE);
}

#[test]
fn test_crlf_file_keeps_line_endings() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(&temp_dir, "a.ts", "'use client';\r\nconst a = 1;\r\n");

    add_import(&path, "import b from 'b';", false).unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "'use client';\r\nimport b from 'b';\r\nconst a = 1;\r\n"
    );
}

#[test]
fn test_mixed_line_endings_preserved() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(
        &temp_dir,
        "a.ts",
        "import a from 'a';\r\nconst b = 1;\nconst c = 2;\n",
    );

    let outcome = add_import(&path, "import z from 'z';", false).unwrap();
    assert_eq!(outcome, InsertOutcome::Inserted { index: 0 });
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "import z from 'z';\nimport a from 'a';\r\nconst b = 1;\nconst c = 2;\n"
    );
}

#[test]
fn test_bom_file_places_after_header() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(&temp_dir, "a.ts", "\u{feff}// header\nimport a from 'a';\n");

    let outcome = add_import(&path, "import z from 'z';", false).unwrap();
    assert_eq!(outcome, InsertOutcome::Inserted { index: 1 });
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "\u{feff}// header\nimport z from 'z';\nimport a from 'a';\n"
    );
}

#[test]
fn test_missing_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    assert!(add_import(&temp_dir.path().join("none.ts"), "import a from 'a';", false).is_err());
}

#[test]
fn test_symbol_from_target_spec() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(&temp_dir, "b.ts", "\nconst x = getUser(id);\n");

    let target = TargetSpec::parse(&format!("{}:2:11", path.display())).unwrap();
    let pos = target.position.unwrap();
    assert_eq!(
        symbol_at_path(&target.path, pos.row, pos.col).unwrap(),
        Some("getUser".to_string())
    );
    assert_eq!(symbol_at_path(&target.path, 2, 6).unwrap(), None);
    assert_eq!(symbol_at_path(&target.path, 9, 1).unwrap(), None);
}
