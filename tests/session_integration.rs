// End-to-end sessions with shell scripts standing in for ripgrep and fzf
use std::time::{Duration, Instant};
use tempfile::TempDir;
use importpick::error::ImportPickError;
use importpick::session::{CommandSpec, Session, SessionOptions, SessionOutcome, SessionState};

fn sh(script: &str) -> CommandSpec {
    CommandSpec::new("sh", ["-c", script])
}

fn options() -> SessionOptions {
    SessionOptions {
        batch_size: 20,
        grace_period: Duration::from_millis(300),
    }
}

#[tokio::test]
async fn test_selector_picks_best_ranked_line() {
    let temp_dir = TempDir::new().unwrap();
    let search = sh(r#"printf '%s\n' "import { Foo, Bar } from '@lib/foo'" "import { Foo } from '@lib/foo'" "import { Foo } from './local'""#);
    let selector = sh("head -n 1");

    let mut session = Session::new(search, selector, options());
    let outcome = session.run(temp_dir.path(), Some("Foo")).await.unwrap();

    assert_eq!(
        outcome,
        SessionOutcome::Selected("import { Foo } from '@lib/foo'".to_string())
    );
    assert_eq!(session.state(), SessionState::Terminated);
}

#[tokio::test]
async fn test_browse_mode_dedups_and_keeps_order() {
    let temp_dir = TempDir::new().unwrap();
    let search = sh(r#"printf '%s\n' "import b from 'b'" "import a from 'a'" "  import b from 'b'" "import c from '../c'""#);
    // echo back everything received
    let selector = sh("cat");

    let mut session = Session::new(search, selector, options());
    let outcome = session.run(temp_dir.path(), None).await.unwrap();

    assert_eq!(
        outcome,
        SessionOutcome::Selected("import b from 'b'\nimport a from 'a'".to_string())
    );
}

#[tokio::test]
async fn test_no_matches_closes_selector_input() {
    let temp_dir = TempDir::new().unwrap();
    let search = sh("exit 1");
    // exits 1 only if stdin closes without any candidate
    let selector = sh(r#"[ -z "$(cat)" ] && exit 1; exit 2"#);

    let mut session = Session::new(search, selector, options());
    let outcome = session.run(temp_dir.path(), Some("Foo")).await.unwrap();

    assert_eq!(outcome, SessionOutcome::NoMatches);
}

#[tokio::test]
async fn test_no_matches_with_clean_selector_exit() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = Session::new(sh("exit 1"), sh("cat"), options());
    let outcome = session.run(temp_dir.path(), None).await.unwrap();
    assert_eq!(outcome, SessionOutcome::NoMatches);
    assert_eq!(outcome.selection(), None);
}

#[tokio::test]
async fn test_search_failure_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = Session::new(sh("exit 2"), sh("cat"), options());
    let err = session.run(temp_dir.path(), None).await.unwrap_err();

    match err {
        ImportPickError::SubprocessExit { code, .. } => assert_eq!(code, Some(2)),
        other => panic!("expected SubprocessExit, got {:?}", other),
    }
    assert_eq!(session.state(), SessionState::Terminated);
}

#[tokio::test]
async fn test_user_cancel_tears_down_running_search() {
    let temp_dir = TempDir::new().unwrap();
    let search = sh(r#"i=0; while :; do i=$((i+1)); echo "import a$i from 'a$i'"; sleep 1; done"#);
    let selector = sh("exit 130");

    let started = Instant::now();
    let mut session = Session::new(search, selector, options());
    let outcome = session.run(temp_dir.path(), Some("a")).await.unwrap();

    assert_eq!(outcome, SessionOutcome::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(session.state(), SessionState::Terminated);
}

#[tokio::test]
async fn test_early_selection_with_endless_search() {
    let temp_dir = TempDir::new().unwrap();
    let search = sh(r#"i=0; while :; do i=$((i+1)); echo "import x$i from 'x$i'"; done"#);
    let selector = sh("head -n 1");

    let started = Instant::now();
    let mut session = Session::new(search, selector, options());
    let outcome = session.run(temp_dir.path(), None).await.unwrap();

    assert_eq!(
        outcome,
        SessionOutcome::Selected("import x1 from 'x1'".to_string())
    );
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_selector_failure_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let search = sh(r#"echo "import a from 'a'""#);
    let selector = sh("cat > /dev/null; exit 2");

    let mut session = Session::new(search, selector, options());
    let err = session.run(temp_dir.path(), None).await.unwrap_err();
    assert!(matches!(err, ImportPickError::SubprocessExit { code: Some(2), .. }));
}

#[tokio::test]
async fn test_missing_search_program() {
    let temp_dir = TempDir::new().unwrap();
    let search = CommandSpec::new("importpick-no-such-search", Vec::<String>::new());
    let mut session = Session::new(search, sh("cat"), options());

    let err = session.run(temp_dir.path(), None).await.unwrap_err();
    assert!(matches!(err, ImportPickError::SubprocessLaunch { .. }));
}

#[tokio::test]
async fn test_missing_selector_program_stops_search() {
    let temp_dir = TempDir::new().unwrap();
    let search = sh("sleep 30");
    let selector = CommandSpec::new("importpick-no-such-selector", Vec::<String>::new());

    let started = Instant::now();
    let mut session = Session::new(search, selector, options());
    let err = session.run(temp_dir.path(), None).await.unwrap_err();

    assert!(matches!(err, ImportPickError::SubprocessLaunch { .. }));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(session.state(), SessionState::Terminated);
}

#[tokio::test]
async fn test_search_runs_in_project_root() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("a.ts"),
        "import { Foo } from '@lib/foo';\n",
    )
    .unwrap();

    let mut session = Session::new(sh("cat a.ts"), sh("head -n 1"), options());
    let outcome = session.run(temp_dir.path(), Some("Foo")).await.unwrap();
    assert_eq!(outcome.selection(), Some("import { Foo } from '@lib/foo';"));
}
