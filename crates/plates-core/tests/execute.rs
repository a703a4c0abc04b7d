//! End-to-end execution of plate templates against real subprocesses

use plates_core::{Engine, EngineError, ErrorKind, LinePrompter, Reporter, TemplateStore};
use std::cell::RefCell;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Reporter that keeps every message for inspection
#[derive(Default)]
struct Recorder {
    messages: RefCell<Vec<String>>,
}

impl Recorder {
    fn contains(&self, needle: &str) -> bool {
        self.messages.borrow().iter().any(|m| m.contains(needle))
    }
}

impl Reporter for Recorder {
    fn info(&self, message: &str) {
        self.messages.borrow_mut().push(format!("info: {}", message));
    }

    fn detail(&self, message: &str) {
        self.messages.borrow_mut().push(format!("detail: {}", message));
    }

    fn warn(&self, message: &str) {
        self.messages.borrow_mut().push(format!("warn: {}", message));
    }

    fn fatal(&self, message: &str) -> ! {
        panic!("fatal: {}", message);
    }
}

struct Fixture {
    store: TempDir,
    dest: TempDir,
}

impl Fixture {
    fn new(name: &str, source: &str) -> Self {
        let store = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        std::fs::write(store.path().join(format!("{}.plate", name)), source).unwrap();
        Self { store, dest }
    }

    fn dest(&self) -> &Path {
        self.dest.path()
    }

    fn engine<'r>(&self, reporter: &'r Recorder) -> Engine<'r> {
        Engine::new(TemplateStore::new(self.store.path()), self.dest(), reporter)
    }

    /// `[program, destination, extra...]`
    fn args(&self, extra: &[&str]) -> Vec<String> {
        let mut args = vec!["plate".to_string(), self.dest().display().to_string()];
        args.extend(extra.iter().map(|s| s.to_string()));
        args
    }

    fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.dest().join(rel)).unwrap()
    }
}

fn prompter(input: &str) -> LinePrompter<Cursor<Vec<u8>>, Vec<u8>> {
    LinePrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

fn sentinel(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

#[tokio::test]
async fn test_files_are_written_before_commands_regardless_of_order() {
    let fx = Fixture::new(
        "demo",
        r##"{{define "# copy"}}cp {{args 1}}/a.txt {{args 1}}/copied.txt{{end}}
{{define "a.txt"}}
   X
{{end}}"##,
    );
    let recorder = Recorder::default();

    let report = fx
        .engine(&recorder)
        .execute("demo", &fx.args(&[]), &mut prompter(""))
        .await
        .unwrap();

    assert_eq!(fx.read("a.txt"), "X");
    assert_eq!(fx.read("copied.txt"), "X");
    assert_eq!(report.files, vec![fx.dest().join("a.txt")]);
    assert_eq!(report.commands.len(), 1);
    assert!(recorder.contains("Creating file"));
    assert!(recorder.contains("Executing command set: copy"));
}

#[tokio::test]
async fn test_file_survives_failing_command() {
    let fx = Fixture::new(
        "demo",
        r##"{{define "a.txt"}}X{{end}}{{define "# setup"}}false{{end}}"##,
    );
    let recorder = Recorder::default();

    let err = fx
        .engine(&recorder)
        .execute("demo", &fx.args(&[]), &mut prompter(""))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::CommandFailed { .. }));
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(fx.read("a.txt"), "X");
}

#[tokio::test]
async fn test_first_failing_command_stops_everything() {
    let marks = TempDir::new().unwrap();
    let same_block = sentinel(&marks, "same-block");
    let next_block = sentinel(&marks, "next-block");

    let fx = Fixture::new(
        "demo",
        r##"{{define "# first"}}
false
touch {{args 2}}
{{end}}
{{define "# second"}}touch {{args 3}}{{end}}"##,
    );
    let recorder = Recorder::default();
    let args = fx.args(&[
        same_block.to_str().unwrap(),
        next_block.to_str().unwrap(),
    ]);

    let result = fx
        .engine(&recorder)
        .execute("demo", &args, &mut prompter(""))
        .await;

    assert!(result.is_err());
    assert!(!same_block.exists());
    assert!(!next_block.exists());
}

#[tokio::test]
async fn test_commands_run_in_declaration_order() {
    let marks = TempDir::new().unwrap();
    let base = sentinel(&marks, "base");

    // mkdir without -p only succeeds if the previous line already ran
    let fx = Fixture::new(
        "demo",
        r##"{{define "# one"}}mkdir {{args 2}}{{end}}
{{define "# two"}}mkdir {{args 2}}/a
mkdir {{args 2}}/a/b{{end}}"##,
    );
    let recorder = Recorder::default();

    let report = fx
        .engine(&recorder)
        .execute("demo", &fx.args(&[base.to_str().unwrap()]), &mut prompter(""))
        .await
        .unwrap();

    assert!(base.join("a/b").is_dir());
    assert_eq!(report.commands.len(), 3);
}

#[tokio::test]
async fn test_blank_command_lines_are_skipped() {
    let marks = TempDir::new().unwrap();
    let first = sentinel(&marks, "first");
    let second = sentinel(&marks, "second");

    let fx = Fixture::new(
        "demo",
        "{{define \"# setup\"}}touch {{args 2}}\n\n   \ntouch {{args 3}}\n{{end}}",
    );
    let recorder = Recorder::default();

    let report = fx
        .engine(&recorder)
        .execute(
            "demo",
            &fx.args(&[first.to_str().unwrap(), second.to_str().unwrap()]),
            &mut prompter(""),
        )
        .await
        .unwrap();

    assert!(first.exists());
    assert!(second.exists());
    assert_eq!(report.commands.len(), 2);
}

#[tokio::test]
async fn test_classification_by_prefix() {
    let fx = Fixture::new(
        "demo",
        r##"{{define "#no-space"}}file body{{end}}{{define "# has-space"}}true{{end}}"##,
    );
    let recorder = Recorder::default();

    let report = fx
        .engine(&recorder)
        .execute("demo", &fx.args(&[]), &mut prompter(""))
        .await
        .unwrap();

    assert_eq!(fx.read("#no-space"), "file body");
    assert!(!fx.dest().join("# has-space").exists());
    assert_eq!(report.commands, vec!["true"]);
}

#[tokio::test]
async fn test_nested_paths_are_created() {
    let fx = Fixture::new(
        "demo",
        r##"{{define "src/bin/main.rs"}}fn main() {}{{end}}{{define "src/lib/mod.rs"}}pub mod a;{{end}}"##,
    );
    let recorder = Recorder::default();

    fx.engine(&recorder)
        .execute("demo", &fx.args(&[]), &mut prompter(""))
        .await
        .unwrap();

    assert_eq!(fx.read("src/lib/mod.rs"), "pub mod a;");
    assert_eq!(fx.read("src/bin/main.rs"), "fn main() {}");
}

#[tokio::test]
async fn test_plain_body_is_copied_byte_for_byte() {
    let body = "[package]\nname = \"demo\"\n\n[dependencies]\nserde = \"1\"";
    let fx = Fixture::new(
        "demo",
        &format!("{{{{define \"Cargo.toml\"}}}}{}{{{{end}}}}", body),
    );
    let recorder = Recorder::default();

    fx.engine(&recorder)
        .execute("demo", &fx.args(&[]), &mut prompter(""))
        .await
        .unwrap();

    assert_eq!(fx.read("Cargo.toml"), body);
}

#[tokio::test]
async fn test_ask_is_memoized_within_one_execution() {
    let fx = Fixture::new(
        "demo",
        r##"{{define "a.txt"}}{{ask "Name"}}{{end}}
{{define "b.txt"}}hello {{ask "Name"}}{{end}}
{{define "# noop"}}echo {{ask "Name"}}{{end}}"##,
    );
    let recorder = Recorder::default();
    let mut prompter = prompter("\nAda\nsecond answer\n");

    fx.engine(&recorder)
        .execute("demo", &fx.args(&[]), &mut prompter)
        .await
        .unwrap();

    assert_eq!(fx.read("a.txt"), "Ada");
    assert_eq!(fx.read("b.txt"), "hello Ada");

    let (_, output) = prompter.into_parts();
    let output = String::from_utf8(output).unwrap();
    // One blank retry, then the answer; never asked again afterwards
    assert_eq!(output.matches("> Name: ").count(), 2);
}

#[tokio::test]
async fn test_answers_do_not_leak_between_executions() {
    let fx = Fixture::new("demo", r##"{{define "a.txt"}}{{ask "Name"}}{{end}}"##);
    let recorder = Recorder::default();
    let engine = fx.engine(&recorder);
    let mut prompter = prompter("first\nsecond\n");

    engine.execute("demo", &fx.args(&[]), &mut prompter).await.unwrap();
    assert_eq!(fx.read("a.txt"), "first");

    engine.execute("demo", &fx.args(&[]), &mut prompter).await.unwrap();
    assert_eq!(fx.read("a.txt"), "second");
}

#[tokio::test]
async fn test_missing_argument_is_usage_error_and_writes_nothing() {
    let marks = TempDir::new().unwrap();
    let ran = sentinel(&marks, "ran");

    let fx = Fixture::new(
        "demo",
        r##"{{define "a.txt"}}{{args 5}}{{end}}{{define "# setup"}}touch {{args 2}}{{end}}"##,
    );
    let recorder = Recorder::default();

    let err = fx
        .engine(&recorder)
        .execute("demo", &fx.args(&[ran.to_str().unwrap()]), &mut prompter(""))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(err.to_string().contains("Args[5]"));
    assert!(!fx.dest().join("a.txt").exists());
    assert!(!ran.exists());
}

#[tokio::test]
async fn test_closed_input_is_interactive_read_error() {
    let fx = Fixture::new("demo", r##"{{define "a.txt"}}{{ask "Name"}}{{end}}"##);
    let recorder = Recorder::default();

    let err = fx
        .engine(&recorder)
        .execute("demo", &fx.args(&[]), &mut prompter("  \n"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InteractiveRead);
    assert!(!fx.dest().join("a.txt").exists());
}

#[tokio::test]
async fn test_missing_template_is_lookup_error() {
    let fx = Fixture::new("demo", "");
    let recorder = Recorder::default();

    let err = fx
        .engine(&recorder)
        .execute("other", &fx.args(&[]), &mut prompter(""))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Lookup);
}

#[tokio::test]
async fn test_parse_error_writes_nothing() {
    let fx = Fixture::new(
        "demo",
        r##"{{define "a.txt"}}ok{{end}}{{define "b.txt"}}{{shout "x"}}{{end}}"##,
    );
    let recorder = Recorder::default();

    let err = fx
        .engine(&recorder)
        .execute("demo", &fx.args(&[]), &mut prompter(""))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(err.to_string().contains("function \"shout\" not defined"));
    assert!(!fx.dest().join("a.txt").exists());
}

#[tokio::test]
async fn test_root_text_is_never_materialized() {
    let fx = Fixture::new(
        "demo",
        "Notes for template authors.\n{{define \"a.txt\"}}A{{end}}\n",
    );
    let recorder = Recorder::default();

    let report = fx
        .engine(&recorder)
        .execute("demo", &fx.args(&[]), &mut prompter(""))
        .await
        .unwrap();

    assert_eq!(report.files.len(), 1);
    let entries = std::fs::read_dir(fx.dest()).unwrap().count();
    assert_eq!(entries, 1);
}

#[tokio::test]
async fn test_stream_output_forwards_stdout() {
    let fx = Fixture::new("demo", r##"{{define "# hello"}}echo hi there{{end}}"##);
    let recorder = Recorder::default();

    fx.engine(&recorder)
        .stream_output(true)
        .execute("demo", &fx.args(&[]), &mut prompter(""))
        .await
        .unwrap();

    assert!(recorder.contains("detail: # echo hi there"));
    assert!(recorder.contains("detail: hi there"));
}

#[tokio::test]
async fn test_overwriting_existing_file_warns() {
    let fx = Fixture::new("demo", r#"{{define "a.txt"}}new{{end}}{{define "b.txt"}}B{{end}}"#);
    std::fs::write(fx.dest().join("a.txt"), "old").unwrap();
    let recorder = Recorder::default();

    fx.engine(&recorder)
        .execute("demo", &fx.args(&[]), &mut prompter(""))
        .await
        .unwrap();

    assert_eq!(fx.read("a.txt"), "new");
    assert!(recorder.contains("warn: Overwriting existing file"));
    assert_eq!(
        recorder
            .messages
            .borrow()
            .iter()
            .filter(|m| m.starts_with("warn:"))
            .count(),
        1
    );
}
