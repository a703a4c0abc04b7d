//! plate CLI - Scaffold a project directory from a plate template

use anyhow::Result;
use clap::Parser;
use plates_core::tui::{select_template, CliclackPrompter, CliclackReporter};
use plates_core::{ConsoleReporter, Engine, LinePrompter, Prompter, Reporter, TemplateStore};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "plate")]
#[command(about = "Scaffold a project directory from a plate template")]
#[command(version)]
pub struct Args {
    /// Template name to use (skips the template picker)
    #[arg(short, long)]
    pub template: Option<String>,

    /// Directory holding the .plate files (defaults to $PLATES_DIR or ~/.plates)
    #[arg(long = "templates-dir")]
    pub templates_dir: Option<PathBuf>,

    /// List available templates and exit
    #[arg(short, long)]
    pub list: bool,

    /// Only report errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Use line-based prompts even on a terminal
    #[arg(long)]
    pub plain: bool,

    /// Project directory to render into
    pub destination: Option<PathBuf>,

    /// Extra arguments, available to templates as `args 2` onwards
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub template_args: Vec<String>,
}

/// Program name as invoked
fn program_name() -> String {
    display_program(std::env::args_os().next())
}

/// Lossy display form of `argv[0]`; argv need not be UTF-8
fn display_program(arg0: Option<OsString>) -> String {
    arg0.map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "plate".to_string())
}

fn print_usage() -> ! {
    println!("Usage:\n  {} PROJECT_PATH", program_name());
    std::process::exit(1);
}

/// Positional list handed to templates: program, destination, then extras
fn positional_args(destination: &std::path::Path, extra: &[String]) -> Vec<String> {
    let mut args = vec![program_name(), destination.display().to_string()];
    args.extend(extra.iter().cloned());
    args
}

/// Pick the template to run, from `--template` or interactively
fn choose_template(
    store: &TemplateStore,
    requested: Option<&str>,
    interactive: bool,
    reporter: &dyn Reporter,
) -> Result<String> {
    let available = store.available()?;

    if let Some(name) = requested {
        if !available.iter().any(|t| t == name) {
            anyhow::bail!(
                "Template '{}' not found. Available templates: {}",
                name,
                available.join(", ")
            );
        }
        return Ok(name.to_string());
    }

    match available.as_slice() {
        [] => anyhow::bail!("No templates available in {}", store.root().display()),
        [only] => {
            reporter.info(&format!("Using template: {}", only));
            Ok(only.clone())
        }
        _ if interactive => Ok(select_template(&available)?),
        _ => Ok(LinePrompter::stdio().choose(&available)?),
    }
}

async fn run(args: Args) -> Result<()> {
    let store = TemplateStore::locate(args.templates_dir.clone())?;
    store.setup()?;

    if args.list {
        for name in store.available()? {
            println!("{}", name);
        }
        return Ok(());
    }

    let Some(destination) = args.destination.clone() else {
        print_usage();
    };

    let settings = store.settings()?;
    let verbose = settings.verbose && !args.quiet;
    let interactive = !args.plain && console::Term::stdout().is_term();

    let reporter: Box<dyn Reporter> = if interactive {
        Box::new(CliclackReporter::new(verbose))
    } else {
        Box::new(ConsoleReporter::new(verbose))
    };

    let name = choose_template(&store, args.template.as_deref(), interactive, reporter.as_ref())?;
    let positional = positional_args(&destination, &args.template_args);

    let mut prompter: Box<dyn Prompter> = if interactive {
        Box::new(CliclackPrompter::new())
    } else {
        Box::new(LinePrompter::stdio())
    };

    let engine = Engine::new(store, &destination, reporter.as_ref())
        .stream_output(settings.stream_output);

    if let Err(err) = engine.execute(&name, &positional, prompter.as_mut()).await {
        reporter.fatal(&err.to_string());
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    if std::env::args_os().count() < 2 {
        print_usage();
    }

    let args = Args::parse();
    let result = run(args).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    if let Err(err) = result {
        ConsoleReporter::new(true).fatal(&format!("{:#}", err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parses_template_flag_and_extra_args() {
        let args = Args::try_parse_from(["plate", "-t", "rust", "out/app", "widget", "--lib"]).unwrap();
        assert_eq!(args.template.as_deref(), Some("rust"));
        assert_eq!(args.destination, Some(PathBuf::from("out/app")));
        assert_eq!(args.template_args, vec!["widget", "--lib"]);
    }

    #[test]
    fn test_positional_args_start_with_program_and_destination() {
        let args = positional_args(std::path::Path::new("out"), &["x".to_string()]);
        assert_eq!(args.len(), 3);
        assert_eq!(args[1], "out");
        assert_eq!(args[2], "x");
    }

    #[test]
    fn test_display_program_defaults_when_missing() {
        assert_eq!(display_program(None), "plate");
        assert_eq!(display_program(Some(OsString::from("/usr/bin/plate"))), "/usr/bin/plate");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_arguments_do_not_panic() {
        use std::os::unix::ffi::OsStringExt;

        let program = OsString::from_vec(b"pl\xffte".to_vec());
        assert_eq!(display_program(Some(program)), "pl\u{FFFD}te");

        let dest = OsString::from_vec(b"/tmp/out\xff".to_vec());
        let args = Args::try_parse_from([OsString::from("plate"), OsString::from("--plain"), dest.clone()]).unwrap();
        assert_eq!(args.destination, Some(PathBuf::from(dest)));

        let positional = positional_args(args.destination.as_deref().unwrap(), &[]);
        assert_eq!(positional[1], "/tmp/out\u{FFFD}");
    }
}
