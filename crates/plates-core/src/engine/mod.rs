//! Template execution
//!
//! [`Engine::execute`] runs one template against one destination:
//!
//! 1. Read and parse `<store>/<name>.plate` with a fresh [`FuncEnv`] bound in
//! 2. Render every file block, trim it and write it under the destination
//! 3. Render every command set and run its lines one after another
//!
//! All files are written before the first command runs, whatever order the
//! blocks were declared in. The first failure stops everything; files written
//! before it stay on disk.

pub mod commands;
pub mod materialize;

use crate::error::EngineError;
use crate::prompt::Prompter;
use crate::report::Reporter;
use crate::store::TemplateStore;
use crate::template::{parse_template, render_block, Block, FuncEnv, TemplateDefinition};
use std::path::PathBuf;

pub use commands::CommandLine;

/// Parsed template together with the environment it was parsed against
pub struct OpenTemplate<'p> {
    pub definition: TemplateDefinition,
    pub env: FuncEnv<'p>,
}

/// File blocks and command sets of a definition, each in declaration order
#[derive(Debug)]
pub struct ExecutionPlan<'t> {
    pub files: Vec<&'t Block>,
    pub commands: Vec<&'t Block>,
}

impl<'t> ExecutionPlan<'t> {
    pub fn new(definition: &'t TemplateDefinition) -> Self {
        let (files, commands) = definition.partition();
        Self { files, commands }
    }
}

/// What a successful execution did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Files written, in order
    pub files: Vec<PathBuf>,
    /// Command lines run, in order
    pub commands: Vec<String>,
}

/// Renders templates from a store into a destination directory
pub struct Engine<'r> {
    store: TemplateStore,
    destination: PathBuf,
    reporter: &'r dyn Reporter,
    stream_output: bool,
}

impl<'r> Engine<'r> {
    pub fn new(
        store: TemplateStore,
        destination: impl Into<PathBuf>,
        reporter: &'r dyn Reporter,
    ) -> Self {
        Self {
            store,
            destination: destination.into(),
            reporter,
            stream_output: false,
        }
    }

    /// Forward captured subprocess stdout to the reporter
    pub fn stream_output(mut self, enabled: bool) -> Self {
        self.stream_output = enabled;
        self
    }

    /// Build the function environment, then read and parse template `name` against it
    pub async fn open_template<'p>(
        &self,
        name: &str,
        args: &[String],
        prompter: &'p mut dyn Prompter,
    ) -> Result<OpenTemplate<'p>, EngineError> {
        let env = FuncEnv::new(args.to_vec(), prompter);
        let source = self.store.read(name).await?;
        let definition = parse_template(name, &source, &env)?;

        Ok(OpenTemplate { definition, env })
    }

    /// Run template `name` with positional `args`
    ///
    /// `args` is the full invocation list: `args[0]` is the program and
    /// `args[1]` the destination, so template arguments start at index 2.
    pub async fn execute(
        &self,
        name: &str,
        args: &[String],
        prompter: &mut dyn Prompter,
    ) -> Result<ExecutionReport, EngineError> {
        let OpenTemplate {
            definition,
            mut env,
        } = self.open_template(name, args, prompter).await?;

        let plan = ExecutionPlan::new(&definition);
        let mut report = ExecutionReport::default();

        for block in &plan.files {
            let content = render_block(&definition, block, &mut env)?;
            let path = materialize::output_path(&self.destination, block.name());

            if materialize::exists(&path).await {
                self.reporter
                    .warn(&format!("Overwriting existing file {}", path.display()));
            }
            self.reporter.info(&format!("Creating file {}", path.display()));
            materialize::write_file(&path, content.trim()).await?;
            report.files.push(path);
        }

        for block in &plan.commands {
            let script = render_block(&definition, block, &mut env)?;

            self.reporter
                .info(&format!("Executing command set: {}", block.command_set_name()));
            for command in commands::command_lines(script.trim()) {
                self.reporter.detail(&format!("# {}", command));
                commands::run(&command, self.reporter, self.stream_output).await?;
                report.commands.push(command.to_string());
            }
        }

        Ok(report)
    }
}
