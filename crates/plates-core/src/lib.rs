//! Plates Core - template execution engine for the `plate` CLI
//!
//! A plate is a single file of named blocks stored in the template store
//! (`~/.plates/<name>.plate` by default). Running a plate against a destination
//! writes every file block under that destination, then runs every command
//! block line by line.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Templates** - Parsing plate files, the `args`/`ask` function environment, rendering
//! - **Layer 2: Execution** - `TemplateStore` lookup and the two-phase `Engine`
//! - **Layer 3: Operator I/O** - `Prompter` and `Reporter` seams, plus cliclack versions (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based prompter, picker and reporter
//!
//! # Example Usage
//!
//! ```ignore
//! use plates_core::{ConsoleReporter, Engine, LinePrompter, TemplateStore};
//!
//! let store = TemplateStore::locate(None)?;
//! let reporter = ConsoleReporter::new(true);
//! let engine = Engine::new(store, "my-project", &reporter);
//!
//! let args = vec!["plate".to_string(), "my-project".to_string()];
//! engine.execute("rust-cli", &args, &mut LinePrompter::stdio()).await?;
//! ```

pub mod engine;
pub mod error;
pub mod prompt;
pub mod report;
pub mod store;
pub mod template;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use engine::{Engine, ExecutionPlan, ExecutionReport};
pub use error::{EngineError, ErrorKind};
pub use prompt::{LinePrompter, PromptError, Prompter};
pub use report::{ConsoleReporter, Reporter};
pub use store::{StoreSettings, TemplateStore};
pub use template::{BlockKind, TemplateDefinition};
