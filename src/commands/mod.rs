use clap::Args;
use std::path::PathBuf;

use memberlint::config::{Config, ConfigLayer};

pub type CmdResult<T> = memberlint::Result<(T, i32)>;

/// Configuration flags shared by every command. These form the top layer
/// over `memberlint.json` and the defaults.
#[derive(Args, Debug, Default)]
pub(crate) struct GlobalArgs {
    /// Project root; only files under it are checked or rewritten
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<String>,

    /// Configuration file (default: ./memberlint.json when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Compilation database listing the translation units
    #[arg(long, global = true, value_name = "FILE")]
    pub compile_commands: Option<String>,

    /// Program model snapshot emitted by the front end
    #[arg(long, global = true, value_name = "FILE")]
    pub model: Option<String>,

    /// Glob of project-relative paths to skip (repeatable)
    #[arg(long, global = true, value_name = "GLOB")]
    pub exclude: Vec<String>,
}

impl GlobalArgs {
    fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            project_root: self.root.clone(),
            compile_commands: self.compile_commands.clone(),
            model: self.model.clone(),
            exclude: self.exclude.clone(),
        }
    }

    pub(crate) fn resolve_config(&self) -> memberlint::Result<Config> {
        let cwd = std::env::current_dir().map_err(|e| {
            memberlint::Error::internal_io(e.to_string(), Some("read current directory".to_string()))
        })?;
        Config::resolve(&cwd, self.config.as_deref(), self.layer())
    }
}

pub mod check;
pub mod fix;

pub(crate) fn run_text(
    command: crate::Commands,
    global: &GlobalArgs,
) -> memberlint::Result<(String, i32)> {
    match command {
        crate::Commands::Check(args) => check::run_text(args, global),
        _ => Err(memberlint::Error::validation_invalid_argument(
            "output_mode",
            "Command does not support text output",
        )),
    }
}

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (memberlint::Result<serde_json::Value>, i32) {
    crate::tty::status("memberlint is working...");

    match command {
        crate::Commands::Check(args) => dispatch!(args, global, check),
        crate::Commands::Fix(args) => dispatch!(args, global, fix),
    }
}
