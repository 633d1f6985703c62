use clap::Args;
use serde::Serialize;

use memberlint::refactor::{self, FixResult};

use super::CmdResult;

#[derive(Args, Debug)]
pub struct FixArgs {
    /// Apply changes to disk (default is dry-run)
    #[arg(long)]
    pub write: bool,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum FixOutput {
    #[serde(rename = "fix")]
    Fix(FixResult),
}

pub fn run(args: FixArgs, global: &super::GlobalArgs) -> CmdResult<FixOutput> {
    let config = global.resolve_config()?;
    let result = refactor::fix(&config, args.write)?;

    // Conflicts and failed files still leave the others rewritten
    let exit_code = if result.has_failures() { 1 } else { 0 };
    Ok((FixOutput::Fix(result), exit_code))
}
