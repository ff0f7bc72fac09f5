//! docmeta binary entry point.

use std::process::ExitCode;

use docmeta::ui::output;

fn main() -> ExitCode {
    match docmeta::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
