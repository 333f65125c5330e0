use std::process::ExitCode;

use geoquery::ui::output;

fn main() -> ExitCode {
    match geoquery::cli::run() {
        Ok(code) => code,
        Err(err) => {
            output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
