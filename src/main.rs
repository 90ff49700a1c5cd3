use std::process::ExitCode;

fn main() -> ExitCode {
    match dataset_filter::run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
