use std::process::ExitCode;

fn main() -> ExitCode {
    noforma_cli::run()
}
