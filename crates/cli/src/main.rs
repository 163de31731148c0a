use std::process::ExitCode;

fn main() -> ExitCode {
    consulty_cli::run()
}
