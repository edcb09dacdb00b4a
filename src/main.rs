use std::process::ExitCode;

fn main() -> ExitCode {
    classy_mermaid::cli::run()
}
