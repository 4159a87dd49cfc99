use std::process::ExitCode;

fn main() -> ExitCode {
    jiratime_lib::run()
}
