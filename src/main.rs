use std::process::ExitCode;

fn main() -> ExitCode {
    casting_agency_api::main()
}
