use std::process;

fn main() {
    process::exit(nutrunner::cli::run());
}
