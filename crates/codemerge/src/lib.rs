pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;

/// Install logging for a run with the given `-v` count and `-q` flag.
pub fn init(verbosity: u8, quiet: bool) {
    infra::logging::init(infra::logging::level_for(verbosity, quiet));
}
