use clap::Parser;

/// Quill, a desktop client for the Quill coding agent.
#[derive(Parser, Debug)]
#[command(name = "quill", version, about)]
pub struct Args {
    /// Working directory to open.
    #[arg(short = 'd', long)]
    pub directory: Option<String>,

    /// Shell to run in new terminal tabs (defaults to the login shell).
    #[arg(long)]
    pub shell: Option<String>,

    /// Path to the agent CLI used to launch the backend server.
    #[arg(long)]
    pub server_cmd: Option<String>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
