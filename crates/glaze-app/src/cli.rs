use clap::Parser;

/// glaze demo shell — one window, one webview, served over `app:`.
#[derive(Parser, Debug)]
#[command(name = "glaze-demo", version, about)]
pub struct Args {
    /// URL to load instead of the bundled demo page.
    #[arg(long)]
    pub url: Option<String>,

    /// Directory to serve over the `app:` scheme.
    #[arg(long)]
    pub serve_dir: Option<String>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
