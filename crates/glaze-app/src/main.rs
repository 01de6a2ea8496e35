mod app;
mod cli;

use tracing_subscriber::EnvFilter;
use winit::event_loop::EventLoop;

fn main() {
    let args = cli::parse();

    let log_directive = args.log_level.as_deref().unwrap_or("glaze=info");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| "glaze=info".parse().expect("static directive")),
            ),
        )
        .init();

    tracing::info!("glaze demo v{} starting", env!("CARGO_PKG_VERSION"));

    let event_loop = EventLoop::<app::WakeUp>::with_user_event()
        .build()
        .expect("failed to create event loop");
    let proxy = event_loop.create_proxy();
    let mut app = app::App::new(args, proxy);

    if let Err(error) = event_loop.run_app(&mut app) {
        tracing::error!(%error, "event loop error");
    }
    tracing::info!("shutdown complete");
}
