mod app;

use tracing::error;

fn main() {
    let wiring = match app::bootstrap::build_app() {
        Ok(wiring) => wiring,
        Err(startup_error) => {
            eprintln!("startup failed: {startup_error}");
            std::process::exit(1);
        }
    };

    if let Err(app_error) = engine::run_app(wiring.config, wiring.view) {
        error!(%app_error, "event loop terminated with error");
        std::process::exit(1);
    }
}
