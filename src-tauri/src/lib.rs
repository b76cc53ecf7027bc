pub mod data;
pub mod engine;
pub mod errors;
pub mod models;
pub mod session;
pub mod utils;

#[cfg(feature = "desktop")]
pub mod commands;

#[cfg(feature = "desktop")]
pub use desktop::run;

/// Shared application state, accessible from all Tauri commands.
#[cfg(feature = "desktop")]
pub struct AppState {
    pub session: session::Session,
}

#[cfg(feature = "desktop")]
mod desktop {
    use tracing::{error, info};
    use tracing_subscriber::EnvFilter;

    use crate::models::config::{resolve_root_dir, DashboardConfig};
    use crate::session::Session;
    use crate::{commands, AppState};

    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        // Initialize tracing
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();

        info!("Starting Price Dashboard");

        let root = resolve_root_dir();
        let config = DashboardConfig::load(&root).unwrap_or_else(|e| {
            error!("{}; falling back to defaults", e);
            let mut config = DashboardConfig::default();
            config.data_file = root.join(&config.data_file);
            config
        });
        info!("Dataset: {}", config.data_file.display());

        // The dataset is loaded lazily by the first command so a load
        // failure reaches the window as an error message.
        let app_state = AppState {
            session: Session::new(config),
        };

        tauri::Builder::default()
            .manage(app_state)
            .invoke_handler(tauri::generate_handler![
                commands::get_date_bounds,
                commands::render_dashboard,
                commands::get_config,
            ])
            .run(tauri::generate_context!())
            .expect("error while running tauri application");
    }
}
