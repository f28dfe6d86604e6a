use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Rutero";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Location assigned to a routing slip at intake, before any relocation.
pub const INTAKE_LOCATION: &str = "Ventanilla de Recepción";

/// Prefix for generated tracking codes (HR = hoja de ruta).
pub const TRACKING_CODE_PREFIX: &str = "HR";

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    format!("{}=info", env!("CARGO_PKG_NAME"))
}

/// Get the application data directory
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Rutero")
}

/// Default path of the tracking database
pub fn database_path() -> PathBuf {
    app_data_dir().join("rutero.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Rutero"));
    }

    #[test]
    fn database_path_under_app_data() {
        let db = database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("rutero.db"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }
}
