//! Default socket path for rollcalld components
//!
//! The socket is user-writable by default (no root required):
//! `$XDG_RUNTIME_DIR/rollcalld/rollcalld.sock` or
//! `/tmp/rollcalld-$USER/rollcalld.sock`.

use std::path::PathBuf;

/// Environment variable for overriding the socket path
pub const ROLLCALL_SOCKET_ENV: &str = "ROLLCALL_SOCKET";

/// Socket filename within the socket directory
const SOCKET_FILENAME: &str = "rollcalld.sock";

/// Application subdirectory name
const APP_DIR: &str = "rollcalld";

/// Get the default socket path.
///
/// Order of precedence:
/// 1. `$ROLLCALL_SOCKET` environment variable (if set)
/// 2. `$XDG_RUNTIME_DIR/rollcalld/rollcalld.sock` (if XDG_RUNTIME_DIR is set)
/// 3. `/tmp/rollcalld-$USER/rollcalld.sock` (fallback)
pub fn default_socket_path() -> PathBuf {
    // Check environment override first
    if let Ok(path) = std::env::var(ROLLCALL_SOCKET_ENV) {
        return PathBuf::from(path);
    }

    socket_path_without_env()
}

/// Get the socket path without checking ROLLCALL_SOCKET env var.
/// Used for default values in configs where the env var is checked separately.
pub fn socket_path_without_env() -> PathBuf {
    // Try XDG_RUNTIME_DIR first (typically /run/user/<uid>)
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join(APP_DIR).join(SOCKET_FILENAME);
    }

    // Fallback to /tmp with username
    let username = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    PathBuf::from(format!("/tmp/{}-{}", APP_DIR, username)).join(SOCKET_FILENAME)
}
