//! Project-wide constants.

pub const APP_HEADER: &str = "x-pw-checker-app";
pub const APP_NAME: &str = "2025PasswordCheckingUtility";
pub const VERSION_HEADER: &str = "x-pw-checker-version";
pub const APP_VERSION: &str = "2026-01-05";

/// Default listen address when none is given on the command line.
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Default engine script, relative to the working directory.
pub const DEFAULT_SCRIPT: &str = "check_password.py";

/// Canonical port for encrypted HTTP.
pub const HTTPS_PORT: u16 = 443;

/// Strict-Transport-Security value: one year, subdomains included.
pub const HSTS: &str = "max-age=31536000; includeSubDomains";

/// Fixed messages returned to callers. Clients match on these.
pub const MSG_PASSWORD_REQUIRED: &str = "Password is required.";
pub const MSG_ENGINE_FAILED: &str = "Error running Python script.";

/// Shown in place of the password whenever a command line is described.
pub const REDACTED: &str = "********";

/// Output fragments that mean "the interpreter itself is not there",
/// as opposed to the engine running and failing. Matched lowercase.
pub const MISSING_RUNTIME_PHRASES: &[&str] = &[
    "no installed python found",
    "is not recognized",
    "cannot find the file",
    "no such file or directory",
    "not found",
];

/// Windows launcher tried first on desktop hosts.
pub const LAUNCHER: &str = "py";
pub const LAUNCHER_ARGS: &[&str] = &["-3"];

/// System-wide installs first, then per-user installs.
pub const DESKTOP_INSTALL_PATTERNS: &[&str] = &[
    "C:/Program Files/Python*/python.exe",
    "C:/Program Files (x86)/Python*/python.exe",
    "C:/Users/*/AppData/Local/Programs/Python/Python*/python.exe",
];

pub const DESKTOP_FALLBACK: &str = "python";

pub const SERVER_CANONICAL_PATH: &str = "/usr/bin/python3";
pub const SERVER_FALLBACK: &str = "python3";
