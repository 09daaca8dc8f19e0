use std::path::PathBuf;
use std::time::Duration;

use owo_colors::OwoColorize;
use supports_color::Stream;

pub fn color_enabled_stdout() -> bool {
    supports_color::on(Stream::Stdout).is_some()
}

pub fn sym_check(enabled: bool) -> String {
    if enabled { format!("{}", "✔".green().bold()) } else { "✔".to_string() }
}

pub fn sym_cross(enabled: bool) -> String {
    if enabled { format!("{}", "✖".red().bold()) } else { "x".to_string() }
}

/// Render a response code with the color its class deserves.
pub fn paint_code(code: &str, enabled: bool) -> String {
    if !enabled {
        return code.to_string();
    }
    match code {
        "OK" => format!("{}", code.green().bold()),
        "ConnectionError" | "UnknownError" => format!("{}", code.red().bold()),
        _ => format!("{}", code.yellow().bold()),
    }
}

/// Seconds with millisecond precision, the way grpcurl users read latencies.
pub fn fmt_elapsed(elapsed: Duration) -> String {
    format!("{:.3}s", elapsed.as_secs_f64())
}

/// Start a `.grpclick.log` in the working directory when debugging is on.
pub fn init_debug_log(debug: bool) -> Option<PathBuf> {
    if !debug {
        return None;
    }
    let path = PathBuf::from(".grpclick.log");
    std::fs::write(
        &path,
        format!(
            "=== grpclick debug log - {}\n\n",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ),
    )
    .ok();
    Some(path)
}

pub fn debug_log(file: &Option<PathBuf>, message: &str) {
    if let Some(path) = file {
        use std::fs::OpenOptions;
        use std::io::Write;
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = writeln!(f, "{message}");
        }
    }
}
