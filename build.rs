use std::env;
use std::fs;

/// Keys read through `option_env!` in src/config.rs
const CONFIG_KEYS: [&str; 5] = [
    "API_URL",
    "ENVIRONMENT",
    "ENABLE_LOGGING",
    "INACTIVITY_TIMEOUT_MS",
    "INACTIVITY_WARNING_MS",
];

fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value.trim().trim_matches('"')))
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.env");
    for key in CONFIG_KEYS {
        println!("cargo:rerun-if-env-changed={}", key);
    }

    let Ok(contents) = fs::read_to_string(".env") else {
        println!("cargo:warning=No .env file, session core uses its defaults (API_URL=http://localhost:10000, 5 min inactivity timeout)");
        return;
    };

    for (key, value) in contents.lines().filter_map(parse_line) {
        if !CONFIG_KEYS.contains(&key) {
            continue;
        }
        // The process environment wins over .env
        if env::var(key).is_err() {
            println!("cargo:rustc-env={}={}", key, value);
        }
    }
}
