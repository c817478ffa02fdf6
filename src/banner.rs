// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner() {
    // Using a raw string literal for the multi-line banner
    let banner = r#"
  _____ ____ _____        _               _
 | ____/ ___| ____|   ___| |__   ___  ___| | _____ _ __
 |  _|| |  _|  _|    / __| '_ \ / _ \/ __| |/ / _ \ '__|
 | |__| |_| | |___  | (__| | | |  __/ (__|   <  __/ |
 |_____\____|_____|  \___|_| |_|\___|\___|_|\_\___|_|

    EGE Math Solution Checker
"#;
    println!("{}", banner);
}
