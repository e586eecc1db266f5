use std::path::PathBuf;
use std::process::exit;

use eda_core::RunStatus;
use edaflow::{analyze, AnalysisConfig, ENV};

const USAGE: &str = "uso: eda-cli --config <archivo.yaml> [--output-dir <dir>] [--fail-fast]";

fn main() {
    // Cargar .env si existe (EDAFLOW_OUTPUT_DIR, EDAFLOW_FAIL_FAST, RUST_LOG)
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<PathBuf> = None;
    let mut output_dir: Option<PathBuf> = None;
    let mut fail_fast = false;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                if i < args.len() { config_path = Some(PathBuf::from(&args[i])); }
            }
            "--output-dir" => {
                i += 1;
                if i < args.len() { output_dir = Some(PathBuf::from(&args[i])); }
            }
            "--fail-fast" => fail_fast = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                return;
            }
            other => {
                eprintln!("[eda-cli] argumento desconocido: {other}");
                eprintln!("{USAGE}");
                exit(2);
            }
        }
        i += 1;
    }

    let Some(config_path) = config_path else {
        eprintln!("{USAGE}");
        exit(2);
    };

    let mut config = match AnalysisConfig::from_path(&config_path) {
        Ok(c) => c.with_env(&ENV),
        Err(e) => {
            eprintln!("[eda-cli] {e}");
            exit(2);
        }
    };
    // Los flags explícitos ganan sobre el entorno
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    config.fail_fast |= fail_fast;

    match analyze(&config) {
        Ok(outcome) => {
            let summary = &outcome.summary;
            for record in &summary.steps {
                let line = serde_json::to_string(&record.result).unwrap_or_default();
                println!("{:>2} {:<14} {line}", record.index, record.kind);
            }
            println!("charts: {}", summary.charts().count());
            println!("summary: {}", outcome.summary_path.display());
            match summary.status() {
                RunStatus::Success => {}
                RunStatus::Partial => log::warn!("Some analysis steps failed, see {}", outcome.summary_path.display()),
                RunStatus::Failure => exit(3),
            }
        }
        Err(e) if e.is_config() => {
            eprintln!("[eda-cli] configuración inválida: {e}");
            exit(2);
        }
        Err(e) => {
            eprintln!("[eda-cli] {e}");
            exit(1);
        }
    }
}
