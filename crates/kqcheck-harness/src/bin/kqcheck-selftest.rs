//! kqcheck self-test.
//!
//! Runs the built-in `EVFILT_USER` cases against the configured backend.
//!
//! # Usage
//!
//! ```bash
//! # Detected backend, strict comparison
//! kqcheck-selftest
//!
//! # Explicit configuration
//! kqcheck-selftest kqcheck.toml
//! ```
//!
//! Kernel backends use a real kqueue where the target has one. Elsewhere the
//! in-process queue stands in, emulating the configured backend's flag echo.
//! A backend's documented quirks only apply when the config names it.

use kqcheck_harness::{Backend, Harness, HarnessConfig, MemoryQueue, OrTerminate, scenarios};

fn main() {
    // Initialize tracing for log output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return;
    }

    let config = match args.get(1) {
        Some(path) => match HarnessConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{path}: {e}");
                std::process::exit(2);
            }
        },
        None => HarnessConfig::default(),
    };

    let backend = config.backend();
    let quirks = config.quirks();
    tracing::info!(
        %backend,
        named = config.backend.is_some(),
        normalize_add_flag = quirks.normalize_add_flag(),
        "kqcheck self-test"
    );

    run(&config);

    println!("all scenarios passed ({backend})");
}

#[cfg(any(target_os = "macos", target_os = "freebsd"))]
fn run(config: &HarnessConfig) {
    use std::os::fd::AsFd;

    if config.backend() == Backend::Memory {
        run_memory(config);
        return;
    }

    let fd = match kqcheck_harness::open_kqueue() {
        Ok(fd) => fd,
        Err(e) => {
            eprintln!("kqueue(2): {e}");
            std::process::exit(1);
        }
    };
    let queue = kqcheck_harness::Kqueue::new(fd.as_fd());
    scenarios::run_all(&Harness::from_config(&queue, config)).or_terminate();
}

#[cfg(not(any(target_os = "macos", target_os = "freebsd")))]
fn run(config: &HarnessConfig) {
    let backend = config.backend();
    if backend != Backend::Memory {
        tracing::warn!(
            %backend,
            "no kernel kqueue on this target, emulating with the in-process queue"
        );
    }
    run_memory(config);
}

fn run_memory(config: &HarnessConfig) {
    let queue = MemoryQueue::emulating(config.backend());
    scenarios::run_all(&Harness::from_config(&queue, config)).or_terminate();
}

fn print_help() {
    println!(
        r#"kqcheck-selftest - kqueue conformance self-test

USAGE:
    kqcheck-selftest [CONFIG]

ARGS:
    CONFIG        TOML file with optional `backend` and `normalize_add_flag`.
                  Without it the detected backend is compared strictly.

OPTIONS:
    --help, -h    Print this help message

ENVIRONMENT:
    RUST_LOG      Log filter (default: info)

BACKENDS (quirks apply only when named in CONFIG):
    freebsd-kernel    strips EV_ADD from delivered events (normalized)
    darwin-kernel     echoes EV_ADD (strict)
    libkqueue         echoes EV_ADD (strict)
    memory            in-process queue (strict)
"#
    );
}
