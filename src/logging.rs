// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! tracing subscriber setup for the preview binary. Logs go to stderr so stdout stays JSON.

use tracing_subscriber::EnvFilter;

/// Filter directives for a `-v` count. `RUST_LOG` takes precedence when set.
pub fn filter_directives(verbose_level: u8) -> &'static str {
    match verbose_level {
        0 => "warn,advisor_content=info",
        1 => "info,advisor_content=debug",
        _ => "debug,advisor_content=trace",
    }
}

pub fn setup_logging(verbose_level: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(filter_directives(verbose_level))
    };

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .try_init();
    if let Err(err) = result {
        eprintln!("logging already initialised: {err}");
    }
}
