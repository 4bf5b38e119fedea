//! Logger initialization.
//!
//! Diagnostics go to stderr through `env_logger`. The default level is `warn`
//! so that stdout carries nothing but requests and responses; `RUST_LOG`
//! raises it, e.g. `RUST_LOG=hopget_core=debug client http://example.com/`.

use std::io::Write;

use env_logger::Env;
use log::SetLoggerError;

pub fn init_logger() -> Result<(), SetLoggerError> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()
}
