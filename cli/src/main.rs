//! `client [-r n <pr1=value1 pr2=value2 ...>] <URL>`
//!
//! Issues a GET for the URL, with the parameters appended to its query
//! string, prints each request and raw response, and follows absolute
//! `http://` redirects. Exits 0 once a response ends the chain, whatever its
//! status; exits 1 on a usage error or any failure along the way.

mod args;
mod logging;

use std::io;
use std::process::ExitCode;

use hopget_core::{Limits, RedirectClient, TcpTransport};
use log::debug;

use crate::args::{CmdArgs, USAGE};

fn main() -> ExitCode {
    if let Err(e) = logging::init_logger() {
        eprintln!("Logger initialization error: {e}");
    }

    let cmd = match CmdArgs::parse(std::env::args().skip(1)) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}\n");
            return ExitCode::FAILURE;
        }
    };
    debug!("url {} with {} params", cmd.url, cmd.params.len());

    let limits = Limits::default();
    let mut client = RedirectClient::new(TcpTransport::new(limits), limits);
    let mut stdout = io::stdout().lock();
    match client.run(&cmd.url, &cmd.params, &mut stdout) {
        Ok(outcome) => {
            debug!(
                "finished at {:?} after {} redirects",
                outcome.final_url(),
                outcome.redirects
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            debug!("aborted: {e:?}");
            eprintln!("Error: {e}\n");
            ExitCode::FAILURE
        }
    }
}
