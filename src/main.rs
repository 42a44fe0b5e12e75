
use std::env;
use std::process;

use hdl_core::run;
use hdl_core::shared::error::report;

fn main() {
    let args = env::args().collect();

    if let Err(err) = run(args) {
        eprintln!("hdlc: {}", report(&err));
        process::exit(1);
    }
}
