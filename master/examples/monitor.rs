// monitor.rs
//
// Sends a one-step recipe and prints the raw status lines of the controller.
//
// On host `cd master` run:
// cargo run --example monitor [DEVICE]
//
// Without DEVICE the first /dev/ttyUSB*, then /dev/ttyACM*, is used.

use master::{Recipe, SerialConfig, Session};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let config = SerialConfig {
        path: std::env::args_os().nth(1).map(Into::into),
        ..SerialConfig::default()
    };

    let recipe = Recipe::compile("heat to: 40 C")?;
    let mut session = Session::open(&config)?;
    session.write_recipe(&recipe)?;

    loop {
        let line = session.read_current_status()?;
        println!("{}", line);
    }
}
