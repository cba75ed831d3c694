pub(crate) mod beads;
pub(crate) mod color;
pub(crate) mod config;
pub(crate) mod effects;
pub(crate) mod error;
pub(crate) mod exposure;
pub(crate) mod intervaltimer;
pub(crate) mod mainloop;
pub(crate) mod osc;
pub(crate) mod oscoutput;
pub(crate) mod registry;

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use clap::Parser;

use crate::beads::BeadRing;
use crate::config::Config;
use crate::mainloop::Mainloop;
use crate::osc::OscReceiver;
use crate::oscoutput::OscOutput;
use crate::registry::EffectRegistry;

#[derive(Parser)]
struct Cli {
    /// Display driver address [default: 127.0.0.1]
    #[arg(long, value_name = "ADDR")]
    ip: Option<String>,

    /// Display driver port [default: 5005]
    #[arg(long)]
    port: Option<u16>,

    /// Address to receive remote control messages on [default: 0.0.0.0:8000]
    #[arg(long, value_name = "ADDR:PORT")]
    listen: Option<String>,

    /// Mainloop cadence in milliseconds [default: 30]
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Number of beads on the installation [default: 60]
    #[arg(long, value_name = "COUNT")]
    beads: Option<usize>,

    /// Configuration file with settings and startup effects
    #[arg(short, long, value_name = "FILE")]
    config: Option<std::path::PathBuf>,
}

impl Cli {
    /// Flags given on the command line win over the file.
    fn apply(self, config: &mut Config) {
        if let Some(ip) = self.ip {
            config.ip = ip;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(listen) = self.listen {
            config.listen = listen;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.interval_ms = interval_ms;
        }
        if let Some(beads) = self.beads {
            config.bead_count = beads;
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();
    let mut config = match args.config.as_deref() {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(msg) => panic!("Cannot load configuration: {}", msg),
        },
        None => Config::default(),
    };
    args.apply(&mut config);

    let driver_addr: SocketAddr = match format!("{}:{}", config.ip, config.port).parse() {
        Ok(addr) => addr,
        Err(err) => panic!("Bad display driver address {}: {}", config.ip, err),
    };
    let listen_addr: SocketAddr = match config.listen.parse() {
        Ok(addr) => addr,
        Err(err) => panic!("Bad listen address {}: {}", config.listen, err),
    };

    let output = match OscOutput::new(driver_addr) {
        Ok(output) => output,
        Err(msg) => panic!("Cannot set up OSC output: {}", msg),
    };

    let ring = BeadRing::new(config.bead_count).with_background(config.background);
    let registry = EffectRegistry::with_builtin_effects();
    let mut mainloop = Mainloop::new(
        ring,
        registry,
        output,
        Duration::from_millis(config.interval_ms),
    );
    log::info!(
        "Sending {} beads to {}, effects: {}",
        config.bead_count,
        driver_addr,
        mainloop.registry().names().join(", ")
    );

    for entry in &config.effects {
        let result = entry
            .options(mainloop.ring())
            .and_then(|options| mainloop.add(&entry.name, options, &entry.knobs));
        match result {
            Ok(id) => log::info!("Started {} as {}", entry.name, id),
            Err(err) => panic!("Cannot start {}: {}", entry.name, err),
        }
    }

    let osc_receiver = match OscReceiver::new(listen_addr, mainloop.command_sender()) {
        Ok(osc_receiver) => osc_receiver,
        Err(msg) => panic!("Cannot set up OSC: {}", msg),
    };
    log::info!("Listening for remote control on {}", listen_addr);

    let running = mainloop.running();
    if let Err(error) = ctrlc::set_handler(move || running.store(false, Ordering::SeqCst)) {
        panic!("Failed to install signal handler: {}", error);
    }

    let res = thread::Builder::new()
        .name("OSC".to_string())
        .spawn(move || {
            osc_receiver.run();
        });
    if let Err(error) = res {
        panic!("Failed to create thread: {}", error);
    }

    let res = thread::Builder::new()
        .name("Mainloop".to_string())
        .spawn(move || {
            mainloop.run();
        });
    let handle = match res {
        Ok(handle) => handle,
        Err(error) => panic!("Failed to create thread: {}", error),
    };

    if handle.join().is_err() {
        log::error!("Mainloop panicked");
    }
}
