use clap::Parser;
use core::cell::RefCell;
use cupcar_core::{
    mk_static,
    utils::{
        ActuatorConfig, SystemController, Timer, dispatch,
        command::{MANEUVER_CHANNEL, ManeuverCommand},
        controllers::{ACTUATOR_STATE, Actuators, SharedActuators},
    },
};
use embassy_executor::{Executor, Spawner};
use embassy_sync::mutex::Mutex;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use static_cell::StaticCell;
use tracing::{error, info, warn};

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// JSON actuator config; missing fields keep their defaults
    #[clap(long)]
    config: Option<String>,
    /// Override the slew tick period (ms)
    #[clap(long)]
    tick_ms: Option<u64>,
    /// Raw transport command such as `P50` or `S-30` (repeatable)
    #[clap(long = "cmd")]
    commands: Vec<String>,
    /// Maneuver as a shell line (`drive 50 2 0`) or JSON (repeatable)
    #[clap(long = "maneuver")]
    maneuvers: Vec<String>,
    /// Pause between fed commands (ms)
    #[clap(long, default_value_t = 500)]
    interval_ms: u64,
    /// Keep running this long after the last command (s)
    #[clap(long, default_value_t = 5)]
    settle_s: u64,
    /// Simulate an absent steering servo
    #[clap(long)]
    no_servo: bool,
}

/// I2C bus that logs every write and acknowledges every known address.
struct LoggingBus {
    absent: Option<u8>,
}

impl ErrorType for LoggingBus {
    type Error = ErrorKind;
}

impl I2c for LoggingBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.absent == Some(address) {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => info!("i2c 0x{:02X} <- {:02X?}", address, bytes),
                Operation::Read(buf) => buf.fill(0),
            }
        }
        Ok(())
    }
}

type Controller = SystemController<LoggingBus>;

#[embassy_executor::task]
async fn slew_task(ctrl: Controller) -> ! {
    ctrl.slew_ch().await
}

#[embassy_executor::task]
async fn maneuver_task(ctrl: Controller) -> ! {
    ctrl.maneuver_ch().await
}

#[embassy_executor::task]
async fn stop_task(ctrl: Controller) -> ! {
    ctrl.stop_ch().await
}

fn load_config(opts: &Opts) -> ActuatorConfig {
    let mut config = match &opts.config {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                error!("invalid config {}: {}", path, e);
                ActuatorConfig::default()
            }),
            Err(e) => {
                error!("cannot read config {}: {}", path, e);
                ActuatorConfig::default()
            }
        },
        None => ActuatorConfig::default(),
    };
    if let Some(tick_ms) = opts.tick_ms {
        config.tick_ms = tick_ms;
    }
    config
}

fn parse_maneuver(text: &str) -> Option<ManeuverCommand> {
    let parsed = if text.trim_start().starts_with('{') {
        ManeuverCommand::from_json(text.as_bytes()).map_err(|e| warn!("bad maneuver JSON: {}", e))
    } else {
        ManeuverCommand::parse(text).map_err(|e| warn!("bad maneuver {:?}: {:?}", text, e))
    };
    parsed.ok()
}

#[embassy_executor::task]
async fn main_task(spawner: Spawner, opts: Opts) {
    let config = load_config(&opts);
    info!(?config, "actuator config");

    // I2C bus setup
    let absent = opts.no_servo.then_some(config.servo_address);
    static I2C_BUS: StaticCell<RefCell<LoggingBus>> = StaticCell::new();
    let i2c_bus = I2C_BUS.init(RefCell::new(LoggingBus { absent }));

    let mut actuators = Actuators::new(i2c_bus, config);
    if let Err(e) = actuators.init_devices() {
        warn!("actuator init incomplete, scanning instead: {:?}", e);
        actuators.scan_bus();
    }
    let shared = mk_static!(SharedActuators<'static, LoggingBus>, Mutex::new(actuators));

    let ctrl = SystemController::new(shared, config);
    spawner.spawn(slew_task(ctrl)).unwrap();
    spawner.spawn(maneuver_task(ctrl)).unwrap();
    spawner.spawn(stop_task(ctrl)).unwrap();

    for raw in &opts.commands {
        let _ = dispatch(raw.as_bytes(), &ACTUATOR_STATE);
        Timer::after_millis(opts.interval_ms).await;
    }
    for text in &opts.maneuvers {
        if let Some(cmd) = parse_maneuver(text) {
            MANEUVER_CHANNEL.send(cmd).await;
        }
        Timer::after_millis(opts.interval_ms).await;
    }

    Timer::after_secs(opts.settle_s).await;
    info!("done");
    std::process::exit(0);
}

static EXECUTOR: StaticCell<Executor> = StaticCell::new();

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let opts = Opts::parse();
    let executor = EXECUTOR.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(main_task(spawner, opts)).unwrap();
    });
}
