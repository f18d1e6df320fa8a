use std::{collections::HashMap, error::Error, thread};

use chime_clock::{
    communication::{Message, MessageType},
    config::Config,
    registry::{AlarmDraft, AlarmId, Registry, Repeat},
    sound::{playback_source, SoundRef},
    store, ChimeClock,
};
use chrono::NaiveTime;
use clap::{command, Parser, Subcommand, ValueEnum};
use eframe::{egui::ViewportBuilder, run_native};
use rodio::{Sink, Source};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// write a default config file
    Init {
        #[clap(long, short)]
        force: bool,
    },
    /// add an alarm without opening the gui
    Add {
        /// alarm time, "HH:MM"
        time: String,
        #[clap(long, short, default_value = "")]
        label: String,
        #[clap(long, short, value_enum, default_value_t = RepeatArg::Once)]
        repeat: RepeatArg,
    },
    /// print the stored alarms
    List,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RepeatArg {
    Once,
    Daily,
    Weekdays,
}

impl From<RepeatArg> for Repeat {
    fn from(repeat: RepeatArg) -> Self {
        match repeat {
            RepeatArg::Once => Self::Once,
            RepeatArg::Daily => Self::Daily,
            RepeatArg::Weekdays => Self::Weekdays,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // initialize the logger
    simple_file_logger::init_logger!("chime_clock").expect("couldn't initialize logger");

    let args = Args::parse();
    match args.command {
        Some(Command::Init { force }) => {
            if force || !Config::is_config_present() {
                Config::new().save(&Config::config_path())?;
                println!("wrote {}", Config::config_path().display());
            }
            return Ok(());
        }
        Some(Command::Add {
            time,
            label,
            repeat,
        }) => {
            let time = NaiveTime::parse_from_str(&time, "%H:%M")
                .map_err(|err| format!("invalid time {time:?} (expected HH:MM): {err}"))?;
            let config = Config::load(&Config::config_path());
            let store_path = store::store_path();
            let mut registry = Registry::from_alarms(store::load(&store_path));
            let id = registry.add(AlarmDraft {
                time,
                label,
                repeat: repeat.into(),
                sound: SoundRef::default(),
                volume: config.default_volume,
            });
            store::save(&store_path, registry.alarms())?;
            println!("added alarm {id} at {}", time.format("%H:%M"));
            return Ok(());
        }
        Some(Command::List) => {
            let registry = Registry::from_alarms(store::load(&store::store_path()));
            for alarm in registry.alarms() {
                println!(
                    "{:>3}  {}  {:9}  {}  {}",
                    alarm.id,
                    alarm.time.format("%H:%M"),
                    alarm.repeat.to_string(),
                    if alarm.enabled { "on " } else { "off" },
                    alarm.label,
                );
            }
            return Ok(());
        }
        None => {}
    }

    // the audio worker owns the output stream and one sink per ringing id
    let (tx, rx) = std::sync::mpsc::channel();
    thread::spawn(move || {
        let stream_handle = match rodio::OutputStreamBuilder::open_default_stream() {
            Ok(stream_handle) => stream_handle,
            Err(err) => {
                // alarms still present visually, they just can't make noise
                log::error!("no audio output available: {err}");
                for _ in rx {}
                return;
            }
        };
        let mut ringing: HashMap<AlarmId, Sink> = HashMap::new();
        for Message { kind, alarm_id } in rx {
            match kind {
                MessageType::Ring { source, volume } => {
                    log::info!("alarm {alarm_id} ringing at volume {volume}");
                    let sink = Sink::connect_new(stream_handle.mixer());
                    sink.set_volume(volume);
                    sink.append(playback_source(&source).repeat_infinite());
                    sink.play();
                    // replacing a sink on the same id drops, and so stops,
                    // the old one
                    ringing.insert(alarm_id, sink);
                }
                MessageType::Stop => {
                    if let Some(sink) = ringing.remove(&alarm_id) {
                        log::info!("alarm {alarm_id} stopped");
                        sink.stop();
                    }
                }
            }
        }
    });

    // make app transparent
    let native_options = eframe::NativeOptions {
        viewport: ViewportBuilder {
            transparent: Some(true),
            ..Default::default()
        },
        ..Default::default()
    };
    run_native(
        "Chime Clock",
        native_options,
        Box::new(|_| Ok(Box::new(ChimeClock::new(tx)))),
    )
    .map_err(|e| e.into())
}
