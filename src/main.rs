use clap::Parser;
use crossbeam::channel::{unbounded, Receiver};
use dialoguer::Select;
use gridsyncrs::{
    cli::{handle_device_list, validate_device, Args},
    config::{Settings, SettingsStore},
    console::run_console,
    engine::{Engine, SharedEngine},
    event_loop::{EngineMessage, EventLoop},
    logging::{self, LogTarget},
    midi::{run_midi_input, DefaultMidiEngine, PortSelector},
    timing::MonotonicClock,
    ui::run_status_display,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::{thread, time::Duration};

fn main() {
    let args = Args::parse();
    initialize_logging(&args);
    let devices = handle_device_list();

    if args.device_list {
        list_available_devices(&devices);
        return;
    }

    let settings = load_settings(&args);
    let selector = choose_port(&args, &settings, &devices);

    let wall = Arc::new(MonotonicClock::new());
    let reference = Arc::new(MonotonicClock::new());

    let engine = match Engine::new(settings.clone(), wall.clone(), reference) {
        Ok(engine) => engine.into_shared(),
        Err(e) => exit_with_error(&format!("Invalid settings: {}", e)),
    };

    let midi_engine = match DefaultMidiEngine::connect(&selector, wall) {
        Ok(midi_engine) => midi_engine,
        Err(e) => exit_with_error(&format!("Error connecting to MIDI device: {}", e)),
    };
    log::info!("Listening on MIDI input: {}", midi_engine.port_name());
    println!("Listening on MIDI input: {}", midi_engine.port_name());

    let mut store = SettingsStore::new(settings, args.config.clone());
    let settings_rx = store.subscribe();
    let (message_tx, message_rx) = unbounded();
    let running = Arc::new(AtomicBool::new(true));

    run_midi_input(midi_engine, message_tx.clone());

    let console_running = running.clone();
    thread::spawn(move || run_console(store, message_tx, console_running));

    if !args.no_status {
        let display_engine = engine.clone();
        let display_running = running.clone();
        thread::spawn(move || run_status_display(display_engine, display_running));
    }

    start_event_loop(engine, message_rx, settings_rx);
    run_application_loop(&running);
}

fn initialize_logging(args: &Args) {
    let target = if args.log_stderr {
        LogTarget::Stderr
    } else {
        LogTarget::File
    };
    if let Err(e) = logging::init_logger(target) {
        eprintln!("Logger initialization failed: {}", e);
    }
    log::info!("Application starting");
}

fn list_available_devices(devices: &[String]) {
    println!("Available MIDI input devices:");
    for (index, device) in devices.iter().enumerate() {
        println!("  {}: {}", index, device);
    }
}

fn load_settings(args: &Args) -> Settings {
    let mut settings = match Settings::load(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => exit_with_error(&e.to_string()),
    };
    args.apply_overrides(&mut settings);
    if let Err(e) = settings.validate() {
        exit_with_error(&format!("Invalid settings: {}", e));
    }
    settings
}

fn choose_port(args: &Args, settings: &Settings, devices: &[String]) -> PortSelector {
    if let Some(device_name) = &args.bind_to_device {
        if let Err(error_msg) = validate_device(device_name, devices) {
            exit_with_error(&error_msg);
        }
        return PortSelector::Name(device_name.clone());
    }

    if args.select && !devices.is_empty() {
        match Select::new()
            .with_prompt("Select MIDI input")
            .items(devices)
            .default(settings.midi_index.min(devices.len() - 1))
            .interact()
        {
            Ok(index) => return PortSelector::Index(index),
            Err(e) => exit_with_error(&format!("Device selection failed: {}", e)),
        }
    }

    PortSelector::Index(settings.midi_index)
}

fn start_event_loop(
    engine: SharedEngine,
    message_rx: Receiver<EngineMessage>,
    settings_rx: Receiver<Settings>,
) {
    thread::spawn(move || {
        let mut event_loop = EventLoop::new(engine, message_rx, Some(settings_rx));
        event_loop.run();
    });
}

fn run_application_loop(running: &AtomicBool) {
    log::info!("Application running. Type 'quit' or press Ctrl+C to exit...");
    println!("\nCommands: set <key> <value> | reset | show | quit");
    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(100));
    }
    log::info!("Application exiting");
}

fn exit_with_error(error_msg: &str) -> ! {
    log::error!("{}", error_msg);
    eprintln!("{}", error_msg);
    std::process::exit(1);
}
