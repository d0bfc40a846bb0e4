mod apps;
mod util;

use std::fs::File;
use std::process::ExitCode;

use ledgrid::Terminal;
use log::info;
use matrixos::Shell;
use simplelog::{Config, LevelFilter, WriteLogger};

use apps::clock::ClockApp;
use apps::launcher::{Launcher, Tile};
use apps::starfield::Starfield;
use apps::weather::WeatherApp;

struct Options {
    width: u16,
    height: u16,
    fps: u32,
}

impl Options {
    fn parse() -> Self {
        let mut options = Self {
            width: 64,
            height: 32,
            fps: 60,
        };
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            let value = args.next();
            match (arg.as_str(), value) {
                ("--width", Some(v)) => options.width = v.parse().unwrap_or(options.width),
                ("--height", Some(v)) => options.height = v.parse().unwrap_or(options.height),
                ("--fps", Some(v)) => options.fps = v.parse().unwrap_or(options.fps),
                (other, _) => {
                    eprintln!("unknown option: {other}");
                    eprintln!("usage: matrixos-shell [--width N] [--height N] [--fps N]");
                    std::process::exit(2);
                }
            }
        }
        options
    }
}

fn main() -> ExitCode {
    let options = Options::parse();

    let log_file = match File::create("matrixos-shell.log") {
        Ok(f) => f,
        Err(e) => {
            eprintln!("failed to create log file: {e}");
            return ExitCode::FAILURE;
        }
    };
    if WriteLogger::init(LevelFilter::Debug, Config::default(), log_file).is_err() {
        eprintln!("failed to initialize logger");
        return ExitCode::FAILURE;
    }

    println!("MatrixOS {}x{} @ {} fps", options.width, options.height, options.fps);
    println!("Arrows navigate, Enter launches, Home returns, Ctrl+C quits.");
    info!(
        "booting {}x{} @ {} fps",
        options.width, options.height, options.fps
    );

    let mut shell = Shell::new(options.width, options.height);
    shell.set_frame_rate(options.fps);

    let launcher = Launcher::new(vec![
        Tile::new("clock", "CLOCK", apps::clock::ICON),
        Tile::new("weather", "WEATHER", apps::weather::ICON),
        Tile::new("starfield", "STARS", apps::starfield::ICON),
    ]);
    let home = shell.register(launcher);
    shell.register(ClockApp::new());
    shell.register(WeatherApp::new());
    shell.register(Starfield::new(options.width, options.height));

    shell.set_home(home);
    shell.switch_to(home);

    let mut terminal = match Terminal::new() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("failed to initialize terminal: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = shell.run(&mut terminal);
    drop(terminal);

    match result {
        Ok(()) => {
            println!("MatrixOS shutdown.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
