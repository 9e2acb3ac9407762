use env_logger::Builder;
use log::LevelFilter;
use pwgen::{run, usage, Invocation, PwError};

fn main() {
    let invocation = match Invocation::parse_from(std::env::args_os()) {
        Ok(invocation) => invocation,
        Err(e) => fail(&e),
    };
    let config = match invocation {
        Invocation::Help(text) => {
            print!("{text}");
            return;
        }
        Invocation::Generate(config) => config,
    };

    let mut builder = Builder::new();
    let level = if config.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Off
    };
    builder.filter_level(level);
    builder.init();

    if let Err(e) = run(&config) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn fail(e: &PwError) -> ! {
    eprintln!("error: {e}");
    eprintln!();
    eprint!("{}", usage());
    std::process::exit(1);
}
