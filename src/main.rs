use argh::FromArgs;
use log::LevelFilter;
use pipesh::Interpreter;

#[derive(FromArgs)]
/// An interactive shell for pipelines of external programs.
struct Args {
    /// run a single command line and exit with its status
    #[argh(option, short = 'c')]
    command: Option<String>,

    /// log every interpretation step to stderr
    #[argh(switch, short = 'v')]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();
    init_logging(args.verbose);

    let mut shell = Interpreter::default();
    match args.command {
        Some(line) => {
            let code = shell.interpret_line(&line).unwrap_or_else(|err| {
                eprintln!("pipesh: {err}");
                1
            });
            std::process::exit(code)
        }
        None => shell.repl(),
    }
}
