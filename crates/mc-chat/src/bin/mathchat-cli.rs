#![forbid(unsafe_code)]

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use mc_chat::{ChatEngine, Transcript, UserContext};
use mc_eval::calculator_help;

#[derive(Debug, Clone)]
struct CliArgs {
    message: Option<String>,
    name: Option<String>,
    export_transcript: Option<PathBuf>,
    show_help_text: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("mathchat-cli error: {error}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;

    if args.show_help_text {
        println!("{}", calculator_help());
        return Ok(());
    }

    let engine = ChatEngine::new();
    let context = match args.name.as_deref() {
        Some(name) => UserContext::named(name),
        None => UserContext::default(),
    };

    if let Some(message) = args.message.as_deref() {
        let reply = engine.respond(message, &context);
        println!("{}", reply.text);
        return Ok(());
    }

    interactive_loop(&engine, &context, args.export_transcript.as_deref())
}

fn interactive_loop(
    engine: &ChatEngine,
    context: &UserContext,
    export_path: Option<&std::path::Path>,
) -> Result<(), String> {
    println!("mathchat — type a message or a math expression ('quit' to exit)");

    let mut transcript = Transcript::new(&context.display_name);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{}: ", context.display_name);
        stdout.flush().map_err(|error| error.to_string())?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|error| error.to_string())?;
        if read == 0 {
            break; // EOF
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if matches!(message.to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }

        let reply = engine.respond(message, context);
        println!("bot: {}", reply.text);
        transcript
            .record(message, &reply.text)
            .map_err(|error| error.to_string())?;
    }

    if let Some(path) = export_path {
        let json = transcript.export_json().map_err(|error| error.to_string())?;
        std::fs::write(path, json).map_err(|error| error.to_string())?;
        println!("transcript written to {}", path.display());
    }

    Ok(())
}

fn parse_args() -> Result<CliArgs, String> {
    let mut message = None;
    let mut name = None;
    let mut export_transcript = None;
    let mut show_help_text = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--message" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--message requires a text argument".to_owned())?;
                message = Some(value);
            }
            "--name" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--name requires a display name".to_owned())?;
                name = Some(value);
            }
            "--export-transcript" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--export-transcript requires a path".to_owned())?;
                export_transcript = Some(PathBuf::from(value));
            }
            "--show-help-text" => {
                show_help_text = true;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    Ok(CliArgs {
        message,
        name,
        export_transcript,
        show_help_text,
    })
}

fn print_help() {
    println!(
        "mathchat-cli\n\
         Usage:\n\
         \tmathchat-cli [--name <display name>] [--message <text>] [--export-transcript <path>]\n\
         Options:\n\
         \t--message <text>             answer a single message and exit\n\
         \t--name <display name>        personalize replies (default: there)\n\
         \t--export-transcript <path>   on exit, write the session transcript as JSON\n\
         \t--show-help-text             print the calculator reference card and exit\n\
         \t-h, --help                   show this help"
    );
}
