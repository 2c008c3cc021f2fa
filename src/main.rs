use lectern::{
    cli::{Cli, Command},
    config::{Config, get_app_data_prefix},
    logging,
    models::RangeToken,
    reader::{
        NO_HIGHLIGHTS, ReadingSession,
        tts::{CommandSpeech, SpeechController},
    },
    state::State,
};

use clap::Parser;
use eyre::Result;
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = logging::level_for(cli.verbose, cli.debug);
    match get_app_data_prefix() {
        Ok(prefix) => {
            if let Err(err) = logging::init(level, &prefix.join("lectern.log")) {
                eprintln!("Warning: Could not set up logging: {}", err);
            }
        }
        Err(err) => eprintln!("Warning: {}", err),
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path.clone())?,
        None => Config::new()?,
    };

    match cli.command {
        Command::Highlights { source, json, copy } => list_highlights(&config, &source, json, copy),
        Command::Delete { source, range } => delete_highlight(&config, &source, &range),
        Command::Clear { source } => clear_highlights(&config, &source),
        Command::Speak { text } => speak(&config, &text.join(" ")),
        Command::Config { write } => show_config(&config, write),
    }
}

fn speech_engine(config: &Config) -> CommandSpeech {
    CommandSpeech::new(
        config.settings.preferred_tts_engine.clone(),
        config.settings.tts_engine_args.clone(),
    )
}

fn open_session(config: &Config, source: &str) -> Result<ReadingSession> {
    let state = State::open(&config.state_db_path()?)?;
    let session = ReadingSession::initialize(
        Some(source),
        Box::new(state),
        Box::new(speech_engine(config)),
        config.settings.reading_settings(),
    )?
    .with_font_step(config.settings.font_size_step);
    Ok(session)
}

fn list_highlights(config: &Config, source: &str, json: bool, copy: bool) -> Result<()> {
    let session = open_session(config, source)?;
    let highlights = session.highlights();

    if json {
        println!("{}", serde_json::to_string_pretty(highlights)?);
    } else if highlights.is_empty() {
        println!("{}", NO_HIGHLIGHTS);
    } else {
        for (i, highlight) in highlights.iter().enumerate() {
            println!("{}. {}", i + 1, highlight.text);
            println!("   {}", highlight.cfi_range);
        }
    }

    if copy && !highlights.is_empty() {
        let text = highlights
            .iter()
            .map(|highlight| highlight.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        arboard::Clipboard::new()?.set_text(text)?;
        eprintln!("Copied {} highlights to clipboard", highlights.len());
    }
    Ok(())
}

fn delete_highlight(config: &Config, source: &str, range: &str) -> Result<()> {
    let mut session = open_session(config, source)?;
    if session.delete_highlight(&RangeToken::new(range))? {
        println!("Deleted highlight {}", range);
    } else {
        println!("No highlight for {}", range);
    }
    Ok(())
}

fn clear_highlights(config: &Config, source: &str) -> Result<()> {
    let mut session = open_session(config, source)?;
    let count = session.highlights().len();
    session.clear_highlights()?;
    println!("Removed {} highlights", count);
    Ok(())
}

fn speak(config: &Config, text: &str) -> Result<()> {
    let mut speech = SpeechController::new(Box::new(speech_engine(config)));
    if !speech.speak(text)? {
        return Ok(());
    }
    while speech.is_speaking() {
        speech.pump();
        std::thread::sleep(Duration::from_millis(50));
    }
    Ok(())
}

fn show_config(config: &Config, write: bool) -> Result<()> {
    if write {
        config.save()?;
        eprintln!("Saved configuration to {}", config.filepath().display());
    }
    println!("config: {}", config.filepath().display());
    println!("state: {}", config.state_db_path()?.display());
    println!("{}", serde_json::to_string_pretty(&config.settings)?);
    Ok(())
}
