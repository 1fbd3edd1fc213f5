use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use retropass_core::core_api::{Engine, Game};
use retropass_core::settings::{Settings, parse_int};
use retropass_render::{
    FieldSelection, TextRenderOptions, render_json, render_json_selected, render_selected,
    render_text,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(
        value_name = "metroid|kidicarus|mm2|sjetman",
        value_parser = parse_game
    )]
    game: Game,
    /// Password to decode; words are joined with single spaces. Omit for a
    /// blank password. Put `--` first if the password starts with `-`.
    #[arg(value_name = "PASSWORD")]
    password: Vec<String>,
    /// File of `field: value` lines applied after decoding.
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, i64)>,
    #[arg(long = "get", value_name = "FIELD", conflicts_with = "dump")]
    get: Vec<String>,
    /// Print every field after the password.
    #[arg(long)]
    dump: bool,
    #[arg(long)]
    json: bool,
    /// Load `{game}.tsv` and `{game}.tbl` from DIR instead of the bundled
    /// tables.
    #[arg(long = "data-dir", value_name = "DIR")]
    data_dir: Option<PathBuf>,
    #[arg(short, long, conflicts_with = "debug")]
    verbose: bool,
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let engine = match &cli.data_dir {
        Some(dir) => Engine::load_dir(dir),
        None => Engine::builtin(),
    }
    .unwrap_or_else(|e| {
        eprintln!("Error loading game tables: {e}");
        process::exit(1);
    });

    let text = (!cli.password.is_empty()).then(|| cli.password.join(" "));
    let mut password = engine
        .make_password(cli.game, text.as_deref())
        .unwrap_or_else(|e| {
            eprintln!("Error reading {} password: {e}", cli.game.title());
            process::exit(1);
        });
    info!(game = %cli.game, decoded = text.is_some(), "password ready");

    if let Some(path) = &cli.settings {
        let settings = Settings::load(path).unwrap_or_else(|e| {
            eprintln!("Error reading settings {}: {e}", path.display());
            process::exit(1);
        });
        settings.apply(&mut password).unwrap_or_else(|e| {
            eprintln!("Error applying settings {}: {e}", path.display());
            process::exit(1);
        });
    }
    for (field, value) in &cli.set {
        debug!(field, value, "applying --set");
        password.set(field, *value).unwrap_or_else(|e| {
            eprintln!("Error setting {field}: {e}");
            process::exit(1);
        });
    }

    let fields = FieldSelection::new(cli.get.iter().cloned());
    if cli.json {
        let json = if fields.is_any_selected() {
            render_json_selected(&password, &fields)
        } else {
            render_json(&password)
        }
        .unwrap_or_else(|e| {
            eprintln!("Error reading fields: {e}");
            process::exit(1);
        });
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        println!("{rendered}");
        return;
    }

    let rendered = if fields.is_any_selected() {
        render_selected(&password, &fields)
    } else {
        render_text(&password, TextRenderOptions { verbose: cli.dump })
    };
    match rendered {
        Ok(text) => print!("{text}"),
        Err(e) => {
            eprintln!("Error reading fields: {e}");
            process::exit(1);
        }
    }
}

fn init_logging(cli: &Cli) {
    let default = if cli.debug {
        "retropass=debug,retropass_core=debug"
    } else if cli.verbose {
        "retropass=info,retropass_core=info"
    } else {
        "warn"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

fn parse_game(value: &str) -> Result<Game, String> {
    value.parse().map_err(|_| {
        let ids: Vec<&str> = Game::ALL.iter().map(Game::id).collect();
        format!(
            "invalid game value '{value}', expected one of: {}",
            ids.join(", ")
        )
    })
}

fn parse_assignment(value: &str) -> Result<(String, i64), String> {
    let (field, raw) = value
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{value}'"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{value}'"));
    }
    let number = parse_int(raw).ok_or_else(|| format!("'{}' is not an integer", raw.trim()))?;
    Ok((field.to_string(), number))
}
