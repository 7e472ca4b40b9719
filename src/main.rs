// Copyright (c) 2026 rezky_nightky

mod cell;
mod charset;
mod color;
mod config;
mod control;
mod driver;
mod effects;
mod error;
mod frame;
mod input;
mod logging;
mod particle;
mod runtime;
mod settings;
mod terminal;

use std::env;

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, print_list_charsets, print_list_effects,
    Args,
};
use crate::control::{CancelToken, ResizeListener};
use crate::driver::DriverOptions;
use crate::effects::{build_effect, EffectKind};
use crate::error::Result;
use crate::runtime::detect_color_mode_auto;
use crate::settings::Settings;
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

fn build_info() -> &'static str {
    env!("CELLSAVER_BUILD")
}

fn git_sha() -> &'static str {
    env!("CELLSAVER_GIT_SHA")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn parse_args() -> Args {
    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd.build();

    let matches = cmd.get_matches();
    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

/// Signals end the run through the token so the terminal is restored on the
/// normal path.
fn install_signal_handlers(token: &CancelToken) {
    #[cfg(unix)]
    {
        match Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            Ok(mut signals) => {
                let token = token.clone();
                thread::spawn(move || {
                    if let Some(sig) = signals.forever().next() {
                        tracing::info!(signal = sig, "signal received, stopping");
                        token.cancel();
                    }
                });
            }
            Err(e) => tracing::warn!(error = %e, "failed to install signal handlers"),
        }
    }

    #[cfg(windows)]
    {
        let token = token.clone();
        if let Err(e) = ctrlc::set_handler(move || token.cancel()) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }
}

fn print_bitcolor(args: &Args) -> Result<()> {
    let colorterm = env::var("COLORTERM").unwrap_or_default();
    let term = env::var("TERM").unwrap_or_default();
    let auto = detect_color_mode_auto();
    let effective = args.color_mode()?;

    println!("BITCOLOR CHECK:");
    println!(
        "  COLORTERM: {}",
        if colorterm.is_empty() {
            "(unset)"
        } else {
            &colorterm
        }
    );
    println!(
        "  TERM: {}",
        if term.is_empty() { "(unset)" } else { &term }
    );
    println!("  auto_detected: {}", auto.label());
    if args.colormode.is_some() {
        println!("  forced: {}", effective.label());
    }
    println!("  effective: {}", effective.label());
    Ok(())
}

fn print_info() {
    println!("Version: v{}", env!("CARGO_PKG_VERSION"));
    if git_sha().is_empty() {
        println!("Build: {}", build_info());
    } else {
        println!("Build: {} ({})", build_info(), git_sha());
    }
    println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
    println!("License: {}", env!("CARGO_PKG_LICENSE"));
    println!("Settings: {}", Settings::config_path().display());
}

fn run(args: Args) -> Result<()> {
    if args.list_effects {
        print_list_effects();
        return Ok(());
    }
    if args.list_charsets {
        print_list_charsets();
        return Ok(());
    }
    if args.check_bitcolor {
        return print_bitcolor(&args);
    }
    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if args.info {
        print_info();
        return Ok(());
    }

    logging::init(args.log_file.as_deref())?;

    // Everything that can fail on bad input is checked before the screen is taken over.
    let kind = EffectKind::parse(&args.effect)?;
    let color_mode = args.color_mode()?;
    let duration = args.duration_limit()?;
    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply_overrides(kind, &mut settings)?;
    let mut effect = build_effect(kind, &settings)?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let token = CancelToken::new();
    install_signal_handlers(&token);

    let mut term = Terminal::new()?;
    let (w, h) = Terminal::size()?;
    let resize = ResizeListener::new(w, h);
    let input = input::spawn(token.clone(), resize.clone(), args.screensaver);

    let opts = DriverOptions {
        duration,
        max_frames: args.max_frames,
        background: None,
    };
    let result = driver::run(
        effect.as_mut(),
        &mut term,
        &mut rng,
        color_mode,
        &token,
        &resize,
        &opts,
    );

    token.cancel();
    if input.join().is_err() {
        tracing::warn!("input thread panicked");
    }
    drop(term);
    result.map(|_| ())
}

fn main() {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    let args = parse_args();
    if let Err(e) = run(args) {
        tracing::error!(error = %e, "exiting with error");
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
