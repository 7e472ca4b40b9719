// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::effects::EffectKind;
use crate::error::{Result, SaverError};
use crate::runtime::{detect_color_mode_auto, ColorMode};
use crate::settings::{Settings, MAX_DELAY_MS};

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  cellsaver --effect colorbleed --duration 0 --screensaver";

const MIN_DURATION_S: f64 = 0.1;
const MAX_DURATION_S: f64 = 86_400.0;

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn heading(text: &str) -> String {
    if color_enabled_stdout() {
        format!("\x1b[1;36m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

fn note(text: &str) -> String {
    if color_enabled_stdout() {
        format!("\x1b[2m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

pub fn default_params_usage_for_help() -> String {
    match DEFAULT_PARAMS_USAGE.split_once('\n') {
        Some((title, rest)) => format!("{}\n{}", heading(title), rest),
        None => DEFAULT_PARAMS_USAGE.to_string(),
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "cellsaver", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'e',
        long = "effect",
        default_value = "colorbleed",
        help_heading = "GENERAL",
        help = "Effect to run (see --list-effects)"
    )]
    pub effect: String,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "max-frames",
        help_heading = "GENERAL",
        help = "Stop after N frames"
    )]
    pub max_frames: Option<u64>,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Seed the random generator for a repeatable run"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "config",
        value_name = "PATH",
        help_heading = "SETTINGS",
        help = "Settings file (default: <config dir>/cellsaver/config.toml)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long = "delay",
        value_name = "MS",
        help_heading = "SETTINGS",
        help = "Override the frame delay of the selected effect (max 60000)"
    )]
    pub delay: Option<u64>,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "log-file",
        value_name = "PATH",
        help_heading = "DIAGNOSTICS",
        help = "Append logs to PATH (filter with CELLSAVER_LOG, default info)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "list-effects",
        help_heading = "HELP",
        help = "List available effects and exit"
    )]
    pub list_effects: bool,

    #[arg(
        long = "list-charsets",
        help_heading = "HELP",
        help = "List glyph sets for matrix_bleed.charset and exit"
    )]
    pub list_charsets: bool,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

impl Args {
    pub fn color_mode(&self) -> Result<ColorMode> {
        match self.colormode {
            Some(v) => ColorMode::from_flag(v),
            None => Ok(detect_color_mode_auto()),
        }
    }

    pub fn duration_limit(&self) -> Result<Option<Duration>> {
        duration_limit(self.duration)
    }

    /// Applies `--delay` to the selected effect's settings.
    pub fn apply_overrides(&self, kind: EffectKind, settings: &mut Settings) -> Result<()> {
        if let Some(ms) = self.delay {
            if ms > MAX_DELAY_MS as u64 {
                return Err(SaverError::InvalidArgument {
                    name: "--delay",
                    value: ms.to_string(),
                    reason: "min 0 max 60000",
                });
            }
            settings.override_delay(kind, ms as i64);
        }
        Ok(())
    }
}

fn duration_limit(secs: Option<f64>) -> Result<Option<Duration>> {
    let Some(s) = secs else {
        return Ok(None);
    };
    if !s.is_finite() {
        return Err(SaverError::InvalidArgument {
            name: "--duration",
            value: s.to_string(),
            reason: "must be a finite number",
        });
    }
    if s <= 0.0 {
        return Ok(None);
    }
    if !(MIN_DURATION_S..=MAX_DURATION_S).contains(&s) {
        return Err(SaverError::InvalidArgument {
            name: "--duration",
            value: s.to_string(),
            reason: "min 0.1 max 86400",
        });
    }
    Ok(Some(Duration::from_secs_f64(s)))
}

pub fn print_list_effects() {
    println!("{}", heading("AVAILABLE EFFECTS:"));
    println!("{}", note("NOTE: Use only the VALUE (left side) with --effect."));
    println!();
    println!("VALUE          DESCRIPTION");
    for kind in EffectKind::ALL {
        println!("{:<14} {}", kind.name(), kind.description());
    }
}

pub fn print_list_charsets() {
    println!("{}", heading("AVAILABLE GLYPH SETS:"));
    println!("{}", note("NOTE: Set one as charset under [matrix_bleed]."));
    println!();
    println!("VALUE        DESCRIPTION");
    println!("auto         Auto-select (ascii when non-UTF, otherwise matrix)");
    println!("matrix       Letters + digits + katakana");
    println!("ascii        Printable ASCII without space");
    println!("letters      Letters only (alias: english)");
    println!("digits       Digits only (aliases: dec, decimal)");
    println!("binary       0 and 1 (aliases: bin, 01)");
    println!("hex          0-9 and A-F (alias: hexadecimal)");
    println!("katakana     Half-width katakana");
    println!("blocks       Block elements");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("cellsaver").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let args = parse(&[]);
        assert_eq!(args.effect, "colorbleed");
        assert!(!args.screensaver);
        assert!(args.config.is_none());
        assert_eq!(args.duration_limit().unwrap(), None);
    }

    #[test]
    fn forced_color_mode_wins() {
        let args = parse(&["--colormode", "16"]);
        assert_eq!(args.color_mode().unwrap(), ColorMode::Color16);
        let args = parse(&["--colormode", "7"]);
        assert!(matches!(
            args.color_mode(),
            Err(SaverError::InvalidColorMode(7))
        ));
    }

    #[test]
    fn duration_bounds() {
        assert_eq!(duration_limit(Some(0.0)).unwrap(), None);
        assert_eq!(duration_limit(Some(-3.0)).unwrap(), None);
        assert_eq!(
            duration_limit(Some(1.5)).unwrap(),
            Some(Duration::from_millis(1500))
        );
        assert!(duration_limit(Some(0.05)).is_err());
        assert!(duration_limit(Some(f64::NAN)).is_err());
        assert!(duration_limit(Some(90_000.0)).is_err());
    }

    #[test]
    fn delay_override_targets_the_selected_effect() {
        let args = parse(&["-e", "ramp", "--delay", "75"]);
        let mut settings = Settings::default();
        args.apply_overrides(EffectKind::Ramp, &mut settings).unwrap();
        assert_eq!(settings.ramp.delay_ms, 75);
        assert_eq!(
            settings.color_bleed.delay_ms,
            Settings::default().color_bleed.delay_ms
        );

        let args = parse(&["--delay", "60001"]);
        assert!(args
            .apply_overrides(EffectKind::ColorBleed, &mut settings)
            .is_err());
    }
}
