// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::runtime::ColorMode;
use crate::snow::{PartialOptions, SnowOptions};

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  snowfall --spawn-rate 1 --wind-angle 0 --wind-force 0.5 --max-flakes 10000 --fps 60 --tick-ms 1 --cell-width 8 --cell-height 16 --color-bg black";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("failed to apply {name} {value} (must be a finite number)")]
    NotFinite { name: &'static str, value: f64 },

    #[error("failed to apply {name} {value} (min {min} max {max})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid --colormode: {0} (allowed: 0,16,8,256,24,32)")]
    InvalidColorMode(u16),
}

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

pub fn default_params_usage_for_help() -> String {
    if !color_enabled_stdout() {
        return DEFAULT_PARAMS_USAGE.to_string();
    }
    match DEFAULT_PARAMS_USAGE.split_once('\n') {
        Some((heading, rest)) => format!("\x1b[1;36m{}\x1b[0m\n{}", heading, rest),
        None => DEFAULT_PARAMS_USAGE.to_string(),
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
    #[value(name = "transparent")]
    Transparent,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "snowfall", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'r',
        long = "spawn-rate",
        help_heading = "SNOW",
        help = "Flakes per second (default 1; 100 is a blizzard)"
    )]
    pub spawn_rate: Option<f64>,

    #[arg(
        long = "wind-angle",
        allow_negative_numbers = true,
        help_heading = "SNOW",
        help = "Wind direction in radians, 0 is straight down (default 0)"
    )]
    pub wind_angle: Option<f64>,

    #[arg(
        long = "wind-force",
        help_heading = "SNOW",
        help = "Wind force, 0.5 normal, 1 gale (default 0.5)"
    )]
    pub wind_force: Option<f64>,

    #[arg(
        long = "lifetime",
        help_heading = "SNOW",
        help = "Seconds before a flake melts (default: never)"
    )]
    pub lifetime: Option<f64>,

    #[arg(
        long = "max-flakes",
        default_value_t = 10_000,
        help_heading = "PERFORMANCE",
        help = "Upper bound on falling flakes (min 1 max 100000)"
    )]
    pub max_flakes: usize,

    #[arg(
        long = "seed",
        help_heading = "SNOW",
        help = "Random seed for a reproducible snowfall"
    )]
    pub seed: Option<u64>,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target redraws per second (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "tick-ms",
        default_value_t = 1,
        help_heading = "PERFORMANCE",
        help = "Delay between simulation ticks in ms (min 1 max 1000)"
    )]
    pub tick_ms: u64,

    #[arg(
        long = "duration",
        allow_negative_numbers = true,
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on any keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        short = 'm',
        long = "message",
        help_heading = "GENERAL",
        help = "Text shown in front of the snow"
    )]
    pub message: Option<String>,

    #[arg(
        long = "message-no-border",
        help_heading = "GENERAL",
        help = "Draw the message without a border"
    )]
    pub message_no_border: bool,

    #[arg(
        long = "cell-width",
        default_value_t = 8.0,
        help_heading = "APPEARANCE",
        help = "Pixels per terminal column (min 1 max 64)"
    )]
    pub cell_width: f64,

    #[arg(
        long = "cell-height",
        default_value_t = 16.0,
        help_heading = "APPEARANCE",
        help = "Pixels per terminal row (min 1 max 64)"
    )]
    pub cell_height: f64,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Black,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (black, default-background, transparent)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: detected from COLORTERM/TERM"
    )]
    pub colormode: Option<u16>,

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

/// Validated run settings.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub options: SnowOptions,
    pub frame_period: Duration,
    pub tick_interval: Duration,
    pub duration: Option<Duration>,
    pub cell_width: f64,
    pub cell_height: f64,
    pub color_mode: Option<ColorMode>,
    pub default_background: bool,
}

fn require_range(name: &'static str, v: f64, min: f64, max: f64) -> Result<f64, ConfigError> {
    if !v.is_finite() {
        return Err(ConfigError::NotFinite { name, value: v });
    }
    if v < min || v > max {
        return Err(ConfigError::OutOfRange {
            name,
            value: v,
            min,
            max,
        });
    }
    Ok(v)
}

pub fn parse_color_mode(v: u16) -> Result<ColorMode, ConfigError> {
    match v {
        0 => Ok(ColorMode::Mono),
        16 => Ok(ColorMode::Color16),
        8 | 256 => Ok(ColorMode::Color256),
        24 | 32 => Ok(ColorMode::TrueColor),
        other => Err(ConfigError::InvalidColorMode(other)),
    }
}

impl Args {
    /// Snow options as given; unusable values fall back to defaults.
    pub fn snow_options(&self) -> SnowOptions {
        PartialOptions {
            spawn_rate: self.spawn_rate,
            wind_angle: self.wind_angle,
            wind_force: self.wind_force,
            lifetime: self.lifetime,
            max_flakes: Some(self.max_flakes),
        }
        .resolve()
    }

    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let fps = require_range("--fps", self.fps, 1.0, 240.0)?;
        let tick_ms = require_range("--tick-ms", self.tick_ms as f64, 1.0, 1000.0)?;
        require_range("--max-flakes", self.max_flakes as f64, 1.0, 100_000.0)?;
        let cell_width = require_range("--cell-width", self.cell_width, 1.0, 64.0)?;
        let cell_height = require_range("--cell-height", self.cell_height, 1.0, 64.0)?;

        let duration = match self.duration {
            Some(s) if !s.is_finite() => {
                return Err(ConfigError::NotFinite {
                    name: "--duration",
                    value: s,
                })
            }
            Some(s) if s > 0.0 => Some(Duration::from_secs_f64(require_range(
                "--duration",
                s,
                0.1,
                86400.0,
            )?)),
            _ => None,
        };

        let color_mode = self.colormode.map(parse_color_mode).transpose()?;

        Ok(Settings {
            options: self.snow_options(),
            frame_period: Duration::from_secs_f64(1.0 / fps),
            tick_interval: Duration::from_millis(tick_ms as u64),
            duration,
            cell_width,
            cell_height,
            color_mode,
            default_background: matches!(
                self.color_bg,
                ColorBg::DefaultBackground | ColorBg::Transparent
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        let mut full = vec!["snowfall"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn defaults_resolve_to_default_snow() {
        let s = parse(&[]).settings().unwrap();
        assert_eq!(s.options, SnowOptions::default());
        assert_eq!(s.tick_interval, Duration::from_millis(1));
        assert_eq!(s.duration, None);
        assert_eq!(s.color_mode, None);
        assert!(!s.default_background);
    }

    #[test]
    fn snow_flags_reach_the_options() {
        let s = parse(&[
            "-r",
            "20",
            "--wind-angle",
            "-1.5",
            "--wind-force",
            "1",
            "--lifetime",
            "4",
        ])
        .settings()
        .unwrap();
        assert_eq!(s.options.spawn_rate, 20.0);
        assert_eq!(s.options.wind_angle, -1.5);
        assert_eq!(s.options.wind_force, 1.0);
        assert_eq!(s.options.lifetime, Some(4.0));
    }

    #[test]
    fn out_of_range_fps_is_rejected() {
        let err = parse(&["--fps", "500"]).settings().unwrap_err();
        assert_eq!(
            err,
            ConfigError::OutOfRange {
                name: "--fps",
                value: 500.0,
                min: 1.0,
                max: 240.0
            }
        );
        assert_eq!(err.to_string(), "failed to apply --fps 500 (min 1 max 240)");
    }

    #[test]
    fn non_positive_duration_disables_it() {
        let s = parse(&["--duration", "0"]).settings().unwrap();
        assert_eq!(s.duration, None);
        let s = parse(&["--duration", "-3"]).settings().unwrap();
        assert_eq!(s.duration, None);
        let s = parse(&["--duration", "2.5"]).settings().unwrap();
        assert_eq!(s.duration, Some(Duration::from_millis(2500)));
        assert!(parse(&["--duration", "0.01"]).settings().is_err());
    }

    #[test]
    fn color_modes_accept_aliases() {
        assert_eq!(parse_color_mode(256), Ok(ColorMode::Color256));
        assert_eq!(parse_color_mode(32), Ok(ColorMode::TrueColor));
        assert_eq!(parse_color_mode(7), Err(ConfigError::InvalidColorMode(7)));
        assert!(parse(&["--colormode", "3"]).settings().is_err());
    }
}
