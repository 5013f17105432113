// Copyright (c) 2026 rezky_nightky

mod canvas;
mod cell;
mod config;
mod flake;
mod frame;
mod message;
mod palette;
mod runtime;
mod snow;
mod surface;
mod terminal;

use std::env;
use std::time::Instant;

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use rand::{rngs::StdRng, SeedableRng};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::canvas::Canvas;
use crate::config::{color_enabled_stdout, default_params_usage_for_help, Args};
use crate::frame::Frame;
use crate::palette::build_palette;
use crate::runtime::ColorMode;
use crate::snow::Snow;
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

fn default_to_ascii() -> bool {
    let lang = env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }

    ColorMode::Color16
}

fn install_signal_handlers() {
    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            log::warn!("failed to install Ctrl-C handler: {}", e);
        }
    }
}

fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));
    install_signal_handlers();

    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    let mut cmd = Args::command()
        .styles(clap_styles())
        .before_help(default_params_usage_for_help())
        .help_template(help_template);
    cmd.build();
    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        let sha = env!("SNOWFALL_GIT_SHA");
        if sha.is_empty() {
            println!("Build: {}", env!("SNOWFALL_BUILD"));
        } else {
            println!("Build: {} ({})", env!("SNOWFALL_BUILD"), sha);
        }
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    let settings = match args.settings() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let color_mode = settings.color_mode.unwrap_or_else(detect_color_mode_auto);
    let palette = build_palette(color_mode, settings.default_background);
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;
    let mut frame = Frame::new(w, h, palette.bg);

    let mut canvas = Canvas::new(
        w,
        h,
        settings.cell_width,
        settings.cell_height,
        default_to_ascii(),
        palette,
    );
    if let Some(msg) = &args.message {
        canvas.set_message(msg, !args.message_no_border);
    }

    let mut snow = Snow::new(settings.options, canvas, rng);
    snow.set_tick_interval(settings.tick_interval);

    let start_time = Instant::now();
    let mut end_time = settings.duration.map(|d| start_time + d);
    let mut next_tick = Some(start_time + snow.start(start_time));
    let mut next_frame = start_time;

    while let Some(tick_at) = next_tick {
        // sleep in the event poll until the next tick or redraw is due
        loop {
            let now = Instant::now();
            let mut due = tick_at.min(next_frame);
            if let Some(end) = end_time {
                due = due.min(end);
            }
            if now >= due {
                break;
            }
            if !Terminal::poll_event(due - now)? {
                continue;
            }

            match Terminal::read_event()? {
                Event::Resize(nw, nh) => {
                    snow.surface_mut().resize(nw, nh);
                    frame = Frame::new(nw, nh, snow.surface().palette().bg);
                }
                Event::Key(k) if k.kind == KeyEventKind::Press => {
                    let quit = args.screensaver
                        || matches!(k.code, KeyCode::Esc | KeyCode::Char('q'))
                        || (k.code == KeyCode::Char('c')
                            && k.modifiers.contains(KeyModifiers::CONTROL));
                    if quit {
                        snow.stop();
                    }
                }
                _ => {}
            }
        }

        let now = Instant::now();
        if end_time.is_some_and(|end| now >= end) {
            snow.stop();
            end_time = None;
        }

        if now >= tick_at {
            next_tick = snow.tick(now).map(|d| now + d);
        }

        if now >= next_frame {
            snow.surface_mut().render(&mut frame);
            if frame.has_changes() {
                term.draw(&mut frame)?;
            }
            next_frame += settings.frame_period;
            if next_frame < now {
                next_frame = now;
            }
        }
    }

    log::info!(
        "exiting after {:.1}s ({:?}): {} flakes in flight, {} pooled, spawn_rate={}",
        start_time.elapsed().as_secs_f64(),
        snow.state(),
        snow.active().len(),
        snow.pooled().len(),
        snow.options().spawn_rate
    );
    drop(term);

    Ok(())
}
