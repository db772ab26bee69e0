use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::{Attribute, Color as CtColor, Stylize};
use unicode_width::UnicodeWidthStr;

pub fn get_styles() -> Styles {
    clap::builder::Styles::styled()
        .usage(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .header(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .literal(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .invalid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .valid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

pub mod colors {
    use crossterm::style::Color;

    pub const TEAL: Color = Color::Rgb {
        r: 0,
        g: 188,
        b: 212,
    };
    pub const LAVENDER: Color = Color::Rgb {
        r: 179,
        g: 157,
        b: 219,
    };
    pub const GREEN: Color = Color::Rgb {
        r: 76,
        g: 175,
        b: 80,
    };
    pub const ORANGE: Color = Color::Rgb {
        r: 255,
        g: 152,
        b: 0,
    };
    pub const RED: Color = Color::Rgb {
        r: 244,
        g: 67,
        b: 54,
    };
    pub const DIM: Color = Color::Rgb {
        r: 128,
        g: 128,
        b: 128,
    };
    pub const WHITE: Color = Color::Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
}

const SECTION_WIDTH: usize = 60;

/// Parses a `#RRGGBB` color, as used for emotions and band states.
pub fn hex_color(hex: &str) -> Option<CtColor> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(CtColor::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

pub fn print_success(message: &str) {
    println!(
        " {} {}",
        "✓".with(colors::GREEN).bold(),
        message.with(colors::GREEN)
    );
}

pub fn print_error(message: &str) {
    println!(
        " {} {}",
        "✗".with(colors::RED).bold(),
        message.with(colors::RED)
    );
}

pub fn print_warning(message: &str) {
    println!(
        " {} {}",
        "⚠".with(colors::ORANGE).bold(),
        message.with(colors::ORANGE)
    );
}

pub fn print_section_header(title: &str) {
    let title_len = title.width();
    let padding = SECTION_WIDTH.saturating_sub(title_len + 4) / 2;

    println!();
    print!("{}", "╭".with(colors::TEAL));
    print!("{}", "─".repeat(padding).with(colors::TEAL));
    print!(
        " {} ",
        title.with(colors::TEAL).bold().attribute(Attribute::Italic)
    );
    print!(
        "{}",
        "─".repeat(SECTION_WIDTH.saturating_sub(title_len + 4 + padding))
            .with(colors::TEAL)
    );
    println!("{}", "╮".with(colors::TEAL));
}

pub fn print_section_footer() {
    print!("{}", "╰".with(colors::TEAL));
    print!("{}", "─".repeat(SECTION_WIDTH).with(colors::TEAL));
    println!("{}", "╯".with(colors::TEAL));
    println!();
}

pub fn print_key_value(key: &str, value: &str) {
    println!(
        "  {} {} {}",
        "●".with(colors::LAVENDER),
        format!("{}:", key).with(colors::DIM),
        value.with(colors::WHITE)
    );
}

/// Key/value line whose value is painted with a `#RRGGBB` color.
pub fn print_key_value_colored(key: &str, value: &str, hex: &str) {
    let color = hex_color(hex).unwrap_or(colors::WHITE);
    println!(
        "  {} {} {}",
        "◆".with(color),
        format!("{}:", key).with(colors::TEAL).bold(),
        value.with(color).bold()
    );
}

pub fn print_list_item(item: &str, indent: usize) {
    let indent_str = "  ".repeat(indent);
    println!(
        "{}{}  {}",
        indent_str,
        "▶".with(colors::TEAL),
        item.with(colors::WHITE)
    );
}

pub fn print_empty_list(message: &str) {
    println!(
        "  {} {}",
        "○".with(colors::DIM),
        message.with(colors::DIM).attribute(Attribute::Italic)
    );
}

pub fn get_prompt() -> String {
    format!("{} ", "journal ❯".with(colors::TEAL).bold())
}

pub fn print_command_echo(command: &str) {
    println!(
        "{}  {}",
        "journal ❯".with(colors::TEAL).bold(),
        command.with(colors::GREEN).bold()
    );
}

pub fn print_goodbye() {
    println!();
    println!("  {}", "Take care!".with(colors::LAVENDER).bold());
    println!();
}
