//! Neon gradient ASCII banner (TG-DICTATE).

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Neon Purple (#bc13fe).
pub const NEON_PURPLE: (u8, u8, u8) = (0xbc, 0x13, 0xfe);
/// Cyber Green (#0ff0fc).
pub const CYBER_GREEN: (u8, u8, u8) = (0x0f, 0xf0, 0xfc);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let mix = |x: u8, y: u8| (f64::from(x) * (1.0 - t) + f64::from(y) * t).round() as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Banner text, or the plain title when the figlet font can't render.
fn banner_art(title: &str) -> String {
    FIGfont::standard()
        .ok()
        .and_then(|font| font.convert(title).map(|fig| fig.to_string()))
        .unwrap_or_else(|| title.to_string())
}

/// Prints "TG-DICTATE" with a top-to-bottom gradient, then the version line.
pub fn print_welcome() {
    let mut out = stdout();
    let art = banner_art("TG-DICTATE");
    let lines: Vec<&str> = art.lines().filter(|l| !l.trim().is_empty()).collect();
    let last = lines.len().saturating_sub(1).max(1);

    for (i, line) in lines.iter().enumerate() {
        let (r, g, b) = lerp_rgb(NEON_PURPLE, CYBER_GREEN, i as f64 / last as f64);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let (r, g, b) = CYBER_GREEN;
    let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
    let _ = out.execute(Print(format!(
        "v{}  speak it, fix it, send it\r\n",
        env!("CARGO_PKG_VERSION")
    )));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_endpoints() {
        assert_eq!(lerp_rgb(NEON_PURPLE, CYBER_GREEN, 0.0), NEON_PURPLE);
        assert_eq!(lerp_rgb(NEON_PURPLE, CYBER_GREEN, 1.0), CYBER_GREEN);
    }

    #[test]
    fn test_banner_art_is_multiline() {
        assert!(banner_art("TG").lines().count() > 1);
    }
}
