//! Display formatting shared by the card grid and the detail overlay

/// Maximum base stat; stat bars are scaled against it.
pub const STAT_MAX: u16 = 255;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Upper-case the first character and leave the rest untouched.
pub fn format_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `#025`-style catalog number.
pub fn format_id(id: u32) -> String {
    format!("#{id:03}")
}

/// `special-attack` -> `Special attack`
pub fn format_stat_name(name: &str) -> String {
    format_name(&name.replacen('-', " ", 1))
}

/// Decimetres to metres.
pub fn format_height(height: u32) -> String {
    format!("{:.1} m", height as f32 / 10.0)
}

/// Hectograms to kilograms.
pub fn format_weight(weight: u32) -> String {
    format!("{:.1} kg", weight as f32 / 10.0)
}

pub fn format_base_experience(base_experience: Option<u32>) -> String {
    base_experience
        .map(|exp| exp.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Filled cells of a `width`-cell bar for `value` out of [`STAT_MAX`].
pub fn stat_bar_fill(value: u16, width: u16) -> u16 {
    let value = value.min(STAT_MAX) as u32;
    let filled = (value * width as u32 + STAT_MAX as u32 / 2) / STAT_MAX as u32;
    filled as u16
}

pub fn spinner_frame(tick: u64) -> &'static str {
    SPINNER_FRAMES[(tick % SPINNER_FRAMES.len() as u64) as usize]
}
