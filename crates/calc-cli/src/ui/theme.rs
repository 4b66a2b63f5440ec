//! UI Theme - icons and formatting helpers

/// Status icons
#[derive(Debug, Clone, Copy)]
pub struct Icons {
    /// Section headers and progress (●)
    pub active: &'static str,
    /// Success/completed state (✓)
    pub success: &'static str,
    /// Error/failed state (✗)
    pub error: &'static str,
    /// Warning state (⚠)
    pub warning: &'static str,
    /// Info/Tip state (ℹ)
    pub info: &'static str,
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            active: "●",
            success: "✓",
            error: "✗",
            warning: "⚠",
            info: "ℹ",
        }
    }
}

/// Human readable byte count.
pub fn format_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    let mb = kb / 1024.0;
    if mb >= 1024.0 {
        format!("{:.1} GB", mb / 1024.0)
    } else if kb >= 1024.0 {
        format!("{mb:.1} MB")
    } else if kb >= 1.0 {
        format!("{kb:.1} KB")
    } else {
        format!("{bytes} B")
    }
}

/// Progress text for a download, e.g. `1.5 MB / 3.0 MB (50%)`.
pub fn format_progress(current: u64, total: Option<u64>) -> String {
    match total {
        Some(total) if total > 0 => {
            let percent = current.saturating_mul(100) / total;
            format!(
                "{} / {} ({percent}%)",
                format_size(current),
                format_size(total)
            )
        }
        _ => format_size(current),
    }
}
