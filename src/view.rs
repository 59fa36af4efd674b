// Rendering: a pure function from session state to the frame on screen.
//
// The session phase picks exactly one of three screens. The credits
// section is appended to every frame.

use std::fmt;

use crate::credits::{DEVELOPERS, FOOTER, SECTION_TITLE};
use crate::currency::{format_kg, format_rupiah};
use crate::image::SelectedImage;
use crate::model::AnalysisResult;
use crate::session::{Phase, Session};

pub const LOGO: &str = "CarbonLens";
const CURSOR: char = '|';

/// Controls a screen exposes to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Scan,
    Analyze,
    ChangePhoto,
    Cancel,
    ScanAnother,
    Quit,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::Scan => "Scan Struk Sekarang",
            Action::Analyze => "Hitung Emisi",
            Action::ChangePhoto => "Ganti Foto",
            Action::Cancel => "Batal",
            Action::ScanAnother => "Scan Struk Lain",
            Action::Quit => "Keluar",
        }
    }
}

#[derive(Debug)]
pub enum Screen<'a> {
    Prompt,
    Preview {
        image: &'a SelectedImage,
        loading: bool,
        error: Option<&'static str>,
    },
    Result {
        result: &'a AnalysisResult,
        revealed: &'a str,
    },
}

impl<'a> Screen<'a> {
    pub fn from_session(session: &'a Session, revealed: &'a str) -> Self {
        match session.phase() {
            Phase::NoImage => Screen::Prompt,
            Phase::Previewing { image } => Screen::Preview {
                image,
                loading: false,
                error: None,
            },
            Phase::Analyzing { image, .. } => Screen::Preview {
                image,
                loading: true,
                error: None,
            },
            Phase::Errored { image, message } => Screen::Preview {
                image,
                loading: false,
                error: Some(*message),
            },
            Phase::Analyzed { result, .. } => Screen::Result {
                result: result.as_ref(),
                revealed,
            },
        }
    }

    /// Nothing can be triggered while an analysis is running.
    pub fn actions(&self) -> Vec<Action> {
        match self {
            Screen::Prompt => vec![Action::Scan, Action::Quit],
            Screen::Preview { loading: true, .. } => Vec::new(),
            Screen::Preview { .. } => vec![
                Action::Analyze,
                Action::ChangePhoto,
                Action::Cancel,
                Action::Quit,
            ],
            Screen::Result { .. } => vec![Action::ScanAnother, Action::Quit],
        }
    }
}

/// The full text frame for `screen`, credits included.
pub fn render(screen: &Screen<'_>) -> String {
    screen.to_string()
}

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{LOGO}")?;
        writeln!(f, "{}", "═".repeat(LOGO.chars().count()))?;
        writeln!(f)?;

        match self {
            Screen::Prompt => write_prompt(f)?,
            Screen::Preview {
                image,
                loading,
                error,
            } => write_preview(f, image, *loading, *error)?,
            Screen::Result { result, revealed } => write_result(f, result, revealed)?,
        }

        writeln!(f)?;
        write_credits(f)
    }
}

fn write_prompt(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "🌍  Cek Jejak Karbonmu")?;
    writeln!(
        f,
        "Upload struk belanjamu dan biarkan AI menghitung emisi karbon yang dihasilkan."
    )
}

fn write_preview(
    f: &mut fmt::Formatter<'_>,
    image: &SelectedImage,
    loading: bool,
    error: Option<&str>,
) -> fmt::Result {
    writeln!(f, "🧾  {}", image.preview())?;
    if loading {
        writeln!(f, "⏳  Sedang Menganalisis...")?;
    }
    if let Some(message) = error {
        writeln!(f, "⚠  {message}")?;
    }
    Ok(())
}

fn write_result(f: &mut fmt::Formatter<'_>, result: &AnalysisResult, revealed: &str) -> fmt::Result {
    writeln!(f, "Total Emisi")?;
    writeln!(f, "{} kg CO₂e", format_kg(result.total_co2_kg))?;
    writeln!(
        f,
        "± {} - {} kg CO₂e",
        format_kg(result.range.min),
        format_kg(result.range.max)
    )?;
    writeln!(f)?;
    writeln!(f, "💡  {revealed}{CURSOR}")?;
    writeln!(f)?;

    writeln!(f, "Rincian Item")?;
    for item in &result.items {
        writeln!(f, "  {}", item.name)?;
        writeln!(
            f,
            "    {} x {}    [{} kg]",
            format_rupiah(item.total_price),
            item.qty,
            format_kg(item.co2_kg)
        )?;
    }
    Ok(())
}

fn write_credits(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "── {SECTION_TITLE} ──")?;
    for dev in DEVELOPERS {
        writeln!(f, "  {} · {}", dev.name, dev.role)?;
        writeln!(f, "    {}", dev.profile_url)?;
    }
    writeln!(f, "{FOOTER}")
}
