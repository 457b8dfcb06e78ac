#[derive(Clone, Copy, Debug)]
pub struct Glyphs {
    pub title_icon: &'static str,
    pub checked: &'static str,
    pub unchecked: &'static str,
    pub cursor: &'static str,
    pub bar_fill: &'static str,
    pub slider_knob: &'static str,
    pub slider_track: &'static str,
    pub spinner: &'static [&'static str],
}

pub fn select(fancy_requested: bool) -> Glyphs {
    if fancy_requested {
        fancy()
    } else {
        ascii()
    }
}

fn ascii() -> Glyphs {
    Glyphs {
        title_icon: "",
        checked: "[x]",
        unchecked: "[ ]",
        cursor: ">",
        bar_fill: "#",
        slider_knob: "O",
        slider_track: "-",
        spinner: &["|", "/", "-", "\\"],
    }
}

fn fancy() -> Glyphs {
    Glyphs {
        title_icon: "🧬 ",
        checked: "☑",
        unchecked: "☐",
        cursor: "▶",
        bar_fill: "█",
        slider_knob: "●",
        slider_track: "─",
        spinner: &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
    }
}

/// Spinner frame for a redraw counter.
pub fn spinner_frame(glyphs: &Glyphs, tick: usize) -> &'static str {
    glyphs.spinner[tick % glyphs.spinner.len()]
}
