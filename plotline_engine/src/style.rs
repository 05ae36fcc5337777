//! Styling helpers for terminal output.
//!
//! The [`StoryStyle`] trait applies ANSI styling via the `colored` crate. Implementations
//! for `&str` and `String` let literals and formatted text be styled directly.

use colored::{ColoredString, Colorize};

/// Convenience trait for applying color and style to preview and report output.
pub trait StoryStyle {
    fn scene_title_style(&self) -> ColoredString;
    fn narration_style(&self) -> ColoredString;
    fn speaker_style(&self) -> ColoredString;
    fn thought_style(&self) -> ColoredString;
    fn option_style(&self) -> ColoredString;
    fn option_locked_style(&self) -> ColoredString;
    fn price_style(&self) -> ColoredString;
    fn qte_style(&self) -> ColoredString;
    fn ending_style(&self) -> ColoredString;
    fn bad_ending_style(&self) -> ColoredString;
    fn value_style(&self) -> ColoredString;
    fn title_earned_style(&self) -> ColoredString;
    fn prompt_style(&self) -> ColoredString;
    fn error_style(&self) -> ColoredString;
    fn lint_style(&self) -> ColoredString;
    fn section_style(&self) -> ColoredString;
}

impl StoryStyle for &str {
    fn section_style(&self) -> ColoredString {
        let bracketed = format!("[{self}]");
        bracketed.truecolor(75, 80, 75)
    }
    fn scene_title_style(&self) -> ColoredString {
        self.truecolor(223, 77, 10).underline()
    }
    fn narration_style(&self) -> ColoredString {
        self.italic().truecolor(102, 208, 250)
    }
    fn speaker_style(&self) -> ColoredString {
        self.truecolor(13, 130, 60).bold()
    }
    fn thought_style(&self) -> ColoredString {
        self.italic().dimmed()
    }
    fn option_style(&self) -> ColoredString {
        self.truecolor(220, 180, 40)
    }
    fn option_locked_style(&self) -> ColoredString {
        self.italic().truecolor(200, 50, 50)
    }
    fn price_style(&self) -> ColoredString {
        self.truecolor(150, 230, 30)
    }
    fn qte_style(&self) -> ColoredString {
        self.bold().truecolor(230, 80, 80)
    }
    fn ending_style(&self) -> ColoredString {
        self.bold().truecolor(110, 220, 110)
    }
    fn bad_ending_style(&self) -> ColoredString {
        self.bold().truecolor(230, 30, 30)
    }
    fn value_style(&self) -> ColoredString {
        self.truecolor(75, 180, 255)
    }
    fn title_earned_style(&self) -> ColoredString {
        self.truecolor(220, 40, 220)
    }
    fn prompt_style(&self) -> ColoredString {
        self.bright_white().bold()
    }
    fn error_style(&self) -> ColoredString {
        self.truecolor(230, 30, 30)
    }
    fn lint_style(&self) -> ColoredString {
        self.truecolor(230, 230, 30)
    }
}

impl StoryStyle for String {
    fn section_style(&self) -> ColoredString {
        self.as_str().section_style()
    }
    fn scene_title_style(&self) -> ColoredString {
        self.as_str().scene_title_style()
    }
    fn narration_style(&self) -> ColoredString {
        self.as_str().narration_style()
    }
    fn speaker_style(&self) -> ColoredString {
        self.as_str().speaker_style()
    }
    fn thought_style(&self) -> ColoredString {
        self.as_str().thought_style()
    }
    fn option_style(&self) -> ColoredString {
        self.as_str().option_style()
    }
    fn option_locked_style(&self) -> ColoredString {
        self.as_str().option_locked_style()
    }
    fn price_style(&self) -> ColoredString {
        self.as_str().price_style()
    }
    fn qte_style(&self) -> ColoredString {
        self.as_str().qte_style()
    }
    fn ending_style(&self) -> ColoredString {
        self.as_str().ending_style()
    }
    fn bad_ending_style(&self) -> ColoredString {
        self.as_str().bad_ending_style()
    }
    fn value_style(&self) -> ColoredString {
        self.as_str().value_style()
    }
    fn title_earned_style(&self) -> ColoredString {
        self.as_str().title_earned_style()
    }
    fn prompt_style(&self) -> ColoredString {
        self.as_str().prompt_style()
    }
    fn error_style(&self) -> ColoredString {
        self.as_str().error_style()
    }
    fn lint_style(&self) -> ColoredString {
        self.as_str().lint_style()
    }
}
