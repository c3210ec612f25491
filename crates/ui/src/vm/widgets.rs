/// Number of whitespace-separated words.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordRange {
    TooShort,
    WithinRange,
    TooLong,
}

/// Live word counter under the writing answer box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WordCountVm {
    pub words: usize,
    pub min: usize,
    pub max: usize,
}

impl WordCountVm {
    pub const WRITING_MIN: usize = 250;
    pub const WRITING_MAX: usize = 400;

    #[must_use]
    pub fn writing(text: &str) -> Self {
        Self {
            words: word_count(text),
            min: Self::WRITING_MIN,
            max: Self::WRITING_MAX,
        }
    }

    #[must_use]
    pub fn range(self) -> WordRange {
        if self.words < self.min {
            WordRange::TooShort
        } else if self.words > self.max {
            WordRange::TooLong
        } else {
            WordRange::WithinRange
        }
    }

    #[must_use]
    pub fn label(self) -> String {
        format!(
            "{} words (recommended {}-{})",
            self.words, self.min, self.max
        )
    }

    #[must_use]
    pub fn class(self) -> &'static str {
        match self.range() {
            WordRange::WithinRange => "word-count ok",
            WordRange::TooShort | WordRange::TooLong => "word-count warn",
        }
    }
}

/// Simulated playback bar for listening passages without real audio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioProgress {
    duration_secs: u32,
    elapsed_secs: u32,
    playing: bool,
}

impl AudioProgress {
    /// Reading speed used to estimate a script's length.
    const WORDS_PER_MINUTE: usize = 150;

    #[must_use]
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration_secs,
            elapsed_secs: 0,
            playing: false,
        }
    }

    #[must_use]
    pub fn for_script(script: &str) -> Self {
        let secs = (word_count(script) * 60).div_ceil(Self::WORDS_PER_MINUTE);
        Self::new(u32::try_from(secs).unwrap_or(u32::MAX).max(1))
    }

    pub fn play(&mut self) {
        if !self.is_finished() {
            self.playing = true;
        }
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Advance by `secs` while playing; stops at the end.
    pub fn tick(&mut self, secs: u32) {
        if !self.playing {
            return;
        }
        self.elapsed_secs = self.elapsed_secs.saturating_add(secs).min(self.duration_secs);
        if self.is_finished() {
            self.playing = false;
        }
    }

    #[must_use]
    pub fn is_playing(self) -> bool {
        self.playing
    }

    #[must_use]
    pub fn is_finished(self) -> bool {
        self.elapsed_secs >= self.duration_secs
    }

    /// Played share in `0..=100`.
    #[must_use]
    pub fn percent(self) -> u8 {
        if self.duration_secs == 0 {
            return 100;
        }
        let pct = u64::from(self.elapsed_secs) * 100 / u64::from(self.duration_secs);
        u8::try_from(pct.min(100)).unwrap_or(100)
    }
}

/// Menu toggled by its button and closed by a click anywhere else.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dropdown {
    open: bool,
}

impl Dropdown {
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    #[must_use]
    pub fn is_open(self) -> bool {
        self.open
    }

    #[must_use]
    pub fn class(self) -> &'static str {
        if self.open { "dropdown open" } else { "dropdown" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_count_splits_on_any_whitespace() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count("one  two\nthree\tfour"), 4);
    }

    #[test]
    fn writing_counter_flags_range() {
        let short = WordCountVm::writing("just a few words");
        assert_eq!(short.range(), WordRange::TooShort);
        assert_eq!(short.label(), "4 words (recommended 250-400)");

        let ok = WordCountVm::writing(&"word ".repeat(300));
        assert_eq!(ok.range(), WordRange::WithinRange);
        assert_eq!(ok.class(), "word-count ok");

        let long = WordCountVm::writing(&"word ".repeat(401));
        assert_eq!(long.range(), WordRange::TooLong);
    }

    #[test]
    fn audio_progress_is_clamped() {
        let mut audio = AudioProgress::new(10);
        audio.tick(3);
        assert_eq!(audio.percent(), 0);

        audio.play();
        audio.tick(4);
        assert_eq!(audio.percent(), 40);
        audio.tick(50);
        assert_eq!(audio.percent(), 100);
        assert!(audio.is_finished());
        assert!(!audio.is_playing());

        assert_eq!(AudioProgress::new(0).percent(), 100);
    }

    #[test]
    fn script_length_sets_duration() {
        let audio = AudioProgress::for_script(&"word ".repeat(300));
        let mut probe = audio;
        probe.play();
        probe.tick(119);
        assert!(!probe.is_finished());
        probe.tick(1);
        assert!(probe.is_finished());
    }

    #[test]
    fn dropdown_closes_on_outside_click() {
        let mut menu = Dropdown::default();
        menu.toggle();
        assert!(menu.is_open());
        assert_eq!(menu.class(), "dropdown open");
        menu.close();
        assert!(!menu.is_open());
        menu.toggle();
        menu.toggle();
        assert!(!menu.is_open());
    }
}
