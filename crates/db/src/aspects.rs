//! The criteria a ballot scores an entry on, and the arithmetic used to
//! average and weight them.

use arbitrary::Arbitrary;
use serde::{Deserialize, Serialize};

/// The denominator used when deriving the overall score. Bonus counts as a
/// fifth term, but it only ranges up to half of a main aspect.
const TOTAL_DIVISOR: f64 = 4.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectKind {
    Theme,
    Enjoyment,
    Aesthetics,
    Innovation,
    Bonus,
    Overall,
}

impl AspectKind {
    pub const ALL: [AspectKind; 6] = [
        AspectKind::Theme,
        AspectKind::Enjoyment,
        AspectKind::Aesthetics,
        AspectKind::Innovation,
        AspectKind::Bonus,
        AspectKind::Overall,
    ];

    /// The aspects a voter fills in (everything except the derived overall
    /// score).
    pub const SCORED: [AspectKind; 5] = [
        AspectKind::Theme,
        AspectKind::Enjoyment,
        AspectKind::Aesthetics,
        AspectKind::Innovation,
        AspectKind::Bonus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AspectKind::Theme => "Theme",
            AspectKind::Enjoyment => "Enjoyment",
            AspectKind::Aesthetics => "Aesthetics",
            AspectKind::Innovation => "Innovation",
            AspectKind::Bonus => "Bonus",
            AspectKind::Overall => "Overall",
        }
    }

    /// The interval a score for this aspect is forced into.
    pub fn range(self) -> ScoreRange {
        match self {
            AspectKind::Bonus => ScoreRange {
                min: 0.0,
                max: 2.5,
                step: 0.1,
            },
            _ => ScoreRange {
                min: 1.0,
                max: 5.0,
                step: 0.1,
            },
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AspectKind::Theme => "How well does it interpret the theme?",
            AspectKind::Enjoyment => "How does the game generally feel?",
            AspectKind::Aesthetics => {
                "How well is the story, art and audio executed?"
            }
            AspectKind::Innovation => "Something novel in the game?",
            AspectKind::Bonus => "Anything exceptionally special about it?",
            AspectKind::Overall => "Combined score of all the other aspects.",
        }
    }

    /// Labels shown for each whole step of the scale, lowest first.
    pub fn options(self) -> &'static [&'static str] {
        match self {
            AspectKind::Theme => &[
                "Not even close",
                "Resembling",
                "Related",
                "Spot on",
                "Novel Interpretation",
            ],
            AspectKind::Enjoyment => &[
                "Boring",
                "Not playing again",
                "Nice",
                "Didn't want to stop",
                "Will play later",
            ],
            AspectKind::Aesthetics => &[
                "None",
                "Needs tweaks",
                "Nice",
                "Really good",
                "Exceptional",
            ],
            AspectKind::Innovation => &[
                "Seen it a lot",
                "Interesting variation",
                "Interesting approach",
                "Never seen before",
                "Exceptional",
            ],
            AspectKind::Bonus => {
                &["Nothing special", "Really liked *", "Really loved **"]
            }
            AspectKind::Overall => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ScoreRange {
    /// Forces `value` into the range. NaN is treated as the lowest score.
    pub fn clamp(self, value: f64) -> f64 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }
}

#[derive(
    Debug, Clone, Default, PartialEq, Serialize, Deserialize, Arbitrary,
)]
pub struct Aspect {
    pub score: f64,
    pub comment: String,
}

impl Aspect {
    pub const fn scored(score: f64) -> Self {
        Aspect {
            score,
            comment: String::new(),
        }
    }
}

#[derive(
    Debug, Clone, Default, PartialEq, Serialize, Deserialize, Arbitrary,
)]
pub struct Aspects {
    pub theme: Aspect,
    pub enjoyment: Aspect,
    pub aesthetics: Aspect,
    pub innovation: Aspect,
    pub bonus: Aspect,
    pub overall: Aspect,
}

/// The scores a freshly assigned ballot starts out with.
pub const DEFAULT_ASPECTS: Aspects = Aspects {
    theme: Aspect::scored(3.0),
    enjoyment: Aspect::scored(3.0),
    aesthetics: Aspect::scored(3.0),
    innovation: Aspect::scored(3.0),
    bonus: Aspect::scored(0.0),
    overall: Aspect::scored(0.0),
};

impl Aspects {
    pub fn aspect(&self, kind: AspectKind) -> &Aspect {
        match kind {
            AspectKind::Theme => &self.theme,
            AspectKind::Enjoyment => &self.enjoyment,
            AspectKind::Aesthetics => &self.aesthetics,
            AspectKind::Innovation => &self.innovation,
            AspectKind::Bonus => &self.bonus,
            AspectKind::Overall => &self.overall,
        }
    }

    pub fn aspect_mut(&mut self, kind: AspectKind) -> &mut Aspect {
        match kind {
            AspectKind::Theme => &mut self.theme,
            AspectKind::Enjoyment => &mut self.enjoyment,
            AspectKind::Aesthetics => &mut self.aesthetics,
            AspectKind::Innovation => &mut self.innovation,
            AspectKind::Bonus => &mut self.bonus,
            AspectKind::Overall => &mut self.overall,
        }
    }

    pub fn score(&self, kind: AspectKind) -> f64 {
        self.aspect(kind).score
    }

    pub fn comment(&self, kind: AspectKind) -> &str {
        &self.aspect(kind).comment
    }

    /// Component-wise sum of the scores. Comments are left untouched.
    pub fn add(&mut self, other: &Aspects) {
        for kind in AspectKind::ALL {
            self.aspect_mut(kind).score += other.score(kind);
        }
    }

    /// Multiplies every score by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for kind in AspectKind::ALL {
            self.aspect_mut(kind).score *= factor;
        }
    }

    pub fn scaled(&self, factor: f64) -> Aspects {
        let mut scaled = self.clone();
        scaled.scale(factor);
        scaled
    }

    /// Forces every score into the interval of its aspect.
    ///
    /// This must run after every edit a voter makes, not only when a ballot
    /// is first submitted.
    pub fn ensure_range(&mut self) {
        for kind in AspectKind::ALL {
            let aspect = self.aspect_mut(kind);
            aspect.score = kind.range().clamp(aspect.score);
        }
    }

    /// The overall score derived from the other aspects.
    pub fn total(&self) -> f64 {
        let sum: f64 =
            AspectKind::SCORED.iter().map(|kind| self.score(*kind)).sum();
        AspectKind::Overall.range().clamp(sum / TOTAL_DIVISOR)
    }

    pub fn update_total(&mut self) {
        self.overall.score = self.total();
    }

    pub fn clear_comments(&mut self) {
        for kind in AspectKind::ALL {
            self.aspect_mut(kind).comment.clear();
        }
    }
}
