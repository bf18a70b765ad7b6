//! Experience text grammar
//!
//! Free-text experience requirements ("3-5 years", "7+", "B.Sc required, 2 years")
//! are tokenized and then matched against a fixed, priority-ordered set of
//! productions:
//!
//! 1. `Number Dash Number` → bounded range
//! 2. `Number Plus` → open-ended range
//! 3. single-digit `Number` → exact years
//! 4. anything else → defaults
//!
//! Degree markers are detected separately and never short-circuit the numeric parse.

/// Lower bound used when the text carries no usable number
pub const DEFAULT_MIN_EXP: u32 = 0;

/// Upper bound sentinel meaning "no upper limit"
pub const UNBOUNDED_EXP: u32 = 99;

/// Bare numbers only count as exact years when they are a single digit
const MAX_SINGLE_DIGIT: u32 = 9;

/// Lowercased substrings that signal an academic degree requirement
const DEGREE_MARKERS: &[&str] = &[
    "bachelor",
    "master's",
    "master\u{2019}s",
    "masters degree",
    "master degree",
    "master of",
    "b.sc",
    "m.sc",
    "bsc",
    "msc",
    "b.a.",
    "m.a.",
    "תואר ראשון",
    "תואר שני",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Number(u32),
    Dash,
    Plus,
    Word,
    Other,
}

/// Which production of the grammar produced the bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperiencePattern {
    Range,
    AtLeast,
    Exact,
    Unspecified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedExperience {
    pub min: u32,
    pub max: u32,
    pub degree_required: bool,
    pub pattern: ExperiencePattern,
}

impl Default for ParsedExperience {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_EXP,
            max: UNBOUNDED_EXP,
            degree_required: false,
            pattern: ExperiencePattern::Unspecified,
        }
    }
}

/// Split text into grammar tokens.
///
/// Alphanumeric runs that are not purely ASCII digits become `Word`, so
/// "b2b" or "5th" never yield a number. Digit runs above `UNBOUNDED_EXP`
/// (years, salaries) are words too.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c.is_alphanumeric() {
            let mut run = String::new();
            while let Some(&next) = chars.peek() {
                if !next.is_alphanumeric() {
                    break;
                }
                run.push(next);
                chars.next();
            }

            let token = if run.chars().all(|d| d.is_ascii_digit()) {
                match run.parse::<u32>() {
                    Ok(n) if n <= UNBOUNDED_EXP => Token::Number(n),
                    _ => Token::Word,
                }
            } else {
                Token::Word
            };
            tokens.push(token);
            continue;
        }

        chars.next();
        tokens.push(match c {
            '-' | '\u{2013}' | '\u{2014}' => Token::Dash,
            '+' => Token::Plus,
            _ => Token::Other,
        });
    }

    tokens
}

/// Whether the text mentions a bachelor's or master's requirement
pub fn has_degree_marker(text: &str) -> bool {
    let lowered = text.to_lowercase();
    DEGREE_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Parse an experience requirement. Total: unparseable text yields defaults.
pub fn parse_experience(text: &str) -> ParsedExperience {
    let tokens = tokenize(text);
    let mut parsed = ParsedExperience {
        degree_required: has_degree_marker(text),
        ..ParsedExperience::default()
    };

    if let Some((low, high)) = find_range(&tokens) {
        parsed.min = low.min(high);
        parsed.max = low.max(high);
        parsed.pattern = ExperiencePattern::Range;
    } else if let Some(n) = find_at_least(&tokens) {
        parsed.min = n;
        parsed.max = UNBOUNDED_EXP;
        parsed.pattern = ExperiencePattern::AtLeast;
    } else if let Some(n) = find_single(&tokens) {
        parsed.min = n;
        parsed.max = n;
        parsed.pattern = ExperiencePattern::Exact;
    }

    parsed
}

fn find_range(tokens: &[Token]) -> Option<(u32, u32)> {
    tokens.windows(3).find_map(|window| match window {
        [Token::Number(low), Token::Dash, Token::Number(high)] => Some((*low, *high)),
        _ => None,
    })
}

fn find_at_least(tokens: &[Token]) -> Option<u32> {
    tokens.windows(2).find_map(|window| match window {
        [Token::Number(n), Token::Plus] => Some(*n),
        _ => None,
    })
}

fn find_single(tokens: &[Token]) -> Option<u32> {
    tokens.iter().find_map(|token| match token {
        Token::Number(n) if *n <= MAX_SINGLE_DIGIT => Some(*n),
        _ => None,
    })
}
