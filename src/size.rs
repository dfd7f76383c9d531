use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageSize {
    W92,
    W154,
    W185,
    W342,
    W500,
    W780,
    #[default]
    Original,
}

impl ImageSize {
    pub fn all() -> &'static [ImageSize] {
        &[
            ImageSize::W92,
            ImageSize::W154,
            ImageSize::W185,
            ImageSize::W342,
            ImageSize::W500,
            ImageSize::W780,
            ImageSize::Original,
        ]
    }

    pub fn token(&self) -> &'static str {
        match self {
            ImageSize::W92 => "w92",
            ImageSize::W154 => "w154",
            ImageSize::W185 => "w185",
            ImageSize::W342 => "w342",
            ImageSize::W500 => "w500",
            ImageSize::W780 => "w780",
            ImageSize::Original => "original",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImageSize::W92 => "92px",
            ImageSize::W154 => "154px",
            ImageSize::W185 => "185px",
            ImageSize::W342 => "342px",
            ImageSize::W500 => "500px",
            ImageSize::W780 => "780px",
            ImageSize::Original => "Original",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::all().iter().copied().find(|s| s.token() == token)
    }

    /// 1-based position on the ladder, used for the number-key shortcuts.
    pub fn from_index(index: usize) -> Option<Self> {
        index.checked_sub(1).and_then(|i| Self::all().get(i).copied())
    }

    fn position(&self) -> usize {
        Self::all().iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn smaller(&self) -> Self {
        let all = Self::all();
        all[self.position().saturating_sub(1)]
    }

    pub fn larger(&self) -> Self {
        let all = Self::all();
        all[(self.position() + 1).min(all.len() - 1)]
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSize(pub String);

impl fmt::Display for UnknownSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown image size '{}'", self.0)
    }
}

impl std::error::Error for UnknownSize {}

impl FromStr for ImageSize {
    type Err = UnknownSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s.trim()).ok_or_else(|| UnknownSize(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_round_trip() {
        for size in ImageSize::all() {
            assert_eq!(ImageSize::from_token(size.token()), Some(*size));
        }
        assert_eq!(ImageSize::from_token("w9000"), None);
        assert_eq!(ImageSize::from_token("ORIGINAL"), None);
    }

    #[test]
    fn test_default_is_original() {
        assert_eq!(ImageSize::default(), ImageSize::Original);
    }

    #[test]
    fn test_ladder_navigation() {
        assert_eq!(ImageSize::W92.smaller(), ImageSize::W92);
        assert_eq!(ImageSize::W92.larger(), ImageSize::W154);
        assert_eq!(ImageSize::W500.smaller(), ImageSize::W342);
        assert_eq!(ImageSize::Original.larger(), ImageSize::Original);
    }

    #[test]
    fn test_from_index() {
        assert_eq!(ImageSize::from_index(1), Some(ImageSize::W92));
        assert_eq!(ImageSize::from_index(7), Some(ImageSize::Original));
        assert_eq!(ImageSize::from_index(0), None);
        assert_eq!(ImageSize::from_index(8), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!(" w500 ".parse::<ImageSize>(), Ok(ImageSize::W500));
        assert!("huge".parse::<ImageSize>().is_err());
    }
}
