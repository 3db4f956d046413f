#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Stop,
    Sleep,
    MoveXy,
    MoveHeight,
    MoveMaxHeight,
    TurnHorizontal,
    TurnVertical,
    Pump,
}

impl Verb {
    pub const ALL: [Verb; 8] = [
        Verb::Stop,
        Verb::Sleep,
        Verb::MoveXy,
        Verb::MoveHeight,
        Verb::MoveMaxHeight,
        Verb::TurnHorizontal,
        Verb::TurnVertical,
        Verb::Pump,
    ];

    /// Wire token of the verb.
    pub fn code(&self) -> &'static str {
        match self {
            Verb::Stop => "STP",
            Verb::Sleep => "SLP",
            Verb::MoveXy => "MXY",
            Verb::MoveHeight => "MHT",
            Verb::MoveMaxHeight => "MMH",
            Verb::TurnHorizontal => "THZ",
            Verb::TurnVertical => "TVT",
            Verb::Pump => "PMP",
        }
    }

    /// Case-sensitive lookup; unknown tokens yield `None`.
    pub fn from_code(code: &str) -> Option<Verb> {
        Self::ALL.into_iter().find(|verb| verb.code() == code)
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for verb in Verb::ALL {
            assert_eq!(Verb::from_code(verb.code()), Some(verb));
        }
    }

    #[test]
    fn test_unknown_or_lowercase_rejected() {
        assert_eq!(Verb::from_code("XYZ"), None);
        assert_eq!(Verb::from_code("mxy"), None);
        assert_eq!(Verb::from_code(""), None);
    }
}
