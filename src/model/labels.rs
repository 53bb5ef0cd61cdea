#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BurnoutLabel {
    NoBurnout,
    Burnout,
}

impl BurnoutLabel {
    pub const ALL: [BurnoutLabel; 2] = [BurnoutLabel::NoBurnout, BurnoutLabel::Burnout];

    pub fn index(self) -> usize {
        match self {
            BurnoutLabel::NoBurnout => 0,
            BurnoutLabel::Burnout => 1,
        }
    }

    pub fn as_u8(self) -> u8 {
        self.index() as u8
    }

    pub fn key(self) -> &'static str {
        match self {
            BurnoutLabel::NoBurnout => "no_burnout",
            BurnoutLabel::Burnout => "burnout",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            BurnoutLabel::NoBurnout => "No Burnout",
            BurnoutLabel::Burnout => "Burnout",
        }
    }
}

pub fn parse_ground_truth(raw: &str) -> Option<BurnoutLabel> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "0" | "0.0" | "false" => Some(BurnoutLabel::NoBurnout),
        "1" | "1.0" | "true" => Some(BurnoutLabel::Burnout),
        _ => None,
    }
}
