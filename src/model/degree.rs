use clap::ValueEnum;

/// Highest degree an institution awards, ordered from least to most advanced.
/// Matches the 0-4 HIGHDEG codes in the source extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum DegreeLevel {
    NonDegree,
    Certificate,
    Associate,
    Bachelor,
    Graduate,
}

impl DegreeLevel {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(DegreeLevel::NonDegree),
            1 => Some(DegreeLevel::Certificate),
            2 => Some(DegreeLevel::Associate),
            3 => Some(DegreeLevel::Bachelor),
            4 => Some(DegreeLevel::Graduate),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            DegreeLevel::NonDegree => 0,
            DegreeLevel::Certificate => 1,
            DegreeLevel::Associate => 2,
            DegreeLevel::Bachelor => 3,
            DegreeLevel::Graduate => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DegreeLevel::NonDegree => "Non-degree-granting",
            DegreeLevel::Certificate => "Certificate degree",
            DegreeLevel::Associate => "Associate degree",
            DegreeLevel::Bachelor => "Bachelor's degree",
            DegreeLevel::Graduate => "Graduate degree",
        }
    }
}
