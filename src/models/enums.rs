use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(InteractionSeverity {
    Mild => "mild",
    Moderate => "moderate",
    Severe => "severe",
    Contraindicated => "contraindicated",
});

str_enum!(SideEffectSeverity {
    Mild => "mild",
    Moderate => "moderate",
    Severe => "severe",
    LifeThreatening => "life_threatening",
});

str_enum!(FrequencyCategory {
    VeryCommon => "very_common",
    Common => "common",
    Uncommon => "uncommon",
    Rare => "rare",
    VeryRare => "very_rare",
});

str_enum!(EvidenceLevel {
    High => "high",
    Moderate => "moderate",
    Low => "low",
    ExpertOpinion => "expert_opinion",
});

str_enum!(EvidenceQuality {
    High => "high",
    Moderate => "moderate",
    Low => "low",
    VeryLow => "very_low",
});

str_enum!(TreatmentLine {
    FirstLine => "first-line",
    SecondLine => "second-line",
    ThirdLine => "third-line",
    Alternative => "alternative",
});

str_enum!(ConditionSeverity {
    Mild => "mild",
    Moderate => "moderate",
    Severe => "severe",
    Critical => "critical",
});

str_enum!(GuidelineAdherence {
    High => "high",
    Moderate => "moderate",
    Low => "low",
});

str_enum!(TrendDirection {
    Increasing => "increasing",
    Stable => "stable",
    Decreasing => "decreasing",
});

impl InteractionSeverity {
    /// Clinical rank, higher is more dangerous.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Mild => 1,
            Self::Moderate => 2,
            Self::Severe => 3,
            Self::Contraindicated => 4,
        }
    }

    pub fn is_serious(&self) -> bool {
        matches!(self, Self::Severe | Self::Contraindicated)
    }
}

impl SideEffectSeverity {
    /// Clinical rank, higher is more dangerous.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Mild => 1,
            Self::Moderate => 2,
            Self::Severe => 3,
            Self::LifeThreatening => 4,
        }
    }

    pub fn is_serious(&self) -> bool {
        matches!(self, Self::Severe | Self::LifeThreatening)
    }
}

impl EvidenceLevel {
    /// Bonus points an evidence level contributes to suitability scoring.
    pub fn bonus(&self) -> f64 {
        match self {
            Self::High => 20.0,
            Self::Moderate => 10.0,
            Self::Low => 5.0,
            Self::ExpertOpinion => 2.0,
        }
    }
}

/// Parse an optional enum column, propagating unknown values as errors.
pub(crate) fn parse_optional<T>(value: Option<String>) -> Result<Option<T>, DatabaseError>
where
    T: std::str::FromStr<Err = DatabaseError>,
{
    value.map(|s| s.parse::<T>()).transpose()
}
