use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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
    };
}

str_enum!(DocumentStatus {
    Pending => "pending",
    InProgress => "in_progress",
    Completed => "completed",
    Overdue => "overdue",
    Cancelled => "cancelled",
    Erroneous => "erroneous",
});

impl DocumentStatus {
    /// Terminal statuses cannot be left without an explicit reopen policy.
    /// `erroneous` stays non-terminal so a mis-filed slip can be re-routed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

str_enum!(Priority {
    Urgent => "urgent",
    Prioritized => "prioritized",
    Routine => "routine",
    Other => "other",
});

impl Priority {
    /// Sort rank for task lists: urgent first.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Urgent => 0,
            Self::Prioritized => 1,
            Self::Routine => 2,
            Self::Other => 3,
        }
    }
}

str_enum!(Urgency {
    None => "none",
    Normal => "normal",
    Upcoming => "upcoming",
    Critical => "critical",
    Overdue => "overdue",
});

impl Urgency {
    /// Sort rank for task lists: most pressing first.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Overdue => 0,
            Self::Critical => 1,
            Self::Upcoming => 2,
            Self::Normal => 3,
            Self::None => 4,
        }
    }
}

str_enum!(ShipmentStatus {
    Registered => "registered",
    Dispatched => "dispatched",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

impl ShipmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

str_enum!(NotificationKind {
    Created => "created",
    StatusChanged => "status_changed",
    Completed => "completed",
    DueSoon => "due_soon",
    Overdue => "overdue",
});

str_enum!(DestinationCategory {
    Internal => "internal",
    External => "external",
    Other => "other",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn document_status_round_trip() {
        for (variant, s) in [
            (DocumentStatus::Pending, "pending"),
            (DocumentStatus::InProgress, "in_progress"),
            (DocumentStatus::Completed, "completed"),
            (DocumentStatus::Overdue, "overdue"),
            (DocumentStatus::Cancelled, "cancelled"),
            (DocumentStatus::Erroneous, "erroneous"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(DocumentStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn terminal_statuses() {
        assert!(DocumentStatus::Completed.is_terminal());
        assert!(DocumentStatus::Cancelled.is_terminal());
        assert!(!DocumentStatus::Pending.is_terminal());
        assert!(!DocumentStatus::Overdue.is_terminal());
        assert!(!DocumentStatus::Erroneous.is_terminal());
    }

    #[test]
    fn shipment_status_round_trip() {
        for (variant, s) in [
            (ShipmentStatus::Registered, "registered"),
            (ShipmentStatus::Dispatched, "dispatched"),
            (ShipmentStatus::Delivered, "delivered"),
            (ShipmentStatus::Cancelled, "cancelled"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(ShipmentStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn priority_rank_ordering() {
        assert!(Priority::Urgent.rank() < Priority::Prioritized.rank());
        assert!(Priority::Prioritized.rank() < Priority::Routine.rank());
        assert!(Priority::Routine.rank() < Priority::Other.rank());
    }

    #[test]
    fn urgency_rank_ordering() {
        assert!(Urgency::Overdue.rank() < Urgency::Critical.rank());
        assert!(Urgency::Critical.rank() < Urgency::Upcoming.rank());
        assert!(Urgency::Upcoming.rank() < Urgency::Normal.rank());
        assert!(Urgency::Normal.rank() < Urgency::None.rank());
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(DocumentStatus::from_str("archived").is_err());
        assert!(ShipmentStatus::from_str("lost").is_err());
        assert!(NotificationKind::from_str("").is_err());
    }
}
