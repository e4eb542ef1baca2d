//! Status enums for domain entities.
//!
//! Statuses are stored as lowercase snake_case text columns; repositories
//! parse them with `FromStr` and treat unknown values as data corruption.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a status string from the database or a request body
/// does not match any known variant.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown {kind} status: {value}")]
pub struct UnknownStatus {
    /// Which status enum failed to parse.
    pub kind: &'static str,
    /// The offending value.
    pub value: String,
}

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// The canonical database/wire representation.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl core::str::FromStr for $name {
            type Err = UnknownStatus;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownStatus {
                        kind: stringify!($name),
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

text_enum! {
    /// Group / discipleship-group membership lifecycle.
    ///
    /// `Rejected` members may re-apply, which resets the row to `Pending`.
    MembershipStatus {
        Pending => "pending",
        Active => "active",
        Rejected => "rejected",
        Inactive => "inactive",
    }
}

text_enum! {
    /// Mobile app user account status.
    AppUserStatus {
        Active => "active",
        Suspended => "suspended",
    }
}

text_enum! {
    /// Donation / transaction payment lifecycle (mirrors the payment
    /// processor's intent states).
    PaymentStatus {
        Pending => "pending",
        Succeeded => "succeeded",
        Failed => "failed",
        Refunded => "refunded",
    }
}

text_enum! {
    /// Event publication lifecycle.
    EventStatus {
        Draft => "draft",
        Published => "published",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

text_enum! {
    /// How a contact record entered the system.
    ContactSource {
        MobileApp => "mobile_app",
        StaffEntry => "staff_entry",
        Website => "website",
        Import => "import",
    }
}

text_enum! {
    /// Role within a discipleship group.
    DiscipleshipRole {
        Mentor => "mentor",
        Mentee => "mentee",
    }
}

text_enum! {
    /// Event ride request lifecycle.
    TransportStatus {
        Pending => "pending",
        Assigned => "assigned",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

text_enum! {
    /// Whether a volunteer driver can take assignments.
    DriverStatus {
        Available => "available",
        Unavailable => "unavailable",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_membership_status() {
        for status in [
            MembershipStatus::Pending,
            MembershipStatus::Active,
            MembershipStatus::Rejected,
            MembershipStatus::Inactive,
        ] {
            let parsed: MembershipStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn unknown_value_is_an_error() {
        let err = "banana".parse::<PaymentStatus>().unwrap_err();
        assert_eq!(err.kind, "PaymentStatus");
        assert_eq!(err.value, "banana");
    }

    #[test]
    fn serde_matches_text_representation() {
        let json = serde_json::to_string(&ContactSource::MobileApp).unwrap();
        assert_eq!(json, "\"mobile_app\"");
        let back: ContactSource = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ContactSource::MobileApp);
    }
}
