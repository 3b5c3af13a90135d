use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Domain enums shared by the DB layer (stored as their snake_case string
/// form) and the API layer (serialized the same way). Parsing a stored value
/// back is fallible so corrupt rows surface as errors at the data-access
/// boundary instead of being trusted at render time.

macro_rules! string_enum {
    ($name:ident { $($variant:ident => $repr:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $repr),+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($repr => Ok(Self::$variant),)+
                    other => Err(format!(
                        concat!("invalid ", stringify!($name), ": {}"),
                        other
                    )),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(Privacy {
    Public => "public",
    Private => "private",
});

string_enum!(Visibility {
    Public => "public",
    Circle => "circle",
    Private => "private",
});

string_enum!(PrayerStatus {
    Active => "active",
    Answered => "answered",
});

string_enum!(AttendanceStatus {
    Attending => "attending",
    NotAttending => "not_attending",
    Maybe => "maybe",
});

string_enum!(MemberRole {
    Owner => "owner",
    Member => "member",
});

string_enum!(MediaKind {
    Image => "image",
    Video => "video",
    Other => "other",
});

impl MediaKind {
    /// Classify an upload by its Content-Type prefix.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("image/") {
            Self::Image
        } else if content_type.starts_with("video/") {
            Self::Video
        } else {
            Self::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_round_trip_their_string_form() {
        assert_eq!("public".parse::<Privacy>().unwrap(), Privacy::Public);
        assert_eq!(Privacy::Private.as_str(), "private");
        assert_eq!(
            "not_attending".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::NotAttending
        );
        assert_eq!("circle".parse::<Visibility>().unwrap(), Visibility::Circle);
        assert!("bogus".parse::<PrayerStatus>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::NotAttending).unwrap(),
            "\"not_attending\""
        );
        let v: Visibility = serde_json::from_str("\"private\"").unwrap();
        assert_eq!(v, Visibility::Private);
    }

    #[test]
    fn media_kind_from_content_type_prefix() {
        assert_eq!(MediaKind::from_content_type("image/png"), MediaKind::Image);
        assert_eq!(MediaKind::from_content_type("video/mp4"), MediaKind::Video);
        assert_eq!(
            MediaKind::from_content_type("application/pdf"),
            MediaKind::Other
        );
    }
}
