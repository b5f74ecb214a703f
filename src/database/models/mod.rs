pub mod booking;
pub mod content;
pub mod gallery;
pub mod shift;
pub mod team;
pub mod user;

pub use booking::{Booking, BookingFilter, BookingStatus, Gender, PaymentType, Transfer};
pub use content::Content;
pub use gallery::GalleryAlbum;
pub use shift::Shift;
pub use team::TeamMember;
pub use user::{Role, User};

use thiserror::Error;

/// Raised when a stored or submitted string is not one of an enum's wire values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed set of string values shared by JSON, SQL and validation.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::database::models::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::database::models::UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use string_enum;

string_enum! {
    /// How an image fills its frame on the public site.
    Fit {
        Cover => "cover",
        Contain => "contain",
    }
}

string_enum! {
    /// Focal point used when an image is cropped.
    Position {
        CenterCenter => "center center",
        TopCenter => "top center",
        BottomCenter => "bottom center",
        CenterLeft => "center left",
        CenterRight => "center right",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_enum_round_trips_wire_values() {
        assert_eq!("contain".parse::<Fit>().unwrap(), Fit::Contain);
        assert_eq!(Position::TopCenter.as_str(), "top center");
        assert_eq!(serde_json::to_value(Position::CenterLeft).unwrap(), "center left");

        let err = "stretch".parse::<Fit>().unwrap_err();
        assert_eq!(err.kind, "Fit");
        assert_eq!(err.to_string(), "unknown Fit 'stretch'");
    }
}
