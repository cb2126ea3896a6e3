use core::fmt;

use crate::mats_list::MatsList;

/// Flags of a single mat, stored as a string composed of `H` (handicap),
/// `S` (socket) and `W` (work) in that order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Features {
    pub handicap: bool,
    pub socket: bool,
    pub work: bool,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("features: '{0}' must contain only H, S and W, at most once each and in that order")]
pub struct FeaturesError(String);

impl Features {
    /// Looks the mat up in each of the feature lists of a template.
    #[must_use]
    pub fn of_mat(
        mat_number: i32,
        handicap: Option<&MatsList>,
        socket: Option<&MatsList>,
        work: Option<&MatsList>,
    ) -> Self {
        let member =
            |list: Option<&MatsList>| list.is_some_and(|list| list.is_member_of(mat_number));
        Self {
            handicap: member(handicap),
            socket: member(socket),
            work: member(work),
        }
    }

    pub fn parse(text: &str) -> Result<Self, FeaturesError> {
        let mut features = Self::default();
        let mut rest = text;
        for (flag, set) in [
            ('H', &mut features.handicap),
            ('S', &mut features.socket),
            ('W', &mut features.work),
        ] {
            if let Some(stripped) = rest.strip_prefix(flag) {
                *set = true;
                rest = stripped;
            }
        }
        if rest.is_empty() {
            Ok(features)
        } else {
            Err(FeaturesError(text.to_owned()))
        }
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        !(self.handicap || self.socket || self.work)
    }

    /// The column value: no flags are stored as absent, never as `""`.
    #[must_use]
    pub fn into_column(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl fmt::Display for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.handicap {
            f.write_str("H")?;
        }
        if self.socket {
            f.write_str("S")?;
        }
        if self.work {
            f.write_str("W")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_order() {
        let all = Features {
            handicap: true,
            socket: true,
            work: true,
        };
        assert_eq!(all.to_string(), "HSW");
        let socket_and_work = Features {
            socket: true,
            work: true,
            ..Features::default()
        };
        assert_eq!(socket_and_work.into_column().as_deref(), Some("SW"));
    }

    #[test]
    fn no_flags_is_absent() {
        assert_eq!(Features::default().into_column(), None);
    }

    #[test]
    fn membership_in_template_lists() {
        let handicap = MatsList::new("2").unwrap();
        let socket = MatsList::new("2-3").unwrap();
        let features = Features::of_mat(2, Some(&handicap), Some(&socket), None);
        assert_eq!(features.into_column().as_deref(), Some("HS"));
        let features = Features::of_mat(1, Some(&handicap), Some(&socket), None);
        assert!(features.is_empty());
    }

    #[test]
    fn parse() {
        assert_eq!(Features::parse("HW").unwrap().to_string(), "HW");
        assert_eq!(Features::parse("").unwrap(), Features::default());
        assert!(Features::parse("SH").is_err());
        assert!(Features::parse("HH").is_err());
        assert!(Features::parse("X").is_err());
    }
}
