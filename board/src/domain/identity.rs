//! The signed-in reviewer and the display names derived from them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::UserId;

/// Username snapshot written when no better name is known.
pub const ANONYMOUS_USERNAME: &str = "Anonymous";

/// Identity resolved by the auth session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-issued user id.
    pub user_id: UserId,
    /// Account email, when the provider shares it.
    pub email: Option<String>,
    /// `full_name` profile metadata.
    pub full_name: Option<String>,
    /// `name` profile metadata.
    pub name: Option<String>,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
}

impl Identity {
    /// Identity with only an id; profile fields are empty.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            email: None,
            full_name: None,
            name: None,
            avatar_url: None,
        }
    }

    /// Name snapshot stored with vote rows.
    ///
    /// `full_name`, then `name`, then the local part of the email, then
    /// [`ANONYMOUS_USERNAME`]. Blank values are skipped.
    ///
    /// # Examples
    /// ```
    /// use board::domain::{Identity, UserId};
    ///
    /// let mut who = Identity::new(UserId::random());
    /// who.email = Some("sam.lee@example.com".into());
    /// assert_eq!(who.vote_username(), "sam.lee");
    /// who.name = Some("Sam".into());
    /// assert_eq!(who.vote_username(), "Sam");
    /// ```
    pub fn vote_username(&self) -> String {
        non_blank(self.full_name.as_deref())
            .or_else(|| non_blank(self.name.as_deref()))
            .or_else(|| {
                non_blank(self.email.as_deref())
                    .and_then(|email| email.split('@').next())
                    .and_then(|local| non_blank(Some(local)))
            })
            .unwrap_or(ANONYMOUS_USERNAME)
            .to_owned()
    }

    /// Name snapshot stored with comment rows: `full_name`, then the whole
    /// email, then [`ANONYMOUS_USERNAME`].
    pub fn comment_username(&self) -> String {
        non_blank(self.full_name.as_deref())
            .or_else(|| non_blank(self.email.as_deref()))
            .unwrap_or(ANONYMOUS_USERNAME)
            .to_owned()
    }

    /// Label for the auth container.
    pub fn display_label(&self) -> String {
        non_blank(self.full_name.as_deref())
            .or_else(|| non_blank(self.email.as_deref()))
            .unwrap_or(ANONYMOUS_USERNAME)
            .to_owned()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Email allow-list deciding who may curate selections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminPolicy {
    emails: BTreeSet<String>,
}

impl AdminPolicy {
    /// Build a policy from email addresses; matching is case-insensitive.
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let emails = emails
            .into_iter()
            .map(|email| email.as_ref().trim().to_lowercase())
            .filter(|email| !email.is_empty())
            .collect();
        Self { emails }
    }

    /// Parse a comma separated list such as `a@x.io, b@x.io`.
    pub fn from_comma_separated(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    /// Whether the identity's email is on the list.
    pub fn is_admin(&self, identity: &Identity) -> bool {
        identity
            .email
            .as_deref()
            .is_some_and(|email| self.emails.contains(&email.trim().to_lowercase()))
    }

    /// Number of configured admins.
    pub fn len(&self) -> usize {
        self.emails.len()
    }

    /// Whether no admins are configured.
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn identity() -> Identity {
        Identity::new(UserId::random())
    }

    #[rstest]
    fn vote_username_prefers_full_name(mut identity: Identity) {
        identity.full_name = Some("Sam Lee".into());
        identity.name = Some("sam".into());
        identity.email = Some("sam@example.com".into());
        assert_eq!(identity.vote_username(), "Sam Lee");
    }

    #[rstest]
    fn vote_username_skips_blank_metadata(mut identity: Identity) {
        identity.full_name = Some("  ".into());
        identity.email = Some("reviewer@example.com".into());
        assert_eq!(identity.vote_username(), "reviewer");
    }

    #[rstest]
    fn usernames_fall_back_to_anonymous(identity: Identity) {
        assert_eq!(identity.vote_username(), ANONYMOUS_USERNAME);
        assert_eq!(identity.comment_username(), ANONYMOUS_USERNAME);
    }

    #[rstest]
    fn comment_username_uses_whole_email(mut identity: Identity) {
        identity.name = Some("sam".into());
        identity.email = Some("sam@example.com".into());
        assert_eq!(identity.comment_username(), "sam@example.com");
    }

    #[rstest]
    #[case(Some("Admin@Example.com"), true)]
    #[case(Some("other@example.com"), false)]
    #[case(None, false)]
    fn admin_policy_matches_case_insensitively(
        mut identity: Identity,
        #[case] email: Option<&str>,
        #[case] expected: bool,
    ) {
        let policy = AdminPolicy::from_comma_separated(" admin@example.com , ,lead@example.com");
        identity.email = email.map(str::to_owned);

        assert_eq!(policy.len(), 2);
        assert_eq!(policy.is_admin(&identity), expected);
    }
}
