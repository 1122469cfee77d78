//! User-agent allow/deny matching.

use serde::{Deserialize, Serialize};

/// A known bot/crawler, matched against the request's `User-Agent` header by
/// case-insensitive substring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bot {
    /// Substring to match, lowercased at load time.
    pub user_agent: String,
    /// When set, a matched `payment-error` result has its status rewritten to 200.
    #[serde(default)]
    pub force_200: bool,
}

impl Bot {
    /// Parses a whole `bots` KV array, lowercasing every `user_agent`.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the array does not match the schema.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, serde_json::Error> {
        let mut bots: Vec<Self> = serde_json::from_str(raw)?;
        for bot in &mut bots {
            bot.user_agent = bot.user_agent.to_lowercase();
        }
        Ok(bots)
    }

    /// Returns the first bot in `bots` whose `user_agent` is a substring of
    /// the (lowercased) given user agent. List order is authoritative.
    #[must_use]
    pub fn match_user_agent<'a>(bots: &'a [Self], user_agent: &str) -> Option<&'a Self> {
        let user_agent = user_agent.to_lowercase();
        bots.iter().find(|bot| user_agent.contains(&bot.user_agent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_first_substring_hit() {
        let bots = vec![
            Bot {
                user_agent: "bot".into(),
                force_200: false,
            },
            Bot {
                user_agent: "evilbot".into(),
                force_200: true,
            },
        ];
        let hit = Bot::match_user_agent(&bots, "EvilBot/1.0").unwrap();
        assert_eq!(hit.user_agent, "bot");
    }

    #[test]
    fn no_match_returns_none() {
        let bots = vec![Bot {
            user_agent: "googlebot".into(),
            force_200: false,
        }];
        assert!(Bot::match_user_agent(&bots, "Mozilla/5.0").is_none());
    }

    #[test]
    fn parse_list_lowercases() {
        let bots = Bot::parse_list(r#"[{"userAgent":"GoogleBot","force200":true}]"#).unwrap();
        assert_eq!(bots[0].user_agent, "googlebot");
        assert!(bots[0].force_200);
    }
}
