use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    EpisodeRelease,
    SeasonRelease,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EpisodeRelease => "episode_release",
            Self::SeasonRelease => "season_release",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "episode_release" => Ok(Self::EpisodeRelease),
            "season_release" => Ok(Self::SeasonRelease),
            other => Err(format!("unknown notification kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: String,
    pub anime_id: Option<String>,
    pub anime_title: String,
    pub season_number: i32,
    pub episode_number: i32,
    pub kind: NotificationKind,
    pub message: String,
}

impl NewNotification {
    #[must_use]
    pub fn episode_release(
        user_id: &str,
        anime_id: &str,
        title: &str,
        season_number: i32,
        episode_number: i32,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            anime_id: Some(anime_id.to_string()),
            anime_title: title.to_string(),
            season_number,
            episode_number,
            kind: NotificationKind::EpisodeRelease,
            message: format!(
                "{title} Season {season_number} Episode {episode_number} has been released!"
            ),
        }
    }

    #[must_use]
    pub fn season_release(
        user_id: &str,
        anime_id: Option<&str>,
        title: &str,
        season_number: i32,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            anime_id: anime_id.map(str::to_string),
            anime_title: title.to_string(),
            season_number,
            episode_number: 1,
            kind: NotificationKind::SeasonRelease,
            message: format!("{title} Season {season_number} has been released!"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub anime_id: Option<String>,
    pub anime_title: String,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub kind: NotificationKind,
    pub message: String,
    pub read: bool,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_messages() {
        let ep = NewNotification::episode_release("u1", "row-1", "Frieren", 1, 13);
        assert_eq!(ep.message, "Frieren Season 1 Episode 13 has been released!");
        assert_eq!(ep.kind, NotificationKind::EpisodeRelease);

        let season = NewNotification::season_release("u1", None, "Frieren", 2);
        assert_eq!(season.message, "Frieren Season 2 has been released!");
        assert_eq!(season.episode_number, 1);
    }
}
