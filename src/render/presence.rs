//! Typed view of the Lanyard `data` object.
//!
//! Only the fields the fragment shows are modelled; unknown fields are ignored.

use serde::Deserialize;

const CDN: &str = "https://cdn.discordapp.com";

/// `data` of a successful Lanyard response.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Presence {
    #[serde(default)]
    pub discord_user: Option<DiscordUser>,
    #[serde(default)]
    pub discord_status: Option<String>,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

impl Presence {
    /// Online status; a missing value counts as offline.
    pub fn status(&self) -> Status {
        self.discord_status
            .as_deref()
            .map_or(Status::Offline, Status::parse)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub avatar_decoration_data: Option<AvatarDecoration>,
}

impl DiscordUser {
    /// Name to show: global display name, falling back to the username.
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }

    /// Custom avatar (`gif` for animated `a_` hashes) or the default embed avatar.
    pub fn avatar_url(&self) -> String {
        match self.avatar.as_deref() {
            Some(hash) if !hash.is_empty() => {
                let ext = if hash.starts_with("a_") { "gif" } else { "png" };
                format!("{CDN}/avatars/{}/{hash}.{ext}?size=256", self.id)
            }
            _ => {
                let index = self
                    .discriminator
                    .as_deref()
                    .and_then(|d| d.parse::<u64>().ok())
                    .unwrap_or(0)
                    % 5;
                format!("{CDN}/embed/avatars/{index}.png")
            }
        }
    }

    /// Avatar decoration frame, when the user has one.
    pub fn decoration_url(&self) -> Option<String> {
        self.avatar_decoration_data
            .as_ref()
            .map(|d| format!("{CDN}/avatar-decoration-presets/{}.png?size=160", d.asset))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AvatarDecoration {
    pub asset: String,
}

/// Discord online status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Online,
    Idle,
    DoNotDisturb,
    Offline,
    Unknown,
}

impl Status {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "online" => Status::Online,
            "idle" => Status::Idle,
            "dnd" => Status::DoNotDisturb,
            "offline" => Status::Offline,
            _ => Status::Unknown,
        }
    }

    /// CSS-friendly token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Online => "online",
            Status::Idle => "idle",
            Status::DoNotDisturb => "dnd",
            Status::Offline => "offline",
            Status::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Online => "Online",
            Status::Idle => "Idle",
            Status::DoNotDisturb => "Do Not Disturb",
            Status::Offline => "Offline",
            Status::Unknown => "Unknown",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Status::Online => "#23a55a",
            Status::Idle => "#f0b232",
            Status::DoNotDisturb => "#f23f43",
            Status::Offline => "#80848e",
            Status::Unknown => "#666",
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub application_id: Option<String>,
    #[serde(default)]
    pub emoji: Option<Emoji>,
    #[serde(default)]
    pub assets: Option<Assets>,
    #[serde(default)]
    pub timestamps: Option<Timestamps>,
}

/// Activity kinds the fragment knows how to show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityKind {
    Playing,
    Listening,
    Custom,
    Other(u8),
}

impl Activity {
    pub fn kind(&self) -> ActivityKind {
        match self.kind {
            0 => ActivityKind::Playing,
            2 => ActivityKind::Listening,
            4 => ActivityKind::Custom,
            other => ActivityKind::Other(other),
        }
    }

    /// Cover image of a game activity.
    ///
    /// `mp:external/<hash>/https/<rest>` is a proxied external image and maps to
    /// `https://<rest>`; anything else is an application asset.
    pub fn large_image_url(&self) -> Option<String> {
        let image = self.assets.as_ref()?.large_image.as_deref()?;
        if image.starts_with("mp:external/") {
            return image
                .split_once("/https/")
                .map(|(_, rest)| format!("https://{rest}"));
        }
        let app = self.application_id.as_deref()?;
        Some(format!("{CDN}/app-assets/{app}/{image}.png"))
    }

    /// Alt text for the cover image.
    pub fn large_image_text(&self) -> &str {
        self.assets
            .as_ref()
            .and_then(|a| a.large_text.as_deref())
            .unwrap_or(&self.name)
    }

    /// Start of the activity in Unix milliseconds.
    pub fn started_at_ms(&self) -> Option<i64> {
        self.timestamps.as_ref()?.start
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Emoji {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub animated: bool,
}

impl Emoji {
    /// CDN image for custom emoji; unicode emoji have no id and no image.
    pub fn image_url(&self) -> Option<String> {
        let id = self.id.as_deref()?;
        let ext = if self.animated { "gif" } else { "png" };
        Some(format!("{CDN}/emojis/{id}.{ext}?size=24"))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Assets {
    #[serde(default)]
    pub large_image: Option<String>,
    #[serde(default)]
    pub large_text: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Timestamps {
    #[serde(default)]
    pub start: Option<i64>,
}

/// Formats the time between `start_ms` and `now_ms` as hours and minutes.
///
/// Units are pluralised only above one, so 0 and 1 read "minute".
pub fn format_elapsed(start_ms: i64, now_ms: i64) -> String {
    let elapsed = now_ms.saturating_sub(start_ms).max(0) / 1000;
    let hours = elapsed / 3600;
    let minutes = (elapsed % 3600) / 60;

    let minute_part = format!("{minutes} minute{}", plural(minutes));
    if hours > 0 {
        format!("{hours} hour{} {minute_part}", plural(hours))
    } else {
        minute_part
    }
}

fn plural(n: i64) -> &'static str {
    if n > 1 { "s" } else { "" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(avatar: Option<&str>, discriminator: Option<&str>) -> DiscordUser {
        DiscordUser {
            id: "42".into(),
            username: "neo".into(),
            avatar: avatar.map(str::to_string),
            discriminator: discriminator.map(str::to_string),
            ..DiscordUser::default()
        }
    }

    #[test]
    fn test_avatar_url_static_and_animated() {
        assert_eq!(
            user(Some("abc"), None).avatar_url(),
            "https://cdn.discordapp.com/avatars/42/abc.png?size=256"
        );
        assert_eq!(
            user(Some("a_abc"), None).avatar_url(),
            "https://cdn.discordapp.com/avatars/42/a_abc.gif?size=256"
        );
    }

    #[test]
    fn test_default_avatar_from_discriminator() {
        assert_eq!(
            user(None, Some("0007")).avatar_url(),
            "https://cdn.discordapp.com/embed/avatars/2.png"
        );
        assert_eq!(
            user(None, None).avatar_url(),
            "https://cdn.discordapp.com/embed/avatars/0.png"
        );
        assert_eq!(
            user(None, Some("not-a-number")).avatar_url(),
            "https://cdn.discordapp.com/embed/avatars/0.png"
        );
    }

    #[test]
    fn test_external_game_image_is_unwrapped() {
        let activity: Activity = serde_json::from_value(json!({
            "type": 0,
            "name": "Roblox",
            "assets": { "large_image": "mp:external/xyz/https/tr.rbxcdn.com/icon.png" }
        }))
        .unwrap();
        assert_eq!(
            activity.large_image_url().as_deref(),
            Some("https://tr.rbxcdn.com/icon.png")
        );
    }

    #[test]
    fn test_app_asset_image() {
        let activity: Activity = serde_json::from_value(json!({
            "type": 0,
            "name": "Game",
            "application_id": "777",
            "assets": { "large_image": "cover" }
        }))
        .unwrap();
        assert_eq!(
            activity.large_image_url().as_deref(),
            Some("https://cdn.discordapp.com/app-assets/777/cover.png")
        );
        assert_eq!(activity.large_image_text(), "Game");
    }

    #[test]
    fn test_status_parsing_and_default() {
        assert_eq!(Status::parse("dnd"), Status::DoNotDisturb);
        assert_eq!(Status::parse("invisible"), Status::Unknown);
        assert_eq!(Presence::default().status(), Status::Offline);
    }

    #[test]
    fn test_format_elapsed() {
        let min = 60_000;
        assert_eq!(format_elapsed(0, 30_000), "0 minute");
        assert_eq!(format_elapsed(0, min), "1 minute");
        assert_eq!(format_elapsed(0, 5 * min), "5 minutes");
        assert_eq!(format_elapsed(0, 60 * min + min), "1 hour 1 minute");
        assert_eq!(format_elapsed(0, 125 * min), "2 hours 5 minutes");
        assert_eq!(format_elapsed(10_000, 0), "0 minute");
    }

    #[test]
    fn test_format_elapsed_extreme_starts() {
        assert_eq!(format_elapsed(i64::MAX, 1_700_000_000_000), "0 minute");
        assert_eq!(
            format_elapsed(i64::MIN, 1_700_000_000_000),
            "2562047788015 hours 12 minutes"
        );
    }

    #[test]
    fn test_emoji_image_only_for_custom_emoji() {
        let custom = Emoji { id: Some("9".into()), name: "blob".into(), animated: true };
        let unicode = Emoji { id: None, name: "🙂".into(), animated: false };
        assert_eq!(
            custom.image_url().as_deref(),
            Some("https://cdn.discordapp.com/emojis/9.gif?size=24")
        );
        assert_eq!(unicode.image_url(), None);
    }
}
