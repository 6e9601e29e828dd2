use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(MovieId);

impl MovieId {
    /// Route params arrive as raw strings; an empty or blank value means "no movie selected".
    pub fn from_route(raw: Option<&str>) -> Option<Self> {
        let raw = raw?.trim();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }
}

impl From<i64> for MovieId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

/// Catalog listing selected by the `/movies/:category` route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Popular,
    Upcoming,
    TopRated,
    NowPlaying,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Popular,
        Category::Upcoming,
        Category::TopRated,
        Category::NowPlaying,
    ];

    /// Unknown or missing tokens fall back to [`Category::Popular`].
    pub fn from_route(token: Option<&str>) -> Self {
        match token.map(str::trim) {
            Some("upcoming") => Self::Upcoming,
            Some("top-rated") | Some("top_rated") => Self::TopRated,
            Some("now-playing") | Some("now_playing") => Self::NowPlaying,
            _ => Self::Popular,
        }
    }

    pub fn route_token(self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::Upcoming => "upcoming",
            Self::TopRated => "top-rated",
            Self::NowPlaying => "now-playing",
        }
    }

    /// Path segment on the remote `/movie/{endpoint}` listing.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::Upcoming => "upcoming",
            Self::TopRated => "top_rated",
            Self::NowPlaying => "now_playing",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route_token())
    }
}

/// 1-based listing page. There is no upper bound; the server decides what lies past the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Page(u32);

impl Page {
    pub const FIRST: Page = Page(1);

    pub fn new(value: u32) -> Self {
        Self(value.max(1))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn is_first(self) -> bool {
        self.0 == 1
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub fn prev(self) -> Self {
        Self::new(self.0.saturating_sub(1))
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
