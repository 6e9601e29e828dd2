//! User-facing message catalogs, selected from the configured API language tag.

/// Every message the client shows to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    pub fetch_error: &'static str,
    pub invalid_email: &'static str,
    pub short_password: &'static str,
    pub password_mismatch: &'static str,
    pub missing_nickname: &'static str,
}

pub const ENGLISH: Messages = Messages {
    fetch_error: "Something went wrong while loading data.",
    invalid_email: "Please enter a valid email address.",
    short_password: "Password must be at least 8 characters.",
    password_mismatch: "Passwords do not match.",
    missing_nickname: "Please enter a nickname.",
};

pub const KOREAN: Messages = Messages {
    fetch_error: "데이터를 불러오는 중 오류가 발생했습니다.",
    invalid_email: "올바른 이메일 형식을 입력해주세요.",
    short_password: "비밀번호는 8자 이상이어야 합니다.",
    password_mismatch: "비밀번호가 일치하지 않습니다.",
    missing_nickname: "닉네임을 입력해주세요.",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    English,
    Korean,
}

impl Locale {
    /// Picks the catalog by primary subtag (`ko-KR`, `ko_KR`, `ko`). Unknown tags fall back to English.
    pub fn from_language(tag: &str) -> Self {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default();
        if primary.eq_ignore_ascii_case("ko") {
            Locale::Korean
        } else {
            Locale::English
        }
    }

    pub fn messages(self) -> &'static Messages {
        match self {
            Locale::English => &ENGLISH,
            Locale::Korean => &KOREAN,
        }
    }
}
