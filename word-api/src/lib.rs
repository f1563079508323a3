use serde::{Deserialize, Serialize};

/// Response envelope used by every current endpoint.
///
/// `code == 0` is success and `code == 401` means the bearer token was
/// missing, invalid or expired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

pub const CODE_OK: i64 = 0;
pub const CODE_UNAUTHORIZED: i64 = 401;

/// Envelope of the first API revision, still served by older deployments for
/// listing, search and stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    #[serde(default, alias = "ID", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, alias = "English")]
    pub english: String,
    #[serde(default, alias = "Chinese")]
    pub chinese: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl WordEntry {
    pub fn new(id: Option<&str>, english: &str, chinese: &str) -> Self {
        Self {
            id: id.map(str::to_owned),
            english: english.to_owned(),
            chinese: chinese.to_owned(),
            ..Default::default()
        }
    }

    /// Identifier used for known-word bookkeeping: the id when the API
    /// provides one, the English text otherwise.
    pub fn key(&self) -> &str {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => &self.english,
        }
    }

    pub fn server_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordPage {
    #[serde(default)]
    pub items: Vec<WordEntry>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyWordPage {
    #[serde(default)]
    pub words: Vec<WordEntry>,
    pub current_page: u32,
    pub total_pages: u32,
    #[serde(default)]
    pub has_prev: bool,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub start_index: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub results: Vec<WordEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_words: u64,
    pub total_pages: u32,
    pub page_size: u32,
    #[serde(default)]
    pub file_source: String,
}

pub mod tags {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MarkRequest {
        pub word_id: String,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MarkResponse {
        #[serde(default)]
        pub word_id: String,
        #[serde(default)]
        pub is_marked: bool,
        #[serde(default)]
        pub mark_count: u32,
        #[serde(default)]
        pub message: String,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MarkStatus {
        pub word_id: String,
        pub is_marked: bool,
        #[serde(default)]
        pub mark_count: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub marked_at: Option<i64>,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct KnownWords {
        #[serde(default)]
        pub word_ids: Vec<String>,
        #[serde(default)]
        pub total_count: u64,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ForgetWordsRequest {
        pub word_ids: Vec<String>,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ForgetWordsResponse {
        #[serde(default)]
        pub word_ids: Vec<String>,
        #[serde(default)]
        pub forgotten_count: u64,
        #[serde(default)]
        pub message: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ForgetAllRequest {
        pub confirm: bool,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ForgetAllResponse {
        #[serde(default)]
        pub forgotten_count: u64,
        #[serde(default)]
        pub message: String,
    }
}

pub mod auth {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct RegisterRequest {
        pub username: String,
        pub email: String,
        pub password: String,
        #[serde(default)]
        pub full_name: String,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct ProfileUpdate {
        pub full_name: String,
        pub avatar_url: String,
        pub bio: String,
        pub email: String,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct ChangePasswordRequest {
        pub current_password: String,
        pub new_password: String,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct UserProfile {
        pub id: String,
        pub username: String,
        #[serde(default)]
        pub email: String,
        #[serde(default)]
        pub full_name: String,
        #[serde(default)]
        pub avatar_url: String,
        #[serde(default)]
        pub bio: String,
        #[serde(default)]
        pub role: String,
        #[serde(default)]
        pub is_active: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub last_login: Option<i64>,
        #[serde(default, rename = "createdAt")]
        pub created_at: i64,
        #[serde(default, rename = "updatedAt")]
        pub updated_at: i64,
    }

    impl UserProfile {
        /// Name shown in the account menu.
        pub fn display_name(&self) -> &str {
            if self.full_name.trim().is_empty() {
                &self.username
            } else {
                &self.full_name
            }
        }
    }

    /// Body of a successful login or registration.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct AuthPayload {
        pub token: String,
        pub user: UserProfile,
    }
}
