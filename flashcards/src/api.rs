use serde::{Deserialize, de::DeserializeOwned};
use word_api::{
    CODE_OK, CODE_UNAUTHORIZED, Envelope, LegacyEnvelope, LegacyWordPage, Stats, WordEntry,
    WordPage,
    auth::{AuthPayload, ChangePasswordRequest, LoginRequest, ProfileUpdate, RegisterRequest, UserProfile},
    tags::{ForgetAllResponse, ForgetWordsResponse, KnownWords, MarkResponse, MarkStatus},
};

use crate::error::ApiError;
use crate::pager::PageResult;

pub mod paths {
    pub const WORDS: &str = "/api/words";
    pub const SEARCH: &str = "/api/search";
    pub const STATS: &str = "/api/stats";
    pub const MARK: &str = "/api/word-tags/mark";
    pub const UNMARK: &str = "/api/word-tags/unmark";
    pub const STATUS: &str = "/api/word-tags/status";
    pub const KNOWN_WORDS: &str = "/api/word-tags/known-words";
    pub const FORGET_WORDS: &str = "/api/word-tags/forget-words";
    pub const FORGET_ALL: &str = "/api/word-tags/forget-all";
    pub const LOGIN: &str = "/api/auth/login";
    pub const REGISTER: &str = "/api/auth/register";
    pub const ME: &str = "/api/auth/me";
    pub const PROFILE: &str = "/api/auth/profile";
    pub const CHANGE_PASSWORD: &str = "/api/auth/change-password";
}

/// Code reported for a legacy `{success: false}` response, which carries no
/// numeric code of its own.
pub const LEGACY_FAILURE_CODE: i64 = -1;

/// The Word Hero backend as seen by the client.
///
/// Calls taking a `token` are authenticated with a bearer header.
#[allow(async_fn_in_trait)]
pub trait WordApi {
    async fn list_words(&self, page: u32, page_size: u32) -> Result<PageResult, ApiError>;
    async fn search(&self, query: &str) -> Result<Vec<WordEntry>, ApiError>;
    async fn stats(&self) -> Result<Stats, ApiError>;

    async fn mark_known(&self, token: &str, word_id: &str) -> Result<MarkResponse, ApiError>;
    async fn unmark_known(&self, token: &str, word_id: &str) -> Result<MarkResponse, ApiError>;
    async fn mark_status(&self, token: &str, word_id: &str) -> Result<MarkStatus, ApiError>;
    async fn known_words(&self, token: &str) -> Result<KnownWords, ApiError>;
    async fn forget_words(
        &self,
        token: &str,
        word_ids: &[String],
    ) -> Result<ForgetWordsResponse, ApiError>;
    async fn forget_all(&self, token: &str) -> Result<ForgetAllResponse, ApiError>;

    async fn login(&self, request: &LoginRequest) -> Result<AuthPayload, ApiError>;
    async fn register(&self, request: &RegisterRequest) -> Result<AuthPayload, ApiError>;
    async fn me(&self, token: &str) -> Result<UserProfile, ApiError>;
    async fn update_profile(
        &self,
        token: &str,
        request: &ProfileUpdate,
    ) -> Result<UserProfile, ApiError>;
    async fn change_password(
        &self,
        token: &str,
        request: &ChangePasswordRequest,
    ) -> Result<(), ApiError>;
}

/// Unwraps either envelope flavour, yielding the `data` member if any.
fn open<T: DeserializeOwned>(status: u16, body: &str) -> Result<Option<T>, ApiError> {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if status == 401 => return Err(ApiError::unauthorized("")),
        Err(e) => return Err(ApiError::Malformed(format!("HTTP {status}: {e}"))),
    };

    if value.get("code").is_some() {
        let envelope: Envelope<T> =
            serde_json::from_value(value).map_err(|e| ApiError::Malformed(e.to_string()))?;
        return match envelope.code {
            CODE_OK => Ok(envelope.data),
            CODE_UNAUTHORIZED => Err(ApiError::unauthorized(envelope.msg)),
            code => Err(ApiError::api(code, envelope.msg)),
        };
    }

    if value.get("success").is_some() {
        let envelope: LegacyEnvelope<T> =
            serde_json::from_value(value).map_err(|e| ApiError::Malformed(e.to_string()))?;
        return if envelope.success {
            Ok(envelope.data)
        } else {
            Err(ApiError::api(
                LEGACY_FAILURE_CODE,
                envelope.error.unwrap_or_default(),
            ))
        };
    }

    if status == 401 {
        Err(ApiError::unauthorized(""))
    } else {
        Err(ApiError::Malformed(format!("HTTP {status}: missing envelope")))
    }
}

/// Decodes a response whose `data` member is required.
pub fn decode<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    open(status, body)?.ok_or_else(|| ApiError::Malformed("missing data".to_owned()))
}

/// Decodes a response where only success matters.
pub fn decode_unit(status: u16, body: &str) -> Result<(), ApiError> {
    open::<serde::de::IgnoredAny>(status, body).map(|_| ())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageBody {
    // Tried first: the current shape has only defaulted fields and would
    // match anything.
    Legacy(LegacyWordPage),
    Current(WordPage),
}

/// Decodes a word listing in either the current or the legacy shape.
pub fn decode_page(status: u16, body: &str) -> Result<PageResult, ApiError> {
    match decode::<PageBody>(status, body)? {
        PageBody::Current(page) => Ok(page.into()),
        PageBody::Legacy(page) => Ok(page.into()),
    }
}

pub fn decode_search(status: u16, body: &str) -> Result<Vec<WordEntry>, ApiError> {
    decode::<word_api::SearchResults>(status, body).map(|found| found.results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_page_envelope() {
        let page = decode_page(
            200,
            r#"{"code":0,"data":{"items":[{"id":"1","english":"able","chinese":"能"}],"total":50}}"#,
        )
        .unwrap();
        assert_eq!(page.total, 50);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.reported_pages, None);
    }

    #[test]
    fn legacy_page_envelope() {
        let page = decode_page(
            200,
            r#"{"success":true,"data":{"words":[{"English":"able","Chinese":"能"}],
                "currentPage":2,"totalPages":9,"hasPrev":true,"hasNext":true,"startIndex":25}}"#,
        )
        .unwrap();
        assert_eq!(page.items[0].english, "able");
        assert_eq!(page.reported_pages, Some(9));
        assert_eq!(page.start_index, Some(25));
    }

    #[test]
    fn legacy_failure_surfaces_error_text() {
        let err = decode_search(200, r#"{"success":false,"error":"index offline"}"#).unwrap_err();
        assert_eq!(err, ApiError::api(LEGACY_FAILURE_CODE, "index offline"));
    }

    #[test]
    fn code_401_is_unauthorized() {
        let err = decode_unit(401, r#"{"code":401,"msg":"Bearer token is required"}"#).unwrap_err();
        assert_eq!(err, ApiError::Unauthorized("Bearer token is required".into()));

        let err = decode_unit(401, "Unauthorized").unwrap_err();
        assert!(err.needs_login());
    }

    #[test]
    fn api_failure_keeps_server_message() {
        let err = decode::<Stats>(200, r#"{"code":100000601,"msg":"搜索失败"}"#).unwrap_err();
        assert_eq!(err.to_string(), "搜索失败");
    }

    #[test]
    fn success_without_data_is_malformed_unless_unit() {
        assert!(matches!(
            decode::<Stats>(200, r#"{"code":0}"#),
            Err(ApiError::Malformed(_))
        ));
        assert_eq!(decode_unit(200, r#"{"code":0,"msg":"ok"}"#), Ok(()));
    }

    #[test]
    fn search_results_default_to_empty() {
        assert!(decode_search(200, r#"{"code":0,"data":{}}"#).unwrap().is_empty());
    }

    #[test]
    fn non_json_body_is_malformed() {
        assert!(matches!(
            decode::<Stats>(502, "<html>bad gateway</html>"),
            Err(ApiError::Malformed(_))
        ));
    }
}
