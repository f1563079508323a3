use flashcards::{
    ApiError, ClientConfig, PageResult, WordApi,
    api::{self, paths},
};
use gloo_net::http::{Request, RequestBuilder};
use word_api::{
    Stats, WordEntry,
    auth::{AuthPayload, ChangePasswordRequest, LoginRequest, ProfileUpdate, RegisterRequest, UserProfile},
    tags::{
        ForgetAllRequest, ForgetAllResponse, ForgetWordsRequest, ForgetWordsResponse, KnownWords,
        MarkRequest, MarkResponse, MarkStatus,
    },
};

/// [`WordApi`] over `fetch`.
#[derive(Clone, Debug)]
pub struct HttpApi {
    config: ClientConfig,
}

impl HttpApi {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        self.config.url(path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        Request::get(&self.url(path)).header("accept", "application/json")
    }

    fn post(&self, path: &str) -> RequestBuilder {
        Request::post(&self.url(path)).header("accept", "application/json")
    }
}

fn bearer(builder: RequestBuilder, token: &str) -> RequestBuilder {
    builder.header("Authorization", &format!("Bearer {}", token))
}

fn network(e: gloo_net::Error) -> ApiError {
    ApiError::Network(e.to_string())
}

/// Sends the request and returns the status with the raw body; decoding is
/// left to the `flashcards::api` decoders.
async fn send(request: Result<Request, gloo_net::Error>) -> Result<(u16, String), ApiError> {
    let request = request.map_err(network)?;
    let method = request.method();
    let url = request.url();
    let resp = request.send().await.map_err(|e| {
        tracing::warn!(%url, ?method, error = %e, "request failed");
        network(e)
    })?;
    let status = resp.status();
    tracing::debug!(%url, ?method, status, "response");
    let body = resp.text().await.map_err(network)?;
    Ok((status, body))
}

impl WordApi for HttpApi {
    async fn list_words(&self, page: u32, page_size: u32) -> Result<PageResult, ApiError> {
        let (status, body) = send(
            self.get(paths::WORDS)
                .query([("page", page.to_string()), ("pageSize", page_size.to_string())])
                .build(),
        )
        .await?;
        api::decode_page(status, &body)
    }

    async fn search(&self, query: &str) -> Result<Vec<WordEntry>, ApiError> {
        let (status, body) = send(self.get(paths::SEARCH).query([("q", query)]).build()).await?;
        api::decode_search(status, &body)
    }

    async fn stats(&self) -> Result<Stats, ApiError> {
        let (status, body) = send(self.get(paths::STATS).build()).await?;
        api::decode(status, &body)
    }

    async fn mark_known(&self, token: &str, word_id: &str) -> Result<MarkResponse, ApiError> {
        let request = bearer(self.post(paths::MARK), token).json(&MarkRequest {
            word_id: word_id.to_owned(),
        });
        let (status, body) = send(request).await?;
        // The mark endpoints may answer with an empty `data`.
        api::decode_unit(status, &body)?;
        Ok(api::decode(status, &body).unwrap_or_default())
    }

    async fn unmark_known(&self, token: &str, word_id: &str) -> Result<MarkResponse, ApiError> {
        let request = bearer(
            Request::delete(&self.url(paths::UNMARK)).header("accept", "application/json"),
            token,
        )
        .json(&MarkRequest {
            word_id: word_id.to_owned(),
        });
        let (status, body) = send(request).await?;
        api::decode_unit(status, &body)?;
        Ok(api::decode(status, &body).unwrap_or_default())
    }

    async fn mark_status(&self, token: &str, word_id: &str) -> Result<MarkStatus, ApiError> {
        let request = bearer(self.get(paths::STATUS), token)
            .query([("wordId", word_id)])
            .build();
        let (status, body) = send(request).await?;
        api::decode(status, &body)
    }

    async fn known_words(&self, token: &str) -> Result<KnownWords, ApiError> {
        let (status, body) = send(bearer(self.get(paths::KNOWN_WORDS), token).build()).await?;
        api::decode(status, &body)
    }

    async fn forget_words(
        &self,
        token: &str,
        word_ids: &[String],
    ) -> Result<ForgetWordsResponse, ApiError> {
        let request = bearer(self.post(paths::FORGET_WORDS), token).json(&ForgetWordsRequest {
            word_ids: word_ids.to_vec(),
        });
        let (status, body) = send(request).await?;
        api::decode_unit(status, &body)?;
        Ok(api::decode(status, &body).unwrap_or_default())
    }

    async fn forget_all(&self, token: &str) -> Result<ForgetAllResponse, ApiError> {
        let request =
            bearer(self.post(paths::FORGET_ALL), token).json(&ForgetAllRequest { confirm: true });
        let (status, body) = send(request).await?;
        api::decode_unit(status, &body)?;
        Ok(api::decode(status, &body).unwrap_or_default())
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthPayload, ApiError> {
        let (status, body) = send(self.post(paths::LOGIN).json(request)).await?;
        api::decode(status, &body)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthPayload, ApiError> {
        let (status, body) = send(self.post(paths::REGISTER).json(request)).await?;
        api::decode(status, &body)
    }

    async fn me(&self, token: &str) -> Result<UserProfile, ApiError> {
        let (status, body) = send(bearer(self.get(paths::ME), token).build()).await?;
        api::decode(status, &body)
    }

    async fn update_profile(
        &self,
        token: &str,
        request: &ProfileUpdate,
    ) -> Result<UserProfile, ApiError> {
        let builder = Request::put(&self.url(paths::PROFILE)).header("accept", "application/json");
        let (status, body) = send(bearer(builder, token).json(request)).await?;
        api::decode(status, &body)
    }

    async fn change_password(
        &self,
        token: &str,
        request: &ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        let (status, body) =
            send(bearer(self.post(paths::CHANGE_PASSWORD), token).json(request)).await?;
        api::decode_unit(status, &body)
    }
}
