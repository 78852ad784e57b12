//! Turn endpoint: multipart in, synthesized WAV out

use std::sync::Arc;

use axum::{
    Router,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::{HeaderMap, HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};

use super::ApiState;
use super::form::TurnForm;
use crate::locale::RequestLocale;
use crate::turn::{TurnError, TurnReply, TurnRequest};

/// Response header carrying the percent-encoded transcript
pub const TRANSCRIPT_HEADER: &str = "x-transcript";

/// Response header carrying the percent-encoded reply text
pub const RESPONSE_HEADER: &str = "x-response";

/// Build turn router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api", post(handle_turn))
        .with_state(state)
}

/// Run one conversation turn
async fn handle_turn(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, TurnError> {
    let multipart = multipart.map_err(|e| {
        tracing::debug!(error = %e, "rejected non-multipart request");
        TurnError::InvalidRequest
    })?;

    let form = TurnForm::from_multipart(multipart).await?;
    tracing::debug!(
        audio = form.input.is_audio(),
        history = form.history.len(),
        "accepted turn request"
    );

    let reply = state
        .turn
        .run(TurnRequest {
            input: form.input,
            history: form.history,
            locale: RequestLocale::from_headers(&headers),
        })
        .await?;

    Ok(audio_response(reply))
}

/// WAV body with transcript and reply echoed in percent-encoded headers
fn audio_response(reply: TurnReply) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/wav".to_string()),
            (
                HeaderName::from_static(TRANSCRIPT_HEADER),
                urlencoding::encode(&reply.transcript).into_owned(),
            ),
            (
                HeaderName::from_static(RESPONSE_HEADER),
                urlencoding::encode(&reply.reply).into_owned(),
            ),
        ],
        reply.audio,
    )
        .into_response()
}

impl IntoResponse for TurnError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::InvalidRequest | Self::InvalidAudio => StatusCode::BAD_REQUEST,
            Self::CompletionFailed | Self::SynthesisFailed => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}
