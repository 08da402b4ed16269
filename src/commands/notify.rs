//! Push notifications and smart-response training

use std::path::PathBuf;

use colored::Colorize;

use super::Context;
use crate::api::endpoints::AudioSource;
use crate::error::{ApiError, Result};
use crate::notify::NotificationDraft;
use crate::session::{require_role, Role};

/// `adminctl notify`
///
/// # Errors
///
/// Returns error for an invalid draft (nothing is sent), a missing session
/// or a failed request
pub async fn send_notification(
    ctx: &Context,
    title: &str,
    body: &str,
    image_url: Option<String>,
    target_url: Option<String>,
) -> Result<()> {
    let mut draft = NotificationDraft {
        title: title.to_string(),
        body: body.to_string(),
        image_url,
        target_url,
    };

    let response = draft.send(&ctx.client).await?;
    let mut summary = format!("Notification sent to {} devices", response.success_count);
    if let Some(failed) = response.failure_count.filter(|n| *n > 0) {
        summary.push_str(&format!(" ({} failed)", failed));
    }
    println!("{}", summary.green());
    Ok(())
}

/// Pick the audio source; exactly one must be given
///
/// # Errors
///
/// `ValidationFailed` when both or neither are present
pub fn audio_source(file: Option<PathBuf>, url: Option<String>) -> std::result::Result<AudioSource, ApiError> {
    let url = url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
    match (file, url) {
        (Some(path), None) => Ok(AudioSource::File(path)),
        (None, Some(url)) => Ok(AudioSource::Url(url)),
        (Some(_), Some(_)) => Err(ApiError::ValidationFailed(
            "give either an audio file or an audio URL, not both".to_string(),
        )),
        (None, None) => Err(ApiError::ValidationFailed(
            "an audio file or audio URL is required".to_string(),
        )),
    }
}

/// `adminctl train`
///
/// # Errors
///
/// Returns error for blank question/answer or a bad audio source (nothing
/// is sent), a missing session or a failed request
pub async fn train_smart_response(
    ctx: &Context,
    question: &str,
    answer: &str,
    audio_file: Option<PathBuf>,
    audio_url: Option<String>,
) -> Result<()> {
    let question = question.trim();
    let answer = answer.trim();
    if question.is_empty() || answer.is_empty() {
        return Err(ApiError::ValidationFailed("question and answer are required".to_string()).into());
    }
    let audio = audio_source(audio_file, audio_url)?;
    require_role(ctx.session().as_ref(), Role::Admin)?;

    tracing::info!(upload = matches!(audio, AudioSource::File(_)), "Saving smart response");
    let response = ctx.client.smart_response(question, answer, &audio).await?;
    let message = response
        .message
        .unwrap_or_else(|| "Smart response saved".to_string());
    println!("{}", message.green());
    Ok(())
}
