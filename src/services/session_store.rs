// src/services/session_store.rs
use crate::catalog::find_preset;
use crate::errors::StudioError;
use crate::models::*;
use crate::services::editor::{self, FieldUpdate};
use crate::services::gemini_service::ImageEditor;
use crate::services::prompt_builder::build_prompt;
use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Duration, Utc};
use log::{error, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

struct Session {
    id: Uuid,
    config: EditorConfiguration,
    status: SubmissionStatus,
    result: Option<GenerationResult>,
    error: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            config: EditorConfiguration::default(),
            status: SubmissionStatus::Idle,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            config: self.config.clone(),
            status: self.status,
            result: self.result.clone(),
            error: self.error.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Sessions untouched for this long are dropped.
pub const DEFAULT_IDLE_TTL_SECS: i64 = 86400;

/// In-memory editor sessions. Nothing survives a restart, and idle
/// sessions expire.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    idle_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_ttl(Duration::seconds(DEFAULT_IDLE_TTL_SECS))
    }
}

impl SessionStore {
    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Drops sessions idle for longer than the TTL. A session with a
    /// generation in flight is kept regardless of age.
    pub async fn evict_idle(&self) -> usize {
        let cutoff = Utc::now() - self.idle_ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| {
            session.status == SubmissionStatus::Submitting || session.updated_at > cutoff
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {} idle session(s), {} remaining", evicted, sessions.len());
        }
        evicted
    }

    async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&Session) -> Result<T, StudioError>,
    ) -> Result<T, StudioError> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(&id)
            .ok_or_else(|| StudioError::SessionNotFound(id.to_string()))?;
        f(session)
    }

    async fn with_session_mut<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> Result<T, StudioError>,
    ) -> Result<T, StudioError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| StudioError::SessionNotFound(id.to_string()))?;
        f(session)
    }

    pub async fn create(&self) -> SessionView {
        self.evict_idle().await;
        let session = Session::new();
        let view = session.view();
        self.sessions.write().await.insert(session.id, session);
        info!("Created editor session {}", view.id);
        view
    }

    pub async fn get(&self, id: Uuid) -> Result<SessionView, StudioError> {
        self.with_session(id, |session| Ok(session.view())).await
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), StudioError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StudioError::SessionNotFound(id.to_string()))
    }

    pub async fn update_field(
        &self,
        id: Uuid,
        update: FieldUpdate,
    ) -> Result<EditorConfiguration, StudioError> {
        self.with_session_mut(id, |session| {
            session.config = editor::apply_update(&session.config, update)?;
            session.touch();
            Ok(session.config.clone())
        })
        .await
    }

    pub async fn set_image(
        &self,
        id: Uuid,
        slot: ImageSlot,
        image: Option<ImageAttachment>,
    ) -> Result<EditorConfiguration, StudioError> {
        self.with_session_mut(id, |session| {
            session.config = editor::set_image(&session.config, slot, image);
            session.touch();
            Ok(session.config.clone())
        })
        .await
    }

    pub async fn apply_preset(
        &self,
        id: Uuid,
        preset_name: &str,
    ) -> Result<EditorConfiguration, StudioError> {
        let preset = find_preset(preset_name)
            .ok_or_else(|| StudioError::Validation(format!("Unknown preset: {}", preset_name)))?;

        self.with_session_mut(id, |session| {
            session.config = editor::apply_preset(&session.config, preset);
            session.touch();
            Ok(session.config.clone())
        })
        .await
    }

    pub async fn prompt(&self, id: Uuid, language: Language) -> Result<String, StudioError> {
        self.with_session(id, |session| Ok(build_prompt(&session.config, language)))
            .await
    }

    /// Runs one generation for the session. Only one may be in flight per
    /// session; the call itself runs on its own task so the outcome is
    /// recorded even if the caller goes away.
    pub async fn submit(
        self: &Arc<Self>,
        id: Uuid,
        language: Language,
        editor: Arc<dyn ImageEditor>,
    ) -> Result<SessionView, StudioError> {
        let snapshot = self
            .with_session_mut(id, |session| {
                if session.status == SubmissionStatus::Submitting {
                    return Err(StudioError::SubmissionInProgress(id.to_string()));
                }
                if session.config.base_image.is_none() {
                    let err = StudioError::MissingInput(language.base_image_missing().to_string());
                    session.error = Some(err.to_string());
                    session.status = SubmissionStatus::Failed;
                    session.touch();
                    return Err(err);
                }

                session.status = SubmissionStatus::Submitting;
                session.result = None;
                session.error = None;
                session.touch();
                Ok(editor::submission_snapshot(&session.config))
            })
            .await?;

        info!(
            "Submitting session {} (seed={}, language={:?})",
            id, snapshot.seed, language
        );

        let store = Arc::clone(self);
        let task = tokio::spawn(async move {
            let outcome = editor.generate_edit(&snapshot, language).await;
            store.finish_submission(id, language, outcome).await
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                let err = StudioError::RemoteCall(format!("Generation task failed: {}", e));
                self.with_session_mut(id, |session| {
                    session.status = SubmissionStatus::Failed;
                    session.error = Some(err.to_string());
                    session.touch();
                    Ok(())
                })
                .await?;
                Err(err)
            }
        }
    }

    async fn finish_submission(
        &self,
        id: Uuid,
        language: Language,
        outcome: Result<GenerationResult, StudioError>,
    ) -> Result<SessionView, StudioError> {
        self.with_session_mut(id, |session| {
            session.touch();
            match outcome {
                Ok(result) => {
                    if result.image_b64.is_some() {
                        session.status = SubmissionStatus::Succeeded;
                    } else {
                        let partial = StudioError::PartialResponse(
                            language.model_did_not_return_image().to_string(),
                        );
                        warn!("Session {}: {}", id, partial);
                        session.status = SubmissionStatus::Failed;
                        session.error = Some(partial.to_string());
                    }
                    session.result = Some(result);
                    Ok(session.view())
                }
                Err(e) => {
                    error!("Generation failed for session {}: {}", id, e);
                    session.status = SubmissionStatus::Failed;
                    session.error = Some(e.to_string());
                    Err(e)
                }
            }
        })
        .await
    }

    /// Decoded bytes and MIME type of the latest generated image.
    pub async fn result_image(&self, id: Uuid) -> Result<(Vec<u8>, String), StudioError> {
        let (encoded, mime_type) = self
            .with_session(id, |session| {
                let result = session.result.as_ref();
                match result.and_then(|r| r.image_b64.clone()) {
                    Some(encoded) => {
                        let mime_type = result
                            .and_then(|r| r.image_mime_type.clone())
                            .unwrap_or_else(|| "image/png".to_string());
                        Ok((encoded, mime_type))
                    }
                    None => Err(StudioError::Validation(
                        "No generated image available".to_string(),
                    )),
                }
            })
            .await?;

        let data = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| StudioError::Serialization(format!("Failed to decode image: {}", e)))?;
        Ok((data, mime_type))
    }

    pub async fn result_metadata(&self, id: Uuid) -> Result<serde_json::Value, StudioError> {
        self.with_session(id, |session| {
            session
                .result
                .as_ref()
                .and_then(|r| r.metadata.clone())
                .ok_or_else(|| StudioError::Validation("No metadata available".to_string()))
        })
        .await
    }
}
