use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use crate::config::FunnelSettings;
use crate::core::engagement::{
    loading_timeline, EngagementPlayer, EngagementScript, EngagementState, LOADING_STEPS,
};
use crate::core::form::{FormController, FormError};
use crate::core::result_view::{legacy_share_url, share_url};
use crate::core::timeline::Scheduler;
use crate::models::SoulMateResult;
use crate::services::{ApiClient, ApiError};

/// Toast shown when the submission cannot reach the backend
pub const SUBMIT_FAILED_TOAST: &str =
    "Não conseguimos conectar com o universo no momento. Tente novamente.";

#[derive(Debug, Error)]
pub enum FunnelError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error("submission failed: {0}")]
    Submit(#[from] ApiError),

    #[error("cannot {action} while {stage}")]
    OutOfOrder { action: &'static str, stage: &'static str },
}

/// Where the visitor is in the funnel
#[derive(Debug, Clone, PartialEq)]
pub enum FunnelStage {
    Filling,
    Submitting { loading_step: usize },
    Engaging(EngagementState),
    AwaitingContinue { token: String },
    Redirected(String),
    Failed { toast: &'static str },
}

impl FunnelStage {
    /// Text of the loading indicator while the submission is in flight
    pub fn loading_label(&self) -> Option<&'static str> {
        match self {
            Self::Submitting { loading_step } => {
                loading_step.checked_sub(1).and_then(|i| LOADING_STEPS.get(i)).copied()
            }
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Filling => "filling the form",
            Self::Submitting { .. } => "submitting",
            Self::Engaging(_) => "engaging",
            Self::AwaitingContinue { .. } => "awaiting continue",
            Self::Redirected(_) => "redirected",
            Self::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    External(String),
}

/// One visitor's trip from the quiz to the payment page
pub struct FunnelSession {
    id: Uuid,
    form: FormController,
    api: ApiClient,
    script: EngagementScript,
    payment_url: String,
    public_origin: Option<String>,
    stage: FunnelStage,
    result: Option<SoulMateResult>,
}

impl FunnelSession {
    pub fn new(api: ApiClient, payment_url: impl Into<String>) -> Self {
        Self::with_script(api, payment_url, EngagementScript::default())
    }

    pub fn with_script(api: ApiClient, payment_url: impl Into<String>, script: EngagementScript) -> Self {
        Self {
            id: Uuid::new_v4(),
            form: FormController::new(),
            api,
            script,
            payment_url: payment_url.into(),
            public_origin: None,
            stage: FunnelStage::Filling,
            result: None,
        }
    }

    /// Session using the configured payment page and share-link origin
    pub fn from_settings(api: ApiClient, settings: &FunnelSettings) -> Self {
        let mut session = Self::new(api, settings.payment_url.clone());
        session.public_origin = settings
            .public_origin
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string);
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stage(&self) -> &FunnelStage {
        &self.stage
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormController {
        &mut self.form
    }

    pub fn result(&self) -> Option<&SoulMateResult> {
        self.result.as_ref()
    }

    /// Public link to the result page, once a result exists
    pub fn share_link(&self) -> Option<String> {
        let origin = self.public_origin.as_deref()?;
        self.result.as_ref().map(|r| share_url(origin, &r.token))
    }

    /// Older `?result=` form of [`FunnelSession::share_link`]
    pub fn legacy_share_link(&self) -> Option<String> {
        let origin = self.public_origin.as_deref()?;
        self.result.as_ref().map(|r| legacy_share_url(origin, &r.token))
    }

    fn out_of_order(&self, action: &'static str) -> FunnelError {
        FunnelError::OutOfOrder {
            action,
            stage: self.stage.label(),
        }
    }

    /// Confirm the card selection and send the submission
    ///
    /// The loading indicator advances while the request is in flight and is
    /// torn down as soon as it resolves. A failed request leaves the session
    /// in `Failed` with the toast to show; confirming again retries.
    pub async fn confirm(&mut self) -> Result<SoulMateResult, FunnelError> {
        if !matches!(self.stage, FunnelStage::Filling | FunnelStage::Failed { .. }) {
            return Err(self.out_of_order("confirm"));
        }
        let submission = self.form.confirm()?;

        self.stage = FunnelStage::Submitting { loading_step: 1 };
        let api = self.api.clone();
        let submit = api.submit(&submission);
        tokio::pin!(submit);

        let mut loading = Scheduler::start(loading_timeline());
        let outcome = loop {
            tokio::select! {
                result = &mut submit => break result,
                Some(step) = loading.next() => {
                    self.stage = FunnelStage::Submitting { loading_step: step };
                    tracing::debug!(session = %self.id, "Loading: {}", self.stage.loading_label().unwrap_or_default());
                }
            }
        };
        loading.cancel();

        match outcome {
            Ok(result) => {
                tracing::info!(session = %self.id, token = %result.token, "Soul mate assigned");
                self.result = Some(result.clone());
                self.stage = FunnelStage::Engaging(EngagementState::Idle);
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(session = %self.id, "Submission failed: {}", e);
                self.stage = FunnelStage::Failed {
                    toast: SUBMIT_FAILED_TOAST,
                };
                Err(e.into())
            }
        }
    }

    /// Play the scripted screens; `open` is the modal's visibility flag
    pub async fn play_engagement<F>(
        &mut self,
        open: watch::Receiver<bool>,
        mut on_change: F,
    ) -> Result<EngagementState, FunnelError>
    where
        F: FnMut(&EngagementState),
    {
        let token = match (&self.stage, &self.result) {
            (FunnelStage::Engaging(_), Some(result)) => result.token.clone(),
            _ => return Err(self.out_of_order("play the engagement sequence")),
        };

        let mut player = EngagementPlayer::new(self.script.clone());
        let end = player.play(open, |state| on_change(state)).await;

        self.stage = match end {
            EngagementState::Complete => FunnelStage::AwaitingContinue { token },
            other => FunnelStage::Engaging(other),
        };
        Ok(end)
    }

    /// The visitor pressed continue: record the conversion, then leave for payment
    ///
    /// Tracking is best effort. A failed call is logged and the redirect
    /// happens anyway.
    pub async fn continue_to_payment(&mut self) -> Result<Navigation, FunnelError> {
        let FunnelStage::AwaitingContinue { token } = &self.stage else {
            return Err(self.out_of_order("continue to payment"));
        };

        match self.api.track_conversion(token).await {
            Ok(ack) => tracing::info!(
                session = %self.id,
                pixel_tracked = ack.pixel_tracked,
                "Conversion tracked"
            ),
            Err(e) => tracing::warn!(session = %self.id, "Failed to track conversion: {}", e),
        }

        tracing::info!(session = %self.id, "Redirecting to payment page");
        self.stage = FunnelStage::Redirected(self.payment_url.clone());
        Ok(Navigation::External(self.payment_url.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> FunnelSession {
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        FunnelSession::new(api, "https://pay.example/checkout")
    }

    #[tokio::test]
    async fn test_continue_requires_completed_engagement() {
        let mut funnel = session();
        let err = funnel.continue_to_payment().await.unwrap_err();
        assert!(matches!(err, FunnelError::OutOfOrder { .. }));
        assert_eq!(funnel.stage(), &FunnelStage::Filling);
    }

    #[tokio::test]
    async fn test_confirm_with_incomplete_form_stays_filling() {
        let mut funnel = session();
        let err = funnel.confirm().await.unwrap_err();
        assert!(matches!(err, FunnelError::Form(FormError::NotSelectingCards)));
        assert_eq!(funnel.stage(), &FunnelStage::Filling);
    }

    #[test]
    fn test_loading_labels_follow_steps() {
        assert_eq!(
            FunnelStage::Submitting { loading_step: 1 }.loading_label(),
            Some(LOADING_STEPS[0])
        );
        assert_eq!(
            FunnelStage::Submitting { loading_step: 3 }.loading_label(),
            Some(LOADING_STEPS[2])
        );
        assert_eq!(FunnelStage::Submitting { loading_step: 0 }.loading_label(), None);
        assert_eq!(FunnelStage::Filling.loading_label(), None);
    }

    #[test]
    fn test_from_settings_uses_configured_urls() {
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        let settings = FunnelSettings {
            payment_url: "https://pay.example/x".to_string(),
            service_name: "alma-gemea".to_string(),
            public_origin: Some("  ".to_string()),
        };
        let funnel = FunnelSession::from_settings(api, &settings);
        assert_eq!(funnel.payment_url, "https://pay.example/x");
        assert_eq!(funnel.public_origin, None);
        assert_eq!(funnel.share_link(), None);
    }

    #[tokio::test]
    async fn test_engagement_requires_result() {
        let mut funnel = session();
        let (_tx, rx) = watch::channel(true);
        assert!(funnel.play_engagement(rx, |_| {}).await.is_err());
    }
}
