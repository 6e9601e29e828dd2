//! Login form and the three-step signup wizard.

use std::{
    fmt,
    sync::{Arc, OnceLock},
};

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use shared::locale::{Locale, Messages, ENGLISH};
use storage::{ScratchPad, SIGNUP_EMAIL_KEY};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{
    form::{
        FieldErrors, FieldValues, FormController, FormFields, SubmitAction, SubmitOutcome,
        UnknownField, Validator,
    },
    wizard::{Advance, CompletionHandler, WizardController, WizardError, WizardFlow},
};

pub const INVALID_EMAIL_MESSAGE: &str = ENGLISH.invalid_email;
pub const SHORT_PASSWORD_MESSAGE: &str = ENGLISH.short_password;
pub const PASSWORD_MISMATCH_MESSAGE: &str = ENGLISH.password_mismatch;
pub const MISSING_NICKNAME_MESSAGE: &str = ENGLISH.missing_nickname;

const MIN_PASSWORD_CHARS: usize = 8;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
            .expect("email pattern compiles")
    })
}

pub fn is_valid_email(candidate: &str) -> bool {
    email_pattern().is_match(candidate)
}

fn is_long_enough(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_CHARS
}

// ---- login ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoginField {
    Email,
    Password,
}

impl FormFields for LoginField {
    const ALL: &'static [Self] = &[LoginField::Email, LoginField::Password];

    fn name(self) -> &'static str {
        match self {
            LoginField::Email => "email",
            LoginField::Password => "password",
        }
    }
}

pub fn validate_login(values: &FieldValues<LoginField>) -> FieldErrors<LoginField> {
    login_errors(&ENGLISH, values)
}

fn login_errors(
    messages: &Messages,
    values: &FieldValues<LoginField>,
) -> FieldErrors<LoginField> {
    let mut errors = FieldErrors::none();
    if !is_valid_email(values.get(LoginField::Email)) {
        errors.insert(LoginField::Email, messages.invalid_email);
    }
    if !is_long_enough(values.get(LoginField::Password)) {
        errors.insert(LoginField::Password, messages.short_password);
    }
    errors
}

pub fn login_form(
    locale: Locale,
    action: Arc<dyn SubmitAction<LoginField>>,
) -> FormController<LoginField> {
    let messages = locale.messages();
    let validator: Validator<LoginField> =
        Arc::new(move |values: &FieldValues<LoginField>| login_errors(messages, values));
    FormController::new(FieldValues::empty(), Some(validator), action)
}

// ---- signup ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignupStep {
    Email,
    Password,
    Nickname,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EmailField {
    Email,
}

impl FormFields for EmailField {
    const ALL: &'static [Self] = &[EmailField::Email];

    fn name(self) -> &'static str {
        "email"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordField {
    Password,
    Confirm,
}

impl FormFields for PasswordField {
    const ALL: &'static [Self] = &[PasswordField::Password, PasswordField::Confirm];

    fn name(self) -> &'static str {
        match self {
            PasswordField::Password => "password",
            PasswordField::Confirm => "confirm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NicknameField {
    Nickname,
}

impl FormFields for NicknameField {
    const ALL: &'static [Self] = &[NicknameField::Nickname];

    fn name(self) -> &'static str {
        "nickname"
    }
}

pub fn validate_signup_email(values: &FieldValues<EmailField>) -> FieldErrors<EmailField> {
    signup_email_errors(&ENGLISH, values)
}

/// Length is checked on the password, the match on the confirmation field.
pub fn validate_signup_password(
    values: &FieldValues<PasswordField>,
) -> FieldErrors<PasswordField> {
    signup_password_errors(&ENGLISH, values)
}

pub fn validate_signup_nickname(
    values: &FieldValues<NicknameField>,
) -> FieldErrors<NicknameField> {
    signup_nickname_errors(&ENGLISH, values)
}

fn signup_email_errors(
    messages: &Messages,
    values: &FieldValues<EmailField>,
) -> FieldErrors<EmailField> {
    let mut errors = FieldErrors::none();
    if !is_valid_email(values.get(EmailField::Email)) {
        errors.insert(EmailField::Email, messages.invalid_email);
    }
    errors
}

fn signup_password_errors(
    messages: &Messages,
    values: &FieldValues<PasswordField>,
) -> FieldErrors<PasswordField> {
    let mut errors = FieldErrors::none();
    let password = values.get(PasswordField::Password);
    if !is_long_enough(password) {
        errors.insert(PasswordField::Password, messages.short_password);
    }
    if password != values.get(PasswordField::Confirm) {
        errors.insert(PasswordField::Confirm, messages.password_mismatch);
    }
    errors
}

fn signup_nickname_errors(
    messages: &Messages,
    values: &FieldValues<NicknameField>,
) -> FieldErrors<NicknameField> {
    let mut errors = FieldErrors::none();
    if values.get(NicknameField::Nickname).is_empty() {
        errors.insert(NicknameField::Nickname, messages.missing_nickname);
    }
    errors
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupPayload {
    Email(String),
    Password(String),
    Nickname(String),
}

/// Everything collected so far. Gains one field per completed step.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SignupDraft {
    pub email: Option<String>,
    pub password: Option<String>,
    pub nickname: Option<String>,
}

impl fmt::Debug for SignupDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupDraft")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("nickname", &self.nickname)
            .finish()
    }
}

pub struct SignupFlow;

impl WizardFlow for SignupFlow {
    type Step = SignupStep;
    type Payload = SignupPayload;
    type Accumulator = SignupDraft;

    const STEPS: &'static [SignupStep] =
        &[SignupStep::Email, SignupStep::Password, SignupStep::Nickname];
    const SCRATCH_KEYS: &'static [&'static str] = &[SIGNUP_EMAIL_KEY];

    fn step_of(payload: &SignupPayload) -> SignupStep {
        match payload {
            SignupPayload::Email(_) => SignupStep::Email,
            SignupPayload::Password(_) => SignupStep::Password,
            SignupPayload::Nickname(_) => SignupStep::Nickname,
        }
    }

    fn merge(draft: &mut SignupDraft, payload: SignupPayload) {
        match payload {
            SignupPayload::Email(email) => draft.email = Some(email),
            SignupPayload::Password(password) => draft.password = Some(password),
            SignupPayload::Nickname(nickname) => draft.nickname = Some(nickname),
        }
    }
}

/// Persists the email to the scratch pad before handing it to the wizard.
struct EmailStepAction {
    scratch: Arc<dyn ScratchPad>,
    payloads: mpsc::UnboundedSender<SignupPayload>,
}

#[async_trait]
impl SubmitAction<EmailField> for EmailStepAction {
    async fn submit(&self, values: FieldValues<EmailField>) -> Result<()> {
        let email = values.get(EmailField::Email).to_string();
        self.scratch.set(SIGNUP_EMAIL_KEY, &email).await?;
        self.payloads.send(SignupPayload::Email(email))?;
        Ok(())
    }
}

struct PasswordStepAction {
    payloads: mpsc::UnboundedSender<SignupPayload>,
}

#[async_trait]
impl SubmitAction<PasswordField> for PasswordStepAction {
    async fn submit(&self, values: FieldValues<PasswordField>) -> Result<()> {
        let password = values.get(PasswordField::Password).to_string();
        self.payloads.send(SignupPayload::Password(password))?;
        Ok(())
    }
}

struct NicknameStepAction {
    payloads: mpsc::UnboundedSender<SignupPayload>,
}

#[async_trait]
impl SubmitAction<NicknameField> for NicknameStepAction {
    async fn submit(&self, values: FieldValues<NicknameField>) -> Result<()> {
        let nickname = values.get(NicknameField::Nickname).to_string();
        self.payloads.send(SignupPayload::Nickname(nickname))?;
        Ok(())
    }
}

#[derive(Debug)]
pub enum StepOutcome {
    /// The step's own validation failed; its form holds the errors.
    Invalid,
    /// The step's submit action failed before the wizard saw a payload.
    Failed(anyhow::Error),
    Advanced(SignupStep),
    Completed,
}

/// Signup as email → password → nickname, one validated form per step.
pub struct SignupWizard {
    wizard: WizardController<SignupFlow>,
    scratch: Arc<dyn ScratchPad>,
    email_form: FormController<EmailField>,
    password_form: FormController<PasswordField>,
    nickname_form: FormController<NicknameField>,
    payloads: mpsc::UnboundedReceiver<SignupPayload>,
}

impl SignupWizard {
    pub fn new(
        scratch: Arc<dyn ScratchPad>,
        completion: Arc<dyn CompletionHandler<SignupDraft>>,
    ) -> Self {
        Self::with_locale(Locale::default(), scratch, completion)
    }

    pub fn with_locale(
        locale: Locale,
        scratch: Arc<dyn ScratchPad>,
        completion: Arc<dyn CompletionHandler<SignupDraft>>,
    ) -> Self {
        let messages = locale.messages();
        let (tx, payloads) = mpsc::unbounded_channel();

        let email_form = FormController::new(
            FieldValues::empty(),
            Some(Arc::new(move |values: &FieldValues<EmailField>| {
                signup_email_errors(messages, values)
            }) as Validator<EmailField>),
            Arc::new(EmailStepAction {
                scratch: Arc::clone(&scratch),
                payloads: tx.clone(),
            }),
        );
        let password_form = FormController::new(
            FieldValues::empty(),
            Some(Arc::new(move |values: &FieldValues<PasswordField>| {
                signup_password_errors(messages, values)
            }) as Validator<PasswordField>),
            Arc::new(PasswordStepAction {
                payloads: tx.clone(),
            }),
        );
        let nickname_form = FormController::new(
            FieldValues::empty(),
            Some(Arc::new(move |values: &FieldValues<NicknameField>| {
                signup_nickname_errors(messages, values)
            }) as Validator<NicknameField>),
            Arc::new(NicknameStepAction { payloads: tx }),
        );

        Self {
            wizard: WizardController::new(Arc::clone(&scratch), completion),
            scratch,
            email_form,
            password_form,
            nickname_form,
            payloads,
        }
    }

    pub fn current_step(&self) -> Option<SignupStep> {
        self.wizard.current_step()
    }

    pub fn is_completed(&self) -> bool {
        self.wizard.is_completed()
    }

    pub fn draft(&self) -> &SignupDraft {
        self.wizard.accumulator()
    }

    /// Email confirmed on the first step, shown above the later steps.
    pub fn email(&self) -> Option<&str> {
        self.wizard.accumulator().email.as_deref()
    }

    pub fn email_form(&self) -> &FormController<EmailField> {
        &self.email_form
    }

    pub fn password_form(&self) -> &FormController<PasswordField> {
        &self.password_form
    }

    pub fn nickname_form(&self) -> &FormController<NicknameField> {
        &self.nickname_form
    }

    /// Routes a named input to the form of the current step.
    pub fn set_field(
        &self,
        name: &str,
        value: impl Into<String>,
    ) -> std::result::Result<(), UnknownField> {
        match self.current_step() {
            Some(SignupStep::Email) => self.email_form.on_field_change_by_name(name, value),
            Some(SignupStep::Password) => self.password_form.on_field_change_by_name(name, value),
            Some(SignupStep::Nickname) => self.nickname_form.on_field_change_by_name(name, value),
            None => Err(UnknownField(name.to_string())),
        }
    }

    /// Submits the current step's form and, if it validated, advances the wizard.
    pub async fn submit_current_step(&mut self) -> std::result::Result<StepOutcome, WizardError> {
        let step = self.current_step().ok_or(WizardError::AlreadyCompleted)?;

        let submitted = match step {
            SignupStep::Email => settle(self.email_form.on_submit().await),
            SignupStep::Password => settle(self.password_form.on_submit().await),
            SignupStep::Nickname => settle(self.nickname_form.on_submit().await),
        };
        if let Some(outcome) = submitted {
            return Ok(outcome);
        }

        let payload = self
            .take_payload(step)
            .ok_or(WizardError::MissingPayload)?;
        match self.wizard.advance(payload).await? {
            Advance::Moved { to, .. } => {
                if to == SignupStep::Password {
                    self.recall_saved_email().await;
                }
                Ok(StepOutcome::Advanced(to))
            }
            Advance::Completed => Ok(StepOutcome::Completed),
        }
    }

    // Step forms are public, so a form submitted on its own can leave extra
    // payloads queued. Only the newest one for `step` is kept.
    fn take_payload(&mut self, step: SignupStep) -> Option<SignupPayload> {
        let mut latest = None;
        while let Ok(payload) = self.payloads.try_recv() {
            if SignupFlow::step_of(&payload) == step {
                latest = Some(payload);
            } else {
                debug!(?step, "dropping payload queued for another step");
            }
        }
        latest
    }

    async fn recall_saved_email(&self) {
        match self.scratch.get(SIGNUP_EMAIL_KEY).await {
            Ok(Some(saved)) => info!(email = %saved, "restored signup email from scratch pad"),
            Ok(None) => debug!("no signup email in scratch pad"),
            Err(err) => debug!("failed to read scratch pad: {err:#}"),
        }
    }
}

// `None` when the form submitted and a payload is waiting for the wizard.
fn settle<F: FormFields>(outcome: SubmitOutcome<F>) -> Option<StepOutcome> {
    match outcome {
        SubmitOutcome::Submitted => None,
        SubmitOutcome::Invalid(_) => Some(StepOutcome::Invalid),
        SubmitOutcome::Failed(err) => Some(StepOutcome::Failed(err)),
    }
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
