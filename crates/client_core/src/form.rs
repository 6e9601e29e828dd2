//! Field state, pass-based validation and validation-gated submission.

use std::{collections::BTreeMap, fmt, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

/// Closed set of fields a form declares.
pub trait FormFields: Copy + Ord + fmt::Debug + Send + Sync + 'static {
    const ALL: &'static [Self];

    /// Name used by the collaborator (the input's `name` attribute).
    fn name(self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.name() == name)
    }
}

/// One string value per declared field. Never missing a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValues<F: FormFields> {
    values: BTreeMap<F, String>,
}

impl<F: FormFields> FieldValues<F> {
    pub fn empty() -> Self {
        Self {
            values: F::ALL.iter().map(|field| (*field, String::new())).collect(),
        }
    }

    pub fn with(mut self, field: F, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: F) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or_default()
    }

    pub fn set(&mut self, field: F, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, &str)> {
        self.values.iter().map(|(field, value)| (*field, value.as_str()))
    }
}

impl<F: FormFields> Default for FieldValues<F> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Per-field messages from one validation pass. A missing key means "no error".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors<F: FormFields> {
    errors: BTreeMap<F, String>,
}

impl<F: FormFields> FieldErrors<F> {
    pub fn none() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, field: F, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    pub fn get(&self, field: F) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = F> + '_ {
        self.errors.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, &str)> {
        self.errors.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl<F: FormFields> Default for FieldErrors<F> {
    fn default() -> Self {
        Self::none()
    }
}

pub type Validator<F> = Arc<dyn Fn(&FieldValues<F>) -> FieldErrors<F> + Send + Sync>;

#[async_trait]
pub trait SubmitAction<F: FormFields>: Send + Sync {
    async fn submit(&self, values: FieldValues<F>) -> Result<()>;
}

pub struct FnSubmit<Func>(Func);

#[async_trait]
impl<F, Func> SubmitAction<F> for FnSubmit<Func>
where
    F: FormFields,
    Func: Fn(FieldValues<F>) -> BoxFuture<'static, Result<()>> + Send + Sync,
{
    async fn submit(&self, values: FieldValues<F>) -> Result<()> {
        (self.0)(values).await
    }
}

/// Wraps a closure returning a boxed future as a [`SubmitAction`].
pub fn submit_fn<F, Func>(func: Func) -> Arc<dyn SubmitAction<F>>
where
    F: FormFields,
    Func: Fn(FieldValues<F>) -> BoxFuture<'static, Result<()>> + Send + Sync + 'static,
{
    Arc::new(FnSubmit(func))
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown form field '{0}'")]
pub struct UnknownField(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState<F: FormFields> {
    pub values: FieldValues<F>,
    pub errors: FieldErrors<F>,
    pub is_submitting: bool,
}

#[derive(Debug)]
pub enum SubmitOutcome<F: FormFields> {
    /// Validation produced errors; the submit action was not invoked.
    Invalid(FieldErrors<F>),
    Submitted,
    /// The submit action itself failed. Displaying it is up to the caller.
    Failed(anyhow::Error),
}

impl<F: FormFields> SubmitOutcome<F> {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted)
    }
}

/// Owns one form's values, errors and submission flag.
///
/// A second `on_submit` while one is already in flight is not rejected; callers
/// that need to block double submission should check `is_submitting` first.
pub struct FormController<F: FormFields> {
    state: watch::Sender<FormState<F>>,
    validator: Option<Validator<F>>,
    action: Arc<dyn SubmitAction<F>>,
}

impl<F: FormFields> FormController<F> {
    pub fn new(
        initial_values: FieldValues<F>,
        validator: Option<Validator<F>>,
        action: Arc<dyn SubmitAction<F>>,
    ) -> Self {
        let (state, _) = watch::channel(FormState {
            values: initial_values,
            errors: FieldErrors::none(),
            is_submitting: false,
        });
        Self {
            state,
            validator,
            action,
        }
    }

    /// Stores one field value. Errors from the last validation pass are left untouched.
    pub fn on_field_change(&self, field: F, value: impl Into<String>) {
        let value = value.into();
        self.state.send_modify(|state| state.values.set(field, value));
    }

    pub fn on_field_change_by_name(
        &self,
        name: &str,
        value: impl Into<String>,
    ) -> std::result::Result<(), UnknownField> {
        let field = F::from_name(name).ok_or_else(|| UnknownField(name.to_string()))?;
        self.on_field_change(field, value);
        Ok(())
    }

    /// Validates, then runs the submit action if there were no errors.
    ///
    /// Nothing navigates as a side effect of submitting; the outcome is returned
    /// for the caller to act on.
    pub async fn on_submit(&self) -> SubmitOutcome<F> {
        let values = self.state.borrow().values.clone();

        if let Some(validate) = &self.validator {
            let errors = validate(&values);
            let blocked = !errors.is_empty();
            let replacement = errors.clone();
            self.state.send_modify(|state| state.errors = replacement);
            if blocked {
                return SubmitOutcome::Invalid(errors);
            }
        }

        let _submitting = SubmittingFlag::raise(&self.state);
        match self.action.submit(values).await {
            Ok(()) => SubmitOutcome::Submitted,
            Err(err) => {
                debug!("submit action failed: {err:#}");
                SubmitOutcome::Failed(err)
            }
        }
    }

    pub fn values(&self) -> FieldValues<F> {
        self.state.borrow().values.clone()
    }

    pub fn errors(&self) -> FieldErrors<F> {
        self.state.borrow().errors.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.state.borrow().is_submitting
    }

    pub fn snapshot(&self) -> FormState<F> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState<F>> {
        self.state.subscribe()
    }
}

// Lowers `is_submitting` on drop, so a failed, panicking or cancelled action
// cannot leave it raised.
struct SubmittingFlag<'a, F: FormFields> {
    state: &'a watch::Sender<FormState<F>>,
}

impl<'a, F: FormFields> SubmittingFlag<'a, F> {
    fn raise(state: &'a watch::Sender<FormState<F>>) -> Self {
        state.send_modify(|state| state.is_submitting = true);
        Self { state }
    }
}

impl<F: FormFields> Drop for SubmittingFlag<'_, F> {
    fn drop(&mut self) {
        self.state.send_modify(|state| state.is_submitting = false);
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
