use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::core::tarot::{CardSpread, SpreadError, Toggle};
use crate::models::SoulMateSubmission;

pub const TOTAL_STEPS: u8 = 7;

/// Offered zodiac choices for step 4
pub const ZODIAC_SIGNS: [&str; 12] = [
    "aries", "touro", "gemeos", "cancer", "leao", "virgem",
    "libra", "escorpiao", "sagitario", "capricornio", "aquario", "peixes",
];

/// Offered height choices for step 5
pub const HEIGHTS: [&str; 3] = ["baixo", "medio", "alto"];

/// Quiz screens, one field group each
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormStep {
    Name = 1,
    Birthdate = 2,
    City = 3,
    ZodiacSign = 4,
    Height = 5,
    Email = 6,
    Cards = 7,
}

impl FormStep {
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Name),
            2 => Some(Self::Birthdate),
            3 => Some(Self::City),
            4 => Some(Self::ZodiacSign),
            5 => Some(Self::Height),
            6 => Some(Self::Email),
            7 => Some(Self::Cards),
            _ => None,
        }
    }

    /// Fields validated when leaving this step
    pub fn fields(self) -> &'static [FormField] {
        match self {
            Self::Name => &[FormField::Name],
            Self::Birthdate => &[FormField::Birthdate],
            Self::City => &[FormField::City],
            Self::ZodiacSign => &[FormField::ZodiacSign],
            Self::Height => &[FormField::Height],
            Self::Email => &[FormField::Email],
            Self::Cards => &[FormField::TarotCards],
        }
    }

    /// Fixed options offered on this screen; empty for free-text steps
    pub fn choices(self) -> &'static [&'static str] {
        match self {
            Self::ZodiacSign => &ZODIAC_SIGNS,
            Self::Height => &HEIGHTS,
            _ => &[],
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Name => "Qual é o seu nome?",
            Self::Birthdate => "Quando você nasceu?",
            Self::City => "Onde você mora?",
            Self::ZodiacSign => "Qual o seu signo?",
            Self::Height => "Qual a sua altura?",
            Self::Email => "Seu e-mail",
            Self::Cards => "Escolha 3 cartas do Tarot",
        }
    }
}

impl fmt::Display for FormStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Name,
    Birthdate,
    City,
    Email,
    ZodiacSign,
    Height,
    Preferences,
    TarotCards,
}

impl FormField {
    /// Accepts both the Rust field name and the camelCase wire name
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" => Some(Self::Name),
            "birthdate" => Some(Self::Birthdate),
            "city" => Some(Self::City),
            "email" => Some(Self::Email),
            "zodiac_sign" | "zodiacSign" => Some(Self::ZodiacSign),
            "height" => Some(Self::Height),
            "preferences" => Some(Self::Preferences),
            "tarot_cards" | "tarotCards" => Some(Self::TarotCards),
            _ => None,
        }
    }
}

/// Per-field messages shown inline under each input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<FormField, Vec<String>>);

impl FieldErrors {
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let mut map: BTreeMap<FormField, Vec<String>> = BTreeMap::new();
        for (key, errs) in errors.field_errors() {
            let key: &str = &key;
            let Some(field) = FormField::from_key(key) else {
                continue;
            };
            let messages = errs.iter().map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            });
            map.entry(field).or_default().extend(messages);
        }
        Self(map)
    }

    /// Keep only the errors for the given fields
    pub fn restricted_to(mut self, fields: &[FormField]) -> Self {
        self.0.retain(|field, _| fields.contains(field));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: FormField) -> Option<&[String]> {
        self.0.get(&field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = FormField> + '_ {
        self.0.keys().copied()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, msgs)| format!("{:?}: {}", field, msgs.join(", ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("step {step} is invalid: {errors}")]
    InvalidStep { step: FormStep, errors: FieldErrors },

    #[error("submission is invalid: {0}")]
    InvalidSubmission(FieldErrors),

    #[error("card selection is only available on step 7")]
    NotSelectingCards,

    #[error(transparent)]
    Spread(#[from] SpreadError),
}

/// Step-by-step controller for the soul mate quiz
///
/// Holds the current step and the draft submission. Moving backward never
/// touches the draft, so previously entered values survive a round trip.
#[derive(Debug, Clone)]
pub struct FormController {
    step: FormStep,
    draft: SoulMateSubmission,
    spread: Option<CardSpread>,
    errors: FieldErrors,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new()
    }
}

impl FormController {
    pub fn new() -> Self {
        Self {
            step: FormStep::Name,
            draft: SoulMateSubmission::default(),
            spread: None,
            errors: FieldErrors::default(),
        }
    }

    pub fn step(&self) -> FormStep {
        self.step
    }

    pub fn draft(&self) -> &SoulMateSubmission {
        &self.draft
    }

    /// Edit the draft; inline errors are kept until the next validation
    pub fn draft_mut(&mut self) -> &mut SoulMateSubmission {
        &mut self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn spread(&self) -> Option<&CardSpread> {
        self.spread.as_ref()
    }

    pub fn progress(&self) -> f64 {
        f64::from(self.step.number()) / f64::from(TOTAL_STEPS) * 100.0
    }

    fn validate_step(&self, step: FormStep) -> FieldErrors {
        match self.draft.validate() {
            Ok(()) => FieldErrors::default(),
            Err(errors) => FieldErrors::from_validation(&errors).restricted_to(step.fields()),
        }
    }

    /// Validate the current step and move forward
    ///
    /// Leaving the email step opens the card spread instead of a plain step.
    /// On the card step this is equivalent to checking the selection and
    /// stays put; use [`FormController::confirm`] to finish.
    pub fn advance(&mut self) -> Result<FormStep, FormError> {
        if self.step == FormStep::Cards {
            self.sync_cards();
        }

        let errors = self.validate_step(self.step);
        if !errors.is_empty() {
            tracing::debug!("Step {} blocked: {}", self.step, errors);
            self.errors = errors.clone();
            return Err(FormError::InvalidStep { step: self.step, errors });
        }
        self.errors = FieldErrors::default();

        self.step = match self.step {
            FormStep::Email => {
                self.spread.get_or_insert_with(CardSpread::new);
                FormStep::Cards
            }
            FormStep::Cards => FormStep::Cards,
            other => FormStep::from_number(other.number() + 1).unwrap_or(other),
        };
        Ok(self.step)
    }

    pub fn back(&mut self) -> FormStep {
        if let Some(prev) = self.step.number().checked_sub(1).and_then(FormStep::from_number) {
            self.step = prev;
            self.errors = FieldErrors::default();
        }
        self.step
    }

    pub fn toggle_card(&mut self, id: u32) -> Result<Toggle, FormError> {
        let spread = self
            .spread
            .as_mut()
            .filter(|_| self.step == FormStep::Cards)
            .ok_or(FormError::NotSelectingCards)?;
        let toggle = spread.toggle(id)?;
        self.sync_cards();
        Ok(toggle)
    }

    pub fn redeal(&mut self) -> Result<(), FormError> {
        let spread = self.spread.as_mut().ok_or(FormError::NotSelectingCards)?;
        spread.redeal();
        self.sync_cards();
        Ok(())
    }

    fn sync_cards(&mut self) {
        if let Some(spread) = &self.spread {
            self.draft.tarot_cards = spread.selected().to_vec();
        }
    }

    /// Finish the quiz and produce the submission to send
    pub fn confirm(&mut self) -> Result<SoulMateSubmission, FormError> {
        let spread = self
            .spread
            .as_ref()
            .filter(|_| self.step == FormStep::Cards)
            .ok_or(FormError::NotSelectingCards)?;
        let cards = spread.reveal()?;
        self.draft.tarot_cards = cards;

        if let Err(errors) = self.draft.validate() {
            let errors = FieldErrors::from_validation(&errors);
            self.errors = errors.clone();
            return Err(FormError::InvalidSubmission(errors));
        }
        self.errors = FieldErrors::default();
        Ok(self.draft.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_through_email() -> FormController {
        let mut form = FormController::new();
        form.draft_mut().name = "Ana".to_string();
        form.advance().unwrap();
        form.draft_mut().birthdate = "1990-01-01".to_string();
        form.advance().unwrap();
        form.advance().unwrap();
        form.draft_mut().zodiac_sign = "leao".to_string();
        form.advance().unwrap();
        form.advance().unwrap();
        form
    }

    #[test]
    fn test_empty_name_blocks_first_step() {
        let mut form = FormController::new();
        let err = form.advance().unwrap_err();
        assert!(matches!(err, FormError::InvalidStep { step: FormStep::Name, .. }));
        assert_eq!(form.step(), FormStep::Name);
        assert_eq!(form.errors().get(FormField::Name).unwrap(), ["Nome é obrigatório"]);
    }

    #[test]
    fn test_later_step_errors_do_not_block_earlier_steps() {
        let mut form = FormController::new();
        form.draft_mut().name = "Ana".to_string();
        // birthdate and cards are still empty, but only name is checked here
        assert_eq!(form.advance().unwrap(), FormStep::Birthdate);
    }

    #[test]
    fn test_email_step_opens_spread() {
        let mut form = filled_through_email();
        assert_eq!(form.step(), FormStep::Email);
        assert!(form.spread().is_none());
        assert_eq!(form.advance().unwrap(), FormStep::Cards);
        assert!(form.spread().is_some());
    }

    #[test]
    fn test_bad_email_blocks_spread() {
        let mut form = filled_through_email();
        form.draft_mut().email = "ana@".to_string();
        assert!(form.advance().is_err());
        assert_eq!(form.step(), FormStep::Email);
        assert!(form.errors().get(FormField::Email).is_some());
    }

    #[test]
    fn test_confirm_requires_three_cards() {
        let mut form = filled_through_email();
        form.advance().unwrap();
        form.toggle_card(1).unwrap();
        form.toggle_card(2).unwrap();
        assert!(matches!(
            form.confirm(),
            Err(FormError::Spread(SpreadError::Incomplete { selected: 2 }))
        ));
        form.toggle_card(3).unwrap();
        let submission = form.confirm().unwrap();
        assert_eq!(submission.tarot_cards, vec![1, 2, 3]);
        assert_eq!(submission.zodiac_sign, "leao");
    }

    #[test]
    fn test_cards_unavailable_before_step_seven() {
        let mut form = FormController::new();
        assert_eq!(form.toggle_card(1), Err(FormError::NotSelectingCards));
    }

    #[test]
    fn test_progress() {
        let form = FormController::new();
        assert!((form.progress() - 100.0 / 7.0).abs() < 1e-9);
    }
}
