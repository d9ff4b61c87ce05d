use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::core::tarot::{is_catalog_card, SELECTION_SIZE};

/// Soul mate quiz submission
///
/// Mirrors the JSON the matching backend expects on `POST /submit`.
/// Optional text fields default to empty strings so a partially filled
/// draft round-trips through the form controller unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct SoulMateSubmission {
    #[validate(custom(function = "validate_required_name"))]
    pub name: String,
    #[validate(custom(function = "validate_birthdate"))]
    pub birthdate: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    #[validate(custom(function = "validate_optional_email"))]
    pub email: String,
    #[serde(default, rename = "zodiacSign")]
    pub zodiac_sign: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub preferences: String,
    #[serde(default, rename = "tarotCards")]
    #[validate(custom(function = "validate_tarot_cards"))]
    pub tarot_cards: Vec<u32>,
}

impl SoulMateSubmission {
    pub fn new(name: impl Into<String>, birthdate: impl Into<String>, tarot_cards: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            birthdate: birthdate.into(),
            tarot_cards,
            ..Self::default()
        }
    }
}

fn validate_required_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(error_with_message("required", "Nome é obrigatório"));
    }
    Ok(())
}

fn validate_birthdate(birthdate: &str) -> Result<(), ValidationError> {
    let trimmed = birthdate.trim();
    if trimmed.is_empty() {
        return Err(error_with_message("required", "Data de nascimento é obrigatória"));
    }
    chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| error_with_message("date", "Data de nascimento inválida"))
}

/// Email is optional: the empty string passes, anything else must be an address
fn validate_optional_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.validate_email() {
        Ok(())
    } else {
        Err(error_with_message("email", "Email inválido"))
    }
}

fn validate_tarot_cards(cards: &[u32]) -> Result<(), ValidationError> {
    if cards.len() != SELECTION_SIZE {
        return Err(error_with_message("length", "Selecione exatamente 3 cartas"));
    }
    let distinct: HashSet<u32> = cards.iter().copied().collect();
    if distinct.len() != cards.len() {
        return Err(error_with_message("distinct", "As cartas devem ser diferentes"));
    }
    if let Some(unknown) = cards.iter().find(|id| !is_catalog_card(**id)) {
        let mut err = error_with_message("catalog", "Carta desconhecida");
        err.add_param("card".into(), unknown);
        return Err(err);
    }
    Ok(())
}

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}
