use serde::Serialize;
use thiserror::Error;

/// Number of cards a visitor must pick from the spread
pub const SELECTION_SIZE: usize = 3;

/// A card shown face down in the spread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TarotCard {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
}

/// Fixed catalog of the 10 displayed cards
pub const TAROT_CATALOG: [TarotCard; 10] = [
    TarotCard { id: 1, name: "O Louco", description: "Início de jornadas e novos começos" },
    TarotCard { id: 2, name: "A Maga", description: "Manifestação e criação" },
    TarotCard { id: 3, name: "A Alta Sacerdotisa", description: "Intuição e sabedoria interior" },
    TarotCard { id: 4, name: "A Imperatriz", description: "Fertilidade e abundância" },
    TarotCard { id: 5, name: "O Imperador", description: "Autoridade e estrutura" },
    TarotCard { id: 6, name: "O Papa", description: "Tradição e espiritualidade" },
    TarotCard { id: 7, name: "Os Amantes", description: "Amor e escolhas do coração" },
    TarotCard { id: 8, name: "O Carro", description: "Força de vontade e determinação" },
    TarotCard { id: 9, name: "A Força", description: "Coragem e força interior" },
    TarotCard { id: 10, name: "A Estrela", description: "Esperança e orientação divina" },
];

pub fn is_catalog_card(id: u32) -> bool {
    TAROT_CATALOG.iter().any(|card| card.id == id)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpreadError {
    #[error("Selecione no máximo 3 cartas")]
    LimitReached,

    #[error("card {0} is not part of the spread")]
    UnknownCard(u32),

    #[error("{selected} of 3 cards selected")]
    Incomplete { selected: usize },
}

/// Outcome of clicking a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Selected,
    Deselected,
}

/// Card selection state for the final quiz step
///
/// Order of picks is kept for the submission payload but carries no meaning.
#[derive(Debug, Clone, Default)]
pub struct CardSpread {
    selected: Vec<u32>,
}

impl CardSpread {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cards(&self) -> &'static [TarotCard] {
        &TAROT_CATALOG
    }

    pub fn selected(&self) -> &[u32] {
        &self.selected
    }

    pub fn is_selected(&self, id: u32) -> bool {
        self.selected.contains(&id)
    }

    /// A card can be picked unless the selection is full and it isn't already in it
    pub fn is_disabled(&self, id: u32) -> bool {
        self.is_full() && !self.is_selected(id)
    }

    pub fn is_full(&self) -> bool {
        self.selected.len() >= SELECTION_SIZE
    }

    pub fn remaining(&self) -> usize {
        SELECTION_SIZE.saturating_sub(self.selected.len())
    }

    pub fn toggle(&mut self, id: u32) -> Result<Toggle, SpreadError> {
        if !is_catalog_card(id) {
            return Err(SpreadError::UnknownCard(id));
        }
        if let Some(pos) = self.selected.iter().position(|c| *c == id) {
            self.selected.remove(pos);
            return Ok(Toggle::Deselected);
        }
        if self.is_full() {
            return Err(SpreadError::LimitReached);
        }
        self.selected.push(id);
        Ok(Toggle::Selected)
    }

    /// Deal the spread again, dropping any picks
    pub fn redeal(&mut self) {
        self.selected.clear();
    }

    pub fn reveal(&self) -> Result<Vec<u32>, SpreadError> {
        if self.selected.len() != SELECTION_SIZE {
            return Err(SpreadError::Incomplete { selected: self.selected.len() });
        }
        Ok(self.selected.clone())
    }

    pub fn cta_label(&self) -> String {
        match self.remaining() {
            0 => "Revelar cartas".to_string(),
            1 => "Selecione 1 carta".to_string(),
            n => format!("Selecione {} cartas", n),
        }
    }
}
