// Unit tests for the Alma Gêmea visitor workflow

use alma_gemea::core::{
    resolve, share_url, CardSpread, ClientRoute, EngagementScript, FormController, FormError,
    FormField, FormStep, Resolution, ResultView, SpreadError, Timeline, Toggle,
};
use alma_gemea::models::SoulMateSubmission;
use std::time::Duration;
use validator::Validate;

fn valid_submission() -> SoulMateSubmission {
    SoulMateSubmission::new("Ana", "1990-01-01", vec![1, 2, 3])
}

#[test]
fn test_card_count_other_than_three_fails() {
    for count in [0usize, 1, 2, 4, 5, 10] {
        let cards: Vec<u32> = (1..=count as u32).collect();
        let submission = SoulMateSubmission::new("Ana", "1990-01-01", cards);
        assert!(submission.validate().is_err(), "{} cards should be rejected", count);
    }
    assert!(valid_submission().validate().is_ok());
}

#[test]
fn test_malformed_email_fails_and_empty_passes() {
    for bad in ["ana", "ana@", "@example.com", "ana example.com", "ana@@example.com"] {
        let mut submission = valid_submission();
        submission.email = bad.to_string();
        assert!(submission.validate().is_err(), "{:?} should be rejected", bad);
    }

    let mut submission = valid_submission();
    submission.email = String::new();
    assert!(submission.validate().is_ok());
    submission.email = "ana@example.com".to_string();
    assert!(submission.validate().is_ok());
}

#[test]
fn test_optional_fields_accept_any_text() {
    let mut submission = valid_submission();
    submission.city = "Belo Horizonte".to_string();
    submission.zodiac_sign = "escorpiao".to_string();
    submission.height = "alto".to_string();
    submission.preferences = "cinema, viagens".to_string();
    assert!(submission.validate().is_ok());
}

#[test]
fn test_controller_never_advances_past_invalid_step() {
    let mut form = FormController::new();
    for _ in 0..3 {
        assert!(form.advance().is_err());
        assert_eq!(form.step(), FormStep::Name);
    }

    form.draft_mut().name = "Ana".to_string();
    assert_eq!(form.advance().unwrap(), FormStep::Birthdate);

    form.draft_mut().birthdate = "31/12/1990".to_string();
    let err = form.advance().unwrap_err();
    match err {
        FormError::InvalidStep { step, errors } => {
            assert_eq!(step, FormStep::Birthdate);
            assert_eq!(errors.fields().collect::<Vec<_>>(), vec![FormField::Birthdate]);
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(form.step(), FormStep::Birthdate);
}

#[test]
fn test_steps_describe_their_screens() {
    assert_eq!(FormStep::Name.title(), "Qual é o seu nome?");
    assert_eq!(FormStep::Cards.title(), "Escolha 3 cartas do Tarot");
    assert_eq!(FormStep::ZodiacSign.choices().len(), 12);
    assert!(FormStep::ZodiacSign.choices().contains(&"escorpiao"));
    assert_eq!(FormStep::Height.choices(), ["baixo", "medio", "alto"]);
    assert!(FormStep::City.choices().is_empty());

    // choices are suggestions: any value passes the step
    let mut form = FormController::new();
    form.draft_mut().name = "Ana".to_string();
    form.draft_mut().birthdate = "1990-01-01".to_string();
    form.draft_mut().zodiac_sign = "ofiuco".to_string();
    while form.step() != FormStep::Email {
        form.advance().unwrap();
    }
}

#[test]
fn test_back_keeps_entered_data() {
    let mut form = FormController::new();
    form.draft_mut().name = "Ana".to_string();
    form.advance().unwrap();
    form.draft_mut().birthdate = "1990-01-01".to_string();
    form.advance().unwrap();
    form.draft_mut().city = "Recife".to_string();

    assert_eq!(form.back(), FormStep::Birthdate);
    assert_eq!(form.back(), FormStep::Name);
    assert_eq!(form.back(), FormStep::Name);

    assert_eq!(form.draft().name, "Ana");
    assert_eq!(form.draft().birthdate, "1990-01-01");
    assert_eq!(form.draft().city, "Recife");

    assert_eq!(form.advance().unwrap(), FormStep::Birthdate);
    assert_eq!(form.advance().unwrap(), FormStep::City);
}

#[test]
fn test_back_from_cards_keeps_selection() {
    let mut form = FormController::new();
    form.draft_mut().name = "Ana".to_string();
    form.draft_mut().birthdate = "1990-01-01".to_string();
    while form.step() != FormStep::Cards {
        form.advance().unwrap();
    }
    form.toggle_card(4).unwrap();
    form.toggle_card(8).unwrap();

    assert_eq!(form.back(), FormStep::Email);
    assert_eq!(form.toggle_card(1), Err(FormError::NotSelectingCards));
    assert_eq!(form.advance().unwrap(), FormStep::Cards);
    assert_eq!(form.spread().unwrap().selected(), &[4, 8]);
}

#[test]
fn test_card_step_blocks_until_three_selected() {
    let mut form = FormController::new();
    form.draft_mut().name = "Ana".to_string();
    form.draft_mut().birthdate = "1990-01-01".to_string();
    while form.step() != FormStep::Cards {
        form.advance().unwrap();
    }

    form.toggle_card(2).unwrap();
    assert!(form.advance().is_err());
    assert_eq!(
        form.errors().get(FormField::TarotCards).unwrap(),
        ["Selecione exatamente 3 cartas"]
    );

    form.toggle_card(6).unwrap();
    form.toggle_card(10).unwrap();
    assert_eq!(form.advance().unwrap(), FormStep::Cards);
    assert!(form.errors().is_empty());
    assert_eq!(form.confirm().unwrap().tarot_cards, vec![2, 6, 10]);
}

#[test]
fn test_spread_selection_is_capped() {
    let mut spread = CardSpread::new();
    assert_eq!(spread.cards().len(), 10);
    for id in [1, 2, 3] {
        spread.toggle(id).unwrap();
    }
    for id in 4..=10 {
        assert_eq!(spread.toggle(id), Err(SpreadError::LimitReached));
    }
    assert_eq!(spread.toggle(2), Ok(Toggle::Deselected));
    assert_eq!(spread.toggle(10), Ok(Toggle::Selected));

    let mut picked = spread.reveal().unwrap();
    picked.sort_unstable();
    assert_eq!(picked, vec![1, 3, 10]);
}

#[test]
fn test_message_timeline_reveals_every_line_before_continue() {
    let script = EngagementScript::default();
    let messages = script.message_timeline();
    let offsets: Vec<Duration> = messages.cues().iter().map(|c| c.at).collect();
    assert_eq!(
        offsets,
        vec![
            Duration::from_secs(0),
            Duration::from_secs(3),
            Duration::from_secs(6),
            Duration::from_secs(9),
            Duration::from_secs(12),
            Duration::from_secs(16),
        ]
    );
}

#[test]
fn test_timeline_chain_shifts_offsets() {
    let first = Timeline::new().at(Duration::from_secs(1), "a");
    let second = Timeline::new()
        .at(Duration::ZERO, "b")
        .at(Duration::from_secs(2), "c");
    let chained = first.chain(Duration::from_secs(5), second);
    let got: Vec<_> = chained.cues().iter().map(|c| (c.at.as_secs(), c.action)).collect();
    assert_eq!(got, vec![(1, "a"), (5, "b"), (7, "c")]);
}

#[test]
fn test_result_routes_and_share_links() {
    let link = share_url("https://alma.example", "abc123");
    let path = link.trim_start_matches("https://alma.example");
    assert_eq!(
        resolve(path),
        Resolution::Render(ClientRoute::Result(Some("abc123".to_string())))
    );
    assert_eq!(
        resolve("/?result=abc123"),
        Resolution::Redirect("/result/abc123".to_string())
    );
    assert_eq!(ResultView::initial(None), ResultView::InvalidLink);
}

#[test]
fn test_result_page_settles_without_backend() {
    let api = alma_gemea::ApiClient::new("http://127.0.0.1:9").unwrap();

    let view = tokio_test::block_on(alma_gemea::core::load_result(&api, None));
    assert_eq!(view, ResultView::InvalidLink);
    assert_eq!(view.headline(), "O link parece estar incompleto ou inválido.");

    let view = tokio_test::block_on(alma_gemea::core::load_result(&api, Some("abc123")));
    assert_eq!(view, ResultView::NotFound);
}
