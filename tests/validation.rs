use scorecast::model::{CompetitionType, MatchType, Side};
use scorecast::validate::{InputDefaults, ValidationError, parse_batch_json, parse_input_json};

static REQUEST_JSON: &str = include_str!("fixtures/request.json");
static BATCH_JSON: &str = include_str!("fixtures/batch.json");

#[test]
fn fixture_parses_into_a_request() {
    let req = parse_input_json(REQUEST_JSON, InputDefaults::default()).unwrap();
    assert_eq!(req.team_a_name, "Lyon");
    assert_eq!(req.team_b_name, "Nantes");
    assert_eq!(req.scores_a, vec![2, 1, 3, 0, 2]);
    assert_eq!(req.scores_b, vec![1, 0, 1, 2, 1]);
    assert!(req.head_to_head.is_empty());
    assert!(req.context.is_home_team_a);
    assert_eq!(req.context.match_type, MatchType::Friendly);
    assert_eq!(req.alpha, 1.3);
    assert_eq!(req.iterations, 18_000);
}

#[test]
fn missing_optional_fields_take_defaults() {
    let raw = r#"{
        "teamAName": "Lille",
        "teamBName": "Brest",
        "scoresA": [1, 1, 2],
        "scoresB": [0, 0, 1],
        "matchType": "league"
    }"#;
    let defaults = InputDefaults {
        alpha: 0.7,
        iterations: 5_000,
    };
    let req = parse_input_json(raw, defaults).unwrap();
    assert_eq!(req.alpha, 0.7);
    assert_eq!(req.iterations, 5_000);
    assert!(!req.context.is_home_team_a && !req.context.is_home_team_b);
    assert_eq!(req.context.rank_a, None);
}

#[test]
fn malformed_json_is_reported() {
    let err = parse_input_json("{ not json", InputDefaults::default()).unwrap_err();
    assert!(matches!(err, ValidationError::Malformed(_)));

    let unknown_type = REQUEST_JSON.replace("\"friendly\"", "\"exhibition\"");
    let err = parse_input_json(&unknown_type, InputDefaults::default()).unwrap_err();
    assert!(matches!(err, ValidationError::Malformed(_)));
}

#[test]
fn batch_fixture_mixes_valid_and_invalid_entries() {
    let results = parse_batch_json(BATCH_JSON, InputDefaults::default()).unwrap();
    assert_eq!(results.len(), 6);

    assert!(results[0].is_ok());
    assert!(matches!(
        results[2],
        Err(ValidationError::MissingTeamName(Side::A))
    ));
    // Unknown match type and a non-numeric score only fail their own entry.
    assert!(matches!(results[4], Err(ValidationError::Malformed(_))));
    assert!(matches!(results[5], Err(ValidationError::Malformed(_))));

    let league = results[1].as_ref().unwrap();
    assert_eq!(league.context.rank_a, Some(1));
    assert_eq!(league.context.rank_b, Some(20));

    let cup = results[3].as_ref().unwrap();
    assert_eq!(cup.head_to_head.len(), 3);
    assert_eq!(cup.context.competition_type, Some(CompetitionType::ChampionsLeague));
    assert!(cup.context.is_knockout_stage);
    assert_eq!(cup.context.label(), "Champions League");
}

#[test]
fn batch_must_be_an_array() {
    let err = parse_batch_json(REQUEST_JSON, InputDefaults::default()).unwrap_err();
    assert!(matches!(err, ValidationError::Malformed(_)));
}

#[test]
fn errors_read_well() {
    let raw = REQUEST_JSON.replace("\"alpha\": 1.3", "\"alpha\": 4.5");
    let err = parse_input_json(&raw, InputDefaults::default()).unwrap_err();
    assert_eq!(err.to_string(), "alpha must be within [0, 3], got 4.5");
}
