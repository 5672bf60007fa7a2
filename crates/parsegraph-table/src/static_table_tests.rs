use super::*;

#[test]
fn unrecorded_state_has_no_lookahead() {
    let table = StaticParseTable::builder().build();
    assert_eq!(table.lex_mode(42), LexMode::NONE);
}

#[test]
fn unrecorded_action_is_empty() {
    let table = StaticParseTable::builder().build();
    assert!(table.actions(1, 5).is_empty());
    assert!(!table.has_actions(1, 5));
}

#[test]
fn recorded_actions_preserve_insertion_order() {
    let table = StaticParseTable::builder()
        .action(1, 5, Action::Shift { state: 2, extra: false, repetition: false })
        .action(1, 5, Action::Reduce { symbol: 9, child_count: 1, dynamic_precedence: 0, production_id: 0, is_fragile: false, end_of_non_terminal_extra: false })
        .build();
    let actions = table.actions(1, 5);
    assert_eq!(actions.len(), 2);
    assert!(actions[0].is_shift());
    assert!(actions[1].is_reduce());
}

#[test]
fn goto_round_trips() {
    let table = StaticParseTable::builder().goto(1, 9, 7).build();
    assert_eq!(table.goto(1, 9), 7);
}

#[test]
#[should_panic(expected = "no goto recorded")]
fn missing_goto_panics() {
    let table = StaticParseTable::builder().build();
    table.goto(1, 9);
}

#[test]
fn reserved_word_and_reusable_leaf_lookups() {
    let table = StaticParseTable::builder().reserved_word(3, 4).reusable_leaf(3, 5).build();
    assert!(table.is_reserved_word(3, 4));
    assert!(!table.is_reserved_word(3, 5));
    assert!(table.is_reusable_leaf(3, 5));
    assert!(!table.is_reusable_leaf(3, 4));
}
