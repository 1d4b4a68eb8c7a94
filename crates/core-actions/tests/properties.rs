mod common;
use common::*;

use core_actions::{FeedResult, KeyEvent, Phase, RegisterName};
use proptest::prelude::*;

const BOUND: [&str; 5] = ["x", "p", "dd", "dw", "gg"];

fn harness() -> Harness {
    let h = Harness::new();
    for binding in BOUND {
        h.simple(binding);
    }
    h
}

proptest! {
    #[test]
    fn simple_commands_carry_count_and_register(
        index in 0..BOUND.len(),
        count in proptest::option::of(1u32..=99_999),
        register in proptest::option::of(proptest::char::range('a', 'z')),
    ) {
        let h = harness();
        let binding = BOUND[index];
        let mut input = String::new();
        if let Some(name) = register {
            input.push('"');
            input.push(name);
        }
        if let Some(count) = count {
            input.push_str(&count.to_string());
        }
        input.push_str(binding);

        let result = h.feed_last(&input);
        let record = ran(&result);
        prop_assert_eq!(record.command.name(), binding);
        prop_assert_eq!(record.count, count);
        prop_assert_eq!(
            record.register,
            register.map_or(RegisterName::UNNAMED, RegisterName::new)
        );
        prop_assert_eq!(h.dispatcher.current_phase(), Phase::NoInput);
    }

    #[test]
    fn unmatched_input_always_fails_cleanly(
        // None of these start a count, a register or a bound name.
        chars in proptest::collection::vec(proptest::sample::select(vec!['a', 'b', 'q', 'z', 'Q', '!']), 1..6),
    ) {
        let h = harness();
        let first = h.dispatcher.feed(KeyEvent::char(chars[0]));
        prop_assert!(matches!(first, FeedResult::NoMatchingCommand));
        prop_assert_eq!(h.dispatcher.current_phase(), Phase::NoInput);
        for c in &chars[1..] {
            let result = h.dispatcher.feed(KeyEvent::char(*c));
            prop_assert!(matches!(result, FeedResult::NoMatchingCommand));
        }
        prop_assert_eq!(h.dispatcher.commands().len(), BOUND.len());
        prop_assert!(h.log().is_empty());
    }
}
